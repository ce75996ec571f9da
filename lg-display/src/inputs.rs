//! Input ports
//!
//! The display exposes a fixed set of physical inputs, each selected with a
//! hex code (`xb 01 90`) and reported back with the same code in lowercase
//! (`b 01 OK90x`). Installers can rename inputs or hide the ones that are
//! not wired up; the resulting ordered list defines input numbers
//! (1-based) for selection and feedback.

use crate::config::FriendlyName;

/// Physical connector type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    Hdmi,
    DisplayPort,
}

/// Signals carried by a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    Audio,
    Video,
    AudioVideo,
}

/// A selectable input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPort {
    /// Stable identifier, e.g. `hdmiIn1`
    pub key: String,
    /// Display name shown to users
    pub name: String,
    /// Selector code sent with `xb` and reported in feedback
    pub code: String,
    pub connection: ConnectionKind,
    pub signal: SignalType,
}

impl InputPort {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        code: impl Into<String>,
        connection: ConnectionKind,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            code: code.into(),
            connection,
            signal: SignalType::AudioVideo,
        }
    }

    /// Whether a reported input token refers to this port
    pub fn matches_token(&self, token: &str) -> bool {
        self.code.eq_ignore_ascii_case(token.trim())
    }

    /// Whether a configuration key names this port, by key or by code
    pub fn matches_key(&self, key: &str) -> bool {
        let key = key.trim();
        self.key.eq_ignore_ascii_case(key) || self.code.eq_ignore_ascii_case(key)
    }
}

/// Inputs present on every supported model
pub fn default_ports() -> Vec<InputPort> {
    vec![
        InputPort::new("hdmiIn1", "HDMI 1", "90", ConnectionKind::Hdmi),
        InputPort::new("hdmiIn2", "HDMI 2", "91", ConnectionKind::Hdmi),
        InputPort::new("hdmiIn3", "HDMI 3", "92", ConnectionKind::Hdmi),
        InputPort::new("displayPortIn", "DisplayPort", "c0", ConnectionKind::DisplayPort),
    ]
}

/// Ordered list of selectable inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputList {
    ports: Vec<InputPort>,
}

impl InputList {
    pub fn new(ports: Vec<InputPort>) -> Self {
        Self { ports }
    }

    /// Apply rename and hide directives in order
    ///
    /// Directives naming an unknown input are logged and skipped.
    pub fn with_friendly_names(mut self, names: &[FriendlyName]) -> Self {
        for entry in names.iter().filter(|entry| entry.is_valid()) {
            let Some(index) = self.ports.iter().position(|p| p.matches_key(&entry.input_key))
            else {
                tracing::warn!("Friendly name for unknown input '{}' ignored", entry.input_key);
                continue;
            };

            if entry.hide_input {
                let removed = self.ports.remove(index);
                tracing::debug!("Hiding input {}", removed.key);
            } else {
                tracing::debug!("Renaming input {} to '{}'", self.ports[index].key, entry.name);
                self.ports[index].name = entry.name.clone();
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Port by 1-based input number
    pub fn get(&self, number: usize) -> Option<&InputPort> {
        number.checked_sub(1).and_then(|index| self.ports.get(index))
    }

    /// 0-based position of the port named by key or code
    pub fn find(&self, key: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.matches_key(key))
    }

    /// 0-based position of the port a feedback token refers to
    pub fn position_by_token(&self, token: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.matches_token(token))
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputPort> {
        self.ports.iter()
    }
}

impl Default for InputList {
    fn default() -> Self {
        Self::new(default_ports())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_ports() {
        let inputs = InputList::default();
        let keys: Vec<_> = inputs.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["hdmiIn1", "hdmiIn2", "hdmiIn3", "displayPortIn"]);
        assert_eq!(inputs.get(4).map(|p| p.code.as_str()), Some("c0"));
        assert!(inputs.get(0).is_none());
        assert!(inputs.get(5).is_none());
    }

    #[rstest]
    #[case("90", Some(0))]
    #[case("C0", Some(3))]
    #[case(" c0 ", Some(3))]
    #[case("a0", None)]
    fn test_position_by_token(#[case] token: &str, #[case] expected: Option<usize>) {
        assert_eq!(InputList::default().position_by_token(token), expected);
    }

    #[test]
    fn test_rename_by_key_or_code() {
        let inputs = InputList::default().with_friendly_names(&[
            FriendlyName::new("HDMIIN1", "Laptop"),
            FriendlyName::new("c0", "Media Player"),
        ]);
        assert_eq!(inputs.get(1).map(|p| p.name.as_str()), Some("Laptop"));
        assert_eq!(inputs.get(4).map(|p| p.name.as_str()), Some("Media Player"));
    }

    #[test]
    fn test_hidden_inputs_renumber() {
        let inputs = InputList::default()
            .with_friendly_names(&[FriendlyName::hidden("hdmiIn2", "Unused")]);
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs.get(2).map(|p| p.key.as_str()), Some("hdmiIn3"));
        assert_eq!(inputs.find("hdmiIn2"), None);
        assert_eq!(inputs.position_by_token("91"), None);
    }

    #[test]
    fn test_unknown_and_invalid_directives_skipped() {
        let inputs = InputList::default().with_friendly_names(&[
            FriendlyName::new("hdmiIn9", "Nowhere"),
            FriendlyName::hidden("", "No key"),
        ]);
        assert_eq!(inputs, InputList::default());
    }
}
