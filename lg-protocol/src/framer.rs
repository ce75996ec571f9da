//! Response framing
//!
//! Serial and socket transports deliver text in arbitrary chunks. The
//! display terminates every acknowledgement with an `x`, so complete frames
//! are gathered on that delimiter before they are decoded.

/// Delimiter closing every response frame
pub const FRAME_DELIMITER: char = 'x';

/// Upper bound on buffered text without seeing a delimiter
pub const MAX_PENDING: usize = 1024;

/// Incremental splitter for inbound text
#[derive(Debug, Default)]
pub struct ResponseFramer {
    pending: String,
}

impl ResponseFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of received text, returning every completed frame
    ///
    /// Frames are trimmed of surrounding whitespace and line endings; empty
    /// frames are dropped. Text after the last delimiter is kept for the
    /// next call.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);

        let mut frames = Vec::new();
        while let Some(end) = self.pending.find(FRAME_DELIMITER) {
            let frame: String = self.pending.drain(..=end).collect();
            let frame = frame[..frame.len() - FRAME_DELIMITER.len_utf8()].trim();
            if !frame.is_empty() {
                frames.push(frame.to_string());
            }
        }

        if self.pending.len() > MAX_PENDING {
            tracing::warn!(
                "Discarding {} bytes of unterminated response data",
                self.pending.len()
            );
            self.pending.clear();
        }

        frames
    }

    /// Text received since the last complete frame
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
