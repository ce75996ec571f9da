//! Press-and-hold volume ramping
//!
//! While a volume button is held the level steps once immediately, again
//! after an initial delay, and then on a short repeat interval until the
//! button is released or a bound is reached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// One percent of the external range
pub const DEFAULT_STEP: u16 = 655;

pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(800);

pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_millis(80);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RampDirection {
    Up,
    Down,
}

/// Something with a volume level the ramp can read and drive
#[async_trait]
pub trait VolumeTarget: Send + Sync {
    /// Level the next step starts from
    fn current_level(&self) -> u16;

    async fn apply_level(&self, level: u16);
}

/// Step size, bounds and timing of a ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampSettings {
    pub step: u16,
    pub min: u16,
    pub max: u16,
    pub initial_delay: Duration,
    pub repeat_interval: Duration,
}

impl RampSettings {
    pub fn with_bounds(min: u16, max: u16) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    /// Next level from `current`, and whether a bound was hit
    pub fn next_level(&self, current: u16, direction: RampDirection) -> (u16, bool) {
        let step = i32::from(self.step);
        let candidate = match direction {
            RampDirection::Up => i32::from(current) + step,
            RampDirection::Down => i32::from(current) - step,
        };

        if candidate > i32::from(self.max) {
            (self.max, true)
        } else if candidate < i32::from(self.min) {
            (self.min, true)
        } else {
            // In range, so the conversion cannot fail
            (u16::try_from(candidate).unwrap_or(self.max), false)
        }
    }
}

impl Default for RampSettings {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            min: 0,
            max: u16::MAX,
            initial_delay: DEFAULT_INITIAL_DELAY,
            repeat_interval: DEFAULT_REPEAT_INTERVAL,
        }
    }
}

/// Runs at most one ramp at a time
#[derive(Debug)]
pub struct VolumeIncrementer {
    settings: RampSettings,
    direction: Mutex<Option<RampDirection>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl VolumeIncrementer {
    pub fn new(settings: RampSettings) -> Self {
        Self {
            settings,
            direction: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &RampSettings {
        &self.settings
    }

    /// True between `start` and `stop`, including after a bound was hit
    pub fn is_active(&self) -> bool {
        self.direction.lock().is_some()
    }

    pub fn direction(&self) -> Option<RampDirection> {
        *self.direction.lock()
    }

    /// Begin ramping, replacing any ramp in progress
    pub fn start(&self, direction: RampDirection, target: Arc<dyn VolumeTarget>) {
        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }
        *self.direction.lock() = Some(direction);

        let settings = self.settings;
        *task = Some(tokio::spawn(async move {
            let mut delay = settings.initial_delay;
            loop {
                let (level, at_limit) = settings.next_level(target.current_level(), direction);
                target.apply_level(level).await;
                if at_limit {
                    tracing::debug!("Volume ramp {:?} reached limit {}", direction, level);
                    break;
                }
                tokio::time::sleep(delay).await;
                delay = settings.repeat_interval;
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        *self.direction.lock() = None;
    }
}

impl Drop for VolumeIncrementer {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Default)]
    struct Recorder {
        level: Mutex<u16>,
        applied: Mutex<Vec<u16>>,
    }

    impl Recorder {
        fn starting_at(level: u16) -> Arc<Self> {
            let recorder = Self::default();
            *recorder.level.lock() = level;
            Arc::new(recorder)
        }

        fn applied(&self) -> Vec<u16> {
            self.applied.lock().clone()
        }
    }

    #[async_trait]
    impl VolumeTarget for Recorder {
        fn current_level(&self) -> u16 {
            *self.level.lock()
        }

        async fn apply_level(&self, level: u16) {
            *self.level.lock() = level;
            self.applied.lock().push(level);
        }
    }

    #[rstest]
    #[case(1000, RampDirection::Up, (1655, false))]
    #[case(1000, RampDirection::Down, (345, false))]
    #[case(65000, RampDirection::Up, (65535, true))]
    #[case(300, RampDirection::Down, (0, true))]
    #[case(64880, RampDirection::Up, (65535, false))]
    fn test_next_level(
        #[case] current: u16,
        #[case] direction: RampDirection,
        #[case] expected: (u16, bool),
    ) {
        assert_eq!(RampSettings::default().next_level(current, direction), expected);
    }

    #[test]
    fn test_next_level_scaled_bounds() {
        let settings = RampSettings::with_bounds(6553, 58981);
        assert_eq!(settings.next_level(6000, RampDirection::Down), (6553, true));
        assert_eq!(settings.next_level(58500, RampDirection::Up), (58981, true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_timing() {
        let incrementer = VolumeIncrementer::new(RampSettings::default());
        let target = Recorder::starting_at(10_000);

        incrementer.start(RampDirection::Up, target.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(target.applied(), vec![10_655]);

        // Nothing more until the initial delay has passed
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(target.applied().len(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(target.applied().len(), 2);

        tokio::time::sleep(Duration::from_millis(160)).await;
        assert_eq!(target.applied(), vec![10_655, 11_310, 11_965, 12_620]);
        assert!(incrementer.is_active());

        incrementer.stop();
        assert!(!incrementer.is_active());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(target.applied().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_stops_at_limit() {
        let incrementer = VolumeIncrementer::new(RampSettings::default());
        let target = Recorder::starting_at(500);

        incrementer.start(RampDirection::Down, target.clone());
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(target.applied(), vec![0]);
        assert!(incrementer.is_active());
        assert_eq!(incrementer.direction(), Some(RampDirection::Down));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_running_ramp() {
        let incrementer = VolumeIncrementer::new(RampSettings::default());
        let target = Recorder::starting_at(20_000);

        incrementer.start(RampDirection::Up, target.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;
        incrementer.start(RampDirection::Down, target.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(target.applied(), vec![20_655, 20_000]);
        assert_eq!(incrementer.direction(), Some(RampDirection::Down));
        incrementer.stop();
    }
}
