//! Volume range mapping
//!
//! Control surfaces speak a 0-65535 level. The display speaks percent.
//! Installers can confine the display to a sub-range (for example 10-80%)
//! so that the full external range maps onto it.

/// Largest external volume level
pub const LEVEL_MAX: u16 = u16::MAX;

/// Largest device volume in percent
pub const DEVICE_MAX: u8 = 100;

/// Linear map from `[in_min, in_max]` onto `[out_min, out_max]`
///
/// The result is not clamped; callers decide how to treat values that
/// fall outside the output range.
pub fn scale(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

/// Mapping between external levels and device percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeScale {
    lower: u8,
    upper: u8,
}

impl VolumeScale {
    /// Limits are clamped to 0-100. Scaling is only active when
    /// `upper > lower`; otherwise the full device range is used.
    pub fn new(lower: u8, upper: u8) -> Self {
        Self {
            lower: lower.min(DEVICE_MAX),
            upper: upper.min(DEVICE_MAX),
        }
    }

    /// Full 0-100 range
    pub fn unscaled() -> Self {
        Self::new(0, 0)
    }

    pub fn is_active(&self) -> bool {
        self.upper > self.lower
    }

    /// Device-side range in percent
    pub fn device_range(&self) -> (u8, u8) {
        if self.is_active() {
            (self.lower, self.upper)
        } else {
            (0, DEVICE_MAX)
        }
    }

    /// External level to device percent, truncating
    pub fn to_device(&self, level: u16) -> u8 {
        let (low, high) = self.device_range();
        let percent = scale(
            f64::from(level),
            0.0,
            f64::from(LEVEL_MAX),
            f64::from(low),
            f64::from(high),
        );
        percent.clamp(0.0, f64::from(DEVICE_MAX)) as u8
    }

    /// Reported device percent to external level, clamped to 0-65535
    pub fn to_external(&self, device: u16) -> u16 {
        let (low, high) = self.device_range();
        let level = scale(
            f64::from(device),
            f64::from(low),
            f64::from(high),
            0.0,
            f64::from(LEVEL_MAX),
        );
        level.clamp(0.0, f64::from(LEVEL_MAX)) as u16
    }

    /// Lower and upper bounds for the volume ramp, in external levels
    ///
    /// With scaling active these are the configured limits expressed on the
    /// external range.
    pub fn ramp_bounds(&self) -> (u16, u16) {
        if !self.is_active() {
            return (0, LEVEL_MAX);
        }
        let to_level = |percent: u8| {
            scale(
                f64::from(percent),
                0.0,
                f64::from(DEVICE_MAX),
                0.0,
                f64::from(LEVEL_MAX),
            ) as u16
        };
        (to_level(self.lower), to_level(self.upper))
    }
}

impl Default for VolumeScale {
    fn default() -> Self {
        Self::unscaled()
    }
}
