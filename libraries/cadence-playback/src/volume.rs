//! Volume control with logarithmic scaling
//!
//! Levels 0-100 map to -60 dB..0 dB; the sink receives the resulting linear
//! gain fraction.

/// Lowest level above silence, in dB
const MIN_DB: f32 = -60.0;

/// Volume level and mute state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    /// Volume level (0-100)
    level: u8,

    /// Mute state (preserves level)
    muted: bool,
}

impl Volume {
    /// Create a volume at `level`, clamped to 100
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(100),
            muted: false,
        }
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn mute(&mut self) {
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Linear gain fraction handed to the sink
    ///
    /// 0.0 when muted or at level 0, otherwise `10^(dB / 20)`.
    pub fn gain(&self) -> f32 {
        if self.muted || self.level == 0 {
            return 0.0;
        }
        10.0_f32.powf(self.db() / 20.0)
    }

    /// Attenuation in dB (-60 when silent)
    pub fn db(&self) -> f32 {
        if self.muted || self.level == 0 {
            MIN_DB
        } else {
            (f32::from(self.level) - 100.0) * (-MIN_DB / 100.0)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(80)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_clamped() {
        let mut vol = Volume::new(150);
        assert_eq!(vol.level(), 100);
        vol.set_level(42);
        assert_eq!(vol.level(), 42);
    }

    #[test]
    fn mute_preserves_level() {
        let mut vol = Volume::new(80);
        vol.mute();
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 80);
        assert_eq!(vol.gain(), 0.0);

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert!(vol.gain() > 0.0);
    }

    #[test]
    fn gain_follows_db_curve() {
        assert_eq!(Volume::new(0).gain(), 0.0);
        assert!((Volume::new(100).gain() - 1.0).abs() < 0.001);
        // -30 dB
        assert!((Volume::new(50).gain() - 0.0316).abs() < 0.001);
        // -12 dB
        assert!((Volume::new(80).gain() - 0.251).abs() < 0.01);
    }

    #[test]
    fn db_values() {
        assert!((Volume::new(100).db()).abs() < 0.01);
        assert!((Volume::new(0).db() + 60.0).abs() < 0.01);
        let mut vol = Volume::new(90);
        assert!((vol.db() + 6.0).abs() < 0.01);
        vol.mute();
        assert!((vol.db() + 60.0).abs() < 0.01);
    }

    #[test]
    fn gain_is_monotonic() {
        let gains: Vec<f32> = (0..=100).map(|level| Volume::new(level).gain()).collect();
        assert!(gains.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
