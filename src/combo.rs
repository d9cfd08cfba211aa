//! Time-windowed combo intensity
//!
//! Every increase for a team bumps its scale. Increases that land within
//! the combo window of the previous one stack up to the cap; anything
//! slower restarts at the base scale. The scale is held for a short while
//! after the latest increase and then falls back to 1.0.

use std::time::{Duration, Instant};

use crate::config::TallyConfig;

/// Resting scale when no combo is active
pub const IDLE_SCALE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboSettings {
    pub window: Duration,
    pub base: f64,
    pub step: f64,
    pub cap: f64,
    pub hold: Duration,
}

impl From<&TallyConfig> for ComboSettings {
    fn from(config: &TallyConfig) -> Self {
        Self {
            window: config.combo_window(),
            base: config.combo_base,
            step: config.combo_step,
            cap: config.combo_cap,
            hold: config.scale_hold(),
        }
    }
}

impl Default for ComboSettings {
    fn default() -> Self {
        Self::from(&TallyConfig::default())
    }
}

/// Combo state for a single team
#[derive(Debug, Clone)]
pub struct ComboTracker {
    settings: ComboSettings,
    last: Option<Instant>,
    scale: f64,
    chain: u32,
}

impl ComboTracker {
    pub fn new(settings: ComboSettings) -> Self {
        Self {
            settings,
            last: None,
            scale: IDLE_SCALE,
            chain: 0,
        }
    }

    /// Record an increase at `now` and return the new scale
    pub fn register(&mut self, now: Instant) -> f64 {
        let chained = self
            .last
            .is_some_and(|last| now.saturating_duration_since(last) < self.settings.window);

        if chained {
            self.scale = (self.scale(now) + self.settings.step).min(self.settings.cap);
            self.chain += 1;
        } else {
            self.scale = self.settings.base;
            self.chain = 1;
        }
        self.last = Some(now);
        self.scale
    }

    fn holding(&self, now: Instant) -> bool {
        self.last
            .is_some_and(|last| now.saturating_duration_since(last) < self.settings.hold)
    }

    /// Scale to apply to the avatar and the bar at `now`
    pub fn scale(&self, now: Instant) -> f64 {
        if self.holding(now) {
            self.scale
        } else {
            IDLE_SCALE
        }
    }

    /// Number of chained increases in the live combo, 0 when idle
    pub fn chain(&self, now: Instant) -> u32 {
        if self.holding(now) {
            self.chain
        } else {
            0
        }
    }

    pub fn settings(&self) -> &ComboSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_increase_uses_base() {
        let t0 = Instant::now();
        let mut combo = ComboTracker::new(ComboSettings::default());
        assert_eq!(combo.scale(t0), IDLE_SCALE);

        assert!(approx(combo.register(t0), 1.3));
        assert_eq!(combo.chain(t0), 1);
    }

    #[test]
    fn test_fast_increases_stack_to_cap() {
        let t0 = Instant::now();
        let mut combo = ComboTracker::new(ComboSettings::default());

        combo.register(t0);
        assert!(approx(combo.register(t0 + ms(200)), 1.45));
        assert!(approx(combo.register(t0 + ms(400)), 1.6));
        assert!(approx(combo.register(t0 + ms(600)), 1.6));
        assert_eq!(combo.chain(t0 + ms(600)), 4);
    }

    #[test]
    fn test_slow_increase_restarts_combo() {
        let t0 = Instant::now();
        let mut combo = ComboTracker::new(ComboSettings::default());

        combo.register(t0);
        combo.register(t0 + ms(300));
        assert!(approx(combo.register(t0 + ms(800)), 1.3));
        assert_eq!(combo.chain(t0 + ms(800)), 1);
    }

    #[test]
    fn test_window_is_exclusive() {
        let t0 = Instant::now();
        let mut combo = ComboTracker::new(ComboSettings::default());

        combo.register(t0);
        assert!(approx(combo.register(t0 + ms(500)), 1.3));
    }

    #[test]
    fn test_scale_resets_after_hold() {
        let t0 = Instant::now();
        let mut combo = ComboTracker::new(ComboSettings::default());

        combo.register(t0);
        assert!(approx(combo.scale(t0 + ms(599)), 1.3));
        assert_eq!(combo.scale(t0 + ms(600)), IDLE_SCALE);
        assert_eq!(combo.chain(t0 + ms(600)), 0);
    }

    #[test]
    fn test_hold_extends_with_latest_increase() {
        let t0 = Instant::now();
        let mut combo = ComboTracker::new(ComboSettings::default());

        combo.register(t0);
        combo.register(t0 + ms(400));
        assert!(approx(combo.scale(t0 + ms(900)), 1.45));
        assert_eq!(combo.scale(t0 + ms(1000)), IDLE_SCALE);
    }
}
