//! Lightning flashes rolled while a storm is active.

use std::time::Duration;

use rand::Rng;

/// Tuning for storm lightning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightningConfig {
    cooldown: Duration,
    chance_threshold: f32,
    flash_intensity: f32,
    decay_per_ms: f32,
}

impl LightningConfig {
    /// Creates a lightning configuration.
    ///
    /// A flash may only occur once `cooldown` has passed since the previous
    /// one and a uniform draw in `0.0..1.0` exceeds `chance_threshold`.
    #[must_use]
    pub const fn new(
        cooldown: Duration,
        chance_threshold: f32,
        flash_intensity: f32,
        decay_per_ms: f32,
    ) -> Self {
        Self {
            cooldown,
            chance_threshold,
            flash_intensity,
            decay_per_ms,
        }
    }

    /// Minimum time between two flashes.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Intensity a flash starts at.
    #[must_use]
    pub const fn flash_intensity(&self) -> f32 {
        self.flash_intensity
    }
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(5_000), 0.97, 0.8, 0.004)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Lightning {
    config: LightningConfig,
    intensity: f32,
    last_flash: Duration,
}

impl Lightning {
    pub(crate) fn new(config: LightningConfig) -> Self {
        Self {
            config,
            intensity: 0.0,
            last_flash: Duration::ZERO,
        }
    }

    pub(crate) fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Rolls for a flash at `now`; the draw only happens once the cooldown elapsed.
    pub(crate) fn roll<R: Rng>(&mut self, now: Duration, rng: &mut R) -> bool {
        if now.saturating_sub(self.last_flash) <= self.config.cooldown {
            return false;
        }
        if rng.gen::<f32>() <= self.config.chance_threshold {
            return false;
        }
        self.intensity = self.config.flash_intensity;
        self.last_flash = now;
        true
    }

    pub(crate) fn decay(&mut self, dt: Duration) {
        let fade = dt.as_secs_f32() * 1_000.0 * self.config.decay_per_ms;
        self.intensity = (self.intensity - fade).max(0.0);
    }

    pub(crate) fn calm(&mut self) {
        self.intensity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn no_flash_before_cooldown() {
        let mut lightning = Lightning::new(LightningConfig::new(
            Duration::from_millis(5_000),
            -1.0,
            0.8,
            0.004,
        ));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(!lightning.roll(Duration::from_millis(5_000), &mut rng));
        assert!(lightning.roll(Duration::from_millis(5_001), &mut rng));
        assert!((lightning.intensity() - 0.8).abs() < f32::EPSILON);
        assert!(!lightning.roll(Duration::from_millis(9_000), &mut rng));
    }

    #[test]
    fn intensity_decays_to_zero() {
        let mut lightning = Lightning::new(LightningConfig::new(
            Duration::ZERO,
            -1.0,
            0.8,
            0.004,
        ));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(lightning.roll(Duration::from_millis(1), &mut rng));

        lightning.decay(Duration::from_millis(100));
        assert!((lightning.intensity() - 0.4).abs() < 1e-4);
        lightning.decay(Duration::from_millis(150));
        assert!(lightning.intensity().abs() < f32::EPSILON);
    }
}
