//! Ephemeral atmospheric effects with their own tiny update rules.

use rand::Rng;

use crate::atmosphere::config::LightningConfig;
use crate::atmosphere::wind::smooth;
use crate::core::clamp01;

/// Full-screen lightning flash: jumps to full white on a strike, then fades.
#[derive(Clone, Copy, Debug, Default)]
pub struct LightningFlash {
    opacity: f32,
}

impl LightningFlash {
    /// Roll for a strike (only while `enabled`) and fade the flash.
    /// Returns true when a new strike happened this tick.
    pub fn update(&mut self, enabled: bool, config: &LightningConfig, rng: &mut impl Rng) -> bool {
        let struck = enabled && rng.gen_bool(clamp01(config.chance) as f64);
        if struck {
            self.opacity = 1.0;
        } else {
            self.opacity = clamp01(smooth(self.opacity, 0.0, config.fade));
            if self.opacity < 1e-3 {
                self.opacity = 0.0;
            }
        }
        struck
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}

/// Aurora band: fades in while the preset asks for it, and keeps a slowly
/// advancing phase for the wavy band shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuroraState {
    opacity: f32,
    phase: f32,
}

impl AuroraState {
    pub fn update(&mut self, enabled: bool, fade: f32) {
        let target = if enabled { 1.0 } else { 0.0 };
        self.opacity = clamp01(smooth(self.opacity, target, fade));
        if !enabled && self.opacity < 1e-3 {
            self.opacity = 0.0;
        }
        if self.opacity > 0.0 {
            self.phase = (self.phase + 0.01) % std::f32::consts::TAU;
        }
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_lightning_never_strikes_when_disabled() {
        let mut rng = StdRng::seed_from_u64(1);
        let cfg = LightningConfig { chance: 1.0, fade: 0.08 };
        let mut flash = LightningFlash::default();
        for _ in 0..100 {
            assert!(!flash.update(false, &cfg, &mut rng));
        }
        assert_eq!(flash.opacity(), 0.0);
    }

    #[test]
    fn test_strike_then_fade() {
        let mut rng = StdRng::seed_from_u64(1);
        let cfg = LightningConfig { chance: 1.0, fade: 0.08 };
        let mut flash = LightningFlash::default();
        assert!(flash.update(true, &cfg, &mut rng));
        assert_eq!(flash.opacity(), 1.0);

        let mut last = flash.opacity();
        for _ in 0..200 {
            flash.update(false, &cfg, &mut rng);
            assert!(flash.opacity() <= last);
            assert!((0.0..=1.0).contains(&flash.opacity()));
            last = flash.opacity();
        }
        assert_eq!(flash.opacity(), 0.0);
    }

    #[test]
    fn test_aurora_fades_toward_target() {
        let mut aurora = AuroraState::default();
        for _ in 0..500 {
            aurora.update(true, 0.02);
        }
        assert!(aurora.opacity() > 0.99);
        for _ in 0..1000 {
            aurora.update(false, 0.02);
        }
        assert_eq!(aurora.opacity(), 0.0);
        // Phase stays in radians and freezes once the band is gone
        let phase = aurora.phase();
        assert!((0.0..std::f32::consts::TAU).contains(&phase));
        aurora.update(false, 0.02);
        assert_eq!(aurora.phase(), phase);
    }
}
