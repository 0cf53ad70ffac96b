// van Genuchten-Mualem constitutive laws for two-phase pore flow
//
// Relative permeability and capillary pressure as functions of saturation,
// parameterized by the residual saturations and the shape parameters m and
// alpha. Degenerate saturations clamp or short-circuit instead of erroring.

use crate::constants::CAPILLARY_DRY_SENTINEL_PA;
use serde::{Deserialize, Serialize};

/// Shape and residual-saturation parameters for one rock type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VanGenuchtenParams {
    /// Shape exponent m, 0 < m < 1
    pub m: f64,
    /// Air-entry scaling alpha in 1/Pa
    pub alpha_per_pa: f64,
    pub residual_liquid_saturation: f64,
    pub residual_gas_saturation: f64,
}

impl VanGenuchtenParams {
    fn effective_liquid(&self, s_w: f64) -> f64 {
        let s_lr = self.residual_liquid_saturation;
        ((s_w - s_lr) / (1.0 - s_lr)).clamp(0.0, 1.0)
    }

    fn effective_gas(&self, s_g: f64) -> f64 {
        let s_gr = self.residual_gas_saturation;
        ((s_g - s_gr) / (1.0 - s_gr)).clamp(0.0, 1.0)
    }

    /// Mualem relative permeability of the wetting (water) phase
    ///
    /// Zero at or below residual saturation, one at full saturation,
    /// `sqrt(Se) * (1 - (1 - Se^(1/m))^m)^2` in between.
    pub fn relative_permeability_water(&self, s_w: f64) -> f64 {
        if s_w <= self.residual_liquid_saturation {
            return 0.0;
        }
        if s_w >= 1.0 {
            return 1.0;
        }
        let se = self.effective_liquid(s_w);
        let inner = 1.0 - (1.0 - se.powf(1.0 / self.m)).powf(self.m);
        se.sqrt() * inner * inner
    }

    /// Relative permeability of the gas phase
    ///
    /// Same functional family built from the residual gas saturation, with
    /// the outer power 2m in place of the wetting phase's square.
    pub fn relative_permeability_gas(&self, s_g: f64) -> f64 {
        if s_g <= self.residual_gas_saturation {
            return 0.0;
        }
        if s_g >= 1.0 {
            return 1.0;
        }
        let se = self.effective_gas(s_g);
        let inner = 1.0 - (1.0 - se.powf(1.0 / self.m)).powf(self.m);
        se.sqrt() * inner.powf(2.0 * self.m)
    }

    /// Capillary pressure in Pa as a function of water saturation
    ///
    /// `Pc = (1/alpha) * (Se^(-1/m) - 1)^(1/n)`, `n = 1/(1-m)`, with the
    /// effective saturation clamped to [0.01, 0.99]. A fully dry cell
    /// returns a large finite sentinel rather than infinity.
    pub fn capillary_pressure(&self, s_w: f64) -> f64 {
        if s_w <= 0.0 {
            return CAPILLARY_DRY_SENTINEL_PA;
        }
        let n = 1.0 / (1.0 - self.m);
        let se = self.effective_liquid(s_w).clamp(0.01, 0.99);
        (se.powf(-1.0 / self.m) - 1.0).powf(1.0 / n) / self.alpha_per_pa
    }

    /// Phase mobility: absolute permeability scaled by relative
    /// permeability over viscosity
    pub fn mobility(permeability_m2: f64, relative_permeability: f64, viscosity_pa_s: f64) -> f64 {
        permeability_m2 * relative_permeability / viscosity_pa_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use more_asserts::{assert_ge, assert_gt, assert_lt};

    fn params() -> VanGenuchtenParams {
        VanGenuchtenParams {
            m: 0.457,
            alpha_per_pa: 1.0e-4,
            residual_liquid_saturation: 0.15,
            residual_gas_saturation: 0.05,
        }
    }

    #[test]
    fn test_water_endpoints() {
        let p = params();
        assert_eq!(p.relative_permeability_water(p.residual_liquid_saturation), 0.0);
        assert_eq!(p.relative_permeability_water(0.0), 0.0);
        assert_eq!(p.relative_permeability_water(1.0), 1.0);
    }

    #[test]
    fn test_water_monotonic() {
        let p = params();
        let mut prev = 0.0;
        for step in 0..=100 {
            let s_w = step as f64 / 100.0;
            let kr = p.relative_permeability_water(s_w);
            assert_ge!(kr, prev, "kr_w must not decrease at S_w={}", s_w);
            prev = kr;
        }
    }

    #[test]
    fn test_gas_endpoints_and_range() {
        let p = params();
        assert_eq!(p.relative_permeability_gas(p.residual_gas_saturation), 0.0);
        assert_eq!(p.relative_permeability_gas(1.0), 1.0);
        let mid = p.relative_permeability_gas(0.5);
        assert_gt!(mid, 0.0);
        assert_lt!(mid, 1.0);
    }

    #[test]
    fn test_capillary_dry_sentinel() {
        let p = params();
        assert_eq!(p.capillary_pressure(0.0), 1e8);
        assert_eq!(p.capillary_pressure(-0.1), 1e8);
        assert!(p.capillary_pressure(0.001).is_finite());
    }

    #[test]
    fn test_capillary_decreases_with_wetting() {
        let p = params();
        // Drier rock pulls harder
        assert_gt!(p.capillary_pressure(0.3), p.capillary_pressure(0.8));
        assert_gt!(p.capillary_pressure(0.8), 0.0);
    }

    #[test]
    fn test_mobility_scaling() {
        let lambda = VanGenuchtenParams::mobility(1.0e-12, 0.5, 1.0e-3);
        crate::assert_deviation!(lambda, 5.0e-10, 1e-6);
    }
}
