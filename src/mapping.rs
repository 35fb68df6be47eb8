//! Parameter Mapping
//!
//! Pure conversions between the normalized control domain `[0, 100]` used by
//! knobs and the native units (Hz, dB, ratios) the audio engine consumes.
//!
//! Three families are supported, each with an exact inverse:
//! - Linear: volumes, distortion/OTT amounts, limiter gain
//! - Logarithmic: filter frequencies (perceptually even steps)
//! - Power (exponent 2): kick length, fine resolution near the low end

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower bound of the normalized control domain
pub const NORMALIZED_MIN: f64 = 0.0;

/// Upper bound of the normalized control domain
pub const NORMALIZED_MAX: f64 = 100.0;

/// Mapping family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingKind {
    Linear,
    Logarithmic,
    Power,
}

impl MappingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Logarithmic => "logarithmic",
            Self::Power => "power",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" | "lin" => Some(Self::Linear),
            "logarithmic" | "log" => Some(Self::Logarithmic),
            "power" | "pow" | "quadratic" => Some(Self::Power),
            _ => None,
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mapping between `[0, 100]` and a native range `[min, max]`
///
/// Domain preconditions (`min > 0` for logarithmic, `min != max`) are
/// programming errors and checked with debug assertions only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamMapping {
    pub kind: MappingKind,
    pub min: f64,
    pub max: f64,
}

impl ParamMapping {
    pub const fn linear(min: f64, max: f64) -> Self {
        Self {
            kind: MappingKind::Linear,
            min,
            max,
        }
    }

    pub const fn logarithmic(min: f64, max: f64) -> Self {
        Self {
            kind: MappingKind::Logarithmic,
            min,
            max,
        }
    }

    pub const fn power(min: f64, max: f64) -> Self {
        Self {
            kind: MappingKind::Power,
            min,
            max,
        }
    }

    /// Convert a knob position to the native value
    pub fn to_native(&self, normalized: f64) -> f64 {
        debug_assert!(self.max != self.min, "degenerate mapping range");
        let t = normalized / NORMALIZED_MAX;
        match self.kind {
            MappingKind::Linear => self.min + t * (self.max - self.min),
            MappingKind::Logarithmic => {
                debug_assert!(self.min > 0.0, "logarithmic mapping requires min > 0");
                self.min * (self.max / self.min).powf(t)
            }
            MappingKind::Power => self.min + (self.max - self.min) * t * t,
        }
    }

    /// Convert a native value back to a knob position
    pub fn to_normalized(&self, native: f64) -> f64 {
        debug_assert!(self.max != self.min, "degenerate mapping range");
        match self.kind {
            MappingKind::Linear => NORMALIZED_MAX * (native - self.min) / (self.max - self.min),
            MappingKind::Logarithmic => {
                debug_assert!(self.min > 0.0, "logarithmic mapping requires min > 0");
                NORMALIZED_MAX * (native / self.min).ln() / (self.max / self.min).ln()
            }
            MappingKind::Power => {
                // Guard tiny negative ratios from float error below `min`
                let ratio = ((native - self.min) / (self.max - self.min)).max(0.0);
                NORMALIZED_MAX * ratio.sqrt()
            }
        }
    }

    /// Clamp a native value into the mapping's range
    pub fn clamp_native(&self, native: f64) -> f64 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        native.clamp(lo, hi)
    }
}

/// Clamp a knob position into `[0, 100]`, mapping NaN to the low end
pub fn clamp_normalized(normalized: f64) -> f64 {
    if normalized.is_nan() {
        return NORMALIZED_MIN;
    }
    normalized.clamp(NORMALIZED_MIN, NORMALIZED_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    const TOLERANCE: f64 = 1e-6;

    #[test_case(ParamMapping::linear(-60.0, 0.0) ; "linear volume")]
    #[test_case(ParamMapping::linear(1.0, 4.0) ; "linear limiter")]
    #[test_case(ParamMapping::logarithmic(30.0, 7000.0) ; "log high pass")]
    #[test_case(ParamMapping::logarithmic(200.0, 20000.0) ; "log low pass")]
    #[test_case(ParamMapping::power(0.1, 1.0) ; "power length")]
    fn test_inverse_holds_across_domain(mapping: ParamMapping) {
        for step in 0..=1000 {
            let normalized = step as f64 / 10.0;
            let back = mapping.to_normalized(mapping.to_native(normalized));
            assert!(
                (back - normalized).abs() <= TOLERANCE,
                "{} {:?}: {} -> {}",
                mapping.kind,
                (mapping.min, mapping.max),
                normalized,
                back
            );
        }
    }

    #[test]
    fn test_logarithmic_endpoints() {
        let mapping = ParamMapping::logarithmic(30.0, 7000.0);
        assert_relative_eq!(mapping.to_native(0.0), 30.0, epsilon = 1e-9);
        assert_relative_eq!(mapping.to_native(100.0), 7000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_logarithmic_midpoint_is_geometric_mean() {
        let mapping = ParamMapping::logarithmic(100.0, 10000.0);
        assert_relative_eq!(mapping.to_native(50.0), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_power_curve_midpoint() {
        let mapping = ParamMapping::power(0.1, 1.0);
        assert_relative_eq!(mapping.to_native(50.0), 0.325, epsilon = 1e-12);
        assert_relative_eq!(mapping.to_native(0.0), 0.1, epsilon = 1e-12);
        assert_relative_eq!(mapping.to_native(100.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_mapping() {
        let mapping = ParamMapping::linear(-60.0, 0.0);
        assert_relative_eq!(mapping.to_native(25.0), -45.0);
        assert_relative_eq!(mapping.to_normalized(-30.0), 50.0);
    }

    #[test]
    fn test_clamp_normalized() {
        assert_eq!(clamp_normalized(-5.0), 0.0);
        assert_eq!(clamp_normalized(150.0), 100.0);
        assert_eq!(clamp_normalized(f64::NAN), 0.0);
        assert_eq!(clamp_normalized(42.0), 42.0);
    }

    #[test]
    fn test_mapping_kind_conversion() {
        assert_eq!(MappingKind::from_str("log"), Some(MappingKind::Logarithmic));
        assert_eq!(MappingKind::from_str("Power"), Some(MappingKind::Power));
        assert_eq!(MappingKind::from_str("cubic"), None);
        assert_eq!(MappingKind::Linear.to_string(), "linear");
    }
}
