//! Foveated-rendering specialization constants.
//!
//! The shader ships precompiled variants selected by seven pipeline
//! constants (ids 100-106). They are resolved once when a pipeline object is
//! built, never per frame; toggling foveation therefore means rebuilding the
//! pipeline, which callers should treat as expensive and rare.

use std::collections::HashMap;
use thiserror::Error;

/// Specialization constant ids. The numeric values are the ABI and match
/// the `@id(...)` overrides declared in the shader source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FoveationConstant {
    Enabled = 100,
    TargetResolution = 101,
    OptimizedResolution = 102,
    EyeSizeRatio = 103,
    CenterSize = 104,
    CenterShift = 105,
    EdgeRatio = 106,
}

impl FoveationConstant {
    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Why a constant set was rejected at pipeline-build time.
#[derive(Debug, Error, PartialEq)]
pub enum FoveationError {
    #[error("foveation enabled but {name} is {value}, expected a finite value > 0")]
    InvalidResolution { name: &'static str, value: f32 },

    #[error("optimized resolution {optimized} exceeds target resolution {target}")]
    ResolutionOrder { optimized: f32, target: f32 },

    #[error("eye size ratio {0} outside (0, 1]")]
    InvalidEyeSizeRatio(f32),

    #[error("edge ratio {0} must be >= 1")]
    InvalidEdgeRatio(f32),
}

/// Externally computed foveation parameters for one pipeline build.
///
/// With `enabled == false` the remaining fields are ignored entirely; the
/// built pipeline renders at uniform resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoveationSettings {
    pub enabled: bool,
    /// Full (common-shader target) resolution along the foveated axis.
    pub target_resolution: f32,
    /// Reduced resolution actually rendered.
    pub optimized_resolution: f32,
    /// Ratio of a single eye's extent to the shared target, in (0, 1].
    pub eye_size_ratio: f32,
    /// Extent of the full-resolution center region, as a fraction of the eye.
    pub center_size: f32,
    /// Horizontal bias of the center region toward the nose.
    pub center_shift: f32,
    /// Compression applied in the outer region, >= 1.
    pub edge_ratio: f32,
}

impl FoveationSettings {
    /// Uniform-resolution rendering; all remap parameters inert.
    pub const DISABLED: FoveationSettings = FoveationSettings {
        enabled: false,
        target_resolution: 0.0,
        optimized_resolution: 0.0,
        eye_size_ratio: 0.0,
        center_size: 0.0,
        center_shift: 0.0,
        edge_ratio: 0.0,
    };

    /// Validates the set and produces the constants to bind at pipeline
    /// build. This is the one hard failure in the contract layer: an
    /// enabled set with missing or zero resolutions fails here rather than
    /// silently disabling foveation.
    pub fn resolve(&self) -> Result<ResolvedFoveation, FoveationError> {
        if !self.enabled {
            return Ok(ResolvedFoveation {
                constants: vec![(FoveationConstant::Enabled.id(), 0.0)],
            });
        }

        for (name, value) in [
            ("target resolution", self.target_resolution),
            ("optimized resolution", self.optimized_resolution),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FoveationError::InvalidResolution { name, value });
            }
        }
        if self.optimized_resolution > self.target_resolution {
            return Err(FoveationError::ResolutionOrder {
                optimized: self.optimized_resolution,
                target: self.target_resolution,
            });
        }
        if !(self.eye_size_ratio > 0.0 && self.eye_size_ratio <= 1.0) {
            return Err(FoveationError::InvalidEyeSizeRatio(self.eye_size_ratio));
        }
        if !(self.edge_ratio >= 1.0) {
            return Err(FoveationError::InvalidEdgeRatio(self.edge_ratio));
        }

        Ok(ResolvedFoveation {
            constants: vec![
                (FoveationConstant::Enabled.id(), 1.0),
                (
                    FoveationConstant::TargetResolution.id(),
                    self.target_resolution as f64,
                ),
                (
                    FoveationConstant::OptimizedResolution.id(),
                    self.optimized_resolution as f64,
                ),
                (
                    FoveationConstant::EyeSizeRatio.id(),
                    self.eye_size_ratio as f64,
                ),
                (FoveationConstant::CenterSize.id(), self.center_size as f64),
                (
                    FoveationConstant::CenterShift.id(),
                    self.center_shift as f64,
                ),
                (FoveationConstant::EdgeRatio.id(), self.edge_ratio as f64),
            ],
        })
    }

    /// Hashable identity of this set, for caching one pipeline per distinct
    /// parameter combination. Disabled sets all share one key regardless of
    /// the ignored parameters.
    pub fn pipeline_key(&self) -> PipelineKey {
        if !self.enabled {
            return PipelineKey {
                enabled: false,
                bits: [0; 6],
            };
        }
        PipelineKey {
            enabled: true,
            bits: [
                self.target_resolution.to_bits(),
                self.optimized_resolution.to_bits(),
                self.eye_size_ratio.to_bits(),
                self.center_size.to_bits(),
                self.center_shift.to_bits(),
                self.edge_ratio.to_bits(),
            ],
        }
    }
}

/// A validated constant set, ready to bind to a pipeline build.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFoveation {
    constants: Vec<(u32, f64)>,
}

impl ResolvedFoveation {
    /// `(id, value)` pairs in ascending id order.
    #[inline]
    pub fn entries(&self) -> &[(u32, f64)] {
        &self.constants
    }

    /// Keyed by decimal id string, the convention wgpu uses for WGSL
    /// `@id(N) override` declarations.
    pub fn to_override_map(&self) -> HashMap<String, f64> {
        self.constants
            .iter()
            .map(|&(id, v)| (id.to_string(), v))
            .collect()
    }
}

/// Cache key for pipelines built from a [`FoveationSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    enabled: bool,
    bits: [u32; 6],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_settings() -> FoveationSettings {
        FoveationSettings {
            enabled: true,
            target_resolution: 1920.0,
            optimized_resolution: 1280.0,
            eye_size_ratio: 0.5,
            center_size: 0.4,
            center_shift: 0.1,
            edge_ratio: 4.0,
        }
    }

    #[test]
    fn constant_ids_match_the_shader_abi() {
        assert_eq!(FoveationConstant::Enabled.id(), 100);
        assert_eq!(FoveationConstant::TargetResolution.id(), 101);
        assert_eq!(FoveationConstant::OptimizedResolution.id(), 102);
        assert_eq!(FoveationConstant::EyeSizeRatio.id(), 103);
        assert_eq!(FoveationConstant::CenterSize.id(), 104);
        assert_eq!(FoveationConstant::CenterShift.id(), 105);
        assert_eq!(FoveationConstant::EdgeRatio.id(), 106);
    }

    #[test]
    fn disabled_ignores_garbage_parameters() {
        let s = FoveationSettings {
            enabled: false,
            target_resolution: 0.0,
            optimized_resolution: f32::NAN,
            eye_size_ratio: -3.0,
            center_size: f32::INFINITY,
            center_shift: 0.0,
            edge_ratio: 0.0,
        };
        let resolved = s.resolve().unwrap();
        assert_eq!(resolved.entries(), &[(100, 0.0)]);
    }

    #[test]
    fn enabled_emits_all_seven_constants() {
        let resolved = enabled_settings().resolve().unwrap();
        let ids: Vec<u32> = resolved.entries().iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![100, 101, 102, 103, 104, 105, 106]);

        let map = resolved.to_override_map();
        assert_eq!(map["100"], 1.0);
        assert_eq!(map["101"], 1920.0);
        assert_eq!(map["102"], 1280.0);
        assert_eq!(map["106"], 4.0);
    }

    #[test]
    fn enabled_with_zero_resolution_fails() {
        let mut s = enabled_settings();
        s.target_resolution = 0.0;
        assert!(matches!(
            s.resolve(),
            Err(FoveationError::InvalidResolution { .. })
        ));

        let mut s = enabled_settings();
        s.optimized_resolution = 0.0;
        assert!(s.resolve().is_err());

        let mut s = enabled_settings();
        s.optimized_resolution = f32::NAN;
        assert!(s.resolve().is_err());
    }

    #[test]
    fn enabled_with_incompatible_parameters_fails() {
        let mut s = enabled_settings();
        s.optimized_resolution = s.target_resolution * 2.0;
        assert_eq!(
            s.resolve(),
            Err(FoveationError::ResolutionOrder {
                optimized: 3840.0,
                target: 1920.0
            })
        );

        let mut s = enabled_settings();
        s.eye_size_ratio = 1.5;
        assert!(matches!(
            s.resolve(),
            Err(FoveationError::InvalidEyeSizeRatio(_))
        ));

        let mut s = enabled_settings();
        s.edge_ratio = 0.5;
        assert!(matches!(s.resolve(), Err(FoveationError::InvalidEdgeRatio(_))));
    }

    #[test]
    fn pipeline_keys_dedupe_identical_builds() {
        assert_eq!(
            enabled_settings().pipeline_key(),
            enabled_settings().pipeline_key()
        );

        let mut other = enabled_settings();
        other.center_shift += 0.01;
        assert_ne!(enabled_settings().pipeline_key(), other.pipeline_key());

        // Disabled sets collapse to one key no matter the ignored fields.
        let mut a = FoveationSettings::DISABLED;
        a.target_resolution = 123.0;
        assert_eq!(a.pipeline_key(), FoveationSettings::DISABLED.pipeline_key());
    }
}
