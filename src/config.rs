//! Declarative interval configuration
//!
//! The attribute definition file is a nested YAML document: global settings,
//! then one block per cube type, then one block per formation, with optional
//! attribute-keyed override blocks inside the formation. Parsing is strict:
//! unknown fields are rejected so misconfiguration surfaces early.
//!
//! `IntervalConfig` is the fully resolved form and doubles as the grouping
//! key: attribute kinds whose resolved settings are structurally identical
//! collapse into one computation unit.

use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::attribute::CalcType;
use crate::error::{Error, Result};

/// Global settings for attribute generation
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Directory holding the horizon surface files
    pub gridhorizon_path: PathBuf,
    /// Attribute kinds to calculate for every cube/formation
    pub attributes: Vec<CalcType>,
    /// Postfix appended to horizon names to form surface file names
    pub surface_postfix: String,
    /// Scaling factor applied to all values unless overridden
    pub scale_factor: f64,
}

/// Root of the attribute definition document
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    #[serde(rename = "global")]
    pub global_config: GlobalConfig,
    #[serde(default)]
    pub cubes: IndexMap<String, CubeConfig>,
}

impl RootConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }
}

/// Settings for one cube type: a name prefix and its formations
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CubeConfig {
    /// Cube name prefix, matched date-insensitively against available cubes
    pub cube_prefix: String,
    pub formations: IndexMap<String, FormationSettings>,
}

/// Interval defaults for one formation, plus per-attribute overrides
///
/// Any key that is not one of the named fields must be an attribute kind
/// (`rms`, `mean`, ...) carrying an override block; anything else fails
/// deserialization.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FormationSettings {
    pub top_horizon: Option<String>,
    pub bottom_horizon: Option<String>,
    #[serde(default)]
    pub top_surface_shift: f64,
    #[serde(default)]
    pub bottom_surface_shift: f64,
    pub window_length: Option<f64>,
    /// Attribute-keyed override blocks, collected from the remaining keys
    #[serde(flatten)]
    pub attribute_overrides: IndexMap<CalcType, IntervalOverride>,
}

impl FormationSettings {
    /// Resolve the effective interval for one attribute kind
    ///
    /// Starts from the formation defaults with the global scale factor, then
    /// applies the attribute's override patch field by field (an override
    /// replaces, never merges). Validation failures carry the
    /// cube/formation/attribute location for diagnosability.
    pub fn build_interval_config(
        &self,
        attribute: CalcType,
        global_scale_factor: f64,
        formation_name: &str,
        cube_name: &str,
    ) -> Result<IntervalConfig> {
        let mut top_horizon = self.top_horizon.clone();
        let mut bottom_horizon = self.bottom_horizon.clone();
        let mut top_surface_shift = self.top_surface_shift;
        let mut bottom_surface_shift = self.bottom_surface_shift;
        let mut window_length = self.window_length;
        let mut scale_factor = global_scale_factor;

        if let Some(patch) = self.attribute_overrides.get(&attribute) {
            if let Some(value) = &patch.top_horizon {
                top_horizon = Some(value.clone());
            }
            if let Some(value) = &patch.bottom_horizon {
                bottom_horizon = Some(value.clone());
            }
            if let Some(value) = patch.top_surface_shift {
                top_surface_shift = value;
            }
            if let Some(value) = patch.bottom_surface_shift {
                bottom_surface_shift = value;
            }
            if let Some(value) = patch.window_length {
                window_length = Some(value);
            }
            if let Some(value) = patch.scale_factor {
                scale_factor = value;
            }
        }

        let Some(top_horizon) = top_horizon else {
            return Err(Error::MissingTopHorizon {
                cube: cube_name.to_string(),
                formation: formation_name.to_string(),
                attribute,
            });
        };
        if bottom_horizon.is_none() && window_length.is_none() {
            return Err(Error::MissingBottomBoundary {
                cube: cube_name.to_string(),
                formation: formation_name.to_string(),
                attribute,
            });
        }
        if let (Some(bottom), Some(length)) = (&bottom_horizon, window_length) {
            tracing::warn!(
                cube = cube_name,
                formation = formation_name,
                attribute = %attribute,
                "Both 'bottom_horizon' ('{bottom}') and 'window_length' ({length}) are \
                 specified. 'window_length' will take precedence and 'bottom_horizon' \
                 will be ignored."
            );
        }

        Ok(IntervalConfig {
            top_horizon,
            bottom_horizon,
            top_surface_shift,
            bottom_surface_shift,
            window_length,
            scale_factor,
        })
    }
}

/// Partial interval patch carried by an attribute-keyed override block
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntervalOverride {
    pub top_horizon: Option<String>,
    pub bottom_horizon: Option<String>,
    pub top_surface_shift: Option<f64>,
    pub bottom_surface_shift: Option<f64>,
    pub window_length: Option<f64>,
    pub scale_factor: Option<f64>,
}

/// Fully resolved interval definition
///
/// Used as the grouping key for attribute deduplication: equality and
/// hashing are structural, with floating-point fields compared by exact bit
/// pattern (shifts and scale factors are key material, not approximate
/// quantities). `bottom_horizon` is kept even when `window_length` takes
/// precedence, so conflicting-but-different configurations stay distinct.
#[derive(Clone, Debug, Serialize)]
pub struct IntervalConfig {
    pub top_horizon: String,
    pub bottom_horizon: Option<String>,
    pub top_surface_shift: f64,
    pub bottom_surface_shift: f64,
    pub window_length: Option<f64>,
    pub scale_factor: f64,
}

impl PartialEq for IntervalConfig {
    fn eq(&self, other: &Self) -> bool {
        self.top_horizon == other.top_horizon
            && self.bottom_horizon == other.bottom_horizon
            && self.top_surface_shift.to_bits() == other.top_surface_shift.to_bits()
            && self.bottom_surface_shift.to_bits() == other.bottom_surface_shift.to_bits()
            && self.window_length.map(f64::to_bits) == other.window_length.map(f64::to_bits)
            && self.scale_factor.to_bits() == other.scale_factor.to_bits()
    }
}

impl Eq for IntervalConfig {}

impl Hash for IntervalConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.top_horizon.hash(state);
        self.bottom_horizon.hash(state);
        self.top_surface_shift.to_bits().hash(state);
        self.bottom_surface_shift.to_bits().hash(state);
        self.window_length.map(f64::to_bits).hash(state);
        self.scale_factor.to_bits().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_yaml(raw: &str) -> FormationSettings {
        serde_yaml::from_str(raw).unwrap()
    }

    #[test]
    fn override_replaces_single_fields() {
        let settings = settings_yaml(
            "top_horizon: topvolantis\n\
             bottom_horizon: basevolantis\n\
             top_surface_shift: -5\n\
             rms:\n  scale_factor: 1.02\n",
        );
        let base = settings
            .build_interval_config(CalcType::Mean, 1.0, "volantis", "relai_depth")
            .unwrap();
        let patched = settings
            .build_interval_config(CalcType::Rms, 1.0, "volantis", "relai_depth")
            .unwrap();

        assert_eq!(base.scale_factor, 1.0);
        assert_eq!(patched.scale_factor, 1.02);
        assert_eq!(patched.top_surface_shift, -5.0);
        assert_eq!(patched.top_horizon, "topvolantis");
        assert_ne!(base, patched);
    }

    #[test]
    fn missing_top_horizon_names_the_location() {
        let settings = settings_yaml("bottom_horizon: basevolantis\n");
        let err = settings
            .build_interval_config(CalcType::Rms, 1.0, "volantis", "relai_depth")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("relai_depth"));
        assert!(message.contains("volantis"));
        assert!(message.contains("rms"));
        assert!(message.contains("top_horizon"));
    }

    #[test]
    fn missing_bottom_boundary_is_rejected() {
        let settings = settings_yaml("top_horizon: topvolantis\n");
        let err = settings
            .build_interval_config(CalcType::Min, 1.0, "volantis", "relai_depth")
            .unwrap_err();
        assert!(err.to_string().contains("'bottom_horizon' or 'window_length'"));
    }

    #[test]
    fn unknown_formation_key_is_rejected() {
        let result: std::result::Result<FormationSettings, _> =
            serde_yaml::from_str("top_horizon: a\nbottom_horizon: b\nspurious: 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_override_field_is_rejected() {
        let result: std::result::Result<FormationSettings, _> = serde_yaml::from_str(
            "top_horizon: a\nbottom_horizon: b\nrms:\n  smoothing: 3\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn interval_config_equality_is_exact() {
        let settings = settings_yaml("top_horizon: a\nbottom_horizon: b\n");
        let one = settings
            .build_interval_config(CalcType::Rms, 1.0, "f", "c")
            .unwrap();
        let same = settings
            .build_interval_config(CalcType::Mean, 1.0, "f", "c")
            .unwrap();
        let scaled = settings
            .build_interval_config(CalcType::Min, 1.0 + f64::EPSILON, "f", "c")
            .unwrap();

        assert_eq!(one, same);
        assert_ne!(one, scaled);
    }
}
