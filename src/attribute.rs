//! Attribute value type
//!
//! A `SeismicAttribute` binds one resolved interval (top/bottom boundary or
//! top plus window length), one cube and an ordered set of calculation
//! kinds. Values are computed on demand and never cached; callers that read
//! more than once cache the result themselves.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CubeConfig;
use crate::cube::SeismicCube;
use crate::error::{Error, Result};
use crate::surface::RegularSurface;

/// Statistic kinds the windowed kernel knows how to compute
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CalcType {
    Rms,
    Mean,
    Min,
    Max,
}

impl CalcType {
    pub const ALL: [CalcType; 4] = [CalcType::Rms, CalcType::Mean, CalcType::Min, CalcType::Max];
}

impl fmt::Display for CalcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcType::Rms => write!(f, "rms"),
            CalcType::Mean => write!(f, "mean"),
            CalcType::Min => write!(f, "min"),
            CalcType::Max => write!(f, "max"),
        }
    }
}

impl FromStr for CalcType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rms" => Ok(CalcType::Rms),
            "mean" => Ok(CalcType::Mean),
            "min" => Ok(CalcType::Min),
            "max" => Ok(CalcType::Max),
            _ => Err(Error::InvalidName(s.to_string())),
        }
    }
}

/// One ready-to-evaluate attribute computation unit
///
/// Shares its surfaces with the resolution cache and its cube with the cube
/// dictionary; it owns neither. Exactly one of `bottom_surface` or
/// `window_length` must be supplied at construction. With a window length
/// the bottom boundary is derived from the shifted top and the bottom shift
/// is forced to zero (the window is measured from the shifted top).
#[derive(Clone, Debug)]
pub struct SeismicAttribute {
    surface: Rc<RegularSurface>,
    bottom_surface: Rc<RegularSurface>,
    window_length: Option<f64>,
    top_surface_shift: f64,
    bottom_surface_shift: f64,
    calc_types: Vec<CalcType>,
    scale_factor: f64,
    from_cube: Rc<SeismicCube>,
    info: CubeConfig,
}

impl SeismicAttribute {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        surface: Rc<RegularSurface>,
        bottom_surface: Option<Rc<RegularSurface>>,
        window_length: Option<f64>,
        top_surface_shift: f64,
        bottom_surface_shift: f64,
        calc_types: Vec<CalcType>,
        scale_factor: f64,
        from_cube: Rc<SeismicCube>,
        info: CubeConfig,
    ) -> Result<Self> {
        let (bottom_surface, bottom_surface_shift) = match (bottom_surface, window_length) {
            // Window length wins over any supplied bottom surface
            (_, Some(length)) => {
                let derived = &*surface + top_surface_shift + length;
                (Rc::new(derived), 0.0)
            }
            (Some(bottom), None) => (bottom, bottom_surface_shift),
            (None, None) => return Err(Error::MissingBottomSurfaceOrWindow),
        };

        Ok(SeismicAttribute {
            surface,
            bottom_surface,
            window_length,
            top_surface_shift,
            bottom_surface_shift,
            calc_types,
            scale_factor,
            from_cube,
            info,
        })
    }

    /// Top boundary surface
    pub fn surface(&self) -> &Rc<RegularSurface> {
        &self.surface
    }

    /// Bottom boundary surface (derived when a window length was given)
    pub fn bottom_surface(&self) -> &Rc<RegularSurface> {
        &self.bottom_surface
    }

    pub fn window_length(&self) -> Option<f64> {
        self.window_length
    }

    pub fn top_surface_shift(&self) -> f64 {
        self.top_surface_shift
    }

    pub fn bottom_surface_shift(&self) -> f64 {
        self.bottom_surface_shift
    }

    pub fn calc_types(&self) -> &[CalcType] {
        &self.calc_types
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn from_cube(&self) -> &Rc<SeismicCube> {
        &self.from_cube
    }

    /// Owning cube configuration, used for export naming
    pub fn info(&self) -> &CubeConfig {
        &self.info
    }

    /// Compute one scaled attribute map per calculation kind, in declared
    /// order
    ///
    /// Recomputed on every call; boundary shifts are applied to shared
    /// surfaces without mutating them.
    pub fn value(&self) -> Vec<RegularSurface> {
        let top = &*self.surface + self.top_surface_shift;
        let bottom = &*self.bottom_surface + self.bottom_surface_shift;
        let computed = self.from_cube.cube().compute_attributes_in_window(&top, &bottom);
        self.calc_types
            .iter()
            .map(|calc_type| &computed[calc_type] * self.scale_factor)
            .collect()
    }
}
