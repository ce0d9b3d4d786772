//! Seismic cube containers
//!
//! `Cube` is the raw regularly-sampled 3D volume plus the windowed-statistic
//! kernel the attribute engine calls into. `SingleSeismic` wraps one cube
//! with its identity and survey date; `DifferenceSeismic` derives a 4D
//! difference volume from two single vintages on demand.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::attribute::CalcType;
use crate::error::Result;
use crate::identity::{SeismicDate, SeismicName};
use crate::surface::RegularSurface;

/// Cubes available to the resolution engine, keyed by identity and in
/// discovery order
pub type CubeMap = IndexMap<SeismicName, Rc<SeismicCube>>;

/// 3D regularly sampled seismic volume
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub ncol: usize,
    pub nrow: usize,
    pub nlay: usize,
    pub xori: f64,
    pub yori: f64,
    pub zori: f64,
    pub xinc: f64,
    pub yinc: f64,
    pub zinc: f64,
    /// Sample values, shape `(ncol, nrow, nlay)`
    pub values: Array3<f32>,
}

impl Cube {
    pub fn new(ncol: usize, nrow: usize, nlay: usize, xinc: f64, yinc: f64, zinc: f64) -> Self {
        Cube {
            ncol,
            nrow,
            nlay,
            xori: 0.0,
            yori: 0.0,
            zori: 0.0,
            xinc,
            yinc,
            zinc,
            values: Array3::zeros((ncol, nrow, nlay)),
        }
    }

    /// Load a cube from its binary container file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(bincode::deserialize_from(BufReader::new(file))?)
    }

    /// Write the cube to a binary container file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Compute every known statistic over the interval between two surfaces
    ///
    /// For each lateral column, the samples whose depth (or time) falls
    /// within the boundaries are gathered and reduced once per calculation
    /// kind. Boundary ordering is not assumed; the window is the closed
    /// span between the two values. Columns with undefined boundaries or an
    /// empty window come out as NaN. The returned map always carries every
    /// [`CalcType`].
    pub fn compute_attributes_in_window(
        &self,
        top: &RegularSurface,
        base: &RegularSurface,
    ) -> IndexMap<CalcType, RegularSurface> {
        let shape = (self.ncol, self.nrow);
        let mut rms = Array2::from_elem(shape, f64::NAN);
        let mut mean = Array2::from_elem(shape, f64::NAN);
        let mut min = Array2::from_elem(shape, f64::NAN);
        let mut max = Array2::from_elem(shape, f64::NAN);

        for col in 0..self.ncol {
            for row in 0..self.nrow {
                let (Some(top_z), Some(base_z)) = (top.value_at(col, row), base.value_at(col, row))
                else {
                    continue;
                };
                if !top_z.is_finite() || !base_z.is_finite() {
                    continue;
                }
                let (z0, z1) = if top_z <= base_z {
                    (top_z, base_z)
                } else {
                    (base_z, top_z)
                };

                let mut count = 0usize;
                let mut sum = 0.0;
                let mut sum_sq = 0.0;
                let mut lo = f64::INFINITY;
                let mut hi = f64::NEG_INFINITY;
                for lay in 0..self.nlay {
                    let z = self.zori + lay as f64 * self.zinc;
                    if z < z0 || z > z1 {
                        continue;
                    }
                    let sample = f64::from(self.values[[col, row, lay]]);
                    count += 1;
                    sum += sample;
                    sum_sq += sample * sample;
                    lo = lo.min(sample);
                    hi = hi.max(sample);
                }
                if count == 0 {
                    continue;
                }
                let n = count as f64;
                rms[[col, row]] = (sum_sq / n).sqrt();
                mean[[col, row]] = sum / n;
                min[[col, row]] = lo;
                max[[col, row]] = hi;
            }
        }

        IndexMap::from([
            (CalcType::Rms, self.result_surface(CalcType::Rms, rms)),
            (CalcType::Mean, self.result_surface(CalcType::Mean, mean)),
            (CalcType::Min, self.result_surface(CalcType::Min, min)),
            (CalcType::Max, self.result_surface(CalcType::Max, max)),
        ])
    }

    fn result_surface(&self, calc_type: CalcType, values: Array2<f64>) -> RegularSurface {
        RegularSurface {
            name: calc_type.to_string(),
            ncol: self.ncol,
            nrow: self.nrow,
            xori: self.xori,
            yori: self.yori,
            xinc: self.xinc,
            yinc: self.yinc,
            values,
        }
    }
}

/// One seismic vintage: a raw cube with its identity and survey date
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SingleSeismic {
    pub from_dir: PathBuf,
    pub cube_name: SeismicName,
    pub date: SeismicDate,
    pub cube: Cube,
}

impl SingleSeismic {
    pub fn new(from_dir: PathBuf, cube_name: SeismicName, date: SeismicDate, cube: Cube) -> Self {
        SingleSeismic {
            from_dir,
            cube_name,
            date,
            cube,
        }
    }

    /// Monitor half of a differenced date, `None` for a single vintage
    pub fn monitor_date(&self) -> Option<String> {
        self.date.monitor_date()
    }

    /// Base half of a differenced date, `None` for a single vintage
    pub fn base_date(&self) -> Option<String> {
        self.date.base_date()
    }
}

/// Difference between two vintages of the same cube type
///
/// The composite date and the difference volume are derived from the two
/// members on every access, so they always reflect current contents.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DifferenceSeismic {
    pub base: SingleSeismic,
    pub monitor: SingleSeismic,
}

impl DifferenceSeismic {
    pub fn new(base: SingleSeismic, monitor: SingleSeismic) -> Self {
        DifferenceSeismic { base, monitor }
    }

    /// Composite monitor_base date token
    pub fn date(&self) -> String {
        format!("{}_{}", self.monitor.date, self.base.date)
    }

    pub fn monitor_date(&self) -> String {
        self.monitor.date.to_string()
    }

    pub fn base_date(&self) -> String {
        self.base.date.to_string()
    }

    /// Element-wise difference volume, monitor minus base
    ///
    /// Both member cubes must share the same geometry.
    pub fn cube(&self) -> Cube {
        let mut cube = self.monitor.cube.clone();
        cube.values = &self.monitor.cube.values - &self.base.cube.values;
        cube
    }
}

/// Either a single vintage or a derived difference cube
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SeismicCube {
    Single(SingleSeismic),
    Difference(DifferenceSeismic),
}

impl SeismicCube {
    /// Identity of the cube (the monitor member for a difference)
    pub fn name(&self) -> &SeismicName {
        match self {
            SeismicCube::Single(single) => &single.cube_name,
            SeismicCube::Difference(diff) => &diff.monitor.cube_name,
        }
    }

    /// Date token: the vintage date, or monitor_base for a difference
    pub fn date(&self) -> String {
        match self {
            SeismicCube::Single(single) => single.date.to_string(),
            SeismicCube::Difference(diff) => diff.date(),
        }
    }

    /// The raw volume: borrowed for a vintage, derived for a difference
    pub fn cube(&self) -> Cow<'_, Cube> {
        match self {
            SeismicCube::Single(single) => Cow::Borrowed(&single.cube),
            SeismicCube::Difference(diff) => Cow::Owned(diff.cube()),
        }
    }
}
