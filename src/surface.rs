//! Regular surface grids
//!
//! A horizon is a 2D regular grid of depth or time values delimiting a
//! geological boundary. Undefined nodes are NaN. Adding a scalar shifts the
//! whole surface vertically and multiplying scales every value, the two
//! operations the attribute engine applies to boundaries and results.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::ops::{Add, Mul};
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 2D regular grid of elevation or time values
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegularSurface {
    pub name: String,
    pub ncol: usize,
    pub nrow: usize,
    pub xori: f64,
    pub yori: f64,
    pub xinc: f64,
    pub yinc: f64,
    /// Node values, shape `(ncol, nrow)`; NaN marks undefined nodes
    pub values: Array2<f64>,
}

impl RegularSurface {
    /// Create a surface with all nodes at zero
    ///
    /// # Examples
    ///
    /// ```
    /// use seisattr::surface::RegularSurface;
    ///
    /// let surface = RegularSurface::new(10, 10, 25.0, 25.0);
    /// assert_eq!(surface.values[[0, 0]], 0.0);
    /// ```
    pub fn new(ncol: usize, nrow: usize, xinc: f64, yinc: f64) -> Self {
        RegularSurface {
            name: String::new(),
            ncol,
            nrow,
            xori: 0.0,
            yori: 0.0,
            xinc,
            yinc,
            values: Array2::zeros((ncol, nrow)),
        }
    }

    /// Create a surface with every node at a constant value
    pub fn constant(ncol: usize, nrow: usize, xinc: f64, yinc: f64, value: f64) -> Self {
        let mut surface = Self::new(ncol, nrow, xinc, yinc);
        surface.values.fill(value);
        surface
    }

    /// Load a surface from its binary container file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(bincode::deserialize_from(BufReader::new(file))?)
    }

    /// Write the surface to a binary container file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Node value at `(col, row)`, `None` outside the grid
    pub fn value_at(&self, col: usize, row: usize) -> Option<f64> {
        if col < self.ncol && row < self.nrow {
            Some(self.values[[col, row]])
        } else {
            None
        }
    }
}

impl Add<f64> for &RegularSurface {
    type Output = RegularSurface;

    fn add(self, shift: f64) -> RegularSurface {
        let mut out = self.clone();
        out.values += shift;
        out
    }
}

impl Add<f64> for RegularSurface {
    type Output = RegularSurface;

    fn add(mut self, shift: f64) -> RegularSurface {
        self.values += shift;
        self
    }
}

impl Mul<f64> for &RegularSurface {
    type Output = RegularSurface;

    fn mul(self, factor: f64) -> RegularSurface {
        let mut out = self.clone();
        out.values *= factor;
        out
    }
}

impl Mul<f64> for RegularSurface {
    type Output = RegularSurface;

    fn mul(mut self, factor: f64) -> RegularSurface {
        self.values *= factor;
        self
    }
}
