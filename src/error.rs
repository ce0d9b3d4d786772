//! Error taxonomy for attribute resolution
//!
//! Fatal conditions (configuration, resource, construction) are all variants
//! of one enum so the top-level invocation can produce a single clean
//! failure report. Soft conflicts are emitted through `tracing` instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::attribute::CalcType;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "in cube '{cube}', formation '{formation}', attribute '{attribute}': \
         'top_horizon' is required; specify it at the formation level or in \
         the attribute-specific override"
    )]
    MissingTopHorizon {
        cube: String,
        formation: String,
        attribute: CalcType,
    },

    #[error(
        "in cube '{cube}', formation '{formation}', attribute '{attribute}': \
         either 'bottom_horizon' or 'window_length' must be specified"
    )]
    MissingBottomBoundary {
        cube: String,
        formation: String,
        attribute: CalcType,
    },

    #[error("surface file not found: {}", .path.display())]
    SurfaceNotFound { path: PathBuf },

    #[error("No attributes generated. Please check configuration settings.")]
    NoAttributesGenerated,

    #[error("Must specify either 'bottom_surface' or 'window_length'!")]
    MissingBottomSurfaceOrWindow,

    #[error("invalid seismic date '{date}': {reason}")]
    InvalidDate { date: String, reason: String },

    #[error("cannot parse seismic name '{0}'")]
    InvalidName(String),

    #[error("no '{base_date}' base vintage matching monitor cube '{monitor}'")]
    MissingBaseVintage { monitor: String, base_date: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("serialization error: {0}")]
    Encode(#[from] bincode::Error),
}
