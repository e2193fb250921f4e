use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("lattice resolution must be at least 1 on every axis, got {nx}x{ny}x{nz}")]
    InvalidResolution { nx: usize, ny: usize, nz: usize },

    #[error("lattice of {nx}x{ny}x{nz} exceeds {max} points")]
    TooManyPoints {
        nx: usize,
        ny: usize,
        nz: usize,
        max: usize,
    },

    #[error("lattice extent must be finite and positive, got {0}")]
    InvalidExtent(f32),

    #[error("surface point {0:?} has no direction to derive a normal from")]
    DegenerateSurfacePoint([f32; 3]),
}

/// Errors raised while loading a model file
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("OBJ parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{0} contains no triangles")]
    Empty(PathBuf),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
