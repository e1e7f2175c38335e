//! Error types for the static-data preparation run.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("setting `{0}` must not be empty")]
    Empty(&'static str),

    #[error("setting `{flag}` is enabled but `{key}` is missing")]
    MissingLayerName {
        flag: &'static str,
        key: &'static str,
    },

    #[error("setting `{key}` is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failures while reading a raster file.
#[derive(Error, Debug)]
pub enum RasterLoadError {
    #[error("GDAL could not read {path:?}: {source}")]
    Gdal {
        path: PathBuf,
        source: gdal::errors::GdalError,
    },

    #[error("bad raster georeferencing in {path:?}: {reason}")]
    Header { path: PathBuf, reason: String },

    #[error("bad raster body in {path:?}: {reason}")]
    Body { path: PathBuf, reason: String },

    #[error(
        "raster grids disagree: values {values:?}, longitude {longitude:?}, latitude {latitude:?}"
    )]
    InconsistentShape {
        values: (usize, usize),
        longitude: (usize, usize),
        latitude: (usize, usize),
    },
}

/// Failures of the nearest-neighbor regridder.
#[derive(Error, Debug, PartialEq)]
pub enum RegridError {
    #[error("{0} coordinate grid is empty")]
    EmptyGrid(&'static str),

    #[error("source raster has no samples with finite coordinates")]
    NoValidSamples,
}

/// Failures while writing the output container or its inputs.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("netCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("attribute `{name}`: {reason}")]
    Attribute { name: &'static str, reason: String },

    #[error("pivot table {path:?}: {reason}")]
    PivotTable { path: PathBuf, reason: String },
}

/// Run-level error; the first one aborts the run.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    RasterLoad(#[from] RasterLoadError),

    #[error("regridding {layer} failed: {source}")]
    Regrid { layer: String, source: RegridError },

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("layer {layer} has shape {found:?} but the DEM grid is {expected:?}")]
    ShapeMismatch {
        layer: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
}
