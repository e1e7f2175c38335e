//! Preparation of the static-data NetCDF file for the S3M snow and glacier
//! model: a DEM plus auxiliary layers, optionally regridded onto the DEM grid
//! by nearest neighbor.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod layers;
pub mod raster;
pub mod regrid;
