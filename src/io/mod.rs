pub mod compress;
pub mod netcdf;
pub mod pivot;
pub mod raster;
