use crate::error::WriteError;
use crate::raster::{Raster, flip_rows};
use chrono::Utc;
use ndarray::Array2;
use netcdf::{self, FileMut};
use std::path::{Path, PathBuf};
use tracing::debug;

// Descriptive attributes of one output variable
#[derive(Debug, Clone, Copy)]
pub struct VariableMeta {
    pub name: &'static str,
    pub long_name: &'static str,
    pub standard_name: &'static str,
    pub units: &'static str,
}

// Global attributes taken from the settings
#[derive(Debug, Clone)]
pub struct GlobalMeta {
    pub filename: String,
    pub domain: String,
    pub project: String,
    pub institution: String,
    pub website: String,
    pub comment: String,
    pub email: String,
    pub nodata_value: f64,
}

pub const TERRAIN: VariableMeta = VariableMeta {
    name: "Terrain",
    long_name: "Terrain",
    standard_name: "Terrain",
    units: "m asl",
};

pub const PIVOT_TABLE: VariableMeta = VariableMeta {
    name: "PivotTable",
    long_name: "PivotTable_DeltaH",
    standard_name: "PivotTable_DeltaH",
    units: "-",
};

/// The S3M static-data container, opened for writing on the DEM grid.
///
/// Grid variables are `f32` on `(Y, X)` and are expected south-up (row 0 at
/// the southern edge); callers flip north-up rasters before writing.
pub struct StaticDataFile {
    file: FileMut,
    path: PathBuf,
    shape: (usize, usize),
}

impl StaticDataFile {
    /// Creates the file, its dimensions, the `crs`, `Longitude`, `Latitude`
    /// and `Terrain` variables and every global attribute.
    pub fn create(path: &Path, dem: &Raster, meta: &GlobalMeta) -> Result<Self, WriteError> {
        let mut file = netcdf::create(path)?;
        let (nrows, ncols) = dem.shape();

        file.add_dimension("Y", nrows)?;
        file.add_dimension("X", ncols)?;
        file.add_dimension("time", 1)?;

        // Grid mapping
        let mut crs = file.add_variable::<i32>("crs", &["time"])?;
        crs.put_attribute(
            "bounding_box",
            vec![dem.bb_left, dem.bb_bottom, dem.bb_right(), dem.bb_top()],
        )?;
        crs.put_attribute("inverse_flattening", 298.2572)?;
        crs.put_attribute("longitude_of_prime_meridian", 0i32)?;
        crs.put_attribute("grid_mapping_name", "latitude_longitude")?;
        crs.put_attribute("semi_major_axis", 6378137i32)?;

        let mut lon_var = file.add_variable::<f64>("Longitude", &["Y", "X"])?;
        lon_var.put_attribute("long_name", "longitude coordinate")?;
        lon_var.put_attribute("standard_name", "longitude_grid")?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_attribute("scale_factor", 1i32)?;
        let lon: Vec<f64> = dem.longitude.iter().copied().collect();
        lon_var.put_values(&lon, ..)?;

        let mut lat_var = file.add_variable::<f64>("Latitude", &["Y", "X"])?;
        lat_var.put_attribute("long_name", "latitude coordinate")?;
        lat_var.put_attribute("standard_name", "latitude_grid")?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_attribute("scale_factor", 1i32)?;
        let lat: Vec<f64> = flip_rows(&dem.latitude).iter().copied().collect();
        lat_var.put_values(&lat, ..)?;

        // Global attributes
        file.add_attribute("filename", meta.filename.as_str())?;
        file.add_attribute("domainname", meta.domain.as_str())?;
        file.add_attribute("comment", meta.comment.as_str())?;
        file.add_attribute("project", meta.project.as_str())?;
        file.add_attribute("website", meta.website.as_str())?;
        file.add_attribute("institution", meta.institution.as_str())?;
        file.add_attribute("algorithm", "S3M")?;
        file.add_attribute("title", "S3M, Static Data")?;
        file.add_attribute("email", meta.email.as_str())?;
        file.add_attribute("xllcorner", dem.bb_left)?;
        file.add_attribute("yllcorner", dem.bb_bottom)?;
        file.add_attribute("cellsize", dem.res_lon)?;
        file.add_attribute("nodata_value", meta.nodata_value)?;
        file.add_attribute("nrows", grid_size("nrows", nrows)?)?;
        file.add_attribute("ncols", grid_size("ncols", ncols)?)?;
        file.add_attribute(
            "history",
            format!(
                "{} {}: created by {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_NAME")
            ),
        )?;

        let mut out = StaticDataFile {
            file,
            path: path.to_path_buf(),
            shape: (nrows, ncols),
        };
        out.write_grid(&TERRAIN, &flip_rows(&dem.values))?;
        Ok(out)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a south-up `(Y, X)` grid as an `f32` variable.
    pub fn write_grid(
        &mut self,
        meta: &VariableMeta,
        values: &Array2<f64>,
    ) -> Result<(), WriteError> {
        debug_assert_eq!(values.dim(), self.shape);
        self.write_variable(meta, &["Y", "X"], values)
    }

    /// Adds the `ROW_PIVOT`/`COL_PIVOT` dimensions sized to `table` and
    /// writes it as `PivotTable`.
    pub fn write_pivot_table(&mut self, table: &Array2<f64>) -> Result<(), WriteError> {
        let (rows, cols) = table.dim();
        self.file.add_dimension("ROW_PIVOT", rows)?;
        self.file.add_dimension("COL_PIVOT", cols)?;
        self.write_variable(&PIVOT_TABLE, &["ROW_PIVOT", "COL_PIVOT"], table)
    }

    fn write_variable(
        &mut self,
        meta: &VariableMeta,
        dims: &[&str],
        values: &Array2<f64>,
    ) -> Result<(), WriteError> {
        let mut var = self.file.add_variable::<f32>(meta.name, dims)?;
        var.put_attribute("grid_mapping", "")?;
        var.put_attribute("coordinates", "")?;
        var.put_attribute("cell_method", "")?;
        var.put_attribute("pressure_level", "")?;
        var.put_attribute("long_name", meta.long_name)?;
        var.put_attribute("standard_name", meta.standard_name)?;
        var.put_attribute("units", meta.units)?;
        var.put_attribute("scale_factor", 1i32)?;

        let data: Vec<f32> = values.iter().map(|&v| v as f32).collect();
        var.put_values(&data, ..)?;

        debug!(variable = meta.name, shape = ?values.dim(), "variable written");
        Ok(())
    }

    /// Flushes and closes the file, returning its path.
    pub fn close(self) -> PathBuf {
        let StaticDataFile { file, path, .. } = self;
        drop(file);
        path
    }
}

// Grid sizes are stored as 32-bit integer attributes
fn grid_size(name: &'static str, n: usize) -> Result<i32, WriteError> {
    i32::try_from(n).map_err(|e| WriteError::Attribute {
        name,
        reason: format!("{} does not fit in an i32: {}", n, e),
    })
}
