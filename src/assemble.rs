use crate::config::Settings;
use crate::error::{PrepError, WriteError};
use crate::io::compress::gzip_in_place;
use crate::io::netcdf::StaticDataFile;
use crate::io::pivot::read_pivot_table;
use crate::io::raster::read_raster;
use crate::layers::{LayerSpec, PostProcess, STEPS, Step, binarize_glacier_mask};
use crate::raster::{Raster, flip_rows};
use crate::regrid::{RegridHook, regrid_with_hook};
use indicatif::ProgressBar;
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Builds the static-data file described by `settings` and returns the path
/// of the finished (possibly gzipped) file. The first error aborts the run.
pub fn run(
    settings: &Settings,
    hook: &dyn RegridHook,
    pb: &ProgressBar,
) -> Result<PathBuf, PrepError> {
    info!("Loading DEM {}", settings.dem.display());
    let dem = read_raster(&settings.dem)?;
    info!(
        rows = dem.nrows(),
        cols = dem.ncols(),
        xllcorner = dem.bb_left,
        yllcorner = dem.bb_bottom,
        cellsize = dem.res_lon,
        "DEM grid"
    );
    if let Some(sentinel) = dem.nodata.filter(|&v| v != settings.nodata_value) {
        warn!(
            "DEM no-data value {} differs from nodata_value {}; DEM voids are written as {}",
            sentinel, settings.nodata_value, settings.nodata_value
        );
    }

    std::fs::create_dir_all(&settings.output_dir).map_err(|source| WriteError::Io {
        path: settings.output_dir.clone(),
        source,
    })?;
    let mut out = StaticDataFile::create(&settings.output_file(), &dem, &settings.global_meta())?;
    info!("Writing {}", out.path().display());

    pb.set_length(STEPS.len() as u64);
    for step in STEPS {
        pb.set_message(step.name());
        match step {
            Step::Grid(layer) => match (layer.source)(settings) {
                Some(path) => {
                    let values = prepare_layer(layer, path, &dem, settings, hook)?;
                    out.write_grid(&layer.meta, &flip_rows(&values))?;
                    info!("{} written", layer.meta.name);
                }
                None => debug!("{} disabled", layer.meta.name),
            },
            Step::PivotTable => match &settings.pivot_table {
                Some(path) => {
                    let table = read_pivot_table(path)?;
                    out.write_pivot_table(&table)?;
                    info!(shape = ?table.dim(), "PivotTable written");
                }
                None => debug!("PivotTable disabled"),
            },
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let nc_path = out.close();
    if !settings.compress_output {
        return Ok(nc_path);
    }

    match gzip_in_place(&nc_path) {
        Ok(gz_path) => Ok(gz_path),
        Err(e) => {
            warn!("Compression of {} failed: {}", nc_path.display(), e);
            Ok(nc_path)
        }
    }
}

// Load, regrid onto the DEM if requested, check the grid and post-process
fn prepare_layer(
    layer: &LayerSpec,
    path: &Path,
    dem: &Raster,
    settings: &Settings,
    hook: &dyn RegridHook,
) -> Result<Array2<f64>, PrepError> {
    let name = layer.meta.name;
    debug!("Loading {} from {}", name, path.display());
    let mut raster = read_raster(path)?;

    if settings.regrid_on_dem {
        debug!("Regridding {} onto the DEM", name);
        raster = regrid_with_hook(&raster, dem, hook).map_err(|source| PrepError::Regrid {
            layer: name.to_string(),
            source,
        })?;
    }

    if raster.shape() != dem.shape() {
        return Err(PrepError::ShapeMismatch {
            layer: name.to_string(),
            expected: dem.shape(),
            found: raster.shape(),
        });
    }

    Ok(match layer.post {
        PostProcess::None => raster.values,
        PostProcess::GlacierMask => binarize_glacier_mask(
            &raster.values,
            &dem.values,
            settings.glacier_value,
            dem.nodata.unwrap_or(settings.nodata_value),
            settings.nodata_value,
        ),
    })
}
