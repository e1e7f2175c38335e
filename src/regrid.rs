use kd_tree::KdTree2;
use ndarray::Array2;
use ordered_float::OrderedFloat;
use tracing::{debug, info};

use crate::error::RegridError;
use crate::raster::Raster;

/// Observer invoked with every freshly regridded raster.
pub trait RegridHook {
    fn on_regridded(&self, raster: &Raster);
}

pub struct NoopHook;

impl RegridHook for NoopHook {
    fn on_regridded(&self, _raster: &Raster) {}
}

// Logs shape and value range of the resampled grid
pub struct SummaryHook;

impl RegridHook for SummaryHook {
    fn on_regridded(&self, raster: &Raster) {
        let (min, max) = raster
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        info!(
            rows = raster.nrows(),
            cols = raster.ncols(),
            min,
            max,
            "regridded raster"
        );
    }
}

pub fn regrid(source: &Raster, target: &Raster) -> Result<Raster, RegridError> {
    regrid_with_hook(source, target, &NoopHook)
}

/// Nearest-neighbor resampling of `source` onto the coordinate grid of
/// `target`. Only the target's coordinates are read, never its values.
///
/// Source samples are indexed in a 2-d k-d tree so each target cell costs a
/// logarithmic lookup. Samples whose coordinates are not finite are skipped.
pub fn regrid_with_hook(
    source: &Raster,
    target: &Raster,
    hook: &dyn RegridHook,
) -> Result<Raster, RegridError> {
    if source.longitude.is_empty() || source.latitude.is_empty() {
        return Err(RegridError::EmptyGrid("source"));
    }
    if target.longitude.is_empty() || target.latitude.is_empty() {
        return Err(RegridError::EmptyGrid("target"));
    }

    let samples: Vec<([f64; 2], f64)> = source
        .longitude
        .iter()
        .zip(source.latitude.iter())
        .zip(source.values.iter())
        .filter(|((lon, lat), _)| lon.is_finite() && lat.is_finite())
        .map(|((&lon, &lat), &value)| ([lon, lat], value))
        .collect();

    if samples.is_empty() {
        return Err(RegridError::NoValidSamples);
    }
    debug!(
        samples = samples.len(),
        targets = target.longitude.len(),
        "building nearest-neighbor index"
    );

    let kdtree = KdTree2::build_by_key(samples, |item, k| OrderedFloat(item.0[k]));

    let shape = target.longitude.dim();
    let mut values = Array2::<f64>::zeros(shape);
    for ((cell, &lon), &lat) in values
        .iter_mut()
        .zip(target.longitude.iter())
        .zip(target.latitude.iter())
    {
        // A non-empty tree always has a nearest item
        *cell = kdtree
            .nearest_by(&[lon, lat], |item, k| item.0[k])
            .map_or(f64::NAN, |nearest| nearest.item.1);
    }

    let regridded = Raster {
        values,
        longitude: target.longitude.clone(),
        latitude: target.latitude.clone(),
        bb_left: target.bb_left,
        bb_bottom: target.bb_bottom,
        res_lon: target.res_lon,
        nodata: source.nodata,
    };
    hook.on_regridded(&regridded);

    Ok(regridded)
}
