use crate::config::Settings;
use crate::io::netcdf::VariableMeta;
use ndarray::{Array2, Zip};
use std::path::Path;

// Extra processing applied to a layer after regridding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostProcess {
    None,
    GlacierMask,
}

/// One `(Y, X)` layer of the static-data file: where it comes from and how
/// it is described. `source` yields `None` when the layer is disabled.
pub struct LayerSpec {
    pub meta: VariableMeta,
    pub source: fn(&Settings) -> Option<&Path>,
    pub post: PostProcess,
}

pub enum Step {
    Grid(LayerSpec),
    PivotTable,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Grid(layer) => layer.meta.name,
            Step::PivotTable => "PivotTable",
        }
    }
}

// Written in this order after Terrain
pub const STEPS: &[Step] = &[
    Step::Grid(LayerSpec {
        meta: VariableMeta {
            name: "Thickness",
            long_name: "Thickness",
            standard_name: "Thickness",
            units: "m",
        },
        source: |s| s.glacier_thickness.as_deref(),
        post: PostProcess::None,
    }),
    Step::Grid(LayerSpec {
        meta: VariableMeta {
            name: "GlacierID",
            long_name: "Glacier_ID",
            standard_name: "Glacier_ID",
            units: "-",
        },
        source: |s| s.glacier_id.as_deref(),
        post: PostProcess::None,
    }),
    Step::PivotTable,
    Step::Grid(LayerSpec {
        meta: VariableMeta {
            name: "AreaCell",
            long_name: "AreaCell",
            standard_name: "AreaCell",
            units: "m^2",
        },
        source: |s| Some(s.area_cell.as_path()),
        post: PostProcess::None,
    }),
    Step::Grid(LayerSpec {
        meta: VariableMeta {
            name: "Mask",
            long_name: "Mask",
            standard_name: "Mask",
            units: "-",
        },
        source: |s| s.domain_mask.as_deref(),
        post: PostProcess::None,
    }),
    Step::Grid(LayerSpec {
        meta: VariableMeta {
            name: "GlacierMask",
            long_name: "GlacierMask",
            standard_name: "GlacierMask",
            units: "-",
        },
        source: |s| Some(s.glacier_mask.as_path()),
        post: PostProcess::GlacierMask,
    }),
    Step::Grid(LayerSpec {
        meta: VariableMeta {
            name: "GlacierDebris",
            long_name: "Glacier_debris",
            standard_name: "Glacier_debris",
            units: "-",
        },
        source: |s| s.glacier_debris.as_deref(),
        post: PostProcess::None,
    }),
];

/// Turns a glacier classification grid into a binary mask on the DEM grid.
///
/// Values are rounded half-to-even to drop resampling noise, cells equal to
/// `glacier_value` become 1 and all others 0. Wherever the DEM holds its own
/// sentinel `dem_nodata` the mask holds `nodata`, so both share the same
/// footprint.
pub fn binarize_glacier_mask(
    mask: &Array2<f64>,
    dem: &Array2<f64>,
    glacier_value: f64,
    dem_nodata: f64,
    nodata: f64,
) -> Array2<f64> {
    Zip::from(mask).and(dem).map_collect(|&m, &z| {
        if z == dem_nodata {
            nodata
        } else if m.round_ties_even() == glacier_value {
            1.0
        } else {
            0.0
        }
    })
}
