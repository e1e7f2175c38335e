use ndarray::{Array2, s};

use crate::error::RasterLoadError;

// In-memory raster with cell-centre coordinates; row 0 is the northern edge
#[derive(Debug, Clone)]
pub struct Raster {
    pub values: Array2<f64>,
    pub longitude: Array2<f64>,
    pub latitude: Array2<f64>,
    pub bb_left: f64,
    pub bb_bottom: f64,
    pub res_lon: f64,
    pub nodata: Option<f64>,
}

impl Raster {
    pub fn new(
        values: Array2<f64>,
        longitude: Array2<f64>,
        latitude: Array2<f64>,
        bb_left: f64,
        bb_bottom: f64,
        res_lon: f64,
        nodata: Option<f64>,
    ) -> Result<Self, RasterLoadError> {
        if values.dim() != longitude.dim() || values.dim() != latitude.dim() {
            return Err(RasterLoadError::InconsistentShape {
                values: values.dim(),
                longitude: longitude.dim(),
                latitude: latitude.dim(),
            });
        }

        Ok(Raster {
            values,
            longitude,
            latitude,
            bb_left,
            bb_bottom,
            res_lon,
            nodata,
        })
    }

    /// Builds a north-up raster on a regular grid whose lower-left corner is
    /// `(bb_left, bb_bottom)` and whose cells are `res` wide and tall.
    pub fn from_geometry(
        values: Array2<f64>,
        bb_left: f64,
        bb_bottom: f64,
        res: f64,
        nodata: Option<f64>,
    ) -> Self {
        let (nrows, ncols) = values.dim();
        let top = bb_bottom + nrows as f64 * res;

        let longitude =
            Array2::from_shape_fn((nrows, ncols), |(_, c)| bb_left + (c as f64 + 0.5) * res);
        let latitude =
            Array2::from_shape_fn((nrows, ncols), |(r, _)| top - (r as f64 + 0.5) * res);

        Raster {
            values,
            longitude,
            latitude,
            bb_left,
            bb_bottom,
            res_lon: res,
            nodata,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn bb_right(&self) -> f64 {
        self.bb_left + self.ncols() as f64 * self.res_lon
    }

    pub fn bb_top(&self) -> f64 {
        self.bb_bottom + self.nrows() as f64 * self.res_lon
    }
}

/// Reverses row order, turning a north-up grid into the south-up layout of
/// the output container.
pub fn flip_rows(grid: &Array2<f64>) -> Array2<f64> {
    grid.slice(s![..;-1, ..]).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn geometry_places_cell_centres() {
        let raster = Raster::from_geometry(Array2::zeros((2, 3)), 10.0, 40.0, 0.5, None);

        assert_relative_eq!(raster.longitude[[0, 0]], 10.25);
        assert_relative_eq!(raster.longitude[[1, 2]], 11.25);
        assert_relative_eq!(raster.latitude[[0, 1]], 40.75);
        assert_relative_eq!(raster.latitude[[1, 1]], 40.25);
        assert_relative_eq!(raster.bb_right(), 11.5);
        assert_relative_eq!(raster.bb_top(), 41.0);
    }

    #[test]
    fn new_rejects_mismatched_grids() {
        let result = Raster::new(
            Array2::zeros((2, 2)),
            Array2::zeros((2, 3)),
            Array2::zeros((2, 2)),
            0.0,
            0.0,
            1.0,
            None,
        );
        assert!(matches!(
            result,
            Err(RasterLoadError::InconsistentShape { .. })
        ));
    }

    #[test]
    fn flip_rows_reverses_only_rows() {
        let grid = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        assert_eq!(flip_rows(&grid), array![[5.0, 6.0], [3.0, 4.0], [1.0, 2.0]]);
    }
}
