use crate::error::RasterLoadError;
use crate::raster::Raster;
use gdal::Dataset;
use ndarray::{Array2, s};
use std::path::Path;
use tracing::debug;

/// Reads band 1 of any GDAL-readable raster (ESRI ASCII grid, GeoTIFF, ...).
///
/// The grid must be axis-aligned with square cells. Rows are returned
/// north first whatever the on-disk orientation.
pub fn read_raster(path: &Path) -> Result<Raster, RasterLoadError> {
    let gdal_err = |source| RasterLoadError::Gdal {
        path: path.to_path_buf(),
        source,
    };
    let header_err = |reason: String| RasterLoadError::Header {
        path: path.to_path_buf(),
        reason,
    };

    let dataset = Dataset::open(path).map_err(gdal_err)?;
    let gt = dataset.geo_transform().map_err(gdal_err)?;
    let (ncols, nrows) = dataset.raster_size();
    debug!(path = %path.display(), ?gt, "geotransform");

    if gt[2] != 0.0 || gt[4] != 0.0 {
        return Err(header_err(format!(
            "rotated grids are not supported (terms {}, {})",
            gt[2], gt[4]
        )));
    }
    let (res_x, res_y) = (gt[1].abs(), gt[5].abs());
    if !(res_x > 0.0) || (res_x - res_y).abs() > res_x * 1e-6 {
        return Err(header_err(format!("cells must be square, got {} x {}", res_x, res_y)));
    }
    let count = cell_count(nrows, ncols).map_err(header_err)?;

    let band = dataset.rasterband(1).map_err(gdal_err)?;
    let nodata = band.no_data_value();
    let buffer = band
        .read_as::<f64>((0, 0), (ncols, nrows), (ncols, nrows), None)
        .map_err(gdal_err)?;
    if buffer.data.len() != count {
        return Err(RasterLoadError::Body {
            path: path.to_path_buf(),
            reason: format!("read {} values for a {}x{} grid", buffer.data.len(), nrows, ncols),
        });
    }
    let values = Array2::from_shape_vec((nrows, ncols), buffer.data).map_err(|e| {
        RasterLoadError::Body {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    // A positive row step means the first row is the southernmost
    let (values, bottom) = if gt[5] < 0.0 {
        (values, gt[3] + nrows as f64 * gt[5])
    } else {
        (values.slice(s![..;-1, ..]).to_owned(), gt[3])
    };
    let left = if gt[1] > 0.0 { gt[0] } else { gt[0] + ncols as f64 * gt[1] };
    let values = if gt[1] > 0.0 { values } else { values.slice(s![.., ..;-1]).to_owned() };

    let raster = Raster::from_geometry(values, left, bottom, res_x, nodata);
    debug!(
        path = %path.display(),
        rows = raster.nrows(),
        cols = raster.ncols(),
        cellsize = raster.res_lon,
        nodata = ?raster.nodata,
        "raster loaded"
    );
    Ok(raster)
}

fn cell_count(nrows: usize, ncols: usize) -> Result<usize, String> {
    nrows
        .checked_mul(ncols)
        .ok_or_else(|| format!("a {}x{} grid does not fit in memory", nrows, ncols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use tempfile::{TempDir, tempdir};

    const GRID: &str = "ncols 3
nrows 2
xllcorner 7.0
yllcorner 44.0
cellsize 0.5
NODATA_value -9999
1 2 3
4 -9999 6
";

    fn write(name: &str, content: &str) -> (TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_ascii_grid_with_nodata() {
        let (_dir, path) = write("dem.asc", GRID);

        let raster = read_raster(&path).unwrap();

        assert_eq!(raster.values, array![[1.0, 2.0, 3.0], [4.0, -9999.0, 6.0]]);
        assert_eq!(raster.nodata, Some(-9999.0));
        assert_relative_eq!(raster.bb_left, 7.0);
        assert_relative_eq!(raster.bb_bottom, 44.0);
        assert_relative_eq!(raster.res_lon, 0.5);
        assert_relative_eq!(raster.latitude[[0, 0]], 44.75);
        assert_relative_eq!(raster.latitude[[1, 0]], 44.25);
        assert_relative_eq!(raster.longitude[[0, 2]], 8.25);
    }

    #[test]
    fn driver_is_chosen_by_content_not_extension() {
        let (_dir, path) = write("dem.txt", GRID);
        assert_eq!(read_raster(&path).unwrap().shape(), (2, 3));
    }

    #[test]
    fn grid_without_sentinel_has_no_nodata() {
        let (_dir, path) = write("dem.asc", &GRID.replace("NODATA_value -9999\n", ""));
        assert_eq!(read_raster(&path).unwrap().nodata, None);
    }

    #[test]
    fn centre_origin_places_cell_centres_on_the_origin() {
        let content = "ncols 2\nnrows 1\nxllcenter 1.0\nyllcenter 2.0\ncellsize 2.0\n5 6\n";
        let (_dir, path) = write("centre.asc", content);

        let raster = read_raster(&path).unwrap();

        assert_relative_eq!(raster.bb_left, 0.0);
        assert_relative_eq!(raster.bb_bottom, 1.0);
        assert_relative_eq!(raster.longitude[[0, 0]], 1.0);
        assert_relative_eq!(raster.latitude[[0, 0]], 2.0);
    }

    #[test]
    fn non_square_cells_are_rejected() {
        let content = GRID.replace("cellsize 0.5", "dx 0.5\ndy 0.25");
        let (_dir, path) = write("rect.asc", &content);

        assert!(matches!(
            read_raster(&path),
            Err(RasterLoadError::Header { .. })
        ));
    }

    #[test]
    fn missing_or_unreadable_files_are_reported() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_raster(&dir.path().join("missing.asc")),
            Err(RasterLoadError::Gdal { .. })
        ));

        let (_dir, path) = write("junk.asc", "not a raster\n");
        assert!(read_raster(&path).is_err());
    }

    #[test]
    fn oversized_header_is_an_error() {
        let content = "ncols 10000000000\nnrows 10000000000\nxllcorner 0\nyllcorner 0\n\
                       cellsize 1\n1 2 3\n";
        let (_dir, path) = write("huge.asc", content);

        assert!(read_raster(&path).is_err());
    }

    #[test]
    fn cell_count_detects_overflow() {
        assert_eq!(cell_count(2, 3), Ok(6));
        assert!(cell_count(usize::MAX, 2).is_err());
    }
}
