use crate::error::WriteError;
use csv::ReaderBuilder;
use ndarray::Array2;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// Reads the headerless, tab-delimited delta-H table and returns it transposed:
// a file of N rows and M columns becomes an M x N array.
pub fn read_pivot_table(path: &Path) -> Result<Array2<f64>, WriteError> {
    let pivot_err = |reason: String| WriteError::PivotTable {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| pivot_err(e.to_string()))?;
        let row = record
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|e| {
                    pivot_err(format!("row {}: {:?} is not a number: {}", line + 1, field, e))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }

    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if nrows == 0 || ncols == 0 {
        return Err(pivot_err("table is empty".into()));
    }

    let table = Array2::from_shape_vec((nrows, ncols), rows.concat())
        .map_err(|e| pivot_err(e.to_string()))?;

    Ok(table.reversed_axes())
}
