//! CSV loading into [`Dataset`]s

use super::Dataset;
use crate::error::{NestError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Load a CSV file with a header row
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(NestError::DataError(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded CSV");
    Ok(df)
}

/// Parse CSV content held in memory (used for the bundled datasets)
pub fn load_csv_bytes(bytes: &'static [u8]) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    Ok(df)
}

/// Convert a DataFrame into a dataset, using every column but `target` as a feature
pub fn dataframe_to_dataset(name: &str, df: &DataFrame, target: &str) -> Result<Dataset> {
    let feature_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|col| col.as_str() != target)
        .map(|col| col.to_string())
        .collect();

    if feature_names.is_empty() {
        return Err(NestError::DataError(
            "dataset has no feature columns".to_string(),
        ));
    }

    let y = Array1::from_vec(column_as_f64(df, target)?);
    let x = columns_to_array2(df, &feature_names)?;

    Dataset::new(name, feature_names, target, x, y)
}

fn column_as_f64(df: &DataFrame, col_name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(col_name)
        .map_err(|_| NestError::FeatureNotFound(col_name.to_string()))?;
    let column_f64 = column.cast(&DataType::Float64)?;

    column_f64
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                NestError::DataError(format!("missing value in column '{}' at row {}", col_name, row))
            })
        })
        .collect()
}

/// Extract named columns into a row-major Array2<f64>
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| column_as_f64(df, name))
        .collect::<Result<_>>()?;

    Ok(Array2::from_shape_fn((n_rows, col_names.len()), |(r, c)| col_data[c][r]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_csv(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        write!(file, "{}", body).unwrap();
        file
    }

    #[test]
    fn test_load_csv_to_dataset() {
        let file = create_test_csv("a,b,label\n1.0,2.0,0\n3.0,4.0,1\n5.0,6.0,1\n");
        let df = load_csv(file.path()).unwrap();
        let ds = dataframe_to_dataset("tmp", &df, "label").unwrap();

        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.feature_names, vec!["a", "b"]);
        assert_eq!(ds.x[[1, 1]], 4.0);
        assert_eq!(ds.y[2], 1.0);
    }

    #[test]
    fn test_missing_target_column() {
        let file = create_test_csv("a,b\n1,2\n3,4\n");
        let df = load_csv(file.path()).unwrap();
        let err = dataframe_to_dataset("tmp", &df, "label").unwrap_err();
        assert!(matches!(err, NestError::FeatureNotFound(_)));
    }

    #[test]
    fn test_null_values_rejected() {
        let file = create_test_csv("a,label\n1.0,0\n,1\n");
        let df = load_csv(file.path()).unwrap();
        assert!(dataframe_to_dataset("tmp", &df, "label").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, NestError::DataError(_)));
    }
}
