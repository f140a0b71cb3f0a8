//!
//! JSON input/output of weight matrices and decode results
//!
//! A weight file is a JSON object
//!
//! ```text
//! {
//!   "weights": [[w00, w01, ...], [w10, ...], ...],
//!   "mod_weights": [[...], ...]          (optional)
//! }
//! ```
//!
//! with one row per block.
//!
use crate::error::{FlipFlopError, Result};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsFile {
    pub weights: Vec<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_weights: Option<Vec<Vec<f32>>>,
}

impl WeightsFile {
    pub fn new(weights: ArrayView2<f32>) -> Self {
        WeightsFile {
            weights: to_rows(weights),
            mod_weights: None,
        }
    }
    pub fn with_mod_weights(mut self, mod_weights: ArrayView2<f32>) -> Self {
        self.mod_weights = Some(to_rows(mod_weights));
        self
    }
    pub fn weights(&self) -> Result<Array2<f32>> {
        from_rows(&self.weights)
    }
    pub fn mod_weights(&self) -> Result<Option<Array2<f32>>> {
        self.mod_weights.as_ref().map(|rows| from_rows(rows)).transpose()
    }
}

///
/// Convert a list of rows into a matrix. Rows must have equal length.
///
pub fn from_rows(rows: &[Vec<f32>]) -> Result<Array2<f32>> {
    let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(FlipFlopError::ShapeMismatch(format!(
            "row {} has {} columns, row 0 has {}",
            i,
            row.len(),
            n_cols
        )));
    }
    if let Some(x) = rows.iter().flatten().find(|x| !x.is_finite()) {
        return Err(FlipFlopError::ShapeMismatch(format!(
            "weights must be finite, found {}",
            x
        )));
    }
    let data: Vec<f32> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), n_cols), data)
        .map_err(|e| FlipFlopError::ShapeMismatch(e.to_string()))
}

pub fn to_rows(m: ArrayView2<f32>) -> Vec<Vec<f32>> {
    m.outer_iter().map(|row| row.to_vec()).collect()
}

///
/// Load a weight file
///
pub fn read_weights_file<P: AsRef<Path>>(path: P) -> Result<WeightsFile> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

///
/// Write any serializable value as a single line of JSON
///
pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flipflop::mocks::mock_random_weights;

    #[test]
    fn rows_roundtrip() {
        let w = mock_random_weights(4, 2, 0);
        let rows = to_rows(w.view());
        assert_eq!(rows.len(), 4);
        assert_eq!(from_rows(&rows).unwrap(), w);
        assert_eq!(from_rows(&[]).unwrap().dim(), (0, 0));
    }
    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![0.0; 4], vec![0.0; 3]];
        assert!(matches!(
            from_rows(&rows),
            Err(FlipFlopError::ShapeMismatch(_))
        ));
        let rows = vec![vec![0.0, f32::NAN]];
        assert!(from_rows(&rows).is_err());
    }
    #[test]
    fn weights_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let w = mock_random_weights(3, 4, 1);
        let m = ndarray::Array2::<f32>::ones((3, 5));
        let f = WeightsFile::new(w.view()).with_mod_weights(m.view());
        write_json(&path, &f).unwrap();
        let g = read_weights_file(&path).unwrap();
        assert_eq!(g.weights().unwrap(), w);
        assert_eq!(g.mod_weights().unwrap(), Some(m));

        let path = dir.path().join("plain.json");
        std::fs::write(&path, "{\"weights\": [[0.5, 1.0, 0.0, 0.0]]}").unwrap();
        let g = read_weights_file(&path).unwrap();
        assert_eq!(g.weights().unwrap().dim(), (1, 4));
        assert_eq!(g.mod_weights().unwrap(), None);
    }
    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            read_weights_file("/nonexistent/weights.json"),
            Err(FlipFlopError::Io(_))
        ));
    }
}
