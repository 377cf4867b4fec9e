//! Feature Standardization

use crate::InferenceError;
use serde::{Deserialize, Serialize};

/// Per-column `(x - mean) / scale` transform fitted at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Create a scaler from fitted statistics
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        if mean.len() != scale.len() {
            return Err(format!(
                "scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            ));
        }
        Ok(Self { mean, scale })
    }

    /// Pass-through scaler of the given width
    pub fn identity(width: usize) -> Self {
        Self {
            mean: vec![0.0; width],
            scale: vec![1.0; width],
        }
    }

    /// Fit population mean and standard deviation per column
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, String> {
        let width = rows.first().map(Vec::len).ok_or("cannot fit scaler on no rows")?;
        if rows.iter().any(|r| r.len() != width) {
            return Err("rows have different widths".to_string());
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x / n;
            }
        }

        let mut scale = vec![0.0; width];
        for row in rows {
            for ((s, x), m) in scale.iter_mut().zip(row).zip(&mean) {
                *s += (x - m).powi(2) / n;
            }
        }
        for s in &mut scale {
            *s = s.sqrt();
        }

        Self::new(mean, scale)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether the scaler has no columns
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Standardize one row; zero-variance columns are only centered
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if values.len() != self.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.len(),
                actual: values.len(),
            });
        }

        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - m) / s
            })
            .collect())
    }

    /// Serialize with postcard
    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        postcard::to_allocvec(self).map_err(|e| e.to_string())
    }

    /// Deserialize from postcard bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let scaler: Self = postcard::from_bytes(bytes).map_err(|e| e.to_string())?;
        Self::new(scaler.mean, scaler.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let scaler = StandardScaler::new(vec![10.0, 0.0], vec![2.0, 0.0]).unwrap();
        assert_eq!(scaler.transform(&[14.0, 3.0]).unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_width_mismatch() {
        let scaler = StandardScaler::identity(3);
        assert!(matches!(
            scaler.transform(&[1.0, 2.0]),
            Err(InferenceError::InvalidInputShape { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_fit() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.mean, vec![2.0, 5.0]);
        assert_eq!(scaler.scale, vec![1.0, 0.0]);
        assert_eq!(scaler.transform(&[3.0, 6.0]).unwrap(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_mismatched_blob_rejected() {
        let bad = StandardScaler {
            mean: vec![0.0; 3],
            scale: vec![1.0; 2],
        };
        let bytes = postcard::to_allocvec(&bad).unwrap();
        assert!(StandardScaler::from_bytes(&bytes).is_err());
    }
}
