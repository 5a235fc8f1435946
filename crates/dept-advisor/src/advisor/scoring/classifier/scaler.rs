use serde::{Deserialize, Serialize};

/// Per-feature standardisation fitted on training rows: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fits population statistics column by column. A constant column gets scale 1.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let count = rows.len().max(1) as f64;

        let mut mean = vec![0.0; width];
        for row in rows {
            for (total, value) in mean.iter_mut().zip(row) {
                *total += value;
            }
        }
        mean.iter_mut().for_each(|total| *total /= count);

        let mut variance = vec![0.0; width];
        for row in rows {
            for ((total, value), centre) in variance.iter_mut().zip(row).zip(&mean) {
                *total += (value - centre).powi(2);
            }
        }

        let scale = variance
            .into_iter()
            .map(|total| {
                let deviation = (total / count).sqrt();
                if deviation > f64::EPSILON {
                    deviation
                } else {
                    1.0
                }
            })
            .collect();

        Self { mean, scale }
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.mean.len() == self.scale.len()
            && self.scale.iter().all(|scale| scale.is_finite() && *scale > 0.0)
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardises_columns_and_guards_constant_ones() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&rows);

        assert_eq!(scaler.width(), 2);
        assert_eq!(scaler.transform(&[1.0, 5.0]), vec![-1.0, 0.0]);
        assert_eq!(scaler.transform(&[3.0, 7.0]), vec![1.0, 2.0]);
        assert!(scaler.is_consistent());
    }
}
