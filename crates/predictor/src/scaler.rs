use crate::dataset::Sample;
use intake_core::predictor::FEATURE_COUNT;

/// Per-feature standardisation to zero mean and unit variance.
///
/// Uses the population standard deviation. A constant feature keeps a scale of 1 so it maps
/// to 0 rather than dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Sample,
    scale: Sample,
}

impl StandardScaler {
    /// Fit on `samples`. An empty slice yields the identity transform.
    pub fn fit(samples: &[Sample]) -> Self {
        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];
        if samples.is_empty() {
            return Self { mean, scale };
        }

        let n = samples.len() as f64;
        for feature in 0..FEATURE_COUNT {
            let m = samples.iter().map(|s| s[feature]).sum::<f64>() / n;
            let variance = samples
                .iter()
                .map(|s| (s[feature] - m).powi(2))
                .sum::<f64>()
                / n;
            mean[feature] = m;
            if variance > f64::EPSILON {
                scale[feature] = variance.sqrt();
            }
        }

        Self { mean, scale }
    }

    pub fn transform(&self, sample: &Sample) -> Sample {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, value) in out.iter_mut().enumerate() {
            *value = (sample[i] - self.mean[i]) / self.scale[i];
        }
        out
    }

    pub fn transform_all(&self, samples: &[Sample]) -> Vec<Sample> {
        samples.iter().map(|s| self.transform(s)).collect()
    }
}
