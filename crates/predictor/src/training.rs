//! Model training and best-model selection.
//!
//! Training standardises the whole dataset, holds out a seeded 20% test split, fits every
//! candidate on the remaining 80% and ranks the candidates by hold-out accuracy. Predictions
//! come from the top-ranked candidate.

use crate::constants::{KNN_NEIGHBOURS, SPLIT_SEED, TEST_FRACTION};
use crate::dataset::{Dataset, Sample};
use crate::error::{DatasetError, DatasetResult};
use crate::models::{Classifier, DecisionTree, MajorityClass, NearestNeighbours};
use crate::scaler::StandardScaler;
use intake_core::predictor::{ConditionPredictor, FeatureVector, PredictorError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;

/// Hold-out accuracy of one trained model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    pub name: &'static str,
    pub accuracy: f64,
}

/// Shuffle `0..n` with `seed` and split it into (train, test) index sets.
///
/// The test set holds `ceil(n * test_fraction)` indices, kept between 1 and `n - 1`, so `n`
/// must be at least 2.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n.saturating_sub(1));
    let train = indices.split_off(test_len);
    (train, indices)
}

fn candidates() -> Vec<Box<dyn Classifier>> {
    vec![
        Box::new(DecisionTree::new(None)),
        Box::new(NearestNeighbours::new(KNN_NEIGHBOURS)),
        Box::new(MajorityClass::default()),
    ]
}

fn accuracy(model: &dyn Classifier, samples: &[Sample], targets: &[usize]) -> f64 {
    let correct = samples
        .iter()
        .zip(targets)
        .filter(|&(s, &t)| model.predict(s) == t)
        .count();
    correct as f64 / samples.len() as f64
}

/// A condition predictor trained from the patient-profile dataset.
pub struct DatasetPredictor {
    scaler: StandardScaler,
    classes: Vec<String>,
    best: Box<dyn Classifier>,
    ranking: Vec<ModelScore>,
}

impl std::fmt::Debug for DatasetPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetPredictor")
            .field("classes", &self.classes)
            .field("ranking", &self.ranking)
            .finish_non_exhaustive()
    }
}

impl DatasetPredictor {
    /// Load the CSV at `path` and train on it.
    pub fn from_path(path: &Path) -> DatasetResult<Self> {
        let dataset = Dataset::from_path(path)?;
        Self::train(&dataset)
    }

    /// Train every candidate model on `dataset` and keep the most accurate.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::TooSmall` if the dataset cannot be split into non-empty training
    /// and test sets.
    pub fn train(dataset: &Dataset) -> DatasetResult<Self> {
        if dataset.len() < 2 {
            return Err(DatasetError::TooSmall(dataset.len()));
        }

        let scaler = StandardScaler::fit(dataset.samples());
        let scaled = scaler.transform_all(dataset.samples());
        let targets = dataset.targets();
        let n_classes = dataset.classes().len();

        let (train, test) = train_test_split(dataset.len(), TEST_FRACTION, SPLIT_SEED);
        let pick = |idx: &[usize]| -> (Vec<Sample>, Vec<usize>) {
            idx.iter().map(|&i| (scaled[i], targets[i])).unzip()
        };
        let (train_x, train_y) = pick(&train);
        let (test_x, test_y) = pick(&test);

        let mut trained: Vec<(ModelScore, Box<dyn Classifier>)> = candidates()
            .into_iter()
            .map(|mut model| {
                model.fit(&train_x, &train_y, n_classes);
                let score = ModelScore {
                    name: model.name(),
                    accuracy: accuracy(model.as_ref(), &test_x, &test_y),
                };
                tracing::info!("trained {}: accuracy {:.3}", score.name, score.accuracy);
                (score, model)
            })
            .collect();

        // Stable sort, so equal accuracies keep candidate order.
        trained.sort_by(|a, b| b.0.accuracy.total_cmp(&a.0.accuracy));

        let ranking: Vec<ModelScore> = trained.iter().map(|(score, _)| score.clone()).collect();
        let (_, best) = trained.swap_remove(0);
        tracing::info!(
            "using {} for condition prediction ({} training / {} test rows)",
            ranking[0].name,
            train.len(),
            test.len()
        );

        Ok(Self {
            scaler,
            classes: dataset.classes().to_vec(),
            best,
            ranking,
        })
    }

    /// Models in descending accuracy order; the first one answers predictions.
    pub fn ranking(&self) -> &[ModelScore] {
        &self.ranking
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl ConditionPredictor for DatasetPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<Option<String>, PredictorError> {
        let sample = self.scaler.transform(&features.to_array());
        let class = self.best.predict(&sample);
        self.classes
            .get(class)
            .cloned()
            .map(Some)
            .ok_or_else(|| PredictorError::Failed(format!("model returned unknown class {}", class)))
    }
}
