//! Training constants.

/// Seed for the train/test shuffle, so rankings are reproducible across runs.
pub const SPLIT_SEED: u64 = 42;

/// Share of rows held out for measuring accuracy.
pub const TEST_FRACTION: f64 = 0.2;

/// Neighbours consulted by the k-nearest-neighbours model.
pub const KNN_NEIGHBOURS: usize = 5;
