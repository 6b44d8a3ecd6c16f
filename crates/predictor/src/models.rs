//! Classifiers trained on standardised samples.
//!
//! Targets are class indices. Every classifier breaks ties towards the lowest class index (or
//! the nearest neighbour), so a fitted model is deterministic.

use crate::dataset::Sample;
use intake_core::predictor::FEATURE_COUNT;

pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fit on a non-empty training set. `samples` and `targets` have equal length and every
    /// target is below `n_classes`.
    fn fit(&mut self, samples: &[Sample], targets: &[usize], n_classes: usize);

    fn predict(&self, sample: &Sample) -> usize;
}

/// Class with the highest count; the lowest index wins a tie.
fn majority(targets: impl IntoIterator<Item = usize>, n_classes: usize) -> usize {
    let mut counts = vec![0usize; n_classes];
    for t in targets {
        counts[t] += 1;
    }
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

/// Baseline that always answers the most frequent training class.
#[derive(Debug, Default)]
pub struct MajorityClass {
    class: usize,
}

impl Classifier for MajorityClass {
    fn name(&self) -> &'static str {
        "majority_class"
    }

    fn fit(&mut self, _samples: &[Sample], targets: &[usize], n_classes: usize) {
        self.class = majority(targets.iter().copied(), n_classes);
    }

    fn predict(&self, _sample: &Sample) -> usize {
        self.class
    }
}

/// k-nearest-neighbours by Euclidean distance.
#[derive(Debug)]
pub struct NearestNeighbours {
    k: usize,
    n_classes: usize,
    samples: Vec<Sample>,
    targets: Vec<usize>,
}

impl NearestNeighbours {
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            n_classes: 0,
            samples: Vec::new(),
            targets: Vec::new(),
        }
    }
}

fn squared_distance(a: &Sample, b: &Sample) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

impl Classifier for NearestNeighbours {
    fn name(&self) -> &'static str {
        "k_nearest_neighbours"
    }

    fn fit(&mut self, samples: &[Sample], targets: &[usize], n_classes: usize) {
        self.samples = samples.to_vec();
        self.targets = targets.to_vec();
        self.n_classes = n_classes;
    }

    fn predict(&self, sample: &Sample) -> usize {
        let mut neighbours: Vec<(f64, usize)> = self
            .samples
            .iter()
            .zip(&self.targets)
            .map(|(s, &t)| (squared_distance(s, sample), t))
            .collect();
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));
        neighbours.truncate(self.k);

        let mut counts = vec![0usize; self.n_classes];
        for &(_, t) in &neighbours {
            counts[t] += 1;
        }
        let top = counts.iter().copied().max().unwrap_or(0);

        // Among tied classes, the one with the nearest member wins.
        neighbours
            .iter()
            .map(|&(_, t)| t)
            .find(|&t| counts[t] == top)
            .unwrap_or(0)
    }
}

#[derive(Debug)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// CART decision tree with Gini impurity and midpoint thresholds.
#[derive(Debug)]
pub struct DecisionTree {
    max_depth: Option<usize>,
    root: Node,
}

impl DecisionTree {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            root: Node::Leaf { class: 0 },
        }
    }

    fn build(
        &self,
        samples: &[Sample],
        targets: &[usize],
        indices: Vec<usize>,
        n_classes: usize,
        depth: usize,
    ) -> Node {
        let class = majority(indices.iter().map(|&i| targets[i]), n_classes);
        let pure = indices.iter().all(|&i| targets[i] == class);
        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        if pure || indices.len() < 2 || depth_reached {
            return Node::Leaf { class };
        }

        let Some((feature, threshold)) = best_split(samples, targets, &indices, n_classes) else {
            return Node::Leaf { class };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| samples[i][feature] <= threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(self.build(samples, targets, left, n_classes, depth + 1)),
            right: Box::new(self.build(samples, targets, right, n_classes, depth + 1)),
        }
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| (c as f64 / total).powi(2))
        .sum::<f64>()
}

/// Lowest weighted Gini split over every feature and midpoint; `None` if nothing improves on
/// the parent. Earlier features and lower thresholds win ties.
fn best_split(
    samples: &[Sample],
    targets: &[usize],
    indices: &[usize],
    n_classes: usize,
) -> Option<(usize, f64)> {
    let total = indices.len();
    let mut parent = vec![0usize; n_classes];
    for &i in indices {
        parent[targets[i]] += 1;
    }
    let mut best_impurity = gini(&parent, total) - 1e-12;
    let mut best = None;

    for feature in 0..FEATURE_COUNT {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| samples[a][feature].total_cmp(&samples[b][feature]));

        let mut left = vec![0usize; n_classes];
        let mut right = parent.clone();
        for pos in 0..total - 1 {
            let t = targets[order[pos]];
            left[t] += 1;
            right[t] -= 1;

            let here = samples[order[pos]][feature];
            let next = samples[order[pos + 1]][feature];
            if next <= here {
                continue;
            }

            let n_left = pos + 1;
            let n_right = total - n_left;
            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / total as f64;
            if impurity < best_impurity {
                best_impurity = impurity;
                best = Some((feature, (here + next) / 2.0));
            }
        }
    }

    best
}

impl Classifier for DecisionTree {
    fn name(&self) -> &'static str {
        "decision_tree"
    }

    fn fit(&mut self, samples: &[Sample], targets: &[usize], n_classes: usize) {
        let indices = (0..samples.len()).collect();
        self.root = self.build(samples, targets, indices, n_classes, 0);
    }

    fn predict(&self, sample: &Sample) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}
