//! Bagged CART ensemble producing class probabilities.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Growth parameters shared by every tree of the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features examined per split; `None` means the square root of the feature count.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub balanced_class_weights: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            max_features: None,
            bootstrap: true,
            balanced_class_weights: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

/// One tree stored as an arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn predict_proba(&self, features: &[f64]) -> Option<&[f64]> {
        let mut cursor = 0;
        loop {
            match self.nodes.get(cursor)? {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    cursor = if value <= *threshold { *left } else { *right };
                }
                Node::Leaf { distribution } => return Some(distribution),
            }
        }
    }

    fn is_consistent(&self, classes: usize, features: usize) -> bool {
        let count = self.nodes.len();
        count > 0
            && self.nodes.iter().enumerate().all(|(position, node)| match node {
                // Children always follow their parent, so lookups cannot cycle.
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    *feature < features
                        && threshold.is_finite()
                        && *left > position
                        && *right > position
                        && *left < count
                        && *right < count
                }
                Node::Leaf { distribution } => distribution.len() == classes,
            })
    }
}

/// Random forest classifier over dense `f64` rows and integer class ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    classes: usize,
    features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Grows the ensemble. `labels[i]` is the class id of `rows[i]` and must be below `classes`.
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[usize],
        classes: usize,
        params: &ForestParams,
        rng: &mut StdRng,
    ) -> Self {
        let features = rows.first().map(Vec::len).unwrap_or(0);
        let class_weights = class_weights(labels, classes, params.balanced_class_weights);
        let max_features = params
            .max_features
            .unwrap_or_else(|| (features as f64).sqrt().floor() as usize)
            .clamp(1, features.max(1));

        let context = GrowthContext {
            rows,
            labels,
            classes,
            class_weights: &class_weights,
            max_features,
            params,
        };

        let trees = (0..params.trees)
            .map(|_| {
                let sample: Vec<usize> = if params.bootstrap {
                    (0..rows.len()).map(|_| rng.gen_range(0..rows.len())).collect()
                } else {
                    (0..rows.len()).collect()
                };
                let mut tree = DecisionTree { nodes: Vec::new() };
                if !sample.is_empty() {
                    context.grow(&mut tree, sample, 0, rng);
                }
                tree
            })
            .filter(|tree| !tree.nodes.is_empty())
            .collect();

        Self {
            classes,
            features,
            trees,
        }
    }

    pub fn classes(&self) -> usize {
        self.classes
    }

    pub fn features(&self) -> usize {
        self.features
    }

    pub(crate) fn is_consistent(&self) -> bool {
        !self.trees.is_empty()
            && self
                .trees
                .iter()
                .all(|tree| tree.is_consistent(self.classes, self.features))
    }

    /// Mean of the per-tree leaf distributions. Sums to 1 for a consistent forest.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut totals = vec![0.0; self.classes];
        let mut voters = 0usize;
        for distribution in self
            .trees
            .iter()
            .filter_map(|tree| tree.predict_proba(features))
        {
            for (total, probability) in totals.iter_mut().zip(distribution) {
                *total += probability;
            }
            voters += 1;
        }

        if voters > 0 {
            totals
                .iter_mut()
                .for_each(|total| *total /= voters as f64);
        }
        totals
    }

    pub fn predict(&self, features: &[f64]) -> usize {
        argmax(&self.predict_proba(features))
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (position, value)| {
            if *value > best.1 {
                (position, *value)
            } else {
                best
            }
        })
        .0
}

/// `n / (classes * count_c)` when balanced, 1 otherwise. Absent classes get weight 0.
fn class_weights(labels: &[usize], classes: usize, balanced: bool) -> Vec<f64> {
    if !balanced {
        return vec![1.0; classes];
    }
    let mut counts = vec![0usize; classes];
    for label in labels {
        if let Some(count) = counts.get_mut(*label) {
            *count += 1;
        }
    }
    counts
        .into_iter()
        .map(|count| {
            if count == 0 {
                0.0
            } else {
                labels.len() as f64 / (classes as f64 * count as f64)
            }
        })
        .collect()
}

struct GrowthContext<'a> {
    rows: &'a [Vec<f64>],
    labels: &'a [usize],
    classes: usize,
    class_weights: &'a [f64],
    max_features: usize,
    params: &'a ForestParams,
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl GrowthContext<'_> {
    fn grow(
        &self,
        tree: &mut DecisionTree,
        sample: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let weights = self.weighted_counts(&sample);
        let total: f64 = weights.iter().sum();
        let pure = weights.iter().filter(|weight| **weight > 0.0).count() <= 1;

        let split = if depth >= self.params.max_depth
            || sample.len() < self.params.min_samples_split
            || pure
        {
            None
        } else {
            self.best_split(&sample, gini(&weights, total), rng)
        };

        let Some(split) = split else {
            tree.nodes.push(Node::Leaf {
                distribution: normalise(weights, total),
            });
            return tree.nodes.len() - 1;
        };

        let (left_sample, right_sample): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|row| self.rows[*row][split.feature] <= split.threshold);

        let slot = tree.nodes.len();
        tree.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });
        let left = self.grow(tree, left_sample, depth + 1, rng);
        let right = self.grow(tree, right_sample, depth + 1, rng);
        tree.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        slot
    }

    fn weighted_counts(&self, sample: &[usize]) -> Vec<f64> {
        let mut weights = vec![0.0; self.classes];
        for row in sample {
            let label = self.labels[*row];
            weights[label] += self.class_weights[label];
        }
        weights
    }

    /// Lowest weighted child impurity over a random feature subset, if it improves on the parent.
    fn best_split(&self, sample: &[usize], parent: f64, rng: &mut StdRng) -> Option<Split> {
        let features = self.rows.first().map(Vec::len).unwrap_or(0);
        let candidates = index::sample(rng, features, self.max_features.min(features));

        let mut best: Option<Split> = None;
        for feature in candidates.iter() {
            let mut ordered: Vec<(f64, usize)> = sample
                .iter()
                .map(|row| (self.rows[*row][feature], self.labels[*row]))
                .collect();
            ordered.sort_by(|left, right| left.0.total_cmp(&right.0));

            let mut left = vec![0.0; self.classes];
            let mut right = vec![0.0; self.classes];
            for (_, label) in &ordered {
                right[*label] += self.class_weights[*label];
            }
            let total: f64 = right.iter().sum();
            let mut left_total = 0.0;

            for position in 0..ordered.len().saturating_sub(1) {
                let (value, label) = ordered[position];
                let weight = self.class_weights[label];
                left[label] += weight;
                right[label] -= weight;
                left_total += weight;

                let next = ordered[position + 1].0;
                if next <= value {
                    continue;
                }

                let right_total = total - left_total;
                if left_total <= 0.0 || right_total <= 0.0 {
                    continue;
                }
                let impurity = (left_total * gini(&left, left_total)
                    + right_total * gini(&right, right_total))
                    / total;

                if best
                    .as_ref()
                    .map_or(true, |current| impurity < current.impurity)
                {
                    best = Some(Split {
                        feature,
                        threshold: value + (next - value) / 2.0,
                        impurity,
                    });
                }
            }
        }

        best.filter(|split| split.impurity < parent - f64::EPSILON)
    }
}

fn gini(weights: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - weights
        .iter()
        .map(|weight| (weight / total).powi(2))
        .sum::<f64>()
}

fn normalise(weights: Vec<f64>, total: f64) -> Vec<f64> {
    if total <= 0.0 {
        let classes = weights.len().max(1) as f64;
        return vec![1.0 / classes; weights.len()];
    }
    weights.into_iter().map(|weight| weight / total).collect()
}
