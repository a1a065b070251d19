use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("expected {expected} features, received {found}")]
    FeatureCount { expected: usize, found: usize },
    #[error("feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },
    #[error("tree {tree} is malformed: {reason}")]
    MalformedTree { tree: usize, reason: String },
    #[error("forest has no classes or no trees")]
    Empty,
}

/// Node of a fitted decision tree. Splits send a sample left when
/// `features[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walk from the root to a leaf and return its normalised class distribution.
    fn distribution(&self, tree: usize, features: &[f64]) -> Result<Vec<f64>, PredictionError> {
        let malformed = |reason: String| PredictionError::MalformedTree { tree, reason };

        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features
                        .get(*feature)
                        .ok_or_else(|| malformed(format!("split on missing feature {feature}")))?;
                    index = if *value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => {
                    let total: f64 = value.iter().sum();
                    if total <= 0.0 || !total.is_finite() {
                        return Err(malformed(format!("leaf {index} has no weight")));
                    }
                    return Ok(value.iter().map(|weight| weight / total).collect());
                }
                None => return Err(malformed(format!("node {index} out of range"))),
            }
        }

        Err(malformed("traversal did not reach a leaf".to_string()))
    }

    fn validate(&self, tree: usize, classes: usize, n_features: usize) -> Result<(), PredictionError> {
        let malformed = |reason: String| PredictionError::MalformedTree { tree, reason };

        if self.nodes.is_empty() {
            return Err(malformed("no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    threshold,
                } => {
                    if *feature >= n_features {
                        return Err(malformed(format!(
                            "node {index} splits on feature {feature} of {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(malformed(format!("node {index} has a non-finite threshold")));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(malformed(format!("node {index} points past the tree")));
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != classes {
                        return Err(malformed(format!(
                            "leaf {index} has {} weights for {classes} classes",
                            value.len()
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Averaged ensemble of decision trees over a fixed class list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecisionForest {
    pub classes: Vec<String>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

/// Winning class of a single-sample prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestPrediction {
    pub class_index: usize,
    pub probability: f64,
}

impl DecisionForest {
    pub fn validate(&self) -> Result<(), PredictionError> {
        if self.classes.is_empty() || self.trees.is_empty() {
            return Err(PredictionError::Empty);
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(index, tree)| tree.validate(index, self.classes.len(), self.n_features))
    }

    /// Mean of the per-tree class distributions.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if self.classes.is_empty() || self.trees.is_empty() {
            return Err(PredictionError::Empty);
        }
        if features.len() != self.n_features {
            return Err(PredictionError::FeatureCount {
                expected: self.n_features,
                found: features.len(),
            });
        }
        if let Some(index) = features.iter().position(|value| !value.is_finite()) {
            return Err(PredictionError::NonFiniteFeature { index });
        }

        let mut totals = vec![0.0; self.classes.len()];
        for (index, tree) in self.trees.iter().enumerate() {
            let distribution = tree.distribution(index, features)?;
            if distribution.len() != totals.len() {
                return Err(PredictionError::MalformedTree {
                    tree: index,
                    reason: "leaf width differs from class count".to_string(),
                });
            }
            for (total, share) in totals.iter_mut().zip(distribution) {
                *total += share;
            }
        }

        let trees = self.trees.len() as f64;
        Ok(totals.into_iter().map(|total| total / trees).collect())
    }

    /// Highest-probability class; ties go to the lowest class index.
    pub fn predict(&self, features: &[f64]) -> Result<ForestPrediction, PredictionError> {
        let probabilities = self.predict_proba(features)?;
        let mut best = ForestPrediction {
            class_index: 0,
            probability: probabilities[0],
        };
        for (class_index, &probability) in probabilities.iter().enumerate().skip(1) {
            if probability > best.probability {
                best = ForestPrediction {
                    class_index,
                    probability,
                };
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, low: [f64; 2], high: [f64; 2]) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: low.to_vec(),
                },
                TreeNode::Leaf {
                    value: high.to_vec(),
                },
            ],
        }
    }

    fn forest(trees: Vec<DecisionTree>) -> DecisionForest {
        DecisionForest {
            classes: vec!["calm".to_string(), "tense".to_string()],
            n_features: 1,
            trees,
        }
    }

    #[test]
    fn splits_send_equal_values_left() {
        let forest = forest(vec![stump(5.0, [1.0, 0.0], [0.0, 1.0])]);
        assert_eq!(forest.predict(&[5.0]).expect("predicts").class_index, 0);
        assert_eq!(forest.predict(&[5.01]).expect("predicts").class_index, 1);
    }

    #[test]
    fn averages_normalised_leaf_distributions() {
        let forest = forest(vec![
            stump(5.0, [30.0, 10.0], [0.0, 4.0]),
            stump(2.0, [1.0, 0.0], [1.0, 3.0]),
        ]);
        let probabilities = forest.predict_proba(&[3.0]).expect("predicts");
        assert!((probabilities[0] - 0.5).abs() < 1e-9);
        assert!((probabilities[1] - 0.5).abs() < 1e-9);

        let prediction = forest.predict(&[3.0]).expect("predicts");
        assert_eq!(prediction.class_index, 0, "ties resolve to the first class");
    }

    #[test]
    fn rejects_wrong_feature_count() {
        let forest = forest(vec![stump(5.0, [1.0, 0.0], [0.0, 1.0])]);
        assert_eq!(
            forest.predict(&[1.0, 2.0]),
            Err(PredictionError::FeatureCount {
                expected: 1,
                found: 2
            })
        );
        assert_eq!(
            forest.predict(&[f64::NAN]),
            Err(PredictionError::NonFiniteFeature { index: 0 })
        );
    }

    #[test]
    fn validation_catches_dangling_children_and_cycles() {
        let mut dangling = stump(5.0, [1.0, 0.0], [0.0, 1.0]);
        dangling.nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 5.0,
            left: 1,
            right: 9,
        };
        assert!(matches!(
            forest(vec![dangling]).validate(),
            Err(PredictionError::MalformedTree { tree: 0, .. })
        ));

        let cyclic = DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 5.0,
                left: 0,
                right: 0,
            }],
        };
        let forest = forest(vec![cyclic]);
        assert!(forest.validate().is_ok());
        assert!(matches!(
            forest.predict(&[1.0]),
            Err(PredictionError::MalformedTree { .. })
        ));
    }

    #[test]
    fn parses_untagged_nodes_from_json() {
        let forest: DecisionForest = serde_json::from_str(
            r#"{
                "classes": ["calm", "tense"],
                "n_features": 1,
                "trees": [{ "nodes": [
                    { "feature": 0, "threshold": 5.0, "left": 1, "right": 2 },
                    { "value": [3.0, 1.0] },
                    { "value": [0.0, 2.0] }
                ]}]
            }"#,
        )
        .expect("forest parses");
        assert!(forest.validate().is_ok());
        let prediction = forest.predict(&[7.0]).expect("predicts");
        assert_eq!(prediction.class_index, 1);
        assert_eq!(prediction.probability, 1.0);
    }
}
