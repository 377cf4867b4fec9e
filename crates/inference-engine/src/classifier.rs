//! Binary Failure Classifiers

use crate::InferenceError;
use alerting::FailureLabel;
use serde::{Deserialize, Serialize};

/// Tolerance on `p0 + p1 == 1` for classifier outputs
pub const PROBABILITY_TOLERANCE: f64 = 1e-4;

/// Label plus class probabilities `[p_no_failure, p_failure]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub label: FailureLabel,
    pub probabilities: [f64; 2],
}

/// Any binary classifier the pipeline can drive.
///
/// Inputs are scaled feature vectors in the artifact's column order.
pub trait Classifier: Send + Sync {
    /// Predicted class
    fn predict_label(&self, features: &[f64]) -> Result<FailureLabel, InferenceError>;

    /// Class probabilities `[p0, p1]` with `p0 + p1 == 1`
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError>;

    /// Label and probabilities together; override when one pass yields both
    fn classify(&self, features: &[f64]) -> Result<ClassificationOutcome, InferenceError> {
        let probabilities = check_probabilities(self.predict_proba(features)?)?;
        let label = self.predict_label(features)?;
        Ok(ClassificationOutcome {
            label,
            probabilities,
        })
    }

    /// Input width the classifier was built for, when it knows
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Short algorithm name for logs
    fn kind(&self) -> &'static str;
}

/// Reject probability pairs that are not a distribution
pub fn check_probabilities(p: [f64; 2]) -> Result<[f64; 2], InferenceError> {
    let in_range = p.iter().all(|v| (0.0..=1.0).contains(v));
    if !in_range || ((p[0] + p[1]) - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(InferenceError::InferenceFailed(format!(
            "classifier returned invalid probabilities [{}, {}]",
            p[0], p[1]
        )));
    }
    Ok(p)
}

/// Label with the larger probability; ties go to no-failure
pub fn argmax_label(p: [f64; 2]) -> FailureLabel {
    if p[1] > p[0] {
        FailureLabel::Failure
    } else {
        FailureLabel::NoFailure
    }
}

fn check_width(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::InvalidInputShape {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

/// Logistic regression over the scaled features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticClassifier {
    /// Create a model from weights
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    fn decision(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_width(self.coefficients.len(), features)?;
        Ok(self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept)
    }
}

impl Classifier for LogisticClassifier {
    fn predict_label(&self, features: &[f64]) -> Result<FailureLabel, InferenceError> {
        Ok(argmax_label(self.predict_proba(features)?))
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let z = self.decision(features)?;
        let p1 = 1.0 / (1.0 + (-z).exp());
        Ok([1.0 - p1, p1])
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }
}

/// Node of a binary decision tree; children are indices into the node list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Go left when `features[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class distribution at a leaf
    Leaf { distribution: [f64; 2] },
}

/// Decision tree rooted at node 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Structural checks: children point forward, features are in range,
    /// leaves hold a distribution
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on feature {} of {}", idx, feature, n_features));
                    }
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                TreeNode::Leaf { distribution } => {
                    check_probabilities(*distribution).map_err(|e| format!("leaf {}: {}", idx, e))?;
                }
            }
        }
        Ok(())
    }

    /// Leaf distribution reached by `features`
    pub fn leaf(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let mut idx = 0;
        // Children always point forward, so the walk ends within nodes.len() steps
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { distribution }) => return Ok(*distribution),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or(InferenceError::InvalidInputShape {
                        expected: feature + 1,
                        actual: features.len(),
                    })?;
                    idx = if *value <= *threshold { *left } else { *right };
                }
                None => break,
            }
        }
        Err(InferenceError::InferenceFailed(format!(
            "decision tree walk left the tree at node {}",
            idx
        )))
    }
}

/// Ensemble of decision trees averaging leaf distributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestClassifier {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    /// Create a forest, validating every tree
    pub fn new(n_features: usize, trees: Vec<DecisionTree>) -> Result<Self, String> {
        let forest = Self { n_features, trees };
        forest.validate()?;
        Ok(forest)
    }

    /// Validate ensemble structure
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| format!("tree {}: {}", idx, e))?;
        }
        Ok(())
    }
}

impl Classifier for ForestClassifier {
    fn predict_label(&self, features: &[f64]) -> Result<FailureLabel, InferenceError> {
        Ok(argmax_label(self.predict_proba(features)?))
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        check_width(self.n_features, features)?;
        let mut sum = [0.0, 0.0];
        for tree in &self.trees {
            let leaf = tree.leaf(features)?;
            sum[0] += leaf[0];
            sum[1] += leaf[1];
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}

/// Native classifiers persisted as one postcard blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassifierModel {
    Logistic(LogisticClassifier),
    Forest(ForestClassifier),
}

impl ClassifierModel {
    /// Serialize with postcard
    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        postcard::to_allocvec(self).map_err(|e| e.to_string())
    }

    /// Deserialize from postcard bytes and validate structure
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let model: Self = postcard::from_bytes(bytes).map_err(|e| e.to_string())?;
        if let ClassifierModel::Forest(forest) = &model {
            forest.validate()?;
        }
        Ok(model)
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierModel::Logistic(m) => m,
            ClassifierModel::Forest(m) => m,
        }
    }
}

impl Classifier for ClassifierModel {
    fn predict_label(&self, features: &[f64]) -> Result<FailureLabel, InferenceError> {
        self.inner().predict_label(features)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        self.inner().predict_proba(features)
    }

    fn n_features(&self) -> Option<usize> {
        self.inner().n_features()
    }

    fn kind(&self) -> &'static str {
        self.inner().kind()
    }
}
