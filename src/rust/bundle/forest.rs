use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::{BundleError, PredictionError};
use super::model::{ClassModel, Posterior};

/// Internal split node. Rows with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitNode {
    pub feature: usize,
    pub threshold: f32,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

/// Leaf with per-class weights (sample counts or fractions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafNode {
    pub value: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Node(SplitNode),
    Leaf(LeafNode),
}

impl TreeNode {
    /// Convenience constructor for a split
    pub fn split(feature: usize, threshold: f32, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Node(SplitNode {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Convenience constructor for a leaf
    pub fn leaf(value: Vec<f32>) -> Self {
        TreeNode::Leaf(LeafNode { value })
    }

    fn leaf_for(&self, row: &[f32]) -> Result<&LeafNode, PredictionError> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return Ok(leaf),
                TreeNode::Node(split) => {
                    let x = row.get(split.feature).ok_or_else(|| {
                        PredictionError::ModelError(format!(
                            "Split on feature {} but row has {} values",
                            split.feature,
                            row.len()
                        ))
                    })?;
                    node = if *x <= split.threshold { &*split.left } else { &*split.right };
                }
            }
        }
    }

    fn validate(&self, n_classes: usize, n_features: usize) -> Result<(), BundleError> {
        match self {
            TreeNode::Leaf(leaf) => {
                if leaf.value.len() != n_classes {
                    return Err(BundleError::Validation(format!(
                        "Leaf has {} class weights, expected {}",
                        leaf.value.len(),
                        n_classes
                    )));
                }
                if leaf.value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(BundleError::Validation("Leaf weights must be finite and non-negative".into()));
                }
                if leaf.value.iter().sum::<f32>() <= 0.0 {
                    return Err(BundleError::Validation("Leaf weights cannot all be zero".into()));
                }
                Ok(())
            }
            TreeNode::Node(split) => {
                if split.feature >= n_features {
                    return Err(BundleError::Validation(format!(
                        "Split references feature {} but only {} features exist",
                        split.feature, n_features
                    )));
                }
                split.left.validate(n_classes, n_features)?;
                split.right.validate(n_classes, n_features)
            }
        }
    }
}

/// A tree ensemble classifier; a single decision tree is a one-tree forest.
///
/// `predict_proba` averages the normalized leaf distributions of all trees and
/// the predicted class is the argmax of that average.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_classes: usize,
    pub trees: Vec<TreeNode>,
}

impl TreeEnsemble {
    pub fn new(n_classes: usize, trees: Vec<TreeNode>) -> Self {
        Self { n_classes, trees }
    }

    /// Checks the ensemble's shape against the bundle it belongs to.
    pub(crate) fn validate(&self, n_features: usize) -> Result<(), BundleError> {
        if self.n_classes < 2 {
            return Err(BundleError::Validation(format!(
                "Classifier must have at least 2 classes, found {}",
                self.n_classes
            )));
        }
        if self.trees.is_empty() {
            return Err(BundleError::Validation("Tree ensemble has no trees".into()));
        }
        for tree in &self.trees {
            tree.validate(self.n_classes, n_features)?;
        }
        Ok(())
    }
}

impl ClassModel for TreeEnsemble {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict_with_proba(&self, row: &[f32]) -> Result<Posterior, PredictionError> {
        if self.trees.is_empty() {
            return Err(PredictionError::ModelError("Tree ensemble has no trees".into()));
        }

        let mut sum = Array1::<f32>::zeros(self.n_classes);
        for tree in &self.trees {
            let leaf = tree.leaf_for(row)?;
            let total: f32 = leaf.value.iter().sum();
            if leaf.value.len() != self.n_classes || total <= 0.0 {
                return Err(PredictionError::ModelError("Malformed leaf distribution".into()));
            }
            for (acc, w) in sum.iter_mut().zip(&leaf.value) {
                *acc += w / total;
            }
        }

        Posterior::from_probabilities(sum / self.trees.len() as f32)
    }
}
