//! Regression tree structures for ensemble inference
//!
//! Node 0 is the root. Internal nodes send a sample left when its feature
//! value is `<= threshold`; missing values (NaN) follow `default_left`.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A decision tree node (internal or leaf)
///
/// For internal nodes `feature_idx >= 0`, `left`/`right` index into the
/// tree's node list and `leaf` is `None`. Leaves carry `feature_idx == -1`
/// and the predicted value in `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (for reference, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    #[serde(rename = "feature_idx", alias = "feature")]
    pub feature_idx: i32,

    /// Split threshold
    pub threshold: f64,

    /// Leaf value (Some for leaf nodes, None for internal nodes)
    pub leaf: Option<f64>,

    /// Direction taken when the feature value is missing
    #[serde(default = "default_true")]
    pub default_left: bool,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
            default_left: true,
        }
    }

    /// Create a new leaf node
    pub fn leaf(id: i32, value: f64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(value),
            default_left: true,
        }
    }

    /// Route missing values to the right child instead of the left
    pub fn missing_goes_right(mut self) -> Self {
        self.default_left = false;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single regression tree and its ensemble weight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,

    /// Multiplier applied to this tree's leaf output (shrinkage)
    pub weight: f64,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, weight: f64) -> Self {
        Self { nodes, weight }
    }

    /// Walk the tree and return the reached leaf value.
    ///
    /// Structure is checked by [`Tree::validate`] when a model is loaded;
    /// a malformed path evaluates to `0.0`.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if node.is_leaf() {
                return node.leaf.unwrap_or(0.0);
            }

            let Some(&value) = features.get(node.feature_idx as usize) else {
                return 0.0;
            };

            let go_left = if value.is_nan() {
                node.default_left
            } else {
                value <= node.threshold
            };

            let next = if go_left { node.left } else { node.right };
            if next < 0 {
                return 0.0;
            }
            idx = next as usize;
        }
    }

    /// Largest feature index referenced by any split
    pub fn max_feature_index(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter(|n| !n.is_leaf())
            .map(|n| n.feature_idx as usize)
            .max()
    }

    /// Validate tree structure
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }
        if !self.weight.is_finite() {
            return Err(format!("Tree weight is not finite: {}", self.weight));
        }

        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    None => return Err(format!("Leaf node {i} has no leaf value")),
                    Some(v) if !v.is_finite() => {
                        return Err(format!("Leaf node {i} has non-finite value {v}"))
                    }
                    Some(_) => {}
                }
                continue;
            }

            if node.left < 0 || node.left as usize >= len {
                return Err(format!("Node {} has invalid left child: {}", i, node.left));
            }
            if node.right < 0 || node.right as usize >= len {
                return Err(format!("Node {} has invalid right child: {}", i, node.right));
            }
            // Children must come after their parent, which rules out cycles.
            if node.left as usize <= i || node.right as usize <= i {
                return Err(format!("Node {i} points backwards to an ancestor slot"));
            }
            if node.feature_idx < 0 {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }
            if node.threshold.is_nan() {
                return Err(format!("Internal node {i} has NaN threshold"));
            }
        }

        Ok(())
    }
}
