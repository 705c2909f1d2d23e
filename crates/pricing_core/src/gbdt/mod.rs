//! Gradient-boosted regression tree inference
//!
//! Evaluates a pre-fitted ensemble exported to JSON. The engine only reads
//! models; fitting happens elsewhere.
//!
//! # Model Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "bias": 1523.75,
//!   "num_features": 3,
//!   "trees": [
//!     {
//!       "nodes": [
//!         {"id":0,"left":1,"right":2,"feature_idx":2,"threshold":0.5,"leaf":null,"default_left":true},
//!         {"id":1,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":-120.0},
//!         {"id":2,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":340.5}
//!       ],
//!       "weight": 1.0
//!     }
//!   ]
//! }
//! ```
//!
//! # Usage
//!
//! ```rust
//! use jewel_pricing_core::gbdt::{Model, Node, Tree};
//!
//! let tree = Tree::new(
//!     vec![
//!         Node::internal(0, 0, 0.5, 1, 2),
//!         Node::leaf(1, 100.0),
//!         Node::leaf(2, 200.0),
//!     ],
//!     1.0,
//! );
//! let model = Model::new(vec![tree], 50.0);
//!
//! assert_eq!(model.predict(&[0.25]), 150.0);
//! let digest = model.hash_hex().unwrap();
//! assert_eq!(digest.len(), 64);
//! ```

pub mod model;
pub mod tree;

pub use model::{Model, ModelError, MODEL_FORMAT_VERSION};
pub use tree::{Node, Tree};
