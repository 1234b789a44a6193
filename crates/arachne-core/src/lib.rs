//! arachne-core - Comparison analysis for the Arachne client.
//!
//! This crate provides the building blocks for:
//! - Expanding one compared output variable into its causal [`Chain`] of
//!   contributing inputs, ordered by contribution score
//! - Filtering a chain by significance level for display
//! - Indexing a comparison's outputs by category and type
//!
//! Everything here is pure and synchronous: the caller hands in a fully
//! materialized slice of [`DiffRecord`]s (retrieved by the `arachne` client
//! crate) and gets back an independently owned structure. The input records
//! are never mutated, so one raw comparison can safely back chain requests
//! for any number of roots.
//!
//! # Building a chain
//!
//! ```
//! use arachne_core::{Chain, DEFAULT_SIG_LEVEL};
//! # use arachne_api::{Category, DiffRecord};
//! # use std::collections::BTreeMap;
//! # fn record(name: &str, score: f64, inputs: &[(&str, f64)]) -> DiffRecord {
//! #     DiffRecord {
//! #         name: name.to_string(),
//! #         category: Category::Social,
//! #         diff_type: "nbmood".to_string(),
//! #         score,
//! #         inputs: inputs.iter().map(|(n, w)| (n.to_string(), *w)).collect(),
//! #         leaf: inputs.is_empty(),
//! #     }
//! # }
//!
//! let records = vec![
//!     record("nbmood.N1", 64.0, &[("sat.N1.AUT", 80.0), ("sat.N1.SFT", 30.0)]),
//!     record("sat.N1.AUT", 80.0, &[]),
//!     record("sat.N1.SFT", 30.0, &[]),
//! ];
//!
//! let chain = Chain::build(&records, "nbmood.N1")?;
//! assert_eq!(chain.len(), 3);
//!
//! // Inputs scoring below the significance level are hidden, along with
//! // their whole subtrees.
//! let visible = chain.visible_items(DEFAULT_SIG_LEVEL);
//! assert_eq!(visible.len(), 3);
//! # Ok::<(), arachne_core::ChainError>(())
//! ```

mod chain;
mod outputs;

pub use chain::{Chain, ChainError, ChainNode, DEFAULT_SIG_LEVEL, SIG_LEVELS};
pub use outputs::OutputIndex;

// Re-exported so chain consumers don't need a direct arachne-api dependency.
pub use arachne_api::{Category, DiffRecord};
