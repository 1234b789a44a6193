//! Causal chain construction and significance filtering.
//!
//! A comparison delivers a flat list of named, cross-referencing
//! [`DiffRecord`]s. [`Chain::build`] expands one of them into a rooted tree,
//! flattened in pre-order: each node's inputs follow it immediately, sorted
//! by descending contribution score. A variable contributing to several
//! parents appears once per incoming edge, so the result is a tree, not a
//! shared DAG.

use arachne_api::{Category, DiffRecord};
use std::collections::BTreeMap;

/// The significance ladder offered for chain filtering.
pub const SIG_LEVELS: [f64; 21] = [
    100.0, 95.0, 90.0, 85.0, 80.0, 75.0, 70.0, 65.0, 60.0, 55.0, 50.0, 45.0, 40.0, 35.0, 30.0,
    25.0, 20.0, 15.0, 10.0, 5.0, 0.0,
];

/// Default significance level for chain display.
pub const DEFAULT_SIG_LEVEL: f64 = 20.0;

/// Failure to build a chain. All of these are data-integrity violations in
/// the comparison data; none are retryable here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The requested root variable has no record in the comparison.
    #[error("no output variable named {0:?} in the comparison")]
    RootNotFound(String),

    /// A record's `inputs` names a variable with no record of its own.
    #[error("variable {name:?}, listed as an input of {referenced_by:?}, has no record")]
    BrokenReference { name: String, referenced_by: String },

    /// The input graph loops back on itself. Expansion fails fast rather
    /// than truncating: a cycle means the comparison data is corrupt.
    #[error("cyclic input graph: {name:?} contributes to its own ancestry")]
    CycleDetected { name: String },
}

/// One entry in a built chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainNode {
    /// Position in the chain sequence (0-based; the root is 0).
    pub id: usize,
    /// Variable name. The same name may appear at several ids when the
    /// variable contributes to more than one parent.
    pub name: String,
    pub category: Category,
    pub diff_type: String,
    /// The parent's recorded contribution weight for this node. This is the
    /// score used for ordering and significance filtering. For the root it
    /// is the variable's own intrinsic score.
    pub score: f64,
    /// The variable's own significance score from its raw record.
    pub intrinsic_score: f64,
    /// Contribution weights of this node's own inputs, by name.
    pub inputs: BTreeMap<String, f64>,
    /// Id of the node that listed this one as an input; `None` for the root.
    pub parent: Option<usize>,
    /// Depth from the root (root = 0).
    pub level: usize,
}

impl ChainNode {
    /// Whether this variable has no further inputs.
    pub fn is_leaf(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// The causal chain for one output variable: a rooted tree flattened in
/// pre-order, children in non-increasing score order.
///
/// Built once per (comparison, variable) pair and never mutated; significance
/// filtering is a query, not a transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    nodes: Vec<ChainNode>,
}

impl Chain {
    /// Expand `root` into its causal chain over `records`.
    ///
    /// The records are only borrowed; every node is freshly allocated.
    /// Children are ordered by descending contribution score, with ties
    /// broken by ascending variable name.
    pub fn build(records: &[DiffRecord], root: &str) -> Result<Self, ChainError> {
        let index: BTreeMap<&str, &DiffRecord> =
            records.iter().map(|r| (r.name.as_str(), r)).collect();

        let root_record = *index
            .get(root)
            .ok_or_else(|| ChainError::RootNotFound(root.to_string()))?;

        let mut nodes = vec![ChainNode {
            id: 0,
            name: root_record.name.clone(),
            category: root_record.category,
            diff_type: root_record.diff_type.clone(),
            score: root_record.score,
            intrinsic_score: root_record.score,
            inputs: root_record.inputs.clone(),
            parent: None,
            level: 0,
        }];

        let mut path = vec![root_record.name.as_str()];
        extend(&mut nodes, &index, &mut path, 0, root_record)?;

        Ok(Chain { nodes })
    }

    /// All nodes, in chain order.
    pub fn nodes(&self) -> &[ChainNode] {
        &self.nodes
    }

    /// The node at the given chain position.
    pub fn get(&self, id: usize) -> Option<&ChainNode> {
        self.nodes.get(id)
    }

    /// The root node.
    pub fn root(&self) -> &ChainNode {
        &self.nodes[0]
    }

    /// Number of nodes in the chain (counting duplicated sub-causes once
    /// per incoming edge).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the node at `id` is visible at the given significance level.
    ///
    /// The root is always visible. Any other node is visible when its own
    /// contribution score meets the threshold *and* its parent is visible:
    /// an insignificant ancestor hides the entire subtree beneath it, no
    /// matter how strongly a descendant contributes to its own parent.
    pub fn visible(&self, id: usize, sig_level: f64) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        match node.parent {
            None => true,
            Some(parent) => node.score >= sig_level && self.visible(parent, sig_level),
        }
    }

    /// The order-preserving subsequence of nodes visible at the given
    /// significance level. Recomputed on each call; the threshold changes
    /// interactively while the chain itself never does.
    pub fn visible_items(&self, sig_level: f64) -> Vec<&ChainNode> {
        // Parents always precede children in pre-order, so one forward
        // pass settles visibility without re-walking ancestors.
        let mut visible = vec![false; self.nodes.len()];
        let mut items = Vec::new();

        for (i, node) in self.nodes.iter().enumerate() {
            visible[i] = match node.parent {
                None => true,
                Some(parent) => node.score >= sig_level && visible[parent],
            };
            if visible[i] {
                items.push(node);
            }
        }

        items
    }
}

/// Append `record`'s inputs (and, depth-first, their own inputs) to the
/// chain. `path` carries the ancestor names for cycle detection.
fn extend<'a>(
    nodes: &mut Vec<ChainNode>,
    index: &BTreeMap<&str, &'a DiffRecord>,
    path: &mut Vec<&'a str>,
    parent_id: usize,
    record: &'a DiffRecord,
) -> Result<(), ChainError> {
    let level = nodes[parent_id].level + 1;

    // BTreeMap iteration is name-ascending and the sort is stable, so
    // equal-score siblings end up in name order.
    let mut inputs: Vec<(&str, f64)> = record
        .inputs
        .iter()
        .map(|(name, weight)| (name.as_str(), *weight))
        .collect();
    inputs.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (name, weight) in inputs {
        let input = *index
            .get(name)
            .ok_or_else(|| ChainError::BrokenReference {
                name: name.to_string(),
                referenced_by: record.name.clone(),
            })?;

        if path.contains(&name) {
            return Err(ChainError::CycleDetected {
                name: name.to_string(),
            });
        }

        let id = nodes.len();
        nodes.push(ChainNode {
            id,
            name: input.name.clone(),
            category: input.category,
            diff_type: input.diff_type.clone(),
            score: weight,
            intrinsic_score: input.score,
            inputs: input.inputs.clone(),
            parent: Some(parent_id),
            level,
        });

        path.push(input.name.as_str());
        extend(nodes, index, path, id, input)?;
        path.pop();
    }

    Ok(())
}
