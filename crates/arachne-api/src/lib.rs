//! Wire types for the Arachne scenario server's JSON protocol.
//!
//! This crate contains only the type definitions for the JSON documents the
//! server produces: server metadata, case and scenario-file records,
//! comparison records with their scored output differences, model parameter
//! records, and history metadata. Mutating requests answer with a positional
//! status array, parsed by the [`envelope`] module into a tagged union.
//!
//! No I/O happens here; the HTTP client lives in the `arachne` crate.

mod envelope;

pub use envelope::{Envelope, EnvelopeError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Server metadata from `/meta.json`.
///
/// Retrieved on startup and then periodically; a changed `start_time` means
/// the server restarted and all cached records are stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMeta {
    /// Server version string, e.g. "v1.3.0".
    pub version: String,
    /// Server start time in milliseconds since the epoch.
    pub start_time: u64,
}

/// Lifecycle state of a simulation case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaseState {
    /// Unlocked: scenario inputs may still be edited.
    Prep,
    /// Locked and idle at some simulation time.
    Paused,
    /// Locking, unlocking, or otherwise occupied.
    Busy,
    /// Advancing simulation time.
    Running,
    /// A state this client doesn't know. Newer servers may grow states;
    /// treat them as locked and settled.
    #[serde(other)]
    Unknown,
}

impl CaseState {
    /// Whether the case is occupied and should be polled rather than mutated.
    pub fn is_busy(self) -> bool {
        matches!(self, CaseState::Busy | CaseState::Running)
    }

    /// Whether scenario inputs may be edited.
    pub fn is_unlocked(self) -> bool {
        self == CaseState::Prep
    }
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseState::Prep => "PREP",
            CaseState::Paused => "PAUSED",
            CaseState::Busy => "BUSY",
            CaseState::Running => "RUNNING",
            CaseState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// One simulation case, from `/scenario/index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Case ID, e.g. "case00".
    pub id: String,
    /// Human-readable name.
    pub longname: String,
    pub state: CaseState,
    /// Current simulation time in ticks (weeks).
    #[serde(default)]
    pub tick: u64,
}

/// One scenario file on the server, from `/scenario/files.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File name; doubles as the record key.
    pub id: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Modification date as reported by the server.
    #[serde(default)]
    pub date: String,
}

/// Output category, the top level of the diff taxonomy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Political,
    Military,
    Economic,
    Social,
    Information,
    Infrastructure,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 6] = [
        Category::Political,
        Category::Military,
        Category::Economic,
        Category::Social,
        Category::Information,
        Category::Infrastructure,
    ];

    /// Display name for the category.
    pub fn name(self) -> &'static str {
        match self {
            Category::Political => "Political",
            Category::Military => "Military",
            Category::Economic => "Economic",
            Category::Social => "Social",
            Category::Information => "Information",
            Category::Infrastructure => "Infrastructure",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One compared output variable between two cases.
///
/// `inputs` maps contributing variable names to their contribution weight
/// on the 0-100 significance scale. A `BTreeMap` keeps iteration in name
/// order, which downstream consumers rely on for deterministic tie-breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRecord {
    /// Unique variable name, e.g. "nbmood.N1".
    pub name: String,
    pub category: Category,
    /// Sub-classification within the category, e.g. "nbmood".
    #[serde(rename = "type")]
    pub diff_type: String,
    /// Intrinsic significance score of this difference.
    pub score: f64,
    /// Contributing variable names and their contribution weights.
    #[serde(default)]
    pub inputs: BTreeMap<String, f64>,
    /// Denormalized "has no inputs" flag. Consumers should derive leafness
    /// from `inputs` rather than trust this.
    #[serde(default)]
    pub leaf: bool,
}

impl DiffRecord {
    /// Whether this variable has no contributing inputs. Computed from
    /// `inputs`; the wire `leaf` flag is ignored.
    pub fn is_leaf(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// One comparison of two cases, from `/comparison/index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompRecord {
    /// Comparison ID, e.g. "case00/case01".
    pub id: String,
    pub case1: String,
    /// Absent when the comparison is of a single case against its own start.
    #[serde(default)]
    pub case2: Option<String>,
    #[serde(default)]
    pub longname: Option<String>,
    /// Significant output differences, one per compared variable.
    #[serde(default)]
    pub outputs: Vec<DiffRecord>,
}

/// One model parameter, from `/scenario/{case}/parmdb.json`.
///
/// The parameter database is a full hierarchy; nodes without a `value` are
/// grouping entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParmRecord {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
}

impl ParmRecord {
    /// Whether this parameter carries a value differing from its default.
    pub fn changed(&self) -> bool {
        match &self.value {
            Some(v) => self.default.as_deref() != Some(v.as_str()),
            None => false,
        }
    }
}

/// Key column of a history variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryKey {
    pub key: String,
}

/// Metadata for one history variable, from
/// `/scenario/{case}/history/meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryVar {
    /// History table name, e.g. "nbmood".
    pub name: String,
    /// Key columns needed to select a single time series.
    #[serde(default)]
    pub keys: Vec<HistoryKey>,
}

/// One row of a history time series, from
/// `/scenario/{case}/history/{varname}/index.json`. The column set varies
/// by variable (the key columns plus `t` and the values), so rows stay
/// schemaless; a `BTreeMap` keeps the columns in a stable order.
pub type HistoryRow = BTreeMap<String, serde_json::Value>;
