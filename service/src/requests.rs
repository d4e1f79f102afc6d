//! External request/response shapes (§6). These mirror the RPC messages directly; they
//! carry `serde` derives so they can round-trip as the length-delimited / JSON forms the
//! boundary actually sends, without depending on a specific wire codec crate.

use serde::{Deserialize, Serialize};

use errspec_analysis::ViolationKind;
use errspec_icfg::MetaLabel;
use errspec_lattice::SignLatticeElement;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationRequest {
    pub function: String,
    pub lattice_element: SignLatticeElement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetViolationsRequest {
    pub bitcode_handle: String,
    pub specifications: Vec<SpecificationRequest>,
    pub violation_type: Option<ViolationKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorCode {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetGraphRequest {
    pub bitcode_handle: String,
    pub output_uri: String,
    /// Suppress indirect-call edges whose caller and callee lie in different top-level
    /// source folders. A folder literally named `include` is exempt from suppression.
    pub remove_cross_folder: bool,
    pub error_codes: Vec<ErrorCode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomWalkRequest {
    pub input_uri: String,
    pub output_uri: String,
    pub walks_per_label: usize,
    pub walk_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub kind: ViolationKind,
    pub file: String,
    pub line: u32,
    pub parent: String,
    pub callee: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GetViolationsResponse {
    pub violations: Vec<ViolationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    /// `""`, `"call"`, `"ret"`, or `"may_ret"` (§6).
    pub meta_label: String,
    pub source_file: String,
    pub source_line: u32,
    pub label_ids: Vec<u32>,
}

impl EdgeRecord {
    pub fn meta_label_str(meta_label: MetaLabel) -> &'static str {
        meta_label.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphResponse {
    pub edges: Vec<EdgeRecord>,
    pub id_to_label: std::collections::BTreeMap<u32, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub start_label: String,
    pub labels: Vec<String>,
}
