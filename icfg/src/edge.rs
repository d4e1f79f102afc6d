use errspec_ir::Location;

use crate::label::LabelId;
use crate::vertex::VertexId;

/// The edge-kind tag carried by every ICFG edge (§4.9/§6's `meta_label`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MetaLabel {
    /// An ordinary intraprocedural control-flow edge.
    Plain,
    /// `"main"`-tagged edge from the synthetic `main.0` root to a function with no
    /// `main` present in the module (§4.9 step 1).
    Main,
    /// Call-site to callee-entry edge.
    Call,
    /// Call-site to return-site edge.
    Ret,
    /// Callee-return-vertex to caller-return-site edge (§4.9 step 4).
    MayRet,
}

impl MetaLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            MetaLabel::Plain => "",
            MetaLabel::Main => "main",
            MetaLabel::Call => "call",
            MetaLabel::Ret => "ret",
            MetaLabel::MayRet => "may_ret",
        }
    }
}

/// A single directed ICFG edge, exactly as the builder emits it for serialization (§6's
/// edge-list record).
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    pub meta_label: MetaLabel,
    pub source_location: Option<Location>,
    pub label_ids: Vec<LabelId>,
}

impl Edge {
    pub fn new(source: VertexId, target: VertexId, meta_label: MetaLabel) -> Self {
        Self {
            source,
            target,
            meta_label,
            source_location: None,
            label_ids: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.source_location = Some(location);
        self
    }
}
