//! The labeled pushdown system (§4.10): the graph structure the random walker actually
//! walks, built by ingesting an [`Icfg`]'s edge-list.
//!
//! Grounded on `walker/src/lpds.cc`'s `Lpds` class: nodes keyed by name, adjacency
//! lists per source, and a label-to-edge-list multimap for `edges_for_label`.

use rustc_hash::FxHashMap;

use crate::builder::{Icfg, MAIN_ENTRY};
use crate::edge::MetaLabel;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);

/// A single LPDS edge: the call-graph bits the walker needs (`is_call`/`is_may_return`),
/// the labels sampled when the edge is taken, and the callee names a call edge carries
/// (used for reporting, not for the walk itself).
#[derive(Debug, Clone)]
pub struct LpdsEdge {
    pub target: NodeRef,
    pub is_call: bool,
    pub is_may_return: bool,
    pub callees: Vec<String>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Lpds {
    names: Vec<String>,
    by_name: FxHashMap<String, NodeRef>,
    adjacency: Vec<Vec<LpdsEdge>>,
    by_label: FxHashMap<String, Vec<(NodeRef, usize)>>,
}

impl Lpds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent by name.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeRef {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = NodeRef(self.names.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.names.push(name);
        self.adjacency.push(Vec::new());
        id
    }

    /// Requires both `source` and `target` to already be present (panics otherwise, per
    /// §4.10's "requires both nodes already present").
    pub fn add_edge(&mut self, source: NodeRef, edge: LpdsEdge) {
        assert!((source.0 as usize) < self.adjacency.len(), "source node not yet added");
        assert!((edge.target.0 as usize) < self.names.len(), "target node not yet added");
        let edge_index = self.adjacency[source.0 as usize].len();
        for label in &edge.labels {
            self.by_label.entry(label.clone()).or_default().push((source, edge_index));
        }
        self.adjacency[source.0 as usize].push(edge);
    }

    pub fn node_ref(&self, name: &str) -> Option<NodeRef> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, node: NodeRef) -> &str {
        &self.names[node.0 as usize]
    }

    pub fn out_edges(&self, node: NodeRef) -> &[LpdsEdge] {
        &self.adjacency[node.0 as usize]
    }

    pub fn edges_for_label(&self, label: &str) -> Vec<&LpdsEdge> {
        self.by_label
            .get(label)
            .into_iter()
            .flatten()
            .map(|&(node, idx)| &self.adjacency[node.0 as usize][idx])
            .collect()
    }

    pub fn all_labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_label.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }
}

/// Ingest an [`Icfg`]'s edge-list into an [`Lpds`] (§4.10's ingestion rules).
///
/// Edges sourced at the synthetic `"main.0"` vertex are dropped: they exist only to give
/// the ICFG a single root and carry no walkable semantics of their own.
pub fn ingest(icfg: &Icfg) -> Lpds {
    let mut lpds = Lpds::new();
    for (_, name) in icfg.vertices.iter() {
        lpds.add_node(name);
    }

    // Deduplicated callee names per call-site source vertex, attached to every `call`
    // edge out of that vertex (§4.10: "if the source is a call node, attach a
    // deduplicated label naming each callee").
    let mut callees_by_source: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for edge in &icfg.edges {
        if edge.meta_label == MetaLabel::Call {
            let source_name = icfg.vertices.name_of(edge.source);
            let target_name = icfg.vertices.name_of(edge.target);
            let list = callees_by_source.entry(source_name).or_default();
            if !list.contains(&target_name) {
                list.push(target_name);
            }
        }
    }

    for edge in &icfg.edges {
        let source_name = icfg.vertices.name_of(edge.source);
        if source_name == MAIN_ENTRY {
            continue;
        }
        let source_ref = lpds.node_ref(source_name).expect("node created above");
        let target_ref = lpds.node_ref(icfg.vertices.name_of(edge.target)).expect("node created above");

        let is_call = edge.meta_label == MetaLabel::Call;
        // `"ret"` edges become plain edges in the LPDS: they exist in the ICFG only to
        // mark the return site, the walker doesn't treat them specially.
        let is_may_return = edge.meta_label == MetaLabel::MayRet;

        let mut labels: Vec<String> = edge
            .label_ids
            .iter()
            .filter_map(|&id| icfg.labels.get(id))
            .map(str::to_string)
            .collect();
        if is_call {
            labels.extend(callees_by_source.get(source_name).into_iter().flatten().map(|s| s.to_string()));
        }

        lpds.add_edge(
            source_ref,
            LpdsEdge {
                target: target_ref,
                is_call,
                is_may_return,
                callees: callees_by_source.get(source_name).into_iter().flatten().map(|s| s.to_string()).collect(),
                labels,
            },
        );
    }

    lpds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;
    use errspec_analysis::NameResolver;
    use errspec_ir::fixtures;

    #[test]
    fn main_sourced_edges_are_dropped() {
        let module = fixtures::hello_printf();
        let names = NameResolver::resolve(&module);
        let icfg = builder::build(&module, &names);
        let lpds = ingest(&icfg);

        let main_node = lpds.node_ref(MAIN_ENTRY).expect("main.0 exists");
        assert!(lpds.out_edges(main_node).is_empty());
    }

    #[test]
    fn call_edges_carry_callee_labels() {
        let module = fixtures::two_call_sites();
        let names = NameResolver::resolve(&module);
        let icfg = builder::build(&module, &names);
        let lpds = ingest(&icfg);

        // `foo` is a defined (non-declaration) function, so its callee identity is its
        // call-entry vertex name, `"foo.0"` (see `NameResolver::call_name`).
        assert!(lpds.all_labels().any(|l| l == "foo.0"));
        let foo_edges = lpds.edges_for_label("foo.0");
        assert!(!foo_edges.is_empty());
        assert!(foo_edges.iter().all(|e| e.is_call));
    }
}
