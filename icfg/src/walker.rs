//! The context-sensitive random walker (§4.11): samples "sentences" (label sequences)
//! from an [`Lpds`], threading a per-walk return stack so a walk that descends into a
//! callee resurfaces at the matching call's return site rather than an arbitrary one.
//!
//! Grounded on `walker/src/walker.cc`'s `Walker` class: the pop-transition /
//! call-push split below mirrors its step-selection logic one for one.

use parking_lot::Mutex;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::lpds::{Lpds, LpdsEdge, NodeRef};

#[derive(Debug, Clone, Default)]
pub struct WalkConfig {
    pub walks_per_label: usize,
    pub walk_length: usize,
}

/// One sampled walk: the label it started from, and every label emitted along the way
/// (the start label is always first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub start_label: String,
    pub labels: Vec<String>,
}

impl Sentence {
    /// Newline-delimited, space-separated text form (§6's fallback walker output).
    pub fn to_text(&self) -> String {
        self.labels.join(" ")
    }
}

pub trait SentenceWriter: Send {
    fn write_sentence(&mut self, sentence: Sentence);
}

/// A writer that just accumulates sentences in memory, for callers that want the whole
/// batch rather than a streaming sink.
#[derive(Debug, Default)]
pub struct VecSentenceWriter(pub Vec<Sentence>);

impl SentenceWriter for VecSentenceWriter {
    fn write_sentence(&mut self, sentence: Sentence) {
        self.0.push(sentence);
    }
}

/// Chooses the edge a walk takes out of `current`, mutating `return_stack` per the
/// call-push / pop-transition rules (§4.11 step 2). Returns `None` when the walk must
/// terminate (`current` has no outgoing edges, or the return stack is exhausted at a
/// dead end).
fn select_edge(lpds: &Lpds, current: NodeRef, return_stack: &mut Vec<LpdsEdge>, rng: &mut ThreadRng) -> Option<LpdsEdge> {
    let out_edges = lpds.out_edges(current);
    if out_edges.is_empty() {
        return None;
    }
    if out_edges.len() == 1 {
        return Some(out_edges[0].clone());
    }

    let (may_return, others): (Vec<&LpdsEdge>, Vec<&LpdsEdge>) = out_edges.iter().partition(|e| e.is_may_return);
    if others.is_empty() {
        if let Some(popped) = return_stack.pop() {
            return Some(popped);
        }
        return may_return.choose(rng).map(|&e| e.clone());
    }

    let chosen = (*others.choose(rng).expect("others is non-empty")).clone();
    if chosen.is_call {
        for edge in out_edges.iter().filter(|e| !e.is_call) {
            return_stack.push(edge.clone());
        }
    }
    Some(chosen)
}

/// One walk starting from `start_label`: step 1 picks the starting edge, the loop in
/// step 2-3 extends the sentence, step 4 is left to the caller (it hands the result to
/// the writer).
fn walk_from(lpds: &Lpds, start_label: &str, walk_length: usize, rng: &mut ThreadRng) -> Option<Sentence> {
    let start_edges = lpds.edges_for_label(start_label);
    let start_edge = start_edges.choose(rng)?;
    let mut labels = vec![start_label.to_string()];
    let mut current = start_edge.target;
    let mut return_stack: Vec<LpdsEdge> = Vec::new();

    while labels.len() < walk_length {
        let Some(edge) = select_edge(lpds, current, &mut return_stack, rng) else { break };
        if let Some(label) = edge.labels.choose(rng) {
            labels.push(label.clone());
        }
        current = edge.target;
    }

    Some(Sentence { start_label: start_label.to_string(), labels })
}

/// Runs `config.walks_per_label` walks for every label in `lpds`, in parallel, writing
/// each completed sentence through `writer` (serialized behind its mutex). Labels are
/// reshuffled for each round of walks, per §4.11's "Scheduling" note.
pub fn random_walk<W: SentenceWriter>(lpds: &Lpds, config: &WalkConfig, writer: &Mutex<W>) {
    let mut labels: Vec<String> = lpds.all_labels().map(str::to_string).collect();
    if labels.is_empty() || config.walks_per_label == 0 {
        return;
    }

    let mut tasks: Vec<String> = Vec::with_capacity(labels.len() * config.walks_per_label);
    for _ in 0..config.walks_per_label {
        labels.shuffle(&mut rand::thread_rng());
        tasks.extend(labels.iter().cloned());
    }

    tasks.par_iter().for_each(|label| {
        let mut rng = rand::thread_rng();
        if let Some(sentence) = walk_from(lpds, label, config.walk_length, &mut rng) {
            writer.lock().write_sentence(sentence);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;
    use crate::lpds;
    use errspec_analysis::NameResolver;
    use errspec_ir::fixtures;

    #[test]
    fn walk_emits_the_start_label_first() {
        let module = fixtures::guarded_call_lt_zero();
        let names = NameResolver::resolve(&module);
        let icfg = builder::build(&module, &names);
        let graph = lpds::ingest(&icfg);

        let label = graph.all_labels().next().expect("fixture has at least one label").to_string();
        let mut rng = rand::thread_rng();
        let sentence = walk_from(&graph, &label, 5, &mut rng).expect("edges_for_label is non-empty");
        assert_eq!(sentence.labels.first(), Some(&label));
        assert!(sentence.labels.len() <= 5);
    }

    #[test]
    fn random_walk_produces_walks_per_label_times_label_count_sentences() {
        let module = fixtures::two_call_sites();
        let names = NameResolver::resolve(&module);
        let icfg = builder::build(&module, &names);
        let graph = lpds::ingest(&icfg);

        let label_count = graph.all_labels().count();
        let config = WalkConfig { walks_per_label: 3, walk_length: 4 };
        let writer = Mutex::new(VecSentenceWriter::default());
        random_walk(&graph, &config, &writer);

        assert_eq!(writer.lock().0.len(), label_count * config.walks_per_label);
    }

    #[test]
    fn empty_graph_produces_no_walks() {
        let graph = Lpds::new();
        let config = WalkConfig { walks_per_label: 5, walk_length: 4 };
        let writer = Mutex::new(VecSentenceWriter::default());
        random_walk(&graph, &config, &writer);
        assert!(writer.lock().0.is_empty());
    }

    /// `two_call_sites` calls `foo` from two call sites in `main`; a walk that enters
    /// `foo` through the first call site's call edge must, on the `may_return` pop out of
    /// `foo`, land back on that same call site's own return site, never the second call
    /// site's. Simulates having just taken call site one's call edge (pushing its own
    /// non-call out edges onto the return stack, exactly as `select_edge` itself would),
    /// then drives `select_edge` through `foo` and checks where the pop actually lands.
    #[test]
    fn walk_entering_foo_via_one_call_site_pops_back_to_that_sites_return_site() {
        let module = fixtures::two_call_sites();
        let names = NameResolver::resolve(&module);
        let icfg = builder::build(&module, &names);
        let graph = lpds::ingest(&icfg);

        // `foo`'s body is a single `ret`, assigned the module's first stack name, which
        // coincides with `NameResolver::call_name(foo)`; `main`'s four instructions
        // (call, call, add, ret) follow as `main.1`..`main.4`.
        let call_site_one = graph.node_ref("main.1").expect("call site one's own vertex");
        let foo_entry = graph.node_ref("foo.0").expect("foo's entry is its sole instruction");
        let foo_exit = graph.node_ref("foo.0bbx").expect("foo's block-exit vertex");
        let call_site_one_return = graph.node_ref("main.2").expect("call site one's return site is call site two's own vertex");
        let call_site_two_return = graph.node_ref("main.3").expect("call site two's return site is the add instruction");

        let mut return_stack: Vec<LpdsEdge> = graph
            .out_edges(call_site_one)
            .iter()
            .filter(|e| !e.is_call)
            .cloned()
            .collect();
        assert!(!return_stack.is_empty(), "call site one has a non-call out edge to push");

        let mut rng = rand::thread_rng();
        let into_foo =
            select_edge(&graph, foo_entry, &mut return_stack, &mut rng).expect("foo's entry has exactly one outgoing edge");
        assert_eq!(into_foo.target, foo_exit);

        let popped = select_edge(&graph, foo_exit, &mut return_stack, &mut rng).expect("return stack is non-empty");
        assert_eq!(popped.target, call_site_one_return);
        assert_ne!(popped.target, call_site_two_return);
    }
}
