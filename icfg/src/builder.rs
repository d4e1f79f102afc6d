//! The ICFG builder (§4.9): turns a resolved [`Module`] into a flat edge-list plus a
//! label table, keyed by `stack_name`/`bb_names`/`call_name` vertex identities.
//!
//! Grounded on `getgraph/src/control_flow_pass.cc`'s `runOnModule`/`visitFunction`/
//! `visitInstruction`/`AddCalls`/`AddMayReturnEdges`, including its own predicate-vertex
//! and label assignment (`CreatePredicateValueVertex`, the `"NAP"` sentinel).

use rustc_hash::FxHashMap;

use errspec_analysis::NameResolver;
use errspec_ir::{BlockId, FuncId, InstId, Module, Opcode, ValueId, ValueKind};

use crate::edge::{Edge, MetaLabel};
use crate::label::LabelTable;
use crate::vertex::{VertexId, VertexTable};

pub const MAIN_ENTRY: &str = "main.0";

/// The ICFG builder's output: the flat edge-list and the two interning tables it was
/// built against, as §6's serialization expects.
pub struct Icfg {
    pub vertices: VertexTable,
    pub labels: LabelTable,
    pub edges: Vec<Edge>,
}

struct Builder<'m> {
    module: &'m Module,
    names: &'m NameResolver,
    vertices: VertexTable,
    labels: LabelTable,
    edges: Vec<Edge>,
    /// Every `ret` vertex seen per function, for the §4.9 step-4 `may_ret` pass.
    return_vertices: FxHashMap<FuncId, Vec<VertexId>>,
    /// Labels attached to a vertex, applied to its outgoing edges once the whole
    /// function has been walked and those edges exist.
    vertex_labels: FxHashMap<VertexId, Vec<crate::label::LabelId>>,
}

pub fn build(module: &Module, names: &NameResolver) -> Icfg {
    let mut b = Builder {
        module,
        names,
        vertices: VertexTable::new(),
        labels: LabelTable::new(),
        edges: Vec::new(),
        return_vertices: FxHashMap::default(),
        vertex_labels: FxHashMap::default(),
    };
    b.run();
    b.apply_vertex_labels();
    Icfg {
        vertices: b.vertices,
        labels: b.labels,
        edges: b.edges,
    }
}

impl<'m> Builder<'m> {
    fn run(&mut self) {
        let main_entry = self.vertices.get_or_create(MAIN_ENTRY);

        for func in self.module.analyzable_functions().collect::<Vec<_>>() {
            let function = self.module.function(func);
            if self.module.main == Some(func) {
                if let Some(entry_block) = function.entry_block {
                    let (bbe, _) = self.names.bb_names(func, entry_block, function);
                    let entry_bbe = self.vertices.get_or_create(bbe);
                    self.edges.push(Edge::new(main_entry, entry_bbe, MetaLabel::Plain));
                }
            } else {
                let call_vertex = self.vertices.get_or_create(NameResolver::call_name(function));
                if self.module.main.is_none() {
                    self.edges.push(Edge::new(main_entry, call_vertex, MetaLabel::Main));
                }
            }
        }

        for func in self.module.analyzable_functions().collect::<Vec<_>>() {
            self.build_function(func);
        }

        self.connect_may_ret_edges();
    }

    fn build_function(&mut self, func: FuncId) {
        let function = self.module.function(func);

        for block in function.blocks.keys() {
            let insts = function.block(block).insts.clone();
            let (bbe, bbx) = self.names.bb_names(func, block, function);
            let bbe_id = self.vertices.get_or_create(bbe);
            let bbx_id = self.vertices.get_or_create(bbx);

            let mut prev = bbe_id;
            for (i, &inst) in insts.iter().enumerate() {
                let stack_name = self.names.stack_name(func, inst).to_string();
                let inst_vertex = self.vertices.get_or_create(stack_name);
                self.edges.push(Edge::new(prev, inst_vertex, MetaLabel::Plain));
                self.attach_label(func, inst, inst_vertex);
                self.visit_call(func, inst, inst_vertex, insts.get(i + 1).copied(), block);
                self.visit_return(func, inst, bbx_id);
                prev = inst_vertex;
            }
            self.edges.push(Edge::new(prev, bbx_id, MetaLabel::Plain));
        }

        for block in function.blocks.keys() {
            self.connect_successors(func, block);
        }
    }

    fn connect_successors(&mut self, func: FuncId, block: BlockId) {
        let function = self.module.function(func);
        let (_, pred_bbx) = self.names.bb_names(func, block, function);
        let pred_bbx_id = self.vertices.get_or_create(pred_bbx.clone());

        let Some(term) = function.block(block).last_inst() else { return };
        match &function.inst(term).opcode {
            Opcode::Br { target } => {
                let (succ_bbe, _) = self.names.bb_names(func, *target, function);
                let succ_id = self.vertices.get_or_create(succ_bbe);
                self.edges.push(Edge::new(pred_bbx_id, succ_id, MetaLabel::Plain));
            }
            Opcode::CondBr { cond, then_block, else_block } => {
                let (then_bbe, _) = self.names.bb_names(func, *then_block, function);
                let then_id = self.vertices.get_or_create(then_bbe);
                let (else_bbe, _) = self.names.bb_names(func, *else_block, function);
                let else_id = self.vertices.get_or_create(else_bbe);

                match self.condbr_predicate_label(func, *cond) {
                    Some(label) => {
                        let pv_id = self.vertices.get_or_create(format!("{pred_bbx}.pv"));
                        let label_id = self.labels.intern(label);
                        self.edges.push(Edge::new(pred_bbx_id, pv_id, MetaLabel::Plain));
                        let mut true_edge = Edge::new(pv_id, then_id, MetaLabel::Plain);
                        true_edge.label_ids.push(label_id);
                        self.edges.push(true_edge);
                        self.edges.push(Edge::new(pred_bbx_id, else_id, MetaLabel::Plain));
                    }
                    None => {
                        self.edges.push(Edge::new(pred_bbx_id, then_id, MetaLabel::Plain));
                        self.edges.push(Edge::new(pred_bbx_id, else_id, MetaLabel::Plain));
                    }
                }
            }
            _ => {}
        }
    }

    /// `F2V_CONDBR_<PRED>_<SIGN>` for an `icmp`-conditioned branch (§4.9 step 2); `None`
    /// for a non-`icmp` condition (the `NAP` case folds into "no predicate vertex").
    fn condbr_predicate_label(&self, func: FuncId, cond: ValueId) -> Option<String> {
        let function = self.module.function(func);
        let ValueKind::InstResult(cond_inst) = function.value(cond).kind else { return None };
        let Opcode::Icmp { pred, lhs, rhs } = &function.inst(cond_inst).opcode else { return None };
        let (pred, lhs, rhs) = (*pred, *lhs, *rhs);

        let const_sign = |v: ValueId| match function.value(v).kind {
            ValueKind::ConstInt(value) => Some(sign_name(value)),
            _ => None,
        };
        // Constant-int position swap implies predicate swap; missing constant is `NAC`.
        let (pred, sign) = if let Some(sign) = const_sign(rhs) {
            (pred, sign)
        } else if let Some(sign) = const_sign(lhs) {
            (pred.swapped(), sign)
        } else {
            (pred, "NAC")
        };
        Some(format!("F2V_CONDBR_{}_{sign}", pred.as_str()))
    }

    fn visit_call(&mut self, func: FuncId, inst: InstId, call_vertex: VertexId, next_inst: Option<InstId>, block: BlockId) {
        let function = self.module.function(func);
        let Opcode::Call { callee, .. } = &function.inst(inst).opcode else { return };
        let callee_name = self.names.of_value(self.module, func, *callee);

        let return_site = match next_inst {
            Some(next) => self.vertices.get_or_create(self.names.stack_name(func, next).to_string()),
            None => {
                let (_, bbx) = self.names.bb_names(func, block, function);
                self.vertices.get_or_create(bbx)
            }
        };

        for name in callee_name.function_names() {
            let callee_id = match self.module.find_by_source_name(name) {
                Some(id) if !self.module.function(id).is_declaration => {
                    let callee_fn = self.module.function(id);
                    self.vertices.get_or_create(NameResolver::call_name(callee_fn))
                }
                _ => self.vertices.get_or_create(name.to_string()),
            };
            self.edges.push(Edge::new(call_vertex, callee_id, MetaLabel::Call));
            self.edges.push(Edge::new(call_vertex, return_site, MetaLabel::Ret));
        }
    }

    /// `block_exit` is the block's `bbx` vertex, not the `ret` instruction's own stack
    /// vertex: `may_ret` edges need to originate somewhere with no other outgoing edge of
    /// their own, and every instruction vertex, including a `ret`'s, always has a trailing
    /// plain edge to its block's `bbx` already. Matches `control_flow_pass.cc`'s
    /// `fn2ret_`, which records the vertex the terminator's own `bbx`-edge targets.
    fn visit_return(&mut self, func: FuncId, inst: InstId, block_exit: VertexId) {
        let function = self.module.function(func);
        if matches!(function.inst(inst).opcode, Opcode::Ret { .. }) {
            self.return_vertices.entry(func).or_default().push(block_exit);
        }
    }

    /// §4.9 step 4: for each function `f`, for each call site of `f`, link `f`'s return
    /// vertex(es) to that call's return site. Derived from the `call`/`ret` edge pairs
    /// already emitted rather than tracked separately, since a call site's `ret` edge
    /// target *is* its return site by construction.
    fn connect_may_ret_edges(&mut self) {
        let call_edges: Vec<(VertexId, VertexId)> = self
            .edges
            .iter()
            .filter(|e| e.meta_label == MetaLabel::Call)
            .map(|e| (e.source, e.target))
            .collect();
        let ret_edges: FxHashMap<VertexId, VertexId> = self
            .edges
            .iter()
            .filter(|e| e.meta_label == MetaLabel::Ret)
            .map(|e| (e.source, e.target))
            .collect();
        let entry_vertex_of: FxHashMap<VertexId, FuncId> = self
            .return_vertices
            .keys()
            .map(|&f| (self.vertices.get_or_create(NameResolver::call_name(self.module.function(f))), f))
            .collect();

        let mut new_edges = Vec::new();
        for (call_vertex, callee_entry) in call_edges {
            let Some(&return_site) = ret_edges.get(&call_vertex) else { continue };
            let Some(&func) = entry_vertex_of.get(&callee_entry) else { continue };
            for &ret_vertex in self.return_vertices.get(&func).into_iter().flatten() {
                new_edges.push(Edge::new(ret_vertex, return_site, MetaLabel::MayRet));
            }
        }
        self.edges.extend(new_edges);
    }

    fn attach_label(&mut self, func: FuncId, inst: InstId, vertex: VertexId) {
        let function = self.module.function(func);
        let data = function.inst(inst);
        let parent = &function.source_name;
        let label = match &data.opcode {
            Opcode::Call { .. } => return,
            Opcode::Store { value, .. } => match self.error_code_or_const(func, *value) {
                Some(ErrKind::ErrorCode(name)) => format!("F2V_STORE_ERR_{name}_{parent}"),
                Some(ErrKind::Const(k)) => format!("F2V_INST_store_DIR_{k}_{parent}"),
                None => format!("F2V_INST_store_{parent}"),
            },
            Opcode::Load { .. } => match data.result.and_then(|r| self.error_code_or_const(func, r)) {
                Some(ErrKind::ErrorCode(name)) => format!("F2V_LOAD_ERR_{name}_{parent}"),
                _ => format!("F2V_INST_load_{parent}"),
            },
            Opcode::Ret { value } => match value.and_then(|v| self.error_code_or_const(func, v)) {
                Some(ErrKind::ErrorCode(name)) => format!("F2V_RET_{name}_{parent}"),
                Some(ErrKind::Const(k)) => format!("F2V_RET_DIR_{k}_{parent}"),
                None => format!("F2V_INST_ret_{parent}"),
            },
            Opcode::Gep { struct_ty: Some(ty), .. } => format!("F2V_GEP_{ty}"),
            Opcode::Gep { struct_ty: None, .. } => format!("F2V_INST_getelementptr_{parent}"),
            other => format!("F2V_INST_{}{parent}", other.name()),
        };
        let id = self.labels.intern(label);
        self.vertex_labels.entry(vertex).or_default().push(id);
    }

    /// Copies each vertex's accumulated labels onto every edge leaving that vertex. Split
    /// out from `attach_label` because a vertex's outgoing edges aren't all known until
    /// its successor block (possibly a later one) has been visited.
    fn apply_vertex_labels(&mut self) {
        for edge in &mut self.edges {
            if let Some(labels) = self.vertex_labels.get(&edge.source) {
                edge.label_ids.extend(labels.iter().copied());
            }
        }
    }

    fn error_code_or_const(&self, func: FuncId, value: ValueId) -> Option<ErrKind> {
        let function = self.module.function(func);
        match function.value(value).kind {
            ValueKind::ConstInt(v) => Some(ErrKind::Const(v)),
            ValueKind::Global(g) => {
                let global = self.module.global(g);
                global.error_code_name.clone().map(ErrKind::ErrorCode)
            }
            _ => None,
        }
    }
}

enum ErrKind {
    ErrorCode(String),
    Const(i64),
}

fn sign_name(value: i64) -> &'static str {
    use std::cmp::Ordering::*;
    match value.cmp(&0) {
        Equal => "ZERO",
        Less => "NEG",
        Greater => "POS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errspec_ir::fixtures;

    #[test]
    fn hello_printf_links_main_entry_to_entry_block() {
        let module = fixtures::hello_printf();
        let names = NameResolver::resolve(&module);
        let icfg = build(&module, &names);

        let main_entry_id = icfg.vertices.id_of(MAIN_ENTRY).expect("main.0 always created");
        assert!(icfg.edges.iter().any(|e| e.source == main_entry_id));
    }

    #[test]
    fn guarded_call_inserts_a_predicate_vertex() {
        let module = fixtures::guarded_call_lt_zero();
        let names = NameResolver::resolve(&module);
        let icfg = build(&module, &names);

        assert!(!icfg.labels.is_empty());
        assert!(icfg.edges.iter().any(|e| !e.label_ids.is_empty()));
    }

    #[test]
    fn two_call_sites_each_get_a_call_and_ret_edge() {
        let module = fixtures::two_call_sites();
        let names = NameResolver::resolve(&module);
        let icfg = build(&module, &names);

        let call_edges = icfg.edges.iter().filter(|e| e.meta_label == MetaLabel::Call).count();
        let ret_edges = icfg.edges.iter().filter(|e| e.meta_label == MetaLabel::Ret).count();
        assert_eq!(call_edges, 2);
        assert_eq!(ret_edges, 2);
    }
}
