//! String interning for ICFG/LPDS labels (§4.9's "Labels are strings interned into a
//! single id-to-label table").
//!
//! Grounded in the same arena-plus-reverse-map shape `errspec-ir`'s entities use, just
//! without `cranelift-entity`'s macro since this id only ever needs equality and lookup.

use rustc_hash::FxHashMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(u32);

impl LabelId {
    /// The raw index this id was assigned, for external serialization (§6's
    /// `label_id[]`).
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A single id-to-label table, shared by the ICFG builder (which assigns ids) and the
/// LPDS/walker (which only ever read them back).
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: Vec<String>,
    by_label: FxHashMap<String, LabelId>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `label`, returning its existing id if already present.
    pub fn intern(&mut self, label: impl Into<String>) -> LabelId {
        let label = label.into();
        if let Some(&id) = self.by_label.get(&label) {
            return id;
        }
        let id = LabelId(self.labels.len() as u32);
        self.by_label.insert(label.clone(), id);
        self.labels.push(label);
        id
    }

    pub fn get(&self, id: LabelId) -> Option<&str> {
        self.labels.get(id.0 as usize).map(String::as_str)
    }

    pub fn id_of(&self, label: &str) -> Option<LabelId> {
        self.by_label.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The full id-to-label map, as an external `GetGraphResponse` would serialize it
    /// (§6's `id_to_label: map<int, Label>`).
    pub fn as_map(&self) -> FxHashMap<u32, &str> {
        self.labels.iter().enumerate().map(|(i, l)| (i as u32, l.as_str())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut table = LabelTable::new();
        let a = table.intern("F2V_INST_alloca_main");
        let b = table.intern("F2V_INST_alloca_main");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_labels_get_distinct_ids() {
        let mut table = LabelTable::new();
        let a = table.intern("a");
        let b = table.intern("b");
        assert_ne!(a, b);
    }
}
