use rustc_hash::FxHashMap;

/// A vertex identifier, stable across the builder and the LPDS: its index into the
/// builder's vertex table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(u32);

/// The builder's vertex table, keyed by `stack_name` (§4.9: "re-'adding' a stack key
/// updates payload but does not duplicate").
#[derive(Debug, Clone, Default)]
pub struct VertexTable {
    names: Vec<String>,
    by_name: FxHashMap<String, VertexId>,
}

impl VertexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create the vertex for `name`.
    pub fn get_or_create(&mut self, name: impl Into<String>) -> VertexId {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = VertexId(self.names.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.names.push(name);
        id
    }

    pub fn name_of(&self, id: VertexId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn id_of(&self, name: &str) -> Option<VertexId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Every vertex, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (VertexId(i as u32), n.as_str()))
    }
}
