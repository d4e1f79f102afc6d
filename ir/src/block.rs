use crate::entities::InstId;

/// A basic block: a straight-line sequence of instructions ending in a terminator.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub insts: Vec<InstId>,
}

impl Block {
    pub fn first_inst(&self) -> Option<InstId> {
        self.insts.first().copied()
    }

    pub fn last_inst(&self) -> Option<InstId> {
        self.insts.last().copied()
    }
}
