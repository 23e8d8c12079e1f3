//! Identity types for IR entities. Both are arena indices into the owning
//! function's flat storage, handed out once and never reused — even after
//! the block or instruction they name is removed (the arena slot becomes a
//! tombstone, see `Function::remove_instruction`/`remove_block`) so a stale
//! id captured before a removal is a detectable dangling reference rather
//! than a silent alias onto whatever was inserted afterward. Block and
//! instruction *order* is tracked separately, in `Block::order`, so
//! inserting or removing an instruction never renumbers its neighbors.

use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstId(pub u32);

impl fmt::Debug for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}
