//! Functions and blocks (spec §3 "IR Module entities", §4.4 invariants).

use rustc_hash::FxHashMap;

use marrow_program::{Scope, Site};
use marrow_ty::{CallableParameter, DeclId, Type};

use crate::ids::{BlockId, InstId};
use crate::instruction::Instruction;
use crate::operand::{Operand, Use};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Linkage {
    Internal,
    External,
}

/// A basic block: a scope, its entry parameters, and the ordered list of
/// instructions living in it. `order` is the single source of truth for
/// instruction position; `None` entries in the function's instruction arena
/// never appear in any block's `order` (spec §4.4 "removing an instruction
/// requires its result to be unused").
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub scope: Scope,
    pub parameters: Vec<Type>,
    order: Vec<InstId>,
    removed: bool,
}

impl Block {
    pub fn instructions(&self) -> &[InstId] {
        &self.order
    }

    /// The block's terminator, if its last instruction is one (spec §3
    /// "terminators occur only at block tails").
    pub fn terminator(&self) -> Option<InstId> {
        self.order.last().copied()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// A function: identity, site, linkage, signature, and its blocks (spec §3
/// "IR Module entities — Function").
#[derive(Clone, Debug)]
pub struct Function {
    pub id: DeclId,
    pub site: Site,
    pub linkage: Linkage,
    pub generic_parameters: Vec<String>,
    pub inputs: Vec<CallableParameter>,
    pub output: Type,
    /// Subscripts yield through a projection rather than returning, so they
    /// do not get the trailing return-storage entry parameter (spec §3
    /// "entry includes a trailing return-storage parameter for non-subscript
    /// functions").
    pub is_subscript: bool,
    blocks: Vec<Option<Block>>,
    block_order: Vec<BlockId>,
    instructions: Vec<Option<Instruction>>,
    pub(crate) uses: FxHashMap<Operand, Vec<Use>>,
}

impl Function {
    pub fn new(
        id: DeclId,
        site: Site,
        linkage: Linkage,
        generic_parameters: Vec<String>,
        inputs: Vec<CallableParameter>,
        output: Type,
        is_subscript: bool,
    ) -> Self {
        Function {
            id,
            site,
            linkage,
            generic_parameters,
            inputs,
            output,
            is_subscript,
            blocks: Vec::new(),
            block_order: Vec::new(),
            instructions: Vec::new(),
            uses: FxHashMap::default(),
        }
    }

    /// Appends a new block whose entry parameters are `parameters`. The
    /// first block appended to a fresh function is its entry; callers
    /// establishing the entry block are responsible for including the
    /// trailing return-storage parameter when `!is_subscript` (spec §3).
    pub fn append_block(&mut self, scope: Scope, parameters: Vec<Type>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Some(Block { scope, parameters, order: Vec::new(), removed: false }));
        self.block_order.push(id);
        id
    }

    pub fn block(&self, id: BlockId) -> &Block {
        self.blocks[id.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("{:?} was removed", id))
    }

    fn block_mut(&mut self, id: BlockId) -> &mut Block {
        self.blocks[id.0 as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("{:?} was removed", id))
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.block_order
            .iter()
            .filter_map(move |id| self.blocks[id.0 as usize].as_ref().map(|b| (*id, b)))
    }

    pub fn entry(&self) -> Option<BlockId> {
        self.block_order.iter().copied().find(|id| !self.blocks[id.0 as usize].as_ref().unwrap().removed)
    }

    pub fn inst(&self, id: InstId) -> &Instruction {
        self.instructions[id.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("{:?} was removed", id))
    }

    pub(crate) fn inst_mut(&mut self, id: InstId) -> &mut Instruction {
        self.instructions[id.0 as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("{:?} was removed", id))
    }

    fn alloc_inst(&mut self, instruction: Instruction) -> InstId {
        let id = InstId(self.instructions.len() as u32);
        self.instructions.push(Some(instruction));
        id
    }

    fn record_uses(&mut self, user: InstId) {
        let operands = self.inst(user).kind.operands();
        for (index, operand) in operands.into_iter().enumerate() {
            self.uses.entry(operand).or_default().push(Use { user, operand_index: index as u32 });
        }
    }

    fn erase_uses(&mut self, user: InstId) {
        let operands = self.inst(user).kind.operands();
        for operand in operands {
            if let Some(list) = self.uses.get_mut(&operand) {
                list.retain(|u| u.user != user);
            }
        }
    }

    /// Appends `instruction` to the end of `block`'s instruction list. Panics
    /// if `block` already ends in a terminator (spec §4.4 invariant:
    /// "terminators occur only at block tails").
    pub fn append_instruction(&mut self, block: BlockId, instruction: Instruction) -> InstId {
        if let Some(term) = self.block(block).terminator() {
            assert!(!self.inst(term).kind.is_terminator(), "cannot append after a terminator in {:?}", block);
        }
        let id = self.alloc_inst(instruction);
        self.block_mut(block).order.push(id);
        self.record_uses(id);
        id
    }

    pub fn prepend_instruction(&mut self, block: BlockId, instruction: Instruction) -> InstId {
        let id = self.alloc_inst(instruction);
        self.block_mut(block).order.insert(0, id);
        self.record_uses(id);
        id
    }

    /// Inserts `instruction` immediately before `anchor`, which must belong
    /// to `block`.
    pub fn insert_before(&mut self, block: BlockId, anchor: InstId, instruction: Instruction) -> InstId {
        let id = self.alloc_inst(instruction);
        let pos = self.position_of(block, anchor);
        self.block_mut(block).order.insert(pos, id);
        self.record_uses(id);
        id
    }

    pub fn insert_after(&mut self, block: BlockId, anchor: InstId, instruction: Instruction) -> InstId {
        let id = self.alloc_inst(instruction);
        let pos = self.position_of(block, anchor) + 1;
        self.block_mut(block).order.insert(pos, id);
        self.record_uses(id);
        id
    }

    fn position_of(&self, block: BlockId, anchor: InstId) -> usize {
        self.block(block)
            .order
            .iter()
            .position(|i| *i == anchor)
            .unwrap_or_else(|| panic!("{:?} is not in {:?}", anchor, block))
    }

    /// Replaces `old`'s instruction with `instruction` in place, preserving
    /// its position (spec §4.4 invariant: "replacing an instruction
    /// preserves the result type"). Panics if the result type differs.
    pub fn replace_instruction(&mut self, old: InstId, instruction: Instruction) {
        assert_eq!(
            self.inst(old).result_type,
            instruction.result_type,
            "replace_instruction must preserve the result type of {:?}",
            old
        );
        self.erase_uses(old);
        *self.inst_mut(old) = instruction;
        self.record_uses(old);
    }

    /// Rewrites one operand slot of `user` via `replaceOperand` semantics:
    /// the use-chain is updated atomically with the operand write (spec
    /// §4.4 "Use-chain maintenance").
    pub fn replace_operand(&mut self, user: InstId, operand_index: u32, new_operand: Operand) {
        self.erase_uses(user);
        self.inst_mut(user)
            .kind
            .map_operands(|i, op| if i == operand_index { new_operand } else { op });
        self.record_uses(user);
    }

    /// Replaces every use of `old` with `new` across the whole function
    /// (spec §4.4 "Replacing uses-of-X-by-Y requires identical types").
    pub fn replace_all_uses(&mut self, old: Operand, new: Operand) {
        let users: Vec<Use> = self.uses.get(&old).cloned().unwrap_or_default();
        for u in &users {
            self.inst_mut(u.user).kind.map_operands(|_, op| if op == old { new } else { op });
        }
        self.uses.remove(&old);
        let entry = self.uses.entry(new).or_default();
        for u in &users {
            if !entry.contains(u) {
                entry.push(*u);
            }
        }
    }

    /// Removes an instruction. Panics if its result (as a register operand)
    /// still has uses (spec §4.4 invariant).
    pub fn remove_instruction(&mut self, block: BlockId, id: InstId) {
        let still_used = self.uses.get(&Operand::Register(id)).map_or(false, |u| !u.is_empty());
        assert!(!still_used, "{:?} still has uses", id);
        self.erase_uses(id);
        let pos = self.position_of(block, id);
        self.block_mut(block).order.remove(pos);
        self.instructions[id.0 as usize] = None;
    }

    pub fn remove_block(&mut self, id: BlockId) {
        self.block_mut(id).removed = true;
    }

    pub fn uses_of(&self, operand: Operand) -> &[Use] {
        self.uses.get(&operand).map_or(&[], |v| v.as_slice())
    }
}
