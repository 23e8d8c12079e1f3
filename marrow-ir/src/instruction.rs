//! Instructions (spec §3 "Instruction") and their operation-specific data.
//!
//! `Access` starts life abstract (`effect: None`) and is lowered to a
//! concrete capability (`let`/`inout`/`sink`/`set`) by the access
//! reification pass (spec §4.5 step 2); `Move` is a pseudo-instruction that
//! object-state normalization legalizes into either `Initialize` or `Assign`
//! (spec §4.5 step 4) and must not survive the mandatory passes.

use marrow_program::Site;
use marrow_ty::{AccessEffect, Type};

use crate::ids::BlockId;
use crate::operand::Operand;

#[derive(Clone, Debug)]
pub enum InstructionKind {
    /// An as-yet-unreified borrow of `address`; `effect` is `None` until the
    /// access reification pass assigns one.
    Access { effect: Option<AccessEffect>, address: Operand },
    /// Closes the borrow opened by the access instruction `access` refers to.
    EndAccess { access: Operand },
    /// A destructive move of `value` into `target`; legalized by object-state
    /// normalization into `Initialize` (if `target` is uninitialized at this
    /// program point) or `Assign` (otherwise) and must not survive that pass.
    Move { target: Operand, value: Operand },
    /// Writes `value` into an uninitialized `address`.
    Initialize { address: Operand, value: Operand },
    /// Writes `value` into an already-initialized `address`, running the
    /// prior value's deinitializer first.
    Assign { address: Operand, value: Operand },
    /// A named-field projection of an aggregate address.
    Project { base: Operand, field: usize },
    /// A projection into a bundled (existential or union) payload.
    ProjectBundle { base: Operand, field: usize },
    /// A view of one field of a tuple without copying the rest.
    SubfieldView { base: Operand, field: usize },
    /// Pointer arithmetic: `base` advanced by a constant byte offset.
    AdvanceByBytes { base: Operand, bytes: u64 },
    /// Re-tags a concrete address as an existential-interface address.
    WrapExistentialAddr { base: Operand },
    Call { callee: Operand, arguments: Vec<Operand> },
    /// Unconditional branch; valid only as a block's last instruction.
    Branch { target: BlockId, arguments: Vec<Operand> },
    /// Conditional branch; valid only as a block's last instruction.
    CondBranch {
        condition: Operand,
        then_block: BlockId,
        then_arguments: Vec<Operand>,
        else_block: BlockId,
        else_arguments: Vec<Operand>,
    },
    /// Valid only as a block's last instruction.
    Return { value: Option<Operand> },
    /// Valid only as a block's last instruction.
    Unreachable,
}

impl InstructionKind {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            InstructionKind::Branch { .. }
                | InstructionKind::CondBranch { .. }
                | InstructionKind::Return { .. }
                | InstructionKind::Unreachable
        )
    }

    /// True for instructions with no observable effect beyond their result,
    /// i.e. safe for dead-code removal to delete once unused (spec §4.5 step
    /// 1: "whose operations are pure").
    pub fn is_pure(&self) -> bool {
        matches!(
            self,
            InstructionKind::Project { .. }
                | InstructionKind::ProjectBundle { .. }
                | InstructionKind::SubfieldView { .. }
                | InstructionKind::AdvanceByBytes { .. }
                | InstructionKind::WrapExistentialAddr { .. }
        )
    }

    pub fn operands(&self) -> Vec<Operand> {
        match self {
            InstructionKind::Access { address, .. } => vec![*address],
            InstructionKind::EndAccess { access } => vec![*access],
            InstructionKind::Move { target, value } => vec![*target, *value],
            InstructionKind::Initialize { address, value } => vec![*address, *value],
            InstructionKind::Assign { address, value } => vec![*address, *value],
            InstructionKind::Project { base, .. } => vec![*base],
            InstructionKind::ProjectBundle { base, .. } => vec![*base],
            InstructionKind::SubfieldView { base, .. } => vec![*base],
            InstructionKind::AdvanceByBytes { base, .. } => vec![*base],
            InstructionKind::WrapExistentialAddr { base } => vec![*base],
            InstructionKind::Call { callee, arguments } => {
                let mut ops = vec![*callee];
                ops.extend(arguments.iter().copied());
                ops
            }
            InstructionKind::Branch { arguments, .. } => arguments.clone(),
            InstructionKind::CondBranch { condition, then_arguments, else_arguments, .. } => {
                let mut ops = vec![*condition];
                ops.extend(then_arguments.iter().copied());
                ops.extend(else_arguments.iter().copied());
                ops
            }
            InstructionKind::Return { value } => value.iter().copied().collect(),
            InstructionKind::Unreachable => Vec::new(),
        }
    }

    /// Rewrites every operand slot via `f`, in the same order `operands()`
    /// reports them, so the module's use-chain bookkeeping can correlate
    /// `Use::operand_index` back to a specific field (spec §4.4
    /// "replaceOperand helper").
    pub fn map_operands(&mut self, mut f: impl FnMut(u32, Operand) -> Operand) {
        let mut i = 0u32;
        let mut next = |op: &mut Operand, f: &mut dyn FnMut(u32, Operand) -> Operand| {
            *op = f(i, *op);
            i += 1;
        };
        match self {
            InstructionKind::Access { address, .. } => next(address, &mut f),
            InstructionKind::EndAccess { access } => next(access, &mut f),
            InstructionKind::Move { target, value } => {
                next(target, &mut f);
                next(value, &mut f);
            }
            InstructionKind::Initialize { address, value } | InstructionKind::Assign { address, value } => {
                next(address, &mut f);
                next(value, &mut f);
            }
            InstructionKind::Project { base, .. }
            | InstructionKind::ProjectBundle { base, .. }
            | InstructionKind::SubfieldView { base, .. }
            | InstructionKind::AdvanceByBytes { base, .. }
            | InstructionKind::WrapExistentialAddr { base } => next(base, &mut f),
            InstructionKind::Call { callee, arguments } => {
                next(callee, &mut f);
                for a in arguments.iter_mut() {
                    next(a, &mut f);
                }
            }
            InstructionKind::Branch { arguments, .. } => {
                for a in arguments.iter_mut() {
                    next(a, &mut f);
                }
            }
            InstructionKind::CondBranch { condition, then_arguments, else_arguments, .. } => {
                next(condition, &mut f);
                for a in then_arguments.iter_mut() {
                    next(a, &mut f);
                }
                for a in else_arguments.iter_mut() {
                    next(a, &mut f);
                }
            }
            InstructionKind::Return { value } => {
                if let Some(v) = value {
                    next(v, &mut f);
                }
            }
            InstructionKind::Unreachable => {}
        }
    }
}

#[derive(Clone, Debug)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub result_type: Option<Type>,
    pub site: Site,
}
