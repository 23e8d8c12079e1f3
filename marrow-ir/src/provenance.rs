//! Provenance (spec §4.4 "Provenance"): the set of original operands an
//! address-typed operand derives from, used by access reification and
//! exclusivity enforcement to decide whether two accesses touch the same
//! underlying storage.

use crate::function::Function;
use crate::instruction::InstructionKind;
use crate::operand::Operand;

/// For non-addressing instructions (and for parameters/constants) provenance
/// is the operand itself; for the addressing instructions listed in spec
/// §4.4, it recurses into the operand the address was derived from.
pub fn provenance(f: &Function, operand: Operand) -> Vec<Operand> {
    let Operand::Register(id) = operand else {
        return vec![operand];
    };
    match &f.inst(id).kind {
        InstructionKind::Access { address, .. } => provenance(f, *address),
        InstructionKind::ProjectBundle { base, .. } => provenance(f, *base),
        InstructionKind::SubfieldView { base, .. } => provenance(f, *base),
        InstructionKind::AdvanceByBytes { base, .. } => provenance(f, *base),
        InstructionKind::WrapExistentialAddr { base } => provenance(f, *base),
        InstructionKind::Project { base, .. } => provenance(f, *base),
        _ => vec![operand],
    }
}
