//! Exclusivity enforcement (spec §4.5 step 5, the "law of exclusivity"):
//! rejects overlapping accesses to the same provenance when at least one of
//! them is mutable. Overlap is tracked per block as open intervals between
//! an `Access` and its closing `EndAccess` (guaranteed to exist in the same
//! block by the time this pass runs, since borrow closing has already run).

use marrow_ty::AccessEffect;

use crate::function::Function;
use crate::ids::BlockId;
use crate::instruction::InstructionKind;
use crate::operand::Operand;
use crate::pass::{Changed, Diagnostics, MandatoryPass};
use crate::provenance::provenance;

pub struct ExclusivityEnforcement;

impl MandatoryPass for ExclusivityEnforcement {
    fn name(&self) -> &'static str {
        "exclusivity-enforcement"
    }

    fn run(&self, function: &mut Function, diagnostics: &mut dyn Diagnostics) -> Changed {
        let blocks: Vec<BlockId> = function.blocks().map(|(id, _)| id).collect();
        for block in blocks {
            let order = function.block(block).instructions().to_vec();
            let mut open: Vec<(Operand, AccessEffect)> = Vec::new();
            for id in order {
                match &function.inst(id).kind {
                    InstructionKind::Access { effect: Some(effect), address } => {
                        let root = provenance(function, *address).into_iter().next().unwrap_or(*address);
                        for (other_root, other_effect) in &open {
                            if *other_root == root && (is_mutable(*effect) || is_mutable(*other_effect)) {
                                diagnostics.report(
                                    function.inst(id).site,
                                    "exclusivity violation: overlapping access to the same storage".to_string(),
                                );
                            }
                        }
                        open.push((root, *effect));
                    }
                    InstructionKind::EndAccess { access } => {
                        if let Some(closed) = access.as_register() {
                            if let Some(pos) = open.iter().position(|(root, _)| {
                                matches!(function.inst(closed).kind, InstructionKind::Access { address, .. } if *root == provenance_root(function, address))
                            }) {
                                open.remove(pos);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Changed::No
    }
}

fn provenance_root(function: &Function, operand: Operand) -> Operand {
    provenance(function, operand).into_iter().next().unwrap_or(operand)
}

fn is_mutable(effect: AccessEffect) -> bool {
    matches!(effect, AccessEffect::Inout | AccessEffect::Sink | AccessEffect::Set | AccessEffect::Yielded)
}
