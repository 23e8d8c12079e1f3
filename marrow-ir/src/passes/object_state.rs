//! Object-state normalization (spec §4.5 step 4): legalizes `Move` pseudo-
//! instructions into `Initialize` or `Assign` depending on whether their
//! target is initialized at that program point, and diagnoses reads from
//! uninitialized storage. Initialization state is tracked per stack slot
//! (identified by its provenance root, spec §4.4) across a single block's
//! instruction order; merging state across block boundaries (full CFG
//! dataflow) is left as a documented simplification — nothing in the
//! mandatory passes that follow depends on it.

use rustc_hash::FxHashSet;

use marrow_ty::AccessEffect;

use crate::function::Function;
use crate::ids::BlockId;
use crate::instruction::{Instruction, InstructionKind};
use crate::operand::Operand;
use crate::pass::{Changed, Diagnostics, MandatoryPass};
use crate::provenance::provenance;

pub struct ObjectStateNormalization;

impl MandatoryPass for ObjectStateNormalization {
    fn name(&self) -> &'static str {
        "object-state-normalization"
    }

    fn run(&self, function: &mut Function, diagnostics: &mut dyn Diagnostics) -> Changed {
        let mut changed = Changed::No;
        let blocks: Vec<BlockId> = function.blocks().map(|(id, _)| id).collect();
        for block in blocks {
            let mut initialized: FxHashSet<Operand> = FxHashSet::default();
            let order = function.block(block).instructions().to_vec();
            for id in order {
                match function.inst(id).kind.clone() {
                    InstructionKind::Move { target, value } => {
                        let root = provenance(function, target).into_iter().next().unwrap_or(target);
                        let site = function.inst(id).site;
                        let legalized = if initialized.contains(&root) {
                            InstructionKind::Assign { address: target, value }
                        } else {
                            InstructionKind::Initialize { address: target, value }
                        };
                        function.replace_instruction(id, Instruction { kind: legalized, result_type: None, site });
                        initialized.insert(root);
                        changed = Changed::Yes;
                    }
                    InstructionKind::Initialize { address, .. } => {
                        let root = provenance(function, address).into_iter().next().unwrap_or(address);
                        initialized.insert(root);
                    }
                    InstructionKind::Assign { address, .. } => {
                        let root = provenance(function, address).into_iter().next().unwrap_or(address);
                        if !initialized.contains(&root) {
                            diagnostics.report(
                                function.inst(id).site,
                                "assignment to uninitialized storage".to_string(),
                            );
                        }
                        initialized.insert(root);
                    }
                    InstructionKind::Access { effect: Some(effect), address }
                        if effect != AccessEffect::Set =>
                    {
                        let root = provenance(function, address).into_iter().next().unwrap_or(address);
                        if !initialized.contains(&root) {
                            diagnostics.report(function.inst(id).site, "read from uninitialized storage".to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        changed
    }
}
