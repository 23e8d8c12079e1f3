//! Access reification (spec §4.5 step 2): lowers an abstract `Access` (no
//! effect chosen yet) to a concrete capability request. The full rule
//! ("chosen from the provenance's sink-ness and downstream usage") would
//! consult whether the provenance root is itself about to be moved from
//! elsewhere in the function; this approximates it by looking only at the
//! access result's own immediate uses, which covers the common patterns
//! (read, reborrow, write, move-out) without a whole-function liveness pass.

use marrow_ty::AccessEffect;

use crate::function::Function;
use crate::ids::{BlockId, InstId};
use crate::instruction::InstructionKind;
use crate::operand::Operand;
use crate::pass::{Changed, Diagnostics, MandatoryPass};

pub struct AccessReification;

impl MandatoryPass for AccessReification {
    fn name(&self) -> &'static str {
        "access-reification"
    }

    fn run(&self, function: &mut Function, _diagnostics: &mut dyn Diagnostics) -> Changed {
        let mut changed = Changed::No;
        let ids: Vec<InstId> = function
            .blocks()
            .flat_map(|(_, b): (BlockId, _)| b.instructions().to_vec())
            .collect();
        for id in ids {
            if !matches!(function.inst(id).kind, InstructionKind::Access { effect: None, .. }) {
                continue;
            }
            let effect = infer_effect(function, id);
            if let InstructionKind::Access { effect: slot, .. } = &mut function.inst_mut(id).kind {
                *slot = Some(effect);
            }
            changed = Changed::Yes;
        }
        changed
    }
}

fn infer_effect(function: &Function, id: InstId) -> AccessEffect {
    let uses = function.uses_of(Operand::Register(id));
    if uses.is_empty() {
        return AccessEffect::Let;
    }
    let mut saw_move_out = false;
    let mut saw_write_target = false;
    for u in uses {
        match &function.inst(u.user).kind {
            InstructionKind::Move { value, .. } if *value == Operand::Register(id) => saw_move_out = true,
            InstructionKind::Initialize { address, .. } | InstructionKind::Assign { address, .. }
                if *address == Operand::Register(id) =>
            {
                saw_write_target = true
            }
            _ => {}
        }
    }
    if saw_move_out {
        AccessEffect::Sink
    } else if saw_write_target {
        AccessEffect::Set
    } else {
        AccessEffect::Inout
    }
}
