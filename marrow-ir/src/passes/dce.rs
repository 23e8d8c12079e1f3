//! Dead-code removal (spec §4.5 step 1).

use rustc_hash::FxHashSet;

use crate::function::Function;
use crate::ids::{BlockId, InstId};
use crate::instruction::InstructionKind;
use crate::operand::Operand;
use crate::pass::{Changed, Diagnostics, MandatoryPass};

pub struct DeadCodeRemoval;

impl MandatoryPass for DeadCodeRemoval {
    fn name(&self) -> &'static str {
        "dead-code-removal"
    }

    fn run(&self, function: &mut Function, _diagnostics: &mut dyn Diagnostics) -> Changed {
        let mut changed = Changed::No;
        // A removal can make its own operand's defining instruction dead in
        // turn, so repeat until a full sweep removes nothing.
        loop {
            let blocks: Vec<BlockId> = function.blocks().map(|(id, _)| id).collect();
            let mut removed_any = false;
            for block in blocks {
                let dead: Vec<InstId> = function
                    .block(block)
                    .instructions()
                    .iter()
                    .copied()
                    .filter(|id| {
                        let inst = function.inst(*id);
                        inst.kind.is_pure() && function.uses_of(Operand::Register(*id)).is_empty()
                    })
                    .collect();
                for id in dead {
                    function.remove_instruction(block, id);
                    removed_any = true;
                }
            }
            if removed_any {
                changed = Changed::Yes;
            } else {
                break;
            }
        }
        changed.or(remove_unreachable_blocks(function))
    }
}

fn remove_unreachable_blocks(function: &mut Function) -> Changed {
    let Some(entry) = function.entry() else { return Changed::No };
    let mut reachable = FxHashSet::default();
    let mut stack = vec![entry];
    while let Some(b) = stack.pop() {
        if !reachable.insert(b) {
            continue;
        }
        if let Some(term) = function.block(b).terminator() {
            match &function.inst(term).kind {
                InstructionKind::Branch { target, .. } => stack.push(*target),
                InstructionKind::CondBranch { then_block, else_block, .. } => {
                    stack.push(*then_block);
                    stack.push(*else_block);
                }
                _ => {}
            }
        }
    }
    let all: Vec<BlockId> = function.blocks().map(|(id, _)| id).collect();
    let mut changed = Changed::No;
    for id in all {
        if !reachable.contains(&id) {
            function.remove_block(id);
            changed = Changed::Yes;
        }
    }
    changed
}
