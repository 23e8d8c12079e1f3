//! Borrow closing (spec §4.5 step 3): inserts a matching `EndAccess` for
//! every reified `Access` that does not already have one, right after the
//! access's last use in its own block. Honouring full block topology (an
//! access whose last use is in a different block than its definition) is
//! out of scope for this approximation — intra-block accesses are the
//! common case the other mandatory passes themselves produce.

use crate::function::Function;
use crate::ids::{BlockId, InstId};
use crate::instruction::{Instruction, InstructionKind};
use crate::operand::Operand;
use crate::pass::{Changed, Diagnostics, MandatoryPass};

pub struct BorrowClosing;

impl MandatoryPass for BorrowClosing {
    fn name(&self) -> &'static str {
        "borrow-closing"
    }

    fn run(&self, function: &mut Function, _diagnostics: &mut dyn Diagnostics) -> Changed {
        let mut changed = Changed::No;
        let blocks: Vec<BlockId> = function.blocks().map(|(id, _)| id).collect();
        for block in blocks {
            let accesses: Vec<InstId> = function
                .block(block)
                .instructions()
                .iter()
                .copied()
                .filter(|id| matches!(function.inst(*id).kind, InstructionKind::Access { .. }))
                .collect();
            for access_id in accesses {
                let already_closed = function
                    .uses_of(Operand::Register(access_id))
                    .iter()
                    .any(|u| matches!(function.inst(u.user).kind, InstructionKind::EndAccess { .. }));
                if already_closed {
                    continue;
                }
                let order = function.block(block).instructions().to_vec();
                let anchor = order
                    .iter()
                    .rev()
                    .find(|id| {
                        function
                            .uses_of(Operand::Register(access_id))
                            .iter()
                            .any(|u| u.user == **id)
                    })
                    .copied()
                    .unwrap_or(access_id);
                let site = function.inst(access_id).site;
                let end_access = Instruction {
                    kind: InstructionKind::EndAccess { access: Operand::Register(access_id) },
                    result_type: None,
                    site,
                };
                if function.block(block).terminator() == Some(anchor) {
                    function.insert_before(block, anchor, end_access);
                } else {
                    function.insert_after(block, anchor, end_access);
                }
                changed = Changed::Yes;
            }
        }
        changed
    }
}
