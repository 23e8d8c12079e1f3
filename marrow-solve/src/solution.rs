//! `Score` and `Solution` (spec §3 "Solution"). Scores compare
//! lexicographically — error count dominates penalties, matching the spec's
//! "Scores compare lexicographically" — so two solutions are never ranked
//! by penalty alone while one of them is unsound.

use rustc_hash::FxHashMap;

use marrow_program::{DiagnosticSink, ExprId};
use marrow_ty::{DeclId, Substitution};

use crate::goal::GoalId;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Score {
    pub errors: u32,
    pub penalties: u32,
}

impl Score {
    pub fn is_sound(&self) -> bool {
        self.errors == 0
    }

    pub fn worse_than(&self, other: &Score) -> bool {
        self > other
    }
}

pub struct Solution {
    pub substitution: Substitution,
    pub bindings: FxHashMap<ExprId, DeclId>,
    pub score: Score,
    pub diagnostics: DiagnosticSink,
    pub stale: Vec<GoalId>,
}

impl Solution {
    pub fn is_sound(&self) -> bool {
        self.score.is_sound()
    }
}
