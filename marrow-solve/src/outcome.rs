//! The outcome table (spec §3 "Outcome", §7 "Propagation"). Diagnose
//! closures are pure and idempotent (spec §9) so they can be re-invoked
//! freely when a superior solution replaces a worse one; they are kept
//! behind `Rc` rather than owned so that solver forks — which deep-clone
//! every other field of the solver state — can cheaply clone the outcome
//! table too without re-boxing every closure.

use std::rc::Rc;

use marrow_program::DiagnosticSink;
use marrow_ty::Substitution;

use crate::goal::GoalId;

pub type Diagnose = Rc<dyn Fn(&mut DiagnosticSink, &Substitution, &OutcomeTable)>;

#[derive(Clone)]
pub enum Outcome {
    Pending,
    Success,
    Failure(Diagnose),
    /// Succeeds iff every subordinate's outcome in the same table is
    /// `Success`; `diagnose` is invoked only when the product as a whole
    /// fails and is itself a root (spec §7: subordinates never diagnose
    /// themselves).
    Product(Vec<GoalId>, Diagnose),
}

impl Outcome {
    pub fn is_decided(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

/// Parallel to the goal list: `outcomes[i]` is the outcome of `goals[i]`.
#[derive(Default, Clone)]
pub struct OutcomeTable {
    outcomes: Vec<Outcome>,
}

impl OutcomeTable {
    pub fn new() -> Self {
        OutcomeTable::default()
    }

    pub fn push_pending(&mut self) -> GoalId {
        let id = GoalId(self.outcomes.len());
        self.outcomes.push(Outcome::Pending);
        id
    }

    /// One-time assignment (spec §4.2 step 3: "Setting an outcome is a
    /// one-time assignment").
    pub fn set(&mut self, id: GoalId, outcome: Outcome) {
        let slot = &mut self.outcomes[id.0];
        debug_assert!(matches!(slot, Outcome::Pending), "outcome {:?} already set", id);
        *slot = outcome;
    }

    pub fn get(&self, id: GoalId) -> &Outcome {
        &self.outcomes[id.0]
    }

    /// True iff `id` and every (transitive) subordinate beneath it resolved
    /// to `Success`. Non-`Product` goals are asked directly.
    pub fn succeeded(&self, id: GoalId) -> bool {
        match self.get(id) {
            Outcome::Success => true,
            Outcome::Product(subordinates, _) => subordinates.iter().all(|s| self.succeeded(*s)),
            Outcome::Failure(_) | Outcome::Pending => false,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Walks `ids` (and, through `Product`, their subordinates) for the
    /// first literal `Failure` outcome, so a `Product`'s diagnose closure
    /// can delegate to whichever concrete subgoal actually broke (spec §7:
    /// "the root goal's diagnose closure ... may consult subordinates'
    /// outcomes to produce a single message").
    pub fn first_failing_leaf(&self, ids: &[GoalId]) -> Option<GoalId> {
        for &id in ids {
            match self.get(id) {
                Outcome::Failure(_) => return Some(id),
                Outcome::Product(subs, _) => {
                    if let Some(leaf) = self.first_failing_leaf(subs) {
                        return Some(leaf);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Every goal whose origin has no parent and whose outcome did not
    /// succeed — these, and only these, get to run their diagnose closure
    /// (spec §7).
    pub fn failing_roots<'a>(
        &'a self,
        goals: &'a [crate::goal::Goal],
    ) -> impl Iterator<Item = GoalId> + 'a {
        goals
            .iter()
            .filter(move |g| g.origin.is_root() && !self.succeeded(g.id))
            .map(|g| g.id)
    }
}
