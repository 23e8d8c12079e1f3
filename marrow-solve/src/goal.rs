//! The goal (constraint) data model (spec §3 "Constraint (goal)"). A goal's
//! identity is its index in the system's append-only `goals` list; `GoalId`
//! is that index, never reused.

use marrow_program::{ExprId, Site};
use marrow_ty::{DeclId, TraitId, Type};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GoalId(pub usize);

/// What kind of goal spawned this one, for diagnosis and for the `fresh`
/// ordering heuristic (spec §4.2 main loop step 3, §7 "subordinate goals
/// never emit diagnostics themselves").
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OriginKind {
    Equality,
    Subtyping,
    Conformance,
    Parameter,
    Member,
    TupleMember,
    Call,
    Merging,
    Disjunction,
    Overload,
    /// An inference side-constraint spawned while decomposing `Subtyping`
    /// against a variable (spec §4.2 "L <= variable, not strict").
    Inference,
}

/// Origin carries enough to report *why* a goal exists: the site it was
/// raised at, what kind of relation it asserts, and — for subordinates —
/// the parent that will actually own diagnosis.
#[derive(Copy, Clone, Debug)]
pub struct Origin {
    pub site: Site,
    pub kind: OriginKind,
    pub parent: Option<GoalId>,
}

impl Origin {
    pub fn root(site: Site, kind: OriginKind) -> Self {
        Origin { site, kind, parent: None }
    }

    pub fn child(&self, of: GoalId, kind: OriginKind) -> Self {
        Origin {
            site: self.site,
            kind,
            parent: Some(of),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct MemberCandidateUse {
    pub decl: DeclId,
    pub ty: Type,
    pub requires: Vec<(Type, TraitId)>,
    pub is_concrete: bool,
}

#[derive(Clone, Debug)]
pub struct TupleBranch {
    pub constraints: Vec<GoalKind>,
    pub penalty: u32,
}

#[derive(Clone, Debug)]
pub struct OverloadCandidateGoal {
    pub decl: DeclId,
    pub constraints: Vec<GoalKind>,
    pub penalty: u32,
}

/// The tagged constraint variant (spec §3). Carried by value inside a
/// `Goal`; dispatch consults the current variant after the system has
/// reified its types against `typeAssumptions`.
#[derive(Clone, Debug)]
pub enum GoalKind {
    Equality(Type, Type),
    Subtyping(Type, Type, bool),
    Conformance(Type, TraitId),
    Parameter(Type, Type),
    Member {
        subject: Type,
        name: String,
        member_type: Type,
        member_expr: ExprId,
        purpose: marrow_program::Purpose,
        scope: marrow_program::Scope,
    },
    TupleMember {
        subject: Type,
        index: usize,
        element_type: Type,
    },
    Call {
        callee: Type,
        labels: Vec<Option<String>>,
        arguments: Vec<Type>,
        output: Type,
        arrow: bool,
    },
    Merging {
        supertype: Type,
        branches: Vec<Type>,
    },
    Disjunction {
        choices: Vec<TupleBranch>,
    },
    Overload {
        overloaded_expr: ExprId,
        ty: Type,
        candidates: Vec<OverloadCandidateGoal>,
    },
}

impl GoalKind {
    /// The types this goal mentions, for stale-goal indexing (spec §9
    /// "index stale goals by the variables they mention").
    pub fn mentioned_types(&self) -> Vec<&Type> {
        match self {
            GoalKind::Equality(l, r) => vec![l, r],
            GoalKind::Subtyping(l, r, _) => vec![l, r],
            GoalKind::Conformance(m, _) => vec![m],
            GoalKind::Parameter(l, r) => vec![l, r],
            GoalKind::Member { subject, member_type, .. } => vec![subject, member_type],
            GoalKind::TupleMember { subject, element_type, .. } => vec![subject, element_type],
            GoalKind::Call { callee, arguments, output, .. } => {
                let mut v = vec![callee, output];
                v.extend(arguments.iter());
                v
            }
            GoalKind::Merging { supertype, branches } => {
                let mut v = vec![supertype];
                v.extend(branches.iter());
                v
            }
            GoalKind::Disjunction { .. } | GoalKind::Overload { .. } => Vec::new(),
        }
    }

    /// A rough simplicity key for the `fresh` ordering (spec §4.2:
    /// "equality before others; simpler disjunctions before larger ones").
    /// Lower sorts first when popped from the tail (i.e. lower values are
    /// pushed to sort toward the end of the vector, since the system pops
    /// from the tail); see `System::push_fresh`.
    pub fn simplicity_rank(&self) -> u32 {
        match self {
            GoalKind::Equality(..) => 0,
            GoalKind::Parameter(..) => 1,
            GoalKind::TupleMember { .. } => 1,
            GoalKind::Subtyping(..) => 2,
            GoalKind::Conformance(..) => 2,
            GoalKind::Member { .. } => 3,
            GoalKind::Call { .. } => 3,
            GoalKind::Merging { .. } => 3,
            GoalKind::Disjunction { choices } => 4 + choices.len() as u32,
            GoalKind::Overload { candidates, .. } => 4 + candidates.len() as u32,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Goal {
    pub id: GoalId,
    pub origin: Origin,
    pub kind: GoalKind,
}
