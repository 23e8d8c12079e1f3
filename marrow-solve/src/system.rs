//! `ConstraintSystem` (spec §4.2): the fresh/stale goal queue, main loop,
//! and disjunction/overload exploration. Modeled on the teacher's
//! `chalk_solve::recursive::fulfill::Fulfill` fixed-point loop, generalized
//! from chalk's single `Fallible<Solution>` obligation list to marrow's
//! richer goal variants (`Member`, `Call`, `Disjunction`, `Overload`, ...)
//! and its explicit penalty-scored exploration.

use std::cmp::Ordering;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use marrow_program::{
    Candidate, Diagnostic, DiagnosticSink, ExprId, NameResolver, Purpose, Relations, Scope, Site,
    TypedProgram,
};
use marrow_ty::{
    CallableParameter, DeclId, Substitution, TupleElement, TupleType, Type, VarId, VarIdGenerator,
};

use crate::conform;
use crate::error::{ErrorKind, NameLookupFailureKind, SubtypeFailureKind};
use crate::goal::{Goal, GoalId, GoalKind, Origin, OriginKind, OverloadCandidateGoal, TupleBranch};
use crate::outcome::{Diagnose, Outcome, OutcomeTable};
use crate::solution::{Score, Solution};
use crate::subtype;
use crate::unify;
use crate::vars::free_variables;

/// A name resolver that never finds anything, used only to probe strict
/// subtyping between two closed callable signatures during specificity
/// ranking — such a probe never needs to resolve a name.
struct NullResolver;
impl NameResolver for NullResolver {
    fn resolve(&self, _name: &str, _scope: Scope, _purpose: Purpose, _site: Site) -> Vec<Candidate> {
        Vec::new()
    }
}

#[derive(Clone)]
pub struct ConstraintSystem<'p> {
    program: &'p TypedProgram,
    relations: &'p Relations,
    resolver: &'p dyn NameResolver,
    goals: Vec<Goal>,
    outcomes: OutcomeTable,
    /// Ordered so that the simplest goal is at the back; `step` pops from
    /// the tail (spec §4.2 "popped from the tail for cache friendliness").
    fresh: Vec<GoalId>,
    stale: Vec<GoalId>,
    stale_by_var: FxHashMap<VarId, Vec<GoalId>>,
    subst: Substitution,
    var_gen: VarIdGenerator,
    bindings: FxHashMap<ExprId, DeclId>,
    penalties: u32,
    /// Diagnostics that do not belong to any single goal's diagnose closure
    /// — presently only the ambiguity note attached when a disjunction or
    /// overload's exploration yields more than one incomparable winner.
    extra_diagnostics: Vec<Diagnostic>,
}

impl<'p> ConstraintSystem<'p> {
    /// `construct` (spec §4.2 public contract): seeds the system with a set
    /// of root constraints, an initial binding map, and the scope member
    /// lookups run against.
    pub fn construct(
        program: &'p TypedProgram,
        relations: &'p Relations,
        resolver: &'p dyn NameResolver,
        var_gen: VarIdGenerator,
        seed: Vec<GoalKind>,
        initial_bindings: FxHashMap<ExprId, DeclId>,
        site: Site,
    ) -> Self {
        let mut system = ConstraintSystem {
            program,
            relations,
            resolver,
            goals: Vec::new(),
            outcomes: OutcomeTable::new(),
            fresh: Vec::new(),
            stale: Vec::new(),
            stale_by_var: FxHashMap::default(),
            subst: Substitution::new(),
            var_gen,
            bindings: initial_bindings,
            penalties: 0,
            extra_diagnostics: Vec::new(),
        };
        for kind in seed {
            let origin_kind = origin_kind_of(&kind);
            system.push_goal(kind, Origin::root(site, origin_kind));
        }
        system
    }

    /// `solve(checker)` (spec §4.2): runs to completion with no pruning
    /// bound and finalizes a `Solution`.
    pub fn solve(self) -> Solution {
        match self.run(None) {
            Some(done) => done.finish(),
            None => unreachable!("an unbounded run never aborts on the score check"),
        }
    }

    /// `solve(notWorseThan: maxScore, checker)`: `None` means pruning
    /// showed no competitive solution is reachable under `bound`.
    pub fn solve_not_worse_than(self, bound: Score) -> Option<Solution> {
        self.run(Some(bound)).map(ConstraintSystem::finish)
    }

    fn push_goal(&mut self, kind: GoalKind, origin: Origin) -> GoalId {
        let id = self.outcomes.push_pending();
        self.goals.push(Goal { id, origin, kind });
        self.push_fresh(id);
        id
    }

    fn push_fresh(&mut self, id: GoalId) {
        let rank = self.goals[id.0].kind.simplicity_rank();
        // Keep `fresh` sorted with the most complex goals at the front and
        // the simplest at the back, so popping the tail always yields the
        // next-simplest goal (spec §4.2: "equality before others; simpler
        // disjunctions before larger ones").
        let pos = self
            .fresh
            .partition_point(|g| self.goals[g.0].kind.simplicity_rank() >= rank);
        self.fresh.insert(pos, id);
    }

    fn postpone(&mut self, id: GoalId) {
        tracing::debug!(goal = id.0, action = "defer");
        self.stale.push(id);
        for var in self.goals[id.0]
            .kind
            .mentioned_types()
            .iter()
            .flat_map(|t| free_variables(t))
            .collect::<Vec<_>>()
        {
            self.stale_by_var.entry(var).or_default().push(id);
        }
    }

    /// Reactivates every stale goal that mentions any of `vars` (spec §9
    /// "every substitution assignment must re-inspect stale goals").
    fn wake(&mut self, vars: &[VarId]) {
        let mut woken = Vec::new();
        for var in vars {
            if let Some(ids) = self.stale_by_var.remove(var) {
                woken.extend(ids);
            }
        }
        for id in woken {
            tracing::debug!(goal = id.0, action = "refresh");
            if let Some(pos) = self.stale.iter().position(|s| *s == id) {
                self.stale.remove(pos);
            }
            self.push_fresh(id);
        }
    }

    /// The full main loop (spec §4.2). Returns `None` if `bound` is ever
    /// exceeded (the fork is pruned); otherwise returns the system with
    /// every goal decided — remaining `stale` goals are finalized as
    /// failures at this point, not left pending, so callers can compare
    /// completed forks by score (spec §4.2 "Disjunction / Overload —
    /// exploration").
    fn run(mut self, bound: Option<Score>) -> Option<Self> {
        tracing::debug!(fresh = self.fresh.len(), stale = self.stale.len(), action = "schedule");
        loop {
            if let Some(b) = bound {
                if self.current_score() > b {
                    tracing::debug!(action = "abort", bound = ?b);
                    return None;
                }
            }
            match self.fresh.pop() {
                Some(id) => self.step(id),
                None => {
                    tracing::debug!(action = "break");
                    break;
                }
            }
        }
        let stale = self.stale.clone();
        for id in stale {
            if !self.outcomes.get(id).is_decided() {
                tracing::debug!(goal = id.0, action = "failure", reason = "stale goal left unresolved");
                self.set_failure(id, ErrorKind::NameLookupFailure(NameLookupFailureKind::NoViable(
                    "stale goal left unresolved".to_string(),
                )));
            }
        }
        Some(self)
    }

    fn step(&mut self, id: GoalId) {
        tracing::debug!(goal = id.0, action = "solve");
        let kind = self.goals[id.0].kind.clone();
        match kind {
            GoalKind::Equality(l, r) => self.step_equality(id, &l, &r),
            GoalKind::Subtyping(l, r, strict) => self.step_subtyping(id, &l, &r, strict),
            GoalKind::Conformance(model, concept) => self.step_conformance(id, &model, concept),
            GoalKind::Parameter(l, r) => self.step_parameter(id, &l, &r),
            GoalKind::Member {
                subject,
                name,
                member_type,
                member_expr,
                purpose,
                scope,
            } => self.step_member(id, &subject, &name, &member_type, member_expr, purpose, scope),
            GoalKind::TupleMember { subject, index, element_type } => {
                self.step_tuple_member(id, &subject, index, &element_type)
            }
            GoalKind::Call { callee, labels, arguments, output, arrow } => {
                self.step_call(id, &callee, &labels, &arguments, &output, arrow)
            }
            GoalKind::Merging { supertype, branches } => self.step_merging(id, &supertype, &branches),
            GoalKind::Disjunction { choices } => self.step_disjunction(id, choices),
            GoalKind::Overload { overloaded_expr, ty: _, candidates } => {
                self.step_overload(id, overloaded_expr, candidates)
            }
        }
    }

    // ---- Equality -----------------------------------------------------

    fn step_equality(&mut self, id: GoalId, l: &Type, r: &Type) {
        match unify::unify(l, r, &mut self.subst) {
            Ok(bound) => {
                self.set_success(id);
                self.wake(&bound);
            }
            Err(e) => self.set_failure(id, e),
        }
    }

    // ---- Subtyping ------------------------------------------------------

    fn step_subtyping(&mut self, id: GoalId, l: &Type, r: &Type, strict: bool) {
        let l = self.subst.reify(l, true);
        let r = self.subst.reify(r, true);
        match subtype::decompose(self.program, self.relations, &mut self.var_gen, &l, &r, strict) {
            subtype::Decomposition::Success => self.set_success(id),
            subtype::Decomposition::Unify => self.step_equality(id, &l, &r),
            subtype::Decomposition::Failure(e) => self.set_failure(id, e),
            subtype::Decomposition::All(goals) => self.spawn_product(id, goals, OriginKind::Subtyping),
            subtype::Decomposition::Disjunction(choices) => self.explore(id, choices, OriginKind::Subtyping),
        }
    }

    // ---- Conformance -----------------------------------------------------

    fn step_conformance(&mut self, id: GoalId, model: &Type, concept: marrow_ty::TraitId) {
        let model = self.subst.reify(model, true);
        if matches!(model, Type::Variable(_)) {
            self.postpone(id);
            return;
        }
        match conform::decompose(self.program, &model, concept) {
            conform::Decomposition::Success => self.set_success(id),
            conform::Decomposition::Postpone => self.postpone(id),
            conform::Decomposition::Failure(e) => self.set_failure(id, e),
            conform::Decomposition::All(goals) => self.spawn_product(id, goals, OriginKind::Conformance),
        }
    }

    // ---- Parameter ------------------------------------------------------

    fn step_parameter(&mut self, id: GoalId, l: &Type, r: &Type) {
        let r = self.subst.reify(r, true);
        match &r {
            Type::Variable(_) => self.postpone(id),
            Type::Parameter(p) => {
                self.spawn_product(id, vec![GoalKind::Subtyping(l.clone(), *p.bare.clone(), false)], OriginKind::Parameter)
            }
            _ => self.set_failure(id, ErrorKind::InvalidParameterType(r.clone())),
        }
    }

    // ---- Member ------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn step_member(
        &mut self,
        id: GoalId,
        subject: &Type,
        name: &str,
        member_type: &Type,
        member_expr: ExprId,
        purpose: Purpose,
        scope: Scope,
    ) {
        let subject = self.subst.reify(subject, true);
        if matches!(subject, Type::Variable(_)) {
            self.postpone(id);
            return;
        }
        let candidates = self.resolver.resolve(name, scope, purpose, self.goals[id.0].origin.site);
        if candidates.is_empty() {
            self.set_failure(
                id,
                ErrorKind::NameLookupFailure(NameLookupFailureKind::Undefined(name.to_string())),
            );
            return;
        }
        let viable: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| self.candidate_viable(c))
            .collect();
        if viable.is_empty() {
            self.set_failure(
                id,
                ErrorKind::NameLookupFailure(NameLookupFailureKind::NoViable(name.to_string())),
            );
            return;
        }
        if viable.len() == 1 {
            let candidate = &viable[0];
            self.bindings.insert(member_expr, candidate.decl);
            let mut goals: Vec<GoalKind> = candidate
                .requires
                .iter()
                .map(|(ty, tr)| GoalKind::Conformance(ty.clone(), *tr))
                .collect();
            goals.push(GoalKind::Equality(candidate.ty.clone(), member_type.clone()));
            self.spawn_product(id, goals, OriginKind::Member);
            return;
        }
        let candidate_goals = viable
            .into_iter()
            .map(|c| {
                let mut constraints: Vec<GoalKind> = c
                    .requires
                    .iter()
                    .map(|(ty, tr)| GoalKind::Conformance(ty.clone(), *tr))
                    .collect();
                constraints.push(GoalKind::Equality(c.ty.clone(), member_type.clone()));
                OverloadCandidateGoal {
                    decl: c.decl,
                    constraints,
                    penalty: if c.is_concrete { 0 } else { 1 },
                }
            })
            .collect();
        self.explore_overload(id, member_expr, candidate_goals);
    }

    /// Approximates "candidate is viable" by checking its static
    /// requirements are not *known* to fail yet (spec §4.2 "all candidates
    /// non-viable -> fail"). A full implementation would run each
    /// candidate's constraints through an isolated subsolver; this resolves
    /// the common case (a requirement that can never hold given the
    /// current, already-substituted types) without paying for a fork per
    /// candidate up front — genuinely undecidable requirements are instead
    /// left to the `Overload`/`Product` exploration that follows.
    fn candidate_viable(&self, candidate: &Candidate) -> bool {
        candidate.requires.iter().all(|(ty, tr)| {
            let ty = self.subst.reify(ty, true);
            !matches!(conform::decompose(self.program, &ty, *tr), conform::Decomposition::Failure(_))
        })
    }

    // ---- TupleMember ------------------------------------------------------

    fn step_tuple_member(&mut self, id: GoalId, subject: &Type, index: usize, element_type: &Type) {
        let subject = self.subst.reify(subject, true);
        match &subject {
            Type::Variable(_) => self.postpone(id),
            Type::Tuple(t) => match t.elements.get(index) {
                Some(element) => self.step_equality(id, &element.ty.clone(), element_type),
                None => self.set_failure(
                    id,
                    ErrorKind::TupleIndexOutOfRange { index, len: t.elements.len() },
                ),
            },
            _ => self.set_failure(
                id,
                ErrorKind::SubtypeFailure(SubtypeFailureKind::DoesNotMatchPattern, subject.clone(), Type::never()),
            ),
        }
    }

    // ---- Call ------------------------------------------------------

    fn step_call(
        &mut self,
        id: GoalId,
        callee: &Type,
        labels: &[Option<String>],
        arguments: &[Type],
        output: &Type,
        arrow: bool,
    ) {
        let callee = self.subst.reify(callee, true);
        if matches!(callee, Type::Variable(_)) {
            self.postpone(id);
            return;
        }
        let (params, callee_output) = match &callee {
            Type::Lambda(l) if l.is_subscript == arrow => (l.inputs.clone(), *l.output.clone()),
            _ => {
                self.set_failure(id, ErrorKind::CalleeNotCallable { arrow, found: callee.clone() });
                return;
            }
        };
        match match_call_labels(&params, labels, arguments) {
            Ok(pairs) => {
                let mut goals: Vec<GoalKind> = pairs
                    .into_iter()
                    .map(|(arg, param)| GoalKind::Parameter(arg, param))
                    .collect();
                goals.push(GoalKind::Equality(callee_output, output.clone()));
                self.spawn_product(id, goals, OriginKind::Call);
            }
            Err(e) => self.set_failure(id, e),
        }
    }

    // ---- Merging ------------------------------------------------------

    fn step_merging(&mut self, id: GoalId, supertype: &Type, branches: &[Type]) {
        if branches.is_empty() {
            self.set_success(id);
            return;
        }
        let goals = branches
            .iter()
            .map(|b| GoalKind::Subtyping(b.clone(), supertype.clone(), false))
            .collect();
        self.spawn_product(id, goals, OriginKind::Merging);
    }

    // ---- Disjunction / Overload exploration ------------------------------

    fn step_disjunction(&mut self, id: GoalId, choices: Vec<TupleBranch>) {
        self.explore(id, choices, OriginKind::Disjunction);
    }

    fn step_overload(&mut self, id: GoalId, overloaded_expr: ExprId, candidates: Vec<OverloadCandidateGoal>) {
        self.explore_overload(id, overloaded_expr, candidates);
    }

    fn explore(&mut self, id: GoalId, choices: Vec<TupleBranch>, kind: OriginKind) {
        let mut forks = Vec::with_capacity(choices.len());
        let mut best: Option<Score> = None;
        let choice_count = choices.len();
        for (index, choice) in choices.into_iter().enumerate() {
            tracing::debug!(goal = id.0, fork = index, of = choice_count, action = "fork");
            let mut fork = self.clone();
            fork.penalties += choice.penalty;
            let origin = fork.goals[id.0].origin.child(id, kind);
            let mut child_ids = Vec::with_capacity(choice.constraints.len());
            for c in choice.constraints {
                child_ids.push(fork.push_goal(c, origin));
            }
            fork.outcomes.set(id, Outcome::Product(child_ids, product_diagnose(id)));
            tracing::debug!(goal = id.0, fork = index, action = "assume");
            if let Some(done) = fork.run(best) {
                let score = done.current_score();
                if best.map_or(true, |b| score <= b) {
                    best = Some(score);
                }
                forks.push(done);
            } else {
                tracing::debug!(goal = id.0, fork = index, action = "skip");
            }
        }
        // The first fork always runs with `bound = None`, which `run` never
        // prunes against, so `forks` is never empty here.
        debug_assert!(!forks.is_empty());
        let winner = pick_winner(self.program, forks, id, "ambiguous disjunction");
        tracing::debug!(goal = id.0, action = "pick");
        *self = winner;
    }

    fn explore_overload(&mut self, id: GoalId, overloaded_expr: ExprId, candidates: Vec<OverloadCandidateGoal>) {
        let mut forks = Vec::with_capacity(candidates.len());
        let mut best: Option<Score> = None;
        let candidate_count = candidates.len();
        for (index, candidate) in candidates.into_iter().enumerate() {
            tracing::debug!(goal = id.0, fork = index, of = candidate_count, action = "fork");
            let mut fork = self.clone();
            fork.penalties += candidate.penalty;
            fork.bindings.insert(overloaded_expr, candidate.decl);
            let origin = fork.goals[id.0].origin.child(id, OriginKind::Overload);
            let mut child_ids = Vec::with_capacity(candidate.constraints.len());
            for c in candidate.constraints {
                child_ids.push(fork.push_goal(c, origin));
            }
            fork.outcomes.set(id, Outcome::Product(child_ids, product_diagnose(id)));
            tracing::debug!(goal = id.0, fork = index, action = "assume");
            if let Some(done) = fork.run(best) {
                let score = done.current_score();
                if best.map_or(true, |b| score <= b) {
                    best = Some(score);
                }
                forks.push(done);
            } else {
                tracing::debug!(goal = id.0, fork = index, action = "skip");
            }
        }
        // Same reasoning as `explore`: the first candidate's fork always
        // runs unbounded, so `forks` is never empty here.
        debug_assert!(!forks.is_empty());
        let winner = pick_winner(self.program, forks, id, "ambiguous overload");
        tracing::debug!(goal = id.0, action = "pick");
        *self = winner;
    }

    // ---- bookkeeping ------------------------------------------------------

    fn spawn_product(&mut self, id: GoalId, goals: Vec<GoalKind>, kind: OriginKind) {
        let origin = self.goals[id.0].origin.child(id, kind);
        let subordinates: Vec<GoalId> = goals.into_iter().map(|g| self.push_goal(g, origin)).collect();
        self.outcomes.set(id, Outcome::Product(subordinates, product_diagnose(id)));
    }

    fn set_success(&mut self, id: GoalId) {
        tracing::debug!(goal = id.0, action = "success");
        self.outcomes.set(id, Outcome::Success);
    }

    fn set_failure(&mut self, id: GoalId, error: ErrorKind) {
        tracing::debug!(goal = id.0, action = "failure", kind = ?error);
        let site = self.goals[id.0].origin.site;
        let diagnose: Diagnose = Rc::new(move |sink: &mut DiagnosticSink, _subst, _outcomes| {
            sink.report(Diagnostic::error(site, error.message()));
        });
        self.outcomes.set(id, Outcome::Failure(diagnose));
    }

    fn current_score(&self) -> Score {
        let errors = self
            .goals
            .iter()
            .filter(|g| g.origin.is_root() && self.is_doomed(g.id))
            .count() as u32;
        Score { errors, penalties: self.penalties }
    }

    fn is_doomed(&self, id: GoalId) -> bool {
        match self.outcomes.get(id) {
            Outcome::Failure(_) => true,
            Outcome::Product(subs, _) => subs.iter().any(|s| self.is_doomed(*s)),
            _ => false,
        }
    }

    fn finish(mut self) -> Solution {
        self.subst.optimize();
        let mut diagnostics = DiagnosticSink::new();
        for d in self.extra_diagnostics.drain(..) {
            diagnostics.report(d);
        }
        for root in self.goals.iter().filter(|g| g.origin.is_root()) {
            if self.outcomes.succeeded(root.id) {
                continue;
            }
            match self.outcomes.get(root.id) {
                Outcome::Failure(d) => d(&mut diagnostics, &self.subst, &self.outcomes),
                Outcome::Product(_, d) => d(&mut diagnostics, &self.subst, &self.outcomes),
                Outcome::Success | Outcome::Pending => {}
            }
        }
        Solution {
            substitution: self.subst,
            bindings: self.bindings,
            score: self.current_score(),
            diagnostics,
            stale: self.stale,
        }
    }
}

fn product_diagnose(id: GoalId) -> Diagnose {
    Rc::new(move |sink: &mut DiagnosticSink, subst, outcomes| {
        if let Outcome::Product(subs, _) = outcomes.get(id) {
            if let Some(leaf) = outcomes.first_failing_leaf(subs) {
                if let Outcome::Failure(d) = outcomes.get(leaf) {
                    d(sink, subst, outcomes);
                }
            }
        }
    })
}

fn origin_kind_of(kind: &GoalKind) -> OriginKind {
    match kind {
        GoalKind::Equality(..) => OriginKind::Equality,
        GoalKind::Subtyping(..) => OriginKind::Subtyping,
        GoalKind::Conformance(..) => OriginKind::Conformance,
        GoalKind::Parameter(..) => OriginKind::Parameter,
        GoalKind::Member { .. } => OriginKind::Member,
        GoalKind::TupleMember { .. } => OriginKind::TupleMember,
        GoalKind::Call { .. } => OriginKind::Call,
        GoalKind::Merging { .. } => OriginKind::Merging,
        GoalKind::Disjunction { .. } => OriginKind::Disjunction,
        GoalKind::Overload { .. } => OriginKind::Overload,
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum SpecificityOrder {
    MoreSpecific,
    LessSpecific,
    Equal,
    Incomparable,
}

/// Picks the winner among a disjunction/overload's completed forks (spec
/// §4.2 "Disjunction / Overload — exploration"). Forks strictly worse than
/// the best score are dropped; forks tied with the best are kept only if no
/// other kept fork is strictly more specific than them. More than one
/// surviving fork after that pass means a genuine ambiguity: their bindings
/// are merged (first-registered wins per expression) and an ambiguity
/// diagnostic is attached to `id`.
fn pick_winner<'p>(
    program: &'p TypedProgram,
    forks: Vec<ConstraintSystem<'p>>,
    id: GoalId,
    ambiguous_message: &str,
) -> ConstraintSystem<'p> {
    let mut best_score: Option<Score> = None;
    for fork in &forks {
        let score = fork.current_score();
        if best_score.map_or(true, |b| score < b) {
            best_score = Some(score);
        }
    }
    let best_score = best_score.unwrap();
    let mut winners: Vec<ConstraintSystem<'p>> = Vec::new();
    for fork in forks {
        if fork.current_score() != best_score {
            continue;
        }
        let mut dominated = false;
        winners.retain(|w| match compare_specificity(program, &fork, w) {
            SpecificityOrder::MoreSpecific => false,
            SpecificityOrder::LessSpecific => {
                dominated = true;
                true
            }
            SpecificityOrder::Equal | SpecificityOrder::Incomparable => true,
        });
        if !dominated {
            winners.push(fork);
        }
    }
    if winners.len() == 1 {
        return winners.pop().unwrap();
    }
    let mut base = winners.remove(0);
    for other in winners {
        for (expr, decl) in other.bindings {
            base.bindings.entry(expr).or_insert(decl);
        }
    }
    let site = base.goals[id.0].origin.site;
    base.extra_diagnostics.push(Diagnostic::error(site, ambiguous_message));
    base
}

fn compare_specificity(program: &TypedProgram, a: &ConstraintSystem, b: &ConstraintSystem) -> SpecificityOrder {
    let mut ascends = false;
    let mut descends = false;
    for (expr, decl_a) in a.bindings.iter() {
        let Some(decl_b) = b.bindings.get(expr) else { continue };
        if decl_a == decl_b {
            continue;
        }
        match compare_callable(program, a.relations, program.decl_type(*decl_a), program.decl_type(*decl_b)) {
            Some(Ordering::Less) => ascends = true,
            Some(Ordering::Greater) => descends = true,
            Some(Ordering::Equal) => {}
            None => return SpecificityOrder::Incomparable,
        }
    }
    match (ascends, descends) {
        (true, false) => SpecificityOrder::MoreSpecific,
        (false, true) => SpecificityOrder::LessSpecific,
        (false, false) => SpecificityOrder::Equal,
        (true, true) => SpecificityOrder::Incomparable,
    }
}

fn callable_params(ty: &Type) -> Option<(Vec<CallableParameter>, bool)> {
    match ty {
        Type::Lambda(l) => Some((l.inputs.clone(), l.is_subscript)),
        Type::Method(m) => Some((m.inputs.clone(), false)),
        _ => None,
    }
}

/// Compares two callable types' parameter tuples by running a fresh
/// subsolver in each direction (spec §4.2 "Specificity ranking": "test
/// whether each side's parameter tuple is a strict subtype of the other's").
fn compare_callable(program: &TypedProgram, relations: &Relations, a: &Type, b: &Type) -> Option<Ordering> {
    let (pa, subscript_a) = callable_params(a)?;
    let (pb, subscript_b) = callable_params(b)?;
    if subscript_a != subscript_b || pa.len() != pb.len() {
        return None;
    }
    for (x, y) in pa.iter().zip(pb.iter()) {
        if x.label != y.label {
            return None;
        }
    }
    let tuple_a = params_tuple(&pa);
    let tuple_b = params_tuple(&pb);
    let a_strict_subtype_b = probe_strict_subtype(program, relations, &tuple_a, &tuple_b);
    let b_strict_subtype_a = probe_strict_subtype(program, relations, &tuple_b, &tuple_a);
    match (a_strict_subtype_b, b_strict_subtype_a) {
        (true, false) => Some(Ordering::Less),
        (false, true) => Some(Ordering::Greater),
        (false, false) => Some(Ordering::Equal),
        (true, true) => None,
    }
}

fn params_tuple(params: &[CallableParameter]) -> Type {
    Type::Tuple(TupleType {
        elements: params
            .iter()
            .map(|p| TupleElement { label: p.label.clone(), ty: p.ty.clone() })
            .collect(),
    })
}

fn probe_strict_subtype(program: &TypedProgram, relations: &Relations, l: &Type, r: &Type) -> bool {
    let resolver = NullResolver;
    let probe = ConstraintSystem::construct(
        program,
        relations,
        &resolver,
        VarIdGenerator::new(),
        vec![GoalKind::Subtyping(l.clone(), r.clone(), true)],
        FxHashMap::default(),
        Site(0),
    );
    match probe.run(None) {
        Some(done) => done.finish().is_sound(),
        None => false,
    }
}

/// Matches argument labels to parameter labels left-to-right, skipping
/// defaulted parameters that don't match the next argument (spec §4.2
/// "Call"). `labels` and `arguments` are parallel.
fn match_call_labels(
    params: &[CallableParameter],
    labels: &[Option<String>],
    arguments: &[Type],
) -> Result<Vec<(Type, Type)>, ErrorKind> {
    let mismatch = || ErrorKind::LabelMismatch {
        found: labels.to_vec(),
        expected: params.iter().map(|p| p.label.clone()).collect(),
    };
    let mut arg_index = 0;
    let mut pairs = Vec::new();
    for param in params {
        if arg_index < labels.len() && labels[arg_index] == param.label {
            pairs.push((arguments[arg_index].clone(), param.ty.clone()));
            arg_index += 1;
        } else if param.has_default {
            continue;
        } else {
            return Err(mismatch());
        }
    }
    if arg_index != labels.len() {
        return Err(mismatch());
    }
    Ok(pairs)
}
