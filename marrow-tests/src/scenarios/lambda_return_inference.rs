//! A lambda literal's type is left as an open variable until something
//! constrains it (spec §4.2 "Subtyping" disjunction over a variable): with
//! nothing else pinning it down, the no-penalty equality branch wins and
//! the variable is solved to exactly the required callable type. But once
//! an unrelated constraint has already pinned the variable to something
//! else, the callable requirement can no longer be satisfied and inference
//! fails outright rather than silently picking a branch.

use rustc_hash::FxHashMap;

use marrow_program::{Relations, Site, TypedProgram};
use marrow_solve::{ConstraintSystem, GoalKind};
use marrow_ty::{BuiltinType, Type, VarIdGenerator};

use crate::support::{plain_lambda, NoCandidates};

#[test]
fn an_unconstrained_variable_solves_to_the_required_callable_type() {
    let program = TypedProgram::new();
    let relations = Relations::new();
    let resolver = NoCandidates;
    let mut gen = VarIdGenerator::new();
    let var = gen.fresh();
    let required = plain_lambda(Vec::new(), Type::Builtin(BuiltinType::Word));
    let system = ConstraintSystem::construct(
        &program,
        &relations,
        &resolver,
        gen,
        vec![GoalKind::Subtyping(Type::Variable(var), required.clone(), false)],
        FxHashMap::default(),
        Site(0),
    );
    let solution = system.solve();
    assert!(solution.is_sound());
    assert_eq!(solution.substitution.reify(&Type::Variable(var), true), required);
}

#[test]
fn a_variable_already_pinned_to_an_incompatible_type_cannot_also_become_callable() {
    let program = TypedProgram::new();
    let relations = Relations::new();
    let resolver = NoCandidates;
    let mut gen = VarIdGenerator::new();
    let var = gen.fresh();
    let required = plain_lambda(Vec::new(), Type::Builtin(BuiltinType::Word));
    let system = ConstraintSystem::construct(
        &program,
        &relations,
        &resolver,
        gen,
        vec![
            GoalKind::Equality(Type::Variable(var), Type::Builtin(BuiltinType::Bool)),
            GoalKind::Subtyping(Type::Variable(var), required, false),
        ],
        FxHashMap::default(),
        Site(0),
    );
    let solution = system.solve();
    assert!(!solution.is_sound());
}
