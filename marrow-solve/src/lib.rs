//! Constraint-based type inference and overload resolution (spec §4.2):
//! the fresh/stale goal queue, unification, subtyping, conformance, member
//! and call resolution, and disjunction/overload exploration with
//! specificity ranking. Depends on `marrow-ty` and `marrow-program` only —
//! never on `marrow-ir` (spec §2 dependency order).

pub mod conform;
pub mod error;
pub mod goal;
pub mod outcome;
pub mod solution;
pub mod subtype;
pub mod system;
pub mod unify;
mod vars;

pub use error::{ErrorKind, Fallible, NameLookupFailureKind, SubtypeFailureKind};
pub use goal::{Goal, GoalId, GoalKind, Origin, OriginKind, OverloadCandidateGoal, TupleBranch};
pub use outcome::{Diagnose, Outcome, OutcomeTable};
pub use solution::{Score, Solution};
pub use system::ConstraintSystem;

#[cfg(test)]
mod tests {
    use super::*;
    use marrow_program::{DeclKind, NameResolver, Purpose, Relations, Scope, Site, TypedProgram};
    use marrow_ty::{BuiltinType, Type, VarIdGenerator};
    use rustc_hash::FxHashMap;

    struct NoCandidates;
    impl NameResolver for NoCandidates {
        fn resolve(&self, _name: &str, _scope: Scope, _purpose: Purpose, _site: Site) -> Vec<marrow_program::Candidate> {
            Vec::new()
        }
    }

    #[test]
    fn successful_equality_is_sound() {
        let program = TypedProgram::new();
        let relations = Relations::new();
        let resolver = NoCandidates;
        let system = ConstraintSystem::construct(
            &program,
            &relations,
            &resolver,
            VarIdGenerator::new(),
            vec![GoalKind::Equality(
                Type::Builtin(BuiltinType::Word),
                Type::Builtin(BuiltinType::Word),
            )],
            FxHashMap::default(),
            Site(0),
        );
        let solution = system.solve();
        assert!(solution.is_sound());
    }

    #[test]
    fn mismatched_equality_reports_one_diagnostic() {
        let program = TypedProgram::new();
        let relations = Relations::new();
        let resolver = NoCandidates;
        let system = ConstraintSystem::construct(
            &program,
            &relations,
            &resolver,
            VarIdGenerator::new(),
            vec![GoalKind::Equality(
                Type::Builtin(BuiltinType::Word),
                Type::Builtin(BuiltinType::Bool),
            )],
            FxHashMap::default(),
            Site(0),
        );
        let solution = system.solve();
        assert!(!solution.is_sound());
        assert_eq!(solution.score.errors, 1);
    }

    #[test]
    fn union_widening_picks_the_variant_with_no_penalty() {
        // let x: Union<Word, Bool> = <word literal>
        let program = TypedProgram::new();
        let relations = Relations::new();
        let resolver = NoCandidates;
        let mut gen = VarIdGenerator::new();
        let literal = Type::Variable(gen.fresh());
        let union = Type::Union(marrow_ty::UnionType {
            members: vec![Type::Builtin(BuiltinType::Word), Type::Builtin(BuiltinType::Bool)],
        });
        let system = ConstraintSystem::construct(
            &program,
            &relations,
            &resolver,
            gen,
            vec![
                GoalKind::Equality(literal.clone(), Type::Builtin(BuiltinType::Word)),
                GoalKind::Subtyping(literal, union, false),
            ],
            FxHashMap::default(),
            Site(0),
        );
        let solution = system.solve();
        assert!(solution.is_sound());
    }

    #[test]
    fn tuple_of_builtins_conforms_to_movable() {
        let mut program = TypedProgram::new();
        let movable = marrow_ty::TraitId(0);
        program.set_movable_trait(movable);
        let relations = Relations::new();
        let resolver = NoCandidates;
        let tuple = Type::Tuple(marrow_ty::TupleType {
            elements: vec![
                marrow_ty::TupleElement { label: None, ty: Type::Builtin(BuiltinType::Word) },
                marrow_ty::TupleElement { label: None, ty: Type::Builtin(BuiltinType::Bool) },
            ],
        });
        let system = ConstraintSystem::construct(
            &program,
            &relations,
            &resolver,
            VarIdGenerator::new(),
            vec![GoalKind::Conformance(tuple, movable)],
            FxHashMap::default(),
            Site(0),
        );
        let solution = system.solve();
        assert!(solution.is_sound());
    }

    #[test]
    fn label_mismatch_is_diagnosed() {
        let mut program = TypedProgram::new();
        let site = Site(0);
        let callee_ty = Type::Lambda(marrow_ty::LambdaType {
            inputs: vec![marrow_ty::CallableParameter {
                label: Some("x".into()),
                ty: Type::Builtin(BuiltinType::Word),
                has_default: false,
            }],
            environment: Box::new(Type::never()),
            output: Box::new(Type::Builtin(BuiltinType::Word)),
            is_subscript: false,
        });
        let decl = program.declare("f", DeclKind::Function, vec![], callee_ty.clone(), site);
        let _ = decl;
        let relations = Relations::new();
        let resolver = NoCandidates;
        let system = ConstraintSystem::construct(
            &program,
            &relations,
            &resolver,
            VarIdGenerator::new(),
            vec![GoalKind::Call {
                callee: callee_ty,
                labels: vec![Some("y".into())],
                arguments: vec![Type::Builtin(BuiltinType::Word)],
                output: Type::Builtin(BuiltinType::Word),
                arrow: false,
            }],
            FxHashMap::default(),
            site,
        );
        let solution = system.solve();
        assert!(!solution.is_sound());
    }
}
