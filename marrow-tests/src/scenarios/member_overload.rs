//! Member resolution with two equally-specific candidates: neither is more
//! specific than the other, so exploration keeps both survivors and the
//! system must report an ambiguous-use diagnostic rather than silently
//! picking one (spec §4.2 "Overload" tie-break rule).

use rustc_hash::FxHashMap;

use marrow_program::{DeclKind, ExprId, Purpose, Relations, Scope, Site, TypedProgram};
use marrow_solve::{ConstraintSystem, GoalKind};
use marrow_ty::{BuiltinType, DeclId, Type, VarIdGenerator};

use crate::support::{candidate, FixedResolver};

#[test]
fn two_equally_specific_candidates_report_ambiguous_use() {
    let mut program = TypedProgram::new();
    let site = Site(0);
    let member_type = Type::Builtin(BuiltinType::Word);
    let first = program.declare("member", DeclKind::Function, vec![], member_type.clone(), site);
    let second = program.declare("member", DeclKind::Function, vec![], member_type.clone(), site);
    let relations = Relations::new();
    let resolver = FixedResolver(vec![
        candidate(first, member_type.clone()),
        candidate(second, member_type.clone()),
    ]);
    let system = ConstraintSystem::construct(
        &program,
        &relations,
        &resolver,
        VarIdGenerator::new(),
        vec![GoalKind::Member {
            subject: Type::Builtin(BuiltinType::Word),
            name: "member".to_string(),
            member_type,
            member_expr: ExprId(0),
            purpose: Purpose::Member,
            scope: Scope(0),
        }],
        FxHashMap::default(),
        site,
    );
    let solution = system.solve();
    let messages: Vec<String> = solution.diagnostics.iter().map(|d| d.to_string()).collect();
    assert!(messages.iter().any(|m| m.contains("ambiguous overload")), "{messages:?}");
}

#[test]
fn a_single_viable_candidate_binds_without_any_diagnostic() {
    let program = TypedProgram::new();
    let relations = Relations::new();
    let member_type = Type::Builtin(BuiltinType::Word);
    let resolver = FixedResolver(vec![candidate(DeclId(0), member_type.clone())]);
    let member_expr = ExprId(0);
    let system = ConstraintSystem::construct(
        &program,
        &relations,
        &resolver,
        VarIdGenerator::new(),
        vec![GoalKind::Member {
            subject: Type::Builtin(BuiltinType::Word),
            name: "member".to_string(),
            member_type,
            member_expr,
            purpose: Purpose::Member,
            scope: Scope(0),
        }],
        FxHashMap::default(),
        Site(0),
    );
    let solution = system.solve();
    assert!(solution.is_sound());
    assert_eq!(solution.bindings.get(&member_expr), Some(&DeclId(0)));
}
