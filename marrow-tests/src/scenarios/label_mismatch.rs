//! Call-site label matching (spec §4.2 "Call"): defaulted parameters are
//! skipped when the next argument label doesn't match them, but a missing
//! required label is a hard failure.

use rustc_hash::FxHashMap;

use marrow_program::{Relations, Site, TypedProgram};
use marrow_solve::{ConstraintSystem, GoalKind};
use marrow_ty::{BuiltinType, CallableParameter, Type, VarIdGenerator};

use crate::support::{plain_lambda, NoCandidates};

fn callee() -> Type {
    plain_lambda(
        vec![
            CallableParameter { label: Some("x".into()), ty: Type::Builtin(BuiltinType::Word), has_default: true },
            CallableParameter { label: Some("y".into()), ty: Type::Builtin(BuiltinType::Bool), has_default: false },
        ],
        Type::Builtin(BuiltinType::Word),
    )
}

#[test]
fn a_defaulted_label_is_skipped_when_the_caller_omits_it() {
    let program = TypedProgram::new();
    let relations = Relations::new();
    let resolver = NoCandidates;
    let system = ConstraintSystem::construct(
        &program,
        &relations,
        &resolver,
        VarIdGenerator::new(),
        vec![GoalKind::Call {
            callee: callee(),
            labels: vec![Some("y".into())],
            arguments: vec![Type::Builtin(BuiltinType::Bool)],
            output: Type::Builtin(BuiltinType::Word),
            arrow: false,
        }],
        FxHashMap::default(),
        Site(0),
    );
    let solution = system.solve();
    assert!(solution.is_sound());
}

#[test]
fn a_missing_required_label_is_a_hard_failure() {
    let program = TypedProgram::new();
    let relations = Relations::new();
    let resolver = NoCandidates;
    let system = ConstraintSystem::construct(
        &program,
        &relations,
        &resolver,
        VarIdGenerator::new(),
        vec![GoalKind::Call {
            callee: callee(),
            labels: vec![Some("x".into())],
            arguments: vec![Type::Builtin(BuiltinType::Word)],
            output: Type::Builtin(BuiltinType::Word),
            arrow: false,
        }],
        FxHashMap::default(),
        Site(0),
    );
    let solution = system.solve();
    assert!(!solution.is_sound());
    let messages: Vec<String> = solution.diagnostics.iter().map(|d| d.to_string()).collect();
    assert!(messages.iter().any(|m| m.contains("incompatible labels")), "{messages:?}");
}
