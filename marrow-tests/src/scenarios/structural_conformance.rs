//! Subtyping through a type alias (spec §4.1 "canonical", §4.2 Subtyping's
//! canonicalization fallback): a nominal reference to an aliased type must
//! unify with whatever the alias expands to, not stay stuck comparing the
//! alias's own declaration against the target structurally.

use rustc_hash::FxHashMap;

use marrow_program::{DeclKind, Relations, Site, TypedProgram};
use marrow_solve::{ConstraintSystem, GoalKind};
use marrow_ty::{BuiltinType, ProductType, Type, VarIdGenerator};

use crate::support::NoCandidates;

#[test]
fn a_type_alias_of_word_is_a_subtype_of_word() {
    let mut program = TypedProgram::new();
    let site = Site(0);
    let alias_decl = program.declare("WordAlias", DeclKind::TypeAlias, vec![], Type::Error, site);
    let mut relations = Relations::new();
    relations.define_alias(alias_decl, Type::Builtin(BuiltinType::Word));

    let aliased = Type::Product(ProductType { decl: alias_decl });
    let resolver = NoCandidates;
    let system = ConstraintSystem::construct(
        &program,
        &relations,
        &resolver,
        VarIdGenerator::new(),
        vec![GoalKind::Subtyping(aliased, Type::Builtin(BuiltinType::Word), false)],
        FxHashMap::default(),
        site,
    );
    let solution = system.solve();
    assert!(solution.is_sound());
}

#[test]
fn two_aliases_of_the_same_builtin_are_equivalent_to_each_other() {
    let mut program = TypedProgram::new();
    let site = Site(0);
    let a = program.declare("A", DeclKind::TypeAlias, vec![], Type::Error, site);
    let b = program.declare("B", DeclKind::TypeAlias, vec![], Type::Error, site);
    let mut relations = Relations::new();
    relations.define_alias(a, Type::Builtin(BuiltinType::Bool));
    relations.define_alias(b, Type::Builtin(BuiltinType::Bool));

    let resolver = NoCandidates;
    let system = ConstraintSystem::construct(
        &program,
        &relations,
        &resolver,
        VarIdGenerator::new(),
        vec![GoalKind::Subtyping(
            Type::Product(ProductType { decl: a }),
            Type::Product(ProductType { decl: b }),
            false,
        )],
        FxHashMap::default(),
        site,
    );
    let solution = system.solve();
    assert!(solution.is_sound());
}
