//! The front-end boundary (spec §1: parsing and name resolution are
//! explicit external collaborators, not part of the core). `marrow-driver`
//! does not implement a parser for the source language; it only defines the
//! handoff shape a real front end would produce and ships one fixed
//! `DemoFrontend` that exercises the union-widening scenario (spec §8
//! scenario 1) so the CLI is runnable end-to-end without one.

use std::path::Path;

use rustc_hash::FxHashMap;

use marrow_program::{Candidate, NameResolver, Purpose, Relations, Scope, Site, TypedProgram};
use marrow_solve::GoalKind;
use marrow_ty::{BuiltinType, Type, UnionType, VarIdGenerator};

/// Everything the driver needs to seed a `ConstraintSystem` and, once
/// solved, an IR module: a typed program, the alias/equivalence relations
/// over it, a name resolver, a variable generator already advanced past any
/// variables the front end allocated while lowering, and the root goals.
pub struct LoweredProgram {
    pub program: TypedProgram,
    pub relations: Relations,
    pub resolver: Box<dyn NameResolver>,
    pub var_gen: VarIdGenerator,
    pub goals: Vec<GoalKind>,
    pub site: Site,
}

pub trait Frontend {
    /// Lowers the source file at `path` into a `LoweredProgram`. A real
    /// front end would parse and resolve names here; `path` is accepted but
    /// ignored by the bundled demo implementation.
    fn load(&self, path: &Path) -> Result<LoweredProgram, String>;
}

struct NoCandidates;
impl NameResolver for NoCandidates {
    fn resolve(&self, _name: &str, _scope: Scope, _purpose: Purpose, _site: Site) -> Vec<Candidate> {
        Vec::new()
    }
}

/// Stands in for a real parser/resolver: always produces the union-widening
/// scenario (`let x: Union<Word, Bool> = <word literal>`, spec §8 scenario
/// 1) regardless of what `path` actually contains.
pub struct DemoFrontend;

impl Frontend for DemoFrontend {
    fn load(&self, _path: &Path) -> Result<LoweredProgram, String> {
        let program = TypedProgram::new();
        let relations = Relations::new();
        let mut var_gen = VarIdGenerator::new();
        let literal = Type::Variable(var_gen.fresh());
        let union = Type::Union(UnionType {
            members: vec![Type::Builtin(BuiltinType::Word), Type::Builtin(BuiltinType::Bool)],
        });
        let goals = vec![
            GoalKind::Equality(literal.clone(), Type::Builtin(BuiltinType::Word)),
            GoalKind::Subtyping(literal, union, false),
        ];
        Ok(LoweredProgram {
            program,
            relations,
            resolver: Box::new(NoCandidates),
            var_gen,
            goals,
            site: Site(0),
        })
    }
}

#[allow(dead_code)]
pub fn initial_bindings() -> FxHashMap<marrow_program::ExprId, marrow_ty::DeclId> {
    FxHashMap::default()
}
