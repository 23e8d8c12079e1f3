//! Shared scaffolding for the scenario tests: a configurable stand-in for
//! the front end's `NameResolver` and a couple of small type builders so
//! each scenario file reads as the constraint/IR shape it exercises rather
//! than as resolver boilerplate.

use marrow_program::{Candidate, NameResolver, Purpose, Scope, Site};
use marrow_ty::{CallableParameter, DeclId, LambdaType, Type};

/// A resolver that always returns a fixed candidate list, regardless of the
/// name or site asked about. Good enough for scenarios that only care about
/// how the constraint system reacts to zero, one, or several candidates.
pub struct FixedResolver(pub Vec<Candidate>);

impl NameResolver for FixedResolver {
    fn resolve(&self, _name: &str, _scope: Scope, _purpose: Purpose, _site: Site) -> Vec<Candidate> {
        self.0.clone()
    }
}

pub struct NoCandidates;
impl NameResolver for NoCandidates {
    fn resolve(&self, _name: &str, _scope: Scope, _purpose: Purpose, _site: Site) -> Vec<Candidate> {
        Vec::new()
    }
}

pub fn plain_lambda(inputs: Vec<CallableParameter>, output: Type) -> Type {
    Type::Lambda(LambdaType {
        inputs,
        environment: Box::new(Type::never()),
        output: Box::new(output),
        is_subscript: false,
    })
}

pub fn candidate(decl: DeclId, ty: Type) -> Candidate {
    Candidate { decl, ty, requires: Vec::new(), is_concrete: true }
}
