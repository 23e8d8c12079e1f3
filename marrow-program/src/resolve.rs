//! The name-resolution contract (spec §1, §4.2 "Overload"): the core never
//! resolves a name itself, it only asks an external `NameResolver` for the
//! set of declarations a name could mean at a site and turns the answer into
//! `Disjunction`/`Overload` goals. Kept here rather than in `marrow-solve`
//! so the constraint system can depend on the contract without owning it.

use marrow_ty::{DeclId, TraitId, Type};

use crate::decl::{Scope, Site};

/// Why a name is being looked up, so the resolver (and downstream overload
/// scoring) can tell a bare reference from a call from a member access.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Purpose {
    /// A bare name used as a value, e.g. assigned or passed around.
    Reference,
    /// The callee position of a call expression.
    Call,
    /// A member name looked up on a receiver type.
    Member,
}

/// One declaration a name could refer to at a site, together with the side
/// conditions its use must additionally satisfy. `requires` is deliberately
/// structural (`Type` conforms to `TraitId`) rather than an already-built
/// `Conformance` goal: `marrow-program` has no notion of a `Goal`, and must
/// not depend on `marrow-solve` (spec §2 dependency order), so it hands back
/// raw requirements for the constraint system to translate.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub decl: DeclId,
    /// The candidate's type, already opened (fresh variables in place of
    /// its generic parameters) if it is generic.
    pub ty: Type,
    pub requires: Vec<(Type, TraitId)>,
    /// True when the candidate is the sole possibility — lets the
    /// constraint system skip building a `Disjunction` for the common case
    /// of an unambiguous name.
    pub is_concrete: bool,
}

/// The external collaborator that turns a name into candidates. Implemented
/// by the front end; the core only ever calls through this trait.
pub trait NameResolver {
    fn resolve(&self, name: &str, scope: Scope, purpose: Purpose, site: Site) -> Vec<Candidate>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;
    impl NameResolver for Empty {
        fn resolve(&self, _name: &str, _scope: Scope, _purpose: Purpose, _site: Site) -> Vec<Candidate> {
            Vec::new()
        }
    }

    #[test]
    fn resolver_contract_is_object_safe_enough_to_box() {
        let resolver: Box<dyn NameResolver> = Box::new(Empty);
        assert!(resolver
            .resolve("x", Scope(0), Purpose::Reference, Site(0))
            .is_empty());
    }
}
