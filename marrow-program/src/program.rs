//! `TypedProgram`: the query surface §4.3 describes the solver and IR
//! consuming. Every method here is a pure query from the caller's
//! perspective — no back-edges into the solver, matching the teacher's
//! `RustIrDatabase` contract (chalk-solve's `lib.rs`), generalized from
//! "trait/impl/struct data" to this language's declaration shapes.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use marrow_ty::{
    BoundGenericType, DeclId, GenericArgument, GenericParamId, Substitution, TraitId, Transformer,
    Type, VarIdGenerator,
};

use crate::decl::{Declaration, DeclKind, Scope, Site};

#[derive(Default)]
pub struct TypedProgram {
    decls: FxHashMap<DeclId, Declaration>,
    /// decl -> traits it is declared to conform to. Keyed by the nominal
    /// declaration rather than by a fully-applied `Type` so that a generic
    /// struct's conformance is shared across all of its instantiations,
    /// mirroring how the language expresses `extension Foo: Trait {}`.
    conformances: FxHashMap<DeclId, Vec<TraitId>>,
    /// Identity of the built-in `movable` concept, if the module imports
    /// it (spec §4.2 "Conformance" — "the built-in movable concept").
    movable_trait: Option<TraitId>,
    /// Identity of the built-in `foreign-convertible` concept.
    foreign_convertible_trait: Option<TraitId>,
    next_decl: u32,
}

impl TypedProgram {
    pub fn new() -> Self {
        TypedProgram::default()
    }

    pub fn declare(
        &mut self,
        name: impl Into<String>,
        kind: DeclKind,
        generic_parameters: Vec<String>,
        ty: Type,
        site: Site,
    ) -> DeclId {
        let id = DeclId(self.next_decl);
        self.next_decl += 1;
        self.decls.insert(
            id,
            Declaration {
                id,
                name: name.into(),
                kind,
                generic_parameters,
                ty,
                is_requirement: false,
                is_module_entry: false,
                site,
            },
        );
        id
    }

    pub fn mark_requirement(&mut self, id: DeclId) {
        if let Some(d) = self.decls.get_mut(&id) {
            d.is_requirement = true;
        }
    }

    pub fn mark_module_entry(&mut self, id: DeclId) {
        if let Some(d) = self.decls.get_mut(&id) {
            d.is_module_entry = true;
        }
    }

    pub fn decl(&self, id: DeclId) -> &Declaration {
        self.decls
            .get(&id)
            .unwrap_or_else(|| panic!("no such declaration: {:?}", id))
    }

    /// `declTypes[decl]` (spec §4.3).
    pub fn decl_type(&self, id: DeclId) -> &Type {
        &self.decl(id).ty
    }

    pub fn is_requirement(&self, id: DeclId) -> bool {
        self.decl(id).is_requirement
    }

    pub fn is_module_entry(&self, id: DeclId) -> bool {
        self.decl(id).is_module_entry
    }

    pub fn add_conformance(&mut self, decl: DeclId, tr: TraitId) {
        self.conformances.entry(decl).or_default().push(tr);
    }

    pub fn set_movable_trait(&mut self, tr: TraitId) {
        self.movable_trait = Some(tr);
    }

    pub fn set_foreign_convertible_trait(&mut self, tr: TraitId) {
        self.foreign_convertible_trait = Some(tr);
    }

    pub fn is_movable_trait(&self, tr: TraitId) -> bool {
        self.movable_trait == Some(tr)
    }

    pub fn is_foreign_convertible_trait(&self, tr: TraitId) -> bool {
        self.foreign_convertible_trait == Some(tr)
    }

    /// True if `decl` has an explicit conformance to `tr` recorded (spec
    /// §4.2 "If explicit conformance exists in scope, succeed").
    pub fn has_explicit_conformance(&self, decl: DeclId, tr: TraitId) -> bool {
        self.conformances
            .get(&decl)
            .map_or(false, |ts| ts.contains(&tr))
    }

    /// `conformedTraits(of: type, in: scope)`. `scope` is presently unused —
    /// marrow's minimal program model has no conditional conformances gated
    /// on a `where` clause — but is kept in the signature since a richer
    /// program model would consult it to filter conformances not satisfied
    /// in that scope.
    pub fn conformed_traits(&self, ty: &Type, _scope: Scope) -> Vec<TraitId> {
        match nominal_decl(ty) {
            Some(decl) => self.conformances.get(&decl).cloned().unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// `open(type, at: site)`: replaces every generic parameter belonging to
    /// `decl`'s scope with a fresh inference variable. Returns the opened
    /// type together with the parameter-key to variable mapping, needed when
    /// the caller later rebuilds a `BoundGeneric` from the solved answer
    /// (see [`close_generic`]).
    pub fn open(
        &self,
        decl: DeclId,
        ty: &Type,
        gen: &mut VarIdGenerator,
    ) -> (Type, FxHashMap<String, Type>) {
        let d = self.decl(decl);
        let mut by_index = Vec::with_capacity(d.generic_parameters.len());
        let mut mapping = FxHashMap::default();
        for key in &d.generic_parameters {
            let fresh = Type::Variable(gen.fresh());
            by_index.push(fresh.clone());
            mapping.insert(key.clone(), fresh);
        }
        let mut opener = ScopedOpen {
            scope: decl.0,
            by_index,
        };
        let opened = marrow_ty::transform(ty, &mut opener);
        (opened, mapping)
    }
}

fn nominal_decl(ty: &Type) -> Option<DeclId> {
    match ty {
        Type::Product(p) => Some(p.decl),
        Type::BoundGeneric(b) => nominal_decl(&b.base),
        _ => None,
    }
}

/// Substitutes every `GenericParameter` belonging to `scope` with the
/// correspondingly-indexed entry of `by_index`. Unlike a plain
/// variable-rewriting transform, this matches on the owning scope so that
/// opening an inner generic function does not disturb an outer, still-bound
/// type parameter of the same index.
struct ScopedOpen {
    scope: u32,
    by_index: Vec<Type>,
}

impl Transformer for ScopedOpen {
    fn transform_generic_parameter(&mut self, param: GenericParamId) -> Type {
        if param.scope != self.scope {
            return Type::GenericParameter(param);
        }
        match self.by_index.get(param.index as usize) {
            Some(ty) => ty.clone(),
            None => Type::GenericParameter(param),
        }
    }
}

/// Builds a `BoundGeneric` from an opened base and the mapping `open`
/// returned, reifying each argument through the solved substitution. Used by
/// callers finalizing a solution's bindings into concrete instantiated
/// types.
pub fn close_generic(base: Type, mapping: &FxHashMap<String, Type>, subst: &Substitution) -> Type {
    let arguments: BTreeMap<String, GenericArgument> = mapping
        .iter()
        .map(|(k, v)| (k.clone(), GenericArgument::Type(subst.reify(v, true))))
        .collect();
    Type::BoundGeneric(BoundGenericType {
        base: Box::new(base),
        arguments,
    })
}
