//! Type-alias expansion and the two relations derived from it (spec §4.1,
//! §4.3): `canonical` layers alias expansion on top of
//! `marrow_ty::canonicalize_structural`, and `are_equivalent` is just
//! canonical-form equality.

use rustc_hash::FxHashMap;

use marrow_ty::{
    canonicalize_structural, BoundGenericType, CallableParameter, DeclId, ExistentialInterface,
    ExistentialType, GenericArgument, LambdaType, MethodType, ParameterType, RemoteType, Type,
    TupleElement, TupleType, UnionType,
};

/// Owns the module's typealias table and exposes the two relations the
/// constraint system and IR need on top of raw structural canonicalization.
#[derive(Default)]
pub struct Relations {
    aliases: FxHashMap<DeclId, Type>,
}

impl Relations {
    pub fn new() -> Self {
        Relations::default()
    }

    pub fn define_alias(&mut self, decl: DeclId, target: Type) {
        self.aliases.insert(decl, target);
    }

    /// Expands every alias reachable from `ty` and then structurally
    /// canonicalizes the result. Aliases may refer to other aliases; a
    /// `seen` guard turns a cyclic alias chain into a no-op expansion at the
    /// point of recursion rather than looping forever (the language's name
    /// resolver is expected to reject alias cycles before this ever runs,
    /// but the core does not trust that as an invariant).
    pub fn canonical(&self, ty: &Type) -> Type {
        canonicalize_structural(&self.expand(ty, &mut Vec::new()))
    }

    pub fn are_equivalent(&self, a: &Type, b: &Type) -> bool {
        self.canonical(a) == self.canonical(b)
    }

    fn expand(&self, ty: &Type, seen: &mut Vec<DeclId>) -> Type {
        match ty {
            Type::Product(p) => match self.aliases.get(&p.decl) {
                Some(target) if !seen.contains(&p.decl) => {
                    seen.push(p.decl);
                    let expanded = self.expand(target, seen);
                    seen.pop();
                    expanded
                }
                _ => ty.clone(),
            },
            Type::Tuple(t) => Type::Tuple(TupleType {
                elements: t
                    .elements
                    .iter()
                    .map(|e| TupleElement {
                        label: e.label.clone(),
                        ty: self.expand(&e.ty, seen),
                    })
                    .collect(),
            }),
            Type::Union(u) => Type::Union(UnionType {
                members: u.members.iter().map(|m| self.expand(m, seen)).collect(),
            }),
            Type::Lambda(l) => Type::Lambda(LambdaType {
                inputs: self.expand_params(&l.inputs, seen),
                environment: Box::new(self.expand(&l.environment, seen)),
                output: Box::new(self.expand(&l.output, seen)),
                is_subscript: l.is_subscript,
            }),
            Type::Method(m) => Type::Method(MethodType {
                receiver: Box::new(self.expand(&m.receiver, seen)),
                inputs: self.expand_params(&m.inputs, seen),
                output: Box::new(self.expand(&m.output, seen)),
                capabilities: m.capabilities.clone(),
            }),
            Type::Parameter(p) => Type::Parameter(ParameterType {
                effect: p.effect,
                bare: Box::new(self.expand(&p.bare, seen)),
            }),
            Type::Remote(r) => Type::Remote(RemoteType {
                effect: r.effect,
                bare: Box::new(self.expand(&r.bare, seen)),
            }),
            Type::Metatype(inner) => Type::Metatype(Box::new(self.expand(inner, seen))),
            Type::Existential(e) => Type::Existential(ExistentialType {
                interface: match &e.interface {
                    ExistentialInterface::Traits(ts) => ExistentialInterface::Traits(ts.clone()),
                    ExistentialInterface::Generic(g) => {
                        ExistentialInterface::Generic(Box::new(self.expand_bound_generic(g, seen)))
                    }
                    ExistentialInterface::Metatype(inner) => {
                        ExistentialInterface::Metatype(Box::new(self.expand(inner, seen)))
                    }
                },
            }),
            Type::BoundGeneric(b) => Type::BoundGeneric(self.expand_bound_generic(b, seen)),
            Type::Variable(_) | Type::GenericParameter(_) | Type::Builtin(_) | Type::Error => {
                ty.clone()
            }
        }
    }

    fn expand_params(
        &self,
        params: &[CallableParameter],
        seen: &mut Vec<DeclId>,
    ) -> Vec<CallableParameter> {
        params
            .iter()
            .map(|p| CallableParameter {
                label: p.label.clone(),
                ty: self.expand(&p.ty, seen),
                has_default: p.has_default,
            })
            .collect()
    }

    fn expand_bound_generic(&self, b: &BoundGenericType, seen: &mut Vec<DeclId>) -> BoundGenericType {
        BoundGenericType {
            base: Box::new(self.expand(&b.base, seen)),
            arguments: b
                .arguments
                .iter()
                .map(|(k, v)| {
                    let v = match v {
                        GenericArgument::Type(t) => GenericArgument::Type(self.expand(t, seen)),
                        GenericArgument::Value(c) => GenericArgument::Value(c.clone()),
                    };
                    (k.clone(), v)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marrow_ty::BuiltinType;

    #[test]
    fn alias_expands_before_comparison() {
        let mut relations = Relations::new();
        let alias = DeclId(0);
        relations.define_alias(alias, Type::Builtin(BuiltinType::Word));

        let aliased = Type::Product(marrow_ty::ProductType { decl: alias });
        let direct = Type::Builtin(BuiltinType::Word);
        assert!(relations.are_equivalent(&aliased, &direct));
    }

    #[test]
    fn unrelated_types_are_not_equivalent() {
        let relations = Relations::new();
        let a = Type::Builtin(BuiltinType::Word);
        let b = Type::Builtin(BuiltinType::Bool);
        assert!(!relations.are_equivalent(&a, &b));
    }
}
