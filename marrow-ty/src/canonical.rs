//! Structural canonicalization (spec §4.1): reorders unordered constructors
//! (union members) so that two types which mean the same thing compare
//! equal. Alias expansion is not this crate's job — `marrow-ty` has no
//! notion of a typealias table — so `marrow-program::Relations::canonical`
//! layers that on top of `canonicalize_structural`.

use crate::transform::transform;
use crate::ty::*;

pub fn canonicalize_structural(ty: &Type) -> Type {
    match ty {
        Type::Union(u) => {
            let mut members: Vec<Type> = u.members.iter().map(canonicalize_structural).collect();
            members.sort();
            members.dedup();
            Type::Union(UnionType { members })
        }
        Type::Tuple(t) => Type::Tuple(TupleType {
            elements: t
                .elements
                .iter()
                .map(|e| TupleElement {
                    label: e.label.clone(),
                    ty: canonicalize_structural(&e.ty),
                })
                .collect(),
        }),
        Type::Lambda(l) => Type::Lambda(LambdaType {
            inputs: canonicalize_params(&l.inputs),
            environment: Box::new(canonicalize_structural(&l.environment)),
            output: Box::new(canonicalize_structural(&l.output)),
            is_subscript: l.is_subscript,
        }),
        Type::Method(m) => Type::Method(MethodType {
            receiver: Box::new(canonicalize_structural(&m.receiver)),
            inputs: canonicalize_params(&m.inputs),
            output: Box::new(canonicalize_structural(&m.output)),
            capabilities: {
                let mut caps = m.capabilities.clone();
                caps.sort();
                caps.dedup();
                caps
            },
        }),
        Type::Parameter(p) => Type::Parameter(ParameterType {
            effect: p.effect,
            bare: Box::new(canonicalize_structural(&p.bare)),
        }),
        Type::Remote(r) => Type::Remote(RemoteType {
            effect: r.effect,
            bare: Box::new(canonicalize_structural(&r.bare)),
        }),
        Type::Metatype(inner) => Type::Metatype(Box::new(canonicalize_structural(inner))),
        Type::Existential(e) => Type::Existential(ExistentialType {
            interface: match &e.interface {
                ExistentialInterface::Traits(ts) => {
                    let mut ts = ts.clone();
                    ts.sort();
                    ts.dedup();
                    ExistentialInterface::Traits(ts)
                }
                ExistentialInterface::Generic(g) => {
                    ExistentialInterface::Generic(Box::new(canonicalize_bound_generic(g)))
                }
                ExistentialInterface::Metatype(inner) => {
                    ExistentialInterface::Metatype(Box::new(canonicalize_structural(inner)))
                }
            },
        }),
        Type::BoundGeneric(b) => Type::BoundGeneric(canonicalize_bound_generic(b)),
        Type::Variable(_) | Type::GenericParameter(_) | Type::Product(_) | Type::Builtin(_) | Type::Error => {
            ty.clone()
        }
    }
}

fn canonicalize_params(params: &[CallableParameter]) -> Vec<CallableParameter> {
    params
        .iter()
        .map(|p| CallableParameter {
            label: p.label.clone(),
            ty: canonicalize_structural(&p.ty),
            has_default: p.has_default,
        })
        .collect()
}

fn canonicalize_bound_generic(b: &BoundGenericType) -> BoundGenericType {
    BoundGenericType {
        base: Box::new(canonicalize_structural(&b.base)),
        arguments: b
            .arguments
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    GenericArgument::Type(t) => GenericArgument::Type(canonicalize_structural(t)),
                    GenericArgument::Value(c) => GenericArgument::Value(c.clone()),
                };
                (k.clone(), v)
            })
            .collect(),
    }
}

pub fn is_canonical(ty: &Type) -> bool {
    canonicalize_structural(ty) == *ty
}

/// Exercises `transform` just to keep the "transform is the only mechanism
/// through which rewrites happen" property honest for the identity case;
/// used by `Substitution::optimize` indirectly via `reify`, and here to
/// assert a no-op transform really is a no-op.
#[cfg(test)]
fn identity(ty: &Type) -> Type {
    struct Id;
    impl crate::transform::Transformer for Id {}
    transform(ty, &mut Id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_members_are_sorted_and_deduped() {
        let a = Type::Builtin(BuiltinType::Bool);
        let b = Type::Builtin(BuiltinType::Word);
        let messy = Type::Union(UnionType {
            members: vec![b.clone(), a.clone(), b.clone()],
        });
        let clean = canonicalize_structural(&messy);
        match clean {
            Type::Union(u) => assert_eq!(u.members, vec![a, b]),
            _ => panic!("expected union"),
        }
    }

    #[test]
    fn identity_transform_is_noop() {
        let ty = Type::Builtin(BuiltinType::Word);
        assert_eq!(identity(&ty), ty);
    }
}
