//! Structural transform with fold state (spec §4.1): the single mechanism
//! through which substitutions are applied. Modeled on the teacher's `Fold`
//! trait (`chalk_ir::fold::Fold`), collapsed to the one substitution-shaped
//! use this crate actually needs: variables and generic parameters are the
//! only leaves a transform can rewrite, everything else recurses.

use crate::ty::*;

pub trait Transformer {
    /// Called for every `Type::Variable` encountered. The default leaves it
    /// untouched (identity transform).
    fn transform_variable(&mut self, var: VarId) -> Type {
        Type::Variable(var)
    }

    /// Called for every `Type::GenericParameter` encountered.
    fn transform_generic_parameter(&mut self, param: GenericParamId) -> Type {
        Type::GenericParameter(param)
    }
}

/// Applies `t` to every leaf of `ty`, rebuilding the structure around the
/// (possibly rewritten) leaves. This is the only function in the crate that
/// walks into every `Type` variant, so every new variant added to the type
/// grammar must be taught here once.
pub fn transform(ty: &Type, t: &mut impl Transformer) -> Type {
    match ty {
        Type::Variable(v) => t.transform_variable(*v),
        Type::GenericParameter(p) => t.transform_generic_parameter(*p),
        Type::Product(p) => Type::Product(*p),
        Type::Builtin(b) => Type::Builtin(*b),
        Type::Tuple(tup) => Type::Tuple(TupleType {
            elements: tup
                .elements
                .iter()
                .map(|e| TupleElement {
                    label: e.label.clone(),
                    ty: transform(&e.ty, t),
                })
                .collect(),
        }),
        Type::Union(u) => Type::Union(UnionType {
            members: u.members.iter().map(|m| transform(m, t)).collect(),
        }),
        Type::Lambda(l) => Type::Lambda(LambdaType {
            inputs: transform_params(&l.inputs, t),
            environment: Box::new(transform(&l.environment, t)),
            output: Box::new(transform(&l.output, t)),
            is_subscript: l.is_subscript,
        }),
        Type::Method(m) => Type::Method(MethodType {
            receiver: Box::new(transform(&m.receiver, t)),
            inputs: transform_params(&m.inputs, t),
            output: Box::new(transform(&m.output, t)),
            capabilities: m.capabilities.clone(),
        }),
        Type::Parameter(p) => Type::Parameter(ParameterType {
            effect: p.effect,
            bare: Box::new(transform(&p.bare, t)),
        }),
        Type::Remote(r) => Type::Remote(RemoteType {
            effect: r.effect,
            bare: Box::new(transform(&r.bare, t)),
        }),
        Type::Metatype(inner) => Type::Metatype(Box::new(transform(inner, t))),
        Type::Existential(e) => Type::Existential(ExistentialType {
            interface: match &e.interface {
                ExistentialInterface::Traits(ts) => ExistentialInterface::Traits(ts.clone()),
                ExistentialInterface::Generic(g) => {
                    ExistentialInterface::Generic(Box::new(transform_bound_generic(g, t)))
                }
                ExistentialInterface::Metatype(inner) => {
                    ExistentialInterface::Metatype(Box::new(transform(inner, t)))
                }
            },
        }),
        Type::BoundGeneric(b) => Type::BoundGeneric(transform_bound_generic(b, t)),
        Type::Error => Type::Error,
    }
}

fn transform_params(params: &[CallableParameter], t: &mut impl Transformer) -> Vec<CallableParameter> {
    params
        .iter()
        .map(|p| CallableParameter {
            label: p.label.clone(),
            ty: transform(&p.ty, t),
            has_default: p.has_default,
        })
        .collect()
}

fn transform_bound_generic(b: &BoundGenericType, t: &mut impl Transformer) -> BoundGenericType {
    BoundGenericType {
        base: Box::new(transform(&b.base, t)),
        arguments: b
            .arguments
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    GenericArgument::Type(ty) => GenericArgument::Type(transform(ty, t)),
                    GenericArgument::Value(c) => GenericArgument::Value(c.clone()),
                };
                (k.clone(), v)
            })
            .collect(),
    }
}
