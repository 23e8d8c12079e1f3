//! Unification (spec §4.2 "Equality"). Modeled on the teacher's
//! `chalk_solve::infer::unify::Unifier::relate`, collapsed to marrow's
//! flatter type grammar: no De Bruijn shifting, no generic `Interner` —
//! just a direct structural walk that binds variables into a
//! `Substitution` and reports every variable it newly bound so the caller
//! can wake stale goals that mention them.

use marrow_ty::{BoundGenericType, GenericArgument, Substitution, Type, VarId};

use crate::error::{ErrorKind, Fallible};

/// Unifies `l` and `r` under `subst`, extending it in place. Returns the set
/// of variables bound during this call (spec §9 "stale-goal revival");
/// returns `Err` on structural mismatch without partially applying bindings
/// from the failing subterm's siblings (each successful bind before the
/// failure point remains — the caller is expected to discard the whole
/// fork on failure, so partial progress here is never observed).
pub fn unify(l: &Type, r: &Type, subst: &mut Substitution) -> Fallible<Vec<VarId>> {
    let mut bound = Vec::new();
    unify_into(l, r, subst, &mut bound)?;
    Ok(bound)
}

fn unify_into(
    l: &Type,
    r: &Type,
    subst: &mut Substitution,
    bound: &mut Vec<VarId>,
) -> Fallible<()> {
    let l = subst.reify(l, true);
    let r = subst.reify(r, true);

    match (&l, &r) {
        (Type::Variable(a), Type::Variable(b)) if a == b => Ok(()),
        (Type::Variable(v), _) => bind(*v, r, subst, bound),
        (_, Type::Variable(v)) => bind(*v, l, subst, bound),

        (Type::Builtin(a), Type::Builtin(b)) if a == b => Ok(()),
        (Type::Product(a), Type::Product(b)) if a.decl == b.decl => Ok(()),
        (Type::GenericParameter(a), Type::GenericParameter(b)) if a == b => Ok(()),
        (Type::Error, _) | (_, Type::Error) => Ok(()),

        (Type::Tuple(a), Type::Tuple(b)) => {
            if a.elements.len() != b.elements.len() {
                return mismatch(&l, &r);
            }
            for (ea, eb) in a.elements.iter().zip(b.elements.iter()) {
                if ea.label != eb.label {
                    return mismatch(&l, &r);
                }
                unify_into(&ea.ty, &eb.ty, subst, bound)?;
            }
            Ok(())
        }

        (Type::Union(a), Type::Union(b)) => {
            if a.members.len() != b.members.len() {
                return mismatch(&l, &r);
            }
            for (ma, mb) in a.members.iter().zip(b.members.iter()) {
                unify_into(ma, mb, subst, bound)?;
            }
            Ok(())
        }

        (Type::Lambda(a), Type::Lambda(b)) => {
            if a.is_subscript != b.is_subscript || a.inputs.len() != b.inputs.len() {
                return mismatch(&l, &r);
            }
            for (pa, pb) in a.inputs.iter().zip(b.inputs.iter()) {
                if pa.label != pb.label {
                    return mismatch(&l, &r);
                }
                unify_into(&pa.ty, &pb.ty, subst, bound)?;
            }
            unify_into(&a.environment, &b.environment, subst, bound)?;
            unify_into(&a.output, &b.output, subst, bound)
        }

        (Type::Method(a), Type::Method(b)) => {
            if a.inputs.len() != b.inputs.len() || a.capabilities != b.capabilities {
                return mismatch(&l, &r);
            }
            for (pa, pb) in a.inputs.iter().zip(b.inputs.iter()) {
                if pa.label != pb.label {
                    return mismatch(&l, &r);
                }
                unify_into(&pa.ty, &pb.ty, subst, bound)?;
            }
            unify_into(&a.receiver, &b.receiver, subst, bound)?;
            unify_into(&a.output, &b.output, subst, bound)
        }

        (Type::Parameter(a), Type::Parameter(b)) => {
            if a.effect != b.effect {
                return mismatch(&l, &r);
            }
            unify_into(&a.bare, &b.bare, subst, bound)
        }

        (Type::Remote(a), Type::Remote(b)) => {
            if a.effect != b.effect {
                return mismatch(&l, &r);
            }
            unify_into(&a.bare, &b.bare, subst, bound)
        }

        (Type::Metatype(a), Type::Metatype(b)) => unify_into(a, b, subst, bound),

        (Type::Existential(a), Type::Existential(b)) => {
            use marrow_ty::ExistentialInterface as EI;
            match (&a.interface, &b.interface) {
                (EI::Traits(ta), EI::Traits(tb)) if ta == tb => Ok(()),
                (EI::Metatype(ta), EI::Metatype(tb)) => unify_into(ta, tb, subst, bound),
                (EI::Generic(ga), EI::Generic(gb)) => unify_bound_generic(ga, gb, subst, bound),
                _ => mismatch(&l, &r),
            }
        }

        (Type::BoundGeneric(a), Type::BoundGeneric(b)) => unify_bound_generic(a, b, subst, bound),

        _ => mismatch(&l, &r),
    }
}

fn unify_bound_generic(
    a: &BoundGenericType,
    b: &BoundGenericType,
    subst: &mut Substitution,
    bound: &mut Vec<VarId>,
) -> Fallible<()> {
    if a.arguments.len() != b.arguments.len() {
        return mismatch(&Type::BoundGeneric(a.clone()), &Type::BoundGeneric(b.clone()));
    }
    unify_into(&a.base, &b.base, subst, bound)?;
    for (key, va) in &a.arguments {
        let vb = b.arguments.get(key).ok_or_else(|| ErrorKind::UnificationFailure {
            found: Type::BoundGeneric(a.clone()),
            expected: Type::BoundGeneric(b.clone()),
        })?;
        match (va, vb) {
            (GenericArgument::Type(ta), GenericArgument::Type(tb)) => {
                unify_into(ta, tb, subst, bound)?;
            }
            (GenericArgument::Value(ca), GenericArgument::Value(cb)) if ca == cb => {}
            _ => {
                return mismatch(&Type::BoundGeneric(a.clone()), &Type::BoundGeneric(b.clone()));
            }
        }
    }
    Ok(())
}

fn bind(
    var: VarId,
    ty: Type,
    subst: &mut Substitution,
    bound: &mut Vec<VarId>,
) -> Fallible<()> {
    if ty.as_variable() == Some(var) {
        return Ok(());
    }
    subst.bind(var, ty);
    bound.push(var);
    Ok(())
}

fn mismatch(l: &Type, r: &Type) -> Fallible<()> {
    Err(ErrorKind::UnificationFailure {
        found: l.clone(),
        expected: r.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use marrow_ty::{BuiltinType, VarIdGenerator};

    #[test]
    fn binds_unbound_variable() {
        let mut gen = VarIdGenerator::new();
        let v = gen.fresh();
        let mut subst = Substitution::new();
        let bound = unify(&Type::Variable(v), &Type::Builtin(BuiltinType::Word), &mut subst).unwrap();
        assert_eq!(bound, vec![v]);
        assert_eq!(subst.lookup(v), Some(&Type::Builtin(BuiltinType::Word)));
    }

    #[test]
    fn mismatched_builtins_fail() {
        let mut subst = Substitution::new();
        let err = unify(
            &Type::Builtin(BuiltinType::Word),
            &Type::Builtin(BuiltinType::Bool),
            &mut subst,
        )
        .unwrap_err();
        assert!(matches!(err, ErrorKind::UnificationFailure { .. }));
    }

    #[test]
    fn tuple_label_mismatch_fails() {
        use marrow_ty::{TupleElement, TupleType};
        let mut subst = Substitution::new();
        let a = Type::Tuple(TupleType {
            elements: vec![TupleElement {
                label: Some("x".into()),
                ty: Type::Builtin(BuiltinType::Word),
            }],
        });
        let b = Type::Tuple(TupleType {
            elements: vec![TupleElement {
                label: Some("y".into()),
                ty: Type::Builtin(BuiltinType::Word),
            }],
        });
        assert!(unify(&a, &b, &mut subst).is_err());
    }
}
