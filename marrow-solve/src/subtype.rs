//! Subtyping decomposition (spec §4.2 "Subtyping(l, r, strict?)"). This
//! module only ever decides *how* a subtyping goal should be broken down;
//! the actual spawning of subordinate goals and disjunctions happens in
//! `system::dispatch`, which owns goal/fresh-list bookkeeping.

use marrow_program::{close_generic, Relations, TypedProgram};
use marrow_ty::{ExistentialInterface, GenericArgument, Substitution, Type, VarIdGenerator};

use crate::error::{ErrorKind, SubtypeFailureKind};
use crate::goal::{GoalKind, TupleBranch};

pub enum Decomposition {
    /// The relation holds as-is; no subordinate goals needed.
    Success,
    /// Fall back to unification between `l` and `r`.
    Unify,
    /// All of these must hold (a `Product` outcome over fresh subordinate
    /// goals of the listed kinds).
    All(Vec<GoalKind>),
    /// Spawn a `Disjunction` goal with these choices.
    Disjunction(Vec<TupleBranch>),
    Failure(ErrorKind),
}

/// Implements the rule table from spec §4.2. `strict` forbids the
/// "equivalent already, trivially succeed" shortcut.
pub fn decompose(
    program: &TypedProgram,
    relations: &Relations,
    gen: &mut VarIdGenerator,
    l: &Type,
    r: &Type,
    strict: bool,
) -> Decomposition {
    if relations.are_equivalent(l, r) {
        return if strict {
            Decomposition::Failure(ErrorKind::SubtypeFailure(
                SubtypeFailureKind::NotStrictSubtype,
                l.clone(),
                r.clone(),
            ))
        } else {
            Decomposition::Success
        };
    }

    match (l, r) {
        (Type::Union(_), Type::Union(_)) => {
            // A narrower union widens into a wider one (spec §4.2 "union ≤
            // union") the same way any L widens into a union: each L-member
            // must itself be a subtype of the *whole* R union, which the
            // `(_, Union)` arm below already decomposes correctly for any
            // member count, so canonicalize both sides and recurse through
            // it one L-member at a time instead of zipping positionally.
            let Type::Union(clu) = relations.canonical(l) else { unreachable!("canonical of a union is a union") };
            let cr = relations.canonical(r);
            let goals = clu
                .members
                .into_iter()
                .map(|m| GoalKind::Subtyping(m, cr.clone(), strict))
                .collect();
            Decomposition::All(goals)
        }

        (_, Type::Union(ru)) => match ru.members.len() {
            0 => {
                if l.is_never() {
                    Decomposition::Success
                } else {
                    Decomposition::Failure(ErrorKind::SubtypeFailure(
                        SubtypeFailureKind::CannotInitializeWith,
                        l.clone(),
                        r.clone(),
                    ))
                }
            }
            1 => Decomposition::All(vec![GoalKind::Subtyping(
                l.clone(),
                ru.members[0].clone(),
                strict,
            )]),
            n => {
                let mut choices = Vec::with_capacity(n + 1);
                if !strict {
                    choices.push(TupleBranch {
                        constraints: vec![GoalKind::Equality(l.clone(), r.clone())],
                        penalty: 0,
                    });
                }
                for i in 0..n {
                    let mut subset = ru.members.clone();
                    subset.remove(i);
                    let narrowed = Type::Union(marrow_ty::UnionType { members: subset });
                    choices.push(TupleBranch {
                        constraints: vec![GoalKind::Subtyping(l.clone(), narrowed, strict)],
                        penalty: 1,
                    });
                }
                Decomposition::Disjunction(choices)
            }
        },

        // variable ≤ R (spec §4.2 "variable ≤ R ... if R is a leaf we may
        // unify directly").
        (Type::Variable(_), _) if !strict => {
            if r.is_leaf() {
                Decomposition::Unify
            } else {
                let inference = vec![
                    TupleBranch {
                        constraints: vec![GoalKind::Equality(l.clone(), r.clone())],
                        penalty: 0,
                    },
                    TupleBranch {
                        constraints: vec![GoalKind::Subtyping(l.clone(), r.clone(), true)],
                        penalty: 1,
                    },
                ];
                Decomposition::Disjunction(inference)
            }
        }

        // L ≤ variable (spec §4.2 "L ≤ variable, not strict ... when [L] is
        // a leaf the alternative becomes L = never").
        (_, Type::Variable(_)) if !strict => {
            let inference = if l.is_leaf() {
                vec![
                    TupleBranch {
                        constraints: vec![GoalKind::Equality(l.clone(), r.clone())],
                        penalty: 0,
                    },
                    TupleBranch {
                        constraints: vec![GoalKind::Equality(l.clone(), Type::never())],
                        penalty: 1,
                    },
                ]
            } else {
                vec![
                    TupleBranch {
                        constraints: vec![GoalKind::Equality(l.clone(), r.clone())],
                        penalty: 0,
                    },
                    TupleBranch {
                        constraints: vec![GoalKind::Subtyping(l.clone(), r.clone(), true)],
                        penalty: 1,
                    },
                ]
            };
            Decomposition::Disjunction(inference)
        }

        (Type::Remote(remote), _) => {
            Decomposition::All(vec![GoalKind::Subtyping(*remote.bare.clone(), r.clone(), strict)])
        }

        (_, Type::Existential(e)) => match &e.interface {
            ExistentialInterface::Traits(traits) => {
                let goals = traits
                    .iter()
                    .map(|t| GoalKind::Conformance(l.clone(), *t))
                    .collect();
                Decomposition::All(goals)
            }
            ExistentialInterface::Generic(bound) => match existential_base_decl(&bound.base) {
                // `program.open` replaces `GenericParameter` nodes embedded
                // in a type, but a bare `Product` reference carries none —
                // its generic parameters live on the *declaration*, not the
                // reference. So open the declaration's own parameter list to
                // get the fresh-variable mapping (spec §4.2 "open the base
                // with fresh variables per generic parameter"), close the
                // base back over that mapping to get the type `l` must
                // equal, and pin each fresh variable the bound's own
                // arguments already constrain.
                Some(decl) => {
                    let (_, mapping) = program.open(decl, &bound.base, gen);
                    let instantiated =
                        close_generic((*bound.base).clone(), &mapping, &Substitution::new());
                    let mut goals = vec![GoalKind::Equality(l.clone(), instantiated)];
                    for (key, fresh) in &mapping {
                        if let Some(GenericArgument::Type(concrete)) = bound.arguments.get(key) {
                            goals.push(GoalKind::Equality(fresh.clone(), concrete.clone()));
                        }
                    }
                    Decomposition::All(goals)
                }
                None => Decomposition::Failure(ErrorKind::SubtypeFailure(
                    SubtypeFailureKind::NotSubtype,
                    l.clone(),
                    r.clone(),
                )),
            },
            ExistentialInterface::Metatype(inner) => {
                Decomposition::All(vec![GoalKind::Equality(l.clone(), Type::Metatype(inner.clone()))])
            }
        },

        (Type::Lambda(la), Type::Lambda(lb)) => {
            if la.is_subscript != lb.is_subscript || la.inputs.len() != lb.inputs.len() {
                return Decomposition::Failure(ErrorKind::SubtypeFailure(
                    SubtypeFailureKind::NotSubtype,
                    l.clone(),
                    r.clone(),
                ));
            }
            let mut goals = Vec::new();
            for (pa, pb) in la.inputs.iter().zip(lb.inputs.iter()) {
                if pa.label != pb.label {
                    return Decomposition::Failure(ErrorKind::SubtypeFailure(
                        SubtypeFailureKind::NotSubtype,
                        l.clone(),
                        r.clone(),
                    ));
                }
                // parameters are contravariant: lb's parameter must accept
                // what la's parameter accepts, i.e. pb <= pa.
                goals.push(GoalKind::Subtyping(pb.ty.clone(), pa.ty.clone(), false));
            }
            goals.push(GoalKind::Subtyping(
                *la.environment.clone(),
                *lb.environment.clone(),
                false,
            ));
            goals.push(GoalKind::Subtyping(*la.output.clone(), *lb.output.clone(), false));
            Decomposition::All(goals)
        }

        _ if !relations.canonical(l).eq(l) || !relations.canonical(r).eq(r) => {
            let cl = relations.canonical(l);
            let cr = relations.canonical(r);
            Decomposition::All(vec![GoalKind::Subtyping(cl, cr, strict)])
        }

        _ if strict => Decomposition::Failure(ErrorKind::SubtypeFailure(
            SubtypeFailureKind::NotStrictSubtype,
            l.clone(),
            r.clone(),
        )),

        _ => Decomposition::Unify,
    }
}

/// The declaration whose generic-parameter list an existential's bound
/// generic interface should be opened against.
fn existential_base_decl(base: &Type) -> Option<marrow_ty::DeclId> {
    match base {
        Type::Product(p) => Some(p.decl),
        Type::BoundGeneric(b) => existential_base_decl(&b.base),
        _ => None,
    }
}
