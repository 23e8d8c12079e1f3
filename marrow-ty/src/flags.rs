//! Structural flags (spec §3): conservative unions over subterms.
//!
//! The teacher caches these bits on every `Ty` node (`chalk_ir::Ty` carries a
//! `TyData` with precomputed flags) to avoid re-walking types during the hot
//! unification loop. We compute them on demand instead: marrow's `Type` tree
//! is small enough in practice (no De Bruijn binder shifting, no interner)
//! that a cached-bit field would mostly add bookkeeping risk (a cache that
//! forgets to invalidate is worse than no cache). `Flags::of` is a pure
//! function of structure, so the "conservative union over subterms"
//! invariant holds by construction rather than by cache discipline.

use crate::ty::*;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Flags {
    pub is_canonical: bool,
    pub contains_variable: bool,
    pub contains_error: bool,
}

impl Flags {
    pub fn of(ty: &Type) -> Flags {
        match ty {
            Type::Variable(_) => Flags {
                is_canonical: true,
                contains_variable: true,
                contains_error: false,
            },
            Type::GenericParameter(_) | Type::Builtin(_) | Type::Product(_) => Flags {
                is_canonical: true,
                contains_variable: false,
                contains_error: false,
            },
            Type::Tuple(t) => t
                .elements
                .iter()
                .map(|e| Flags::of(&e.ty))
                .fold(leaf_canonical(), union),
            Type::Union(u) => {
                let sorted = is_sorted_unique(&u.members);
                let inner = u
                    .members
                    .iter()
                    .map(Flags::of)
                    .fold(leaf_canonical(), union);
                Flags {
                    is_canonical: inner.is_canonical && sorted,
                    ..inner
                }
            }
            Type::Lambda(l) => {
                let mut acc = Flags::of(&l.environment);
                acc = union(acc, Flags::of(&l.output));
                for p in &l.inputs {
                    acc = union(acc, Flags::of(&p.ty));
                }
                acc
            }
            Type::Method(m) => {
                let mut acc = Flags::of(&m.receiver);
                acc = union(acc, Flags::of(&m.output));
                for p in &m.inputs {
                    acc = union(acc, Flags::of(&p.ty));
                }
                acc
            }
            Type::Parameter(p) => Flags::of(&p.bare),
            Type::Remote(r) => Flags::of(&r.bare),
            Type::Metatype(t) => Flags::of(t),
            Type::Existential(e) => match &e.interface {
                ExistentialInterface::Traits(_) => leaf_canonical(),
                ExistentialInterface::Generic(g) => Flags::of_bound_generic(g),
                ExistentialInterface::Metatype(t) => Flags::of(t),
            },
            Type::BoundGeneric(b) => Flags::of_bound_generic(b),
            Type::Error => Flags {
                is_canonical: true,
                contains_variable: false,
                contains_error: true,
            },
        }
    }

    fn of_bound_generic(b: &BoundGenericType) -> Flags {
        let mut acc = Flags::of(&b.base);
        for arg in b.arguments.values() {
            if let GenericArgument::Type(t) = arg {
                acc = union(acc, Flags::of(t));
            }
        }
        acc
    }
}

fn leaf_canonical() -> Flags {
    Flags {
        is_canonical: true,
        contains_variable: false,
        contains_error: false,
    }
}

fn union(a: Flags, b: Flags) -> Flags {
    Flags {
        is_canonical: a.is_canonical && b.is_canonical,
        contains_variable: a.contains_variable || b.contains_variable,
        contains_error: a.contains_error || b.contains_error,
    }
}

fn is_sorted_unique(members: &[Type]) -> bool {
    members.windows(2).all(|w| w[0] < w[1])
}
