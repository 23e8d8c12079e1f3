//! The substitution map (spec §3 "Substitution map"): a monotonically
//! growing mapping from variable identity to type. Owns all bindings;
//! variables are never mutated in place (spec §4.1).

use rustc_hash::{FxHashMap, FxHashSet};

use crate::transform::{transform, Transformer};
use crate::ty::{Type, VarId};

#[derive(Clone, Debug, Default)]
pub struct Substitution {
    bindings: FxHashMap<VarId, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution {
            bindings: FxHashMap::default(),
        }
    }

    /// Binds `var` to `ty`. The map is append-only: rebinding an already
    /// bound variable is a logic error in the solver (it would mean two
    /// `Equality` goals raced to assign the same variable without the
    /// second one going through unification against the first's value).
    pub fn bind(&mut self, var: VarId, ty: Type) {
        let prior = self.bindings.insert(var, ty);
        debug_assert!(
            prior.is_none(),
            "substitution map is monotonic: {:?} was already bound",
            var
        );
    }

    pub fn is_bound(&self, var: VarId) -> bool {
        self.bindings.contains_key(&var)
    }

    pub fn lookup(&self, var: VarId) -> Option<&Type> {
        self.bindings.get(&var)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Walks `ty` applying substitutions transitively. When `keep_variables`
    /// is true, variables with no binding are left as-is; when false, they
    /// are replaced with `Type::Error` (there is nothing sound to put in
    /// their place once the caller has declared it no longer wants to see
    /// open variables — this only happens when finalizing a *sound*
    /// solution, where by construction no variable relevant to the answer
    /// should remain unbound).
    ///
    /// A variable that (directly or through a chain of bindings) resolves
    /// back to itself is a fixed point, not an infinite expansion: the
    /// `in_progress` set below catches the revisit and stops there, per the
    /// "cyclic references... treat them as fixed points" rule (spec §9).
    pub fn reify(&self, ty: &Type, keep_variables: bool) -> Type {
        let mut reifier = Reifier {
            subst: self,
            keep_variables,
            in_progress: FxHashSet::default(),
        };
        transform(ty, &mut reifier)
    }

    /// Path-compresses every binding to its fully reified terminal form, so
    /// later lookups don't have to walk a chain. Purely a performance
    /// optimization: `reify` is already idempotent on its own (its output
    /// contains only unbound variables or fully-resolved structure), so this
    /// changes nothing observable, only how much work future `reify` calls
    /// do.
    pub fn optimize(&mut self) {
        let vars: Vec<VarId> = self.bindings.keys().copied().collect();
        for v in vars {
            let resolved = self.reify(&Type::Variable(v), true);
            self.bindings.insert(v, resolved);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Type)> {
        self.bindings.iter().map(|(k, v)| (*k, v))
    }
}

struct Reifier<'a> {
    subst: &'a Substitution,
    keep_variables: bool,
    in_progress: FxHashSet<VarId>,
}

impl<'a> Transformer for Reifier<'a> {
    fn transform_variable(&mut self, var: VarId) -> Type {
        if self.in_progress.contains(&var) {
            return Type::Variable(var);
        }
        match self.subst.bindings.get(&var) {
            Some(bound) => {
                self.in_progress.insert(var);
                let result = transform(bound, self);
                self.in_progress.remove(&var);
                result
            }
            None if self.keep_variables => Type::Variable(var),
            None => Type::Error,
        }
    }
}

/// Hands out fresh variable identities. Owned by whoever opens new
/// variables (the constraint system); kept separate from `Substitution`
/// itself so cloning a solver fork's substitution map never accidentally
/// resets variable identity (spec §9 "Solver forks").
#[derive(Clone, Debug, Default)]
pub struct VarIdGenerator {
    next: u32,
}

impl VarIdGenerator {
    pub fn new() -> Self {
        VarIdGenerator { next: 0 }
    }

    pub fn fresh(&mut self) -> VarId {
        let id = VarId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{BuiltinType, TupleElement, TupleType};

    #[test]
    fn reify_is_idempotent() {
        let mut gen = VarIdGenerator::new();
        let v0 = gen.fresh();
        let mut subst = Substitution::new();
        subst.bind(v0, Type::Builtin(BuiltinType::Word));

        let ty = Type::Tuple(TupleType {
            elements: vec![TupleElement {
                label: None,
                ty: Type::Variable(v0),
            }],
        });

        let once = subst.reify(&ty, true);
        let twice = subst.reify(&once, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn reify_breaks_cycles_as_fixed_points() {
        let mut gen = VarIdGenerator::new();
        let v0 = gen.fresh();
        let mut subst = Substitution::new();
        // ?0 := (?0,) -- a self-referential binding, as could arise from a
        // buggy or adversarial unification; reify must terminate.
        subst.bind(
            v0,
            Type::Tuple(TupleType {
                elements: vec![TupleElement {
                    label: None,
                    ty: Type::Variable(v0),
                }],
            }),
        );

        let result = subst.reify(&Type::Variable(v0), true);
        // The cycle is left as the open variable at the point of recursion.
        match result {
            Type::Tuple(t) => assert_eq!(t.elements[0].ty, Type::Variable(v0)),
            other => panic!("expected tuple fixed point, got {:?}", other),
        }
    }

    #[test]
    fn unbound_variable_without_keep_becomes_error() {
        let mut gen = VarIdGenerator::new();
        let v0 = gen.fresh();
        let subst = Substitution::new();
        assert_eq!(subst.reify(&Type::Variable(v0), false), Type::Error);
        assert_eq!(subst.reify(&Type::Variable(v0), true), Type::Variable(v0));
    }
}
