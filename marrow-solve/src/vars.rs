//! Free-variable collection, used to index stale goals by the variables
//! they mention (spec §9 "index stale goals by the variables they
//! mention", avoiding the quadratic cost of re-scanning every stale goal on
//! every assignment).

use marrow_ty::{transform, Transformer, Type, VarId};

struct Collect {
    found: Vec<VarId>,
}

impl Transformer for Collect {
    fn transform_variable(&mut self, var: VarId) -> Type {
        self.found.push(var);
        Type::Variable(var)
    }
}

pub fn free_variables(ty: &Type) -> Vec<VarId> {
    let mut collect = Collect { found: Vec::new() };
    let _ = transform(ty, &mut collect);
    collect.found
}
