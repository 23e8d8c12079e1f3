//! Conformance decomposition (spec §4.2 "Conformance(model, concept)").

use marrow_program::TypedProgram;
use marrow_ty::{BuiltinType, TraitId, Type};

use crate::error::ErrorKind;
use crate::goal::GoalKind;

pub enum Decomposition {
    Success,
    Postpone,
    All(Vec<GoalKind>),
    Failure(ErrorKind),
}

pub fn decompose(program: &TypedProgram, model: &Type, concept: TraitId) -> Decomposition {
    if matches!(model, Type::Variable(_)) {
        return Decomposition::Postpone;
    }

    if let Some(decl) = nominal_decl(model) {
        if program.has_explicit_conformance(decl, concept) {
            return Decomposition::Success;
        }
    }

    if program.is_movable_trait(concept) {
        return decompose_movable(model, concept);
    }

    if program.is_foreign_convertible_trait(concept) {
        return match model {
            Type::Builtin(_) => Decomposition::Success,
            _ => Decomposition::Failure(ErrorKind::ConformanceFailure {
                model: model.clone(),
                concept,
            }),
        };
    }

    Decomposition::Failure(ErrorKind::ConformanceFailure {
        model: model.clone(),
        concept,
    })
}

fn decompose_movable(model: &Type, concept: TraitId) -> Decomposition {
    match model {
        Type::Builtin(b) => {
            // All built-ins are trivially movable except `module`, which
            // never denotes a value.
            if matches!(b, BuiltinType::Module) {
                Decomposition::Failure(ErrorKind::ConformanceFailure {
                    model: model.clone(),
                    concept,
                })
            } else {
                Decomposition::Success
            }
        }
        Type::Tuple(t) if t.elements.is_empty() => Decomposition::Success,
        Type::Tuple(t) => Decomposition::All(
            t.elements
                .iter()
                .map(|e| GoalKind::Conformance(e.ty.clone(), concept))
                .collect(),
        ),
        Type::Union(u) if u.members.is_empty() => Decomposition::Success,
        Type::Union(u) => Decomposition::All(
            u.members
                .iter()
                .map(|m| GoalKind::Conformance(m.clone(), concept))
                .collect(),
        ),
        _ => Decomposition::Failure(ErrorKind::ConformanceFailure {
            model: model.clone(),
            concept,
        }),
    }
}

fn nominal_decl(ty: &Type) -> Option<marrow_ty::DeclId> {
    match ty {
        Type::Product(p) => Some(p.decl),
        Type::BoundGeneric(b) => nominal_decl(&b.base),
        _ => None,
    }
}
