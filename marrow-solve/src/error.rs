//! Error kinds (spec §7) and the `Fallible` result alias used throughout the
//! solver, modeled directly on the teacher's `chalk_solve::solve::Fallible`
//! and its `NoSolution` marker — here we carry an actual kind since the
//! spec's error taxonomy is part of the observable contract (diagnostics
//! must name *which* subtype failure occurred, for instance).

use marrow_ty::Type;

/// `Result` alias for the decomposition helpers (`unify`, `subtype`) that
/// can fail outright rather than spawn subordinate goals. Unlike the
/// teacher's zero-sized `NoSolution`, the error carries a real `ErrorKind`
/// since the diagnostic payload needs to name which kind of failure
/// occurred, not just that one did.
pub type Fallible<T> = Result<T, ErrorKind>;

/// A structural error kind, independent of where it was raised. The
/// `Diagnostic` a goal's diagnose closure reports is built from one of
/// these plus the site carried on the goal's origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnificationFailure { found: Type, expected: Type },
    ConformanceFailure { model: Type, concept: marrow_ty::TraitId },
    SubtypeFailure(SubtypeFailureKind, Type, Type),
    ParameterPassingFailure { argument: Type, parameter: Type },
    InvalidParameterType(Type),
    NameLookupFailure(NameLookupFailureKind),
    ConditionalBranchesMismatch,
    CalleeNotCallable { arrow: bool, found: Type },
    LabelMismatch { found: Vec<Option<String>>, expected: Vec<Option<String>> },
    TupleIndexOutOfRange { index: usize, len: usize },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SubtypeFailureKind {
    CannotInitializeWith,
    DoesNotMatchPattern,
    NotStrictSubtype,
    NotSubtype,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameLookupFailureKind {
    Undefined(String),
    NoViable(String),
    Ambiguous(String),
}

impl ErrorKind {
    /// Renders the kind the way a diagnose closure would turn it into the
    /// message half of a `Diagnostic`; kept here so every call site produces
    /// consistently worded text instead of ad hoc `format!`s.
    pub fn message(&self) -> String {
        match self {
            ErrorKind::UnificationFailure { found, expected } => {
                format!("cannot unify {:?} with {:?}", found, expected)
            }
            ErrorKind::ConformanceFailure { model, concept } => {
                format!("{:?} does not conform to {:?}", model, concept)
            }
            ErrorKind::SubtypeFailure(kind, l, r) => match kind {
                SubtypeFailureKind::CannotInitializeWith => {
                    format!("cannot initialize {:?} with {:?}", r, l)
                }
                SubtypeFailureKind::DoesNotMatchPattern => {
                    format!("{:?} does not match pattern {:?}", l, r)
                }
                SubtypeFailureKind::NotStrictSubtype => {
                    format!("{:?} is not a strict subtype of {:?}", l, r)
                }
                SubtypeFailureKind::NotSubtype => format!("{:?} is not a subtype of {:?}", l, r),
            },
            ErrorKind::ParameterPassingFailure { argument, parameter } => {
                format!("cannot pass {:?} to parameter of type {:?}", argument, parameter)
            }
            ErrorKind::InvalidParameterType(t) => format!("invalid parameter type {:?}", t),
            ErrorKind::NameLookupFailure(kind) => match kind {
                NameLookupFailureKind::Undefined(name) => format!("undefined name '{}'", name),
                NameLookupFailureKind::NoViable(name) => {
                    format!("no viable candidate for '{}'", name)
                }
                NameLookupFailureKind::Ambiguous(name) => format!("ambiguous use of '{}'", name),
            },
            ErrorKind::ConditionalBranchesMismatch => "conditional branches mismatch".to_string(),
            ErrorKind::CalleeNotCallable { arrow, found } => format!(
                "{:?} is not callable as a {}",
                found,
                if *arrow { "subscript" } else { "function" }
            ),
            ErrorKind::LabelMismatch { found, expected } => format!(
                "incompatible labels: found '{}', expected '{}'",
                render_labels(found),
                render_labels(expected)
            ),
            ErrorKind::TupleIndexOutOfRange { index, len } => {
                format!("tuple index {} out of range (len {})", index, len)
            }
        }
    }
}

fn render_labels(labels: &[Option<String>]) -> String {
    let mut out = String::from("(");
    for label in labels {
        match label {
            Some(l) => out.push_str(&format!("{}:", l)),
            None => out.push_str("_:"),
        }
    }
    out.push(')');
    out
}
