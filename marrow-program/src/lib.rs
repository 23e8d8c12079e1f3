//! The typed program: declarations, scopes, canonical forms, and the
//! name-resolution contract the constraint system and IR consume (spec
//! §4.3). Depends only on `marrow-ty`, never on `marrow-solve` or
//! `marrow-ir` — the inference engine and the IR passes are both
//! *consumers* of this crate's query surface, not the other way around
//! (spec §2).

pub mod decl;
pub mod diagnostic;
pub mod program;
pub mod relations;
pub mod resolve;

pub use decl::{DeclKind, Declaration, ExprId, Scope, Site};
pub use diagnostic::{Diagnostic, DiagnosticSink, Severity};
pub use program::{close_generic, TypedProgram};
pub use relations::Relations;
pub use resolve::{Candidate, NameResolver, Purpose};
