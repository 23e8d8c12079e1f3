//! Declarations, scopes, and the other small identity types the typed
//! program hangs queries off of (spec §4.3).

use std::fmt;

use marrow_ty::{DeclId, Type};

/// Opaque source-location handle. The AST/parser (an external collaborator,
/// spec §1) owns what a site actually points at; the core only ever
/// threads it through for diagnostics.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Site(pub u32);

/// A lexical scope, as handed out by the name-lookup front end.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Scope(pub u32);

/// Identity of a name expression in the AST, used as the key of the binding
/// map (spec §3 "Solution").
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ExprId(pub u32);

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DeclKind {
    Product,
    Trait,
    Method,
    Subscript,
    Initializer,
    Deinitializer,
    MoveOperator,
    Function,
    TypeAlias,
}

#[derive(Clone, Debug)]
pub struct Declaration {
    pub id: DeclId,
    pub name: String,
    pub kind: DeclKind,
    /// Parameter keys this declaration is generic over, in declaration
    /// order (matches `BoundGenericType::arguments` keys).
    pub generic_parameters: Vec<String>,
    /// The declared type of this declaration, pre-instantiation: for a
    /// method this is a `Type::Method`/`Type::Lambda`, for a struct a
    /// `Type::Metatype(Type::Product(..))`, etc.
    pub ty: Type,
    /// True for a trait's abstract requirement (no body) as opposed to a
    /// concrete default or witnessing implementation (spec §4.2 "Member",
    /// §8 scenario 4).
    pub is_requirement: bool,
    /// True for the distinguished module entry point declaration (spec
    /// §4.3 `isModuleEntry`).
    pub is_module_entry: bool,
    pub site: Site,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
