//! The `Type` variant tree (spec §3 "Type") and its immediate satellites.

use std::collections::BTreeMap;
use std::fmt;

/// Identity of an open inference variable. Fresh identities are handed out
/// by whoever owns variable creation (the constraint system); this crate
/// only needs them to be comparable and orderable.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub u32);

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// A reference to a declaration living in the typed program (struct, trait,
/// subscript, whatever). Opaque here; `marrow-program` gives it meaning.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(pub u32);

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

/// A reference to a trait (concept) declaration.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraitId(pub u32);

impl fmt::Debug for TraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trait#{}", self.0)
    }
}

/// A generic parameter, identified by the scope that introduces it and its
/// position within that scope. Skolemized (treated as an opaque constant)
/// once it is in scope; `bound` vs. `skolem` is a matter of where the
/// parameter is being looked at from, not a distinct representation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenericParamId {
    pub scope: u32,
    pub index: u32,
}

impl fmt::Debug for GenericParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{}>", self.scope, self.index)
    }
}

/// Access effect under which a value is observed or moved across a boundary.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum AccessEffect {
    Let,
    Inout,
    Sink,
    Set,
    Yielded,
}

/// Built-in primitive types. `word` is the machine-width integer; `pointer`
/// is an untyped address.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BuiltinType {
    Word,
    Float64,
    Pointer,
    Bool,
    Void,
    Module,
}

/// A labeled element of a tuple.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TupleElement {
    pub label: Option<String>,
    pub ty: Type,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TupleType {
    pub elements: Vec<TupleElement>,
}

/// A union's member set is logically unordered; canonicalization sorts and
/// dedupes it (spec §4.1). We keep the non-canonical `Vec` representation so
/// `canonicalize` has something to do and so insertion order survives until
/// then for diagnostics.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct UnionType {
    pub members: Vec<Type>,
}

/// A labeled parameter in a lambda or method's input list. `ty` is usually a
/// `Type::Parameter` carrying the access effect the callable requires.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CallableParameter {
    pub label: Option<String>,
    pub ty: Type,
    /// Whether this parameter has a default value (affects label matching
    /// during `Call` constraint decomposition, spec §4.2 "Call").
    pub has_default: bool,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LambdaType {
    pub inputs: Vec<CallableParameter>,
    pub environment: Box<Type>,
    pub output: Box<Type>,
    /// True if this is a subscript (yields rather than returns).
    pub is_subscript: bool,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct MethodType {
    pub receiver: Box<Type>,
    pub inputs: Vec<CallableParameter>,
    pub output: Box<Type>,
    pub capabilities: Vec<AccessEffect>,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ParameterType {
    pub effect: AccessEffect,
    pub bare: Box<Type>,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RemoteType {
    pub effect: AccessEffect,
    pub bare: Box<Type>,
}

/// An existential is a type erased behind an interface: a set of traits, a
/// bound generic type used as an interface, or a metatype.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ExistentialInterface {
    Traits(Vec<TraitId>),
    Generic(Box<BoundGenericType>),
    Metatype(Box<Type>),
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ExistentialType {
    pub interface: ExistentialInterface,
}

/// A value-level generic argument (for value generic parameters, e.g. an
/// array's compile-time length). Kept intentionally small.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ConstValue {
    Int(i64),
    Bool(bool),
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum GenericArgument {
    Type(Type),
    Value(ConstValue),
}

/// `base<key: arg, ...>` — a nominal or existential type specialized with a
/// mapping from parameter key to type-or-value argument. We use a `BTreeMap`
/// keyed by parameter name so equality/hash/ordering are well defined without
/// a separate canonicalization step for argument order.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BoundGenericType {
    pub base: Box<Type>,
    pub arguments: BTreeMap<String, GenericArgument>,
}

/// A nominal record type referencing a declaration. Generic instantiation is
/// represented by wrapping a `Product` in a `BoundGeneric`, not by parameters
/// living on `Product` itself.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ProductType {
    pub decl: DeclId,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    /// An open placeholder with a fresh identity; only ever bound by a
    /// `Substitution`, never mutated in place.
    Variable(VarId),
    /// A skolemized or bound generic parameter.
    GenericParameter(GenericParamId),
    Product(ProductType),
    Tuple(TupleType),
    Union(UnionType),
    Lambda(LambdaType),
    Method(MethodType),
    Parameter(ParameterType),
    Remote(RemoteType),
    /// `Type[T]` — the type of `T` itself.
    Metatype(Box<Type>),
    Existential(ExistentialType),
    BoundGeneric(BoundGenericType),
    Builtin(BuiltinType),
    /// Stands in for a type that could not be determined because of a prior
    /// diagnostic. Lets the solver keep going instead of cascading failures.
    Error,
}

impl Type {
    pub fn never() -> Type {
        Type::Union(UnionType { members: vec![] })
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Type::Union(u) if u.members.is_empty())
    }

    pub fn as_variable(&self) -> Option<VarId> {
        match self {
            Type::Variable(v) => Some(*v),
            _ => None,
        }
    }

    /// A type is a "leaf" if it has no structure to decompose further —
    /// builtins, bare products, and generic parameters. Used by the
    /// subtyping rules that special-case unification against leaves
    /// (spec §4.2 "L <= variable").
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Type::Builtin(_) | Type::Product(_) | Type::GenericParameter(_)
        )
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Type::Tuple(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Type::Union(_))
    }

    pub fn is_callable(&self, arrow: bool) -> bool {
        match self {
            Type::Lambda(l) => l.is_subscript != arrow,
            _ => false,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Variable(v) => write!(f, "{:?}", v),
            Type::GenericParameter(g) => write!(f, "{:?}", g),
            Type::Product(p) => write!(f, "{:?}", p),
            Type::Tuple(t) => write!(f, "{:?}", t),
            Type::Union(u) if u.members.is_empty() => write!(f, "Never"),
            Type::Union(u) => write!(f, "{:?}", u),
            Type::Lambda(l) => write!(f, "{:?}", l),
            Type::Method(m) => write!(f, "{:?}", m),
            Type::Parameter(p) => write!(f, "{:?}", p),
            Type::Remote(r) => write!(f, "{:?}", r),
            Type::Metatype(t) => write!(f, "Type[{:?}]", t),
            Type::Existential(e) => write!(f, "{:?}", e),
            Type::BoundGeneric(b) => write!(f, "{:?}", b),
            Type::Builtin(b) => write!(f, "{:?}", b),
            Type::Error => write!(f, "<error>"),
        }
    }
}
