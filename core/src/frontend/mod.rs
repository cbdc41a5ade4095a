//! # Frontend Contract
//!
//! The language frontend parses source files and answers type questions.
//! This module defines what the rest of the crate asks of it
//! (`ResolutionCapability`) and ships a manifest-backed implementation.
//!
//! - **type_ref**: Parsed type expressions.
//! - **annotations**: Annotation values and doc comments.
//! - **manifest**: The serialized per-source-root declaration dump.
//! - **table**: `TypeTable`, the in-memory capability over a manifest.

pub mod annotations;
pub mod manifest;
pub mod table;
pub mod type_ref;

pub use annotations::{Annotation, AnnotationValue, DocComment, DocTag};
pub use manifest::{ClassDecl, MethodDecl, ParamDecl, SourceManifest, TypeDef};
pub use table::TypeTable;
pub use type_ref::TypeRef;

use serde::{Deserialize, Serialize};

/// How the frontend classifies a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A language primitive (`int`, `boolean`).
    Primitive,
    /// An array type.
    Array,
    /// A declared class or interface.
    Reference,
    /// A declared enum.
    Enum,
    /// An unbound generic type variable.
    TypeVariable,
    /// Anything the frontend cannot resolve.
    Unknown,
}

/// Well-known container a type is assignable to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// `java.util.Set` and subtypes.
    Set,
    /// `java.util.Collection` / `Iterable` and subtypes.
    Collection,
    /// `java.util.Map` and subtypes.
    Map,
    /// Not a container.
    #[default]
    None,
}

/// A resolved field of a declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Declared name.
    pub name: String,
    /// Declared type; type variables of the owner stay as `TypeRef::Var`.
    pub ty: TypeRef,
    /// Whether the field is static.
    pub is_static: bool,
    /// Doc comment description.
    pub doc: Option<String>,
    /// Field annotations.
    pub annotations: Vec<Annotation>,
}

/// An enum constant with its documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    /// Constant name.
    pub name: String,
    /// Doc comment description.
    pub doc: Option<String>,
}

/// The questions the type resolver asks about a type reference.
///
/// Implementations must be shareable across threads: the frontend parses
/// source files in parallel and resolves types while doing so.
pub trait ResolutionCapability: Send + Sync {
    /// Classifies the reference.
    fn kind(&self, ty: &TypeRef) -> TypeKind;

    /// Canonical qualified name used for primitive lookup and self-reference checks.
    fn canonical_name(&self, ty: &TypeRef) -> String {
        ty.to_string()
    }

    /// Doc comment description of the declared type.
    fn type_doc(&self, ty: &TypeRef) -> Option<String>;

    /// Declared fields (static ones included; callers filter).
    fn declared_fields(&self, ty: &TypeRef) -> Vec<FieldInfo>;

    /// Class ancestors nearest first, with generic arguments already bound
    /// from `ty`. Excludes the language root type.
    fn class_ancestors(&self, ty: &TypeRef) -> Vec<TypeRef>;

    /// Declared generic parameter names paired with the arguments of `ty`.
    fn generic_bindings(&self, ty: &TypeRef) -> Vec<(String, TypeRef)>;

    /// Enum constants in declaration order.
    fn enum_constants(&self, ty: &TypeRef) -> Vec<EnumConstant>;

    /// The well-known container `ty` is assignable to.
    fn container_kind(&self, ty: &TypeRef) -> ContainerKind;
}
