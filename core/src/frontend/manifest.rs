//! # Declaration Manifest
//!
//! The serialized form a language frontend emits for one source root:
//! the type universe (fields, ancestry, generics, enum constants) and the
//! annotated class declarations to classify.

use crate::error::{AppError, AppResult};
use crate::frontend::annotations::{find_annotation, Annotation, DocComment};
use crate::frontend::ContainerKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    /// A class (or record).
    #[default]
    Class,
    /// An interface.
    Interface,
    /// An enum.
    Enum,
}

/// A field declared on a type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDef {
    /// Declared field name.
    pub name: String,
    /// Type expression (`java.util.List<T>`).
    #[serde(rename = "type")]
    pub ty: String,
    /// Static fields never become properties.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Raw doc comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Field annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// An enum constant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstantDef {
    /// Constant name.
    pub name: String,
    /// Raw doc comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// A type known to the frontend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeDef {
    /// Class, interface or enum.
    #[serde(default)]
    pub kind: DeclKind,
    /// Raw doc comment on the type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Declared generic parameters in order (`["K", "V"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    /// Direct superclass expression, may mention `type_params`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    /// Implemented interfaces (informational).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    /// Declared fields in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
    /// Enum constants in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<ConstantDef>,
    /// Container capability when the type is assignable to a well-known container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerKind>,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamDecl {
    /// Declared parameter name.
    pub name: String,
    /// Type expression.
    #[serde(rename = "type")]
    pub ty: String,
    /// Parameter annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Raw doc comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Method annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    /// Return type expression, `None` (or `void`) for no body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Parameters in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParamDecl>,
}

impl MethodDecl {
    /// Finds an annotation by simple name.
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }

    /// Parsed doc comment (empty when absent).
    pub fn doc_comment(&self) -> DocComment {
        self.doc.as_deref().map(DocComment::parse).unwrap_or_default()
    }
}

/// An annotated class or interface declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Simple class name.
    pub name: String,
    /// Fully qualified name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    /// Raw doc comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Class annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    /// Declared methods in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDecl>,
}

impl ClassDecl {
    /// Finds an annotation by simple name.
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }

    /// Parsed doc comment (empty when absent).
    pub fn doc_comment(&self) -> DocComment {
        self.doc.as_deref().map(DocComment::parse).unwrap_or_default()
    }
}

/// Everything the frontend reports for one source root.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceManifest {
    /// Project name; defaults to the manifest file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Type universe keyed by qualified name.
    #[serde(default)]
    pub types: IndexMap<String, TypeDef>,
    /// Annotated declarations to classify.
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

impl SourceManifest {
    /// Parses a manifest from YAML (JSON is valid YAML).
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::General(format!("Failed to parse source manifest: {}", e)))
    }

    /// Reads a manifest file; the project name falls back to the file stem.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_yaml(&content)?;
        if manifest.project.is_none() {
            manifest.project = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned());
        }
        Ok(manifest)
    }

    /// Appends another manifest of the same source root. Types already
    /// present keep their first definition.
    pub fn merge(&mut self, other: SourceManifest) {
        for (name, def) in other.types {
            self.types.entry(name).or_insert(def);
        }
        self.classes.extend(other.classes);
    }
}
