//! # Type Table
//!
//! A `ResolutionCapability` backed by the type section of a `SourceManifest`,
//! plus built-in knowledge of the JDK container hierarchy.

use crate::error::{AppError, AppResult};
use crate::frontend::annotations::DocComment;
use crate::frontend::manifest::{DeclKind, SourceManifest, TypeDef};
use crate::frontend::type_ref::{simple_name, TypeRef};
use crate::frontend::{ContainerKind, EnumConstant, FieldInfo, ResolutionCapability, TypeKind};
use std::collections::{HashMap, HashSet};

const LANGUAGE_ROOT: &str = "java.lang.Object";

const JAVA_PRIMITIVES: &[&str] = &[
    "int", "long", "short", "byte", "char", "float", "double", "boolean",
];

#[derive(Debug, Clone)]
struct TypeEntry {
    kind: DeclKind,
    doc: Option<String>,
    type_params: Vec<String>,
    superclass: Option<TypeRef>,
    fields: Vec<FieldInfo>,
    constants: Vec<EnumConstant>,
    container: Option<ContainerKind>,
}

/// In-memory type universe for one source root.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: HashMap<String, TypeEntry>,
    simple_index: HashMap<String, String>,
}

impl TypeTable {
    /// Builds the table from a manifest, parsing every type expression.
    pub fn from_manifest(manifest: &SourceManifest) -> AppResult<Self> {
        let mut table = TypeTable::default();
        for (name, def) in &manifest.types {
            table.insert(name, def)?;
        }
        Ok(table)
    }

    /// Registers one type definition.
    pub fn insert(&mut self, qualified_name: &str, def: &TypeDef) -> AppResult<()> {
        let params = &def.type_params;
        let parse = |expr: &str| {
            TypeRef::parse_with_params(expr, params).map_err(|e| {
                AppError::General(format!("In type '{}': {}", qualified_name, e))
            })
        };

        let mut fields = Vec::with_capacity(def.fields.len());
        for f in &def.fields {
            fields.push(FieldInfo {
                name: f.name.clone(),
                ty: parse(&f.ty)?,
                is_static: f.is_static,
                doc: f.doc.as_deref().and_then(|d| DocComment::parse(d).summary()),
                annotations: f.annotations.clone(),
            });
        }

        let entry = TypeEntry {
            kind: def.kind,
            doc: def.doc.as_deref().and_then(|d| DocComment::parse(d).summary()),
            type_params: def.type_params.clone(),
            superclass: def.superclass.as_deref().map(parse).transpose()?,
            fields,
            constants: def
                .constants
                .iter()
                .map(|c| EnumConstant {
                    name: c.name.clone(),
                    doc: c.doc.as_deref().and_then(|d| DocComment::parse(d).summary()),
                })
                .collect(),
            container: def.container,
        };

        self.simple_index
            .entry(simple_name(qualified_name).to_string())
            .or_insert_with(|| qualified_name.to_string());
        self.types.insert(qualified_name.to_string(), entry);
        Ok(())
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are declared.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn entry(&self, ty: &TypeRef) -> Option<&TypeEntry> {
        let name = ty.name()?;
        self.types.get(name).or_else(|| {
            self.simple_index
                .get(name)
                .and_then(|qualified| self.types.get(qualified))
        })
    }
}

/// Container capability of JDK types the manifest does not declare.
fn builtin_container(name: &str) -> ContainerKind {
    let name = name
        .strip_prefix("java.util.concurrent.")
        .or_else(|| name.strip_prefix("java.util."))
        .or_else(|| name.strip_prefix("java.lang."))
        .unwrap_or(name);
    match name {
        "Set" | "HashSet" | "LinkedHashSet" | "TreeSet" | "SortedSet" | "NavigableSet"
        | "EnumSet" | "CopyOnWriteArraySet" | "ConcurrentSkipListSet" => ContainerKind::Set,
        "Collection" | "Iterable" | "List" | "ArrayList" | "LinkedList" | "Vector"
        | "Stack" | "Queue" | "Deque" | "ArrayDeque" | "PriorityQueue"
        | "CopyOnWriteArrayList" => ContainerKind::Collection,
        "Map" | "HashMap" | "LinkedHashMap" | "TreeMap" | "SortedMap" | "NavigableMap"
        | "Hashtable" | "ConcurrentHashMap" | "ConcurrentMap" | "EnumMap" => ContainerKind::Map,
        _ => ContainerKind::None,
    }
}

impl ResolutionCapability for TypeTable {
    fn kind(&self, ty: &TypeRef) -> TypeKind {
        match ty {
            TypeRef::Array(_) => TypeKind::Array,
            TypeRef::Var(_) => TypeKind::TypeVariable,
            TypeRef::Named { name, .. } => match self.entry(ty) {
                Some(entry) if entry.kind == DeclKind::Enum => TypeKind::Enum,
                Some(_) => TypeKind::Reference,
                None if JAVA_PRIMITIVES.contains(&name.as_str()) => TypeKind::Primitive,
                None if builtin_container(name) != ContainerKind::None => TypeKind::Reference,
                None => TypeKind::Unknown,
            },
        }
    }

    fn canonical_name(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named { name, args } if !self.types.contains_key(name) => {
                match self.simple_index.get(name) {
                    Some(qualified) => TypeRef::generic(qualified.clone(), args.clone()).to_string(),
                    None => ty.to_string(),
                }
            }
            _ => ty.to_string(),
        }
    }

    fn type_doc(&self, ty: &TypeRef) -> Option<String> {
        self.entry(ty).and_then(|e| e.doc.clone())
    }

    fn declared_fields(&self, ty: &TypeRef) -> Vec<FieldInfo> {
        self.entry(ty).map(|e| e.fields.clone()).unwrap_or_default()
    }

    fn class_ancestors(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::new();
        let mut current = ty.clone();

        while let Some(entry) = self.entry(&current) {
            let Some(parent) = entry.superclass.as_ref() else {
                break;
            };
            let bindings = bind(&entry.type_params, current.args());
            let parent = parent.substitute(&bindings);
            let Some(name) = parent.name() else {
                break;
            };
            if name == LANGUAGE_ROOT || !seen.insert(name.to_string()) {
                break;
            }
            ancestors.push(parent.clone());
            current = parent;
        }
        ancestors
    }

    fn generic_bindings(&self, ty: &TypeRef) -> Vec<(String, TypeRef)> {
        match self.entry(ty) {
            Some(entry) => bind(&entry.type_params, ty.args()),
            None => Vec::new(),
        }
    }

    fn enum_constants(&self, ty: &TypeRef) -> Vec<EnumConstant> {
        self.entry(ty).map(|e| e.constants.clone()).unwrap_or_default()
    }

    fn container_kind(&self, ty: &TypeRef) -> ContainerKind {
        match self.entry(ty) {
            Some(entry) => entry.container.unwrap_or_default(),
            None => ty.name().map(builtin_container).unwrap_or_default(),
        }
    }
}

fn bind(params: &[String], args: &[TypeRef]) -> Vec<(String, TypeRef)> {
    params
        .iter()
        .zip(args.iter())
        .map(|(p, a)| (p.clone(), a.clone()))
        .collect()
}
