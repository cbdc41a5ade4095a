//! # Type Resolver
//!
//! Turns a `TypeRef` into a `Schema`, interning named objects and enums in
//! the `SchemaRegistry` of the enclosing `ResolverContext`.
//!
//! Resolution order:
//! 1. Primitive table (exact canonical name).
//! 2. Arrays (named components become references).
//! 3. Containers by capability (`Set`, `Collection`, `Map`).
//! 4. Enums.
//! 5. Declared objects: placeholder, ancestor flattening, fields.
//!
//! Anything else falls back to an untyped object.

use crate::config::GeneratorConfig;
use crate::frontend::annotations::find_annotation;
use crate::frontend::{ContainerKind, FieldInfo, ResolutionCapability, TypeKind, TypeRef};
use crate::schema::model::{EnumSchema, ObjectSchema, Schema};
use crate::schema::models;
use crate::schema::primitives;
use crate::schema::registry::{Claim, SchemaRegistry};
use dashmap::DashSet;
use indexmap::IndexMap;

const LANGUAGE_ROOT: &str = "java.lang.Object";

const RENAME_ANNOTATIONS: &[&str] = &["JsonProperty", "SerializedName", "JSONField"];
const NOT_NULL_ANNOTATIONS: &[&str] = &["NotNull", "NotBlank", "NotEmpty"];

/// Per-source-root resolution state.
///
/// Owns the schema registry and the visited (descendant, ancestor) pairs.
/// One context is created for each source root and dropped with it.
#[derive(Debug)]
pub struct ResolverContext {
    registry: SchemaRegistry,
    visited_ancestors: DashSet<(String, String)>,
    platform_prefixes: Vec<String>,
}

impl Default for ResolverContext {
    fn default() -> Self {
        Self::new(&GeneratorConfig::default())
    }
}

impl ResolverContext {
    /// Creates an empty context.
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            visited_ancestors: DashSet::new(),
            platform_prefixes: config.platform_prefixes.clone(),
        }
    }

    /// The registry of named schemas.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Registry entries in definition form, sorted by name.
    pub fn definitions(&self) -> IndexMap<String, Schema> {
        models::definitions(&self.registry.snapshot())
    }

    fn is_platform(&self, qualified_name: &str) -> bool {
        qualified_name == LANGUAGE_ROOT
            || self
                .platform_prefixes
                .iter()
                .any(|p| qualified_name.starts_with(p.as_str()))
    }
}

/// Resolves type references against one capability and context.
#[derive(Clone, Copy)]
pub struct TypeResolver<'a> {
    capability: &'a dyn ResolutionCapability,
    context: &'a ResolverContext,
}

impl<'a> TypeResolver<'a> {
    /// Binds a capability to a context.
    pub fn new(capability: &'a dyn ResolutionCapability, context: &'a ResolverContext) -> Self {
        Self {
            capability,
            context,
        }
    }

    /// The bound context.
    pub fn context(&self) -> &'a ResolverContext {
        self.context
    }

    /// Resolves a type reference. Never fails: unclassifiable types become
    /// an untyped object.
    pub fn resolve(&self, ty: &TypeRef) -> Schema {
        let canonical = self.capability.canonical_name(ty);
        if canonical == LANGUAGE_ROOT {
            return Schema::untyped();
        }
        if let Some(schema) = primitives::lookup(&canonical) {
            return schema;
        }

        let kind = self.capability.kind(ty);
        if matches!(kind, TypeKind::Primitive | TypeKind::Unknown) {
            if let Some(schema) = primitives::lookup_simple(&ty.simple_name()) {
                return schema;
            }
        }

        match (kind, ty) {
            (TypeKind::Array, TypeRef::Array(component)) => {
                Schema::array(self.resolve(component).as_use_site())
            }
            (TypeKind::Enum, _) => self.resolve_enum(ty),
            (TypeKind::Reference, _) => match self.capability.container_kind(ty) {
                ContainerKind::None => self.resolve_object(ty),
                container => self.resolve_container(ty, container),
            },
            (TypeKind::TypeVariable, _) => {
                tracing::debug!(ty = %ty, "unbound type variable");
                Schema::untyped()
            }
            _ => {
                tracing::warn!(ty = %ty, "unresolvable type, using untyped object");
                Schema::untyped()
            }
        }
    }

    fn resolve_container(&self, ty: &TypeRef, container: ContainerKind) -> Schema {
        let arg = |i: usize| {
            ty.args()
                .get(i)
                .map(|a| self.resolve(a).as_use_site())
                .unwrap_or_else(Schema::untyped)
        };
        match container {
            ContainerKind::Set => Schema::Array {
                items: Box::new(arg(0)),
                unique_items: true,
                description: None,
            },
            ContainerKind::Map => Schema::map(arg(1)),
            _ => Schema::array(arg(0)),
        }
    }

    fn resolve_enum(&self, ty: &TypeRef) -> Schema {
        let constants = self.capability.enum_constants(ty);
        let description = constants
            .iter()
            .filter_map(|c| c.doc.as_ref().map(|d| format!("{}:{}", c.name, d)))
            .collect::<Vec<_>>()
            .join("\t");
        let name = ty.simple_name();
        let schema = Schema::Enum(EnumSchema {
            name: Some(name.clone()),
            values: constants.into_iter().map(|c| c.name).collect(),
            description: (!description.is_empty()).then_some(description),
        });
        (*self.context.registry.register(&name, schema)).clone()
    }

    fn resolve_object(&self, ty: &TypeRef) -> Schema {
        let name = self.mangled_name(ty);
        match self.context.registry.claim(&name) {
            Claim::Ready(existing) => return (*existing).clone(),
            Claim::InProgress => return Schema::reference(name),
            Claim::Claimed => {}
        }

        let mut object = ObjectSchema {
            name: Some(name.clone()),
            description: self.capability.type_doc(ty),
            ..Default::default()
        };
        self.merge_ancestors(ty, &name, &mut object);
        self.add_fields(ty, &name, &mut object);

        (*self.context.registry.complete(&name, Schema::Object(object))).clone()
    }

    /// Ancestors farthest first, so nearer declarations overwrite.
    fn merge_ancestors(&self, ty: &TypeRef, descendant: &str, object: &mut ObjectSchema) {
        for ancestor in self.capability.class_ancestors(ty).iter().rev() {
            let qualified = ancestor.name().unwrap_or_default();
            if self.context.is_platform(qualified) {
                continue;
            }
            let pair = (
                descendant.to_string(),
                self.capability.canonical_name(ancestor),
            );
            if !self.context.visited_ancestors.insert(pair) {
                continue;
            }

            match self.resolve(ancestor) {
                Schema::Object(parent) => {
                    for (key, value) in parent.properties {
                        object.properties.insert(key, value);
                    }
                    object.required.extend(parent.required);
                }
                // Still being built further up the stack.
                _ => {
                    let ancestor_name = self.mangled_name(ancestor);
                    self.add_fields(ancestor, &ancestor_name, object);
                }
            }
        }
    }

    fn add_fields(&self, owner: &TypeRef, owner_name: &str, object: &mut ObjectSchema) {
        let bindings = self.capability.generic_bindings(owner);
        let owner_canonical = self.capability.canonical_name(owner);

        for field in self.capability.declared_fields(owner) {
            if field.is_static {
                continue;
            }
            let ty = field.ty.substitute(&bindings);
            let mut schema = if self.capability.canonical_name(&ty) == owner_canonical {
                Schema::reference(owner_name)
            } else {
                self.resolve(&ty).as_use_site()
            };
            if field.doc.is_some() {
                schema.set_description(field.doc.clone());
            }

            let (name, required) = field_binding(&field);
            object.properties.insert(name.clone(), schema);
            if required {
                object.required.insert(name);
            } else {
                object.required.shift_remove(&name);
            }
        }
    }

    /// Registry name: simple name plus resolved generic argument names,
    /// `Page«User»`, `Result«Page«User»,Error»`.
    fn mangled_name(&self, ty: &TypeRef) -> String {
        let base = ty.simple_name();
        let args: Vec<String> = ty
            .args()
            .iter()
            .filter(|a| !matches!(a, TypeRef::Var(_)))
            .filter(|a| self.capability.canonical_name(a) != LANGUAGE_ROOT)
            .map(|a| match self.resolve(a) {
                Schema::Reference { name, .. } => name,
                schema => schema.name().map(str::to_string).unwrap_or_else(|| label(a)),
            })
            .collect();
        if args.is_empty() {
            base
        } else {
            format!("{}«{}»", base, args.join(","))
        }
    }
}

fn label(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Named { args, .. } if !args.is_empty() => format!(
            "{}«{}»",
            ty.simple_name(),
            args.iter().map(label).collect::<Vec<_>>().join(",")
        ),
        _ => ty.simple_name(),
    }
}

/// External property name and required flag of a field.
fn field_binding(field: &FieldInfo) -> (String, bool) {
    let mut name = field.name.clone();
    let mut required = false;
    for key in RENAME_ANNOTATIONS {
        if let Some(ann) = find_annotation(&field.annotations, key) {
            if let Some(renamed) = ann.first_string(&["value", "name"]) {
                name = renamed;
            }
            if ann.attr("required").and_then(|v| v.as_bool()) == Some(true) {
                required = true;
            }
        }
    }
    if NOT_NULL_ANNOTATIONS
        .iter()
        .any(|n| find_annotation(&field.annotations, n).is_some())
    {
        required = true;
    }
    (name, required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{SourceManifest, TypeTable};
    use crate::schema::model::{PrimitiveSchema, PrimitiveType};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const TYPES: &str = r#"
types:
  com.acme.User:
    doc: "A registered user"
    fields:
      - {name: id, type: long}
      - name: userName
        type: String
        doc: "/** Login name */"
        annotations: [{name: JsonProperty, attributes: {value: user_name, required: true}}]
      - {name: email, type: String, annotations: [{name: NotNull}]}
      - {name: role, type: com.acme.Role}
      - {name: COUNT, type: int, static: true}
  com.acme.Pet:
    fields:
      - {name: name, type: String}
  com.acme.Role:
    kind: enum
    constants:
      - {name: ADMIN, doc: "full access"}
      - {name: GUEST, doc: "read only"}
  com.acme.Page:
    type_params: [T]
    fields:
      - {name: items, type: "java.util.List<T>"}
      - {name: total, type: long}
  com.acme.Node:
    fields:
      - {name: value, type: String}
      - {name: next, type: com.acme.Node}
      - {name: children, type: "java.util.List<com.acme.Node>"}
  com.acme.Author:
    fields:
      - {name: books, type: "java.util.List<com.acme.Book>"}
  com.acme.Book:
    fields:
      - {name: author, type: com.acme.Author}
  com.acme.Base:
    fields:
      - {name: x, type: String}
      - {name: created, type: java.time.LocalDateTime}
  com.acme.Derived:
    superclass: com.acme.Base
    fields:
      - {name: y, type: int}
  com.acme.Override:
    superclass: com.acme.Base
    fields:
      - {name: x, type: Integer}
  com.acme.Failure:
    superclass: java.lang.RuntimeException
    fields:
      - {name: code, type: int}
  com.acme.Bag:
    fields:
      - {name: tags, type: "java.util.Set<String>"}
      - {name: byId, type: "java.util.Map<String, com.acme.Pet>"}
      - {name: raw, type: java.util.List}
      - {name: pets, type: "com.acme.Pet[]"}
      - {name: data, type: "byte[]"}
      - {name: extra, type: org.thirdparty.Opaque}
"#;

    fn table() -> TypeTable {
        TypeTable::from_manifest(&SourceManifest::from_yaml(TYPES).unwrap()).unwrap()
    }

    fn object(schema: Schema) -> ObjectSchema {
        match schema {
            Schema::Object(o) => o,
            other => panic!("expected object, got {:?}", other),
        }
    }

    fn int32() -> Schema {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveType::Integer).format("int32"))
    }

    #[test]
    fn test_fields_renames_and_required() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let user = object(resolver.resolve(&TypeRef::named("com.acme.User")));
        assert_eq!(user.name.as_deref(), Some("User"));
        assert_eq!(user.description.as_deref(), Some("A registered user"));
        let keys: Vec<_> = user.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["id", "user_name", "email", "role"]);
        assert_eq!(
            user.properties["user_name"].description(),
            Some("Login name")
        );
        assert!(user.required.contains("user_name"));
        assert!(user.required.contains("email"));
        assert!(!user.required.contains("id"));
    }

    #[test]
    fn test_enum_values_and_description() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let Schema::Enum(role) = resolver.resolve(&TypeRef::named("com.acme.Role")) else {
            panic!("expected enum");
        };
        assert_eq!(role.values, vec!["ADMIN", "GUEST"]);
        assert_eq!(
            role.description.as_deref(),
            Some("ADMIN:full access\tGUEST:read only")
        );
        assert!(ctx.registry().get("Role").is_some());
    }

    #[test]
    fn test_interning_is_idempotent() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let first = resolver.resolve(&TypeRef::named("com.acme.User"));
        let entry = ctx.registry().get("User").unwrap();
        let second = resolver.resolve(&TypeRef::named("com.acme.User"));
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&entry, &ctx.registry().get("User").unwrap()));
    }

    #[test]
    fn test_generic_instantiations_intern_separately() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let users = resolver.resolve(&TypeRef::parse("com.acme.Page<com.acme.User>").unwrap());
        let pets = resolver.resolve(&TypeRef::parse("com.acme.Page<com.acme.Pet>").unwrap());
        assert_eq!(users.name(), Some("Page«User»"));
        assert_eq!(pets.name(), Some("Page«Pet»"));

        let users = object(users);
        assert_eq!(
            users.properties["items"],
            Schema::array(Schema::reference("User"))
        );
        assert!(ctx.registry().get("Page«User»").is_some());
        assert!(ctx.registry().get("Page«Pet»").is_some());
    }

    #[test]
    fn test_primitive_generic_args_are_mangled_by_simple_name() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let page = resolver.resolve(&TypeRef::parse("com.acme.Page<java.lang.Long>").unwrap());
        assert_eq!(page.name(), Some("Page«Long»"));
    }

    #[test]
    fn test_direct_self_reference() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let node = object(resolver.resolve(&TypeRef::named("com.acme.Node")));
        assert_eq!(node.properties["next"], Schema::reference("Node"));
        assert_eq!(
            node.properties["children"],
            Schema::array(Schema::reference("Node"))
        );
    }

    #[test]
    fn test_transitive_self_reference() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let author = object(resolver.resolve(&TypeRef::named("com.acme.Author")));
        assert_eq!(
            author.properties["books"],
            Schema::array(Schema::reference("Book"))
        );
        let book = object((*ctx.registry().get("Book").unwrap()).clone());
        assert_eq!(book.properties["author"], Schema::reference("Author"));
    }

    #[test]
    fn test_ancestor_merge_subclass_wins() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let derived = object(resolver.resolve(&TypeRef::named("com.acme.Derived")));
        let keys: Vec<_> = derived.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "created", "y"]);

        let overridden = object(resolver.resolve(&TypeRef::named("com.acme.Override")));
        assert_eq!(overridden.properties["x"], int32());
        assert_eq!(overridden.properties.len(), 2);
    }

    #[test]
    fn test_platform_ancestors_are_skipped() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let failure = object(resolver.resolve(&TypeRef::named("com.acme.Failure")));
        let keys: Vec<_> = failure.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["code"]);
    }

    #[test]
    fn test_containers_arrays_and_fallbacks() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);

        let bag = object(resolver.resolve(&TypeRef::named("com.acme.Bag")));
        assert!(matches!(
            &bag.properties["tags"],
            Schema::Array { unique_items: true, items, .. } if **items == Schema::string()
        ));
        assert_eq!(bag.properties["byId"], Schema::map(Schema::reference("Pet")));
        assert_eq!(bag.properties["raw"], Schema::array(Schema::untyped()));
        assert_eq!(bag.properties["pets"], Schema::array(Schema::reference("Pet")));
        assert!(matches!(
            &bag.properties["data"],
            Schema::Primitive(p) if p.format.as_deref() == Some("byte")
        ));
        assert_eq!(bag.properties["extra"], Schema::untyped());
    }

    #[test]
    fn test_contexts_are_isolated() {
        let table = table();
        let a = ResolverContext::default();
        let b = ResolverContext::default();
        TypeResolver::new(&table, &a).resolve(&TypeRef::named("com.acme.Pet"));
        assert!(a.registry().get("Pet").is_some());
        assert!(b.registry().is_empty());
    }

    #[test]
    fn test_concurrent_resolution_agrees_on_one_entry() {
        let table = table();
        let ctx = ResolverContext::default();
        let resolver = TypeResolver::new(&table, &ctx);
        let ty = TypeRef::parse("com.acme.Page<com.acme.User>").unwrap();

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    resolver.resolve(&ty);
                });
            }
        });

        let entry = ctx.registry().get("Page«User»").unwrap();
        let again = resolver.resolve(&ty);
        assert_eq!(*entry, again);
        assert!(Arc::ptr_eq(&entry, &ctx.registry().get("Page«User»").unwrap()));
    }

    #[test]
    fn test_definitions_replace_nested_objects() {
        let table = table();
        let ctx = ResolverContext::default();
        TypeResolver::new(&table, &ctx).resolve(&TypeRef::named("com.acme.Author"));
        let defs = ctx.definitions();
        let names: Vec<_> = defs.keys().cloned().collect();
        assert_eq!(names, vec!["Author", "Book"]);
    }
}
