//! # Schema Graph
//!
//! - **model**: The `Schema` node and its wire form.
//! - **primitives**: Well-known scalar types.
//! - **registry**: Concurrent insert-if-absent storage of named schemas.
//! - **resolver**: `TypeRef` to `Schema` resolution.
//! - **models**: Definition form of registry entries.

pub mod model;
pub mod models;
pub mod primitives;
pub mod registry;
pub mod resolver;

pub use model::{EnumSchema, ObjectSchema, PrimitiveSchema, PrimitiveType, Schema};
pub use registry::SchemaRegistry;
pub use resolver::{ResolverContext, TypeResolver};
