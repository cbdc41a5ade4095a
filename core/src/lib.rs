#![deny(missing_docs)]

//! # Apigraph Core
//!
//! Extracts the HTTP surface of annotated source declarations into a Swagger
//! 2.0 document, converts it to OpenAPI 3.0.0, and serves mock examples from
//! it.

/// Shared error types.
pub mod error;

/// Generator configuration.
pub mod config;

/// Declarations delivered by the language frontend.
pub mod frontend;

/// Schema model, registry and type resolution.
pub mod schema;

/// Route classification per annotation dialect.
pub mod classify;

/// Source dialect document model and assembly.
pub mod document;

/// Multi-project generation runs.
pub mod generate;

/// Source to target dialect conversion.
pub mod convert;

/// File output in both dialects.
pub mod export;

/// Example values for schemas.
pub mod example;

/// Path template matching.
pub mod routing;

/// Time-bounded document cache.
pub mod cache;

/// Mock responses.
pub mod mock;

/// Proxy target and header policy.
pub mod proxy;

pub use cache::{load_from_dir, DocumentCache};
pub use classify::{default_classifiers, OperationDraft, RouteClassifier};
pub use config::{DocumentSettings, GeneratorConfig};
pub use convert::to_openapi;
pub use document::{ApiDocument, DocumentAssembler, HttpVerb};
pub use error::{AppError, AppResult};
pub use example::ExampleMaterializer;
pub use export::{export_all, export_project, ExportFormat};
pub use frontend::{SourceManifest, TypeTable};
pub use generate::GenerationRun;
pub use mock::{mock_reply, MockReply};
pub use routing::{ant_match, RouteMatch, RouteMatcher};
pub use schema::{Schema, SchemaRegistry};
