//! # API Document
//!
//! - **model**: The document aggregate and its source dialect wire shape.
//! - **assembler**: Folds operation drafts into a finalized document.

pub mod assembler;
pub mod model;

pub use assembler::DocumentAssembler;
pub use model::{
    ApiDocument, HttpVerb, Info, Operation, ParamLocation, Parameter, PathItem, Response,
    SecurityDefinition, Tag,
};
