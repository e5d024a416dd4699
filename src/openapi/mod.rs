//! OpenAPI object model, schema resolution and operation assembly

pub mod document;
pub mod lister;
pub mod operation;
pub mod resolver;
pub mod types;

pub use document::{is_contained, strip_schema_head, ComponentRef, OperationRef};
pub use operation::{build_operation_view, resolve_response, OperationView, ResolvedResponse};
pub use resolver::{OriginatedProperty, OriginatedPropertyList, ResolveError, SchemaResolver, TouchedSet};
pub use types::{HttpMethod, OpenApiDocument, Operation, Property, Response, Schema};
