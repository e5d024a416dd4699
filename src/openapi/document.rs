//! Loading an OpenAPI document and looking things up in it

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use super::types::{HttpMethod, OpenApiDocument, Operation, Parameter, RequestBody, Response, Schema};

pub const SCHEMA_HEAD: &str = "#/components/schemas/";
pub const RESPONSE_HEAD: &str = "#/components/responses/";
pub const PARAMETER_HEAD: &str = "#/components/parameters/";
pub const REQUEST_BODY_HEAD: &str = "#/components/requestBodies/";

/// A `$ref` string split into component kind and name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRef<'a> {
    Schema(&'a str),
    Response(&'a str),
    Parameter(&'a str),
    RequestBody(&'a str),
}

impl<'a> ComponentRef<'a> {
    /// Parse by literal prefix; anything else is not a local component
    pub fn parse(reference: &'a str) -> Option<Self> {
        if let Some(name) = reference.strip_prefix(SCHEMA_HEAD) {
            Some(ComponentRef::Schema(name))
        } else if let Some(name) = reference.strip_prefix(RESPONSE_HEAD) {
            Some(ComponentRef::Response(name))
        } else if let Some(name) = reference.strip_prefix(PARAMETER_HEAD) {
            Some(ComponentRef::Parameter(name))
        } else {
            reference
                .strip_prefix(REQUEST_BODY_HEAD)
                .map(ComponentRef::RequestBody)
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            ComponentRef::Schema(n)
            | ComponentRef::Response(n)
            | ComponentRef::Parameter(n)
            | ComponentRef::RequestBody(n) => n,
        }
    }
}

/// Schema name of a reference; bare names pass through
pub fn strip_schema_head(reference: &str) -> &str {
    reference.strip_prefix(SCHEMA_HEAD).unwrap_or(reference)
}

pub fn strip_response_head(reference: &str) -> &str {
    reference.strip_prefix(RESPONSE_HEAD).unwrap_or(reference)
}

/// Case-insensitive membership test
pub fn is_contained(list: &[String], value: &str) -> bool {
    list.iter().any(|l| l.eq_ignore_ascii_case(value))
}

/// An operation together with where it is declared
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    pub operation: &'a Operation,
}

impl<'a> OperationRef<'a> {
    pub fn id(&self) -> &'a str {
        self.operation.operation_id.as_deref().unwrap_or("")
    }
}

impl OpenApiDocument {
    /// Load a document from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading OpenAPI document from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let doc = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(
            "Loaded {} paths and {} schemas",
            doc.paths.len(),
            doc.components.schemas.len()
        );
        Ok(doc)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Every operation, in path order then verb order
    pub fn operations(&self) -> impl Iterator<Item = OperationRef<'_>> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations().map(move |(method, operation)| OperationRef {
                path: path.as_str(),
                method,
                operation,
            })
        })
    }

    /// The operation with the given id, if any
    pub fn find_operation(&self, operation_id: &str) -> Option<OperationRef<'_>> {
        self.operations()
            .find(|op| op.operation.operation_id.as_deref() == Some(operation_id))
    }

    /// Schema by name or by `#/components/schemas/` reference
    pub fn find_schema(&self, name_or_ref: &str) -> Option<&Schema> {
        self.components
            .schemas
            .get(strip_schema_head(name_or_ref))
    }

    pub fn find_response(&self, reference: &str) -> Option<&Response> {
        match ComponentRef::parse(reference)? {
            ComponentRef::Response(name) => self.components.responses.get(name),
            _ => None,
        }
    }

    pub fn find_parameter(&self, reference: &str) -> Option<&Parameter> {
        match ComponentRef::parse(reference)? {
            ComponentRef::Parameter(name) => self.components.parameters.get(name),
            _ => None,
        }
    }

    pub fn find_request_body(&self, reference: &str) -> Option<&RequestBody> {
        match ComponentRef::parse(reference)? {
            ComponentRef::RequestBody(name) => self.components.request_bodies.get(name),
            _ => None,
        }
    }

    /// Follow a parameter `$ref`; unresolvable references yield the local entry
    pub fn deref_parameter<'a>(&'a self, parameter: &'a Parameter) -> &'a Parameter {
        parameter
            .reference
            .as_deref()
            .and_then(|r| self.find_parameter(r))
            .unwrap_or(parameter)
    }

    /// Follow a request body `$ref`
    pub fn deref_request_body<'a>(&'a self, body: &'a RequestBody) -> &'a RequestBody {
        body.reference
            .as_deref()
            .and_then(|r| self.find_request_body(r))
            .unwrap_or(body)
    }
}
