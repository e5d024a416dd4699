//! Flattening of composed schemas into origin-tagged property bundles
//!
//! A schema contributes members through its `allOf` parts (inline members or
//! a reference to another schema whose members are pulled in recursively)
//! and through its own `properties`. The result keeps encounter order;
//! ordering for display is done by [`OriginatedPropertyList::sort_by_origin`].
//!
//! While resolving, every schema a member refers to is recorded in a
//! touched set so callers can find everything that needs documenting.

use indexmap::{IndexMap, IndexSet};
use std::cmp::Ordering;
use tracing::{debug, warn};

use super::document::{is_contained, strip_schema_head};
use super::types::{OpenApiDocument, PartKind, Property};

/// Resolution failures
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Cyclic schema composition: {}", .path.join(" -> "))]
    CyclicSchema { path: Vec<String> },
}

/// A flattened member with the schema it was declared in
#[derive(Debug, Clone, PartialEq)]
pub struct OriginatedProperty {
    pub origin: String,
    pub name: String,
    pub required: bool,
    pub property: Property,
}

impl OriginatedProperty {
    pub fn new(origin: impl Into<String>, name: impl Into<String>, required: bool, property: Property) -> Self {
        Self {
            origin: origin.into(),
            name: name.into(),
            required,
            property,
        }
    }

    /// Referenced schema name, array item type, or plain type
    pub fn type_text(&self) -> String {
        let p = &self.property;
        if let Some(r) = &p.reference {
            return strip_schema_head(r).to_string();
        }
        if p.is_array() {
            if let Some(items) = &p.items {
                if let Some(r) = &items.reference {
                    return strip_schema_head(r).to_string();
                }
                if let Some(t) = &items.type_name {
                    return t.clone();
                }
            }
        }
        p.type_name.clone().unwrap_or_default()
    }

    /// `1` or `0..1`; arrays use their item bounds
    pub fn cardinality(&self) -> String {
        let p = &self.property;
        if p.is_array() {
            let min = p.min_items.unwrap_or(if self.required { 1 } else { 0 });
            let max = p
                .max_items
                .map(|m| m.to_string())
                .unwrap_or_else(|| "*".to_string());
            return format!("{}..{}", min, max);
        }
        if self.required {
            "1".to_string()
        } else {
            "0..1".to_string()
        }
    }
}

/// Ordered result of a resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginatedPropertyList(Vec<OriginatedProperty>);

impl OriginatedPropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, item: OriginatedProperty) {
        self.0.push(item);
    }

    pub fn extend(&mut self, other: OriginatedPropertyList) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OriginatedProperty> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&OriginatedProperty> {
        self.0.iter().find(|p| p.name == name)
    }

    /// Keep the first member of each name
    pub fn dedup_by_name(&mut self) {
        let mut seen = IndexSet::new();
        self.0.retain(|p| seen.insert(p.name.clone()));
    }

    /// Drop members whose name is listed
    pub fn remove_names(&mut self, names: &[String]) {
        self.0.retain(|p| !names.contains(&p.name));
    }

    /// Order for display: origins ranked by `origin_order` first, other
    /// origins after them grouped by name, members of `own_schema` last;
    /// alphabetical by member name inside each group
    pub fn sort_by_origin(&mut self, origin_order: &[String], own_schema: &str) {
        let key = |p: &OriginatedProperty| -> (u8, usize, String) {
            if p.origin == own_schema {
                (2, 0, String::new())
            } else if let Some(rank) = origin_order.iter().position(|o| *o == p.origin) {
                (0, rank, String::new())
            } else {
                (1, 0, p.origin.clone())
            }
        };

        self.0.sort_by(|a, b| {
            key(a)
                .cmp(&key(b))
                .then_with(|| compare_names(&a.name, &b.name))
        });
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl<'a> IntoIterator for &'a OriginatedPropertyList {
    type Item = &'a OriginatedProperty;
    type IntoIter = std::slice::Iter<'a, OriginatedProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Set of schema names found while resolving, in discovery order
pub type TouchedSet = IndexSet<String>;

/// Resolves schemas of one document
pub struct SchemaResolver<'a> {
    doc: &'a OpenApiDocument,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(doc: &'a OpenApiDocument) -> Self {
        Self { doc }
    }

    /// Flatten the named schema.
    ///
    /// `touched` collects referenced schema names. Names in `do_not_follow`
    /// are recorded as they are instead of being expanded into their
    /// `oneOf` alternatives.
    pub fn resolve_properties(
        &self,
        name: &str,
        touched: Option<&mut TouchedSet>,
        do_not_follow: &[String],
    ) -> Result<OriginatedPropertyList, ResolveError> {
        let mut scratch = TouchedSet::new();
        let touched = touched.unwrap_or(&mut scratch);
        let mut path = Vec::new();
        self.resolve_into(name, touched, do_not_follow, &mut path)
    }

    fn resolve_into(
        &self,
        name: &str,
        touched: &mut TouchedSet,
        do_not_follow: &[String],
        path: &mut Vec<String>,
    ) -> Result<OriginatedPropertyList, ResolveError> {
        let schema_name = strip_schema_head(name);
        let schema = self
            .doc
            .find_schema(schema_name)
            .ok_or_else(|| ResolveError::SchemaNotFound(schema_name.to_string()))?;

        if path.iter().any(|p| p == schema_name) {
            let mut cycle = path.clone();
            cycle.push(schema_name.to_string());
            return Err(ResolveError::CyclicSchema { path: cycle });
        }
        path.push(schema_name.to_string());

        let mut res = OriginatedPropertyList::new();

        for part in &schema.all_of {
            let reference = match part.kind() {
                PartKind::Inline(members) => {
                    self.push_members(&mut res, schema_name, members, &part.required, touched, do_not_follow);
                    None
                }
                PartKind::Mixed(members, reference) => {
                    self.push_members(&mut res, schema_name, members, &part.required, touched, do_not_follow);
                    Some(reference)
                }
                PartKind::Reference(reference) => Some(reference),
                PartKind::Empty => None,
            };

            let Some(reference) = reference else { continue };
            touched.insert(strip_schema_head(reference).to_string());
            match self.resolve_into(reference, touched, do_not_follow, path) {
                Ok(nested) => res.extend(nested),
                Err(ResolveError::SchemaNotFound(missing)) => {
                    warn!("Schema {} refers to unknown schema {}", schema_name, missing);
                }
                Err(e) => {
                    path.pop();
                    return Err(e);
                }
            }
        }

        self.push_members(&mut res, schema_name, &schema.properties, &schema.required, touched, do_not_follow);

        path.pop();
        debug!("Resolved {} members for schema {}", res.len(), schema_name);
        Ok(res)
    }

    fn push_members(
        &self,
        res: &mut OriginatedPropertyList,
        origin: &str,
        members: &IndexMap<String, Property>,
        required_names: &[String],
        touched: &mut TouchedSet,
        do_not_follow: &[String],
    ) {
        for (prop_name, prop) in members {
            let joined = self.prepare_property(prop, touched, do_not_follow);
            let required = is_contained(required_names, prop_name);
            res.push(OriginatedProperty::new(origin, prop_name, required, joined));
        }
    }

    /// Clone a member, pull attributes from its reference and `allOf`
    /// entries, and record the schemas it points to
    fn prepare_property(
        &self,
        prop: &Property,
        touched: &mut TouchedSet,
        do_not_follow: &[String],
    ) -> Property {
        let mut joined = prop.clone();
        joined.all_of.clear();

        if let Some(target) = prop.reference.as_deref().and_then(|r| self.doc.find_schema(r)) {
            joined.set_from(target);
        }

        for part in &prop.all_of {
            joined.join(part);
        }

        if prop.reference.is_none() {
            if let Some(target) = joined.reference.as_deref().and_then(|r| self.doc.find_schema(r)) {
                joined.set_from(target);
            }
        }

        if let Some(reference) = &joined.reference {
            self.expand_and_touch(strip_schema_head(reference), touched, do_not_follow);
        }
        if joined.is_array() {
            if let Some(reference) = joined.items.as_ref().and_then(|i| i.reference.as_deref()) {
                self.expand_and_touch(strip_schema_head(reference), touched, do_not_follow);
            }
        }

        joined
    }

    /// Record a schema name; a `oneOf` wrapper is replaced by its alternatives
    fn expand_and_touch(&self, name: &str, touched: &mut TouchedSet, do_not_follow: &[String]) {
        if !do_not_follow.iter().any(|d| d == name) {
            if let Some(schema) = self.doc.find_schema(name) {
                if schema.is_one_of_wrapper() {
                    for alt in schema.one_of.iter().filter_map(|p| p.reference.as_deref()) {
                        touched.insert(strip_schema_head(alt).to_string());
                    }
                    return;
                }
            }
        }
        touched.insert(name.to_string());
    }

    /// Every schema reachable from `seeds`, seeds first, in discovery order.
    ///
    /// Each newly touched name is resolved in turn until no new names
    /// appear. Names in `do_not_follow` are listed but not resolved; names
    /// without a schema are dropped.
    pub fn discover_schemas(&self, seeds: &[String], do_not_follow: &[String]) -> Vec<String> {
        let mut touched = TouchedSet::new();
        for seed in seeds {
            touched.insert(strip_schema_head(seed).to_string());
        }

        let mut i = 0;
        while i < touched.len() {
            let name = touched[i].clone();
            i += 1;
            if do_not_follow.contains(&name) {
                continue;
            }
            match self.resolve_properties(&name, Some(&mut touched), do_not_follow) {
                Ok(_) => {}
                Err(ResolveError::SchemaNotFound(missing)) => {
                    debug!("Skipping discovery through unknown schema {}", missing);
                }
                Err(e) => warn!("Skipping discovery through {}: {}", name, e),
            }
        }

        touched
            .into_iter()
            .filter(|n| self.doc.find_schema(n).is_some())
            .collect()
    }

    /// Member names listed as required by any `oneOf` alternative
    pub fn one_of_required(&self, name: &str) -> Vec<String> {
        let Some(schema) = self.doc.find_schema(name) else {
            return Vec::new();
        };
        let mut names: Vec<String> = Vec::new();
        for alt in &schema.one_of {
            for req in &alt.required {
                if !names.contains(req) {
                    names.push(req.clone());
                }
            }
        }
        names
    }
}
