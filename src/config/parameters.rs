//! Parameter descriptors and per-operation overrides

use serde::{Deserialize, Serialize};

/// One row of an interface operation table: a named input or output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParameterInfoRepr", rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: String,
    pub description: String,
    pub mandatory: bool,
    #[serde(rename = "type")]
    pub type_name: String,
    pub card: String,
}

impl ParameterInfo {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        mandatory: bool,
        type_name: impl Into<String>,
        card: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            mandatory,
            type_name: type_name.into(),
            card: card.into(),
        }
    }

    /// Parse the compact form `name|description|mandatory|type|card`.
    /// Missing trailing fields stay empty.
    pub fn parse(all: &str) -> Self {
        let parts: Vec<&str> = all.split('|').collect();
        let field = |i: usize| parts.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
        let mandatory = matches!(
            field(2).to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        );

        Self {
            name: field(0),
            description: field(1),
            mandatory,
            type_name: field(3),
            card: field(4),
        }
    }

    /// Text for the mandatory column
    pub fn mandatory_text(&self) -> &'static str {
        if self.mandatory {
            "yes"
        } else {
            "no"
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterInfoRepr {
    Pipe(String),
    Fields(ParameterInfoFields),
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ParameterInfoFields {
    name: String,
    description: String,
    mandatory: bool,
    #[serde(rename = "type")]
    type_name: String,
    card: String,
}

impl From<ParameterInfoRepr> for ParameterInfo {
    fn from(repr: ParameterInfoRepr) -> Self {
        match repr {
            ParameterInfoRepr::Pipe(all) => ParameterInfo::parse(&all),
            ParameterInfoRepr::Fields(f) => ParameterInfo {
                name: f.name,
                description: f.description,
                mandatory: f.mandatory,
                type_name: f.type_name,
                card: f.card,
            },
        }
    }
}

/// Ordered list of parameter descriptors with add-or-replace-by-name semantics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterInfoList(Vec<ParameterInfo>);

impl ParameterInfoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterInfo> {
        self.0.iter()
    }

    pub fn find_index_by_name(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&ParameterInfo> {
        self.find_index_by_name(name).map(|i| &self.0[i])
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name.as_str()).collect()
    }

    /// Replace the entry with the same name in place, or append
    pub fn add_or_replace(&mut self, info: ParameterInfo) {
        match self.find_index_by_name(&info.name) {
            Some(idx) => self.0[idx] = info,
            None => self.0.push(info),
        }
    }

    /// Layer another list over this one
    pub fn add_or_replace_all(&mut self, other: &ParameterInfoList) {
        for info in other.iter() {
            self.add_or_replace(info.clone());
        }
    }

    /// Remove the named entry; absent names are ignored
    pub fn remove_by_name(&mut self, name: &str) -> bool {
        match self.find_index_by_name(name) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl From<Vec<ParameterInfo>> for ParameterInfoList {
    fn from(items: Vec<ParameterInfo>) -> Self {
        let mut list = Self::new();
        for item in items {
            list.add_or_replace(item);
        }
        list
    }
}

impl<'a> IntoIterator for &'a ParameterInfoList {
    type Item = &'a ParameterInfo;
    type IntoIter = std::slice::Iter<'a, ParameterInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-operation overrides layered over the document-wide defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationConfig {
    /// Replaces the generated heading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    /// Replaces the default body text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Replaces the operation summary in the explanation row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    #[serde(skip_serializing_if = "ParameterInfoList::is_empty")]
    pub inputs: ParameterInfoList,

    #[serde(skip_serializing_if = "ParameterInfoList::is_empty")]
    pub outputs: ParameterInfoList,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suppress_inputs: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suppress_outputs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_pipe_form() {
        let info = ParameterInfo::parse("aasId|The shell id|true|Identifier|1");
        assert_eq!(
            info,
            ParameterInfo::new("aasId", "The shell id", true, "Identifier", "1")
        );
    }

    #[test]
    fn test_parse_short_pipe_form() {
        let info = ParameterInfo::parse("limit|Max results");
        assert_eq!(info.name, "limit");
        assert_eq!(info.description, "Max results");
        assert!(!info.mandatory);
        assert_eq!(info.type_name, "");
    }

    #[test]
    fn test_deserialize_both_forms() {
        let yaml = r#"
- "cursor|Paging cursor|false|string|0..1"
- name: statusCode
  description: Status of the call
  mandatory: true
  type: StatusCode
  card: "1"
"#;
        let list: ParameterInfoList = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(list.names(), vec!["cursor", "statusCode"]);
        assert!(list.get("statusCode").unwrap().mandatory);
        assert_eq!(list.get("cursor").unwrap().card, "0..1");
    }

    #[test]
    fn test_add_or_replace_keeps_position() {
        let mut base = ParameterInfoList::from(vec![
            ParameterInfo::new("a", "first", false, "string", "0..1"),
            ParameterInfo::new("p", "base", false, "B", "0..1"),
            ParameterInfo::new("z", "last", false, "string", "0..1"),
        ]);
        let overlay = ParameterInfoList::from(vec![
            ParameterInfo::new("p", "override", true, "A", "1"),
            ParameterInfo::new("n", "new", false, "string", "0..1"),
        ]);

        base.add_or_replace_all(&overlay);

        assert_eq!(base.names(), vec!["a", "p", "z", "n"]);
        assert_eq!(
            base.get("p").unwrap(),
            &ParameterInfo::new("p", "override", true, "A", "1")
        );
        assert_eq!(base.iter().filter(|p| p.name == "p").count(), 1);
    }

    #[test]
    fn test_remove_absent_name_is_noop() {
        let mut list = ParameterInfoList::from(vec![ParameterInfo::parse("a|x")]);
        assert!(!list.remove_by_name("missing"));
        assert_eq!(list.len(), 1);
        assert!(list.remove_by_name("a"));
        assert!(list.is_empty());
    }
}
