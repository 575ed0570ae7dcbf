//! JSON document fixtures.
//!
//! A fixture is a list of element trees materialized under the document root,
//! used by the CLI and by tests that want a whole page at once.

use crate::dom::{Document, DomError, NodeId, SelectedFile};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One element in a fixture tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Live value; overrides the `value` attribute when both are set.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub files: Vec<SelectedFile>,
    /// Text appended after the element's children.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Debug)]
pub enum FixtureError {
    Json(serde_json::Error),
    EmptyTag,
    Dom(DomError),
}

impl Display for FixtureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid fixture json: {err}"),
            Self::EmptyTag => write!(f, "fixture element tag must not be empty"),
            Self::Dom(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FixtureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Dom(err) => Some(err),
            Self::EmptyTag => None,
        }
    }
}

impl From<serde_json::Error> for FixtureError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DomError> for FixtureError {
    fn from(value: DomError) -> Self {
        Self::Dom(value)
    }
}

impl Document {
    /// Builds a document from a JSON array of element trees (or one tree).
    pub fn from_fixture_json(json: &str) -> Result<Self, FixtureError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let trees: Vec<NodeSpec> = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            vec![serde_json::from_value(value)?]
        };
        let mut doc = Self::new();
        let root = doc.root();
        for tree in &trees {
            doc.append_tree(root, tree)?;
        }
        Ok(doc)
    }

    /// Materializes `tree` as the last child of `parent`.
    pub fn append_tree(&mut self, parent: NodeId, tree: &NodeSpec) -> Result<NodeId, FixtureError> {
        if tree.tag.trim().is_empty() {
            return Err(FixtureError::EmptyTag);
        }
        let id = self.create_element(&tree.tag);
        for (name, value) in &tree.attrs {
            self.set_attr(id, name, value)?;
        }
        if let Some(value) = &tree.value {
            self.set_value(id, value.clone())?;
        }
        if !tree.files.is_empty() {
            self.set_files(id, tree.files.clone())?;
        }
        self.append_child(parent, id)?;
        for child in &tree.children {
            self.append_tree(id, child)?;
        }
        if let Some(text) = &tree.text {
            let text_node = self.create_text(text.clone());
            self.append_child(id, text_node)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::FixtureError;
    use crate::dom::Document;

    #[test]
    fn builds_nested_tree_with_values_and_files() {
        let doc = Document::from_fixture_json(
            r#"[{
                "tag": "form",
                "attrs": {"id": "upload"},
                "children": [
                    {"tag": "input", "attrs": {"name": "title", "value": "draft"}},
                    {"tag": "input", "attrs": {"type": "file"}, "files": [{"name": "a.csv", "size": 12}]},
                    {"tag": "label", "text": "Title"}
                ]
            }]"#,
        )
        .unwrap();

        let form = doc.query_selector("#upload").unwrap().unwrap();
        let fields = doc.query_selector_all_in(form, "input").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(doc.value(fields[0]).unwrap(), "draft");
        assert_eq!(doc.value(fields[1]).unwrap(), "a.csv");
        assert_eq!(doc.files(fields[1]).unwrap()[0].size, Some(12));

        let label = doc.query_selector("label").unwrap().unwrap();
        assert_eq!(doc.text_content(label).unwrap(), "Title");
    }

    #[test]
    fn accepts_single_object_and_rejects_empty_tag() {
        let doc = Document::from_fixture_json(r#"{"tag": "div"}"#).unwrap();
        assert_eq!(doc.children(doc.root()).unwrap().len(), 1);

        let err = Document::from_fixture_json(r#"[{"tag": " "}]"#).unwrap_err();
        assert!(matches!(err, FixtureError::EmptyTag));

        let err = Document::from_fixture_json(r#"[{"tag": "div", "colour": 1}]"#).unwrap_err();
        assert!(matches!(err, FixtureError::Json(_)));
    }
}
