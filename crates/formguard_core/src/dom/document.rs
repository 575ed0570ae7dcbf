use crate::dom::selector::Selector;
use crate::dom::{DomError, DomResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Arena index of one node inside a `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the owning arena. Stable for the document lifetime.
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One file chosen through a file input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    /// Base file name as reported by the host, e.g. `photo.jpg`.
    pub name: String,
    /// Size in bytes when known. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
        }
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    attrs: BTreeMap<String, String>,
    value: String,
    files: Vec<SelectedFile>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Single-page document tree.
///
/// Nodes are never freed; removing a node only detaches it, so ids held by
/// callers stay valid.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document holding only its root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Creates a detached element. Tag names are normalized to lowercase.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push_node(NodeKind::Element(Element {
            tag_name: tag_name.trim().to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            value: String::new(),
            files: Vec::new(),
        }))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Text(text.into()))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> DomResult<&Element> {
        match &self.node(id)?.kind {
            NodeKind::Element(element) => Ok(element),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut Element> {
        let node = self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))?;
        match &mut node.kind {
            NodeKind::Element(element) => Ok(element),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    /// Returns whether `id` refers to an element node of this document.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    pub fn tag_name(&self, id: NodeId) -> DomResult<&str> {
        Ok(self.element(id)?.tag_name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> DomResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> DomResult<&[NodeId]> {
        Ok(self.node(id)?.children.as_slice())
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        if matches!(parent_node.kind, NodeKind::Text(_)) {
            return Err(DomError::CannotHaveChildren(parent));
        }
        let child_node = self.node(child)?;
        if matches!(child_node.kind, NodeKind::Document) {
            return Err(DomError::HierarchyCycle { parent, child });
        }

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(DomError::HierarchyCycle { parent, child });
            }
            cursor = self.nodes[current.0].parent;
        }

        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|id| *id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Detaches a direct child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.nodes[parent.0].children.retain(|id| *id != child);
        self.nodes[child.0].parent = None;
        Ok(())
    }

    /// Returns all descendants of `scope` in document (pre-)order, excluding
    /// `scope` itself.
    pub fn descendants(&self, scope: NodeId) -> DomResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(scope)?.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        Ok(out)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> DomResult<Option<&str>> {
        Ok(self
            .element(id)?
            .attrs
            .get(&name.to_ascii_lowercase())
            .map(String::as_str))
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> DomResult<bool> {
        Ok(self
            .element(id)?
            .attrs
            .contains_key(&name.to_ascii_lowercase()))
    }

    /// Sets an attribute. Writing `value` also resets the live value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        let lowered = name.to_ascii_lowercase();
        if lowered == "value" {
            element.value = value.to_string();
        }
        element.attrs.insert(lowered, value.to_string());
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        self.element_mut(id)?
            .attrs
            .remove(&name.to_ascii_lowercase());
        Ok(())
    }

    pub fn class_contains(&self, id: NodeId, class_name: &str) -> DomResult<bool> {
        let classes = self.attr(id, "class")?.unwrap_or_default();
        Ok(class_tokens(classes).any(|token| token == class_name))
    }

    pub fn class_add(&mut self, id: NodeId, class_name: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        let current = element.attrs.get("class").map(String::as_str).unwrap_or("");
        let mut classes: Vec<&str> = class_tokens(current).collect();
        if classes.contains(&class_name) {
            return Ok(());
        }
        classes.push(class_name);
        let joined = classes.join(" ");
        element.attrs.insert("class".to_string(), joined);
        Ok(())
    }

    pub fn class_remove(&mut self, id: NodeId, class_name: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        let Some(current) = element.attrs.get("class") else {
            return Ok(());
        };
        let joined = class_tokens(current)
            .filter(|token| *token != class_name)
            .collect::<Vec<_>>()
            .join(" ");
        element.attrs.insert("class".to_string(), joined);
        Ok(())
    }

    /// Returns the live value of a form control.
    ///
    /// File inputs report the name of their first selected file, or an empty
    /// string when nothing is selected.
    pub fn value(&self, id: NodeId) -> DomResult<&str> {
        let element = self.element(id)?;
        if is_file_input(element) {
            return Ok(element
                .files
                .first()
                .map(|file| file.name.as_str())
                .unwrap_or(""));
        }
        Ok(element.value.as_str())
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> DomResult<()> {
        self.element_mut(id)?.value = value.into();
        Ok(())
    }

    pub fn files(&self, id: NodeId) -> DomResult<&[SelectedFile]> {
        Ok(self.element(id)?.files.as_slice())
    }

    /// Replaces the selected file list, as a user picking files would.
    pub fn set_files(&mut self, id: NodeId, files: Vec<SelectedFile>) -> DomResult<()> {
        self.element_mut(id)?.files = files;
        Ok(())
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> DomResult<String> {
        if let NodeKind::Text(text) = &self.node(id)?.kind {
            return Ok(text.clone());
        }
        let mut out = String::new();
        for descendant in self.descendants(id)? {
            if let NodeKind::Text(text) = &self.nodes[descendant.0].kind {
                out.push_str(text);
            }
        }
        Ok(out)
    }

    /// Replaces all children of an element with one text node.
    pub fn set_text_content(&mut self, id: NodeId, text: impl Into<String>) -> DomResult<()> {
        self.element(id)?;
        let previous = std::mem::take(&mut self.nodes[id.0].children);
        for child in previous {
            self.nodes[child.0].parent = None;
        }
        let text_node = self.create_text(text);
        self.append_child(id, text_node)
    }

    /// Reads one declaration from the inline `style` attribute.
    pub fn style_property(&self, id: NodeId, property: &str) -> DomResult<Option<String>> {
        let style = self.attr(id, "style")?.unwrap_or_default();
        Ok(parse_style(style)
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value))
    }

    /// Writes one declaration into the inline `style` attribute, keeping the
    /// others in place.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) -> DomResult<()> {
        let property = property.trim().to_ascii_lowercase();
        let style = self.attr(id, "style")?.unwrap_or_default();
        let mut declarations = parse_style(style);
        match declarations.iter_mut().find(|(name, _)| *name == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => declarations.push((property, value.to_string())),
        }
        let serialized = declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "style", &serialized)
    }

    /// Returns whether `id` is an element matching `selector`.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element(id).is_ok() && selector.matches(self, id)
    }

    pub fn query_selector(&self, selector: &str) -> DomResult<Option<NodeId>> {
        self.query_selector_in(self.root(), selector)
    }

    pub fn query_selector_all(&self, selector: &str) -> DomResult<Vec<NodeId>> {
        self.query_selector_all_in(self.root(), selector)
    }

    /// First descendant of `scope` matching `selector`, in document order.
    pub fn query_selector_in(&self, scope: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)?
            .into_iter()
            .find(|id| self.matches(*id, &selector)))
    }

    pub fn query_selector_all_in(&self, scope: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        self.select_all_in(scope, &selector)
    }

    /// Like `query_selector_all_in` for an already parsed selector.
    pub fn select_all_in(&self, scope: NodeId, selector: &Selector) -> DomResult<Vec<NodeId>> {
        Ok(self
            .descendants(scope)?
            .into_iter()
            .filter(|id| self.matches(*id, selector))
            .collect())
    }
}

fn is_file_input(element: &Element) -> bool {
    element.tag_name == "input"
        && element
            .attrs
            .get("type")
            .is_some_and(|kind| kind.eq_ignore_ascii_case("file"))
}

pub(crate) fn class_tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split_ascii_whitespace()
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}
