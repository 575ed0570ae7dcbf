use crate::dom::{Document, DomResult, NodeId};
use crate::guard::FormGuard;
use crate::model::field::Field;
use log::debug;

/// Visible error state of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub field: NodeId,
    /// Text of the message node in the field's parent, if one is present.
    ///
    /// Fields sharing a parent share one message slot.
    pub message: Option<String>,
}

impl FormGuard {
    /// Marks `field` invalid and appends one message node to its parent.
    ///
    /// Clears any existing annotation first, so repeated calls never stack
    /// messages. A detached field only receives the invalid class.
    pub fn show_error(&self, doc: &mut Document, field: NodeId, message: &str) -> DomResult<()> {
        self.clear_error(doc, field)?;

        let feedback = doc.create_element(&self.config.feedback_tag);
        doc.class_add(feedback, &self.config.feedback_class)?;
        doc.set_text_content(feedback, message)?;

        doc.class_add(field, &self.config.invalid_class)?;
        if let Some(parent) = doc.parent(field)? {
            doc.append_child(parent, feedback)?;
        }
        debug!("event=annotation_shown module=guard field={field}");
        Ok(())
    }

    /// Removes the invalid class from `field` and the first message node
    /// among its parent's children. No-op when neither exists.
    pub fn clear_error(&self, doc: &mut Document, field: NodeId) -> DomResult<()> {
        doc.class_remove(field, &self.config.invalid_class)?;
        let Some(parent) = doc.parent(field)? else {
            return Ok(());
        };
        if let Some(feedback) = self.feedback_node(doc, parent)? {
            doc.remove_child(parent, feedback)?;
        }
        Ok(())
    }

    /// Returns the annotation on `field`, or `None` when it is not marked
    /// invalid.
    pub fn annotation_for(&self, doc: &Document, field: NodeId) -> DomResult<Option<Annotation>> {
        if !doc.class_contains(field, &self.config.invalid_class)? {
            return Ok(None);
        }
        let message = match doc.parent(field)? {
            Some(parent) => match self.feedback_node(doc, parent)? {
                Some(feedback) => Some(doc.text_content(feedback)?),
                None => None,
            },
            None => None,
        };
        Ok(Some(Annotation { field, message }))
    }

    /// Lists annotations of all fields inside `form`, in document order.
    pub fn annotations(&self, doc: &Document, form: NodeId) -> DomResult<Vec<Annotation>> {
        let mut out = Vec::new();
        for node in doc.descendants(form)? {
            if !doc.is_element(node) || Field::classify(doc, node)?.is_none() {
                continue;
            }
            if let Some(annotation) = self.annotation_for(doc, node)? {
                out.push(annotation);
            }
        }
        Ok(out)
    }

    /// Number of message nodes directly under `parent`.
    pub fn feedback_count(&self, doc: &Document, parent: NodeId) -> DomResult<usize> {
        let mut count = 0;
        for &child in doc.children(parent)? {
            if doc.is_element(child) && doc.class_contains(child, &self.config.feedback_class)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn feedback_node(&self, doc: &Document, parent: NodeId) -> DomResult<Option<NodeId>> {
        for &child in doc.children(parent)? {
            if doc.is_element(child) && doc.class_contains(child, &self.config.feedback_class)? {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{Document, NodeId};
    use crate::guard::FormGuard;

    fn field_in_group(doc: &mut Document) -> (NodeId, NodeId) {
        let group = doc.create_element("div");
        let input = doc.create_element("input");
        doc.append_child(doc.root(), group).unwrap();
        doc.append_child(group, input).unwrap();
        (group, input)
    }

    #[test]
    fn show_error_appends_message_as_last_child() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let (group, input) = field_in_group(&mut doc);
        let hint = doc.create_element("small");
        doc.append_child(group, hint).unwrap();

        guard.show_error(&mut doc, input, "Required").unwrap();

        let children = doc.children(group).unwrap();
        assert_eq!(children.len(), 3);
        let feedback = children[2];
        assert_eq!(doc.tag_name(feedback).unwrap(), "div");
        assert!(doc.class_contains(feedback, "invalid-feedback").unwrap());
        assert_eq!(doc.text_content(feedback).unwrap(), "Required");
        assert!(doc.class_contains(input, "is-invalid").unwrap());
    }

    #[test]
    fn show_error_replaces_previous_message() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let (group, input) = field_in_group(&mut doc);

        guard.show_error(&mut doc, input, "first").unwrap();
        guard.show_error(&mut doc, input, "second").unwrap();

        assert_eq!(guard.feedback_count(&doc, group).unwrap(), 1);
        let annotation = guard.annotation_for(&doc, input).unwrap().unwrap();
        assert_eq!(annotation.message.as_deref(), Some("second"));
    }

    #[test]
    fn clear_error_is_noop_without_annotation() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let (group, input) = field_in_group(&mut doc);
        doc.set_attr(input, "class", "form-control").unwrap();

        guard.clear_error(&mut doc, input).unwrap();

        assert_eq!(doc.children(group).unwrap(), &[input]);
        assert_eq!(doc.attr(input, "class").unwrap(), Some("form-control"));
        assert!(guard.annotation_for(&doc, input).unwrap().is_none());
    }

    #[test]
    fn clear_error_removes_exactly_one_message() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let (group, input) = field_in_group(&mut doc);
        for _ in 0..2 {
            let stray = doc.create_element("div");
            doc.set_attr(stray, "class", "invalid-feedback").unwrap();
            doc.append_child(group, stray).unwrap();
        }

        guard.clear_error(&mut doc, input).unwrap();

        assert_eq!(guard.feedback_count(&doc, group).unwrap(), 1);
    }

    #[test]
    fn detached_field_only_gets_marker_class() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let input = doc.create_element("input");

        guard.show_error(&mut doc, input, "Required").unwrap();

        let annotation = guard.annotation_for(&doc, input).unwrap().unwrap();
        assert_eq!(annotation.message, None);
    }
}
