//! Compound selector parsing and matching.
//!
//! Supported grammar, per comma-separated group: an optional tag name or `*`
//! followed by any number of `#id`, `.class`, `[attr]` and `[attr=value]`
//! parts. Combinators are rejected.

use crate::dom::document::class_tokens;
use crate::dom::{Document, DomError, DomResult, NodeId};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\*|[A-Za-z][A-Za-z0-9-]*)").expect("valid tag regex"));
static PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:#(?P<id>[A-Za-z0-9_-]+)|\.(?P<class>[A-Za-z0-9_-]+)|\[\s*(?P<attr>[A-Za-z0-9_:-]+)\s*(?:=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\]\s"']+))\s*)?\])"#,
    )
    .expect("valid selector part regex")
});

/// Parsed selector; matches when any of its groups matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatcher>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    value: Option<String>,
}

impl Selector {
    pub fn parse(input: &str) -> DomResult<Self> {
        let groups = input
            .split(',')
            .map(|group| parse_compound(group).ok_or_else(|| invalid(input)))
            .collect::<DomResult<Vec<_>>>()?;
        Ok(Self { groups })
    }

    /// Returns whether the element `id` matches. Non-elements never match.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.groups.iter().any(|group| group.matches(doc, id))
    }
}

impl Compound {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Ok(tag_name) = doc.tag_name(id) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if !self
            .ids
            .iter()
            .all(|wanted| attr_of(doc, id, "id") == Some(wanted.as_str()))
        {
            return false;
        }
        if !self.classes.is_empty() {
            let classes = attr_of(doc, id, "class").unwrap_or_default();
            if !self
                .classes
                .iter()
                .all(|wanted| class_tokens(classes).any(|token| token == wanted.as_str()))
            {
                return false;
            }
        }
        self.attrs
            .iter()
            .all(|matcher| match (&matcher.value, attr_of(doc, id, &matcher.name)) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(expected), Some(actual)) => expected.as_str() == actual,
            })
    }
}

fn parse_compound(group: &str) -> Option<Compound> {
    let mut rest = group.trim();
    if rest.is_empty() {
        return None;
    }

    let mut compound = Compound::default();
    if let Some(found) = TAG_RE.find(rest) {
        if found.as_str() != "*" {
            compound.tag = Some(found.as_str().to_ascii_lowercase());
        }
        rest = &rest[found.end()..];
    }

    while !rest.is_empty() {
        let caps = PART_RE.captures(rest)?;
        if let Some(id) = caps.name("id") {
            compound.ids.push(id.as_str().to_string());
        } else if let Some(class) = caps.name("class") {
            compound.classes.push(class.as_str().to_string());
        } else if let Some(name) = caps.name("attr") {
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("bare"))
                .map(|value| value.as_str().to_string());
            compound.attrs.push(AttrMatcher {
                name: name.as_str().to_ascii_lowercase(),
                value,
            });
        }
        rest = &rest[caps.get(0)?.end()..];
    }
    Some(compound)
}

fn attr_of<'a>(doc: &'a Document, id: NodeId, name: &str) -> Option<&'a str> {
    doc.attr(id, name).ok().flatten()
}

fn invalid(input: &str) -> DomError {
    DomError::InvalidSelector(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::Selector;
    use crate::dom::{Document, DomError};

    fn sample() -> (Document, [crate::dom::NodeId; 3]) {
        let mut doc = Document::new();
        let form = doc.create_element("form");
        let input = doc.create_element("input");
        let button = doc.create_element("button");
        doc.append_child(doc.root(), form).unwrap();
        doc.append_child(form, input).unwrap();
        doc.append_child(form, button).unwrap();
        doc.set_attr(input, "type", "file").unwrap();
        doc.set_attr(input, "required", "").unwrap();
        doc.set_attr(button, "data-dismiss", "modal").unwrap();
        doc.set_attr(button, "id", "close").unwrap();
        doc.set_attr(button, "class", "btn btn-secondary").unwrap();
        (doc, [form, input, button])
    }

    #[test]
    fn matches_tag_attribute_and_quoted_values() {
        let (doc, [form, input, button]) = sample();

        let all_forms = Selector::parse("form").unwrap();
        assert!(all_forms.matches(&doc, form));
        assert!(!all_forms.matches(&doc, input));

        let file_inputs = Selector::parse(r#"input[type="file"]"#).unwrap();
        assert!(file_inputs.matches(&doc, input));

        let required = Selector::parse("[required]").unwrap();
        assert!(required.matches(&doc, input));
        assert!(!required.matches(&doc, button));

        let dismiss = Selector::parse("[data-dismiss='modal']").unwrap();
        assert!(dismiss.matches(&doc, button));
        let bare = Selector::parse("[data-dismiss=modal]").unwrap();
        assert!(bare.matches(&doc, button));
    }

    #[test]
    fn matches_id_class_and_groups() {
        let (doc, [form, _input, button]) = sample();

        assert!(Selector::parse("#close").unwrap().matches(&doc, button));
        assert!(Selector::parse("button.btn.btn-secondary")
            .unwrap()
            .matches(&doc, button));
        assert!(!Selector::parse(".btn-primary").unwrap().matches(&doc, button));

        let group = Selector::parse("form, #close").unwrap();
        assert!(group.matches(&doc, form));
        assert!(group.matches(&doc, button));
        assert!(!group.matches(&doc, doc.root()));
    }

    #[test]
    fn rejects_combinators_and_garbage() {
        for input in ["", "form input", "div > p", "#", "/upload", "a,,b", "[x=\"y]"] {
            let err = Selector::parse(input).unwrap_err();
            assert!(matches!(err, DomError::InvalidSelector(_)), "{input}");
        }
    }
}
