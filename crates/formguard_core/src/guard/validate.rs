use crate::dom::{Document, DomResult, NodeId};
use crate::guard::FormGuard;
use crate::model::field::{file_extension, Field, FieldKind};
use log::debug;

impl FormGuard {
    /// Validates every field inside `form` and updates annotations.
    ///
    /// Runs the required-field pass, then the file-input pass, over all
    /// descendants. A file input may be touched by both passes; the later
    /// pass decides its final annotation.
    ///
    /// Returns `true` iff no check failed.
    pub fn validate_form(&self, doc: &mut Document, form: NodeId) -> DomResult<bool> {
        let fields = collect_fields(doc, form)?;

        let required_ok = self.check_required(doc, &fields)?;
        let files_ok = self.check_files(doc, &fields)?;
        let valid = required_ok && files_ok;

        debug!(
            "event=form_validated module=guard form={form} fields={} valid={valid}",
            fields.len()
        );
        Ok(valid)
    }

    fn check_required(&self, doc: &mut Document, fields: &[Field]) -> DomResult<bool> {
        let mut valid = true;
        for field in fields.iter().filter(|field| field.required) {
            if field.is_blank() {
                valid = false;
                self.show_error(doc, field.node, &self.config.messages.required)?;
            } else {
                self.clear_error(doc, field.node)?;
            }
        }
        Ok(valid)
    }

    fn check_files(&self, doc: &mut Document, fields: &[Field]) -> DomResult<bool> {
        let mut valid = true;
        for field in fields {
            let FieldKind::File { files, accept } = &field.kind else {
                continue;
            };
            let Some(first) = files.first() else {
                if field.required {
                    valid = false;
                    self.show_error(doc, field.node, &self.config.messages.file_missing)?;
                }
                continue;
            };
            let Some(accept) = accept else {
                continue;
            };

            if accept.accepts_file(&first.name) {
                self.clear_error(doc, field.node)?;
            } else {
                valid = false;
                debug!(
                    "event=file_rejected module=guard field={} extension={}",
                    field.node,
                    file_extension(&first.name)
                );
                self.show_error(doc, field.node, &self.config.messages.unsupported_format)?;
            }
        }
        Ok(valid)
    }
}

fn collect_fields(doc: &Document, form: NodeId) -> DomResult<Vec<Field>> {
    let mut fields = Vec::new();
    for node in doc.descendants(form)? {
        if !doc.is_element(node) {
            continue;
        }
        if let Some(field) = Field::classify(doc, node)? {
            fields.push(field);
        }
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use crate::dom::{Document, NodeId, SelectedFile};
    use crate::guard::FormGuard;

    fn form_with(doc: &mut Document, configure: impl FnOnce(&mut Document, NodeId)) -> (NodeId, NodeId) {
        let form = doc.create_element("form");
        let input = doc.create_element("input");
        doc.append_child(doc.root(), form).unwrap();
        doc.append_child(form, input).unwrap();
        configure(doc, input);
        (form, input)
    }

    #[test]
    fn required_file_without_selection_ends_with_file_message() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let (form, input) = form_with(&mut doc, |doc, input| {
            doc.set_attr(input, "type", "file").unwrap();
            doc.set_attr(input, "required", "").unwrap();
        });

        assert!(!guard.validate_form(&mut doc, form).unwrap());

        assert_eq!(guard.feedback_count(&doc, form).unwrap(), 1);
        let annotation = guard.annotation_for(&doc, input).unwrap().unwrap();
        assert_eq!(annotation.message.as_deref(), Some("Please select a file."));
    }

    #[test]
    fn optional_file_without_selection_is_ignored() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let (form, input) = form_with(&mut doc, |doc, input| {
            doc.set_attr(input, "type", "file").unwrap();
            doc.set_attr(input, "accept", ".png").unwrap();
        });

        assert!(guard.validate_form(&mut doc, form).unwrap());
        assert!(guard.annotation_for(&doc, input).unwrap().is_none());
    }

    #[test]
    fn empty_accept_skips_extension_check() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let (form, _input) = form_with(&mut doc, |doc, input| {
            doc.set_attr(input, "type", "file").unwrap();
            doc.set_attr(input, "accept", "").unwrap();
            doc.set_files(input, vec![SelectedFile::new("virus.exe")]).unwrap();
        });

        assert!(guard.validate_form(&mut doc, form).unwrap());
    }

    #[test]
    fn only_first_selected_file_is_checked() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let (form, _input) = form_with(&mut doc, |doc, input| {
            doc.set_attr(input, "type", "file").unwrap();
            doc.set_attr(input, "accept", ".csv").unwrap();
            doc.set_files(
                input,
                vec![SelectedFile::new("good.CSV"), SelectedFile::new("bad.exe")],
            )
            .unwrap();
        });

        assert!(guard.validate_form(&mut doc, form).unwrap());
    }

    #[test]
    fn non_control_elements_with_required_are_ignored() {
        let guard = FormGuard::default();
        let mut doc = Document::new();
        let form = doc.create_element("form");
        let div = doc.create_element("div");
        doc.append_child(doc.root(), form).unwrap();
        doc.append_child(form, div).unwrap();
        doc.set_attr(div, "required", "").unwrap();

        assert!(guard.validate_form(&mut doc, form).unwrap());
        assert!(!doc.class_contains(div, "is-invalid").unwrap());
    }
}
