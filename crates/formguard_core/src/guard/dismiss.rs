use crate::dom::{Document, DomResult, NodeId, Selector};
use crate::guard::FormGuard;
use log::{debug, warn};

const TARGET_ATTR: &str = "data-target";
const HREF_ATTR: &str = "href";

/// Result of one dismiss-trigger click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DismissOutcome {
    /// Target found; its inline display is now `none`.
    Hidden(NodeId),
    /// Trigger names no target at all.
    NoTarget,
    /// Target reference is not a supported selector (e.g. a page URL).
    InvalidSelector(String),
    /// Selector is valid but matches nothing.
    NotFound(String),
}

impl FormGuard {
    /// Returns the selector a trigger points at: a non-empty `data-target`
    /// wins, `href` is the fallback.
    pub fn dismiss_target(&self, doc: &Document, trigger: NodeId) -> DomResult<Option<String>> {
        if let Some(target) = doc.attr(trigger, TARGET_ATTR)? {
            if !target.is_empty() {
                return Ok(Some(target.to_string()));
            }
        }
        Ok(doc.attr(trigger, HREF_ATTR)?.map(str::to_string))
    }

    /// Hides the first element matching the trigger's target.
    ///
    /// Unresolvable targets are ignored; the document is left untouched.
    pub fn dismiss(&self, doc: &mut Document, trigger: NodeId) -> DomResult<DismissOutcome> {
        let Some(reference) = self.dismiss_target(doc, trigger)? else {
            debug!("event=dismiss_ignored module=guard trigger={trigger} reason=no_target");
            return Ok(DismissOutcome::NoTarget);
        };
        let selector = match Selector::parse(&reference) {
            Ok(selector) => selector,
            Err(err) => {
                warn!("event=dismiss_ignored module=guard trigger={trigger} reason=invalid_selector error={err}");
                return Ok(DismissOutcome::InvalidSelector(reference));
            }
        };

        let root = doc.root();
        let Some(target) = doc.select_all_in(root, &selector)?.into_iter().next() else {
            debug!("event=dismiss_ignored module=guard trigger={trigger} reason=not_found target={reference}");
            return Ok(DismissOutcome::NotFound(reference));
        };

        doc.set_style_property(target, "display", "none")?;
        debug!("event=modal_hidden module=guard trigger={trigger} target={target}");
        Ok(DismissOutcome::Hidden(target))
    }
}
