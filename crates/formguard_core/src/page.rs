//! Single-threaded page host.
//!
//! # Responsibility
//! - Own one document plus the listeners the guard installs on it.
//! - Queue page events and run each one to completion, in FIFO order.
//! - Record whether each submission went through or was blocked.
//!
//! # Invariants
//! - `DOMContentLoaded` installs listeners at most once per page.
//! - Only forms and dismiss triggers present at load time get listeners.
//! - Clicks bubble from the target to the root; submits are delivered to the
//!   form itself.

use crate::dom::{Document, DomError, DomResult, NodeId};
use crate::guard::{DismissOutcome, FormGuard};
use log::{debug, info};
use std::collections::VecDeque;

/// Events a page can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    DomContentLoaded,
    Submit(NodeId),
    Click(NodeId),
}

/// Document readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
}

/// Final state of one dispatched event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Default action suppressed by a listener.
    pub default_prevented: bool,
    /// A listener stopped further propagation.
    pub propagation_stopped: bool,
    /// Number of listeners invoked.
    pub handled: usize,
    /// Modal dismissals performed while handling a click.
    pub dismissals: Vec<DismissOutcome>,
}

/// What happened to one form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResult {
    /// Native submission proceeds.
    Submitted,
    /// Validation failed; the user stays on the page.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listener {
    SubmitGuard { form: NodeId },
    DismissTrigger { trigger: NodeId },
}

impl Listener {
    fn target(self) -> NodeId {
        match self {
            Self::SubmitGuard { form } => form,
            Self::DismissTrigger { trigger } => trigger,
        }
    }
}

pub struct Page {
    document: Document,
    guard: FormGuard,
    ready_state: ReadyState,
    listeners: Vec<Listener>,
    queue: VecDeque<PageEvent>,
    submissions: Vec<(NodeId, SubmitResult)>,
}

impl Page {
    pub fn new(document: Document, guard: FormGuard) -> Self {
        Self {
            document,
            guard,
            ready_state: ReadyState::Loading,
            listeners: Vec::new(),
            queue: VecDeque::new(),
            submissions: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for simulating user input between events.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn guard(&self) -> &FormGuard {
        &self.guard
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Submissions in dispatch order.
    pub fn submissions(&self) -> &[(NodeId, SubmitResult)] {
        &self.submissions
    }

    /// Returns whether `form` has a submit interceptor.
    pub fn is_guarded(&self, form: NodeId) -> bool {
        self.listeners
            .contains(&Listener::SubmitGuard { form })
    }

    /// Fires `DOMContentLoaded`. Later calls are no-ops.
    pub fn load(&mut self) -> DomResult<DispatchOutcome> {
        self.dispatch(PageEvent::DomContentLoaded)
    }

    /// Submits `form` and reports whether it went through.
    pub fn submit(&mut self, form: NodeId) -> DomResult<SubmitResult> {
        let outcome = self.dispatch(PageEvent::Submit(form))?;
        Ok(if outcome.default_prevented {
            SubmitResult::Blocked
        } else {
            SubmitResult::Submitted
        })
    }

    /// Validates `form` in place without dispatching a submit event.
    pub fn validate_form(&mut self, form: NodeId) -> DomResult<bool> {
        self.guard.validate_form(&mut self.document, form)
    }

    pub fn click(&mut self, target: NodeId) -> DomResult<DispatchOutcome> {
        self.dispatch(PageEvent::Click(target))
    }

    pub fn enqueue(&mut self, event: PageEvent) {
        self.queue.push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drains the queue, one event at a time.
    ///
    /// Stops at the first failing event; events behind it stay queued.
    pub fn run_pending(&mut self) -> DomResult<Vec<DispatchOutcome>> {
        let mut outcomes = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.queue.pop_front() {
            outcomes.push(self.dispatch(event)?);
        }
        Ok(outcomes)
    }

    /// Runs all listeners for one event to completion.
    pub fn dispatch(&mut self, event: PageEvent) -> DomResult<DispatchOutcome> {
        match event {
            PageEvent::DomContentLoaded => self.on_content_loaded(),
            PageEvent::Submit(form) => self.on_submit(form),
            PageEvent::Click(target) => self.on_click(target),
        }
    }

    fn on_content_loaded(&mut self) -> DomResult<DispatchOutcome> {
        if self.ready_state == ReadyState::Interactive {
            return Ok(DispatchOutcome::default());
        }
        self.ready_state = ReadyState::Interactive;

        let root = self.document.root();
        let forms = self.document.query_selector_all("form")?;
        let triggers = self
            .document
            .select_all_in(root, self.guard.dismiss_selector())?;

        self.listeners
            .extend(forms.iter().map(|&form| Listener::SubmitGuard { form }));
        self.listeners
            .extend(triggers.iter().map(|&trigger| Listener::DismissTrigger { trigger }));

        info!(
            "event=guard_installed module=page status=ok forms={} dismiss_triggers={}",
            forms.len(),
            triggers.len()
        );
        Ok(DispatchOutcome {
            handled: 1,
            ..DispatchOutcome::default()
        })
    }

    fn on_submit(&mut self, form: NodeId) -> DomResult<DispatchOutcome> {
        if self.document.tag_name(form)? != "form" {
            return Err(DomError::NotAForm(form));
        }

        let mut outcome = DispatchOutcome::default();
        if self.is_guarded(form) {
            outcome.handled += 1;
            if !self.guard.validate_form(&mut self.document, form)? {
                outcome.default_prevented = true;
                outcome.propagation_stopped = true;
            }
        }

        let result = if outcome.default_prevented {
            info!("event=submit_blocked module=page form={form}");
            SubmitResult::Blocked
        } else {
            info!("event=submit_allowed module=page form={form}");
            SubmitResult::Submitted
        };
        self.submissions.push((form, result));
        Ok(outcome)
    }

    fn on_click(&mut self, target: NodeId) -> DomResult<DispatchOutcome> {
        let mut outcome = DispatchOutcome::default();
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            let triggers: Vec<Listener> = self
                .listeners
                .iter()
                .copied()
                .filter(|listener| {
                    matches!(listener, Listener::DismissTrigger { .. })
                        && listener.target() == current
                })
                .collect();
            for listener in triggers {
                outcome.handled += 1;
                let dismissal = self.guard.dismiss(&mut self.document, listener.target())?;
                outcome.dismissals.push(dismissal);
            }
            cursor = self.document.parent(current)?;
        }
        debug!(
            "event=click_dispatched module=page target={target} handled={}",
            outcome.handled
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageEvent, ReadyState, SubmitResult};
    use crate::dom::{Document, DomError};
    use crate::guard::FormGuard;

    #[test]
    fn load_installs_listeners_once() {
        let mut doc = Document::new();
        let form = doc.create_element("form");
        doc.append_child(doc.root(), form).unwrap();
        let mut page = Page::new(doc, FormGuard::default());

        assert_eq!(page.ready_state(), ReadyState::Loading);
        assert!(!page.is_guarded(form));

        assert_eq!(page.load().unwrap().handled, 1);
        assert_eq!(page.load().unwrap().handled, 0);
        assert_eq!(page.ready_state(), ReadyState::Interactive);
        assert!(page.is_guarded(form));
    }

    #[test]
    fn submit_rejects_non_form_targets() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.append_child(doc.root(), div).unwrap();
        let mut page = Page::new(doc, FormGuard::default());
        page.load().unwrap();

        assert_eq!(page.submit(div).unwrap_err(), DomError::NotAForm(div));
        assert!(page.submissions().is_empty());
    }

    #[test]
    fn queued_events_run_in_order() {
        let mut doc = Document::new();
        let form = doc.create_element("form");
        let input = doc.create_element("input");
        doc.append_child(doc.root(), form).unwrap();
        doc.append_child(form, input).unwrap();
        doc.set_attr(input, "required", "").unwrap();
        let mut page = Page::new(doc, FormGuard::default());

        page.enqueue(PageEvent::DomContentLoaded);
        page.enqueue(PageEvent::Submit(form));
        assert_eq!(page.pending(), 2);

        let outcomes = page.run_pending().unwrap();
        assert_eq!(page.pending(), 0);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[1].default_prevented);
        assert_eq!(page.submissions(), &[(form, SubmitResult::Blocked)]);
    }

    #[test]
    fn submit_before_load_is_not_intercepted() {
        let mut doc = Document::new();
        let form = doc.create_element("form");
        let input = doc.create_element("input");
        doc.append_child(doc.root(), form).unwrap();
        doc.append_child(form, input).unwrap();
        doc.set_attr(input, "required", "").unwrap();
        let mut page = Page::new(doc, FormGuard::default());

        assert_eq!(page.submit(form).unwrap(), SubmitResult::Submitted);
    }
}
