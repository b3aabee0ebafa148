//! Event loop running the form controller on a page.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::document::Document;
use crate::draft::FieldValue;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::storage::DraftStore;

use super::fields::FieldId;
use super::{FormController, SubmitOutcome};

/// Everything that can happen to the form page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// A field was edited.
    Input {
        /// The edited field.
        field: FieldId,
        /// Its new value.
        value: FieldValue,
    },
    /// The user left a field.
    Blur(FieldId),
    /// The user pressed submit.
    Submit,
    /// The simulated submission round trip has elapsed.
    SubmissionElapsed,
    /// The success view has been shown long enough.
    ResetElapsed,
    /// The page is going away.
    Shutdown,
}

/// A form controller wired to a document and a timer source.
#[derive(Debug)]
pub struct FormPage<S, D> {
    controller: FormController<S>,
    document: D,
    scheduler: Scheduler<FormEvent>,
    submit_delay: Duration,
    reset_delay: Duration,
    timers: Vec<TaskHandle>,
}

impl<S: DraftStore, D: Document> FormPage<S, D> {
    /// Wire `controller` to `document`, posting timer events through
    /// `scheduler`.
    #[must_use]
    pub fn new(
        controller: FormController<S>,
        document: D,
        scheduler: Scheduler<FormEvent>,
        config: &Config,
    ) -> Self {
        Self {
            controller,
            document,
            scheduler,
            submit_delay: config.submit_delay(),
            reset_delay: config.reset_delay(),
            timers: Vec::new(),
        }
    }

    /// Restore any stored draft and render the page.
    ///
    /// A draft that can't be read is logged and the form starts empty.
    pub fn open(&mut self) {
        match self.controller.restore_draft() {
            Ok(_) => {}
            Err(e) if e.is_storage_error() => {
                warn!(error = %e, "Could not restore draft, starting empty");
            }
            Err(e) => error!(error = %e, "Draft restore failed, starting empty"),
        }
        self.render();
    }

    /// Handle one event and re-render. Returns `false` once the page should
    /// stop.
    pub fn handle(&mut self, event: FormEvent) -> bool {
        debug!(?event, "Form event");

        match event {
            FormEvent::Input { field, value } => {
                self.controller.input(field, value);
            }
            FormEvent::Blur(field) => {
                self.controller.blur(field);
            }
            FormEvent::Submit => {
                // Accepted submissions complete after the simulated round trip
                if self.controller.submit() == SubmitOutcome::Accepted {
                    self.schedule(self.submit_delay, FormEvent::SubmissionElapsed);
                }
            }
            FormEvent::SubmissionElapsed => {
                // Success view stays up until the reset timer fires
                if self.controller.complete_submission(Utc::now()).is_some() {
                    self.schedule(self.reset_delay, FormEvent::ResetElapsed);
                }
            }
            FormEvent::ResetElapsed => {
                self.controller.reset();
            }
            FormEvent::Shutdown => {
                self.shutdown();
                return false;
            }
        }

        self.render();
        true
    }

    /// Process events until [`FormEvent::Shutdown`].
    ///
    /// The page keeps a scheduler for its own timers, so the channel never
    /// closes while the page lives; only a shutdown event ends the loop.
    pub async fn run(&mut self, events: &mut mpsc::UnboundedReceiver<FormEvent>) {
        info!(form_id = %self.controller.form_id(), "Form page running");
        while let Some(event) = events.recv().await {
            if !self.handle(event) {
                break;
            }
        }
    }

    /// Cancel outstanding timers.
    pub fn shutdown(&mut self) {
        let outstanding = self.timers.len();
        for timer in self.timers.drain(..) {
            timer.cancel();
        }
        debug!(outstanding, "Form page shut down");
    }

    /// The controller.
    #[must_use]
    pub fn controller(&self) -> &FormController<S> {
        &self.controller
    }

    /// The document.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Timers scheduled and not yet fired or cancelled.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.iter().filter(|t| t.is_pending()).count()
    }

    fn schedule(&mut self, delay: Duration, event: FormEvent) {
        self.timers.retain(TaskHandle::is_pending);
        self.timers.push(self.scheduler.after(delay, event));
    }

    fn render(&mut self) {
        self.document.apply_all(&self.controller.render());
    }
}
