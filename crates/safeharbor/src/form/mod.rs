//! Incident-report form controller.
//!
//! [`FormController`] owns the form's state and reacts to input, blur and
//! submit events. It never touches the page; [`FormController::render`]
//! projects its state into view instructions. Timers for the simulated
//! submission live in [`page`].

pub mod fields;
pub mod page;
pub mod submission;
pub mod validate;
pub mod view;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::{Config, FormConfig};
use crate::document::ViewInstruction;
use crate::draft::FieldValue;
use crate::error::Result;
use crate::storage::{DraftStore, SaveOutcome};

pub use fields::{format_phone_number, CharCounter, FieldId, FieldKind, ReportFields};
pub use page::{FormEvent, FormPage};
pub use submission::{ReportId, SubmitPhase};
pub use validate::{ValidationReport, Validator};
pub use view::FormState;

/// What a submit attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission was already in flight or completed; nothing changed.
    Ignored,
    /// Validation failed; the failures are now shown inline.
    Rejected {
        /// Number of failing fields.
        failures: usize,
    },
    /// The form is valid and the submission is now pending.
    Accepted,
}

/// The report form's controller.
#[derive(Debug)]
pub struct FormController<S> {
    form_id: String,
    store: S,
    validator: Validator,
    state: FormState,
    format_phone: bool,
    description_max_length: usize,
}

impl<S: DraftStore> FormController<S> {
    /// Create a controller for the form described by `form`.
    #[must_use]
    pub fn new(store: S, validator: Validator, form: &FormConfig) -> Self {
        Self {
            form_id: form.form_id.clone(),
            store,
            validator,
            state: FormState::default(),
            format_phone: form.format_phone,
            description_max_length: form.description_max_length,
        }
    }

    /// Create a controller from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the validation patterns fail to compile.
    pub fn from_config(store: S, config: &Config) -> Result<Self> {
        let validator = Validator::from_config(config)?;
        Ok(Self::new(store, validator, &config.form))
    }

    /// Restore the stored draft, if there is one.
    ///
    /// Returns `true` if a draft was found. Anonymity's derived effects follow
    /// from the restored flag at the next render.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the draft is corrupt.
    pub fn restore_draft(&mut self) -> Result<bool> {
        let Some(record) = self.store.load(&self.form_id)? else {
            debug!(form_id = %self.form_id, "No draft to restore");
            return Ok(false);
        };

        let restored = self.state.fields.restore(&record);
        info!(form_id = %self.form_id, fields = restored, "Restored draft");
        Ok(true)
    }

    /// Handle an edit to a field.
    ///
    /// Clears the field's error and autosaves the draft. Returns `false` if the
    /// value was ignored.
    pub fn input(&mut self, field: FieldId, value: FieldValue) -> bool {
        // The form is hidden until reset; edits would resurrect the cleared draft
        if self.state.phase.report_id().is_some() {
            debug!(%field, "Ignoring input while the success view is shown");
            return false;
        }

        // Reformat the phone number as typed
        let value = match value {
            FieldValue::Text(text) if field == FieldId::ReporterPhone && self.format_phone => {
                FieldValue::Text(format_phone_number(&text))
            }
            other => other,
        };

        if !self.state.fields.set(field, value) {
            warn!(%field, "Ignoring value of the wrong kind");
            return false;
        }

        // Editing a field clears its error; going anonymous clears the contact ones
        self.state.errors.remove(&field);
        if field == FieldId::Anonymous && !self.state.fields.require_contact() {
            self.state.errors.retain(|field, _| !field.is_contact());
        }

        // Snapshot every field, not just the edited one
        self.autosave();
        true
    }

    /// Validate a field the user just left. Returns `true` if it passed.
    pub fn blur(&mut self, field: FieldId) -> bool {
        match self.validator.validate_field(field, &self.state.fields) {
            Some(message) => {
                debug!(%field, %message, "Field failed validation");
                self.state.errors.insert(field, message);
                false
            }
            None => {
                self.state.errors.remove(&field);
                true
            }
        }
    }

    /// Attempt to submit the form.
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.state.phase.is_idle() {
            debug!("Ignoring submit while a submission is in flight");
            return SubmitOutcome::Ignored;
        }

        // Full-form check; every failure is shown at once
        let report = self.validator.validate_all(&self.state.fields);
        if !report.is_valid() {
            let failures = report.errors().len();
            info!(failures, "Submission blocked by validation");
            self.state.errors = report.into_errors();
            return SubmitOutcome::Rejected { failures };
        }

        self.state.errors.clear();
        self.state.phase = SubmitPhase::Pending;
        info!(form_id = %self.form_id, "Submission pending");
        SubmitOutcome::Accepted
    }

    /// Finish a pending submission at `now`.
    ///
    /// Generates the confirmation, shows the success view and clears the
    /// stored draft. Returns `None` if no submission was pending.
    pub fn complete_submission(&mut self, now: DateTime<Utc>) -> Option<ReportId> {
        if !self.state.phase.is_pending() {
            return None;
        }

        let report_id = ReportId::generate(now);
        self.state.phase = SubmitPhase::Succeeded {
            report_id: report_id.clone(),
        };

        // The report went through even if the draft lingers
        if let Err(e) = self.store.clear(&self.form_id) {
            warn!(form_id = %self.form_id, error = %e, "Failed to clear draft");
        }

        info!(form_id = %self.form_id, %report_id, "Report submitted");
        Some(report_id)
    }

    /// Return the form to its pristine empty state after a submission.
    ///
    /// Returns `false` if there was no completed submission to reset from.
    pub fn reset(&mut self) -> bool {
        if self.state.phase.report_id().is_none() {
            return false;
        }
        self.state = FormState::default();
        debug!(form_id = %self.form_id, "Form reset");
        true
    }

    /// Project the current state into view instructions.
    #[must_use]
    pub fn render(&self) -> Vec<ViewInstruction> {
        view::render(&self.state, self.description_max_length)
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Current field values.
    #[must_use]
    pub fn fields(&self) -> &ReportFields {
        &self.state.fields
    }

    /// Failures currently shown.
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<FieldId, String> {
        &self.state.errors
    }

    /// Submission lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> &SubmitPhase {
        &self.state.phase
    }

    /// Identity the draft is stored under.
    #[must_use]
    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// The draft store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn autosave(&self) {
        let record = self.state.fields.to_record();
        match self.store.save(&self.form_id, &record) {
            Ok(SaveOutcome::Written) => debug!(form_id = %self.form_id, "Draft saved"),
            Ok(SaveOutcome::Unchanged) => {}
            Err(e) => warn!(form_id = %self.form_id, error = %e, "Failed to save draft"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, InMemoryDocument};
    use crate::draft::DraftRecord;
    use crate::error::Error;
    use crate::storage::Storage;
    use std::cell::Cell;

    fn controller() -> FormController<Storage> {
        let store = Storage::open_in_memory().unwrap();
        FormController::from_config(store, &Config::default()).unwrap()
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::from(value)
    }

    fn fill_valid(form: &mut FormController<Storage>) {
        form.input(FieldId::IncidentType, text("harassment"));
        form.input(FieldId::Description, text("Repeated messages after I asked them to stop"));
        form.input(FieldId::ReporterName, text("Sam"));
        form.input(FieldId::ReporterEmail, text("sam@example.com"));
    }

    fn rendered(form: &FormController<Storage>) -> InMemoryDocument {
        let mut doc = InMemoryDocument::new();
        doc.apply_all(&form.render());
        doc
    }

    #[test]
    fn test_input_autosaves_every_field() {
        let mut form = controller();
        form.input(FieldId::Description, text("first"));

        let draft = form.store().load("reportForm").unwrap().unwrap();
        assert_eq!(draft.len(), FieldId::ALL.len());
        assert_eq!(draft.text("description"), Some("first"));
        assert_eq!(draft.flag("emergencyContact"), Some(false));

        form.input(FieldId::EmergencyContact, FieldValue::Flag(true));
        let draft = form.store().load("reportForm").unwrap().unwrap();
        assert_eq!(draft.flag("emergencyContact"), Some(true));
    }

    #[test]
    fn test_restore_draft() {
        let store = Storage::open_in_memory().unwrap();
        let record = DraftRecord::new()
            .with("incidentType", "discrimination")
            .with("description", "Restored text")
            .with("anonymous", true);
        store.save("reportForm", &record).unwrap();

        let mut form = FormController::from_config(store, &Config::default()).unwrap();
        assert!(form.restore_draft().unwrap());
        assert_eq!(form.fields().description, "Restored text");
        assert!(form.fields().anonymous);

        let doc = rendered(&form);
        assert!(!doc.is_required("reporterName"));
        assert!(!doc.is_required("reporterEmail"));
        assert!(!doc.is_visible(view::CONTACT_SECTION));
        assert_eq!(doc.value("description"), Some(&text("Restored text")));
    }

    #[test]
    fn test_restore_without_draft() {
        let mut form = controller();
        assert!(!form.restore_draft().unwrap());
        assert_eq!(form.fields(), &ReportFields::default());
    }

    #[test]
    fn test_save_restore_idempotent() {
        let mut form = controller();
        fill_valid(&mut form);
        form.input(FieldId::ConsentToContact, FieldValue::Flag(true));
        let before = form.fields().clone();

        let record = before.to_record();
        assert_eq!(
            form.store().save("reportForm", &record).unwrap(),
            SaveOutcome::Unchanged
        );

        assert!(form.restore_draft().unwrap());
        assert!(form.restore_draft().unwrap());
        assert_eq!(form.fields(), &before);
    }

    #[test]
    fn test_requiredness_tracks_anonymity() {
        let mut form = controller();
        for anonymous in [true, false, true] {
            form.input(FieldId::Anonymous, FieldValue::Flag(anonymous));
            let doc = rendered(&form);
            assert_eq!(form.fields().require_contact(), !anonymous);
            assert_eq!(doc.is_required("reporterName"), !anonymous);
            assert_eq!(doc.is_required("reporterEmail"), !anonymous);
        }
    }

    #[test]
    fn test_anonymity_drops_contact_errors() {
        let mut form = controller();
        assert!(!form.blur(FieldId::ReporterName));
        assert!(!form.blur(FieldId::ReporterEmail));
        assert!(!form.blur(FieldId::IncidentType));

        form.input(FieldId::Anonymous, FieldValue::Flag(true));
        assert!(!form.errors().contains_key(&FieldId::ReporterName));
        assert!(!form.errors().contains_key(&FieldId::ReporterEmail));
        assert!(form.errors().contains_key(&FieldId::IncidentType));
    }

    #[test]
    fn test_blur_sets_and_clears_errors() {
        let mut form = controller();
        form.input(FieldId::Description, text("ab"));
        assert!(!form.blur(FieldId::Description));
        assert_eq!(
            form.errors().get(&FieldId::Description).map(String::as_str),
            Some("Please provide more detail (at least 10 characters)")
        );

        form.input(FieldId::Description, text("abcdefghij"));
        assert!(form.errors().is_empty());
        assert!(form.blur(FieldId::Description));
    }

    #[test]
    fn test_input_clears_only_that_field() {
        let mut form = controller();
        form.input(FieldId::ReporterEmail, text("not-an-email"));
        form.blur(FieldId::ReporterEmail);
        form.blur(FieldId::IncidentType);

        form.input(FieldId::ReporterEmail, text("not-an-email-still"));
        assert!(!form.errors().contains_key(&FieldId::ReporterEmail));
        assert!(form.errors().contains_key(&FieldId::IncidentType));
    }

    #[test]
    fn test_phone_formatted_on_input() {
        let mut form = controller();
        form.input(FieldId::ReporterPhone, text("5551234567"));
        assert_eq!(form.fields().reporter_phone, "(555) 123-4567");

        form.input(FieldId::ReporterPhone, text("+44 20 7946 0958"));
        assert_eq!(form.fields().reporter_phone, "+44 20 7946 0958");
    }

    #[test]
    fn test_phone_formatting_can_be_disabled() {
        let mut config = Config::default();
        config.form.format_phone = false;
        let store = Storage::open_in_memory().unwrap();
        let mut form = FormController::from_config(store, &config).unwrap();

        form.input(FieldId::ReporterPhone, text("5551234567"));
        assert_eq!(form.fields().reporter_phone, "5551234567");
    }

    #[test]
    fn test_wrong_kind_ignored() {
        let mut form = controller();
        assert!(!form.input(FieldId::Anonymous, text("on")));
        assert!(form.store().load("reportForm").unwrap().is_none());
    }

    #[test]
    fn test_submit_rejected_shows_errors() {
        let mut form = controller();
        assert_eq!(form.submit(), SubmitOutcome::Rejected { failures: 4 });
        assert!(form.phase().is_idle());

        let doc = rendered(&form);
        assert_eq!(
            doc.text("incidentTypeError"),
            Some("Please select an incident type")
        );
        assert!(doc.has_class("reporterEmail", view::INVALID_CLASS));
    }

    #[test]
    fn test_anonymous_submit_with_empty_contact() {
        let mut form = controller();
        form.input(FieldId::Anonymous, FieldValue::Flag(true));
        form.input(FieldId::IncidentType, text("other"));
        form.input(FieldId::Description, text("Something happened at work"));

        assert_eq!(form.submit(), SubmitOutcome::Accepted);
        assert!(form.fields().reporter_name.is_empty());
        assert!(form.fields().reporter_email.is_empty());
    }

    #[test]
    fn test_submission_lifecycle() {
        let mut form = controller();
        fill_valid(&mut form);
        assert!(form.store().load("reportForm").unwrap().is_some());

        assert_eq!(form.submit(), SubmitOutcome::Accepted);
        let doc = rendered(&form);
        assert!(doc.is_disabled(view::SUBMIT_BUTTON));
        assert_eq!(doc.text(view::SUBMIT_BUTTON), Some("Submitting..."));

        assert_eq!(form.submit(), SubmitOutcome::Ignored);

        let id = form.complete_submission(Utc::now()).unwrap();
        assert!(regex::Regex::new(r"^SR-\d{8}$").unwrap().is_match(id.as_str()));
        assert!(form.store().load("reportForm").unwrap().is_none());
        assert!(form.complete_submission(Utc::now()).is_none());

        let doc = rendered(&form);
        assert!(!doc.is_visible(view::FORM_ELEMENT));
        assert!(doc.is_visible(view::SUCCESS_VIEW));
        assert_eq!(doc.text(view::REPORT_ID), Some(id.as_str()));

        assert!(form.reset());
        assert_eq!(form.state(), &FormState::default());
        let doc = rendered(&form);
        assert!(doc.is_visible(view::FORM_ELEMENT));
        assert!(!doc.is_visible(view::SUCCESS_VIEW));
        assert!(!doc.is_disabled(view::SUBMIT_BUTTON));
        assert_eq!(doc.text(view::SUBMIT_BUTTON), Some("Submit Report"));
    }

    #[test]
    fn test_reset_requires_completed_submission() {
        let mut form = controller();
        fill_valid(&mut form);
        assert!(!form.reset());
        form.submit();
        assert!(!form.reset());
        assert!(form.phase().is_pending());
    }

    #[test]
    fn test_input_ignored_on_success_view() {
        let mut form = controller();
        fill_valid(&mut form);
        form.submit();
        form.complete_submission(Utc::now());

        assert!(!form.input(FieldId::Description, text("late edit")));
        assert!(form.store().load("reportForm").unwrap().is_none());
    }

    struct FailingStore {
        saves: Cell<usize>,
    }

    fn io_error(message: &str) -> Error {
        std::io::Error::other(message.to_string()).into()
    }

    impl DraftStore for FailingStore {
        fn save(&self, _: &str, _: &DraftRecord) -> Result<SaveOutcome> {
            self.saves.set(self.saves.get() + 1);
            Err(io_error("disk full"))
        }

        fn load(&self, _: &str) -> Result<Option<DraftRecord>> {
            Err(io_error("unreadable"))
        }

        fn clear(&self, _: &str) -> Result<bool> {
            Err(io_error("read-only"))
        }
    }

    #[test]
    fn test_storage_failures_do_not_block_form() {
        crate::logging::init_test_logging();
        let store = FailingStore {
            saves: Cell::new(0),
        };
        let mut form = FormController::from_config(store, &Config::default()).unwrap();

        assert!(form.restore_draft().is_err());

        form.input(FieldId::IncidentType, text("harassment"));
        form.input(FieldId::Description, text("Still works without storage"));
        form.input(FieldId::Anonymous, FieldValue::Flag(true));
        assert_eq!(form.store().saves.get(), 3);

        assert_eq!(form.submit(), SubmitOutcome::Accepted);
        assert!(form.complete_submission(Utc::now()).is_some());
    }
}
