//! Projection of form state onto the page.

use std::collections::BTreeMap;

use crate::document::ViewInstruction;

use super::fields::{CharCounter, FieldId, FieldKind, ReportFields};
use super::submission::SubmitPhase;

/// The form element.
pub const FORM_ELEMENT: &str = "reportForm";
/// Section holding the contact fields.
pub const CONTACT_SECTION: &str = "contactCard";
/// Notice shown when emergency contact is requested. Part of the contact
/// section, so it hides with it.
pub const EMERGENCY_NOTICE: &str = "emergencyNotice";
/// Success view replacing the form after submission.
pub const SUCCESS_VIEW: &str = "successMessage";
/// Element showing the confirmation identifier.
pub const REPORT_ID: &str = "reportId";
/// The submit control.
pub const SUBMIT_BUTTON: &str = "submitButton";
/// Character counter under the description.
pub const DESCRIPTION_COUNTER: &str = "descriptionCounter";

/// Class marking a field that failed validation.
pub const INVALID_CLASS: &str = "invalid";
/// Class marking the counter when the description is close to its maximum.
pub const NEAR_LIMIT_CLASS: &str = "near-limit";

/// Everything the page shows about the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    /// Field values.
    pub fields: ReportFields,
    /// Inline failures currently shown.
    pub errors: BTreeMap<FieldId, String>,
    /// Submission lifecycle.
    pub phase: SubmitPhase,
}

/// Project the full form state into view instructions.
#[must_use]
pub fn render(state: &FormState, description_max_length: usize) -> Vec<ViewInstruction> {
    let fields = &state.fields;
    let require_contact = fields.require_contact();
    let succeeded = state.phase.report_id();

    let mut out = Vec::with_capacity(40);

    // Field values
    for field in FieldId::ALL {
        out.push(ViewInstruction::value(field.name(), fields.get(field)));
    }

    // Required flags and the anonymity toggle's sections
    out.push(ViewInstruction::required(FieldId::IncidentType.name(), true));
    out.push(ViewInstruction::required(FieldId::Description.name(), true));
    out.push(ViewInstruction::required(
        FieldId::ReporterName.name(),
        require_contact,
    ));
    out.push(ViewInstruction::required(
        FieldId::ReporterEmail.name(),
        require_contact,
    ));
    out.push(ViewInstruction::visible(CONTACT_SECTION, require_contact));
    out.push(ViewInstruction::visible(
        EMERGENCY_NOTICE,
        require_contact && fields.emergency_contact,
    ));

    // Inline errors, cleared for fields without one
    for field in FieldId::ALL.into_iter().filter(|f| f.kind() == FieldKind::Text) {
        let error = state.errors.get(&field);
        out.push(ViewInstruction::text(
            field.error_element(),
            error.cloned().unwrap_or_default(),
        ));
        out.push(ViewInstruction::class(
            field.name(),
            INVALID_CLASS,
            error.is_some(),
        ));
    }

    // Character counter
    let counter = CharCounter::new(&fields.description, description_max_length);
    out.push(ViewInstruction::text(DESCRIPTION_COUNTER, counter.label()));
    out.push(ViewInstruction::class(
        DESCRIPTION_COUNTER,
        NEAR_LIMIT_CLASS,
        counter.near_limit(),
    ));

    // Submit button and success view
    out.push(ViewInstruction::disabled(
        SUBMIT_BUTTON,
        !state.phase.is_idle(),
    ));
    out.push(ViewInstruction::text(
        SUBMIT_BUTTON,
        state.phase.submit_label(),
    ));

    out.push(ViewInstruction::visible(FORM_ELEMENT, succeeded.is_none()));
    out.push(ViewInstruction::visible(SUCCESS_VIEW, succeeded.is_some()));
    out.push(ViewInstruction::text(
        REPORT_ID,
        succeeded.map(ToString::to_string).unwrap_or_default(),
    ));

    out
}
