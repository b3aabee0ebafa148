//! The incident-report form's fields.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::draft::{DraftRecord, FieldValue};

/// Every named field on the report form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    /// Incident category select.
    IncidentType,
    /// Free-text description of the incident.
    Description,
    /// Reporter's name.
    ReporterName,
    /// Reporter's email address.
    ReporterEmail,
    /// Reporter's phone number (optional).
    ReporterPhone,
    /// Report anonymously; hides the contact section.
    Anonymous,
    /// Reporter agrees to be contacted.
    ConsentToContact,
    /// Reporter asks for priority contact.
    EmergencyContact,
}

/// Whether a field holds text or a checkbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text input, select or textarea.
    Text,
    /// Checkbox.
    Checkbox,
}

impl FieldId {
    /// All fields, in form order.
    pub const ALL: [FieldId; 8] = [
        Self::IncidentType,
        Self::Description,
        Self::ReporterName,
        Self::ReporterEmail,
        Self::ReporterPhone,
        Self::Anonymous,
        Self::ConsentToContact,
        Self::EmergencyContact,
    ];

    /// The element identity, also used as the draft key.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::IncidentType => "incidentType",
            Self::Description => "description",
            Self::ReporterName => "reporterName",
            Self::ReporterEmail => "reporterEmail",
            Self::ReporterPhone => "reporterPhone",
            Self::Anonymous => "anonymous",
            Self::ConsentToContact => "consentToContact",
            Self::EmergencyContact => "emergencyContact",
        }
    }

    /// Whether the field is text or a checkbox.
    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Anonymous | Self::ConsentToContact | Self::EmergencyContact => {
                FieldKind::Checkbox
            }
            _ => FieldKind::Text,
        }
    }

    /// Whether the field lives in the contact section.
    #[must_use]
    pub fn is_contact(self) -> bool {
        matches!(
            self,
            Self::ReporterName | Self::ReporterEmail | Self::ReporterPhone
        )
    }

    /// Identity of the element showing this field's error message.
    #[must_use]
    pub fn error_element(self) -> String {
        format!("{}Error", self.name())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}

/// Current values of every report field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFields {
    /// Selected incident category; empty when unselected.
    pub incident_type: String,
    /// Incident description.
    pub description: String,
    /// Reporter's name.
    pub reporter_name: String,
    /// Reporter's email address.
    pub reporter_email: String,
    /// Reporter's phone number.
    pub reporter_phone: String,
    /// Report anonymously.
    pub anonymous: bool,
    /// Consent to be contacted.
    pub consent_to_contact: bool,
    /// Request emergency contact.
    pub emergency_contact: bool,
}

impl ReportFields {
    /// Contact details are required unless the report is anonymous.
    #[must_use]
    pub fn require_contact(&self) -> bool {
        !self.anonymous
    }

    /// Text value of a text field; `None` for checkboxes.
    #[must_use]
    pub fn text(&self, field: FieldId) -> Option<&str> {
        match field {
            FieldId::IncidentType => Some(&self.incident_type),
            FieldId::Description => Some(&self.description),
            FieldId::ReporterName => Some(&self.reporter_name),
            FieldId::ReporterEmail => Some(&self.reporter_email),
            FieldId::ReporterPhone => Some(&self.reporter_phone),
            FieldId::Anonymous | FieldId::ConsentToContact | FieldId::EmergencyContact => None,
        }
    }

    /// Current value of a field.
    #[must_use]
    pub fn get(&self, field: FieldId) -> FieldValue {
        match field {
            FieldId::Anonymous => FieldValue::Flag(self.anonymous),
            FieldId::ConsentToContact => FieldValue::Flag(self.consent_to_contact),
            FieldId::EmergencyContact => FieldValue::Flag(self.emergency_contact),
            text => FieldValue::Text(self.text(text).unwrap_or_default().to_string()),
        }
    }

    /// Set a field. Returns `false` and leaves the field untouched when the
    /// value's kind doesn't match the field's.
    pub fn set(&mut self, field: FieldId, value: FieldValue) -> bool {
        match (field, value) {
            (FieldId::Anonymous, FieldValue::Flag(flag)) => self.anonymous = flag,
            (FieldId::ConsentToContact, FieldValue::Flag(flag)) => self.consent_to_contact = flag,
            (FieldId::EmergencyContact, FieldValue::Flag(flag)) => self.emergency_contact = flag,
            (FieldId::IncidentType, FieldValue::Text(text)) => self.incident_type = text,
            (FieldId::Description, FieldValue::Text(text)) => self.description = text,
            (FieldId::ReporterName, FieldValue::Text(text)) => self.reporter_name = text,
            (FieldId::ReporterEmail, FieldValue::Text(text)) => self.reporter_email = text,
            (FieldId::ReporterPhone, FieldValue::Text(text)) => self.reporter_phone = text,
            _ => return false,
        }
        true
    }

    /// Snapshot every field into a draft record.
    #[must_use]
    pub fn to_record(&self) -> DraftRecord {
        let mut record = DraftRecord::new();
        for field in FieldId::ALL {
            record.insert(field.name(), self.get(field));
        }
        record
    }

    /// Restore values from a draft, verbatim.
    ///
    /// Fields absent from the record keep their current value. Unknown keys
    /// and values of the wrong kind are skipped. Returns the number of fields
    /// restored.
    pub fn restore(&mut self, record: &DraftRecord) -> usize {
        let mut restored = 0;
        for (name, value) in record.iter() {
            let Ok(field) = name.parse::<FieldId>() else {
                debug!(field = name, "Skipping unknown draft field");
                continue;
            };
            if self.set(field, value.clone()) {
                restored += 1;
            } else {
                warn!(field = name, "Skipping draft value of the wrong kind");
            }
        }
        restored
    }
}

/// Reformat a phone number from its digits as the user types.
///
/// Produces `(AAA) BBB-CCCC` once six or more digits are present,
/// `(AAA) B..` for four or five, and the bare digits below that. At most ten
/// digits are kept. Values starting with `+` are left alone.
#[must_use]
pub fn format_phone_number(input: &str) -> String {
    if input.trim_start().starts_with('+') {
        return input.to_string();
    }

    let digits: String = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(10)
        .collect();

    match digits.len() {
        0..=3 => digits,
        4..=5 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

/// The description's character counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCounter {
    /// Characters typed so far.
    pub current: usize,
    /// Display maximum.
    pub max: usize,
}

impl CharCounter {
    /// Count the characters of `text` against `max`.
    #[must_use]
    pub fn new(text: &str, max: usize) -> Self {
        Self {
            current: text.chars().count(),
            max,
        }
    }

    /// Counter label, e.g. `"12/2000 characters"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{} characters", self.current, self.max)
    }

    /// More than 90% of the maximum is used.
    #[must_use]
    pub fn near_limit(&self) -> bool {
        self.current * 10 > self.max * 9
    }
}
