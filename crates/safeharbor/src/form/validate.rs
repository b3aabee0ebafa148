//! Field validation for the report form.
//!
//! Failures are `(field, message)` pairs shown inline next to the field; they
//! never leave the form.

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::{Config, ValidationConfig};
use crate::error::{Error, Result};

use super::fields::{FieldId, ReportFields};

/// Shown when no incident category is selected.
pub const MSG_SELECT_INCIDENT: &str = "Please select an incident type";
/// Shown when the description is empty.
pub const MSG_DESCRIBE_INCIDENT: &str = "Please provide a description of the incident";
/// Shown when the name is missing on a non-anonymous report.
pub const MSG_NAME_REQUIRED: &str = "Name is required for non-anonymous reports";
/// Shown when the email is missing on a non-anonymous report.
pub const MSG_EMAIL_REQUIRED: &str = "Email is required for non-anonymous reports";
/// Shown when the email doesn't look like `local@domain.tld`.
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
/// Shown when the phone number doesn't look like one.
pub const MSG_INVALID_PHONE: &str = "Please enter a valid phone number";

/// Shown on blur when the description is shorter than `min` characters.
#[must_use]
pub fn more_detail_message(min: usize) -> String {
    format!("Please provide more detail (at least {min} characters)")
}

/// When a check runs. Blur checks are stricter about description length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// The user left a single field.
    Blur,
    /// The whole form is being submitted.
    Submit,
}

/// Outcome of validating the whole form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<FieldId, String>,
}

impl ValidationReport {
    /// No field failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message for a failed field.
    #[must_use]
    pub fn error(&self, field: FieldId) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// All failures, in form order.
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<FieldId, String> {
        &self.errors
    }

    /// Consume the report, yielding its failures.
    #[must_use]
    pub fn into_errors(self) -> BTreeMap<FieldId, String> {
        self.errors
    }
}

/// Checks field values against the form's rules.
#[derive(Debug, Clone)]
pub struct Validator {
    email: Regex,
    phone: Regex,
    min_description_length: usize,
}

impl Validator {
    /// Build a validator from patterns and the blur-time description minimum.
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern fails to compile.
    pub fn new(patterns: &ValidationConfig, min_description_length: usize) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::config_validation(format!("invalid regex pattern: {e}")))
        };

        Ok(Self {
            email: compile(&patterns.email_pattern)?,
            phone: compile(&patterns.phone_pattern)?,
            min_description_length,
        })
    }

    /// Build a validator from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern fails to compile.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.validation, config.form.min_description_length)
    }

    /// Check an email address.
    #[must_use]
    pub fn is_valid_email(&self, email: &str) -> bool {
        self.email.is_match(email.trim())
    }

    /// Check a phone number, ignoring spaces, dashes, dots and parentheses.
    #[must_use]
    pub fn is_valid_phone(&self, phone: &str) -> bool {
        let compact: String = phone
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.'))
            .collect();
        self.phone.is_match(&compact)
    }

    /// Check one field. Returns the failure message, if any.
    ///
    /// Contact fields are not checked on anonymous reports: the contact
    /// section is hidden, so a failure there could never be corrected.
    #[must_use]
    pub fn check(&self, field: FieldId, fields: &ReportFields, mode: CheckMode) -> Option<String> {
        if field.is_contact() && !fields.require_contact() {
            return None;
        }

        let value = fields.text(field)?.trim();

        let message = match field {
            FieldId::IncidentType if value.is_empty() => MSG_SELECT_INCIDENT,
            FieldId::Description if value.is_empty() => MSG_DESCRIBE_INCIDENT,
            FieldId::Description
                if mode == CheckMode::Blur
                    && value.chars().count() < self.min_description_length =>
            {
                return Some(more_detail_message(self.min_description_length));
            }
            FieldId::ReporterName if value.is_empty() => MSG_NAME_REQUIRED,
            FieldId::ReporterEmail if value.is_empty() => MSG_EMAIL_REQUIRED,
            FieldId::ReporterEmail if !self.is_valid_email(value) => MSG_INVALID_EMAIL,
            FieldId::ReporterPhone if !value.is_empty() && !self.is_valid_phone(value) => {
                MSG_INVALID_PHONE
            }
            _ => return None,
        };
        Some(message.to_string())
    }

    /// Validate a single field when the user leaves it.
    #[must_use]
    pub fn validate_field(&self, field: FieldId, fields: &ReportFields) -> Option<String> {
        self.check(field, fields, CheckMode::Blur)
    }

    /// Validate every field for submission.
    #[must_use]
    pub fn validate_all(&self, fields: &ReportFields) -> ValidationReport {
        let errors = FieldId::ALL
            .into_iter()
            .filter_map(|field| {
                self.check(field, fields, CheckMode::Submit)
                    .map(|message| (field, message))
            })
            .collect();
        ValidationReport { errors }
    }
}
