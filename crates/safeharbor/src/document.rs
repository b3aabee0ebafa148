//! The page document as seen by the controllers.
//!
//! Controllers never touch elements directly. They project their state into a
//! list of [`ViewInstruction`]s and a [`Document`] adapter applies them. The
//! projection is always complete, so applying it twice is harmless.

use std::collections::{BTreeMap, BTreeSet};

use crate::draft::FieldValue;

/// A single change to an element of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewInstruction {
    /// Show or hide an element.
    SetVisible {
        /// Element identity.
        element: String,
        /// Whether the element is displayed.
        visible: bool,
    },
    /// Add or remove a class on an element.
    SetClass {
        /// Element identity.
        element: String,
        /// Class name.
        class: String,
        /// Whether the class is present.
        enabled: bool,
    },
    /// Set or lift the `required` constraint on an input.
    SetRequired {
        /// Element identity.
        element: String,
        /// Whether the input is required.
        required: bool,
    },
    /// Enable or disable a control.
    SetDisabled {
        /// Element identity.
        element: String,
        /// Whether the control is disabled.
        disabled: bool,
    },
    /// Replace an element's text content.
    SetText {
        /// Element identity.
        element: String,
        /// New text content.
        text: String,
    },
    /// Set an input's value or a checkbox's state.
    SetValue {
        /// Element identity.
        element: String,
        /// New value.
        value: FieldValue,
    },
}

impl ViewInstruction {
    /// Build a [`ViewInstruction::SetVisible`].
    #[must_use]
    pub fn visible(element: impl Into<String>, visible: bool) -> Self {
        Self::SetVisible {
            element: element.into(),
            visible,
        }
    }

    /// Build a [`ViewInstruction::SetClass`].
    #[must_use]
    pub fn class(element: impl Into<String>, class: impl Into<String>, enabled: bool) -> Self {
        Self::SetClass {
            element: element.into(),
            class: class.into(),
            enabled,
        }
    }

    /// Build a [`ViewInstruction::SetRequired`].
    #[must_use]
    pub fn required(element: impl Into<String>, required: bool) -> Self {
        Self::SetRequired {
            element: element.into(),
            required,
        }
    }

    /// Build a [`ViewInstruction::SetDisabled`].
    #[must_use]
    pub fn disabled(element: impl Into<String>, disabled: bool) -> Self {
        Self::SetDisabled {
            element: element.into(),
            disabled,
        }
    }

    /// Build a [`ViewInstruction::SetText`].
    #[must_use]
    pub fn text(element: impl Into<String>, text: impl Into<String>) -> Self {
        Self::SetText {
            element: element.into(),
            text: text.into(),
        }
    }

    /// Build a [`ViewInstruction::SetValue`].
    #[must_use]
    pub fn value(element: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::SetValue {
            element: element.into(),
            value: value.into(),
        }
    }

    /// The element this instruction targets.
    #[must_use]
    pub fn element(&self) -> &str {
        match self {
            Self::SetVisible { element, .. }
            | Self::SetClass { element, .. }
            | Self::SetRequired { element, .. }
            | Self::SetDisabled { element, .. }
            | Self::SetText { element, .. }
            | Self::SetValue { element, .. } => element,
        }
    }
}

/// Adapter that applies view instructions to a concrete page.
pub trait Document {
    /// Apply one instruction. Adapters skip elements the page lacks.
    fn apply(&mut self, instruction: &ViewInstruction);

    /// Apply a full projection in order.
    fn apply_all(&mut self, instructions: &[ViewInstruction]) {
        for instruction in instructions {
            self.apply(instruction);
        }
    }
}

/// Observable state of one element in an [`InMemoryDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementState {
    /// Whether the element is displayed.
    pub visible: bool,
    /// Classes currently on the element.
    pub classes: BTreeSet<String>,
    /// Whether the input carries the `required` constraint.
    pub required: bool,
    /// Whether the control is disabled.
    pub disabled: bool,
    /// Text content, if any was set.
    pub text: Option<String>,
    /// Input value, if any was set.
    pub value: Option<FieldValue>,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            visible: true,
            classes: BTreeSet::new(),
            required: false,
            disabled: false,
            text: None,
            value: None,
        }
    }
}

/// A document kept in memory.
///
/// Used by the CLI and by tests. Elements are created on first use, so every
/// instruction lands.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocument {
    elements: BTreeMap<String, ElementState>,
}

impl InMemoryDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an element.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&ElementState> {
        self.elements.get(id)
    }

    /// Whether an element is displayed. Unknown elements are not.
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.element(id).is_some_and(|el| el.visible)
    }

    /// Whether an element carries a class.
    #[must_use]
    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.classes.contains(class))
    }

    /// Whether an input is required.
    #[must_use]
    pub fn is_required(&self, id: &str) -> bool {
        self.element(id).is_some_and(|el| el.required)
    }

    /// Whether a control is disabled.
    #[must_use]
    pub fn is_disabled(&self, id: &str) -> bool {
        self.element(id).is_some_and(|el| el.disabled)
    }

    /// An element's text content.
    #[must_use]
    pub fn text(&self, id: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.text.as_deref())
    }

    /// An input's value.
    #[must_use]
    pub fn value(&self, id: &str) -> Option<&FieldValue> {
        self.element(id).and_then(|el| el.value.as_ref())
    }

    /// Elements carrying `class`, in id order.
    #[must_use]
    pub fn elements_with_class(&self, class: &str) -> Vec<&str> {
        self.elements
            .iter()
            .filter(|(_, el)| el.classes.contains(class))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

impl Document for InMemoryDocument {
    fn apply(&mut self, instruction: &ViewInstruction) {
        let el = self
            .elements
            .entry(instruction.element().to_string())
            .or_default();

        match instruction {
            ViewInstruction::SetVisible { visible, .. } => el.visible = *visible,
            ViewInstruction::SetClass { class, enabled, .. } => {
                if *enabled {
                    el.classes.insert(class.clone());
                } else {
                    el.classes.remove(class);
                }
            }
            ViewInstruction::SetRequired { required, .. } => el.required = *required,
            ViewInstruction::SetDisabled { disabled, .. } => el.disabled = *disabled,
            ViewInstruction::SetText { text, .. } => el.text = Some(text.clone()),
            ViewInstruction::SetValue { value, .. } => el.value = Some(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_document_creates_elements() {
        let mut doc = InMemoryDocument::new();
        doc.apply(&ViewInstruction::visible("contactCard", false));
        doc.apply(&ViewInstruction::required("reporterName", true));

        assert!(!doc.is_visible("contactCard"));
        assert!(doc.is_required("reporterName"));
        assert!(doc.element("contactCard").is_some());
    }

    #[test]
    fn test_class_toggle() {
        let mut doc = InMemoryDocument::new();
        doc.apply(&ViewInstruction::class("indicator-1", "active", true));
        assert_eq!(doc.elements_with_class("active"), vec!["indicator-1"]);

        doc.apply(&ViewInstruction::class("indicator-1", "active", false));
        assert!(doc.elements_with_class("active").is_empty());
    }

    #[test]
    fn test_text_value_and_disabled() {
        let mut doc = InMemoryDocument::new();
        doc.apply_all(&[
            ViewInstruction::text("reportId", "SR-12345678"),
            ViewInstruction::value("anonymous", true),
            ViewInstruction::disabled("submitButton", true),
        ]);

        assert_eq!(doc.text("reportId"), Some("SR-12345678"));
        assert_eq!(doc.value("anonymous"), Some(&FieldValue::Flag(true)));
        assert!(doc.is_disabled("submitButton"));
    }

    #[test]
    fn test_unknown_element_queries() {
        let doc = InMemoryDocument::new();
        assert!(!doc.is_visible("missing"));
        assert!(!doc.has_class("missing", "active"));
        assert!(doc.text("missing").is_none());
    }

    #[test]
    fn test_instruction_element() {
        assert_eq!(ViewInstruction::text("a", "b").element(), "a");
        assert_eq!(ViewInstruction::class("c", "d", true).element(), "c");
    }
}
