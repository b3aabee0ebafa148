//! `safeharbor` - Interactivity for a support website's report form and
//! resources page
//!
//! This library provides the incident-report form controller (validation,
//! draft autosave and a simulated submission) and the resources page slider
//! and directory. Controllers are pure state machines; a [`Document`] adapter
//! applies the view instructions they render.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod document;
pub mod draft;
pub mod error;
pub mod form;
pub mod logging;
pub mod resources;
pub mod scheduler;
pub mod slider;
pub mod storage;

pub use config::Config;
pub use document::{Document, InMemoryDocument, ViewInstruction};
pub use draft::{DraftRecord, FieldValue};
pub use error::{Error, Result};
pub use form::{FormController, FormEvent, FormPage};
pub use logging::init_logging;
pub use resources::ResourceDirectory;
pub use scheduler::{Scheduler, TaskHandle};
pub use slider::{SliderController, SliderEvent, SliderPage};
pub use storage::{DraftStore, Storage};
