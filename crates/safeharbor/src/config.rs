//! Settings for the form, the slider and the draft store.
//!
//! Layered with figment: built-in defaults, then `config.toml`, then
//! `SAFEHARBOR_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory under the platform config and data dirs.
const DATA_DIR_NAME: &str = "safeharbor";

const DATABASE_FILE_NAME: &str = "drafts.db";

/// Default email pattern: `local@domain.tld`, no whitespace.
pub const DEFAULT_EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Default phone pattern, applied after stripping spaces, dashes, dots and
/// parentheses.
pub const DEFAULT_PHONE_PATTERN: &str = r"^\+?[0-9]{7,15}$";

/// Everything `harbor` and the page controllers can be tuned with.
///
/// Environment variables beat the TOML file, which beats the defaults.
/// Nested keys use `__`, so `SAFEHARBOR_FORM__SUBMIT_DELAY_MS=500` sets
/// `form.submit_delay_ms`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where drafts are kept.
    pub storage: StorageConfig,
    /// Report form configuration.
    pub form: FormConfig,
    /// Field validation configuration.
    pub validation: ValidationConfig,
    /// Resources slider configuration.
    pub slider: SliderConfig,
}

/// Draft store location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the draft database file.
    /// Defaults to `~/.local/share/safeharbor/drafts.db`
    pub database_path: Option<PathBuf>,
}

/// Report form configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Identity under which the form's draft is persisted.
    pub form_id: String,
    /// Simulated submission latency in milliseconds.
    pub submit_delay_ms: u64,
    /// How long the success view stays up before the form resets, in milliseconds.
    pub reset_delay_ms: u64,
    /// Minimum description length enforced on blur.
    pub min_description_length: usize,
    /// Description length shown by the character counter.
    pub description_max_length: usize,
    /// Reformat the phone field as the user types.
    pub format_phone: bool,
}

/// Field validation patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Regex an email address must match.
    pub email_pattern: String,
    /// Regex a phone number (separators stripped) must match.
    pub phone_pattern: String,
}

/// Slider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    /// Auto-advance period in milliseconds.
    pub auto_advance_ms: u64,
    /// Minimum horizontal travel for a touch gesture to count as a swipe.
    pub swipe_threshold_px: f64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form_id: "reportForm".to_string(),
            submit_delay_ms: 2_000,
            reset_delay_ms: 5_000,
            min_description_length: 10,
            description_max_length: 2_000,
            format_phone: true,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            email_pattern: DEFAULT_EMAIL_PATTERN.to_string(),
            phone_pattern: DEFAULT_PHONE_PATTERN.to_string(),
        }
    }
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            auto_advance_ms: 8_000,
            swipe_threshold_px: 50.0,
        }
    }
}

impl Config {
    /// Load from `config_path`, or the default location when `None`, and
    /// validate the result. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a source can't be parsed or a value is invalid.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        // Later providers override earlier ones
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("SAFEHARBOR_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// `~/.config/safeharbor/config.toml` or the platform equivalent.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Directory holding the draft database by default.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Check values the controllers rely on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if self.form.form_id.trim().is_empty() {
            return Err(Error::config_validation("form_id must not be empty"));
        }

        for (name, millis) in [
            ("submit_delay_ms", self.form.submit_delay_ms),
            ("reset_delay_ms", self.form.reset_delay_ms),
            ("auto_advance_ms", self.slider.auto_advance_ms),
        ] {
            if millis == 0 {
                return Err(Error::config_validation(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        if self.form.description_max_length < self.form.min_description_length {
            return Err(Error::config_validation(format!(
                "description_max_length ({}) cannot be less than min_description_length ({})",
                self.form.description_max_length, self.form.min_description_length
            )));
        }

        let threshold = self.slider.swipe_threshold_px;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(Error::config_validation(
                "swipe_threshold_px must be greater than 0",
            ));
        }

        for pattern in [
            &self.validation.email_pattern,
            &self.validation.phone_pattern,
        ] {
            if regex::Regex::new(pattern).is_err() {
                return Err(Error::config_validation(format!(
                    "invalid regex pattern: {pattern}"
                )));
            }
        }

        Ok(())
    }

    /// The configured database path, or the default one.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the simulated submission latency.
    #[must_use]
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.form.submit_delay_ms)
    }

    /// Get the delay before a submitted form resets.
    #[must_use]
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.form.reset_delay_ms)
    }

    /// Get the slider auto-advance period.
    #[must_use]
    pub fn auto_advance_interval(&self) -> Duration {
        Duration::from_millis(self.slider.auto_advance_ms)
    }
}
