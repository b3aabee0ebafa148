//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Subcommand};

use crate::slider::{Key, SliderInput};

/// Draft management commands.
#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Show the stored draft
    Show {
        /// Form identity (defaults to the configured form)
        #[arg(short, long)]
        form: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List every stored draft
    List,

    /// Delete the stored draft
    Clear {
        /// Form identity (defaults to the configured form)
        #[arg(short, long)]
        form: Option<String>,
    },
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Read the draft from a JSON file instead of the store
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Form identity (defaults to the configured form)
    #[arg(long)]
    pub form: Option<String>,
}

/// Submit command arguments.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Read the draft from a JSON file instead of the store
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Form identity (defaults to the configured form)
    #[arg(long)]
    pub form: Option<String>,
}

/// Slides command arguments.
#[derive(Debug, Args)]
pub struct SlidesCommand {
    /// Number of panels
    #[arg(short, long, default_value = "4")]
    pub panels: usize,

    /// Inputs to apply: next, prev, left, right, tick, goto:N, swipe:START:END
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<SlideStep>,
}

/// Resource directory commands.
#[derive(Debug, Subcommand)]
pub enum ResourcesCommand {
    /// Show cards containing a term
    Search {
        /// Search term (empty shows every card)
        #[arg(default_value = "")]
        term: String,

        /// JSON file holding the card list
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Show cards in a category
    Filter {
        /// Category name, or "all"
        category: String,

        /// JSON file holding the card list
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to config file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// One step given to `slides`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlideStep {
    /// A single slider input.
    Input(SliderInput),
    /// A touch gesture from one x coordinate to another.
    Swipe {
        /// Where the touch began.
        start: f64,
        /// Where it ended.
        end: f64,
    },
}

impl SlideStep {
    /// The slider inputs this step expands to.
    #[must_use]
    pub fn inputs(&self) -> Vec<SliderInput> {
        match *self {
            Self::Input(input) => vec![input],
            Self::Swipe { start, end } => {
                vec![SliderInput::TouchStart(start), SliderInput::TouchEnd(end)]
            }
        }
    }
}

impl fmt::Display for SlideStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Input(SliderInput::Key(Key::ArrowLeft)) => "left".to_string(),
            Self::Input(SliderInput::Key(Key::ArrowRight)) => "right".to_string(),
            Self::Input(input) => input.to_string(),
            Self::Swipe { start, end } => format!("swipe:{start}:{end}"),
        };
        f.pad(&text)
    }
}

impl FromStr for SlideStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = |value: &str| {
            value
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| format!("invalid coordinate: {value}"))
        };

        let step = match s.split(':').collect::<Vec<_>>().as_slice() {
            ["next"] => Self::Input(SliderInput::Next),
            ["prev"] => Self::Input(SliderInput::Previous),
            ["left"] => Self::Input(SliderInput::Key(Key::ArrowLeft)),
            ["right"] => Self::Input(SliderInput::Key(Key::ArrowRight)),
            ["tick"] => Self::Input(SliderInput::Tick),
            ["goto", position] => Self::Input(SliderInput::Indicator(
                position
                    .parse()
                    .map_err(|_| format!("invalid position: {position}"))?,
            )),
            ["swipe", start, end] => Self::Swipe {
                start: number(*start)?,
                end: number(*end)?,
            },
            _ => return Err(format!("unknown slider input: {s}")),
        };
        Ok(step)
    }
}
