//! Content slider controller.
//!
//! A slider cycles through a fixed, non-empty list of panels. Exactly one
//! panel and its indicator are active at any time. Navigation wraps in both
//! directions.

pub mod page;
pub mod swipe;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::config::Config;
use crate::document::ViewInstruction;
use crate::error::{Error, Result};

pub use page::{SliderEvent, SliderPage};
pub use swipe::SwipeTracker;

/// Class marking the active panel and indicator.
pub const ACTIVE_CLASS: &str = "active";

/// Element identity of the panel at `index`.
#[must_use]
pub fn slide_element(index: usize) -> String {
    format!("slide-{index}")
}

/// Element identity of the indicator for the panel at `index`.
#[must_use]
pub fn indicator_element(index: usize) -> String {
    format!("indicator-{index}")
}

/// Index of the active panel.
///
/// Always in `[0, count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideState {
    current: usize,
    count: usize,
}

impl SlideState {
    /// Start at the first of `count` panels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPanels`] if `count` is zero.
    pub fn new(name: &str, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::NoPanels {
                name: name.to_string(),
            });
        }
        Ok(Self { current: 0, count })
    }

    /// Index of the active panel.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of panels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Move by `step` panels, wrapping at both ends.
    pub fn advance(&mut self, step: isize) {
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let next = (self.current as isize + step).rem_euclid(self.count as isize) as usize;
        self.current = next;
    }

    /// Jump to `index`. Returns `false` and stays put if it's out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.count {
            return false;
        }
        self.current = index;
        true
    }
}

/// Keyboard keys the slider cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Previous panel.
    ArrowLeft,
    /// Next panel.
    ArrowRight,
    /// Anything else; ignored.
    Other,
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            _ => Self::Other,
        })
    }
}

/// One thing the user or a timer did to the slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderInput {
    /// The next-panel control.
    Next,
    /// The previous-panel control.
    Previous,
    /// An indicator click, by 1-based position.
    Indicator(usize),
    /// A key press.
    Key(Key),
    /// A touch began at this x coordinate.
    TouchStart(f64),
    /// A touch ended at this x coordinate.
    TouchEnd(f64),
    /// The auto-advance timer fired.
    Tick,
}

impl fmt::Display for SliderInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Previous => write!(f, "prev"),
            Self::Indicator(position) => write!(f, "goto:{position}"),
            Self::Key(key) => write!(f, "key:{key:?}"),
            Self::TouchStart(x) => write!(f, "touchstart:{x}"),
            Self::TouchEnd(x) => write!(f, "touchend:{x}"),
            Self::Tick => write!(f, "tick"),
        }
    }
}

/// The slider's controller.
#[derive(Debug, Clone)]
pub struct SliderController {
    name: String,
    state: SlideState,
    swipe: SwipeTracker,
}

impl SliderController {
    /// Create a controller over `count` panels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPanels`] if `count` is zero.
    pub fn new(name: impl Into<String>, count: usize, swipe_threshold: f64) -> Result<Self> {
        let name = name.into();
        let state = SlideState::new(&name, count)?;
        Ok(Self {
            name,
            state,
            swipe: SwipeTracker::new(swipe_threshold),
        })
    }

    /// Create a controller using the configured swipe threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPanels`] if `count` is zero.
    pub fn from_config(name: impl Into<String>, count: usize, config: &Config) -> Result<Self> {
        Self::new(name, count, config.slider.swipe_threshold_px)
    }

    /// Apply one input. Returns `true` if the active panel changed.
    pub fn handle(&mut self, input: SliderInput) -> bool {
        let before = self.state.current();

        match input {
            SliderInput::Next | SliderInput::Tick | SliderInput::Key(Key::ArrowRight) => {
                self.state.advance(1);
            }
            SliderInput::Previous | SliderInput::Key(Key::ArrowLeft) => self.state.advance(-1),
            SliderInput::Key(Key::Other) => {}
            SliderInput::Indicator(position) => {
                // Indicators are numbered from 1
                let moved = position
                    .checked_sub(1)
                    .is_some_and(|index| self.state.jump_to(index));
                if !moved {
                    debug!(slider = %self.name, position, "Ignoring out-of-range indicator");
                }
            }
            SliderInput::TouchStart(x) => self.swipe.start(x),
            SliderInput::TouchEnd(x) => {
                // Short or unpaired gestures yield no step
                if let Some(step) = self.swipe.end(x) {
                    self.state.advance(step);
                }
            }
        }

        let changed = self.state.current() != before;
        if changed {
            trace!(slider = %self.name, %input, current = self.state.current(), "Slide changed");
        }
        changed
    }

    /// Project the active panel into view instructions, one per panel and
    /// indicator.
    #[must_use]
    pub fn render(&self) -> Vec<ViewInstruction> {
        let current = self.state.current();
        (0..self.state.count())
            .flat_map(|index| {
                let active = index == current;
                [
                    ViewInstruction::class(slide_element(index), ACTIVE_CLASS, active),
                    ViewInstruction::class(indicator_element(index), ACTIVE_CLASS, active),
                ]
            })
            .collect()
    }

    /// Current position.
    #[must_use]
    pub fn state(&self) -> SlideState {
        self.state
    }

    /// Slider name, used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, InMemoryDocument};

    fn slider(count: usize) -> SliderController {
        SliderController::new("tips", count, 50.0).unwrap()
    }

    #[test]
    fn test_zero_panels_rejected() {
        let err = SliderController::new("tips", 0, 50.0).unwrap_err();
        assert!(matches!(err, Error::NoPanels { ref name } if name == "tips"));
    }

    #[test]
    fn test_wraps_backwards() {
        let mut state = SlideState::new("tips", 4).unwrap();
        state.advance(-1);
        assert_eq!(state.current(), 3);
    }

    #[test]
    fn test_wraps_forwards() {
        let mut state = SlideState::new("tips", 4).unwrap();
        for _ in 0..4 {
            state.advance(1);
        }
        assert_eq!(state.current(), 0);
    }

    #[test]
    fn test_advance_is_total_and_reversible() {
        for count in 1..=6 {
            for start in 0..count {
                for step in [-1, 1] {
                    let mut state = SlideState::new("tips", count).unwrap();
                    assert!(state.jump_to(start));

                    state.advance(step);
                    assert!(state.current() < count);
                    state.advance(-step);
                    assert_eq!(state.current(), start);
                }
            }
        }
    }

    #[test]
    fn test_jump_out_of_range_is_noop() {
        let mut state = SlideState::new("tips", 3).unwrap();
        assert!(state.jump_to(2));
        assert!(!state.jump_to(3));
        assert_eq!(state.current(), 2);
    }

    #[test]
    fn test_indicator_is_one_based() {
        let mut slider = slider(4);
        assert!(slider.handle(SliderInput::Indicator(3)));
        assert_eq!(slider.state().current(), 2);

        assert!(!slider.handle(SliderInput::Indicator(0)));
        assert!(!slider.handle(SliderInput::Indicator(5)));
        assert_eq!(slider.state().current(), 2);
    }

    #[test]
    fn test_keyboard() {
        let mut slider = slider(3);
        slider.handle(SliderInput::Key("ArrowLeft".parse().unwrap()));
        assert_eq!(slider.state().current(), 2);
        slider.handle(SliderInput::Key("ArrowRight".parse().unwrap()));
        assert_eq!(slider.state().current(), 0);
        assert!(!slider.handle(SliderInput::Key("Enter".parse().unwrap())));
    }

    #[test]
    fn test_swipe_inputs() {
        let mut slider = slider(3);
        slider.handle(SliderInput::TouchStart(400.0));
        assert!(slider.handle(SliderInput::TouchEnd(100.0)));
        assert_eq!(slider.state().current(), 1);

        slider.handle(SliderInput::TouchStart(100.0));
        assert!(slider.handle(SliderInput::TouchEnd(400.0)));
        assert_eq!(slider.state().current(), 0);

        assert!(!slider.handle(SliderInput::TouchEnd(0.0)));
    }

    #[test]
    fn test_single_panel_stays_put() {
        let mut slider = slider(1);
        assert!(!slider.handle(SliderInput::Next));
        assert!(!slider.handle(SliderInput::Previous));
        assert_eq!(slider.state().current(), 0);
    }

    #[test]
    fn test_exactly_one_active() {
        let mut slider = slider(4);
        let mut doc = InMemoryDocument::new();

        for input in [SliderInput::Tick, SliderInput::Previous, SliderInput::Previous] {
            slider.handle(input);
            doc.apply_all(&slider.render());

            let current = slider.state().current();
            assert_eq!(
                doc.elements_with_class(ACTIVE_CLASS),
                vec![indicator_element(current), slide_element(current)]
            );
        }
    }
}
