//! Event loop running a slider on a page, with auto-advance.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::document::Document;
use crate::scheduler::{Scheduler, TaskHandle};

use super::{SliderController, SliderInput};

/// Everything that can happen to the slider page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderEvent {
    /// User or timer input.
    Input(SliderInput),
    /// The page is going away.
    Shutdown,
}

/// A slider controller wired to a document and an auto-advance timer.
#[derive(Debug)]
pub struct SliderPage<D> {
    controller: SliderController,
    document: D,
    scheduler: Scheduler<SliderEvent>,
    period: Duration,
    auto_advance: Option<TaskHandle>,
}

impl<D: Document> SliderPage<D> {
    /// Wire `controller` to `document`, auto-advancing every `period`.
    #[must_use]
    pub fn new(
        controller: SliderController,
        document: D,
        scheduler: Scheduler<SliderEvent>,
        period: Duration,
    ) -> Self {
        Self {
            controller,
            document,
            scheduler,
            period,
            auto_advance: None,
        }
    }

    /// Render the first panel and start auto-advancing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(&mut self) {
        self.render();
        if self.auto_advance.is_none() {
            let handle = self
                .scheduler
                .every(self.period, || SliderEvent::Input(SliderInput::Tick));
            self.auto_advance = Some(handle);
        }
        debug!(
            slider = self.controller.name(),
            period_ms = self.period.as_millis(),
            "Auto-advance started"
        );
    }

    /// Handle one event. Returns `false` once the page should stop.
    pub fn handle(&mut self, event: SliderEvent) -> bool {
        match event {
            SliderEvent::Input(input) => {
                if self.controller.handle(input) {
                    self.render();
                }
                true
            }
            SliderEvent::Shutdown => {
                self.shutdown();
                false
            }
        }
    }

    /// Process events until [`SliderEvent::Shutdown`].
    ///
    /// The page posts its own ticks through its scheduler, so the channel
    /// stays open for as long as the page lives. Dropping every other sender
    /// does not end the loop; only a shutdown event does.
    pub async fn run(&mut self, events: &mut mpsc::UnboundedReceiver<SliderEvent>) {
        info!(slider = self.controller.name(), "Slider page running");
        while let Some(event) = events.recv().await {
            if !self.handle(event) {
                break;
            }
        }
    }

    /// Stop auto-advancing.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.auto_advance.take() {
            handle.cancel();
            debug!(slider = self.controller.name(), "Auto-advance stopped");
        }
    }

    /// The controller.
    #[must_use]
    pub fn controller(&self) -> &SliderController {
        &self.controller
    }

    /// The document.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Whether the auto-advance timer is running.
    #[must_use]
    pub fn is_auto_advancing(&self) -> bool {
        self.auto_advance
            .as_ref()
            .is_some_and(TaskHandle::is_pending)
    }

    fn render(&mut self) {
        self.document.apply_all(&self.controller.render());
    }
}
