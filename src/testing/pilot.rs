//! Pilot: drive a headless [`App`](crate::app::App) from tests.
//!
//! The pilot mounts widgets, writes attributes, toggles classes, resizes and
//! ticks, and reads back what reached the sink.

use crate::app::{App, AppConfig, TickReport};
use crate::dom::node::NodeId;
use crate::reactive::{AttrValue, SetOutcome};
use crate::render::sink::MemorySink;
use crate::screen::{Screen, ScreenError};
use crate::widget::Widget;

use super::snapshot::screen_to_string;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless app driver for testing.
///
/// # Examples
///
/// ```ignore
/// use tapestry_tui::testing::Pilot;
/// use tapestry_tui::widgets::Static;
///
/// let mut pilot = Pilot::new(20, 1).with_css("Static { height: 1; }");
/// pilot.mount_root(Static::new("hello")).unwrap();
/// pilot.tick();
/// assert_eq!(pilot.snapshot(), "hello");
/// ```
pub struct Pilot {
    app: App<MemorySink>,
}

impl Pilot {
    /// A headless app with the given terminal size.
    pub fn new(width: u16, height: u16) -> Self {
        Self { app: App::headless(width, height) }
    }

    /// A headless app built from `config`.
    pub fn with_config(config: AppConfig, width: u16, height: u16) -> Self {
        Self { app: App::headless_with(config, width, height) }
    }

    /// Load `css` as the app sheet (builder).
    pub fn with_css(mut self, css: &str) -> Self {
        self.app.screen.add_stylesheet(crate::app::APP_SHEET, css);
        self
    }

    // ── Tree ─────────────────────────────────────────────────────────

    pub fn mount_root(&mut self, widget: impl Widget + 'static) -> Result<NodeId, ScreenError> {
        self.app.screen.mount_root(widget)
    }

    pub fn mount(&mut self, parent: NodeId, widget: impl Widget + 'static) -> Result<NodeId, ScreenError> {
        self.app.screen.mount(parent, widget)
    }

    /// The first node matching `selector`.
    pub fn query_one(&self, selector: &str) -> Result<NodeId, ScreenError> {
        self.app.screen.query_one(selector)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<bool, ScreenError> {
        Ok(self.app.screen.dom.add_class(node, class)?)
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<bool, ScreenError> {
        Ok(self.app.screen.dom.remove_class(node, class)?)
    }

    pub fn set_attr<T: AttrValue>(&mut self, node: NodeId, name: &str, value: T) -> Result<SetOutcome, ScreenError> {
        self.app.screen.set_attr(node, name, value)
    }

    // ── Driving ──────────────────────────────────────────────────────

    /// Run one tick. The memory sink cannot fail.
    pub fn tick(&mut self) -> TickReport {
        match self.app.tick() {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(%err, "headless tick failed");
                TickReport::default()
            }
        }
    }

    /// Resize and tick.
    pub fn resize(&mut self, width: u16, height: u16) -> TickReport {
        self.app.resize(width, height);
        self.tick()
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Text of the last frame.
    pub fn snapshot(&self) -> String {
        screen_to_string(&self.app.screen)
    }

    /// Everything written to the sink so far.
    pub fn sink(&self) -> &MemorySink {
        self.app.sink()
    }

    /// Forget what the sink recorded.
    pub fn clear_sink(&mut self) {
        self.app.sink_mut().clear();
    }

    pub fn screen(&self) -> &Screen {
        &self.app.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.app.screen
    }

    pub fn app(&mut self) -> &mut App<MemorySink> {
        &mut self.app
    }
}

// ===========================================================================
// Tests
// ===========================================================================
