//! App: configuration, the tick cycle and the frame loop.
//!
//! [`App`] owns one [`Screen`], a terminal sink and the background
//! [`Handoff`]. Each [`tick`](App::tick) applies the background results that
//! are still current, then resolves styles, lays out and paints once, so any
//! number of writes made since the last tick cost one pass of each.
//! [`App::headless`] records output in a [`MemorySink`] for tests.

use std::io::{self, BufWriter, Stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::css::parser::ParseError;
use crate::css::specificity::CascadeOrder;
use crate::render::sink::{apply_patches, CrosstermSink, MemorySink, TerminalSink};
use crate::screen::Screen;
use crate::worker::{CancelFlag, Handoff, HandoffSender};

/// Sheet name of [`AppConfig::css`].
pub const APP_SHEET: &str = "app";
/// Sheet name of the file at [`AppConfig::css_path`].
pub const FILE_SHEET: &str = "app-file";

/// Errors from the app layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal io: {0}")]
    Io(#[from] io::Error),
    #[error("cannot read style sheet {path}: {source}")]
    StyleSheet {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no css_path configured")]
    NoStyleSheetPath,
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Optional terminal title.
    pub title: Option<String>,
    /// Optional CSS loaded as a user sheet.
    pub css: Option<String>,
    /// Optional CSS file loaded after `css`; re-read by [`App::reload_css`].
    pub css_path: Option<PathBuf>,
    /// Target frames per second for the frame loop.
    pub fps: u32,
    /// Ranking policy of the cascade.
    pub cascade_order: CascadeOrder,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            css: None,
            css_path: None,
            fps: 60,
            cascade_order: CascadeOrder::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the CSS string (builder).
    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    /// Set the CSS file (builder).
    pub fn with_css_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.css_path = Some(path.into());
        self
    }

    /// Set the target FPS (builder). Zero is treated as one.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Set the cascade ranking policy (builder).
    pub fn with_cascade_order(mut self, order: CascadeOrder) -> Self {
        self.cascade_order = order;
        self
    }

    /// Time between frames.
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

// ---------------------------------------------------------------------------
// TickReport
// ---------------------------------------------------------------------------

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Background results applied.
    pub applied: usize,
    /// Background results dropped because their token was stale.
    pub discarded: usize,
    /// Patches written to the sink.
    pub patches: usize,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The application: a screen, a sink and the background handoff.
pub struct App<S: TerminalSink> {
    /// The screen (DOM, styles, layout, compositor).
    pub screen: Screen,
    /// Application configuration.
    pub config: AppConfig,
    sink: S,
    handoff: Handoff,
    shutdown: CancelFlag,
    running: bool,
}

impl App<MemorySink> {
    /// An app without a terminal, recording output in memory.
    pub fn headless(width: u16, height: u16) -> Self {
        Self::headless_with(AppConfig::default(), width, height)
    }

    /// A headless app with a config. A missing `css_path` file is recorded
    /// as a diagnostic instead of failing.
    pub fn headless_with(config: AppConfig, width: u16, height: u16) -> Self {
        Self::new(config, width, height, MemorySink::new())
    }
}

impl App<CrosstermSink<BufWriter<Stdout>>> {
    /// An app on the real terminal, sized to it.
    pub fn terminal(config: AppConfig) -> io::Result<Self> {
        let (width, height) = CrosstermSink::terminal_size()?;
        Ok(Self::new(config, width, height, CrosstermSink::stdout()))
    }

    /// Enter the alternate screen, run the frame loop, and restore the
    /// terminal even if the loop fails.
    pub async fn run_terminal(&mut self) -> Result<(), AppError> {
        self.sink.enter()?;
        if let Some(title) = self.config.title.clone() {
            self.sink.set_title(&title)?;
        }
        let result = self.run().await;
        self.sink.leave()?;
        result
    }
}

impl<S: TerminalSink> App<S> {
    /// Create an app writing to `sink` with a `width` × `height` screen and
    /// load the configured style sheets.
    pub fn new(config: AppConfig, width: u16, height: u16, sink: S) -> Self {
        let mut app = Self {
            screen: Screen::with_order(width, height, config.cascade_order),
            config,
            sink,
            handoff: Handoff::new(),
            shutdown: CancelFlag::new(),
            running: true,
        };
        if let Some(css) = app.config.css.clone() {
            app.screen.add_stylesheet(APP_SHEET, &css);
        }
        if app.config.css_path.is_some() {
            if let Err(err) = app.reload_css() {
                tracing::warn!(%err, "style sheet file not loaded");
            }
        }
        app
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// A sender for background work to hand results back through.
    pub fn sender(&self) -> HandoffSender {
        self.handoff.sender()
    }

    /// A flag that stops [`run`](Self::run) at the next tick when cancelled.
    pub fn shutdown_handle(&self) -> CancelFlag {
        self.shutdown.clone()
    }

    pub fn request_quit(&mut self) {
        self.running = false;
    }

    pub fn should_quit(&self) -> bool {
        !self.running || self.shutdown.is_cancelled()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen.resize(width, height);
    }

    /// Re-read [`AppConfig::css_path`] and replace the file sheet. Rules
    /// that fail to parse are skipped and returned.
    pub fn reload_css(&mut self) -> Result<Vec<ParseError>, AppError> {
        let path = self.config.css_path.clone().ok_or(AppError::NoStyleSheetPath)?;
        let css = read_sheet(&path)?;
        let errors = self.screen.add_stylesheet(FILE_SHEET, &css);
        tracing::debug!(path = %path.display(), errors = errors.len(), "style sheet reloaded");
        Ok(errors)
    }

    // -----------------------------------------------------------------------
    // Ticks
    // -----------------------------------------------------------------------

    /// Apply current background results, then produce and write one frame.
    pub fn tick(&mut self) -> io::Result<TickReport> {
        let mut report = TickReport::default();
        for completion in self.handoff.drain() {
            if self.screen.tasks.finish(&completion.token) {
                completion.apply(&mut self.screen);
                report.applied += 1;
            } else {
                tracing::debug!(token = ?completion.token, "stale completion discarded");
                report.discarded += 1;
            }
        }

        let patches = self.screen.frame();
        report.patches = patches.len();
        if !patches.is_empty() {
            apply_patches(&mut self.sink, &patches)?;
        }
        Ok(report)
    }

    /// Tick at the configured rate until quit is requested.
    pub async fn run(&mut self) -> Result<(), AppError> {
        let mut interval = tokio::time::interval(self.config.frame_period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        while !self.should_quit() {
            interval.tick().await;
            self.tick()?;
        }
        tracing::debug!(frames = self.screen.compositor.frames(), "frame loop stopped");
        Ok(())
    }
}

fn read_sheet(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|source| AppError::StyleSheet { path: path.to_owned(), source })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::snapshot::screen_to_string;
    use crate::widget::WidgetExt;
    use crate::widgets::{Container, Static};
    use pretty_assertions::assert_eq;

    fn app_with(css: &str) -> App<MemorySink> {
        App::headless_with(AppConfig::new().with_css(css), 10, 2)
    }

    // ── AppConfig ────────────────────────────────────────────────────

    #[test]
    fn config_defaults() {
        let config = AppConfig::new();
        assert!(config.title.is_none());
        assert!(config.css.is_none());
        assert!(config.css_path.is_none());
        assert_eq!(config.fps, 60);
        assert_eq!(config.cascade_order, CascadeOrder::OriginFirst);
    }

    #[test]
    fn config_builder() {
        let config = AppConfig::new()
            .with_title("My App")
            .with_css("Static { color: red; }")
            .with_css_path("app.tcss")
            .with_fps(0)
            .with_cascade_order(CascadeOrder::SpecificityFirst);
        assert_eq!(config.title.as_deref(), Some("My App"));
        assert_eq!(config.css_path, Some(PathBuf::from("app.tcss")));
        assert_eq!(config.fps, 1);
        assert_eq!(config.frame_period(), Duration::from_secs(1));
        assert_eq!(config.cascade_order, CascadeOrder::SpecificityFirst);
    }

    // ── Ticks ────────────────────────────────────────────────────────

    #[test]
    fn tick_writes_patches_to_the_sink() {
        let mut app = app_with("Static { height: 1; }");
        let root = app.screen.mount_root(Container::new()).unwrap();
        app.screen.mount(root, Static::new("hi")).unwrap();
        let report = app.tick().unwrap();
        assert_eq!(report.patches, 2);
        assert_eq!(app.sink().flushes(), 1);

        let report = app.tick().unwrap();
        assert_eq!(report, TickReport::default());
        assert_eq!(app.sink().flushes(), 1);
    }

    #[test]
    fn writes_within_a_tick_coalesce() {
        let mut app = app_with("Static { height: 1; }");
        let root = app.screen.mount_root(Container::new()).unwrap();
        let label = app.screen.mount(root, Static::new("a")).unwrap();
        app.tick().unwrap();
        app.sink_mut().clear();

        for text in ["b", "c", "done"] {
            app.screen.set_attr(label, Static::TEXT, text.to_owned()).unwrap();
        }
        let report = app.tick().unwrap();
        assert_eq!(report.patches, 1);
        assert_eq!(app.sink().runs()[0].text(), "done");
        assert_eq!(app.screen.compositor.last_render_count(), 1);
    }

    #[test]
    fn stale_background_results_are_discarded() {
        let mut app = app_with("Static { height: 1; }");
        let root = app.screen.mount_root(Container::new()).unwrap();
        let label = app.screen.mount(root, Static::new("idle").with_id("status")).unwrap();
        app.tick().unwrap();

        let sender = app.sender();
        let (old, _) = app.screen.tasks.begin(label, "load");
        let (new, _) = app.screen.tasks.begin(label, "load");
        sender.complete(old, move |screen| {
            screen.set_attr(label, Static::TEXT, String::from("old")).unwrap();
        });
        sender.complete(new, move |screen| {
            screen.set_attr(label, Static::TEXT, String::from("new")).unwrap();
        });

        let report = app.tick().unwrap();
        assert_eq!((report.applied, report.discarded), (1, 1));
        assert_eq!(screen_to_string(&app.screen), "new\n");
    }

    #[test]
    fn reload_css_replaces_the_file_sheet() {
        let path = std::env::temp_dir().join(format!("tapestry-reload-{}.tcss", std::process::id()));
        std::fs::write(&path, "Static { height: 1; color: red; }").unwrap();
        let mut app = App::headless_with(AppConfig::new().with_css_path(&path), 10, 2);
        assert!(app.screen.cascade.has_sheet(FILE_SHEET));

        std::fs::write(&path, "Static { height: 2; }\n.bad { : ; }").unwrap();
        let errors = app.reload_css().unwrap();
        assert_eq!(errors.len(), 1);
        let root = app.screen.mount_root(Container::new()).unwrap();
        let label = app.screen.mount(root, Static::new("x")).unwrap();
        app.tick().unwrap();
        assert_eq!(app.screen.layout_of(label).unwrap().region.height, 2);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn reload_without_path_is_an_error() {
        let mut app = App::headless(4, 1);
        assert!(matches!(app.reload_css(), Err(AppError::NoStyleSheetPath)));
    }

    #[test]
    fn missing_css_file_does_not_abort_construction() {
        let app = App::headless_with(AppConfig::new().with_css_path("/nonexistent/tapestry.tcss"), 4, 1);
        assert!(!app.screen.cascade.has_sheet(FILE_SHEET));
    }

    // ── Frame loop ───────────────────────────────────────────────────

    #[tokio::test]
    async fn run_stops_when_shutdown_is_cancelled() {
        let mut app = App::headless_with(AppConfig::new().with_fps(200), 4, 1);
        app.screen.mount_root(Container::new()).unwrap();
        let shutdown = app.shutdown_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            shutdown.cancel();
        });
        app.run().await.unwrap();
        assert!(app.should_quit());
        assert!(app.screen.compositor.frames() >= 1);
    }

    #[test]
    fn request_quit_stops_the_loop() {
        let mut app = App::headless(4, 1);
        assert!(!app.should_quit());
        app.request_quit();
        assert!(app.should_quit());
        tokio_test::block_on(app.run()).unwrap();
    }
}
