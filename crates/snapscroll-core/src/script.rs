//! Scripted headless runs
//!
//! A script describes a viewport, its sections and a list of timed steps. The
//! runner replays the steps against a [`ResponsiveController`] over the
//! in-memory host, ticking at animation frame rate in between, and records
//! one [`TraceRecord`] per step.
//!
//! ```toml
//! viewport_width = 1280
//! viewport_height = 800
//!
//! [[sections]]
//! content_height = 1600
//!
//! [[sections]]
//! header_bg = "#1e1e2e"
//!
//! [[steps]]
//! at_ms = 600
//! event = "wheel"
//! delta_y = 40
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AppConfig;
use crate::engine::{EngineEvent, Lifecycle, SnapEngine};
use crate::headless::{MemoryViewport, RecordingMedia, RecordingStyle, SectionSpec};
use crate::host::{Overflow, ScrollTarget, SectionClass, Viewport};
use crate::lifecycle::ResponsiveController;
use crate::router::{Disposition, InputEvent};
use crate::{Error, Result};

type HeadlessController = ResponsiveController<MemoryViewport, RecordingStyle, RecordingMedia>;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default = "default_width")]
    pub viewport_width: f64,
    #[serde(default = "default_height")]
    pub viewport_height: f64,
    /// Scrollable space below the last section
    #[serde(default)]
    pub trailing_space: f64,
    #[serde(default)]
    pub sections: Vec<ScriptSection>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptSection {
    pub content_height: Option<f64>,
    pub header_bg: Option<String>,
    #[serde(default)]
    pub media: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Milliseconds since the start of the run
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Action {
    Wheel { delta_y: f64 },
    /// Full touch gesture from `from_y` to `to_y`
    Touch { from_y: f64, to_y: f64 },
    Tab { section: Option<usize> },
    Resize { width: f64, height: Option<f64> },
    SnapTo {
        index: usize,
        #[serde(default)]
        instant: bool,
    },
    SnapNext,
    SnapPrevious,
    Reset,
    Start,
    Stop,
    /// Only let time pass
    Advance,
}

impl Action {
    fn label(&self) -> String {
        match self {
            Action::Wheel { delta_y } => format!("wheel {delta_y:+}"),
            Action::Touch { from_y, to_y } => format!("touch {from_y} -> {to_y}"),
            Action::Tab { section: Some(index) } => format!("tab {index}"),
            Action::Tab { section: None } => "tab".to_string(),
            Action::Resize { width, .. } => format!("resize {width}"),
            Action::SnapTo { index, instant } => {
                if *instant {
                    format!("snap_to {index} instant")
                } else {
                    format!("snap_to {index}")
                }
            }
            Action::SnapNext => "snap_next".to_string(),
            Action::SnapPrevious => "snap_previous".to_string(),
            Action::Reset => "reset".to_string(),
            Action::Start => "start".to_string(),
            Action::Stop => "stop".to_string(),
            Action::Advance => "advance".to_string(),
        }
    }
}

fn default_width() -> f64 {
    1280.0
}

fn default_height() -> f64 {
    800.0
}

impl Script {
    pub fn parse(source: &str) -> Result<Self> {
        let script: Script = toml::from_str(source)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<()> {
        if self.viewport_height <= 0.0 {
            return Err(Error::Script("viewport_height must be positive".to_string()));
        }
        if let Some(pair) = self.steps.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
            return Err(Error::Script(format!(
                "steps out of order: {} ms after {} ms",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        Ok(())
    }

    fn section_specs(&self) -> Vec<SectionSpec> {
        self.sections
            .iter()
            .map(|s| SectionSpec {
                content_height: s.content_height,
                has_content: s.content_height.is_some(),
                header_bg: s.header_bg.clone(),
                has_media: s.media,
            })
            .collect()
    }
}

/// Engine state after one step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    pub at_ms: u64,
    pub step: String,
    /// Default-action verdict for input steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    pub lifecycle: String,
    pub current_index: usize,
    pub initialized: bool,
    pub snapping: bool,
    pub suppress_input: bool,
    pub snapped_to_end: bool,
    pub container_top: f64,
    pub header_bg: String,
    pub header_direction: Option<String>,
    pub snapped: Vec<usize>,
    pub events: Vec<String>,
}

pub struct ScriptRunner {
    controller: HeadlessController,
    frame: Duration,
    origin: Instant,
    clock: Instant,
}

impl ScriptRunner {
    /// Build the headless host described by `script`
    pub fn new(config: &AppConfig, script: &Script, origin: Instant) -> Result<Self> {
        let mut viewport = MemoryViewport::new(script.viewport_height, script.section_specs());
        viewport.set_trailing_space(script.trailing_space);
        let mut media = RecordingMedia::default();
        for (index, section) in script.sections.iter().enumerate() {
            if section.media {
                media.play(index);
            }
        }

        let engine = SnapEngine::new(
            config.snap.clone(),
            &config.gesture,
            viewport,
            RecordingStyle::default(),
            media,
        )?;
        let fps = config.ui.animation_fps.max(1);

        Ok(Self {
            controller: ResponsiveController::new(engine, script.viewport_width, origin),
            frame: Duration::from_micros(1_000_000 / u64::from(fps)),
            origin,
            clock: origin,
        })
    }

    /// Replay every step of `script`
    pub fn run(&mut self, script: &Script) -> Result<Vec<TraceRecord>> {
        let mut trace = Vec::with_capacity(script.steps.len());
        for step in &script.steps {
            trace.push(self.step(step)?);
        }
        Ok(trace)
    }

    pub fn step(&mut self, step: &Step) -> Result<TraceRecord> {
        let at = self.origin + Duration::from_millis(step.at_ms);
        self.advance_to(at);

        debug!(at_ms = step.at_ms, action = ?step.action, "Script step");
        let disposition = self.apply(&step.action, at)?;
        self.controller.tick(at);

        Ok(self.record(step, disposition))
    }

    /// Tick frame by frame up to `until`
    fn advance_to(&mut self, until: Instant) {
        while self.clock + self.frame < until {
            self.clock += self.frame;
            self.controller.tick(self.clock);
        }
        if self.clock < until {
            self.clock = until;
            self.controller.tick(until);
        }
    }

    fn apply(&mut self, action: &Action, now: Instant) -> Result<Option<Disposition>> {
        let disposition = match action {
            Action::Wheel { delta_y } => {
                let event = InputEvent::Wheel { delta_y: *delta_y };
                Some(self.input_with_native(event, *delta_y, now))
            }
            Action::Touch { from_y, to_y } => {
                self.controller.handle_event(InputEvent::TouchStart { y: *from_y }, now);
                let moved = InputEvent::TouchMove {
                    y: *to_y,
                    cancelable: true,
                };
                let disposition = self.input_with_native(moved, from_y - to_y, now);
                self.controller.handle_event(InputEvent::TouchEnd { y: *to_y }, now);
                Some(disposition)
            }
            Action::Tab { section } => Some(
                self.controller
                    .handle_event(InputEvent::FocusTab { section: *section }, now),
            ),
            Action::Resize { width, height } => {
                if let Some(height) = height {
                    self.controller.engine_mut().viewport_mut().set_height(*height);
                }
                self.controller.on_resize(*width, now);
                None
            }
            Action::SnapTo { index, instant } => {
                self.controller.engine_mut().snap_to(*index, *instant, now);
                None
            }
            Action::SnapNext => {
                self.controller.engine_mut().snap_next(now);
                None
            }
            Action::SnapPrevious => {
                self.controller.engine_mut().snap_previous(now);
                None
            }
            Action::Reset => {
                self.controller.engine_mut().reset(now);
                None
            }
            Action::Start => {
                self.controller.engine_mut().start(now)?;
                None
            }
            Action::Stop => {
                self.controller.engine_mut().stop();
                None
            }
            Action::Advance => None,
        };
        Ok(disposition)
    }

    /// Route `event`; when the host keeps the default action, scroll natively
    /// by `delta` and feed back the resulting scroll event
    fn input_with_native(&mut self, event: InputEvent, delta: f64, now: Instant) -> Disposition {
        let disposition = self.controller.handle_event(event, now);
        if disposition == Disposition::PassThrough {
            let engine = self.controller.engine_mut();
            let index = engine.current_index();
            let scrollable = engine.style().overflow() == Overflow::Auto;
            if let Some(scrolled) = engine.viewport_mut().native_scroll(index, delta, scrollable) {
                self.controller.handle_event(scrolled, now);
            }
        }
        disposition
    }

    fn record(&mut self, step: &Step, disposition: Option<Disposition>) -> TraceRecord {
        let engine = self.controller.engine_mut();
        let events = engine.drain_events().iter().map(describe_event).collect();
        let state = *engine.state();
        let style = engine.style();

        TraceRecord {
            at_ms: step.at_ms,
            step: step.action.label(),
            disposition: disposition.map(|d| match d {
                Disposition::PassThrough => "pass_through".to_string(),
                Disposition::PreventDefault => "prevent_default".to_string(),
            }),
            lifecycle: match engine.lifecycle() {
                Lifecycle::Idle => "idle",
                Lifecycle::Starting => "starting",
                Lifecycle::Ready => "ready",
            }
            .to_string(),
            current_index: state.current_index,
            initialized: state.initialized,
            snapping: state.snapping,
            suppress_input: state.suppress_input,
            snapped_to_end: state.snapped_to_end,
            container_top: engine.viewport().scroll_top(ScrollTarget::Container),
            header_bg: style.header_background().to_string(),
            header_direction: style.header_direction().map(|d| d.as_str().to_string()),
            snapped: style.sections_with(SectionClass::Snapped),
            events,
        }
    }
}

fn describe_event(event: &EngineEvent) -> String {
    match event {
        EngineEvent::Started => "started".to_string(),
        EngineEvent::Ready => "ready".to_string(),
        EngineEvent::TransitionStarted { from, to } => format!("transition {from} -> {to}"),
        EngineEvent::TransitionSettled { index } => format!("settled {index}"),
        EngineEvent::SnappedToEnd(true) => "snapped_to_end".to_string(),
        EngineEvent::SnappedToEnd(false) => "released_end".to_string(),
        EngineEvent::Stopped => "stopped".to_string(),
    }
}

/// Parse, build and replay in one go
pub fn run_script(config: &AppConfig, script: &Script) -> Result<Vec<TraceRecord>> {
    let mut runner = ScriptRunner::new(config, script, Instant::now())?;
    runner.run(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_SECTIONS: &str = r##"
viewport_width = 1280
viewport_height = 800

[[sections]]
[[sections]]
header_bg = "#224466"
[[sections]]
"##;

    fn run(source: &str) -> Vec<TraceRecord> {
        let script = Script::parse(source).unwrap();
        run_script(&AppConfig::default(), &script).unwrap()
    }

    #[test]
    fn test_parse_steps() {
        let source = format!(
            "{THREE_SECTIONS}
[[steps]]
at_ms = 600
event = \"wheel\"
delta_y = 40.0

[[steps]]
at_ms = 700
event = \"snap_to\"
index = 2
instant = true
"
        );
        let script = Script::parse(&source).unwrap();
        assert_eq!(script.sections.len(), 3);
        assert_eq!(script.steps[0].action, Action::Wheel { delta_y: 40.0 });
        assert_eq!(
            script.steps[1].action,
            Action::SnapTo {
                index: 2,
                instant: true
            }
        );
    }

    #[test]
    fn test_steps_out_of_order_rejected() {
        let source = format!(
            "{THREE_SECTIONS}
[[steps]]
at_ms = 500
event = \"advance\"

[[steps]]
at_ms = 100
event = \"advance\"
"
        );
        assert!(matches!(Script::parse(&source), Err(Error::Script(_))));
    }

    #[test]
    fn test_script_without_sections_fails() {
        let script = Script::parse("viewport_width = 1280").unwrap();
        let result = run_script(&AppConfig::default(), &script);
        assert!(matches!(result, Err(Error::NoSections(_))));
    }

    #[test]
    fn test_wheel_walks_through_sections() {
        let source = format!(
            "{THREE_SECTIONS}
[[steps]]
at_ms = 600
event = \"advance\"

[[steps]]
at_ms = 700
event = \"wheel\"
delta_y = 40.0

[[steps]]
at_ms = 2000
event = \"advance\"

[[steps]]
at_ms = 2100
event = \"wheel\"
delta_y = 40.0

[[steps]]
at_ms = 3500
event = \"advance\"
"
        );
        let trace = run(&source);

        assert_eq!(trace[0].lifecycle, "ready");
        assert!(trace[0].events.contains(&"ready".to_string()));

        assert_eq!(trace[1].disposition.as_deref(), Some("prevent_default"));
        assert_eq!(trace[1].current_index, 1);
        assert!(trace[1].snapping);

        assert!(!trace[2].snapping);
        assert_eq!(trace[2].container_top, 800.0);
        assert_eq!(trace[2].header_bg, "#224466");
        assert_eq!(trace[2].snapped, vec![1]);

        assert_eq!(trace[4].current_index, 2);
        assert!(trace[4].snapped_to_end);
        assert_eq!(trace[4].header_direction.as_deref(), Some("scrolled-down"));
    }

    #[test]
    fn test_wheel_inside_content_scrolls_natively() {
        let source = "
viewport_width = 1280
viewport_height = 800

[[sections]]
content_height = 1000

[[sections]]

[[steps]]
at_ms = 600
event = \"wheel\"
delta_y = 120.0

[[steps]]
at_ms = 1000
event = \"wheel\"
delta_y = 120.0

[[steps]]
at_ms = 1400
event = \"wheel\"
delta_y = 40.0
";
        let trace = run(source);

        assert_eq!(trace[0].disposition.as_deref(), Some("pass_through"));
        assert_eq!(trace[0].current_index, 0);
        // Second wheel reaches the content bottom and arms the suppression window
        assert_eq!(trace[1].disposition.as_deref(), Some("pass_through"));
        assert!(trace[1].suppress_input);
        assert_eq!(trace[2].current_index, 1);
    }

    #[test]
    fn test_narrow_viewport_passes_everything_through() {
        let source = "
viewport_width = 640

[[sections]]
[[sections]]

[[steps]]
at_ms = 600
event = \"wheel\"
delta_y = 40.0
";
        let trace = run(source);
        assert_eq!(trace[0].lifecycle, "idle");
        assert_eq!(trace[0].disposition.as_deref(), Some("pass_through"));
        assert_eq!(trace[0].current_index, 0);
    }

    #[test]
    fn test_touch_swipe_and_tab() {
        let source = format!(
            "{THREE_SECTIONS}
[[steps]]
at_ms = 600
event = \"touch\"
from_y = 600.0
to_y = 300.0

[[steps]]
at_ms = 2000
event = \"tab\"
section = 0
"
        );
        let trace = run(&source);
        assert_eq!(trace[0].current_index, 1);
        assert_eq!(trace[1].current_index, 0);
        assert_eq!(trace[1].container_top, 0.0);
        assert_eq!(trace[1].header_direction.as_deref(), Some("scrolled-up"));
    }
}
