//! Input routing: decide, per raw event, between native scrolling,
//! intercepting, and triggering a snap.
//!
//! The router is a pure decision layer. It reads a snapshot of engine state
//! and the current section's edges and returns what the host should do with
//! the event's default action plus the engine action to run.

use std::time::Instant;

use crate::config::{GestureConfig, SnapConfig};
use crate::gesture::{GestureClassifier, GestureSample, Verdict};
use crate::registry::ScrollMetrics;

/// Raw input delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Wheel or trackpad scroll; positive `delta_y` scrolls down
    Wheel { delta_y: f64 },
    TouchStart { y: f64 },
    TouchMove { y: f64, cancelable: bool },
    TouchEnd { y: f64 },
    /// Tab moved focus; `section` is the nearest enclosing section, if any
    FocusTab { section: Option<usize> },
    /// A section's own content scrolled
    SectionScroll { index: usize, metrics: ScrollMetrics },
    /// The section container scrolled
    ContainerScroll,
}

/// What the host should do with the event's default action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    PassThrough,
    PreventDefault,
}

/// Engine action requested by a routed event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouterAction {
    None,
    SnapNext,
    SnapPrevious,
    /// Instant jump, used for keyboard focus
    SnapTo(usize),
    /// Leave the terminal locked state without moving
    ReleaseEnd,
    UpdateEdges { index: usize, metrics: ScrollMetrics },
    CheckEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Routing {
    pub disposition: Disposition,
    pub action: RouterAction,
}

impl Routing {
    fn pass() -> Self {
        Self {
            disposition: Disposition::PassThrough,
            action: RouterAction::None,
        }
    }

    fn prevent() -> Self {
        Self {
            disposition: Disposition::PreventDefault,
            action: RouterAction::None,
        }
    }

    fn with(disposition: Disposition, action: RouterAction) -> Self {
        Self { disposition, action }
    }
}

/// Edge flags of the current section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub at_start: bool,
    pub at_end: bool,
}

/// Engine state the router decides against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouterView {
    pub initialized: bool,
    pub snapping: bool,
    pub suppress_input: bool,
    pub snapped_to_end: bool,
    /// `None` when there is no current section
    pub edges: Option<Edges>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Forward,
    Backward,
}

fn heading_of(sample: &GestureSample) -> Option<Heading> {
    match sample.verdict {
        Verdict::Down => Some(Heading::Forward),
        Verdict::Up => Some(Heading::Backward),
        // Fall back to the raw sign
        Verdict::Indeterminate if sample.delta_y > 0.0 => Some(Heading::Forward),
        Verdict::Indeterminate if sample.delta_y < 0.0 => Some(Heading::Backward),
        Verdict::Indeterminate => None,
    }
}

#[derive(Debug, Clone)]
pub struct InputRouter {
    classifier: GestureClassifier,
    touch_start_y: f64,
    touch_threshold: f64,
}

impl InputRouter {
    pub fn new(snap: &SnapConfig, gesture: &GestureConfig) -> Self {
        Self {
            classifier: GestureClassifier::new(gesture),
            touch_start_y: 0.0,
            touch_threshold: snap.touch_threshold_px,
        }
    }

    /// Forget gesture history and touch tracking
    pub fn reset(&mut self) {
        self.classifier.reset();
        self.touch_start_y = 0.0;
    }

    pub fn route(&mut self, event: &InputEvent, view: &RouterView, now: Instant) -> Routing {
        let routing = match *event {
            InputEvent::Wheel { delta_y } => self.route_wheel(delta_y, view, now),
            InputEvent::TouchStart { y } => {
                self.touch_start_y = y;
                Routing::pass()
            }
            InputEvent::TouchMove { y, cancelable } => self.route_touch_move(y, cancelable, view),
            InputEvent::TouchEnd { y } => self.route_touch_end(y, view),
            InputEvent::FocusTab { section: Some(index) } => {
                Routing::with(Disposition::PassThrough, RouterAction::SnapTo(index))
            }
            InputEvent::FocusTab { section: None } => Routing::pass(),
            InputEvent::SectionScroll { index, metrics } => {
                Routing::with(
                    Disposition::PassThrough,
                    RouterAction::UpdateEdges { index, metrics },
                )
            }
            InputEvent::ContainerScroll => {
                Routing::with(Disposition::PassThrough, RouterAction::CheckEnd)
            }
        };
        tracing::trace!(?event, ?routing, "Input routed");
        routing
    }

    fn route_wheel(&mut self, delta_y: f64, view: &RouterView, now: Instant) -> Routing {
        if !view.initialized {
            // Keep the browser from free-scrolling before the engine is armed
            return Routing::prevent();
        }

        let Some(edges) = view.edges else {
            return Routing::pass();
        };

        let sample = self.classifier.classify(delta_y, now);
        let heading = heading_of(&sample);

        if !view.snapping {
            match heading {
                Some(Heading::Forward) if !edges.at_end => return Routing::pass(),
                Some(Heading::Backward) if !edges.at_start => return Routing::pass(),
                _ => {}
            }
        }

        if view.snapped_to_end {
            return if heading == Some(Heading::Backward) {
                Routing::with(Disposition::PassThrough, RouterAction::ReleaseEnd)
            } else {
                Routing::prevent()
            };
        }

        if view.snapping || view.suppress_input {
            return Routing::prevent();
        }

        // Only deliberate gestures snap; inertial tails are swallowed
        let action = match sample.verdict {
            Verdict::Down if edges.at_end => RouterAction::SnapNext,
            Verdict::Up if edges.at_start => RouterAction::SnapPrevious,
            _ => RouterAction::None,
        };
        Routing::with(Disposition::PreventDefault, action)
    }

    fn route_touch_move(&mut self, y: f64, cancelable: bool, view: &RouterView) -> Routing {
        if !cancelable {
            return Routing::pass();
        }
        if !view.initialized {
            return Routing::prevent();
        }
        let Some(edges) = view.edges else {
            return Routing::pass();
        };
        if view.snapped_to_end {
            return Routing::pass();
        }

        // Finger moving up scrolls forward
        let past_end = self.touch_start_y > y && edges.at_end;
        let past_start = self.touch_start_y < y && edges.at_start;
        if past_end || past_start {
            Routing::prevent()
        } else {
            Routing::pass()
        }
    }

    fn route_touch_end(&mut self, y: f64, view: &RouterView) -> Routing {
        if !view.initialized || view.snapping {
            return Routing::pass();
        }
        let Some(edges) = view.edges else {
            return Routing::pass();
        };

        let delta = y - self.touch_start_y;
        if delta.abs() <= self.touch_threshold {
            return Routing::pass();
        }

        let action = if delta < 0.0 && edges.at_end {
            RouterAction::SnapNext
        } else if delta > 0.0 && edges.at_start {
            RouterAction::SnapPrevious
        } else {
            RouterAction::None
        };
        Routing::with(Disposition::PassThrough, action)
    }
}
