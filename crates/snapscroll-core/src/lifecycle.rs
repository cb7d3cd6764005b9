//! Breakpoint-driven lifecycle
//!
//! `ResponsiveController` owns a [`SnapEngine`] and turns window resizes into
//! engine restarts: above the breakpoint the engine runs, at or below it the
//! engine stays stopped and the host scrolls natively.

use std::time::Instant;

use tracing::{debug, warn};

use crate::engine::SnapEngine;
use crate::host::{MediaController, StyleSink, Viewport};
use crate::router::{Disposition, InputEvent};
use crate::timer::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResizeTask {
    Debounce,
}

#[derive(Debug)]
pub struct ResponsiveController<V, S, M> {
    engine: SnapEngine<V, S, M>,
    breakpoint: f64,
    width: f64,
    tasks: Scheduler<ResizeTask>,
}

impl<V: Viewport, S: StyleSink, M: MediaController> ResponsiveController<V, S, M> {
    /// Wrap `engine`, feeding the initial width through the debounced path
    pub fn new(engine: SnapEngine<V, S, M>, width: f64, now: Instant) -> Self {
        let breakpoint = engine.config().breakpoint_px;
        let mut controller = Self {
            engine,
            breakpoint,
            width,
            tasks: Scheduler::new(),
        };
        controller.on_resize(width, now);
        controller
    }

    pub fn engine(&self) -> &SnapEngine<V, S, M> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SnapEngine<V, S, M> {
        &mut self.engine
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Whether `width` enables snapping
    pub fn is_wide(&self, width: f64) -> bool {
        width > self.breakpoint
    }

    /// Record a window resize; the engine reacts after a quiet period
    pub fn on_resize(&mut self, width: f64, now: Instant) {
        self.width = width;
        let delay = self.engine.config().resize_debounce();
        self.tasks.schedule(ResizeTask::Debounce, now, delay);
    }

    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> Disposition {
        self.engine.handle_event(event, now)
    }

    pub fn tick(&mut self, now: Instant) {
        for task in self.tasks.take_due(now) {
            match task {
                ResizeTask::Debounce => self.apply_width(now),
            }
        }
        self.engine.tick(now);
    }

    pub fn needs_update(&self) -> bool {
        self.engine.needs_update()
    }

    /// Earliest deadline across the controller and its engine
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.tasks.next_deadline(), self.engine.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn apply_width(&mut self, now: Instant) {
        if self.is_wide(self.width) {
            let previous = self.engine.current_index();
            debug!(width = self.width, previous, "Above breakpoint, restarting engine");
            if let Err(e) = self.engine.restart_at(previous, now) {
                warn!("Snap engine restart failed: {}", e);
            }
        } else {
            debug!(width = self.width, "At or below breakpoint, stopping engine");
            self.engine.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::{GestureConfig, SnapConfig};
    use crate::engine::Lifecycle;
    use crate::headless::{MemoryViewport, RecordingMedia, RecordingStyle, SectionSpec};
    use crate::host::{BodyClass, Overflow, ScrollTarget};

    type Controller = ResponsiveController<MemoryViewport, RecordingStyle, RecordingMedia>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller(width: f64, now: Instant) -> Controller {
        let viewport = MemoryViewport::new(800.0, (0..3).map(|_| SectionSpec::fitting()).collect());
        let engine = SnapEngine::new(
            SnapConfig::default(),
            &GestureConfig::default(),
            viewport,
            RecordingStyle::default(),
            RecordingMedia::default(),
        )
        .unwrap();
        ResponsiveController::new(engine, width, now)
    }

    #[test]
    fn test_initial_width_goes_through_debounce() {
        let t0 = Instant::now();
        let mut controller = controller(1280.0, t0);
        assert_eq!(controller.engine().lifecycle(), Lifecycle::Idle);

        controller.tick(t0 + ms(249));
        assert_eq!(controller.engine().lifecycle(), Lifecycle::Idle);
        controller.tick(t0 + ms(250));
        assert_eq!(controller.engine().lifecycle(), Lifecycle::Starting);
        controller.tick(t0 + ms(550));
        assert!(controller.engine().is_ready());
    }

    #[test]
    fn test_narrow_viewport_never_starts() {
        let t0 = Instant::now();
        let mut controller = controller(992.0, t0);
        controller.tick(t0 + ms(1000));
        assert_eq!(controller.engine().lifecycle(), Lifecycle::Idle);
        assert_eq!(
            controller.handle_event(InputEvent::Wheel { delta_y: 40.0 }, t0 + ms(1000)),
            Disposition::PassThrough
        );
    }

    #[test]
    fn test_resize_burst_restarts_once() {
        let t0 = Instant::now();
        let mut controller = controller(1280.0, t0);
        controller.tick(t0 + ms(600));
        controller.engine_mut().drain_events();

        let mut now = t0 + ms(600);
        for width in [1200.0, 1100.0, 1300.0] {
            now += ms(100);
            controller.on_resize(width, now);
            controller.tick(now);
        }
        assert!(controller.engine().is_ready(), "no restart inside the quiet period");

        controller.tick(now + ms(250));
        assert_eq!(controller.engine().lifecycle(), Lifecycle::Starting);
        let starts = controller
            .engine_mut()
            .drain_events()
            .into_iter()
            .filter(|e| *e == crate::engine::EngineEvent::Started)
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_restart_keeps_current_section() {
        let t0 = Instant::now();
        let mut controller = controller(1280.0, t0);
        controller.tick(t0 + ms(250));
        controller.tick(t0 + ms(550));
        assert!(controller.engine().is_ready());
        controller.engine_mut().snap_to(1, true, t0 + ms(550));
        controller.tick(t0 + ms(1000));

        controller.on_resize(1400.0, t0 + ms(1000));
        controller.tick(t0 + ms(1250));
        assert_eq!(controller.engine().current_index(), 1);
        assert_eq!(controller.engine().viewport().scroll_top(ScrollTarget::Container), 800.0);
    }

    #[test]
    fn test_shrinking_below_breakpoint_stops() {
        let t0 = Instant::now();
        let mut controller = controller(1280.0, t0);
        controller.tick(t0 + ms(250));
        controller.tick(t0 + ms(550));
        assert!(controller.engine().is_ready());

        controller.on_resize(800.0, t0 + ms(700));
        controller.tick(t0 + ms(950));
        assert_eq!(controller.engine().lifecycle(), Lifecycle::Idle);
        assert!(!controller.engine().style().has_body_class(BodyClass::Initialized));
        assert_eq!(controller.engine().style().overflow(), Overflow::Auto);
    }

    #[test]
    fn test_next_deadline_covers_debounce() {
        let t0 = Instant::now();
        let controller = controller(1280.0, t0);
        assert_eq!(controller.next_deadline(), Some(t0 + ms(250)));
    }
}
