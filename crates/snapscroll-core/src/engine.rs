//! Snap state machine
//!
//! `SnapEngine` owns the engine state, the section registry, the input router,
//! the timers and the two scroll animators. Hosts feed it input events and call
//! [`SnapEngine::tick`] every frame; everything else happens through the
//! injected [`Viewport`], [`StyleSink`] and [`MediaController`].

use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace};

use crate::animation::{parallax_offset, AnimationId, TransitionAnimator};
use crate::config::{GestureConfig, SnapConfig};
use crate::host::{
    BodyClass, HeaderDirection, MediaController, Overflow, ScrollTarget, SectionClass, StyleSink,
    Viewport, DEFAULT_HEADER_BG,
};
use crate::registry::{Section, SectionRegistry};
use crate::router::{Disposition, Edges, InputEvent, InputRouter, RouterAction, RouterView};
use crate::timer::Scheduler;
use crate::Result;

/// Coarse lifecycle of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not started, or stopped; input passes through untouched
    Idle,
    /// Armed, waiting out the initial settle delay
    Starting,
    /// Accepting gestures
    Ready,
}

/// The authoritative snap state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineState {
    pub current_index: usize,
    pub initialized: bool,
    pub snapping: bool,
    pub suppress_input: bool,
    pub snapped_to_end: bool,
}

/// Notable state changes, drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Started,
    Ready,
    TransitionStarted { from: usize, to: usize },
    TransitionSettled { index: usize },
    SnappedToEnd(bool),
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineTask {
    InitSettle,
    TransitionSettle,
    InputSettle,
}

type SettledCallback = Box<dyn FnOnce(usize)>;

pub struct SnapEngine<V, S, M> {
    config: SnapConfig,
    viewport: V,
    style: S,
    media: M,
    registry: SectionRegistry,
    state: EngineState,
    lifecycle: Lifecycle,
    router: InputRouter,
    container_anim: TransitionAnimator,
    document_anim: TransitionAnimator,
    /// Container animation whose completion finishes the current transition
    awaited: Option<AnimationId>,
    tasks: Scheduler<EngineTask>,
    on_settled: Option<SettledCallback>,
    events: Vec<EngineEvent>,
}

impl<V, S, M> std::fmt::Debug for SnapEngine<V, S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapEngine")
            .field("state", &self.state)
            .field("lifecycle", &self.lifecycle)
            .field("sections", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl<V: Viewport, S: StyleSink, M: MediaController> SnapEngine<V, S, M> {
    /// Build an engine over the host's sections
    ///
    /// Fails with [`Error::NoSections`] when nothing matches the section
    /// selector; an engine is never constructed in a degraded state.
    pub fn new(
        snap: SnapConfig,
        gesture: &GestureConfig,
        mut viewport: V,
        style: S,
        media: M,
    ) -> Result<Self> {
        let descriptors = viewport.query_sections(&snap.section_selector, &snap.content_selector);
        let registry = match SectionRegistry::register(
            descriptors,
            &snap.section_selector,
            snap.edge_tolerance_px,
        ) {
            Ok(registry) => registry,
            Err(e) => {
                error!("Snap engine not created: {}", e);
                return Err(e);
            }
        };

        Ok(Self {
            router: InputRouter::new(&snap, gesture),
            container_anim: TransitionAnimator::new(snap.easing),
            document_anim: TransitionAnimator::new(snap.easing),
            config: snap,
            viewport,
            style,
            media,
            registry,
            state: EngineState::default(),
            lifecycle: Lifecycle::Idle,
            awaited: None,
            tasks: Scheduler::new(),
            on_settled: None,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.registry.get(self.state.current_index)
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn style(&self) -> &S {
        &self.style
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Take the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether the host should keep ticking at animation frame rate
    pub fn needs_update(&self) -> bool {
        self.container_anim.is_animating() || self.document_anim.is_animating()
    }

    /// Earliest timer deadline, for hosts that sleep between frames
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.next_deadline()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Prepare the document, rebuild the registry and arm the router
    ///
    /// No-op while already starting or ready. Gestures are accepted once the
    /// settle delay has passed, so scroll restoration during initial layout is
    /// never mistaken for user input.
    pub fn start(&mut self, now: Instant) -> Result<()> {
        if self.lifecycle != Lifecycle::Idle {
            trace!("start ignored: engine already {:?}", self.lifecycle);
            return Ok(());
        }

        let descriptors = self
            .viewport
            .query_sections(&self.config.section_selector, &self.config.content_selector);
        self.registry = match SectionRegistry::register(
            descriptors,
            &self.config.section_selector,
            self.config.edge_tolerance_px,
        ) {
            Ok(registry) => registry,
            Err(e) => {
                error!("Snap engine not started: {}", e);
                return Err(e);
            }
        };

        self.style.set_body_class(BodyClass::Initialized, true);
        self.reset(now);
        for index in 0..self.registry.len() {
            self.refresh_edges(index);
        }
        self.router.reset();

        self.lifecycle = Lifecycle::Starting;
        self.tasks.schedule(EngineTask::InitSettle, now, self.config.delay());
        self.events.push(EngineEvent::Started);
        info!(sections = self.registry.len(), "Snap engine started");
        Ok(())
    }

    /// Detach from input and restore native scrolling; safe from any state
    pub fn stop(&mut self) {
        let was = self.lifecycle;

        self.tasks.cancel_all();
        self.container_anim.cancel();
        self.document_anim.cancel();
        self.awaited = None;
        if self.on_settled.take().is_some() {
            debug!("Pending transition callback dropped by stop");
        }

        self.lifecycle = Lifecycle::Idle;
        self.state.initialized = false;
        self.state.snapping = false;
        self.state.suppress_input = false;
        self.state.snapped_to_end = false;

        self.style.set_body_class(BodyClass::Initialized, false);
        self.style.set_body_class(BodyClass::SnappedToEnd, false);
        self.style.set_overflow(Overflow::Auto);
        self.style.set_header_background(DEFAULT_HEADER_BG);

        if was != Lifecycle::Idle {
            self.events.push(EngineEvent::Stopped);
            info!("Snap engine stopped");
        }
    }

    /// Jump back to the first section, abandoning any transition in flight
    pub fn reset(&mut self, _now: Instant) {
        self.viewport.set_scroll_top(ScrollTarget::Document, 0.0);
        self.viewport.set_scroll_top(ScrollTarget::Container, 0.0);

        self.container_anim.cancel();
        self.document_anim.cancel();
        self.awaited = None;
        self.on_settled = None;
        self.tasks.cancel(EngineTask::TransitionSettle);
        if self.state.snapping {
            for index in 0..self.registry.len() {
                self.style.set_section_class(index, SectionClass::Snapping, false);
            }
        }
        self.state.snapping = false;
        self.state.suppress_input = false;

        self.state.current_index = 0;
        self.set_end_lock(false);
        self.style.set_header_background(DEFAULT_HEADER_BG);
        debug!("Snap engine reset to first section");
    }

    /// Stop, start again and jump straight back to `index`
    pub(crate) fn restart_at(&mut self, index: usize, now: Instant) -> Result<()> {
        self.stop();
        self.start(now)?;
        if index != 0 && index < self.registry.len() {
            self.begin_transition(index, true, now);
        }
        Ok(())
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Move to `index`, or jump there when `instant`
    pub fn snap_to(&mut self, index: usize, instant: bool, now: Instant) {
        self.snap_to_inner(index, instant, None, now);
    }

    /// Like [`snap_to`](Self::snap_to), calling `callback` with the new index
    /// once the transition has settled
    pub fn snap_to_then<F>(&mut self, index: usize, instant: bool, now: Instant, callback: F)
    where
        F: FnOnce(usize) + 'static,
    {
        self.snap_to_inner(index, instant, Some(Box::new(callback)), now);
    }

    fn snap_to_inner(
        &mut self,
        index: usize,
        instant: bool,
        callback: Option<SettledCallback>,
        now: Instant,
    ) {
        if index == self.state.current_index {
            trace!(index, "snap_to ignored: already current");
            return;
        }
        if !self.can_transition() {
            debug!(index, "snap_to ignored: engine busy or not ready");
            return;
        }
        if index >= self.registry.len() {
            debug!(index, sections = self.registry.len(), "snap_to ignored: out of range");
            return;
        }

        self.on_settled = callback;
        self.begin_transition(index, instant, now);
    }

    /// Advance one section, wrapping from the last back to the first
    pub fn snap_next(&mut self, now: Instant) {
        if self.state.snapped_to_end || !self.can_transition() {
            trace!("snap_next ignored");
            return;
        }
        let next = (self.state.current_index + 1) % self.registry.len();
        if next == self.state.current_index {
            trace!("snap_next ignored: single section");
            return;
        }
        self.begin_transition_towards(next, HeaderDirection::Down, false, now);
    }

    /// Go back one section; no-op on the first
    pub fn snap_previous(&mut self, now: Instant) {
        if self.state.current_index == 0 || !self.can_transition() {
            trace!("snap_previous ignored");
            return;
        }
        let previous = self.state.current_index - 1;
        self.begin_transition_towards(previous, HeaderDirection::Up, false, now);
    }

    fn can_transition(&self) -> bool {
        self.lifecycle == Lifecycle::Ready && !self.state.snapping
    }

    fn begin_transition(&mut self, index: usize, instant: bool, now: Instant) {
        let direction = if index < self.state.current_index {
            HeaderDirection::Up
        } else {
            HeaderDirection::Down
        };
        self.begin_transition_towards(index, direction, instant, now);
    }

    fn begin_transition_towards(
        &mut self,
        index: usize,
        direction: HeaderDirection,
        instant: bool,
        now: Instant,
    ) {
        let Some(target) = self.registry.get(index) else {
            return;
        };
        let target_offset = target.offset_top();
        let target_has_content = target.has_content();

        let from = self.state.current_index;
        self.pause_media(from);
        self.state.current_index = index;

        if from != index {
            self.style.set_header_direction(direction);
        }

        // Mark the target and take the input lock
        self.style.set_section_class(index, SectionClass::Snapping, true);
        self.state.snapping = true;
        self.state.suppress_input = true;

        // Optimistic pre-animation masking layout settling
        let document_top = self.viewport.scroll_top(ScrollTarget::Document);
        self.document_anim
            .animate(document_top, 0.0, self.config.pre_animation(), now);
        if target_has_content {
            self.style.set_content_offset(index, 100.0);
        }

        let duration = if instant { Duration::ZERO } else { self.config.speed() };
        let container_top = self.viewport.scroll_top(ScrollTarget::Container);
        self.awaited = Some(
            self.container_anim
                .animate(container_top, target_offset, duration, now),
        );

        self.events.push(EngineEvent::TransitionStarted { from, to: index });
        debug!(from, to = index, instant, "Snap transition started");

        if instant {
            self.pump_animations(now);
        }
    }

    fn pause_media(&mut self, index: usize) {
        let Some(section) = self.registry.get(index) else {
            return;
        };
        if !section.has_media() {
            return;
        }
        if let Err(e) = self.media.pause(index) {
            debug!(index, error = %e, "Ignoring media pause failure");
        }
    }

    fn finish_transition(&mut self, now: Instant) {
        if self.lifecycle == Lifecycle::Idle {
            debug!("Transition completed after stop; skipping side effects");
            return;
        }

        let index = self.state.current_index;
        for section in 0..self.registry.len() {
            self.style.set_section_class(section, SectionClass::Snapped, false);
            self.style.set_section_class(section, SectionClass::Snapping, false);
        }
        self.style.set_section_class(index, SectionClass::Snapped, true);

        // Content of the new section may sit anywhere; read its edges fresh
        self.refresh_edges(index);
        self.tasks.schedule(EngineTask::InputSettle, now, self.config.delay());
        self.apply_header_background();

        self.tasks
            .schedule(EngineTask::TransitionSettle, now, self.config.delay());
        trace!(index, "Snap transition animated, settling");
    }

    fn settle_transition(&mut self) {
        self.state.snapping = false;
        self.state.suppress_input = false;
        let index = self.state.current_index;
        self.events.push(EngineEvent::TransitionSettled { index });
        debug!(index, "Snap transition settled");
        if let Some(callback) = self.on_settled.take() {
            callback(index);
        }
    }

    fn apply_header_background(&mut self) {
        let value = self
            .registry
            .get(self.state.current_index)
            .and_then(|s| s.header_bg().map(str::to_owned));
        self.style
            .set_header_background(value.as_deref().unwrap_or(DEFAULT_HEADER_BG));
    }

    // =========================================================================
    // End of sequence
    // =========================================================================

    /// Lock the container once it is fully scrolled on the last section
    pub fn check_end_of_sequence(&mut self) {
        let max = self.viewport.max_scroll_top();
        let top = self.viewport.scroll_top(ScrollTarget::Container);
        let at_max = max - top < self.config.edge_tolerance_px;
        let on_last = self.state.current_index == self.registry.last_index();
        let snapped = at_max && on_last;

        if snapped == self.state.snapped_to_end {
            return;
        }

        self.set_end_lock(snapped);
        debug!(snapped, "End of sequence changed");
    }

    fn release_end(&mut self) {
        self.set_end_lock(false);
        debug!("Released end-of-sequence lock");
    }

    /// Flag, body class and container overflow always move together
    fn set_end_lock(&mut self, snapped: bool) {
        if snapped != self.state.snapped_to_end {
            self.events.push(EngineEvent::SnappedToEnd(snapped));
        }
        self.state.snapped_to_end = snapped;
        self.style.set_body_class(BodyClass::SnappedToEnd, snapped);
        self.style
            .set_overflow(if snapped { Overflow::Hidden } else { Overflow::Auto });
    }

    // =========================================================================
    // Input and frames
    // =========================================================================

    /// Route one input event and run the resulting action
    ///
    /// Returns whether the host must suppress the event's default action.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> Disposition {
        if self.lifecycle == Lifecycle::Idle {
            return Disposition::PassThrough;
        }

        let view = self.router_view();
        let routing = self.router.route(&event, &view, now);

        match routing.action {
            RouterAction::None => {}
            RouterAction::SnapNext => self.snap_next(now),
            RouterAction::SnapPrevious => self.snap_previous(now),
            RouterAction::SnapTo(index) => self.snap_to(index, true, now),
            RouterAction::ReleaseEnd => self.release_end(),
            RouterAction::UpdateEdges { index, metrics } => {
                if self.registry.update_edges(index, metrics) {
                    self.state.suppress_input = true;
                    self.tasks.schedule(EngineTask::InputSettle, now, self.config.delay());
                }
            }
            RouterAction::CheckEnd => self.check_end_of_sequence(),
        }

        routing.disposition
    }

    /// Fire due timers and advance animations
    pub fn tick(&mut self, now: Instant) {
        for task in self.tasks.take_due(now) {
            match task {
                EngineTask::InitSettle => {
                    if self.lifecycle == Lifecycle::Starting {
                        self.lifecycle = Lifecycle::Ready;
                        self.state.initialized = true;
                        self.events.push(EngineEvent::Ready);
                        info!("Snap engine ready");
                    }
                }
                EngineTask::TransitionSettle => self.settle_transition(),
                EngineTask::InputSettle => {
                    // A transition keeps input suppressed until it settles
                    if !self.state.snapping {
                        self.state.suppress_input = false;
                    }
                }
            }
        }

        self.pump_animations(now);
    }

    fn pump_animations(&mut self, now: Instant) {
        if let Some(frame) = self.document_anim.update(now) {
            self.viewport.set_scroll_top(ScrollTarget::Document, frame.offset);
        }

        let Some(frame) = self.container_anim.update(now) else {
            return;
        };
        self.viewport.set_scroll_top(ScrollTarget::Container, frame.offset);

        let index = self.state.current_index;
        if self.registry.get(index).is_some_and(Section::has_content) {
            let offset = if frame.finished { 0.0 } else { parallax_offset(frame.progress) };
            self.style.set_content_offset(index, offset);
        }

        self.check_end_of_sequence();

        if frame.finished && self.awaited == Some(frame.id) {
            self.awaited = None;
            self.finish_transition(now);
        }
    }

    fn refresh_edges(&mut self, index: usize) {
        if let Some(metrics) = self.viewport.content_metrics(index) {
            self.registry.update_edges(index, metrics);
        }
    }

    fn router_view(&self) -> RouterView {
        RouterView {
            initialized: self.state.initialized,
            snapping: self.state.snapping,
            suppress_input: self.state.suppress_input,
            snapped_to_end: self.state.snapped_to_end,
            edges: self.current_section().map(|s| Edges {
                at_start: s.scrolled_to_start,
                at_end: s.scrolled_to_end,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::headless::{MemoryViewport, RecordingMedia, RecordingStyle, SectionSpec};
    use crate::registry::ScrollMetrics;
    use crate::Error;

    type TestEngine = SnapEngine<MemoryViewport, RecordingStyle, RecordingMedia>;

    const HEIGHT: f64 = 800.0;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn engine_with(specs: Vec<SectionSpec>) -> TestEngine {
        let viewport = MemoryViewport::new(HEIGHT, specs);
        SnapEngine::new(
            SnapConfig::default(),
            &GestureConfig::default(),
            viewport,
            RecordingStyle::default(),
            RecordingMedia::default(),
        )
        .unwrap()
    }

    /// Sections whose content fits the viewport (at both edges)
    fn engine(count: usize) -> TestEngine {
        engine_with((0..count).map(|_| SectionSpec::fitting()).collect())
    }

    fn started(count: usize, t0: Instant) -> TestEngine {
        let mut engine = engine(count);
        engine.start(t0).unwrap();
        engine.tick(t0 + ms(300));
        assert!(engine.is_ready());
        engine
    }

    /// Tick through a full transition and its settle delay
    fn settle(engine: &mut TestEngine, from: Instant) -> Instant {
        let mut now = from;
        for _ in 0..80 {
            now += ms(16);
            engine.tick(now);
        }
        now
    }

    #[test]
    fn test_new_without_sections_is_error() {
        let result = SnapEngine::new(
            SnapConfig::default(),
            &GestureConfig::default(),
            MemoryViewport::new(HEIGHT, Vec::new()),
            RecordingStyle::default(),
            RecordingMedia::default(),
        );
        assert!(matches!(result, Err(Error::NoSections(_))));
    }

    #[test]
    fn test_start_settles_into_ready() {
        let t0 = Instant::now();
        let mut engine = engine(3);
        engine.start(t0).unwrap();

        assert_eq!(engine.lifecycle(), Lifecycle::Starting);
        assert!(!engine.state().initialized);
        assert!(engine.style().has_body_class(BodyClass::Initialized));

        engine.tick(t0 + ms(299));
        assert!(!engine.is_ready());
        engine.tick(t0 + ms(300));
        assert!(engine.is_ready());
        assert!(engine.state().initialized);
        assert_eq!(engine.drain_events(), vec![EngineEvent::Started, EngineEvent::Ready]);
    }

    #[test]
    fn test_start_is_idempotent() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        engine.start(t0 + ms(400)).unwrap();
        assert!(engine.is_ready());
    }

    #[test]
    fn test_start_stop_start_round_trip() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        engine.snap_next(t0 + ms(300));
        let now = settle(&mut engine, t0 + ms(300));
        assert_eq!(engine.current_index(), 1);

        engine.stop();
        assert_eq!(engine.lifecycle(), Lifecycle::Idle);
        assert!(!engine.state().initialized);
        assert!(!engine.style().has_body_class(BodyClass::Initialized));

        engine.start(now).unwrap();
        assert_eq!(engine.current_index(), 0);
        assert!(!engine.state().initialized);
        engine.tick(now + ms(300));
        assert!(engine.state().initialized);
    }

    #[test]
    fn test_snap_to_current_never_animates() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        engine.drain_events();

        engine.snap_to(0, false, t0 + ms(300));
        assert!(!engine.state().snapping);
        assert!(!engine.needs_update());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_snap_to_before_ready_is_ignored() {
        let t0 = Instant::now();
        let mut engine = engine(3);
        engine.start(t0).unwrap();
        engine.snap_to(2, false, t0);
        assert_eq!(engine.current_index(), 0);
        assert!(!engine.state().snapping);
    }

    #[test]
    fn test_snap_to_out_of_range_is_ignored() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        engine.snap_to(7, false, t0 + ms(300));
        assert_eq!(engine.current_index(), 0);
        assert!(!engine.state().snapping);
    }

    #[test]
    fn test_snap_to_animates_to_stored_offset() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        let start = t0 + ms(300);
        engine.snap_to(2, false, start);

        assert_eq!(engine.current_index(), 2);
        assert!(engine.state().snapping);
        assert!(engine.state().suppress_input);
        assert!(engine.style().section_has(2, SectionClass::Snapping));
        assert_eq!(engine.style().header_direction(), Some(HeaderDirection::Down));

        engine.tick(start + ms(375));
        let midway = engine.viewport().scroll_top(ScrollTarget::Container);
        assert!(midway > 0.0 && midway < 2.0 * HEIGHT);

        engine.tick(start + ms(750));
        assert_eq!(engine.viewport().scroll_top(ScrollTarget::Container), 2.0 * HEIGHT);
        assert!(engine.state().snapping, "lock held through the settle delay");

        engine.tick(start + ms(1050));
        assert!(!engine.state().snapping);
        assert!(!engine.state().suppress_input);
    }

    #[test]
    fn test_instant_snap_completes_in_same_call() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        let now = t0 + ms(300);
        engine.snap_to(1, true, now);

        assert_eq!(engine.viewport().scroll_top(ScrollTarget::Container), HEIGHT);
        assert!(engine.style().section_has(1, SectionClass::Snapped));
        assert!(!engine.style().section_has(1, SectionClass::Snapping));
        assert!(engine.state().snapping);

        engine.tick(now + ms(300));
        assert!(!engine.state().snapping);
    }

    #[test]
    fn test_snap_requests_while_snapping_advance_once() {
        let t0 = Instant::now();
        let mut engine = started(4, t0);
        let mut now = t0 + ms(300);

        engine.snap_next(now);
        for _ in 0..10 {
            now += ms(10);
            engine.snap_next(now);
            engine.snap_previous(now);
            engine.snap_to(3, false, now);
            engine.tick(now);
        }
        assert_eq!(engine.current_index(), 1);

        let now = settle(&mut engine, now);
        assert_eq!(engine.current_index(), 1);
        engine.snap_next(now);
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn test_snap_next_wraps_from_last() {
        let t0 = Instant::now();
        // Trailing space below the last section keeps the end of sequence unlocked
        let mut engine = engine(3);
        engine.viewport_mut().set_trailing_space(HEIGHT);
        engine.start(t0).unwrap();
        engine.tick(t0 + ms(300));

        engine.snap_to(2, true, t0 + ms(300));
        let now = settle(&mut engine, t0 + ms(300));
        assert_eq!(engine.current_index(), 2);
        assert!(!engine.state().snapped_to_end);

        engine.snap_next(now);
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.style().header_direction(), Some(HeaderDirection::Down));
    }

    #[test]
    fn test_snap_previous_at_first_is_noop() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        engine.snap_previous(t0 + ms(300));
        assert_eq!(engine.current_index(), 0);
        assert!(!engine.state().snapping);
    }

    #[test]
    fn test_single_snapped_class_after_transitions() {
        let t0 = Instant::now();
        let mut engine = started(4, t0);
        let mut now = t0 + ms(300);

        for target in [2usize, 1, 3, 0] {
            engine.snap_to(target, false, now);
            now = settle(&mut engine, now);
            let snapped: Vec<usize> = (0..4)
                .filter(|i| engine.style().section_has(*i, SectionClass::Snapped))
                .collect();
            assert_eq!(snapped, vec![target]);
            assert!((0..4).all(|i| !engine.style().section_has(i, SectionClass::Snapping)));
        }
    }

    #[test]
    fn test_wheel_down_at_section_end_snaps_next() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        let now = t0 + ms(300);
        assert!(engine.current_section().unwrap().scrolled_to_end);

        let disposition = engine.handle_event(InputEvent::Wheel { delta_y: 40.0 }, now);
        assert_eq!(disposition, Disposition::PreventDefault);
        assert_eq!(engine.current_index(), 1);
        assert_eq!(engine.style().header_direction(), Some(HeaderDirection::Down));
    }

    #[test]
    fn test_wheel_inside_tall_section_scrolls_natively() {
        let t0 = Instant::now();
        let mut engine = engine_with(vec![
            SectionSpec::tall(2000.0),
            SectionSpec::fitting(),
        ]);
        engine.start(t0).unwrap();
        engine.tick(t0 + ms(300));

        let section = engine.current_section().unwrap();
        assert!(section.scrolled_to_start && !section.scrolled_to_end);

        let disposition = engine.handle_event(InputEvent::Wheel { delta_y: 40.0 }, t0 + ms(300));
        assert_eq!(disposition, Disposition::PassThrough);
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn test_section_scroll_arms_suppression_window() {
        let t0 = Instant::now();
        let mut engine = engine_with(vec![
            SectionSpec::tall(2000.0),
            SectionSpec::fitting(),
        ]);
        engine.start(t0).unwrap();
        let mut now = t0 + ms(300);
        engine.tick(now);

        // Content reaches its bottom: edges update and input is suppressed
        let metrics = ScrollMetrics::new(1200.0, 2000.0, HEIGHT);
        engine.handle_event(InputEvent::SectionScroll { index: 0, metrics }, now);
        assert!(engine.current_section().unwrap().scrolled_to_end);
        assert!(engine.state().suppress_input);

        now += ms(100);
        let disposition = engine.handle_event(InputEvent::Wheel { delta_y: 40.0 }, now);
        assert_eq!(disposition, Disposition::PreventDefault);
        assert_eq!(engine.current_index(), 0, "no snap inside the suppression window");

        now += ms(300);
        engine.tick(now);
        assert!(!engine.state().suppress_input);
        engine.handle_event(InputEvent::Wheel { delta_y: 40.0 }, now);
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_snapped_to_end_lock_and_escape() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        engine.snap_to(2, true, t0 + ms(300));
        let mut now = settle(&mut engine, t0 + ms(300));

        assert!(engine.state().snapped_to_end);
        assert!(engine.style().has_body_class(BodyClass::SnappedToEnd));
        assert_eq!(engine.style().overflow(), Overflow::Hidden);

        now += ms(500);
        let disposition = engine.handle_event(InputEvent::Wheel { delta_y: 40.0 }, now);
        assert_eq!(disposition, Disposition::PreventDefault);
        assert_eq!(engine.current_index(), 2);
        assert!(!engine.state().snapping);

        now += ms(500);
        let disposition = engine.handle_event(InputEvent::Wheel { delta_y: -40.0 }, now);
        assert_eq!(disposition, Disposition::PassThrough);
        assert!(!engine.state().snapped_to_end);
        assert_eq!(engine.style().overflow(), Overflow::Auto);
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn test_snap_next_blocked_when_snapped_to_end() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        engine.snap_to(2, true, t0 + ms(300));
        let now = settle(&mut engine, t0 + ms(300));
        engine.snap_next(now);
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn test_wheel_before_ready_is_blocked() {
        let t0 = Instant::now();
        let mut engine = engine(3);
        assert_eq!(
            engine.handle_event(InputEvent::Wheel { delta_y: 40.0 }, t0),
            Disposition::PassThrough,
            "idle engine leaves input alone"
        );

        engine.start(t0).unwrap();
        assert_eq!(
            engine.handle_event(InputEvent::Wheel { delta_y: 40.0 }, t0),
            Disposition::PreventDefault
        );
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn test_touch_swipe_up_snaps_next() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        let now = t0 + ms(300);
        engine.handle_event(InputEvent::TouchStart { y: 600.0 }, now);
        engine.handle_event(InputEvent::TouchEnd { y: 400.0 }, now + ms(120));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_focus_tab_jumps_instantly() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        let now = t0 + ms(300);
        engine.handle_event(InputEvent::FocusTab { section: Some(2) }, now);
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.viewport().scroll_top(ScrollTarget::Container), 2.0 * HEIGHT);
    }

    #[test]
    fn test_media_paused_when_leaving_section() {
        let t0 = Instant::now();
        let mut engine = engine_with(vec![
            SectionSpec::fitting().with_media(),
            SectionSpec::fitting(),
        ]);
        engine.start(t0).unwrap();
        engine.tick(t0 + ms(300));

        engine.snap_next(t0 + ms(300));
        assert_eq!(engine.media().paused(), &[0]);
    }

    #[test]
    fn test_media_failure_is_ignored() {
        let t0 = Instant::now();
        let mut engine = engine_with(vec![
            SectionSpec::fitting().with_media(),
            SectionSpec::fitting(),
        ]);
        engine.media.fail_with("player detached");
        engine.start(t0).unwrap();
        engine.tick(t0 + ms(300));

        engine.snap_next(t0 + ms(300));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_header_background_follows_section() {
        let t0 = Instant::now();
        let mut engine = engine_with(vec![
            SectionSpec::fitting(),
            SectionSpec::fitting().with_header_bg("#112233"),
            SectionSpec::fitting(),
        ]);
        engine.start(t0).unwrap();
        engine.tick(t0 + ms(300));

        engine.snap_to(1, true, t0 + ms(300));
        assert_eq!(engine.style().header_background(), "#112233");

        let now = settle(&mut engine, t0 + ms(300));
        engine.snap_previous(now);
        let _ = settle(&mut engine, now);
        assert_eq!(engine.style().header_background(), DEFAULT_HEADER_BG);
        assert_eq!(engine.style().header_direction(), Some(HeaderDirection::Up));
    }

    #[test]
    fn test_parallax_offset_settles_to_zero() {
        let t0 = Instant::now();
        let mut engine = engine_with(vec![
            SectionSpec::fitting().with_content(),
            SectionSpec::fitting().with_content(),
        ]);
        engine.start(t0).unwrap();
        let start = t0 + ms(300);
        engine.tick(start);

        engine.snap_next(start);
        assert_eq!(engine.style().content_offset(1), Some(100.0));

        engine.tick(start + ms(375));
        let midway = engine.style().content_offset(1).unwrap();
        assert!(midway > 0.0 && midway < 100.0);

        engine.tick(start + ms(750));
        assert_eq!(engine.style().content_offset(1), Some(0.0));
    }

    #[test]
    fn test_stop_mid_transition_releases_everything() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        engine.snap_to_then(2, false, t0 + ms(300), move |_| flag.set(true));
        engine.tick(t0 + ms(400));

        engine.stop();
        assert!(!engine.state().snapping);
        assert!(!engine.state().suppress_input);
        assert!(!engine.needs_update());

        // Timers and animations were voided by stop
        settle(&mut engine, t0 + ms(400));
        assert!(!called.get());
        assert!(!engine.style().section_has(2, SectionClass::Snapped));
    }

    #[test]
    fn test_completion_callback_runs_after_settle() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        let landed = Rc::new(Cell::new(None));
        let slot = landed.clone();
        engine.snap_to_then(1, false, t0 + ms(300), move |index| slot.set(Some(index)));

        engine.tick(t0 + ms(1050));
        assert_eq!(landed.get(), None);
        engine.tick(t0 + ms(1350));
        assert_eq!(landed.get(), Some(1));
    }

    #[test]
    fn test_reset_mid_transition_does_not_deadlock() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        let now = t0 + ms(300);
        engine.snap_to(2, false, now);
        engine.reset(now + ms(100));

        assert_eq!(engine.current_index(), 0);
        assert!(!engine.state().snapping);
        assert_eq!(engine.viewport().scroll_top(ScrollTarget::Container), 0.0);

        engine.snap_next(now + ms(200));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_reset_from_end_restores_free_scroll() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        engine.snap_to(2, true, t0 + ms(300));
        let now = settle(&mut engine, t0 + ms(300));
        assert_eq!(engine.style().overflow(), Overflow::Hidden);

        engine.reset(now);
        engine.handle_event(InputEvent::ContainerScroll, now);

        assert_eq!(engine.current_index(), 0);
        assert!(!engine.state().snapped_to_end);
        assert!(!engine.style().has_body_class(BodyClass::SnappedToEnd));
        assert_eq!(engine.style().overflow(), Overflow::Auto);
    }

    #[test]
    fn test_snap_next_with_single_section_is_noop() {
        let t0 = Instant::now();
        let mut engine = engine_with(vec![SectionSpec::fitting().with_media()]);
        engine.start(t0).unwrap();
        engine.tick(t0 + ms(300));
        engine.drain_events();

        engine.snap_next(t0 + ms(400));

        assert!(!engine.state().snapping);
        assert!(engine.media().paused().is_empty());
        assert!(!engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, EngineEvent::TransitionStarted { .. })));
    }

    #[test]
    fn test_restart_at_returns_to_index() {
        let t0 = Instant::now();
        let mut engine = started(3, t0);
        engine.snap_to(1, true, t0 + ms(300));
        let now = settle(&mut engine, t0 + ms(300));

        engine.restart_at(1, now).unwrap();
        assert_eq!(engine.lifecycle(), Lifecycle::Starting);
        assert_eq!(engine.current_index(), 1);
        assert_eq!(engine.viewport().scroll_top(ScrollTarget::Container), HEIGHT);

        let _ = settle(&mut engine, now);
        assert!(engine.is_ready());
        assert!(!engine.state().snapping);
    }
}
