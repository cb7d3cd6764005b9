use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info};

use snapscroll_core::engine::{EngineEvent, Lifecycle};
use snapscroll_core::headless::{MemoryViewport, RecordingMedia, RecordingStyle};
use snapscroll_core::host::{Overflow, ScrollTarget, Viewport};
use snapscroll_core::{AppConfig, Disposition, InputEvent, ResponsiveController, SnapEngine};

use crate::deck::Deck;
use crate::input::Action;
use crate::theme::Theme;

/// Pixel height of one terminal row as seen by the engine
pub const ROW_PX: f64 = 16.0;
/// Pixel width of one terminal column, for the breakpoint
pub const COL_PX: f64 = 8.0;
/// Rows taken by the header and status bar
const CHROME_ROWS: u16 = 2;

type DeckController = ResponsiveController<MemoryViewport, RecordingStyle, RecordingMedia>;

pub struct App {
    pub config: AppConfig,
    pub deck: Deck,
    pub theme: Theme,
    pub should_quit: bool,
    pub status_message: Option<String>,
    controller: DeckController,
    /// Rows available to sections
    deck_rows: u16,
}

impl App {
    pub fn new(config: AppConfig, deck: Deck, cols: u16, rows: u16, now: Instant) -> Result<Self> {
        let deck_rows = rows.saturating_sub(CHROME_ROWS).max(1);
        let viewport =
            MemoryViewport::new(f64::from(deck_rows) * ROW_PX, deck.specs(ROW_PX, deck_rows));

        let mut media = RecordingMedia::default();
        for (index, section) in deck.sections.iter().enumerate() {
            if section.media.is_some() {
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
        let controller = ResponsiveController::new(engine, f64::from(cols) * COL_PX, now);
        info!(title = %deck.title, sections = deck.len(), "Deck loaded");

        Ok(Self {
            config,
            deck,
            theme: Theme::default(),
            should_quit: false,
            status_message: None,
            controller,
            deck_rows,
        })
    }

    pub fn controller(&self) -> &DeckController {
        &self.controller
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.controller.engine().lifecycle()
    }

    pub fn current_index(&self) -> usize {
        self.controller.engine().current_index()
    }

    pub fn viewport(&self) -> &MemoryViewport {
        self.controller.engine().viewport()
    }

    pub fn style(&self) -> &RecordingStyle {
        self.controller.engine().style()
    }

    pub fn media(&self) -> &RecordingMedia {
        self.controller.engine().media()
    }

    pub fn deck_rows(&self) -> u16 {
        self.deck_rows
    }

    /// Section index the viewport shows; follows native scrolling when idle
    pub fn visible_index(&self) -> usize {
        if self.lifecycle() == Lifecycle::Idle {
            self.viewport().section_at_top()
        } else {
            self.current_index()
        }
    }

    /// Whether the loop should poll at animation frame rate
    pub fn needs_fast_update(&self, now: Instant, tick_rate: std::time::Duration) -> bool {
        self.controller.needs_update()
            || self
                .controller
                .next_deadline()
                .is_some_and(|deadline| deadline <= now + tick_rate)
    }

    pub fn tick(&mut self, now: Instant) {
        self.controller.tick(now);
        for event in self.controller.engine_mut().drain_events() {
            self.on_engine_event(event);
        }
    }

    pub fn on_resize(&mut self, cols: u16, rows: u16, now: Instant) {
        let deck_rows = rows.saturating_sub(CHROME_ROWS).max(1);
        self.deck_rows = deck_rows;
        let specs = self.deck.specs(ROW_PX, deck_rows);
        let viewport = self.controller.engine_mut().viewport_mut();
        viewport.set_height(f64::from(deck_rows) * ROW_PX);
        viewport.set_sections(specs);
        self.controller.on_resize(f64::from(cols) * COL_PX, now);
        debug!(cols, rows, "Terminal resized");
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::WheelDown => self.wheel(1.0, now),
            Action::WheelUp => self.wheel(-1.0, now),
            Action::FocusNext => {
                let last = self.deck.len().saturating_sub(1);
                let section = (self.visible_index() + 1).min(last);
                self.focus(section, now);
            }
            Action::FocusPrevious => {
                let section = self.visible_index().saturating_sub(1);
                self.focus(section, now);
            }
            Action::SnapNext => self.controller.engine_mut().snap_next(now),
            Action::SnapPrevious => self.controller.engine_mut().snap_previous(now),
            Action::SnapTo(index) => {
                if index < self.deck.len() {
                    self.controller.engine_mut().snap_to(index, false, now);
                } else {
                    self.status_message = Some(format!("No section {}", index + 1));
                }
            }
            Action::Reset => self.controller.engine_mut().reset(now),
            Action::None => {}
        }
    }

    /// One wheel notch; `direction` is +1 for down
    pub fn wheel(&mut self, direction: f64, now: Instant) {
        let delta = direction * self.config.ui.wheel_step * ROW_PX;
        let disposition = self
            .controller
            .handle_event(InputEvent::Wheel { delta_y: delta }, now);
        if disposition == Disposition::PassThrough {
            self.native_scroll(delta, now);
        }
    }

    fn focus(&mut self, section: usize, now: Instant) {
        let disposition = self
            .controller
            .handle_event(InputEvent::FocusTab { section: Some(section) }, now);
        // Without the engine, focus scrolls the section into view natively
        if disposition == Disposition::PassThrough && self.lifecycle() == Lifecycle::Idle {
            let height = self.viewport().height();
            self.controller
                .engine_mut()
                .viewport_mut()
                .set_scroll_top(ScrollTarget::Container, section as f64 * height);
        }
    }

    /// Scroll the way the terminal would without interception
    fn native_scroll(&mut self, delta: f64, now: Instant) {
        let index = self.visible_index();
        let engine = self.controller.engine_mut();
        let scrollable = engine.style().overflow() == Overflow::Auto;
        if let Some(event) = engine.viewport_mut().native_scroll(index, delta, scrollable) {
            self.controller.handle_event(event, now);
        }
    }

    fn on_engine_event(&mut self, event: EngineEvent) {
        self.status_message = match event {
            EngineEvent::Ready => Some("Snapping enabled".to_string()),
            EngineEvent::Stopped => Some("Viewport too narrow, free scrolling".to_string()),
            EngineEvent::SnappedToEnd(true) => Some("End of deck".to_string()),
            EngineEvent::TransitionSettled { .. } | EngineEvent::SnappedToEnd(false) => None,
            EngineEvent::Started | EngineEvent::TransitionStarted { .. } => {
                return;
            }
        };
    }
}
