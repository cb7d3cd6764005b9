//! Contracts the engine needs from its environment
//!
//! The engine never touches a document directly. Sections are addressed by
//! their registration index; scroll offsets, classes and media go through the
//! traits below so the state machine runs the same against a browser binding,
//! a terminal deck or a test recorder.

use crate::registry::{ScrollMetrics, SectionDescriptor};

/// Which scroll resource an offset refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollTarget {
    /// The element holding all sections; the animator's main resource
    Container,
    /// The document itself, nudged to 0 before each transition
    Document,
}

/// Overflow mode of the scroll container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Auto,
    Hidden,
}

/// State classes toggled on the document body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyClass {
    Initialized,
    SnappedToEnd,
}

impl BodyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyClass::Initialized => "engine-initialized",
            BodyClass::SnappedToEnd => "snapped-to-end",
        }
    }
}

/// State classes toggled on section containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionClass {
    Snapping,
    Snapped,
}

impl SectionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionClass::Snapping => "is-snapping",
            SectionClass::Snapped => "is-snapped",
        }
    }
}

/// Last direction of travel, reflected on the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderDirection {
    Up,
    Down,
}

impl HeaderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderDirection::Up => "scrolled-up",
            HeaderDirection::Down => "scrolled-down",
        }
    }
}

/// Header background used when a section declares none
pub const DEFAULT_HEADER_BG: &str = "transparent";

/// Section source and scroll surface
pub trait Viewport {
    /// Snapshot the sections matching `section_selector`, in document order
    fn query_sections(
        &mut self,
        section_selector: &str,
        content_selector: &str,
    ) -> Vec<SectionDescriptor>;

    /// Current scroll geometry of a section's content, if it exists
    fn content_metrics(&self, index: usize) -> Option<ScrollMetrics>;

    fn scroll_top(&self, target: ScrollTarget) -> f64;

    fn set_scroll_top(&mut self, target: ScrollTarget, value: f64);

    /// Largest reachable container scroll offset
    fn max_scroll_top(&self) -> f64;
}

/// Visual side effects
pub trait StyleSink {
    fn set_body_class(&mut self, class: BodyClass, enabled: bool);

    fn set_section_class(&mut self, index: usize, class: SectionClass, enabled: bool);

    /// Apply `scrolled-up` / `scrolled-down`, removing the other
    fn set_header_direction(&mut self, direction: HeaderDirection);

    fn set_header_background(&mut self, value: &str);

    /// Vertical offset of a section's content, in percent of its height
    fn set_content_offset(&mut self, index: usize, percent: f64);

    fn set_overflow(&mut self, overflow: Overflow);
}

/// Media playback embedded in sections
pub trait MediaController {
    /// Pause whatever plays inside `index`
    fn pause(&mut self, index: usize) -> crate::Result<()>;
}

/// Media controller for hosts without media
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaController for NoMedia {
    fn pause(&mut self, _index: usize) -> crate::Result<()> {
        Ok(())
    }
}
