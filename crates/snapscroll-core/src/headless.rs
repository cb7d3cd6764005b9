//! In-memory host
//!
//! Stacked full-height sections with optional scrollable content, a style
//! recorder and a media recorder. Used by the simulator, the terminal deck
//! and the tests.

use std::collections::{HashMap, HashSet};

use crate::host::{
    BodyClass, HeaderDirection, MediaController, Overflow, ScrollTarget, SectionClass, StyleSink,
    Viewport, DEFAULT_HEADER_BG,
};
use crate::registry::{ScrollMetrics, SectionDescriptor};
use crate::router::InputEvent;
use crate::{Error, Result};

/// Shape of one in-memory section
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionSpec {
    /// Content height; `None` fits the viewport exactly
    pub content_height: Option<f64>,
    pub has_content: bool,
    pub header_bg: Option<String>,
    pub has_media: bool,
}

impl SectionSpec {
    /// Section whose content fits the viewport
    pub fn fitting() -> Self {
        Self::default()
    }

    /// Section with its own content element of `height`
    pub fn tall(height: f64) -> Self {
        Self {
            content_height: Some(height),
            has_content: true,
            ..Self::default()
        }
    }

    pub fn with_content(mut self) -> Self {
        self.has_content = true;
        self
    }

    pub fn with_header_bg(mut self, value: &str) -> Self {
        self.header_bg = Some(value.to_string());
        self
    }

    pub fn with_media(mut self) -> Self {
        self.has_media = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct MemoryViewport {
    height: f64,
    sections: Vec<SectionSpec>,
    content_scroll: Vec<f64>,
    container_top: f64,
    document_top: f64,
    trailing_space: f64,
}

impl MemoryViewport {
    pub fn new(height: f64, sections: Vec<SectionSpec>) -> Self {
        let content_scroll = vec![0.0; sections.len()];
        Self {
            height,
            sections,
            content_scroll,
            container_top: 0.0,
            document_top: 0.0,
            trailing_space: 0.0,
        }
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Change the viewport height; sections keep filling it
    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        for index in 0..self.sections.len() {
            self.content_scroll[index] = self.content_scroll[index].min(self.content_range(index));
        }
        self.container_top = self.container_top.min(self.max_scroll_top());
    }

    /// Replace the section shapes, as after a reflow
    ///
    /// Takes effect for the engine on its next registration.
    pub fn set_sections(&mut self, sections: Vec<SectionSpec>) {
        self.content_scroll.resize(sections.len(), 0.0);
        self.sections = sections;
        for index in 0..self.sections.len() {
            self.content_scroll[index] = self.content_scroll[index].min(self.content_range(index));
        }
        self.container_top = self.container_top.min(self.max_scroll_top());
    }

    /// Extra scrollable space below the last section, such as a footer
    pub fn set_trailing_space(&mut self, space: f64) {
        self.trailing_space = space.max(0.0);
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    pub fn content_scroll(&self, index: usize) -> f64 {
        self.content_scroll.get(index).copied().unwrap_or(0.0)
    }

    /// Index of the section covering the top of the viewport
    pub fn section_at_top(&self) -> usize {
        if self.height <= 0.0 || self.sections.is_empty() {
            return 0;
        }
        let index = (self.container_top / self.height).floor() as usize;
        index.min(self.sections.len() - 1)
    }

    /// Perform a native scroll of `delta` pixels on section `index`
    ///
    /// Content scrolls first; once it sits at the relevant edge the container
    /// takes over, if `container_scrollable`. Returns the scroll event the
    /// host would observe, or `None` when nothing moved.
    pub fn native_scroll(
        &mut self,
        index: usize,
        delta: f64,
        container_scrollable: bool,
    ) -> Option<InputEvent> {
        if index < self.sections.len() {
            let before = self.content_scroll[index];
            let after = (before + delta).clamp(0.0, self.content_range(index));
            if after != before {
                self.content_scroll[index] = after;
                let metrics = self.content_metrics(index)?;
                return Some(InputEvent::SectionScroll { index, metrics });
            }
        }

        if !container_scrollable {
            return None;
        }
        let before = self.container_top;
        let after = (before + delta).clamp(0.0, self.max_scroll_top());
        if after == before {
            return None;
        }
        self.container_top = after;
        Some(InputEvent::ContainerScroll)
    }

    fn content_height(&self, index: usize) -> f64 {
        self.sections
            .get(index)
            .and_then(|s| s.content_height)
            .map_or(self.height, |h| h.max(self.height))
    }

    fn content_range(&self, index: usize) -> f64 {
        self.content_height(index) - self.height
    }
}

impl Viewport for MemoryViewport {
    fn query_sections(
        &mut self,
        _section_selector: &str,
        _content_selector: &str,
    ) -> Vec<SectionDescriptor> {
        self.sections
            .iter()
            .enumerate()
            .map(|(index, spec)| SectionDescriptor {
                offset_top: index as f64 * self.height,
                has_content: spec.has_content,
                header_bg: spec.header_bg.clone(),
                has_media: spec.has_media,
            })
            .collect()
    }

    fn content_metrics(&self, index: usize) -> Option<ScrollMetrics> {
        let scroll_top = *self.content_scroll.get(index)?;
        Some(ScrollMetrics::new(scroll_top, self.content_height(index), self.height))
    }

    fn scroll_top(&self, target: ScrollTarget) -> f64 {
        match target {
            ScrollTarget::Container => self.container_top,
            ScrollTarget::Document => self.document_top,
        }
    }

    fn set_scroll_top(&mut self, target: ScrollTarget, value: f64) {
        match target {
            ScrollTarget::Container => self.container_top = value.clamp(0.0, self.max_scroll_top()),
            ScrollTarget::Document => self.document_top = value.max(0.0),
        }
    }

    fn max_scroll_top(&self) -> f64 {
        let total = self.sections.len() as f64 * self.height + self.trailing_space;
        (total - self.height).max(0.0)
    }
}

/// One recorded style mutation
#[derive(Debug, Clone, PartialEq)]
pub enum StyleCall {
    BodyClass(BodyClass, bool),
    SectionClass(usize, SectionClass, bool),
    HeaderDirection(HeaderDirection),
    HeaderBackground(String),
    ContentOffset(usize, f64),
    Overflow(Overflow),
}

#[derive(Debug, Clone)]
pub struct RecordingStyle {
    body: HashSet<BodyClass>,
    sections: HashMap<usize, HashSet<SectionClass>>,
    header_direction: Option<HeaderDirection>,
    header_background: String,
    content_offsets: HashMap<usize, f64>,
    overflow: Overflow,
    calls: Vec<StyleCall>,
}

impl Default for RecordingStyle {
    fn default() -> Self {
        Self {
            body: HashSet::new(),
            sections: HashMap::new(),
            header_direction: None,
            header_background: DEFAULT_HEADER_BG.to_string(),
            content_offsets: HashMap::new(),
            overflow: Overflow::Auto,
            calls: Vec::new(),
        }
    }
}

impl RecordingStyle {
    pub fn has_body_class(&self, class: BodyClass) -> bool {
        self.body.contains(&class)
    }

    pub fn body_classes(&self) -> Vec<&'static str> {
        let mut classes: Vec<&'static str> = self.body.iter().map(BodyClass::as_str).collect();
        classes.sort_unstable();
        classes
    }

    pub fn section_has(&self, index: usize, class: SectionClass) -> bool {
        self.sections.get(&index).is_some_and(|set| set.contains(&class))
    }

    /// Indices carrying `class`, ascending
    pub fn sections_with(&self, class: SectionClass) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .sections
            .iter()
            .filter(|(_, set)| set.contains(&class))
            .map(|(index, _)| *index)
            .collect();
        indices.sort_unstable();
        indices
    }

    pub fn header_direction(&self) -> Option<HeaderDirection> {
        self.header_direction
    }

    pub fn header_background(&self) -> &str {
        &self.header_background
    }

    pub fn content_offset(&self, index: usize) -> Option<f64> {
        self.content_offsets.get(&index).copied()
    }

    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    pub fn calls(&self) -> &[StyleCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl StyleSink for RecordingStyle {
    fn set_body_class(&mut self, class: BodyClass, enabled: bool) {
        if enabled {
            self.body.insert(class);
        } else {
            self.body.remove(&class);
        }
        self.calls.push(StyleCall::BodyClass(class, enabled));
    }

    fn set_section_class(&mut self, index: usize, class: SectionClass, enabled: bool) {
        let set = self.sections.entry(index).or_default();
        if enabled {
            set.insert(class);
        } else {
            set.remove(&class);
        }
        self.calls.push(StyleCall::SectionClass(index, class, enabled));
    }

    fn set_header_direction(&mut self, direction: HeaderDirection) {
        self.header_direction = Some(direction);
        self.calls.push(StyleCall::HeaderDirection(direction));
    }

    fn set_header_background(&mut self, value: &str) {
        self.header_background = value.to_string();
        self.calls.push(StyleCall::HeaderBackground(value.to_string()));
    }

    fn set_content_offset(&mut self, index: usize, percent: f64) {
        self.content_offsets.insert(index, percent);
        self.calls.push(StyleCall::ContentOffset(index, percent));
    }

    fn set_overflow(&mut self, overflow: Overflow) {
        self.overflow = overflow;
        self.calls.push(StyleCall::Overflow(overflow));
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingMedia {
    playing: HashSet<usize>,
    paused: Vec<usize>,
    failure: Option<String>,
}

impl RecordingMedia {
    pub fn play(&mut self, index: usize) {
        self.playing.insert(index);
    }

    pub fn is_playing(&self, index: usize) -> bool {
        self.playing.contains(&index)
    }

    /// Every pause request, in order
    pub fn paused(&self) -> &[usize] {
        &self.paused
    }

    /// Make every later pause fail with `message`
    pub fn fail_with(&mut self, message: &str) {
        self.failure = Some(message.to_string());
    }
}

impl MediaController for RecordingMedia {
    fn pause(&mut self, index: usize) -> Result<()> {
        self.paused.push(index);
        if let Some(message) = &self.failure {
            return Err(Error::Media(message.clone()));
        }
        self.playing.remove(&index);
        Ok(())
    }
}
