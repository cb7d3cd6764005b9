//! Ordered list of navigable sections and their content edge state

use crate::{Error, Result};

/// Scroll geometry of a section's content element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Content is scrolled to its top, within `tolerance` pixels
    #[inline]
    pub fn at_start(&self, tolerance: f64) -> bool {
        self.scroll_top < tolerance
    }

    /// Content is scrolled to its bottom, within `tolerance` pixels
    #[inline]
    pub fn at_end(&self, tolerance: f64) -> bool {
        self.scroll_height - self.scroll_top - self.client_height < tolerance
    }
}

/// What the host reports for one matched section
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionDescriptor {
    /// Vertical offset inside the scroll container
    pub offset_top: f64,
    /// Whether a separate content element matched the content selector
    pub has_content: bool,
    /// Declared header background
    pub header_bg: Option<String>,
    /// Whether the section embeds a media player
    pub has_media: bool,
}

/// One navigable unit
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    index: usize,
    offset_top: f64,
    has_content: bool,
    header_bg: Option<String>,
    has_media: bool,
    pub scrolled_to_start: bool,
    pub scrolled_to_end: bool,
}

impl Section {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Container offset captured at registration
    pub fn offset_top(&self) -> f64 {
        self.offset_top
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn header_bg(&self) -> Option<&str> {
        self.header_bg.as_deref()
    }

    pub fn has_media(&self) -> bool {
        self.has_media
    }
}

#[derive(Debug, Clone)]
pub struct SectionRegistry {
    sections: Vec<Section>,
    edge_tolerance: f64,
}

impl SectionRegistry {
    /// Snapshot `descriptors` into indexed sections
    ///
    /// Fails when there is nothing to navigate. Edge flags start cleared until
    /// the first metrics arrive.
    pub fn register(
        descriptors: Vec<SectionDescriptor>,
        selector: &str,
        edge_tolerance: f64,
    ) -> Result<Self> {
        if descriptors.is_empty() {
            return Err(Error::NoSections(selector.to_string()));
        }

        let sections = descriptors
            .into_iter()
            .enumerate()
            .map(|(index, d)| Section {
                index,
                offset_top: d.offset_top,
                has_content: d.has_content,
                header_bg: d.header_bg,
                has_media: d.has_media,
                scrolled_to_start: false,
                scrolled_to_end: false,
            })
            .collect();

        Ok(Self {
            sections,
            edge_tolerance,
        })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn last_index(&self) -> usize {
        self.sections.len().saturating_sub(1)
    }

    /// Recompute a section's edge flags from its content geometry
    ///
    /// Returns false when `index` is unknown.
    pub fn update_edges(&mut self, index: usize, metrics: ScrollMetrics) -> bool {
        let tolerance = self.edge_tolerance;
        match self.sections.get_mut(index) {
            Some(section) => {
                section.scrolled_to_start = metrics.at_start(tolerance);
                section.scrolled_to_end = metrics.at_end(tolerance);
                true
            }
            None => false,
        }
    }
}
