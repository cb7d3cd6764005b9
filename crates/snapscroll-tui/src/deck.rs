//! Deck files
//!
//! A deck is plain text split into sections by lines holding only `---`.
//! Leading `@` lines of a section are directives:
//!
//! ```text
//! @header-bg #1e1e2e
//! @media intro-reel
//! # Welcome
//! Body text...
//! ---
//! # Second section
//! ```

use anyhow::{anyhow, bail, Result};

use snapscroll_core::headless::SectionSpec;

const SEPARATOR: &str = "---";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeckSection {
    pub header_bg: Option<String>,
    /// Label of the embedded media, if any
    pub media: Option<String>,
    pub lines: Vec<String>,
}

impl DeckSection {
    /// First non-empty line without heading markers
    pub fn title(&self) -> &str {
        self.lines
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .map(|l| l.trim_start_matches('#').trim())
            .unwrap_or("")
    }

    /// Host-side shape at the given row geometry
    pub fn spec(&self, row_px: f64, viewport_rows: u16) -> SectionSpec {
        let mut spec = if self.lines.len() > viewport_rows as usize {
            SectionSpec::tall(self.lines.len() as f64 * row_px)
        } else {
            SectionSpec::fitting().with_content()
        };
        if let Some(bg) = &self.header_bg {
            spec = spec.with_header_bg(bg);
        }
        if self.media.is_some() {
            spec = spec.with_media();
        }
        spec
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Deck {
    pub title: String,
    pub sections: Vec<DeckSection>,
}

impl Deck {
    pub fn parse(title: &str, source: &str) -> Result<Self> {
        let mut sections = Vec::new();
        let mut current = DeckSection::default();
        let mut in_directives = true;

        for (number, line) in source.lines().enumerate() {
            if line.trim() == SEPARATOR {
                sections.push(std::mem::take(&mut current));
                in_directives = true;
                continue;
            }

            if in_directives {
                if let Some(directive) = line.trim_start().strip_prefix('@') {
                    apply_directive(&mut current, directive)
                        .map_err(|e| anyhow!("line {}: {}", number + 1, e))?;
                    continue;
                }
                if line.trim().is_empty() && current.lines.is_empty() {
                    continue;
                }
                in_directives = false;
            }
            current.lines.push(line.to_string());
        }
        sections.push(current);

        // Trailing blank lines carry nothing
        for section in &mut sections {
            while section.lines.last().is_some_and(|l| l.trim().is_empty()) {
                section.lines.pop();
            }
        }
        sections.retain(|s| !s.lines.is_empty() || s.media.is_some() || s.header_bg.is_some());

        if sections.is_empty() {
            bail!("deck '{}' has no sections", title);
        }

        Ok(Self {
            title: title.to_string(),
            sections,
        })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn specs(&self, row_px: f64, viewport_rows: u16) -> Vec<SectionSpec> {
        self.sections
            .iter()
            .map(|s| s.spec(row_px, viewport_rows))
            .collect()
    }
}

fn apply_directive(section: &mut DeckSection, directive: &str) -> Result<()> {
    let (name, value) = directive
        .split_once(char::is_whitespace)
        .map(|(n, v)| (n, v.trim()))
        .unwrap_or((directive.trim(), ""));

    match name {
        "header-bg" if !value.is_empty() => section.header_bg = Some(value.to_string()),
        "media" => {
            section.media = Some(if value.is_empty() {
                "media".to_string()
            } else {
                value.to_string()
            })
        }
        "header-bg" => bail!("@header-bg needs a color"),
        other => bail!("unknown directive @{}", other),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = "\
@header-bg #112233
# Welcome
first line

---
@media trailer
# Second
---
plain
";

    #[test]
    fn test_parse_sections_and_directives() {
        let deck = Deck::parse("demo", DECK).unwrap();
        assert_eq!(deck.len(), 3);

        let first = &deck.sections[0];
        assert_eq!(first.header_bg.as_deref(), Some("#112233"));
        assert_eq!(first.title(), "Welcome");
        assert_eq!(first.lines, vec!["# Welcome", "first line"]);

        assert_eq!(deck.sections[1].media.as_deref(), Some("trailer"));
        assert_eq!(deck.sections[2].title(), "plain");
    }

    #[test]
    fn test_directive_after_text_is_content() {
        let deck = Deck::parse("demo", "text\n@media later\n").unwrap();
        assert_eq!(deck.sections[0].media, None);
        assert_eq!(deck.sections[0].lines.len(), 2);
    }

    #[test]
    fn test_unknown_directive_reports_line() {
        let err = Deck::parse("demo", "# ok\n---\n@bogus x\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_empty_deck_is_error() {
        assert!(Deck::parse("demo", "\n---\n\n").is_err());
    }

    #[test]
    fn test_spec_depends_on_viewport_rows() {
        let deck = Deck::parse("demo", DECK).unwrap();
        let spec = deck.sections[0].spec(16.0, 1);
        assert_eq!(spec.content_height, Some(32.0));
        assert_eq!(spec.header_bg.as_deref(), Some("#112233"));

        let spec = deck.sections[0].spec(16.0, 40);
        assert_eq!(spec.content_height, None);
        assert!(spec.has_content);
        assert!(deck.sections[1].spec(16.0, 40).has_media);
    }
}
