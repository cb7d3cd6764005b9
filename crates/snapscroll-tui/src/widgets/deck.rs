use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use snapscroll_core::host::{ScrollTarget, SectionClass, Viewport};

use crate::app::{App, ROW_PX};

pub struct DeckWidget;

impl DeckWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        frame.render_widget(
            Block::default().style(Style::default().bg(app.theme.bg0)),
            area,
        );

        let rows = i64::from(area.height);
        let top = (app.viewport().scroll_top(ScrollTarget::Container) / ROW_PX).round() as i64;

        for (index, section) in app.deck.sections.iter().enumerate() {
            let start = index as i64 * rows - top;
            let end = start + rows;
            if end <= 0 || start >= rows {
                continue;
            }

            let visible_top = start.max(0);
            let visible_bottom = end.min(rows);
            let clipped = (visible_top - start) as u16;
            let rect = Rect {
                x: area.x,
                y: area.y + visible_top as u16,
                width: area.width,
                height: (visible_bottom - visible_top) as u16,
            };

            Self::render_section(frame, rect, app, index, clipped);
        }
    }

    fn render_section(frame: &mut Frame, rect: Rect, app: &App, index: usize, clipped: u16) {
        let theme = &app.theme;
        let style = app.style();
        let section = &app.deck.sections[index];

        let border_color = if style.section_has(index, SectionClass::Snapping) {
            theme.snapping
        } else if style.section_has(index, SectionClass::Snapped) {
            theme.snapped
        } else {
            theme.grey0
        };

        let mut title = vec![Span::styled(
            format!(" {}/{} ", index + 1, app.deck.len()),
            Style::default().fg(border_color).add_modifier(Modifier::BOLD),
        )];
        if let Some(label) = &section.media {
            let marker = if app.media().is_playing(index) { "▶" } else { "⏸" };
            title.push(Span::styled(
                format!("{} {} ", marker, label),
                Style::default().fg(theme.media),
            ));
        }

        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::TOP)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.bg0));

        let inner = block.inner(rect);
        // Clipped sections lose their border row along with the clip
        let block_rows = if clipped > 0 { 0 } else { 1 };
        let content_rect = if clipped > 0 { rect } else { inner };
        if clipped == 0 {
            frame.render_widget(block, rect);
        }

        // Parallax: content of the entering section trails the container
        let shift = style
            .content_offset(index)
            .map(|percent| (percent / 100.0 * f64::from(app.deck_rows())).round() as u16)
            .unwrap_or(0)
            .min(content_rect.height);
        let content_rect = Rect {
            y: content_rect.y + shift,
            height: content_rect.height - shift,
            ..content_rect
        };

        let scroll = (app.viewport().content_scroll(index) / ROW_PX).round() as u16;
        let skip = scroll + clipped.saturating_sub(block_rows);
        let lines: Vec<Line> = section
            .lines
            .iter()
            .map(|l| {
                if l.starts_with('#') {
                    Line::styled(
                        l.trim_start_matches('#').trim().to_string(),
                        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Line::styled(l.clone(), Style::default().fg(theme.fg0))
                }
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .style(Style::default().bg(theme.bg0))
            .scroll((skip, 0));
        frame.render_widget(paragraph, content_rect);
    }
}
