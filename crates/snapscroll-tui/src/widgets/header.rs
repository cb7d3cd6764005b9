use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use snapscroll_core::host::HeaderDirection;

use crate::app::App;

pub struct HeaderWidget;

impl HeaderWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let style = app.style();
        let bg = theme.header_bg(style.header_background());

        let arrow = match style.header_direction() {
            Some(HeaderDirection::Up) => "↑",
            Some(HeaderDirection::Down) => "↓",
            None => " ",
        };

        let visible = app.visible_index();
        let dots: String = (0..app.deck.len())
            .map(|i| if i == visible { '●' } else { '○' })
            .collect();

        let title = format!(" {} {} ", arrow, app.deck.title);
        let padding_len = (area.width as usize)
            .saturating_sub(title.chars().count() + dots.chars().count() + 1);

        let line = Line::from(vec![
            Span::styled(
                title,
                Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" ".repeat(padding_len)),
            Span::styled(dots, Style::default().fg(theme.grey2)),
            Span::raw(" "),
        ]);

        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
    }
}
