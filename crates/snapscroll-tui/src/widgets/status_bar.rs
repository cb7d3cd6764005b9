use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use snapscroll_core::engine::Lifecycle;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let state = *app.controller().engine().state();

        let mode_str = match app.lifecycle() {
            Lifecycle::Idle => "FREE",
            Lifecycle::Starting => "ARMING",
            Lifecycle::Ready if state.snapping => "SNAPPING",
            Lifecycle::Ready if state.snapped_to_end => "END",
            Lifecycle::Ready => "SNAP",
        };
        let mode_color = match mode_str {
            "SNAPPING" => theme.snapping,
            "END" => theme.locked,
            "SNAP" => theme.snapped,
            _ => theme.grey2,
        };

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {} ", msg)
        } else {
            format!(
                " Section {}/{}{} ",
                app.visible_index() + 1,
                app.deck.len(),
                if state.suppress_input && !state.snapping { " | settling" } else { "" }
            )
        };

        let help_hint = " q:quit j/k:scroll n/p:snap tab:focus 1-9:jump g:top ";
        let used = mode_str.len() + 2 + status_text.chars().count() + help_hint.len();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", mode_str),
                Style::default().fg(theme.bg0).bg(mode_color),
            ),
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
