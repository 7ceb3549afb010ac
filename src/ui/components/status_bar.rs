use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use suspense::session::navigator::CueReason;

use crate::ui::theme::Theme;

pub fn cue_message(reason: CueReason) -> &'static str {
    match reason {
        CueReason::IncompleteDrawing => "Draw the curve across the whole text first",
        CueReason::FirstScreen => "This is the first screen",
        CueReason::DrawingLocked => "Drawing is locked on a screen you went back to",
    }
}

/// Bottom line: where the reader is, which keys work here, or a flashing
/// cue message.
pub struct StatusBar<'a> {
    pub position: String,
    pub hints: Vec<(String, &'static str)>,
    pub cue: Option<CueReason>,
    pub theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(position: String, hints: Vec<(String, &'static str)>, cue: Option<CueReason>, theme: &'a Theme) -> Self {
        Self {
            position,
            hints,
            cue,
            theme,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        if let Some(reason) = self.cue {
            let style = Style::default()
                .fg(colors.bg())
                .bg(colors.cue())
                .add_modifier(Modifier::BOLD);
            Paragraph::new(Line::from(Span::styled(format!(" {} ", cue_message(reason)), style)))
                .style(Style::default().bg(colors.cue()))
                .render(area, buf);
            return;
        }

        let base = Style::default().fg(colors.status_fg()).bg(colors.status_bg());
        let key = base.fg(colors.accent()).add_modifier(Modifier::BOLD);
        let mut spans = vec![Span::styled(format!(" {} ", self.position), base)];
        for (label, what) in &self.hints {
            spans.push(Span::styled(format!(" {label}"), key));
            spans.push(Span::styled(format!(" {what} "), base));
        }
        Paragraph::new(Line::from(spans)).style(base).render(area, buf);
    }
}
