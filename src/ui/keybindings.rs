use crate::app::Screen;
use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, area: Rect, screen: Screen) {
    let hints = match screen {
        Screen::Editor => Line::from(vec![
            Span::raw(" ↑/↓ select   "),
            Span::raw("Shift+↑/↓ reorder   "),
            Span::raw("a add   "),
            Span::raw("i add into group   "),
            Span::raw("e edit   "),
            Span::raw("d delete   "),
            Span::raw("r run   "),
            Span::raw("q quit"),
        ]),
        Screen::Running => Line::from(vec![
            Span::raw(" Space pause/resume   "),
            Span::raw("s skip   "),
            Span::raw("f finish after current   "),
            Span::raw("q back to plan"),
        ]),
    };

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}
