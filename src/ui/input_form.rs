use crate::app::{AppState, FormField, TaskChoice};
use crate::ui::{
    layout::create_modal_area,
    styles::{error_style, modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the task form for adding or editing a plan node
pub fn render_input_form(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };

    let modal_area = create_modal_area(area);

    // Clear the area behind the form
    f.render_widget(Clear, modal_area);

    let title_text = if form.editing_id.is_some() {
        " Edit Task "
    } else {
        " Add Task "
    };

    let mut lines = Vec::new();
    lines.push(Line::raw(""));

    push_text_field(&mut lines, "Title", &form.title, form.field == FormField::Title);

    // Kind selector is locked while editing
    if form.editing_id.is_none() {
        let marker = if form.field == FormField::Kind {
            "Kind: (←/→ to change)"
        } else {
            "Kind:"
        };
        lines.push(Line::raw(marker));
        let choices = [TaskChoice::Timer, TaskChoice::Stopwatch, TaskChoice::Repeat];
        let mut spans = vec![Span::raw("> ")];
        for choice in choices {
            if choice == form.choice {
                spans.push(Span::styled(format!("[{}] ", choice.label()), modal_title_style()));
            } else {
                spans.push(Span::raw(format!(" {}  ", choice.label())));
            }
        }
        lines.push(Line::from(spans));
        lines.push(Line::raw(""));
    }

    match form.choice {
        TaskChoice::Timer => push_text_field(
            &mut lines,
            "Duration (e.g. 1h30m or seconds)",
            &form.duration_input,
            form.field == FormField::Duration,
        ),
        TaskChoice::Repeat => push_text_field(
            &mut lines,
            "Cycles",
            &form.cycles_input,
            form.field == FormField::Cycles,
        ),
        TaskChoice::Stopwatch => {}
    }

    if let Some(error) = &form.error {
        lines.push(Line::styled(error.clone(), error_style()));
        lines.push(Line::raw(""));
    }

    lines.push(Line::raw("Tab to switch fields  ·  Enter to submit  ·  Esc to cancel"));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title_text, modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

fn push_text_field(lines: &mut Vec<Line>, label: &str, value: &str, active: bool) {
    let label_text = if active {
        format!("{}: (editing)", label)
    } else {
        format!("{}:", label)
    };
    lines.push(Line::raw(label_text));

    let mut spans = vec![Span::raw("> "), Span::styled(value.to_string(), modal_title_style())];
    if active {
        spans.push(Span::styled("█", modal_title_style())); // Cursor
    }
    lines.push(Line::from(spans));
    lines.push(Line::raw(""));
}
