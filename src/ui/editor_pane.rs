use crate::app::AppState;
use crate::domain::{format_clock, format_hms, tree_connector, TaskKind};
use crate::ui::styles::{
    border_style, default_style, error_style, hint_style, selected_style, title_style, tree_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the plan tree
pub fn render_editor_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let rows = app.rows();
    let mut lines = Vec::new();

    if rows.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "  Empty plan. Press 'a' to add a task",
            hint_style(),
        ));
    }

    // Keep the selection inside the visible window
    let visible = area.height.saturating_sub(2) as usize;
    let offset = if visible == 0 || app.selected < visible {
        0
    } else {
        app.selected + 1 - visible
    };

    for (index, row) in rows.iter().enumerate().skip(offset).take(visible.max(1)) {
        let Some(node) = app.plan.find(row.id) else {
            continue;
        };

        let detail = match &node.kind {
            TaskKind::Timer { duration_seconds } => {
                format!("⏲ {}", format_hms(u64::from(*duration_seconds)))
            }
            TaskKind::Stopwatch => "⏱ stopwatch".to_string(),
            TaskKind::Repeat { cycles, .. } => format!("⟳ ×{}", cycles),
        };

        let indent = "  ".repeat(row.depth);
        let connector = if row.depth > 0 {
            format!("{} ", tree_connector(row.is_last))
        } else {
            String::new()
        };

        let row_style = if index == app.selected {
            selected_style()
        } else {
            default_style()
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {}{}", indent, connector), tree_style()),
            Span::styled(node.title.clone(), row_style),
            Span::raw("  "),
            Span::styled(detail, hint_style()),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" Plan ", title_style())),
    );
    f.render_widget(paragraph, area);
}

/// Render the plan summary footer: totals and status messages
pub fn render_summary_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = Vec::new();

    match app.plan_totals() {
        Some((seconds, exact, count)) => {
            let prefix = if exact { "" } else { "≥ " };
            spans.push(Span::raw(format!(
                " {} task instance{} · {}{}",
                count,
                if count == 1 { "" } else { "s" },
                prefix,
                format_clock(seconds)
            )));
        }
        None => {
            spans.push(Span::styled(" malformed plan", error_style()));
        }
    }

    if app.needs_save {
        spans.push(Span::styled("  [unsaved]", hint_style()));
    }

    if let Some(status) = &app.status {
        spans.push(Span::styled(format!("  {}", status), error_style()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style()),
    );
    f.render_widget(paragraph, area);
}
