use crate::app::{AppState, RunSession};
use crate::domain::format_clock;
use crate::ui::layout::RunLayout;
use crate::ui::styles::{
    border_style, default_style, done_style, gauge_style, hint_style, paused_style, running_style,
    title_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Render the run screen panes
pub fn render_run_pane(f: &mut Frame, app: &AppState, layout: &RunLayout) {
    let Some(run) = &app.run else {
        return;
    };

    render_current(f, run, layout.current_area);
    render_progress(f, run, layout.progress_area);
    render_finished(f, run, layout.finished_area);
}

fn render_current(f: &mut Frame, run: &RunSession, area: Rect) {
    let view = run.view.borrow();
    let mut lines = Vec::new();

    if view.over {
        lines.push(Line::raw(""));
        lines.push(Line::styled("  Run complete", done_style()));
        lines.push(Line::raw(""));
        lines.push(Line::styled("  Press Enter or q to go back", hint_style()));
    } else if let Some(task) = &view.current {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(task.title.clone(), running_style()),
        ]));

        let elapsed = match task.duration {
            Some(duration) => format!(
                "  {} of {}",
                format_clock(view.seconds),
                format_clock(u64::from(duration))
            ),
            None => format!("  {} (open-ended)", format_clock(view.seconds)),
        };
        lines.push(Line::styled(elapsed, default_style()));

        if view.paused {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("⏸ paused {}", format_clock(view.pause_seconds)),
                    paused_style(),
                ),
            ]));
        } else {
            lines.push(Line::raw(""));
        }

        match &view.next {
            Some(next) => {
                let detail = if next.is_stopwatch() {
                    " (stopwatch)".to_string()
                } else {
                    String::new()
                };
                lines.push(Line::from(vec![
                    Span::raw("  next: "),
                    Span::styled(format!("{}{}", next.title, detail), hint_style()),
                ]));
            }
            None => lines.push(Line::styled("  last task of the plan", hint_style())),
        }
    } else {
        lines.push(Line::styled("  Nothing to run", hint_style()));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" Now ", title_style())),
    );
    f.render_widget(paragraph, area);
}

fn render_progress(f: &mut Frame, run: &RunSession, area: Rect) {
    let view = run.view.borrow();

    let (percent, label) = if view.over {
        (100, "done".to_string())
    } else {
        match view.progress {
            Some(progress) => {
                // An inexact suffix renders as an upper bound
                let qualifier = if progress.remaining_known { "" } else { "≤ " };
                let remaining = run
                    .coordinator
                    .remaining_from_current()
                    .map(|(seconds, exact)| {
                        let left = seconds.saturating_sub(view.seconds);
                        let prefix = if exact { "" } else { "≥ " };
                        format!(" · {}{} left", prefix, format_clock(left))
                    })
                    .unwrap_or_default();
                (
                    u16::from(progress.percent),
                    format!(
                        "{}{}% · task {}/{}{}",
                        qualifier,
                        progress.percent,
                        progress.current_index + 1,
                        progress.total_count,
                        remaining
                    ),
                )
            }
            None => (0, String::new()),
        }
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" Progress ", title_style())),
        )
        .gauge_style(gauge_style())
        .percent(percent.min(100))
        .label(label);
    f.render_widget(gauge, area);
}

fn render_finished(f: &mut Frame, run: &RunSession, area: Rect) {
    let finished = run.coordinator.finished();
    let mut lines = Vec::new();

    let running_total: u64 = finished.iter().map(|t| t.stats.running_time).sum();
    let paused_total: u64 = finished.iter().map(|t| t.stats.paused_time).sum();
    lines.push(Line::from(vec![
        Span::raw(" total "),
        Span::styled(format_clock(running_total + paused_total), default_style()),
        Span::raw("  ▸ "),
        Span::styled(format_clock(running_total), done_style()),
        Span::raw("  ⏸ "),
        Span::styled(format_clock(paused_total), paused_style()),
    ]));
    lines.push(Line::raw(""));

    let visible = area.height.saturating_sub(4) as usize;
    let skip = finished.len().saturating_sub(visible);
    for task in finished.iter().skip(skip) {
        lines.push(Line::from(vec![
            Span::styled(" ✓ ", done_style()),
            Span::raw(task.title.clone()),
            Span::styled(
                format!(
                    "  {} · run {} · paused {}",
                    task.finished_at.format("%H:%M:%S"),
                    format_clock(task.stats.running_time),
                    format_clock(task.stats.paused_time)
                ),
                hint_style(),
            ),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" Finished ", title_style())),
    );
    f.render_widget(paragraph, area);
}
