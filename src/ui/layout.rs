use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Editor screen layout
pub struct EditorLayout {
    pub keybindings_area: Rect,
    pub list_area: Rect,
    pub summary_area: Rect,
}

/// Create the editor layout
/// - Top bar: keybindings (1 row)
/// - Main area: the plan tree
/// - Bottom: plan summary (3 rows)
pub fn create_editor_layout(area: Rect) -> EditorLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Keybindings bar
            Constraint::Min(0),    // Plan tree
            Constraint::Length(3), // Summary footer
        ])
        .split(area);

    EditorLayout {
        keybindings_area: chunks[0],
        list_area: chunks[1],
        summary_area: chunks[2],
    }
}

/// Run screen layout
pub struct RunLayout {
    pub keybindings_area: Rect,
    pub current_area: Rect,
    pub progress_area: Rect,
    pub finished_area: Rect,
}

/// Create the run layout
/// - Top bar: keybindings (1 row)
/// - Current task block (8 rows)
/// - Progress gauge (3 rows)
/// - Finished task list (rest)
pub fn create_run_layout(area: Rect) -> RunLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Keybindings bar
            Constraint::Length(8), // Current task
            Constraint::Length(3), // Progress gauge
            Constraint::Min(0),    // Finished tasks
        ])
        .split(area);

    RunLayout {
        keybindings_area: chunks[0],
        current_area: chunks[1],
        progress_area: chunks[2],
        finished_area: chunks[3],
    }
}

/// Create centered modal area (for the task form)
pub fn create_modal_area(area: Rect) -> Rect {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(14),
            Constraint::Percentage(25),
        ])
        .split(area);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(vertical_chunks[1]);

    horizontal_chunks[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_editor_layout() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = create_editor_layout(area);

        assert_eq!(layout.keybindings_area.height, 1);
        assert!(layout.list_area.height > 0);
        assert_eq!(layout.summary_area.height, 3);
    }

    #[test]
    fn test_create_run_layout() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = create_run_layout(area);

        assert_eq!(layout.keybindings_area.height, 1);
        assert_eq!(layout.current_area.height, 8);
        assert_eq!(layout.progress_area.height, 3);
        assert!(layout.finished_area.height > 0);
    }

    #[test]
    fn test_create_modal_area() {
        let area = Rect::new(0, 0, 100, 50);
        let modal = create_modal_area(area);

        assert!(modal.width < area.width);
        assert_eq!(modal.height, 14);
    }
}
