pub mod editor_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod run_pane;
pub mod styles;

use crate::app::{AppState, Screen};
use editor_pane::{render_editor_pane, render_summary_pane};
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::{create_editor_layout, create_run_layout};
use ratatui::Frame;
use run_pane::render_run_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();

    match app.screen {
        Screen::Editor => {
            let layout = create_editor_layout(size);
            render_keybindings(f, layout.keybindings_area, Screen::Editor);
            render_editor_pane(f, app, layout.list_area);
            render_summary_pane(f, app, layout.summary_area);
        }
        Screen::Running => {
            let layout = create_run_layout(size);
            render_keybindings(f, layout.keybindings_area, Screen::Running);
            render_run_pane(f, app, &layout);
        }
    }

    // Render the task form on top if open
    if app.form.is_some() {
        render_input_form(f, app, size);
    }
}
