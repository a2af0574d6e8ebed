use crate::app::{AppState, FormField, Screen};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    if app.form.is_some() {
        return handle_form_key(app, key);
    }
    match app.screen {
        Screen::Editor => handle_editor_key(app, key),
        Screen::Running => handle_run_key(app, key),
    }
}

/// Keys on the plan editor screen
fn handle_editor_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Navigation (with Shift modifier for reordering)
        KeyCode::Up => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.move_item(-1);
            } else {
                app.move_selection_up();
            }
            Ok(false)
        }
        KeyCode::Down => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.move_item(1);
            } else {
                app.move_selection_down();
            }
            Ok(false)
        }

        // Plan editing
        KeyCode::Char('a') => {
            app.open_add_form();
            Ok(false)
        }
        KeyCode::Char('i') => {
            app.open_add_into_form();
            Ok(false)
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            app.open_edit_form();
            Ok(false)
        }
        KeyCode::Char('d') => {
            app.delete_selected();
            Ok(false)
        }

        // Start the run
        KeyCode::Char('r') => {
            app.start_run();
            Ok(false)
        }

        KeyCode::Char('q') | KeyCode::Esc => Ok(true),
        _ => Ok(false),
    }
}

/// Keys on the run screen
fn handle_run_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    let over = app
        .run
        .as_ref()
        .map(|run| run.view.borrow().over)
        .unwrap_or(true);

    match key.code {
        KeyCode::Char(' ') if !over => {
            app.run_toggle_pause();
            Ok(false)
        }
        KeyCode::Char('s') if !over => {
            app.run_skip();
            Ok(false)
        }
        KeyCode::Char('f') if !over => {
            app.run_finish();
            Ok(false)
        }
        // Back to the editor; mid-run this abandons the session
        KeyCode::Char('q') | KeyCode::Esc => {
            app.leave_run();
            Ok(false)
        }
        KeyCode::Enter if over => {
            app.leave_run();
            Ok(false)
        }
        _ => Ok(false),
    }
}

/// Keys while the task form is open
fn handle_form_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.cancel_form();
            Ok(false)
        }
        KeyCode::Enter => {
            app.submit_form();
            Ok(false)
        }
        KeyCode::Tab => {
            if let Some(form) = app.form.as_mut() {
                form.next_field();
            }
            Ok(false)
        }
        KeyCode::Left => {
            if let Some(form) = app.form.as_mut() {
                if form.field == FormField::Kind {
                    form.choice = form.choice.prev();
                }
            }
            Ok(false)
        }
        KeyCode::Right => {
            if let Some(form) = app.form.as_mut() {
                if form.field == FormField::Kind {
                    form.choice = form.choice.next();
                }
            }
            Ok(false)
        }
        KeyCode::Backspace => {
            if let Some(buffer) = app.form.as_mut().and_then(|f| f.active_buffer_mut()) {
                buffer.pop();
            }
            Ok(false)
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.form.as_mut() {
                // Space on the kind selector cycles it; anywhere else it types
                if form.field == FormField::Kind {
                    if c == ' ' {
                        form.choice = form.choice.next();
                    }
                } else if let Some(buffer) = form.active_buffer_mut() {
                    buffer.push(c);
                }
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}
