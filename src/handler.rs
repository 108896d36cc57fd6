use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, Screen, LANDING_MENU};
use crate::plan::PlannerField;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit, works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Landing => handle_landing(app, key),
        Screen::Chat => handle_chat(app, key),
        Screen::Planner => handle_planner(app, key),
        Screen::Itinerary => handle_itinerary(app, key),
    }
}

fn handle_landing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.landing_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.landing_nav_up(),
        KeyCode::Enter => {
            let (_, _, enabled) = LANDING_MENU[app.landing_selected.min(LANDING_MENU.len() - 1)];
            if !enabled {
                return;
            }
            match app.landing_selected {
                0 => app.open_chat(),
                1 => app.open_planner(),
                _ => {}
            }
        }
        // Shortcuts matching the menu order
        KeyCode::Char('c') => app.open_chat(),
        KeyCode::Char('p') => app.open_planner(),
        _ => {}
    }
}

fn handle_chat(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_chat(),
        KeyCode::Enter => {
            let text = app.chat_input.clone();
            let sent = app
                .chat
                .as_mut()
                .map(|chat| chat.send(&text))
                .unwrap_or(false);
            // Busy or blank input: keep what was typed.
            if sent {
                app.chat_input.clear();
                app.chat_cursor = 0;
                app.scroll_chat_to_bottom();
            }
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Up | KeyCode::PageUp => app.chat_scroll_up(),
        KeyCode::Down | KeyCode::PageDown => app.chat_scroll_down(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn handle_planner(app: &mut App, key: KeyEvent) {
    // Esc first clears an open suggestion pick, then leaves the form.
    if key.code == KeyCode::Esc {
        if app.suggestion_state.selected().is_some() {
            app.suggestion_state.select(None);
        } else {
            app.screen = Screen::Landing;
            app.input_mode = InputMode::Normal;
        }
        return;
    }

    match key.code {
        KeyCode::Tab => {
            app.form.field = app.form.field.next();
            app.suggestion_state.select(None);
        }
        KeyCode::BackTab => {
            app.form.field = app.form.field.prev();
            app.suggestion_state.select(None);
        }
        _ => handle_planner_field(app, key),
    }
}

fn handle_planner_field(app: &mut App, key: KeyEvent) {
    match app.form.field {
        PlannerField::Destination => match key.code {
            KeyCode::Char(c) => {
                app.form.destination_input.push(c);
                app.refresh_suggestions();
            }
            KeyCode::Backspace => {
                if app.form.destination_input.is_empty() {
                    app.form.remove_last_destination();
                } else {
                    app.form.destination_input.pop();
                    app.refresh_suggestions();
                }
            }
            KeyCode::Down => app.suggestion_nav_down(),
            KeyCode::Up => app.suggestion_nav_up(),
            KeyCode::Enter => {
                if let Some(suggestion) = app.selected_suggestion().cloned() {
                    app.form.add_destination(&suggestion);
                } else {
                    app.form.commit_destination();
                }
                app.suggestions.clear();
                app.suggestion_state.select(None);
            }
            _ => {}
        },
        PlannerField::StartDate => match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                app.form.start_date.push(c);
            }
            KeyCode::Backspace => {
                app.form.start_date.pop();
            }
            _ => {}
        },
        PlannerField::EndDate => match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                app.form.end_date.push(c);
            }
            KeyCode::Backspace => {
                app.form.end_date.pop();
            }
            _ => {}
        },
        PlannerField::StayType => match key.code {
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Left | KeyCode::Right => {
                app.form.cycle_stay_type();
            }
            _ => {}
        },
        PlannerField::Budget => match key.code {
            KeyCode::Left | KeyCode::Down | KeyCode::Char('-') => app.form.budget_down(),
            KeyCode::Right | KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => {
                app.form.budget_up();
            }
            _ => {}
        },
        PlannerField::Preferences => match key.code {
            KeyCode::Char(c) => {
                app.form.preferences.push(c);
            }
            KeyCode::Backspace => {
                app.form.preferences.pop();
            }
            KeyCode::Enter => {
                app.form.field = PlannerField::Submit;
            }
            _ => {}
        },
        PlannerField::Submit => {
            if key.code == KeyCode::Enter {
                app.submit_plan();
            }
        }
    }
}

fn handle_itinerary(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => {
            // Back to the form, state intact
            app.screen = Screen::Planner;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
            app.itinerary_tab = app.itinerary_tab.next();
            app.itinerary_scroll = 0;
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
            app.itinerary_tab = app.itinerary_tab.prev();
            app.itinerary_scroll = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => app.itinerary_scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.itinerary_scroll_up(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => match app.screen {
            Screen::Chat => {
                app.chat_scroll_down();
                app.chat_scroll_down();
                app.chat_scroll_down();
            }
            Screen::Itinerary => {
                app.itinerary_scroll_down();
                app.itinerary_scroll_down();
                app.itinerary_scroll_down();
            }
            _ => {}
        },
        MouseEventKind::ScrollUp => match app.screen {
            Screen::Chat => {
                app.chat_scroll_up();
                app.chat_scroll_up();
                app.chat_scroll_up();
            }
            Screen::Itinerary => {
                app.itinerary_scroll_up();
                app.itinerary_scroll_up();
                app.itinerary_scroll_up();
            }
            _ => {}
        },
        _ => {}
    }
}
