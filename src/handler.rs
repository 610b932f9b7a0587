use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AuthModal, ImageField, InputMode, Screen};
use crate::quiz::QuizMode;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global quit, works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    // Auth modals capture all input while open
    if app.auth_modal != AuthModal::None {
        handle_auth_modal(app, key);
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }

    Ok(())
}

fn handle_auth_modal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_auth_modal(),
        KeyCode::Enter => app.submit_auth(),
        KeyCode::Tab => {
            let count = app.auth_form.field_count(app.auth_modal);
            app.auth_form.field = (app.auth_form.field + 1) % count;
        }
        // Switch between login and signup without losing the overlay
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            match app.auth_modal {
                AuthModal::Login => app.open_signup(),
                AuthModal::Signup => app.open_login(),
                AuthModal::None => {}
            }
        }
        KeyCode::Backspace => {
            auth_field_mut(app).pop();
        }
        KeyCode::Char(c) => {
            auth_field_mut(app).push(c);
        }
        _ => {}
    }
}

fn auth_field_mut(app: &mut App) -> &mut String {
    let field = app.auth_form.field;
    match app.auth_modal {
        AuthModal::Signup => match field {
            0 => &mut app.auth_form.name,
            1 => &mut app.auth_form.email,
            _ => &mut app.auth_form.password,
        },
        _ => match field {
            0 => &mut app.auth_form.email,
            _ => &mut app.auth_form.password,
        },
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Keys shared by every screen
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Esc if app.screen != Screen::Home => {
            app.screen = Screen::Home;
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Home => handle_home(app, key),
        Screen::Chat => handle_chat_normal(app, key),
        Screen::Image => handle_image_normal(app, key),
        Screen::Writing => handle_writing_normal(app, key),
        Screen::Reading => handle_reading_normal(app, key),
        Screen::Vocabulary => handle_vocabulary_normal(app, key),
        Screen::Grammar => handle_grammar_normal(app, key),
    }
}

fn handle_home(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.home_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.home_nav_up(),
        KeyCode::Enter => app.open_selected_feature(),
        KeyCode::Char('l') => {
            if !app.logged_in {
                app.open_login();
            }
        }
        KeyCode::Char('n') => {
            if !app.logged_in {
                app.open_signup();
            }
        }
        KeyCode::Char('o') => app.logout(),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        // Input stays disabled while a response is pending
        KeyCode::Char('i') | KeyCode::Char('/') if !app.chat.loading => {
            app.input_mode = InputMode::Editing;
            app.chat.cursor = app.chat.input.chars().count();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.chat.scroll = app.chat.scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.chat.scroll = app.chat.scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => app.chat.scroll = 0,
        KeyCode::Char('G') => app.chat.scroll = u16::MAX,
        _ => {}
    }
}

fn handle_image_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => {
            app.image.field = match app.image.field {
                ImageField::Path => ImageField::Prompt,
                ImageField::Prompt => ImageField::Path,
            };
        }
        KeyCode::Char('i') if !app.image.loading => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Enter | KeyCode::Char('a') => app.submit_image_analysis(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.image.scroll = app.image.scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.image.scroll = app.image.scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_writing_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') if !app.writing.loading => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('m') => {
            app.writing.mode = app.writing.mode.toggled();
        }
        KeyCode::Enter | KeyCode::Char('s') => app.submit_writing(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.writing.scroll = app.writing.scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.writing.scroll = app.writing.scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_reading_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('/') if !app.reading.loading => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.reading.scroll = app.reading.scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.reading.scroll = app.reading.scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_vocabulary_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('/') if !app.vocabulary.loading => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.vocabulary.scroll = app.vocabulary.scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.vocabulary.scroll = app.vocabulary.scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_grammar_normal(app: &mut App, key: KeyEvent) {
    // Quiz progression takes over once started
    if let Some(quiz) = app.grammar.quiz.as_mut() {
        match quiz.mode() {
            QuizMode::Active => {
                match key.code {
                    KeyCode::Char(c @ '1'..='4') => {
                        let index = c as usize - '1' as usize;
                        quiz.select_answer(index);
                    }
                    KeyCode::Enter | KeyCode::Char('n') => quiz.advance(),
                    _ => {}
                }
                return;
            }
            QuizMode::Finished => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char('r')) {
                    // Try Again: same questions, no new requests
                    quiz.restart();
                }
                return;
            }
            QuizMode::Idle => {}
        }
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.grammar_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.grammar_nav_up(),
        KeyCode::Enter => app.select_grammar_topic(),
        KeyCode::Char('s') => {
            if let Some(quiz) = app.grammar.quiz.as_mut() {
                quiz.start();
            }
        }
        KeyCode::Char('d') | KeyCode::PageDown => {
            app.grammar.scroll = app.grammar.scroll.saturating_add(10);
        }
        KeyCode::Char('u') | KeyCode::PageUp => {
            app.grammar.scroll = app.grammar.scroll.saturating_sub(10);
        }
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Chat => handle_chat_editing(app, key),
        Screen::Image => handle_image_editing(app, key),
        Screen::Writing => handle_writing_editing(app, key),
        Screen::Reading => handle_line_editing(app, key, Screen::Reading),
        Screen::Vocabulary => handle_line_editing(app, key, Screen::Vocabulary),
        _ => app.input_mode = InputMode::Normal,
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_chat();
        }
        KeyCode::Backspace => {
            if app.chat.cursor > 0 {
                app.chat.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat.input, app.chat.cursor);
                app.chat.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat.input.chars().count();
            if app.chat.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat.input, app.chat.cursor);
                app.chat.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat.cursor = app.chat.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat.input.chars().count();
            app.chat.cursor = (app.chat.cursor + 1).min(char_count);
        }
        KeyCode::Home => app.chat.cursor = 0,
        KeyCode::End => app.chat.cursor = app.chat.input.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat.input, app.chat.cursor);
            app.chat.input.insert(byte_pos, c);
            app.chat.cursor += 1;
        }
        _ => {}
    }
}

fn handle_image_editing(app: &mut App, key: KeyEvent) {
    let field = match app.image.field {
        ImageField::Path => &mut app.image.path_input,
        ImageField::Prompt => &mut app.image.prompt_input,
    };

    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            if app.image.field == ImageField::Path {
                app.attach_image();
                if app.image.attachment.is_some() {
                    app.image.field = ImageField::Prompt;
                }
            }
        }
        KeyCode::Tab => {
            app.image.field = match app.image.field {
                ImageField::Path => ImageField::Prompt,
                ImageField::Prompt => ImageField::Path,
            };
        }
        KeyCode::Backspace => {
            field.pop();
        }
        KeyCode::Char(c) => {
            field.push(c);
        }
        _ => {}
    }
}

fn handle_writing_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        // Multiline input: Enter inserts a line break, submit from normal mode
        KeyCode::Enter => {
            app.writing.text.push('\n');
        }
        KeyCode::Backspace => {
            app.writing.text.pop();
        }
        KeyCode::Char(c) => {
            app.writing.text.push(c);
        }
        _ => {}
    }
}

fn handle_line_editing(app: &mut App, key: KeyEvent, screen: Screen) {
    let input = match screen {
        Screen::Reading => &mut app.reading.question,
        _ => &mut app.vocabulary.word,
    };

    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => match screen {
            Screen::Reading => app.submit_reading_question(),
            _ => app.submit_word(),
        },
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(c) => {
            input.push(c);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_to_byte_index_handles_multibyte_text() {
        let s = "héllo";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 2), 3);
        assert_eq!(char_to_byte_index(s, 99), s.len());
    }
}
