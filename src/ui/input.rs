//! Keyboard input handling for the console.
//!
//! This module translates keyboard events into application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{can_add_password_char, App, Screen, SignInFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.screen {
        Screen::SignIn => handle_sign_in_input(app, key),
        Screen::Home => handle_home_input(app, key),
        Screen::Quitting => Ok(true),
    }
}

fn handle_sign_in_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.screen = Screen::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            // Move to next field
            app.focus = match app.focus {
                SignInFocus::Password => SignInFocus::Remember,
                SignInFocus::Remember => SignInFocus::Button,
                SignInFocus::Button => SignInFocus::Password,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            // Move to previous field
            app.focus = match app.focus {
                SignInFocus::Password => SignInFocus::Button,
                SignInFocus::Remember => SignInFocus::Password,
                SignInFocus::Button => SignInFocus::Remember,
            };
        }
        KeyCode::Enter => match app.focus {
            SignInFocus::Password => {
                app.focus = SignInFocus::Remember;
            }
            SignInFocus::Remember => {
                app.focus = SignInFocus::Button;
            }
            SignInFocus::Button => {
                // No-op while a login is already pending
                app.submit();
            }
        },
        KeyCode::Backspace => {
            if app.focus == SignInFocus::Password {
                let mut value = app.password.clone();
                value.pop();
                app.edit_password(value);
            }
        }
        KeyCode::Char(' ') if app.focus == SignInFocus::Remember => {
            app.edit_remember(!app.is_remember);
        }
        KeyCode::Char(c) => {
            if app.focus == SignInFocus::Password && can_add_password_char(&app.password, c) {
                let mut value = app.password.clone();
                value.push(c);
                app.edit_password(value);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_home_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.screen = Screen::Quitting;
            Ok(true)
        }
        _ => Ok(false),
    }
}
