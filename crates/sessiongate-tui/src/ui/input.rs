use crossterm::event::{KeyCode, KeyEvent};
use sessiongate_core::View;

use crate::app::{can_add_password_char, can_add_username_char, App, AppState, LoginFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    match app.view {
        View::Login => handle_login_input(app, key),
        View::Dashboard => handle_dashboard_input(app, key),
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            // Enter in the password field submits, like a form
            LoginFocus::Password | LoginFocus::Button => {
                app.submit_login();
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    false
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('l') | KeyCode::Char('L') => app.request_logout(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.request_verify(),
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use sessiongate_core::{ApiClient, Config, MemoryTokenStore, SessionClient, TokenStore};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn login_app() -> App {
        let (tx, rx) = mpsc::channel(8);
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let session = SessionClient::new(api, Box::new(MemoryTokenStore::new()) as Box<dyn TokenStore>, tx);
        let mut app = App::with_session(Config::default(), session, rx);
        app.login_username.clear();
        app.login_password.clear();
        app.start();
        app
    }

    #[test]
    fn test_typing_fills_focused_field() {
        let mut app = login_app();
        for c in "bob".chars() {
            handle_input(&mut app, key(KeyCode::Char(c)));
        }
        handle_input(&mut app, key(KeyCode::Tab));
        for c in "pw!".chars() {
            handle_input(&mut app, key(KeyCode::Char(c)));
        }
        handle_input(&mut app, key(KeyCode::Backspace));

        assert_eq!(app.login_username, "bob");
        assert_eq!(app.login_password, "pw");
    }

    #[test]
    fn test_focus_cycles() {
        let mut app = login_app();
        assert_eq!(app.login_focus, LoginFocus::Username);
        handle_input(&mut app, key(KeyCode::Down));
        handle_input(&mut app, key(KeyCode::Down));
        assert_eq!(app.login_focus, LoginFocus::Button);
        handle_input(&mut app, key(KeyCode::Down));
        assert_eq!(app.login_focus, LoginFocus::Username);
        handle_input(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.login_focus, LoginFocus::Button);
    }

    #[test]
    fn test_enter_on_password_submits() {
        let mut app = login_app();
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.login_focus, LoginFocus::Password);
        assert!(!app.busy);

        handle_input(&mut app, key(KeyCode::Enter));
        assert!(app.busy);
        assert!(app.has_pending_action());
    }

    #[test]
    fn test_esc_on_login_quits() {
        let mut app = login_app();
        assert!(handle_input(&mut app, key(KeyCode::Esc)));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_quit_confirmation_on_dashboard() {
        let mut app = login_app();
        app.view = View::Dashboard;
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))));
        assert_eq!(app.state, AppState::Normal);
    }
}
