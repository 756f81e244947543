use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use sessiongate_core::View;

use crate::app::{App, AppState, LoginFocus};
use crate::utils::{format_expiry, truncate_string};

use super::styles;

/// Width of the login and quit dialogs
const DIALOG_WIDTH: u16 = 46;

/// Visible width of the login text fields
const FIELD_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    match app.view {
        View::Login => render_login(frame, app, chunks[1]),
        View::Dashboard => render_dashboard(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  sessiongate";
    let backend = truncate_string(&app.config.api_base_url, 48);
    let padding = (area.width as usize).saturating_sub(title.len() + backend.chars().count() + 2);

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(backend, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (left_text, left_style) = if let Some(ref banner) = app.banner {
        (format!(" {} ", banner.message), styles::error_style())
    } else if app.loading || app.busy {
        let msg = match app.view {
            View::Login => " Signing in... ",
            View::Dashboard => " Verifying session... ",
        };
        (msg.to_string(), styles::highlight_style())
    } else if let Some(view) = app.pending_redirect() {
        let msg = match view {
            View::Login => " Returning to login... ",
            View::Dashboard => " Login successful. Opening dashboard... ",
        };
        (msg.to_string(), styles::success_style())
    } else {
        (String::new(), styles::muted_style())
    };

    let shortcuts = match app.view {
        View::Login => "[Tab] next | [Enter] login | [Esc] quit",
        View::Dashboard => "[r]everify | [l]ogout | [q]uit",
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn field_line<'a>(label: &'a str, value: String, focused: bool, disabled: bool) -> Line<'a> {
    let style = if disabled {
        styles::disabled_style()
    } else if focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };
    let cursor = if focused && !disabled { "▌" } else { " " };
    Line::from(vec![
        Span::raw("   "),
        Span::styled(label, styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(format!("{:<width$}{}", value, cursor, width = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let disabled = !app.can_submit();
    let height = if app.banner.is_some() { 12 } else { 10 };
    let dialog = centered_rect_fixed(DIALOG_WIDTH, height, area);
    frame.render_widget(Clear, dialog);

    let mut lines = vec![
        Line::from(Span::styled("   Sign in", styles::title_style())),
        Line::from(""),
    ];

    let username = truncate_string(&app.login_username, FIELD_WIDTH);
    lines.push(field_line(
        "Username: ",
        username,
        app.login_focus == LoginFocus::Username,
        disabled,
    ));

    let masked = "*".repeat(app.login_password.chars().count().min(FIELD_WIDTH));
    lines.push(field_line(
        "Password: ",
        masked,
        app.login_focus == LoginFocus::Password,
        disabled,
    ));

    lines.push(Line::from(""));
    let button_focused = app.login_focus == LoginFocus::Button;
    let (label, style) = if disabled {
        ("  Signing in ", styles::disabled_style())
    } else if button_focused {
        (" ▶  Login  ◀ ", styles::selected_style())
    } else {
        ("    Login    ", styles::field_style())
    };
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(label, style),
        Span::raw("]"),
    ]));

    if let Some(ref banner) = app.banner {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", banner.message),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(!disabled))
        .style(Style::default());

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        dialog,
    );
}

fn label_value<'a>(label: &'a str, value: String, style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<14}", label), styles::muted_style()),
        Span::styled(value, style),
    ])
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // Left: who is signed in
    let (name, status, token_state, token_style) = match app.user {
        Some(ref user) => (
            user.display_name(),
            user.status_text(),
            user.token_status().to_string(),
            styles::success_style(),
        ),
        None if app.loading || app.busy => (
            "-".to_string(),
            "Checking your session...".to_string(),
            "Checking".to_string(),
            styles::highlight_style(),
        ),
        None => (
            "-".to_string(),
            "Not verified".to_string(),
            "Invalid".to_string(),
            styles::error_style(),
        ),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", status), styles::title_style())),
        Line::from(""),
        label_value("Username", name, styles::field_style()),
        label_value("Token", token_state, token_style),
        label_value(
            "Stored token",
            app.token_preview.clone().unwrap_or_else(|| "-".to_string()),
            styles::muted_style(),
        ),
    ];
    if let Some(ref login) = app.login_info {
        lines.push(label_value(
            "Expires",
            format_expiry(login.minutes_until_expiry()),
            styles::muted_style(),
        ));
    }
    if let Some(ref banner) = app.banner {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", banner.message),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Session ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        chunks[0],
    );

    // Right: everything else the protected endpoint returned
    let detail_lines: Vec<Line> = match app.user {
        Some(ref user) if !user.extra.is_empty() => user
            .extra_fields()
            .into_iter()
            .map(|(k, v)| {
                Line::from(vec![
                    Span::styled(format!("  {}: ", k), styles::highlight_style()),
                    Span::styled(v, styles::field_style()),
                ])
            })
            .collect(),
        _ => vec![Line::from(Span::styled(
            "  No additional data",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Profile ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(
        Paragraph::new(detail_lines).block(block).wrap(Wrap { trim: false }),
        chunks[1],
    );
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(DIALOG_WIDTH, 6, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
