//! Frame rendering for the Smart Intercom console.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::{App, Screen, SignInFocus};
use crate::ui::styles;

/// Width of the password field as rendered (input itself allows more)
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

    render_title_bar(frame, chunks[0]);
    render_status_bar(frame, app, chunks[2]);

    match app.screen {
        Screen::SignIn | Screen::Quitting => render_sign_in(frame, app),
        Screen::Home => render_home(frame, app, chunks[1]),
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Smart Intercom";
    let help_hint = "[Esc] Quit";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.loading {
        " Signing in..."
    } else if app.authenticated {
        " Session active"
    } else {
        " Not signed in"
    };
    let line = Line::from(Span::styled(text, styles::status_bar_style()));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_sign_in(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 12, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "   ╦╔╗╔╔╦╗╔═╗╦═╗╔═╗╔═╗╔╦╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "   ║║║║ ║ ║╣ ╠╦╝║  ║ ║║║║",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "   ╩╝╚╝ ╩ ╚═╝╩╚═╚═╝╚═╝╩ ╩",
            styles::title_style(),
        )),
        Line::from(""),
    ];

    // Password field (masked)
    let password_focused = app.focus == SignInFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };
    // One mask glyph per character, not per byte
    let masked: String = "*".repeat(app.password.chars().count().min(FIELD_WIDTH));
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", masked, cursor, width = FIELD_WIDTH),
            password_style,
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    // Remember-me checkbox
    let remember_focused = app.focus == SignInFocus::Remember;
    let remember_style = if remember_focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };
    let mark = if app.is_remember { "x" } else { " " };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled(format!("[{}]", mark), remember_style),
        Span::styled(" Remember me", styles::muted_style()),
    ]));

    lines.push(Line::from(""));

    // Submit button, replaced by a progress indicator while loading
    if app.loading {
        lines.push(Line::from(vec![
            Span::raw("          "),
            Span::styled("◌ Signing in...", styles::highlight_style()),
        ]));
    } else {
        let button_focused = app.focus == SignInFocus::Button;
        let button_style = if button_focused {
            styles::selected_style()
        } else {
            styles::field_style()
        };
        let label = if button_focused {
            " ▶ Sign In ◀ "
        } else {
            "   Sign In   "
        };
        lines.push(Line::from(vec![
            Span::raw("          ["),
            Span::styled(label, button_style),
            Span::raw("]"),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    // Placeholder for the application shell: shows that the session is
    // established and where the token lives.
    let token_line = match app.stored_token() {
        Some(token) => format!("Session token stored ({} chars)", token.len()),
        None => "No session token stored".to_string(),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Signed in", styles::success_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", token_line),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[q]", styles::help_key_style()),
            Span::styled(" to quit", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
