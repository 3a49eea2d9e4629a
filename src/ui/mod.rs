mod list;
pub mod theme;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::action::View;
use crate::app::{App, LoadState};
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, theme, chunks[0]);
    list::render(frame, app, theme, chunks[1]);
    render_status_bar(frame, app, theme, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let tab = |view: View| {
        if view == app.view {
            Span::styled(format!(" {} ", view.title()), theme.header)
        } else {
            Span::styled(format!(" {} ", view.title()), theme.dim)
        }
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled("stackdash", theme.header),
        Span::raw(" │"),
        tab(View::Stacks),
        Span::raw("│"),
        tab(View::Issues),
        Span::raw("│"),
    ]))
    .style(theme.bar);

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let status = if app.filter_mode {
        Line::from(vec![
            Span::styled("/", theme.header),
            Span::raw(app.filter.clone()),
            Span::styled("▏", theme.dim),
        ])
    } else {
        match &app.active_pane().state {
            LoadState::Failed(error) => Line::from(Span::styled(
                format!("Error: {}", error),
                theme.failure,
            )),
            LoadState::Loading | LoadState::Idle => {
                Line::from(Span::styled("Loading...", theme.warning))
            }
            LoadState::Loaded => {
                let mut help =
                    "j/k: nav | g/G: top/bottom | /: filter | Tab: view | o: open | y: yank | r: refresh | q: quit"
                        .to_string();
                if !app.filter.is_empty() {
                    help = format!("filter: {} | {}", app.filter, help);
                }
                Line::from(Span::styled(help, theme.dim))
            }
        }
    };

    let status_bar = Paragraph::new(status).style(theme.bar);
    frame.render_widget(status_bar, area);
}
