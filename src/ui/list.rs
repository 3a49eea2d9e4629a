use chrono::Utc;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::{App, LoadState, Pane};
use crate::types::Entry;
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let pane = app.active_pane();
    let title = pane_title(app, pane);
    let block = Block::default().borders(Borders::ALL).title(title);

    match &pane.state {
        LoadState::Idle | LoadState::Loading => {
            let msg = Paragraph::new("Loading...")
                .block(block)
                .style(theme.warning);
            frame.render_widget(msg, area);
            return;
        }
        LoadState::Failed(error) => {
            let msg = Paragraph::new(format!("Error: {}", error))
                .block(block)
                .style(theme.failure);
            frame.render_widget(msg, area);
            return;
        }
        LoadState::Loaded => {}
    }

    if pane.visible.is_empty() {
        let text = if pane.entries.is_empty() {
            "No results"
        } else {
            "No entries match the filter"
        };
        let msg = Paragraph::new(text).block(block).style(theme.dim);
        frame.render_widget(msg, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 60; // name(30) + statuses(~24) + age(~4) + spacing
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = pane
        .visible
        .iter()
        .enumerate()
        .map(|(row, &idx)| {
            let selected = row == pane.selected;
            entry_row(&pane.entries[idx], selected, theme, flex)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.bar);

    let mut state = ListState::default();
    state.select(Some(pane.selected));

    frame.render_stateful_widget(list, area, &mut state);
}

fn pane_title(app: &App, pane: &Pane) -> String {
    match pane.total_count {
        Some(total) if total as usize != pane.entries.len() => format!(
            " {} ({} of {}) ",
            app.view.title(),
            pane.entries.len(),
            total
        ),
        _ => format!(" {} ({}) ", app.view.title(), pane.entries.len()),
    }
}

fn entry_row(entry: &Entry, selected: bool, theme: &Theme, flex: usize) -> ListItem<'static> {
    let title_style = if selected {
        theme.selected
    } else {
        Style::default()
    };

    let line = match entry {
        Entry::Stack(stack) => {
            let name = truncate(&stack.meta_name, 30);
            Line::from(vec![
                Span::styled(format!("{:<30}", name), title_style),
                Span::raw(" "),
                Span::styled(
                    format!("{:<9}", stack.status),
                    theme.annotation_style(stack.status.annotation()),
                ),
                Span::styled(
                    format!("{:<8}", stack.deployment_status),
                    theme.annotation_style(stack.deployment_status.annotation()),
                ),
                Span::styled(
                    format!("{:<8}", stack.drift_status),
                    theme.annotation_style(stack.drift_status.annotation()),
                ),
                Span::styled(format!("{:<flex$}", truncate(&entry.description(), flex)), theme.dim),
                Span::raw(" "),
                Span::styled(format_age(stack.updated_at), theme.dim),
            ])
        }
        Entry::Issue(issue) => {
            let repo = truncate(&issue.repo, 25);
            Line::from(vec![
                Span::styled(format!("{:<25}", repo), theme.accent),
                Span::raw(" "),
                Span::styled(format!("#{:<5}", issue.number), theme.dim),
                Span::raw(" "),
                Span::styled(
                    format!("{:<flex$}", truncate(&issue.title, flex)),
                    title_style,
                ),
                Span::raw(" "),
                Span::styled(format!("{:<6}", issue.state), theme.dim),
                Span::raw(" "),
                Span::styled(format_age(issue.updated_at), theme.dim),
            ])
        }
    };

    ListItem::new(line)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn format_age(dt: chrono::DateTime<chrono::Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        "now".to_string()
    }
}
