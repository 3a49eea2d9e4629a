use ratatui::style::{Color, Modifier, Style};

use crate::types::Annotation;

/// Presentation constants. Built once at startup and passed explicitly to
/// the renderer; nothing reads styles from a global.
#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub failure: Style,
    pub warning: Style,
    pub header: Style,
    pub selected: Style,
    pub accent: Style,
    pub dim: Style,
    pub bar: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::default().fg(Color::Green),
            failure: Style::default().fg(Color::Red),
            warning: Style::default().fg(Color::Yellow),
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            accent: Style::default().fg(Color::Cyan),
            dim: Style::default().fg(Color::DarkGray),
            bar: Style::default().bg(Color::DarkGray),
        }
    }
}

impl Theme {
    /// The status colorizer: a pure mapping from annotation bucket to style.
    pub fn annotation_style(&self, annotation: Annotation) -> Style {
        match annotation {
            Annotation::Success => self.success,
            Annotation::Failure => self.failure,
            Annotation::Warning => self.warning,
        }
    }
}
