use crate::types::{IssueBatch, Stack};

/// Which data source the dashboard is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Stacks,
    Issues,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Stacks => "Stacks",
            View::Issues => "Issues",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Quit,

    // Selection movement within the visible projection
    ScrollUp,
    ScrollDown,
    GoToTop,
    GoToBottom,

    SwitchView(View),
    Refresh,
    OpenInBrowser,
    YankUrl,

    // Filter mode
    EnterFilterMode,
    FilterInput(char),
    FilterBackspace,
    FilterConfirm,
    ClearFilter,

    // Fetch completions, posted back into the loop by spawned tasks.
    // The u64 is the load sequence id; stale completions are discarded.
    StacksLoaded(Vec<Stack>, u64),
    IssuesLoaded(IssueBatch, u64),
    IssuesAppended(IssueBatch, u64),
    LoadFailed {
        view: View,
        message: String,
        load_id: u64,
    },

    None,
}
