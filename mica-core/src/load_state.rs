//! Fetch status of a single widget.

/// Separates "still loading", "server said nothing" and "request failed".
///
/// A failure keeps the last good value so the widget can keep showing it
/// next to the error.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading { previous: Option<T> },
    Loaded(T),
    Empty,
    Failed { message: String, previous: Option<T> },
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl<T: Clone> LoadState<T> {
    /// Enter the loading state, keeping whatever is currently displayed.
    pub fn start_loading(&mut self) {
        let previous = self.value().cloned();
        *self = LoadState::Loading { previous };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let previous = self.value().cloned();
        *self = LoadState::Failed {
            message: message.into(),
            previous,
        };
    }
}

impl<T> LoadState<T> {
    /// The value to display, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(v) => Some(v),
            LoadState::Loading { previous } | LoadState::Failed { previous, .. } => {
                previous.as_ref()
            }
            LoadState::Idle | LoadState::Empty => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}
