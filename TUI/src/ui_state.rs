#[derive(Debug, Default)]
pub struct UIState {
    /// URL being typed or pasted
    pub input: String,
    /// Last generated citation, empty until one is made
    pub citation: String,
    /// Selected style name
    pub style: String,
    pub input_focused: bool,
    pub mouse_down: bool,
    pub is_loading: bool,
    pub status_message: Option<String>,
}

impl UIState {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            ..Self::default()
        }
    }
}
