/// User actions triggered by clicks or keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Give the URL field keyboard focus
    FocusInput,
    /// Drop keyboard focus from the URL field
    BlurInput,
    /// Replace the URL with clipboard text
    Paste,
    /// Fetch the page and format a citation
    Generate,
    /// Switch to the next citation style
    CycleStyle,
    /// Put the citation on the clipboard
    CopyCitation,
    /// Empty URL and citation
    Clear,
    /// Quit application
    Quit,
}
