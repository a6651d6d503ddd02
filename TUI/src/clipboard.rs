use arboard::Clipboard;
use log::warn;

/// Access to a text clipboard.
pub trait ClipboardProvider {
    /// Current clipboard text, or `None` when empty or not text.
    fn get_text(&mut self) -> Option<String>;
    /// Replace the clipboard text. Returns false when the write failed.
    fn set_text(&mut self, text: &str) -> bool;
}

/// System clipboard via arboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Option<&mut Clipboard> {
        if self.inner.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.inner = Some(clipboard),
                Err(e) => {
                    warn!("clipboard unavailable: {}", e);
                    return None;
                }
            }
        }
        self.inner.as_mut()
    }
}

impl ClipboardProvider for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        let clipboard = self.handle()?;
        match clipboard.get_text() {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("clipboard read failed: {}", e);
                None
            }
        }
    }

    fn set_text(&mut self, text: &str) -> bool {
        let Some(clipboard) = self.handle() else {
            return false;
        };
        match clipboard.set_text(text.to_string()) {
            Ok(()) => true,
            Err(e) => {
                warn!("clipboard write failed: {}", e);
                false
            }
        }
    }
}

/// Clean clipboard text for the single-line URL field.
pub fn sanitize_paste(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\0' && *c != '\r')
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// In-memory clipboard used by tests. Clones share the same contents.
#[cfg(test)]
#[derive(Default, Clone)]
pub struct MemoryClipboard {
    pub contents: std::rc::Rc<std::cell::RefCell<Option<String>>>,
}

#[cfg(test)]
impl MemoryClipboard {
    pub fn with_text(text: &str) -> Self {
        let clip = Self::default();
        *clip.contents.borrow_mut() = Some(text.to_string());
        clip
    }

    pub fn text(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

#[cfg(test)]
impl ClipboardProvider for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.contents.borrow().clone()
    }

    fn set_text(&mut self, text: &str) -> bool {
        *self.contents.borrow_mut() = Some(text.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_paste() {
        assert_eq!(sanitize_paste("  https://example.com/a\0\0 \n"), "https://example.com/a");
        assert_eq!(sanitize_paste("a\r\nb"), "a b");
        assert_eq!(sanitize_paste(""), "");
    }

    #[test]
    fn test_memory_clipboard() {
        let mut clip = MemoryClipboard::default();
        let view = clip.clone();
        assert_eq!(clip.get_text(), None);
        assert!(clip.set_text("hello"));
        assert_eq!(view.text().as_deref(), Some("hello"));
    }
}
