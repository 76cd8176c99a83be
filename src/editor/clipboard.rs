//! Clipboard collaborator read by the `Paste` event.

pub trait Clipboard {
    fn stored_text(&self) -> &str;
    fn store(&mut self, text: &str);
}

/// In-memory clipboard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimpleClipboard {
    text: String,
}

impl SimpleClipboard {
    pub fn new(text: &str) -> Self {
        SimpleClipboard {
            text: text.to_string(),
        }
    }
}

impl Clipboard for SimpleClipboard {
    fn stored_text(&self) -> &str {
        &self.text
    }

    fn store(&mut self, text: &str) {
        self.text = text.to_string();
    }
}
