use std::cell::RefCell;

/// Styling hint attached to a narration message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageTag {
    Info,
    PlayerAttack,
    EnemyAttack,
    Death,
    Status,
    Warning,
}

/// Fire-and-forget sink for gameplay narration.
///
/// The engine posts outcome text (hits, misses, deaths, status changes) and
/// never reads anything back. Hosts route this to their log UI.
pub trait MessageSink {
    fn post(&self, text: &str, tag: MessageTag);
}

/// Sink that drops everything. Useful for headless simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn post(&self, _text: &str, _tag: MessageTag) {}
}

/// In-memory log, the reference sink used by tests and simple hosts.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: RefCell<Vec<(String, MessageTag)>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, MessageTag)> {
        self.messages.borrow().clone()
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.messages
            .borrow()
            .iter()
            .any(|(text, _)| text.contains(fragment))
    }

    pub fn count_containing(&self, fragment: &str) -> usize {
        self.messages
            .borrow()
            .iter()
            .filter(|(text, _)| text.contains(fragment))
            .count()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl MessageSink for MessageLog {
    fn post(&self, text: &str, tag: MessageTag) {
        self.messages.borrow_mut().push((text.to_string(), tag));
    }
}
