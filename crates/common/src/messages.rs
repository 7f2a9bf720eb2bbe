//! Message log shown to the user after each operation

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Append-only list of human readable messages.
///
/// Cloning yields another handle to the same list, so the log can be handed
/// to a service and read back by whoever renders it.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn add(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(target: "notes::messages", "{}", message);
        self.entries.lock().push(message);
    }

    /// Snapshot of all messages in insertion order
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let log = MessageLog::new();
        let handle = log.clone();

        handle.add("NoteService: fetched notes");
        log.add(String::from("NoteService: deleted note id=15"));

        assert_eq!(
            log.messages(),
            vec!["NoteService: fetched notes", "NoteService: deleted note id=15"]
        );
        assert_eq!(handle.len(), 2);
    }

    #[test]
    fn test_clear() {
        let log = MessageLog::new();
        log.add("one");
        assert!(!log.is_empty());

        log.clear();
        assert!(log.is_empty());
        assert!(log.messages().is_empty());
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let log = MessageLog::new();
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        log.add(format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(log.len(), 800);
    }
}
