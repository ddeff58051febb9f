use std::collections::VecDeque;

/// Case-normalized window of recently produced items, used only for
/// deduplication. Capped: inserting past the cap drops the oldest entry.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    entries: VecDeque<String>,
    cap: usize,
}

impl HistoryWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cap,
        }
    }

    /// Rebuild from a persisted list, trimming to the cap from the oldest
    /// end if the stored list is somehow longer.
    pub fn from_entries(entries: Vec<String>, cap: usize) -> Self {
        let mut window = Self::new(cap);
        for entry in entries {
            window.insert(&entry);
        }
        window
    }

    pub fn contains(&self, candidate: &str) -> bool {
        let folded = candidate.to_lowercase();
        self.entries.iter().any(|e| *e == folded)
    }

    pub fn insert(&mut self, item: &str) {
        let folded = item.to_lowercase();
        if self.entries.contains(&folded) {
            return;
        }
        self.entries.push_back(folded);
        while self.entries.len() > self.cap {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot for persistence, oldest first.
    pub fn to_entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
