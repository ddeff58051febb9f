use rand::seq::SliceRandom;
use rand::Rng;

use crate::storage::{keys, StoreHandle};

use super::history::HistoryWindow;
use super::templates::ContentTemplate;

/// Produces non-repeating items by weighted pattern composition plus
/// rejection sampling against the persisted history window.
///
/// The retry loop is bounded: after `max_attempts` colliding candidates
/// the last one is made unique with a small numeric suffix instead of
/// looping further. Uniqueness is therefore only best-effort against the
/// retained window, never global.
pub struct ContentGenerator {
    store: StoreHandle,
    template: ContentTemplate,
    history: HistoryWindow,
    max_attempts: u32,
}

impl ContentGenerator {
    /// Loads the persisted history window from the shared store.
    pub fn new(
        store: StoreHandle,
        template: ContentTemplate,
        max_history: usize,
        max_attempts: u32,
    ) -> Self {
        let entries: Vec<String> = store.get_or(keys::HISTORY, Vec::new());
        Self {
            store,
            template,
            history: HistoryWindow::from_entries(entries, max_history),
            max_attempts,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Generate one item, record it in the window and persist the window.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> String {
        let mut candidate = self.compose(rng);
        let mut attempts = 1;
        while self.history.contains(&candidate) && attempts < self.max_attempts {
            candidate = self.compose(rng);
            attempts += 1;
        }
        if self.history.contains(&candidate) {
            candidate = format!("{} {}", candidate, rng.gen_range(0..100));
        }

        self.history.insert(&candidate);
        self.store.put(keys::HISTORY, &self.history.to_entries());
        candidate
    }

    /// One weighted draw over the generation patterns. The cumulative
    /// thresholds are the documented distribution: 25% question, 20%
    /// prefix+topic+modifier, 20% prefix+topic, 10% topic+modifier, 10%
    /// seasonal, 5% topic+time, 10% everyday.
    fn compose<R: Rng>(&self, rng: &mut R) -> String {
        let t = &self.template;
        let roll: f64 = rng.gen();

        if roll < 0.25 {
            let prefix = pick(&t.question_prefixes, rng);
            let topic = t.random_topic(rng);
            if rng.gen::<f64>() < 0.3 {
                let modifier = pick(&t.modifiers, rng);
                format!("{} {} {}", prefix, topic, modifier)
            } else {
                format!("{} {}", prefix, topic)
            }
        } else if roll < 0.45 {
            let prefix = pick(&t.search_prefixes, rng);
            let topic = t.random_topic(rng);
            let modifier = pick(&t.modifiers, rng);
            format!("{} {} {}", prefix, topic, modifier)
        } else if roll < 0.65 {
            let prefix = pick(&t.search_prefixes, rng);
            let topic = t.random_topic(rng);
            format!("{} {}", prefix, topic)
        } else if roll < 0.75 {
            let topic = t.random_topic(rng);
            let modifier = pick(&t.modifiers, rng);
            format!("{} {}", topic, modifier)
        } else if roll < 0.85 {
            pick(&t.seasonal, rng).to_string()
        } else if roll < 0.90 {
            let topic = t.random_topic(rng);
            let time = pick(&t.time_based, rng);
            format!("{} {}", topic, time)
        } else {
            pick(&t.everyday, rng).to_string()
        }
    }
}

fn pick<'a, R: Rng>(table: &'a [String], rng: &mut R) -> &'a str {
    table.choose(rng).map(|s| s.as_str()).unwrap_or_default()
}
