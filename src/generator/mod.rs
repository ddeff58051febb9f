pub mod generator;
pub mod history;
pub mod templates;

pub use generator::ContentGenerator;
pub use history::HistoryWindow;
pub use templates::{ContentTemplate, TopicCategory};
