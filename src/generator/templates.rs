use rand::seq::SliceRandom;
use rand::Rng;

/// A named table of topic entries.
#[derive(Debug, Clone)]
pub struct TopicCategory {
    pub name: String,
    pub entries: Vec<String>,
}

impl TopicCategory {
    pub fn new(name: &str, entries: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            entries: entries.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Stateless category tables that generation patterns compose from.
/// Loaded once at startup.
#[derive(Debug, Clone)]
pub struct ContentTemplate {
    pub question_prefixes: Vec<String>,
    pub search_prefixes: Vec<String>,
    pub topics: Vec<TopicCategory>,
    pub modifiers: Vec<String>,
    pub seasonal: Vec<String>,
    pub time_based: Vec<String>,
    pub everyday: Vec<String>,
}

impl ContentTemplate {
    /// Built-in tables.
    pub fn builtin() -> Self {
        Self {
            question_prefixes: to_strings(&[
                "how to",
                "how do I",
                "what is",
                "what are",
                "where can I find",
                "why does",
                "when will",
                "who invented",
                "which",
                "can I",
            ]),
            search_prefixes: to_strings(&[
                "best",
                "top",
                "affordable",
                "cheap",
                "popular",
                "trending",
                "new",
                "nearby",
                "how to make",
                "ways to",
            ]),
            topics: vec![
                TopicCategory::new(
                    "technology",
                    &[
                        "smartphones",
                        "laptops",
                        "gaming PC",
                        "smart TV",
                        "headphones",
                        "wireless earbuds",
                        "smartwatch",
                        "tablet",
                        "bluetooth speaker",
                        "mechanical keyboard",
                        "webcam",
                        "external hard drive",
                    ],
                ),
                TopicCategory::new(
                    "software",
                    &[
                        "Windows 11",
                        "macOS",
                        "Linux",
                        "iOS 18",
                        "Android",
                        "Office 365",
                        "Photoshop",
                        "Excel",
                        "Word",
                        "PowerPoint",
                        "Visual Studio Code",
                        "Chrome",
                        "Firefox",
                        "Edge browser",
                    ],
                ),
                TopicCategory::new(
                    "programming",
                    &[
                        "JavaScript",
                        "Python",
                        "Java",
                        "C++",
                        "TypeScript",
                        "React",
                        "Angular",
                        "Node.js",
                        "SQL",
                        "HTML",
                        "CSS",
                        "Go language",
                        "Rust",
                    ],
                ),
                TopicCategory::new(
                    "health",
                    &[
                        "workout",
                        "diet",
                        "nutrition",
                        "vitamins",
                        "protein",
                        "yoga",
                        "meditation",
                        "mental health",
                        "sleep",
                        "exercises",
                        "running",
                        "weight training",
                        "cardio",
                    ],
                ),
                TopicCategory::new(
                    "food",
                    &[
                        "recipes",
                        "cooking",
                        "restaurants",
                        "baking",
                        "meal prep",
                        "breakfast",
                        "lunch",
                        "dinner",
                        "dessert",
                        "coffee",
                        "smoothies",
                        "pizza",
                        "sushi",
                        "Italian food",
                    ],
                ),
                TopicCategory::new(
                    "travel",
                    &[
                        "vacation",
                        "flights",
                        "hotels",
                        "resorts",
                        "beaches",
                        "mountains",
                        "national parks",
                        "Europe trip",
                        "Asia tour",
                        "road trip",
                        "cruises",
                        "travel insurance",
                        "passport",
                    ],
                ),
                TopicCategory::new(
                    "shopping",
                    &[
                        "online shopping",
                        "Amazon deals",
                        "discount codes",
                        "sales",
                        "fashion",
                        "shoes",
                        "electronics",
                        "furniture",
                        "home decor",
                        "kitchen appliances",
                        "clothing brands",
                    ],
                ),
                TopicCategory::new(
                    "entertainment",
                    &[
                        "movies",
                        "TV shows",
                        "streaming services",
                        "Netflix",
                        "Disney+",
                        "HBO Max",
                        "music",
                        "concerts",
                        "books",
                        "podcasts",
                        "video games",
                        "board games",
                        "theater",
                    ],
                ),
            ],
            modifiers: to_strings(&[
                "for beginners",
                "tutorial",
                "guide",
                "review",
                "comparison",
                "near me",
                "online",
                "2025",
                "reddit",
                "best of 2025",
                "worth it",
                "alternatives",
                "vs",
                "prices",
            ]),
            seasonal: to_strings(&[
                "Earth Day 2025",
                "spring activities",
                "spring cleaning",
                "tax deadline 2025",
                "April events",
                "gardening tips spring",
                "spring fashion 2025",
                "spring break destinations",
            ]),
            time_based: to_strings(&[
                "today",
                "this week",
                "this weekend",
                "this month",
                "April 2025",
                "upcoming",
                "schedule",
                "release date",
                "launch",
            ]),
            everyday: to_strings(&[
                "weather forecast",
                "news today",
                "stock market",
                "traffic updates",
                "sports scores",
                "exchange rate",
                "calculator",
                "translate",
                "dictionary",
                "maps",
            ]),
        }
    }

    /// Uniform pick of a category, then a uniform pick within it.
    pub fn random_topic<R: Rng>(&self, rng: &mut R) -> &str {
        self.topics
            .choose(rng)
            .and_then(|category| category.entries.choose(rng))
            .map(|entry| entry.as_str())
            .unwrap_or_default()
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|i| i.to_string()).collect()
}
