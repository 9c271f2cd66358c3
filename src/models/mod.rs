use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Display};

/// Kind of action recorded in the raw event log
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behaviour {
    /// Time spent playing; the only behaviour whose hours are meaningful
    Play,
    /// A purchase; its hours column is a placeholder
    Purchase,
    /// Any other label present in the log
    Other(String),
}

impl Behaviour {
    /// Parses a raw behaviour label. Matching is exact and case-sensitive.
    pub fn from_label(label: &str) -> Self {
        match label {
            "play" => Behaviour::Play,
            "purchase" => Behaviour::Purchase,
            other => Behaviour::Other(other.to_string()),
        }
    }
}

impl Display for Behaviour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Behaviour::Play => write!(f, "play"),
            Behaviour::Purchase => write!(f, "purchase"),
            Behaviour::Other(label) => write!(f, "{}", label),
        }
    }
}

/// One row of the raw log
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub user_id: String,
    pub item_id: String,
    pub behaviour: Behaviour,
    /// `None` when the hours column is empty or not a finite number
    pub hours: Option<f64>,
}

impl Event {
    pub fn new(user_id: &str, item_id: &str, behaviour: Behaviour, hours: Option<f64>) -> Self {
        Self {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            behaviour,
            hours,
        }
    }

    /// Shorthand for a play event with a known duration
    pub fn play(user_id: &str, item_id: &str, hours: f64) -> Self {
        Self::new(user_id, item_id, Behaviour::Play, Some(hours))
    }

    pub fn is_play(&self) -> bool {
        self.behaviour == Behaviour::Play
    }
}

/// A recommended item and its similarity to the queried item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub item_id: String,
    pub score: f64,
}

/// Distinct item identifiers in order of first appearance in the raw log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCatalog(Vec<String>);

impl ItemCatalog {
    /// Collects every item seen in the log, whatever its behaviour
    pub fn from_events(events: &[Event]) -> Self {
        let mut seen = HashSet::new();
        let items = events
            .iter()
            .filter(|event| seen.insert(event.item_id.as_str()))
            .map(|event| event.item_id.clone())
            .collect();
        Self(items)
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive substring match, in catalog order
    pub fn search(&self, pattern: &str) -> Vec<String> {
        let pattern = pattern.to_lowercase();
        self.0
            .iter()
            .filter(|item| item.to_lowercase().contains(&pattern))
            .cloned()
            .collect()
    }
}

impl From<Vec<String>> for ItemCatalog {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}
