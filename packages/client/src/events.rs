//! Event listing cards and the search/category filter of the home page.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Places {
    pub all: u32,
    pub occupied: u32,
}

impl Places {
    pub fn free(&self) -> u32 {
        self.all.saturating_sub(self.occupied)
    }

    pub fn is_full(&self) -> bool {
        self.free() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportEvent {
    pub title: String,
    pub short: String,
    pub organizer: String,
    pub date: String,
    pub registration_date: String,
    pub category: String,
    pub image: String,
    pub places: Places,
}

/// Case-insensitive title search plus a set of selected categories. An
/// empty search or an empty category set matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    search: String,
    categories: BTreeSet<String>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.trim().to_lowercase();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Selects `category`, or deselects it if already selected.
    pub fn toggle(&mut self, category: &str) {
        if !self.categories.remove(category) {
            self.categories.insert(category.to_string());
        }
    }

    /// Back to "all categories".
    pub fn clear_categories(&mut self) {
        self.categories.clear();
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn all_categories(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn matches(&self, event: &SportEvent) -> bool {
        let in_search =
            self.search.is_empty() || event.title.to_lowercase().contains(&self.search);
        let in_categories = self.categories.is_empty() || self.categories.contains(&event.category);
        in_search && in_categories
    }

    pub fn apply<'a>(&self, events: &'a [SportEvent]) -> Vec<&'a SportEvent> {
        events.iter().filter(|event| self.matches(event)).collect()
    }
}
