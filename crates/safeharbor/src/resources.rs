//! Resource directory: search, category filter and expandable details.
//!
//! Search and category filter each decide visibility on their own; whichever
//! ran last wins.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::ViewInstruction;
use crate::error::Result;

/// Filter value matching every card.
pub const ALL_CATEGORIES: &str = "all";
/// Class marking the active filter button.
pub const ACTIVE_CLASS: &str = "active";
/// Class marking an expanded card.
pub const EXPANDED_CLASS: &str = "expanded";
/// Toggle label while details are shown.
pub const SHOW_LESS: &str = "Show Less";
/// Toggle label while details are hidden.
pub const SHOW_MORE: &str = "Show More";

/// One resource card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCard {
    /// Element identity.
    pub id: String,
    /// Card heading.
    pub title: String,
    /// Summary text.
    #[serde(default)]
    pub summary: String,
    /// Text of the expandable details block.
    #[serde(default)]
    pub details: String,
    /// Categories the card belongs to.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl ResourceCard {
    /// Element identity of the details block.
    #[must_use]
    pub fn details_element(&self) -> String {
        format!("{}-details", self.id)
    }

    /// Element identity of the show more/less button.
    #[must_use]
    pub fn toggle_element(&self) -> String {
        format!("{}-toggle", self.id)
    }

    /// Whether the card's text contains `needle`, ignoring case.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.summary, &self.details]
            .into_iter()
            .chain(&self.categories)
            .any(|text| text.to_lowercase().contains(needle))
    }

    fn in_category(&self, category: &str) -> bool {
        category == ALL_CATEGORIES || self.categories.iter().any(|c| c == category)
    }
}

/// Element identity of the filter button for `value`.
#[must_use]
pub fn filter_element(value: &str) -> String {
    format!("filter-{value}")
}

/// The cards on the resources page and what is currently shown.
#[derive(Debug, Clone)]
pub struct ResourceDirectory {
    cards: Vec<ResourceCard>,
    visible: Vec<bool>,
    expanded: BTreeSet<String>,
    active_filter: String,
}

impl ResourceDirectory {
    /// Build a directory with every card visible and collapsed.
    #[must_use]
    pub fn new(cards: Vec<ResourceCard>) -> Self {
        let visible = vec![true; cards.len()];
        Self {
            cards,
            visible,
            expanded: BTreeSet::new(),
            active_filter: ALL_CATEGORIES.to_string(),
        }
    }

    /// Parse a JSON array of cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let cards: Vec<ResourceCard> = serde_json::from_str(json)?;
        Ok(Self::new(cards))
    }

    /// Read a JSON array of cards from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Show only the cards containing `term`, ignoring case. An empty term
    /// shows every card. Returns the number of visible cards.
    pub fn search(&mut self, term: &str) -> usize {
        // Matching is done on lowercased text
        let needle = term.trim().to_lowercase();
        for (card, visible) in self.cards.iter().zip(&mut self.visible) {
            *visible = needle.is_empty() || card.matches(&needle);
        }
        let shown = self.visible_count();
        debug!(term, shown, "Searched resources");
        shown
    }

    /// Show only the cards in `category`, or all of them for `"all"`.
    /// Returns the number of visible cards.
    pub fn filter(&mut self, category: &str) -> usize {
        for (card, visible) in self.cards.iter().zip(&mut self.visible) {
            *visible = card.in_category(category);
        }
        self.active_filter = category.to_string();
        let shown = self.visible_count();
        debug!(category, shown, "Filtered resources");
        shown
    }

    /// Expand or collapse a card's details. Returns the new expanded state,
    /// or `None` if there is no such card.
    pub fn toggle_details(&mut self, id: &str) -> Option<bool> {
        if !self.cards.iter().any(|card| card.id == id) {
            debug!(id, "Ignoring toggle for unknown card");
            return None;
        }

        // Flip the expanded state
        if self.expanded.remove(id) {
            Some(false)
        } else {
            self.expanded.insert(id.to_string());
            Some(true)
        }
    }

    /// Values for the filter buttons: `"all"` followed by every category in
    /// order.
    #[must_use]
    pub fn filter_values(&self) -> Vec<&str> {
        let categories: BTreeSet<&str> = self
            .cards
            .iter()
            .flat_map(|card| card.categories.iter().map(String::as_str))
            .collect();
        std::iter::once(ALL_CATEGORIES).chain(categories).collect()
    }

    /// Cards currently shown.
    pub fn visible_cards(&self) -> impl Iterator<Item = &ResourceCard> {
        self.cards
            .iter()
            .zip(&self.visible)
            .filter(|(_, visible)| **visible)
            .map(|(card, _)| card)
    }

    /// Number of cards currently shown.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    /// Whether a card's details are expanded.
    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// The most recently applied category filter.
    #[must_use]
    pub fn active_filter(&self) -> &str {
        &self.active_filter
    }

    /// Number of cards per category.
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for category in self.cards.iter().flat_map(|card| &card.categories) {
            *counts.entry(category.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Project the directory into view instructions.
    #[must_use]
    pub fn render(&self) -> Vec<ViewInstruction> {
        let mut out = Vec::with_capacity(self.cards.len() * 5);

        for (card, visible) in self.cards.iter().zip(&self.visible) {
            let expanded = self.is_expanded(&card.id);
            out.push(ViewInstruction::visible(&card.id, *visible));
            out.push(ViewInstruction::class(&card.id, EXPANDED_CLASS, expanded));
            out.push(ViewInstruction::visible(card.details_element(), expanded));
            out.push(ViewInstruction::text(
                card.toggle_element(),
                if expanded { SHOW_LESS } else { SHOW_MORE },
            ));
        }

        for value in self.filter_values() {
            out.push(ViewInstruction::class(
                filter_element(value),
                ACTIVE_CLASS,
                value == self.active_filter,
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, InMemoryDocument};

    const CARDS: &str = r#"[
        {
            "id": "hotline",
            "title": "National Hotline",
            "summary": "Confidential support, 24/7",
            "details": "Call 1-800-799-7233",
            "categories": ["crisis"]
        },
        {
            "id": "legal-aid",
            "title": "Legal Aid Society",
            "summary": "Free legal help with protective orders",
            "categories": ["legal"]
        },
        {
            "id": "shelter",
            "title": "Emergency Shelter Network",
            "summary": "Safe housing",
            "categories": ["housing", "crisis"]
        }
    ]"#;

    fn directory() -> ResourceDirectory {
        ResourceDirectory::from_json(CARDS).unwrap()
    }

    fn ids(dir: &ResourceDirectory) -> Vec<&str> {
        dir.visible_cards().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut dir = directory();
        assert_eq!(dir.search("LEGAL"), 1);
        assert_eq!(ids(&dir), vec!["legal-aid"]);

        assert_eq!(dir.search("799-7233"), 1);
        assert_eq!(ids(&dir), vec!["hotline"]);
    }

    #[test]
    fn test_empty_search_shows_all() {
        let mut dir = directory();
        dir.search("nothing matches this");
        assert_eq!(dir.visible_count(), 0);

        assert_eq!(dir.search(""), 3);
        assert_eq!(dir.search("   "), 3);
    }

    #[test]
    fn test_filter_by_category() {
        let mut dir = directory();
        assert_eq!(dir.filter("crisis"), 2);
        assert_eq!(ids(&dir), vec!["hotline", "shelter"]);

        assert_eq!(dir.filter("all"), 3);
        assert_eq!(dir.filter("unknown"), 0);
    }

    #[test]
    fn test_filter_marks_button_active() {
        let mut dir = directory();
        dir.filter("legal");

        let mut doc = InMemoryDocument::new();
        doc.apply_all(&dir.render());
        assert!(doc.has_class("filter-legal", ACTIVE_CLASS));
        assert!(!doc.has_class("filter-all", ACTIVE_CLASS));
        assert!(!doc.is_visible("hotline"));
        assert!(doc.is_visible("legal-aid"));
    }

    #[test]
    fn test_last_action_wins() {
        let mut dir = directory();
        dir.filter("legal");
        assert_eq!(dir.search("shelter"), 1);
        assert_eq!(ids(&dir), vec!["shelter"]);
    }

    #[test]
    fn test_toggle_details() {
        let mut dir = directory();
        let mut doc = InMemoryDocument::new();
        doc.apply_all(&dir.render());
        assert_eq!(doc.text("hotline-toggle"), Some(SHOW_MORE));
        assert!(!doc.is_visible("hotline-details"));

        assert_eq!(dir.toggle_details("hotline"), Some(true));
        doc.apply_all(&dir.render());
        assert_eq!(doc.text("hotline-toggle"), Some(SHOW_LESS));
        assert!(doc.is_visible("hotline-details"));
        assert!(doc.has_class("hotline", EXPANDED_CLASS));

        assert_eq!(dir.toggle_details("hotline"), Some(false));
        doc.apply_all(&dir.render());
        assert_eq!(doc.text("hotline-toggle"), Some(SHOW_MORE));
        assert!(!doc.has_class("hotline", EXPANDED_CLASS));

        assert_eq!(dir.toggle_details("missing"), None);
    }

    #[test]
    fn test_filter_values_and_counts() {
        let dir = directory();
        assert_eq!(dir.filter_values(), vec!["all", "crisis", "housing", "legal"]);
        assert_eq!(dir.category_counts().get("crisis"), Some(&2));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(ResourceDirectory::from_json("{not json").is_err());
    }
}
