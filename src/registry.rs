//! The set of table windows currently being tracked.

use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::{SiteConfig, TrackerConfig};
use crate::observer::TableObserver;
use crate::reconcile::{TableTracker, TrackerEvent};

/// A top-level window reported by the window enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct TrackedTable {
    pub id: String,
    pub title: String,
    pub site: SiteConfig,
    pub tracker: TableTracker,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// One tracker per visible table, created when a table window appears and
/// dropped when it disappears.
#[derive(Debug, Clone)]
pub struct TableRegistry {
    config: TrackerConfig,
    tables: Vec<TrackedTable>,
}

impl TableRegistry {
    pub fn new(config: TrackerConfig) -> TableRegistry {
        TableRegistry {
            config,
            tables: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Syncs the tracked set with the windows visible right now. Windows no
    /// configured site recognizes are ignored.
    pub fn refresh(&mut self, windows: &[Window]) -> RegistryChange {
        let mut change = RegistryChange::default();

        let visible: Vec<(&Window, &SiteConfig)> = windows
            .iter()
            .filter_map(|w| self.config.find_site(&w.title).map(|site| (w, site)))
            .collect();

        self.tables.retain(|t| {
            let keep = visible.iter().any(|(w, _)| w.id == t.id);
            if !keep {
                info!("Table closed: {} \"{}\"", t.id, t.title);
                change.removed.push(t.id.clone());
            }
            keep
        });

        let mut new_tables = Vec::new();
        for (window, site) in visible {
            let known = self.tables.iter().any(|t| t.id == window.id)
                || new_tables.iter().any(|t: &TrackedTable| t.id == window.id);
            if known {
                continue;
            }
            info!("New table: {} \"{}\" ({})", window.id, window.title, site.name);
            change.added.push(window.id.clone());
            new_tables.push(TrackedTable {
                id: window.id.clone(),
                title: window.title.clone(),
                site: site.clone(),
                tracker: TableTracker::new(self.config.tolerance),
            });
        }
        self.tables.extend(new_tables);
        change
    }

    /// Runs one reconciliation pass per tracked table that has a frame.
    pub fn poll<O: TableObserver>(&mut self, frames: &HashMap<String, O>) -> Vec<(String, TrackerEvent)> {
        let mut out = Vec::new();
        for table in &mut self.tables {
            if let Some(frame) = frames.get(&table.id) {
                for event in table.tracker.update(frame) {
                    out.push((table.id.clone(), event));
                }
            }
        }
        out
    }

    pub fn get(&self, id: &str) -> Option<&TrackedTable> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn tables(&self) -> &[TrackedTable] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(id: &str, title: &str) -> Window {
        Window {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_refresh_adds_and_removes() {
        let mut registry = TableRegistry::new(TrackerConfig::default());
        let change = registry.refresh(&[
            window("a", "Halley - $0.01/$0.02 - No Limit Hold'em"),
            window("b", "Lobby"),
        ]);
        assert_eq!(change.added, vec!["a".to_string()]);
        assert_eq!(registry.len(), 1);

        let change = registry.refresh(&[
            window("c", "Vega - $0.05/$0.10 - No Limit Hold'em"),
        ]);
        assert_eq!(change.added, vec!["c".to_string()]);
        assert_eq!(change.removed, vec!["a".to_string()]);
        assert!(registry.get("a").is_none());
        assert!(registry.get("c").is_some());
    }

    #[test]
    fn test_refresh_keeps_existing_tracker() {
        let mut registry = TableRegistry::new(TrackerConfig::default());
        let w = window("a", "Halley - $0.01/$0.02 - No Limit Hold'em");
        registry.refresh(std::slice::from_ref(&w));
        let change = registry.refresh(&[w.clone(), w]);
        assert_eq!(change, RegistryChange::default());
        assert_eq!(registry.len(), 1);
    }
}
