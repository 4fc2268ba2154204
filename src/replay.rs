//! Recorded polling sessions: per poll, the table windows that were visible
//! and the frame captured from each.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackerResult;
use crate::observer::Snapshot;
use crate::reconcile::TrackerEvent;
use crate::registry::{RegistryChange, TableRegistry, Window};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedWindow {
    pub id: String,
    pub title: String,
    /// Missing when the capture of this window failed.
    #[serde(default)]
    pub snapshot: Option<Snapshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedPoll {
    pub windows: Vec<RecordedWindow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recording {
    pub polls: Vec<RecordedPoll>,
}

pub struct PollReport {
    pub index: usize,
    pub change: RegistryChange,
    pub events: Vec<(String, TrackerEvent)>,
}

impl Recording {
    pub fn load(path: &Path) -> TrackerResult<Recording> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Plays every poll through `registry`, handing each poll's outcome to
    /// `on_poll` as soon as it is resolved.
    pub fn play<F>(&self, registry: &mut TableRegistry, mut on_poll: F)
    where
        F: FnMut(&PollReport, &TableRegistry),
    {
        for (index, poll) in self.polls.iter().enumerate() {
            let windows: Vec<Window> = poll
                .windows
                .iter()
                .map(|w| Window {
                    id: w.id.clone(),
                    title: w.title.clone(),
                })
                .collect();
            let change = registry.refresh(&windows);
            let frames: HashMap<String, Snapshot> = poll
                .windows
                .iter()
                .filter_map(|w| w.snapshot.clone().map(|s| (w.id.clone(), s)))
                .collect();
            let events = registry.poll(&frames);
            on_poll(
                &PollReport {
                    index,
                    change,
                    events,
                },
                registry,
            );
        }
    }
}
