use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use table_tracker::config::{SiteConfig, TrackerConfig};
use table_tracker::observer::Snapshot;
use table_tracker::reconcile::{Phase, TrackerEvent};
use table_tracker::registry::{TableRegistry, Window};
use table_tracker::replay::{RecordedPoll, RecordedWindow, Recording};
use table_tracker::simulate::SimTable;
use table_tracker::state::Action;

const TITLE: &str = "Halley - $0.01/$0.02 USD - No Limit Hold'em";

fn table(seed: u64) -> SimTable {
    let mut rng = StdRng::seed_from_u64(seed);
    SimTable::deal(&[100.0; 4], &[true, true, false, true, true, false], 1, false, 0.0, 0.02, &mut rng)
        .unwrap()
}

fn recorded(id: &str, snapshot: Option<Snapshot>) -> RecordedWindow {
    RecordedWindow {
        id: id.to_string(),
        title: TITLE.to_string(),
        snapshot,
    }
}

#[test]
fn test_poll_routes_frames_by_table() {
    let mut registry = TableRegistry::new(TrackerConfig::default());
    registry.refresh(&[
        Window {
            id: "a".to_string(),
            title: TITLE.to_string(),
        },
        Window {
            id: "b".to_string(),
            title: TITLE.to_string(),
        },
    ]);

    let mut frames = HashMap::new();
    frames.insert("a".to_string(), table(1).snapshot());
    let events = registry.poll(&frames);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "a");
    assert!(matches!(events[0].1, TrackerEvent::NewHand { .. }));
    assert_eq!(registry.get("a").unwrap().tracker.phase(), Phase::InHand);
    assert_eq!(registry.get("b").unwrap().tracker.phase(), Phase::WaitingForHand);
}

#[test]
fn test_custom_site_config() {
    let config = TrackerConfig {
        tolerance: 0.01,
        sites: vec![SiteConfig {
            name: "Home Game".to_string(),
            table_title: "Friday".to_string(),
            seats: 8,
        }],
    };
    let mut registry = TableRegistry::new(config);
    let change = registry.refresh(&[
        Window {
            id: "x".to_string(),
            title: "Friday 1/2".to_string(),
        },
        Window {
            id: "y".to_string(),
            title: TITLE.to_string(),
        },
    ]);
    assert_eq!(change.added, vec!["x".to_string()]);
    assert_eq!(registry.get("x").unwrap().site.seats, 8);
}

#[test]
fn test_recording_plays_through_registry() {
    let mut sim = table(2);
    let opening = sim.snapshot();
    sim.apply(Action::Bet(2.0)).unwrap();
    let after_raise = sim.snapshot();

    let recording = Recording {
        polls: vec![
            RecordedPoll {
                windows: vec![
                    recorded("t1", Some(opening)),
                    RecordedWindow {
                        id: "lobby".to_string(),
                        title: "PokerStars Lobby".to_string(),
                        snapshot: None,
                    },
                ],
            },
            RecordedPoll {
                windows: vec![recorded("t1", None)],
            },
            RecordedPoll {
                windows: vec![recorded("t1", Some(after_raise))],
            },
            RecordedPoll { windows: vec![] },
        ],
    };

    // Through JSON, the way recordings are read from disk.
    let json = serde_json::to_string(&recording).unwrap();
    let recording: Recording = serde_json::from_str(&json).unwrap();

    let mut registry = TableRegistry::new(TrackerConfig::default());
    let mut reports = Vec::new();
    recording.play(&mut registry, |report, registry| {
        reports.push((
            report.change.clone(),
            report.events.iter().map(|(_, e)| e.clone()).collect::<Vec<_>>(),
            registry.len(),
        ));
    });

    assert_eq!(reports.len(), 4);
    assert_eq!(reports[0].0.added, vec!["t1".to_string()]);
    assert!(matches!(reports[0].1[..], [TrackerEvent::NewHand { .. }]));
    assert!(reports[1].1.is_empty());
    match &reports[2].1[..] {
        [TrackerEvent::Action {
            seat, action, ..
        }] => {
            assert_eq!(*seat, 0);
            assert!(matches!(action, Action::Bet(b) if (b - 2.0).abs() < 1e-6));
        }
        other => panic!("unexpected events {:?}", other),
    }
    assert_eq!(reports[3].0.removed, vec!["t1".to_string()]);
    assert_eq!(reports[3].2, 0);
}
