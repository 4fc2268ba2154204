use approx::assert_relative_eq;
use table_tracker::error::TrackerError;
use table_tracker::state::*;

fn total_chips(state: &GameState) -> f64 {
    state.players().iter().map(|p| p.chips).sum::<f64>() + state.pot()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn test_six_max_blinds() {
    let state = GameState::new(&[100.0; 6], 0.0, false).unwrap();
    assert_relative_eq!(state.pot(), 1.5);
    assert_relative_eq!(state.max_bet(), 1.0);
    assert_eq!(state.active(), Some(2));
    assert_relative_eq!(state.player(0).chips, 99.5);
    assert_relative_eq!(state.player(1).betsize, 1.0);
}

#[test]
fn test_heads_up_blinds() {
    let state = GameState::new(&[100.0, 100.0], 0.0, false).unwrap();
    assert_relative_eq!(state.player(0).betsize, 1.0);
    assert_relative_eq!(state.player(1).betsize, 0.5);
    assert_relative_eq!(state.pot(), 1.5);
    assert_relative_eq!(state.max_bet(), 1.0);
    assert_eq!(state.active(), Some(1));
}

#[test]
fn test_straddle_six_max() {
    let state = GameState::new(&[100.0; 6], 0.0, true).unwrap();
    assert_relative_eq!(state.pot(), 3.5);
    assert_relative_eq!(state.max_bet(), 2.0);
    assert_eq!(state.active(), Some(3));
}

#[test]
fn test_straddle_three_handed_starts_at_small_blind() {
    let state = GameState::new(&[100.0; 3], 0.0, true).unwrap();
    assert_eq!(state.active(), Some(0));
}

#[test]
fn test_ante_collected_from_everyone() {
    let state = GameState::new(&[100.0; 6], 0.1, false).unwrap();
    assert_relative_eq!(state.pot(), 2.1, epsilon = 1e-9);
    assert_relative_eq!(state.player(0).chips, 99.4, epsilon = 1e-9);
    assert_relative_eq!(state.player(5).chips, 99.9, epsilon = 1e-9);
    assert_relative_eq!(total_chips(&state), 600.0, epsilon = 1e-9);
}

// ---------------------------------------------------------------------------
// Action primitives
// ---------------------------------------------------------------------------

#[test]
fn test_utg_fold_moves_to_next() {
    let mut state = GameState::new(&[100.0; 6], 0.0, false).unwrap();
    state.fold().unwrap();
    assert!(state.player(2).folded);
    assert_eq!(state.active(), Some(3));
    assert_eq!(state.winner(), None);
}

#[test]
fn test_bet_then_call() {
    let mut state = GameState::new(&[100.0; 6], 0.0, false).unwrap();
    let pot = state.pot();
    state.bet(3.0).unwrap();
    assert_relative_eq!(state.max_bet(), 3.0);
    assert_relative_eq!(state.pot(), pot + 3.0);
    assert_eq!(state.bet_level(), 2);
    state.call().unwrap();
    assert_relative_eq!(state.max_bet(), 3.0);
    assert_relative_eq!(state.pot(), pot + 6.0);
    assert_eq!(state.active(), Some(4));
}

#[test]
fn test_bet_must_exceed_max_bet() {
    let mut state = GameState::new(&[100.0; 6], 0.0, false).unwrap();
    assert!(matches!(
        state.bet(1.0),
        Err(TrackerError::BetTooSmall { .. })
    ));
    assert_eq!(state.active(), Some(2));
}

#[test]
fn test_check_facing_bet_rejected() {
    let mut state = GameState::new(&[100.0; 6], 0.0, false).unwrap();
    assert!(matches!(state.check(), Err(TrackerError::UnmatchedBet(2))));
}

#[test]
fn test_fold_without_bet_rejected() {
    let mut state = GameState::new(&[100.0; 3], 0.0, false).unwrap();
    state.call().unwrap();
    state.call().unwrap();
    state.check().unwrap();
    assert_eq!(state.round(), 1);
    assert!(matches!(state.fold(), Err(TrackerError::NothingToCall(0))));
    assert!(matches!(state.call(), Err(TrackerError::NothingToCall(0))));
}

#[test]
fn test_fold_to_winner_rejects_further_actions() {
    let mut state = GameState::new(&[100.0; 3], 0.0, false).unwrap();
    state.fold().unwrap();
    state.fold().unwrap();
    assert_eq!(state.winner(), Some(1));
    assert!(state.is_terminal());
    assert_eq!(state.active(), None);
    assert!(matches!(state.bet(5.0), Err(TrackerError::HandOver)));
    assert!(matches!(state.call(), Err(TrackerError::HandOver)));
    assert!(matches!(state.check(), Err(TrackerError::HandOver)));
    assert!(matches!(state.fold(), Err(TrackerError::HandOver)));
}

#[test]
fn test_short_all_in_call() {
    let mut state = GameState::new(&[100.0, 3.0, 100.0], 0.0, false).unwrap();
    state.bet(5.0).unwrap();
    state.call().unwrap();
    state.call().unwrap();
    assert!(state.player(1).is_all_in());
    assert_relative_eq!(state.player(1).chips, 0.0);
    assert_relative_eq!(state.pot(), 13.0);
    assert_eq!(state.round(), 1);
    assert_eq!(state.active(), Some(0));

    // The all-in player is skipped on later streets.
    state.check().unwrap();
    assert_eq!(state.active(), Some(2));
    state.check().unwrap();
    assert_eq!(state.round(), 2);
    assert_relative_eq!(total_chips(&state), 203.0);
}

// ---------------------------------------------------------------------------
// Big blind option
// ---------------------------------------------------------------------------

#[test]
fn test_heads_up_big_blind_option() {
    let mut state = GameState::new(&[100.0, 100.0], 0.0, false).unwrap();
    state.call().unwrap();
    assert_relative_eq!(state.pot(), 2.0);
    assert_eq!(state.round(), 0);
    assert_eq!(state.active(), Some(0));

    state.check().unwrap();
    assert_eq!(state.round(), 1);
    assert_eq!(state.active(), Some(0));
    assert_relative_eq!(state.max_bet(), 0.0);
}

#[test]
fn test_big_blind_option_raise_reopens_action() {
    let mut state = GameState::new(&[100.0; 3], 0.0, false).unwrap();
    state.call().unwrap();
    state.call().unwrap();
    assert_eq!(state.active(), Some(1));
    state.bet(3.0).unwrap();
    assert_eq!(state.round(), 0);
    assert_eq!(state.active(), Some(2));
    state.call().unwrap();
    state.call().unwrap();
    assert_eq!(state.round(), 1);
    assert_relative_eq!(state.pot(), 12.0);
}

#[test]
fn test_straddler_holds_option() {
    let mut state = GameState::new(&[100.0; 4], 0.0, true).unwrap();
    state.call().unwrap();
    state.call().unwrap();
    state.call().unwrap();
    assert_eq!(state.round(), 0);
    assert_eq!(state.active(), Some(2));
    state.check().unwrap();
    assert_eq!(state.round(), 1);
    assert_relative_eq!(state.pot(), 8.0);
}

#[test]
fn test_option_closes_round_when_others_are_all_in() {
    let mut state = GameState::new(&[100.0, 0.5], 0.0, false).unwrap();
    assert!(state.player(1).is_all_in());
    assert_eq!(state.active(), Some(0));
    state.check().unwrap();
    assert_eq!(state.round(), 1);
    assert_eq!(state.active(), Some(0));

    // Nobody left to bet against: the remaining streets are checked through.
    for _ in 0..3 {
        state.check().unwrap();
    }
    assert!(state.is_terminal());
    assert_eq!(state.round(), SHOWDOWN);
}

// ---------------------------------------------------------------------------
// Full hands
// ---------------------------------------------------------------------------

#[test]
fn test_three_handed_hand_conserves_chips() {
    let mut state = GameState::new(&[100.0; 3], 0.0, false).unwrap();
    let script = [
        (Action::Call, 0),
        (Action::Call, 0),
        (Action::Check, 1),
        (Action::Check, 1),
        (Action::Bet(2.0), 1),
        (Action::Call, 1),
        (Action::Fold, 2),
        (Action::Check, 2),
        (Action::Check, 3),
        (Action::Bet(5.0), 3),
        (Action::Call, 4),
    ];
    let mut last_round = 0;
    for (action, round_after) in script {
        state.apply(action).unwrap();
        assert_relative_eq!(total_chips(&state), 300.0);
        assert!(state.round() >= last_round);
        assert_eq!(state.round(), round_after, "after {}", action);
        last_round = state.round();
        if let Some(a) = state.active() {
            assert!(state.player(a).can_act());
        }
    }
    assert!(state.is_terminal());
    assert_eq!(state.winner(), None);
    assert_relative_eq!(state.pot(), 17.0);
    assert!(state.player(0).folded);
}
