//! Per-table reconciliation of observed snapshots against the betting model.
//!
//! Each poll compares what the table shows with what the [`GameState`]
//! expects and replays the actions that explain the difference, one per
//! iteration, until the model has caught up or an observation is missing.
//! A missing observation always stops the pass before anything is applied,
//! so re-running a pass on the same or a newer frame never applies an
//! action twice.

use log::{debug, info, warn};

use crate::config::DEFAULT_TOLERANCE;
use crate::observer::TableObserver;
use crate::position::PositionMap;
use crate::state::{round_name, Action, GameState, SHOWDOWN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForHand,
    InHand,
    AwaitingShowdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Showdown {
    pub board: String,
    pub pot: f64,
    /// Revealed hole cards by physical seat.
    pub hands: Vec<(usize, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    NewHand {
        button: usize,
        seats: Vec<usize>,
        stacks: Vec<f64>,
        ante: f64,
        straddle: bool,
    },
    Street {
        round: usize,
        board: String,
        pot: Option<f64>,
    },
    Action {
        position: usize,
        seat: usize,
        action: Action,
        pot: f64,
    },
    HandComplete {
        winner: Option<usize>,
        pot: f64,
    },
    Showdown(Showdown),
    /// A fresh deal appeared while the model was still mid-hand.
    Abandoned {
        round: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Wait,
}

#[derive(Debug, Clone)]
struct Hand {
    state: GameState,
    seats: PositionMap,
    announced_round: usize,
}

/// Tracks the hand in progress at one table.
#[derive(Debug, Clone)]
pub struct TableTracker {
    hand: Option<Hand>,
    tolerance: f64,
}

impl Default for TableTracker {
    fn default() -> Self {
        TableTracker::new(DEFAULT_TOLERANCE)
    }
}

impl TableTracker {
    pub fn new(tolerance: f64) -> TableTracker {
        TableTracker {
            hand: None,
            tolerance,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.hand {
            None => Phase::WaitingForHand,
            Some(h) if h.state.is_terminal() => Phase::AwaitingShowdown,
            Some(_) => Phase::InHand,
        }
    }

    pub fn state(&self) -> Option<&GameState> {
        self.hand.as_ref().map(|h| &h.state)
    }

    pub fn seats(&self) -> Option<&PositionMap> {
        self.hand.as_ref().map(|h| &h.seats)
    }

    /// Runs one poll against `obs` and returns what was learned from it.
    pub fn update(&mut self, obs: &dyn TableObserver) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        loop {
            let step = match self.phase() {
                Phase::WaitingForHand => {
                    if self.try_start_hand(obs, &mut events) {
                        Step::Continue
                    } else {
                        debug!("Waiting for new hand...");
                        Step::Wait
                    }
                }
                Phase::InHand => self.step(obs, &mut events),
                Phase::AwaitingShowdown => self.resolve_showdown(obs, &mut events),
            };
            if step == Step::Wait {
                return events;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Hand start
    // -----------------------------------------------------------------------

    /// Pot equals the forced bets alone, so no voluntary action has happened.
    fn is_fresh_deal(&self, obs: &dyn TableObserver, players: usize) -> bool {
        let blinds = obs.blinds();
        let Some(&big_blind) = blinds.get(1) else {
            return false;
        };
        let Some(pot) = obs.pot_size(true) else {
            return false;
        };
        let expected = blinds.iter().sum::<f64>() / big_blind + obs.ante(true) * players as f64;
        (pot - expected).abs() <= self.tolerance
    }

    fn try_start_hand(&mut self, obs: &dyn TableObserver, events: &mut Vec<TrackerEvent>) -> bool {
        if obs.round() != 0 || obs.active_seat().is_none() {
            return false;
        }
        let Some(button) = obs.button_seat() else {
            return false;
        };
        let seats = match PositionMap::build(&obs.occupied_seats(), button) {
            Ok(seats) if seats.len() >= 2 => seats,
            Ok(_) => return false,
            Err(e) => {
                debug!("{}", e);
                return false;
            }
        };
        let Some(observed) = seats
            .seats()
            .iter()
            .map(|&s| obs.stack_size(s, true))
            .collect::<Option<Vec<f64>>>()
        else {
            return false;
        };
        if !self.is_fresh_deal(obs, seats.len()) {
            return false;
        }

        // Displayed stacks already have the forced bets taken out.
        let n = seats.len();
        let straddle = obs.blinds().len() == 3;
        let ante = obs.ante(true);
        let stacks: Vec<f64> = observed
            .iter()
            .enumerate()
            .map(|(pos, s)| s + GameState::blind_size(n, pos, straddle) + ante)
            .collect();
        let state = match GameState::new(&stacks, ante, straddle) {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to start hand: {}", e);
                return false;
            }
        };
        info!("New hand:\n{}", state);
        events.push(TrackerEvent::NewHand {
            button,
            seats: seats.seats().to_vec(),
            stacks,
            ante,
            straddle,
        });
        self.hand = Some(Hand {
            state,
            seats,
            announced_round: 0,
        });
        true
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    fn step(&mut self, obs: &dyn TableObserver, events: &mut Vec<TrackerEvent>) -> Step {
        let curr_round = obs.round();
        let Some(hand) = self.hand.as_ref() else {
            return Step::Continue;
        };
        let model_round = hand.state.round();

        if curr_round < model_round {
            if curr_round == 0 && self.is_fresh_deal(obs, obs.occupied_seats().iter().filter(|&&o| o).count()) {
                warn!("Fresh deal while tracking {}, abandoning hand.", round_name(model_round));
                events.push(TrackerEvent::Abandoned { round: model_round });
                self.hand = None;
                return Step::Continue;
            }
            debug!("Waiting for next card...");
            return Step::Wait;
        }

        self.announce_street(obs, events);

        let Some(hand) = self.hand.as_ref() else {
            return Step::Continue;
        };
        let Some(pos) = hand.state.active() else {
            return Step::Continue;
        };
        let seat = hand.seats.seat(pos);
        let Some(action) = self.infer_action(obs, hand, curr_round, pos, seat) else {
            return Step::Wait;
        };

        let Some(hand) = self.hand.as_mut() else {
            return Step::Continue;
        };
        if let Err(e) = hand.state.apply(action) {
            warn!("Seat {}: inferred {} rejected: {}", seat, action, e);
            return Step::Wait;
        }
        events.push(TrackerEvent::Action {
            position: pos,
            seat,
            action,
            pot: hand.state.pot(),
        });
        if hand.state.is_terminal() {
            info!(
                "Hand complete (Pot: {:.2} bb, winner: {:?})",
                hand.state.pot(),
                hand.state.winner()
            );
            events.push(TrackerEvent::HandComplete {
                winner: hand.state.winner(),
                pot: hand.state.pot(),
            });
        }
        Step::Continue
    }

    /// Reports each street once the model has reached it and the board reads.
    fn announce_street(&mut self, obs: &dyn TableObserver, events: &mut Vec<TrackerEvent>) {
        let Some(hand) = self.hand.as_mut() else {
            return;
        };
        let round = hand.state.round();
        if round <= hand.announced_round || round >= SHOWDOWN {
            return;
        }
        match obs.board() {
            Some(board) => {
                hand.announced_round = round;
                events.push(TrackerEvent::Street {
                    round,
                    board,
                    pot: obs.pot_size(true),
                });
            }
            None => warn!("Failed to read board."),
        }
    }

    /// Decides which action explains the frame for the expected actor, or
    /// `None` when the frame does not yet show that player acting.
    fn infer_action(
        &self,
        obs: &dyn TableObserver,
        hand: &Hand,
        curr_round: usize,
        pos: usize,
        seat: usize,
    ) -> Option<Action> {
        let tol = self.tolerance;
        let state = &hand.state;
        let player = state.player(pos);
        let max_bet = state.max_bet();
        let round_changed = curr_round != state.round();

        if !obs.has_cards(seat) {
            debug!("\tSeat {} has no cards.", seat);
            if !round_changed {
                // Folding is only modeled facing a bet; an earlier fold is a check here.
                return Some(if player.betsize + tol < max_bet {
                    Action::Fold
                } else {
                    Action::Check
                });
            }
            // The fold may belong to a later street: chips that left the
            // stack tell what happened in this one.
            let chips = read_amount(obs.stack_size(seat, true), "stack size", seat)?;
            let diff = player.chips - chips;
            return Some(classify_investment(diff, player.betsize, max_bet, tol).unwrap_or(Action::Fold));
        }

        if obs.is_showing_hand(seat) {
            debug!("\tSeat {} is showing a hand.", seat);
            if player.betsize >= max_bet - tol {
                return Some(Action::Check);
            }
            let chips = read_amount(obs.stack_size(seat, true), "stack size", seat)?;
            let diff = player.chips - chips;
            return Some(if diff > tol { Action::Call } else { Action::Fold });
        }

        let active_seat = obs.active_seat()?;
        if active_seat == seat && !round_changed {
            return None;
        }

        if !obs.has_bet(seat) {
            debug!("\tSeat {} has not bet.", seat);
            if !round_changed {
                return Some(Action::Check);
            }
            debug!("\tRound has changed: {} -> {}", state.round(), curr_round);
            let chips = read_amount(obs.stack_size(seat, true), "stack size", seat)?;
            let diff = player.chips - chips;
            debug!(
                "\tSeat {} chip difference: {:.2} bb, max bet: {:.2} bb",
                seat, diff, max_bet
            );
            return self.explain_investment(diff, player.betsize, max_bet, seat);
        }

        let bet_size = read_amount(obs.bet_size(seat, true), "bet size", seat)?;
        debug!(
            "\tSeat {} has bet {:.2} bb (previously {:.2} bb, max bet {:.2} bb)",
            seat, bet_size, player.betsize, max_bet
        );
        if !round_changed {
            if bet_size > max_bet + tol {
                Some(Action::Bet(bet_size - player.betsize))
            } else if bet_size <= player.betsize + tol {
                Some(Action::Check)
            } else {
                Some(Action::Call)
            }
        } else {
            debug!("\tRound has changed: {} -> {}", state.round(), curr_round);
            let chips = read_amount(obs.stack_size(seat, true), "stack size", seat)?;
            let diff = player.chips - chips - bet_size;
            self.explain_investment(diff, player.betsize, max_bet, seat)
        }
    }

    fn explain_investment(&self, diff: f64, betsize: f64, max_bet: f64, seat: usize) -> Option<Action> {
        let action = classify_investment(diff, betsize, max_bet, self.tolerance);
        if action.is_none() {
            warn!(
                "Seat {} still holds cards facing {:.2} bb without investing, waiting.",
                seat,
                max_bet - betsize
            );
        }
        action
    }

    // -----------------------------------------------------------------------
    // Hand end
    // -----------------------------------------------------------------------

    fn resolve_showdown(&mut self, obs: &dyn TableObserver, events: &mut Vec<TrackerEvent>) -> Step {
        let Some(hand) = self.hand.as_ref() else {
            return Step::Continue;
        };
        let hands: Vec<(usize, String)> = hand
            .seats
            .seats()
            .iter()
            .filter(|&&s| obs.is_showing_hand(s))
            .filter_map(|&s| obs.hand(s).map(|h| (s, h)))
            .collect();
        if !hands.is_empty() {
            match (obs.pot_size(true), obs.board()) {
                (Some(pot), Some(board)) => {
                    info!("Showdown (Pot: {:.2} bb) {}", pot, board);
                    events.push(TrackerEvent::Showdown(Showdown { board, pot, hands }));
                    self.hand = None;
                    return Step::Continue;
                }
                _ => warn!("Failed to read showdown board or pot."),
            }
        }
        if self.try_start_hand(obs, events) {
            Step::Continue
        } else {
            Step::Wait
        }
    }
}

/// Explains `diff` chips that left a stack during a street the player
/// entered with `betsize` committed: a raise when the new total exceeds the
/// maximum bet, a call when a bet was faced and chips moved, a check when
/// nothing was owed. `None` when a bet was faced and nothing moved.
pub fn classify_investment(diff: f64, betsize: f64, max_bet: f64, tol: f64) -> Option<Action> {
    if betsize + diff > max_bet + tol {
        Some(Action::Bet(diff))
    } else if max_bet - betsize > tol {
        (diff > tol).then_some(Action::Call)
    } else {
        Some(Action::Check)
    }
}

fn read_amount(value: Option<f64>, what: &str, seat: usize) -> Option<f64> {
    if value.is_none() {
        warn!("Failed to read {} {}.", what, seat);
    }
    value
}
