//! Synthetic tables for exercising reconciliation end to end.
//!
//! A [`SimTable`] keeps the true hand in its own [`GameState`] and renders
//! the [`Snapshot`] a screen reader would produce from it. Feeding those
//! frames to a [`TableTracker`], with polls randomly skipped, shows how well
//! the tracker reconstructs hands it only sees intermittently.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::cards::{cards_to_string, Card, Deck};
use crate::error::{TrackerError, TrackerResult};
use crate::observer::{SeatView, Snapshot};
use crate::position::PositionMap;
use crate::reconcile::{TableTracker, TrackerEvent};
use crate::state::{Action, GameState, BIG_BLIND, SHOWDOWN, SMALL_BLIND, STRADDLE};

const BOARD_CARDS: [usize; 5] = [0, 3, 4, 5, 5];

fn half_bb(x: f64) -> f64 {
    (x * 2.0).round() / 2.0
}

// ---------------------------------------------------------------------------
// SimTable
// ---------------------------------------------------------------------------

pub struct SimTable {
    truth: GameState,
    seats: PositionMap,
    seat_count: usize,
    /// Currency per big blind.
    unit: f64,
    board: Vec<Card>,
    hole_cards: Vec<Vec<Card>>,
}

impl SimTable {
    /// Deals a hand. `stacks` are pre-deal stacks in position order, one per
    /// occupied seat.
    pub fn deal<R: Rng>(
        stacks: &[f64],
        occupied: &[bool],
        button: usize,
        straddle: bool,
        ante: f64,
        unit: f64,
        rng: &mut R,
    ) -> TrackerResult<SimTable> {
        let seats = PositionMap::build(occupied, button)?;
        if seats.len() != stacks.len() {
            return Err(TrackerError::InvalidConfig(format!(
                "{} stacks for {} occupied seats",
                stacks.len(),
                seats.len()
            )));
        }
        let truth = GameState::new(stacks, ante, straddle)?;
        let mut deck = Deck::new();
        deck.shuffle(rng);
        let board = deck.deal(5)?;
        let hole_cards = (0..stacks.len())
            .map(|_| deck.deal(2))
            .collect::<TrackerResult<Vec<_>>>()?;
        Ok(SimTable {
            truth,
            seats,
            seat_count: occupied.len(),
            unit,
            board,
            hole_cards,
        })
    }

    pub fn truth(&self) -> &GameState {
        &self.truth
    }

    pub fn seats(&self) -> &PositionMap {
        &self.seats
    }

    pub fn apply(&mut self, action: Action) -> TrackerResult<()> {
        self.truth.apply(action)
    }

    fn blinds(&self) -> Vec<f64> {
        let mut blinds = vec![SMALL_BLIND * self.unit, BIG_BLIND * self.unit];
        if self.truth.straddle() {
            blinds.push(STRADDLE * self.unit);
        }
        blinds
    }

    /// What the table window would show right now.
    pub fn snapshot(&self) -> Snapshot {
        let state = &self.truth;
        let showdown = state.round() >= SHOWDOWN && state.winner().is_none();
        let visible = BOARD_CARDS[state.round().min(SHOWDOWN)];
        let seats = (0..self.seat_count)
            .map(|seat| match self.seats.position(seat) {
                None => SeatView {
                    open: true,
                    ..SeatView::default()
                },
                Some(pos) => {
                    let p = state.player(pos);
                    SeatView {
                        stack: Some(p.chips * self.unit),
                        bet: (p.betsize > 0.0).then(|| p.betsize * self.unit),
                        has_cards: !p.folded,
                        shown: (showdown && !p.folded)
                            .then(|| cards_to_string(&self.hole_cards[pos])),
                        ..SeatView::default()
                    }
                }
            })
            .collect();
        Snapshot {
            blinds: self.blinds(),
            ante: state.ante() * self.unit,
            button: Some(self.seats.button()),
            active: state.active().map(|pos| self.seats.seat(pos)),
            pot: Some(state.pot() * self.unit),
            board: Some(cards_to_string(&self.board[..visible])),
            seats,
        }
    }

    /// A random legal action for the player to act, sized in half big blinds.
    pub fn random_action<R: Rng>(&self, rng: &mut R) -> Action {
        let state = &self.truth;
        let Some(pos) = state.active() else {
            return Action::Check;
        };
        let player = state.player(pos);
        let to_call = state.max_bet() - player.betsize;
        let opponents_can_act = state
            .players()
            .iter()
            .enumerate()
            .any(|(i, p)| i != pos && p.can_act());

        if to_call > 1e-9 {
            let raise = half_bb(to_call + state.max_bet().max(BIG_BLIND) * rng.gen_range(1.0..3.0));
            match rng.gen_range(0..10) {
                0..=2 => Action::Fold,
                3..=7 => Action::Call,
                _ if opponents_can_act && player.chips > to_call + 0.5 => {
                    Action::Bet(raise.clamp(to_call + 0.5, player.chips))
                }
                _ => Action::Call,
            }
        } else {
            let bet = half_bb(state.pot() * rng.gen_range(0.3..1.0)).max(BIG_BLIND);
            if opponents_can_act && rng.gen_range(0..10) >= 6 {
                Action::Bet(bet.min(player.chips))
            } else {
                Action::Check
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Driving a tracker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub seat_count: usize,
    pub players: usize,
    pub straddle: bool,
    pub ante: f64,
    pub unit: f64,
    /// Probability of missing the poll after an action.
    pub skip: f64,
    pub min_stack: f64,
    pub max_stack: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            seat_count: 6,
            players: 6,
            straddle: false,
            ante: 0.0,
            unit: 1.0,
            skip: 0.0,
            min_stack: 20.0,
            max_stack: 150.0,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> TrackerResult<()> {
        if self.players < 2 || self.players > self.seat_count {
            return Err(TrackerError::InvalidConfig(format!(
                "need 2..={} players, got {}",
                self.seat_count, self.players
            )));
        }
        if self.straddle && self.players < 3 {
            return Err(TrackerError::InvalidConfig(
                "straddle needs at least 3 players".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.skip) {
            return Err(TrackerError::InvalidConfig(format!(
                "skip probability must be in [0, 1), got {}",
                self.skip
            )));
        }
        if self.unit <= 0.0 || self.min_stack < STRADDLE + self.ante || self.max_stack < self.min_stack {
            return Err(TrackerError::InvalidConfig(
                "unit must be positive and stacks must cover the forced bets".to_string(),
            ));
        }
        Ok(())
    }

    /// Seats a random table and deals one hand on it.
    pub fn deal_random<R: Rng>(&self, rng: &mut R) -> TrackerResult<SimTable> {
        let mut seat_ids: Vec<usize> = (0..self.seat_count).collect();
        seat_ids.shuffle(rng);
        let mut occupied = vec![false; self.seat_count];
        for &s in &seat_ids[..self.players] {
            occupied[s] = true;
        }
        let button = seat_ids[rng.gen_range(0..self.players)];
        let stacks: Vec<f64> = (0..self.players)
            .map(|_| half_bb(rng.gen_range(self.min_stack..=self.max_stack)))
            .collect();
        SimTable::deal(&stacks, &occupied, button, self.straddle, self.ante, self.unit, rng)
    }
}

#[derive(Debug, Clone)]
pub struct HandOutcome {
    pub actions: usize,
    pub polls: usize,
    pub truth_pot: f64,
    pub truth_winner: Option<usize>,
    /// `(winner, pot)` as reported by the tracker's hand-complete event.
    pub tracked: Option<(Option<usize>, f64)>,
    pub events: Vec<TrackerEvent>,
}

impl HandOutcome {
    pub fn is_exact(&self) -> bool {
        match self.tracked {
            Some((winner, pot)) => winner == self.truth_winner && (pot - self.truth_pot).abs() < 1e-6,
            None => false,
        }
    }
}

/// Plays `table` to completion with random actions, polling `tracker` after
/// each action unless the poll is randomly skipped. The opening frame and
/// the final frame are always polled.
pub fn run_hand<R: Rng>(
    tracker: &mut TableTracker,
    mut table: SimTable,
    skip: f64,
    rng: &mut R,
) -> TrackerResult<HandOutcome> {
    let mut events = tracker.update(&table.snapshot());
    let mut actions = 0;
    let mut polls = 1;
    while !table.truth().is_terminal() {
        let action = table.random_action(rng);
        table.apply(action)?;
        actions += 1;
        if table.truth().is_terminal() || !rng.gen_bool(skip) {
            events.extend(tracker.update(&table.snapshot()));
            polls += 1;
        }
    }
    let tracked = events.iter().rev().find_map(|e| match e {
        TrackerEvent::HandComplete { winner, pot } => Some((*winner, *pot)),
        _ => None,
    });
    Ok(HandOutcome {
        actions,
        polls,
        truth_pot: table.truth().pot(),
        truth_winner: table.truth().winner(),
        tracked,
        events,
    })
}

/// Runs `hands` hands on each of `tables` independent tables. Tables run in
/// parallel; hands at one table share a tracker and run in order.
pub fn simulate(config: &SimConfig, tables: usize, hands: usize, seed: u64) -> TrackerResult<Vec<HandOutcome>> {
    config.validate()?;
    let per_table: Vec<TrackerResult<Vec<HandOutcome>>> = (0..tables)
        .into_par_iter()
        .map(|t| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
            let mut tracker = TableTracker::default();
            (0..hands)
                .map(|_| {
                    let table = config.deal_random(&mut rng)?;
                    run_hand(&mut tracker, table, config.skip, &mut rng)
                })
                .collect()
        })
        .collect();
    let mut outcomes = Vec::with_capacity(tables * hands);
    for table in per_table {
        outcomes.extend(table?);
    }
    Ok(outcomes)
}
