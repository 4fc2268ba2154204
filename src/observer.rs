//! The read-only view of a poker table the tracker reasons about.
//!
//! Pixel and OCR extraction live outside this crate; anything able to answer
//! [`TableObserver`] can drive a [`crate::reconcile::TableTracker`]. Every
//! numeric read may fail and reports `None` instead of guessing.

use serde::{Deserialize, Serialize};

use crate::cards::parse_board;

pub trait TableObserver {
    /// Number of physical seats on the table.
    fn seat_count(&self) -> usize;
    /// Betting round derived from the visible board: 0 = preflop .. 3 = river.
    fn round(&self) -> usize;
    fn active_seat(&self) -> Option<usize>;
    fn button_seat(&self) -> Option<usize>;
    fn stack_size(&self, seat: usize, in_blinds: bool) -> Option<f64>;
    fn bet_size(&self, seat: usize, in_blinds: bool) -> Option<f64>;
    fn pot_size(&self, in_blinds: bool) -> Option<f64>;
    fn has_cards(&self, seat: usize) -> bool;
    fn has_bet(&self, seat: usize) -> bool;
    fn is_showing_hand(&self, seat: usize) -> bool;
    fn is_seat_open(&self, seat: usize) -> bool;
    fn is_sitting_out(&self, seat: usize) -> bool;
    fn board(&self) -> Option<String>;
    fn hand(&self, seat: usize) -> Option<String>;
    /// Small blind, big blind and optional straddle in table currency.
    fn blinds(&self) -> Vec<f64>;
    fn ante(&self, in_blinds: bool) -> f64;

    /// Seats dealt into the current hand.
    fn occupied_seats(&self) -> Vec<bool> {
        (0..self.seat_count())
            .map(|s| !self.is_seat_open(s) && !self.is_sitting_out(s))
            .collect()
    }
}

/// Maps the number of visible board cards to a betting round.
pub fn round_from_board_cards(cards: usize) -> usize {
    match cards {
        0..=2 => 0,
        3 => 1,
        4 => 2,
        _ => 3,
    }
}

// ---------------------------------------------------------------------------
// Recorded snapshots
// ---------------------------------------------------------------------------

/// What one seat looked like in a frame. Amounts are in table currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatView {
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub sitting_out: bool,
    #[serde(default)]
    pub stack: Option<f64>,
    /// Bet chips are drawn in front of the seat, whether or not the amount was readable.
    #[serde(default)]
    pub bet_marker: bool,
    #[serde(default)]
    pub bet: Option<f64>,
    #[serde(default)]
    pub has_cards: bool,
    /// Hole cards turned face up, e.g. `"AhKd"`.
    #[serde(default)]
    pub shown: Option<String>,
}

/// One captured frame of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub blinds: Vec<f64>,
    #[serde(default)]
    pub ante: f64,
    #[serde(default)]
    pub button: Option<usize>,
    #[serde(default)]
    pub active: Option<usize>,
    #[serde(default)]
    pub pot: Option<f64>,
    /// Visible community cards; an empty string preflop, `None` if unreadable.
    #[serde(default)]
    pub board: Option<String>,
    pub seats: Vec<SeatView>,
}

impl Snapshot {
    fn big_blind(&self) -> f64 {
        self.blinds.get(1).copied().unwrap_or(1.0)
    }

    fn scale(&self, amount: f64, in_blinds: bool) -> f64 {
        if in_blinds {
            amount / self.big_blind()
        } else {
            amount
        }
    }

    fn seat(&self, seat: usize) -> Option<&SeatView> {
        self.seats.get(seat)
    }
}

impl TableObserver for Snapshot {
    fn seat_count(&self) -> usize {
        self.seats.len()
    }

    fn round(&self) -> usize {
        let cards = self
            .board
            .as_deref()
            .map(|b| parse_board(b).map_or(b.len() / 2, |cards| cards.len()))
            .unwrap_or(0);
        round_from_board_cards(cards)
    }

    fn active_seat(&self) -> Option<usize> {
        self.active.filter(|&s| s < self.seats.len())
    }

    fn button_seat(&self) -> Option<usize> {
        self.button.filter(|&s| s < self.seats.len())
    }

    fn stack_size(&self, seat: usize, in_blinds: bool) -> Option<f64> {
        self.seat(seat)?.stack.map(|s| self.scale(s, in_blinds))
    }

    fn bet_size(&self, seat: usize, in_blinds: bool) -> Option<f64> {
        self.seat(seat)?.bet.map(|b| self.scale(b, in_blinds))
    }

    fn pot_size(&self, in_blinds: bool) -> Option<f64> {
        self.pot.map(|p| self.scale(p, in_blinds))
    }

    fn has_cards(&self, seat: usize) -> bool {
        self.seat(seat).is_some_and(|s| s.has_cards)
    }

    fn has_bet(&self, seat: usize) -> bool {
        self.seat(seat).is_some_and(|s| s.bet_marker || s.bet.is_some())
    }

    fn is_showing_hand(&self, seat: usize) -> bool {
        self.seat(seat).is_some_and(|s| s.shown.is_some())
    }

    fn is_seat_open(&self, seat: usize) -> bool {
        self.seat(seat).map_or(true, |s| s.open)
    }

    fn is_sitting_out(&self, seat: usize) -> bool {
        self.seat(seat).is_some_and(|s| s.sitting_out)
    }

    fn board(&self) -> Option<String> {
        self.board.clone()
    }

    fn hand(&self, seat: usize) -> Option<String> {
        self.seat(seat)?.shown.clone()
    }

    fn blinds(&self) -> Vec<f64> {
        self.blinds.clone()
    }

    fn ante(&self, in_blinds: bool) -> f64 {
        self.scale(self.ante, in_blinds)
    }
}
