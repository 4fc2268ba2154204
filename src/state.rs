//! Betting state machine for a single hand of no-limit hold'em.
//!
//! All amounts are in big blinds. Players are indexed by button-relative
//! position (see [`crate::position`]); physical seats never appear here.

use std::fmt;

use log::debug;

use crate::error::{TrackerError, TrackerResult};

pub const SMALL_BLIND: f64 = 0.5;
pub const BIG_BLIND: f64 = 1.0;
pub const STRADDLE: f64 = 2.0;

/// Round index once the river has been closed.
pub const SHOWDOWN: usize = 4;

/// Float slack for chip bookkeeping inside the model (not observation noise).
const CHIP_TOLERANCE: f64 = 1e-9;

const ROUND_NAMES: [&str; 5] = ["Preflop", "Flop", "Turn", "River", "Showdown"];

pub fn round_name(round: usize) -> &'static str {
    ROUND_NAMES[round.min(SHOWDOWN)]
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A betting action. `Bet` carries the chips added, not the total raised to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Bet(f64),
    Call,
    Check,
    Fold,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Bet(_) => "Bet",
            Action::Call => "Call",
            Action::Check => "Check",
            Action::Fold => "Fold",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Bet(amount) => write!(f, "Bet {:.2} bb", amount),
            other => write!(f, "{}", other.name()),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub chips: f64,
    pub betsize: f64,
    pub folded: bool,
}

impl Player {
    fn new(chips: f64) -> Player {
        Player {
            chips,
            betsize: 0.0,
            folded: false,
        }
    }

    fn invest(&mut self, amount: f64) {
        self.chips -= amount;
        self.betsize += amount;
        if self.chips < CHIP_TOLERANCE {
            self.chips = 0.0;
        }
    }

    fn post_ante(&mut self, amount: f64) {
        self.chips -= amount;
    }

    fn next_round(&mut self) {
        self.betsize = 0.0;
    }

    pub fn is_all_in(&self) -> bool {
        self.chips <= CHIP_TOLERANCE
    }

    /// Still holds cards and has chips to act with.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.is_all_in()
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GameState {
    players: Vec<Player>,
    ante: f64,
    straddle: bool,
    pot: f64,
    max_bet: f64,
    bet_level: u32,
    round: usize,
    active: usize,
    winner: Option<usize>,
}

impl GameState {
    /// Starts a hand from pre-deal stacks in position order, posting antes,
    /// blinds and the optional straddle.
    pub fn new(stacks: &[f64], ante: f64, straddle: bool) -> TrackerResult<GameState> {
        let n = stacks.len();
        if n < 2 {
            return Err(TrackerError::TooFewPlayers(n));
        }
        let mut state = GameState {
            players: stacks.iter().map(|&c| Player::new(c)).collect(),
            ante,
            straddle,
            pot: 0.0,
            max_bet: BIG_BLIND,
            bet_level: 1,
            round: 0,
            active: 0,
            winner: None,
        };
        for pos in 0..n {
            let player = &mut state.players[pos];
            let ante_paid = ante.min(player.chips);
            player.post_ante(ante_paid);
            let blind = GameState::blind_size(n, pos, straddle).min(player.chips);
            player.invest(blind);
            state.pot += blind + ante_paid;
            state.max_bet = state.max_bet.max(blind);
        }
        state.active = match (n, straddle) {
            (2, _) => 1,
            (_, false) => 2,
            (3, true) => 0,
            (_, true) => 3,
        };
        if !state.players[state.active].can_act() {
            state.next_player();
        }
        Ok(state)
    }

    /// Forced bet posted by `pos` in an `n`-handed hand. Heads-up the
    /// button (position 1) posts the small blind.
    pub fn blind_size(n: usize, pos: usize, straddle: bool) -> f64 {
        if n == 2 {
            return if pos == 0 { BIG_BLIND } else { SMALL_BLIND };
        }
        match pos {
            0 => SMALL_BLIND,
            1 => BIG_BLIND,
            2 if straddle => STRADDLE,
            _ => 0.0,
        }
    }

    // -- Accessors --

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, pos: usize) -> &Player {
        &self.players[pos]
    }

    pub fn n_players(&self) -> usize {
        self.players.len()
    }

    pub fn ante(&self) -> f64 {
        self.ante
    }

    pub fn straddle(&self) -> bool {
        self.straddle
    }

    pub fn pot(&self) -> f64 {
        self.pot
    }

    pub fn max_bet(&self) -> f64 {
        self.max_bet
    }

    pub fn bet_level(&self) -> u32 {
        self.bet_level
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.round >= SHOWDOWN
    }

    /// Position expected to act next, `None` once the hand is decided.
    pub fn active(&self) -> Option<usize> {
        if self.is_terminal() {
            None
        } else {
            Some(self.active)
        }
    }

    /// Chips the active player still needs to put in to match the maximum bet.
    pub fn to_call(&self) -> f64 {
        let p = &self.players[self.active];
        (self.max_bet - p.betsize).max(0.0).min(p.chips)
    }

    // -- Action primitives --

    pub fn apply(&mut self, action: Action) -> TrackerResult<()> {
        match action {
            Action::Bet(amount) => self.bet(amount),
            Action::Call => self.call(),
            Action::Check => self.check(),
            Action::Fold => self.fold(),
        }
    }

    pub fn bet(&mut self, amount: f64) -> TrackerResult<()> {
        self.ensure_can_act()?;
        let pos = self.active;
        let player = &self.players[pos];
        if amount > player.chips + CHIP_TOLERANCE {
            return Err(TrackerError::NotEnoughChips {
                position: pos,
                amount,
                chips: player.chips,
            });
        }
        let total = player.betsize + amount;
        if total <= self.max_bet + CHIP_TOLERANCE {
            return Err(TrackerError::BetTooSmall {
                total,
                max_bet: self.max_bet,
            });
        }
        debug!(
            "{} {} {:.2} bb",
            self.prefix(pos, amount),
            if self.bet_level == 0 { "Bet" } else { "Raise to" },
            total
        );
        let amount = amount.min(player.chips);
        let player = &mut self.players[pos];
        player.invest(amount);
        self.pot += amount;
        self.max_bet = player.betsize;
        self.bet_level += 1;
        self.next_player();
        Ok(())
    }

    /// Matches the maximum bet, or puts in whatever is left when short.
    pub fn call(&mut self) -> TrackerResult<()> {
        self.ensure_can_act()?;
        let pos = self.active;
        if self.max_bet <= self.players[pos].betsize + CHIP_TOLERANCE {
            return Err(TrackerError::NothingToCall(pos));
        }
        let amount = self.to_call();
        debug!("{} Call {:.2} bb", self.prefix(pos, amount), amount);
        let full = self.max_bet - self.players[pos].betsize <= amount + CHIP_TOLERANCE;
        let player = &mut self.players[pos];
        player.invest(amount);
        if full {
            player.betsize = self.max_bet;
        }
        self.pot += amount;
        self.next_player();
        Ok(())
    }

    pub fn check(&mut self) -> TrackerResult<()> {
        self.ensure_can_act()?;
        let pos = self.active;
        if self.players[pos].betsize + CHIP_TOLERANCE < self.max_bet {
            return Err(TrackerError::UnmatchedBet(pos));
        }
        debug!("{} Check", self.prefix(pos, 0.0));
        // Everyone else has called, folded or gone all-in behind the option.
        if self.holds_option(pos) {
            self.next_round();
        } else {
            self.next_player();
        }
        Ok(())
    }

    /// Folding is only modeled when facing a bet.
    pub fn fold(&mut self) -> TrackerResult<()> {
        self.ensure_can_act()?;
        let pos = self.active;
        if self.max_bet <= self.players[pos].betsize + CHIP_TOLERANCE {
            return Err(TrackerError::NothingToCall(pos));
        }
        debug!("{} Fold", self.prefix(pos, 0.0));
        self.players[pos].folded = true;
        self.winner = self.find_winner();
        match self.winner {
            None => self.next_player(),
            Some(w) => debug!("Only player {} is remaining.", w),
        }
        Ok(())
    }

    // -- Internals --

    fn ensure_can_act(&self) -> TrackerResult<()> {
        if self.is_terminal() || self.find_winner().is_some() {
            return Err(TrackerError::HandOver);
        }
        if self.players[self.active].folded {
            return Err(TrackerError::PlayerFolded(self.active));
        }
        Ok(())
    }

    fn next_player(&mut self) {
        if !self.players.iter().any(Player::can_act) {
            debug!("No player can act, betting is closed.");
            self.close_betting();
            return;
        }
        let n = self.players.len();
        let mut once = false;
        while !once || !self.players[self.active].can_act() {
            once = true;
            self.active = (self.active + 1) % n;
            if self.is_round_complete() {
                self.next_round();
                return;
            }
        }
    }

    fn close_betting(&mut self) {
        for p in &mut self.players {
            p.next_round();
        }
        self.round = SHOWDOWN;
        self.active = 0;
        self.max_bet = 0.0;
        self.bet_level = 0;
    }

    fn next_round(&mut self) {
        self.round += 1;
        for p in &mut self.players {
            p.next_round();
        }
        self.active = 0;
        self.max_bet = 0.0;
        self.bet_level = 0;
        if self.round < SHOWDOWN && !self.players[self.active].can_act() {
            self.next_player();
        }
    }

    /// The big blind (or straddler) keeps the option to raise when preflop
    /// action limps around to them.
    fn is_round_complete(&self) -> bool {
        let p = &self.players[self.active];
        (p.betsize - self.max_bet).abs() <= CHIP_TOLERANCE
            && (self.max_bet > CHIP_TOLERANCE || self.active == 0)
            && !self.holds_option(self.active)
    }

    fn holds_option(&self, pos: usize) -> bool {
        self.round == 0
            && pos == self.big_blind_idx()
            && self.max_bet <= self.big_blind_size() + CHIP_TOLERANCE
    }

    fn find_winner(&self) -> Option<usize> {
        let mut live = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.folded)
            .map(|(i, _)| i);
        match (live.next(), live.next()) {
            (Some(w), None) => Some(w),
            _ => None,
        }
    }

    fn big_blind_size(&self) -> f64 {
        if self.straddle {
            STRADDLE
        } else {
            BIG_BLIND
        }
    }

    fn big_blind_idx(&self) -> usize {
        if self.players.len() == 2 {
            0
        } else if self.straddle {
            2
        } else {
            1
        }
    }

    fn prefix(&self, pos: usize, amount: f64) -> String {
        format!("Player {} ({:>6.2} bb):", pos, self.players[pos].chips - amount)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ante={:.2} bb, Straddle={}", self.ante, self.straddle)?;
        writeln!(f, "{} (Pot: {:.2} bb)", round_name(self.round), self.pot)?;
        for (i, p) in self.players.iter().enumerate() {
            let status = if p.folded {
                "Folded"
            } else if self.active() == Some(i) {
                "Active"
            } else {
                "Not folded"
            };
            writeln!(f, "{:<17} {}", self.prefix(i, 0.0), status)?;
        }
        Ok(())
    }
}
