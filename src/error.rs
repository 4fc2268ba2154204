use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid board notation: {0}")]
    InvalidBoardNotation(String),

    #[error("Cannot deal {requested} cards, only {available} remaining")]
    NotEnoughDeck { requested: usize, available: usize },

    #[error("At least 2 players required, got {0}")]
    TooFewPlayers(usize),

    #[error("Button seat {0} is not an occupied seat")]
    InvalidButton(usize),

    #[error("Hand is over, no further actions allowed")]
    HandOver,

    #[error("Position {0} already folded")]
    PlayerFolded(usize),

    #[error("Bet to {total:.2} bb does not exceed the maximum bet of {max_bet:.2} bb")]
    BetTooSmall { total: f64, max_bet: f64 },

    #[error("Position {0} has nothing to call")]
    NothingToCall(usize),

    #[error("Position {0} cannot check facing an unmatched bet")]
    UnmatchedBet(usize),

    #[error("Position {position} cannot invest {amount:.2} bb with {chips:.2} bb behind")]
    NotEnoughChips { position: usize, amount: f64, chips: f64 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
