pub mod cards;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod observer;
pub mod position;
pub mod reconcile;
pub mod registry;
pub mod replay;
pub mod simulate;
pub mod state;
