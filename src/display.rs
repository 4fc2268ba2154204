use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use itertools::Itertools;

use crate::cards::{parse_board, Card, Suit};
use crate::position::{position_name, PositionMap};
use crate::reconcile::TrackerEvent;
use crate::simulate::HandOutcome;
use crate::state::{round_name, Action, GameState};

pub fn board_display(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| {
            let text = format!("{}{}", card.rank.to_char(), card.suit.symbol());
            match card.suit {
                Suit::Spades => text.white().to_string(),
                Suit::Hearts => text.red().to_string(),
                Suit::Diamonds => text.blue().to_string(),
                Suit::Clubs => text.green().to_string(),
            }
        })
        .join(" ")
}

/// Colors a card string as read from the table, falling back to the raw
/// text when it does not parse.
pub fn colorize_cards(text: &str) -> String {
    match parse_board(text) {
        Ok(cards) if !cards.is_empty() => board_display(&cards),
        Ok(_) => "-".dimmed().to_string(),
        Err(_) => text.to_string(),
    }
}

pub fn styled_action(action: &Action) -> String {
    let text = action.to_string();
    match action {
        Action::Bet(_) => text.red().bold().to_string(),
        Action::Call => text.green().bold().to_string(),
        Action::Check => text.yellow().bold().to_string(),
        Action::Fold => text.dimmed().bold().to_string(),
    }
}

pub fn format_event(table: &str, event: &TrackerEvent) -> String {
    let tag = format!("[{}]", table).dimmed();
    match event {
        TrackerEvent::NewHand {
            button,
            seats,
            stacks,
            ante,
            straddle,
        } => {
            let players = seats
                .iter()
                .zip(stacks)
                .enumerate()
                .map(|(pos, (seat, stack))| {
                    format!("{} seat {} ({:.2} bb)", position_name(pos, seats.len()), seat, stack)
                })
                .join(", ");
            format!(
                "{} {} button seat {}, ante {:.2} bb{}: {}",
                tag,
                "New hand:".yellow().bold(),
                button,
                ante,
                if *straddle { ", straddled" } else { "" },
                players
            )
        }
        TrackerEvent::Street { round, board, pot } => {
            let pot = pot.map_or("?".to_string(), |p| format!("{:.2}", p));
            format!(
                "{} {} {}",
                tag,
                format!("{} (Pot: {} bb):", round_name(*round), pot).yellow(),
                colorize_cards(board)
            )
        }
        TrackerEvent::Action {
            position,
            seat,
            action,
            pot,
        } => format!(
            "{}   Player {} (seat {}): {}  {}",
            tag,
            position,
            seat,
            styled_action(action),
            format!("pot {:.2} bb", pot).dimmed()
        ),
        TrackerEvent::HandComplete { winner, pot } => match winner {
            Some(w) => format!(
                "{} {}",
                tag,
                format!("Only player {} is remaining (Pot: {:.2} bb).", w, pot).green()
            ),
            None => format!("{} {}", tag, format!("Showdown reached (Pot: {:.2} bb).", pot).green()),
        },
        TrackerEvent::Showdown(showdown) => {
            let hands = showdown
                .hands
                .iter()
                .map(|(seat, hand)| format!("seat {} {}", seat, colorize_cards(hand)))
                .join(", ");
            format!(
                "{} {} {} {} {}",
                tag,
                "Showdown".cyan().bold(),
                format!("(Pot: {:.2} bb)", showdown.pot).cyan(),
                colorize_cards(&showdown.board),
                hands
            )
        }
        TrackerEvent::Abandoned { round } => format!(
            "{} {}",
            tag,
            format!("Hand abandoned on the {}.", round_name(*round).to_lowercase()).red()
        ),
    }
}

pub fn state_table(state: &GameState, seats: &PositionMap) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Pos"),
        Cell::new("Seat").set_alignment(CellAlignment::Right),
        Cell::new("Stack").set_alignment(CellAlignment::Right),
        Cell::new("Bet").set_alignment(CellAlignment::Right),
        Cell::new("Status"),
    ]);
    let n = state.n_players();
    for (pos, p) in state.players().iter().enumerate() {
        let status = if p.folded {
            "folded".dimmed().to_string()
        } else if state.active() == Some(pos) {
            "to act".green().bold().to_string()
        } else if p.is_all_in() {
            "all-in".red().to_string()
        } else {
            String::new()
        };
        table.add_row(vec![
            Cell::new(position_name(pos, n).bold().to_string()),
            Cell::new(seats.seat(pos)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", p.chips)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", p.betsize)).set_alignment(CellAlignment::Right),
            Cell::new(status),
        ]);
    }
    format!(
        "  {} (Pot: {:.2} bb)\n{}",
        round_name(state.round()).bold(),
        state.pot(),
        table
    )
}

pub fn seat_map_table(seats: &PositionMap) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Position").set_alignment(CellAlignment::Right),
        Cell::new("Name"),
        Cell::new("Seat").set_alignment(CellAlignment::Right),
    ]);
    for (pos, &seat) in seats.seats().iter().enumerate() {
        table.add_row(vec![
            Cell::new(pos).set_alignment(CellAlignment::Right),
            Cell::new(position_name(pos, seats.len()).bold().to_string()),
            Cell::new(seat).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

pub fn simulation_table(outcomes: &[HandOutcome]) -> String {
    let hands = outcomes.len();
    let exact = outcomes.iter().filter(|o| o.is_exact()).count();
    let completed = outcomes.iter().filter(|o| o.tracked.is_some()).count();
    let actions: usize = outcomes.iter().map(|o| o.actions).sum();
    let polls: usize = outcomes.iter().map(|o| o.polls).sum();
    let pct = |k: usize| {
        if hands == 0 {
            0.0
        } else {
            k as f64 * 100.0 / hands as f64
        }
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Metric").set_alignment(CellAlignment::Left),
        Cell::new("Value").set_alignment(CellAlignment::Right),
    ]);
    let exact_str = format!("{} ({:.1}%)", exact, pct(exact));
    let exact_cell = if exact == hands {
        exact_str.green().to_string()
    } else {
        exact_str.yellow().to_string()
    };
    table.add_row(vec![Cell::new("Hands".bold().to_string()), Cell::new(hands)]);
    table.add_row(vec![Cell::new("Actions".bold().to_string()), Cell::new(actions)]);
    table.add_row(vec![Cell::new("Polls".bold().to_string()), Cell::new(polls)]);
    table.add_row(vec![
        Cell::new("Completed".bold().to_string()),
        Cell::new(format!("{} ({:.1}%)", completed, pct(completed))),
    ]);
    table.add_row(vec![Cell::new("Exact".bold().to_string()), Cell::new(exact_cell)]);
    table.to_string()
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", content);
}
