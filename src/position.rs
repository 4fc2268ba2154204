//! Translation between physical table seats and button-relative positions.
//!
//! Position 0 is the first seat clockwise of the button (the small blind at
//! three or more players). Seat indices never leave this module's outputs
//! except through [`PositionMap`].

use crate::error::{TrackerError, TrackerResult};

/// Button-relative position of a physical seat on a table of `n` seats.
pub fn to_pos(seat: usize, btn: usize, n: usize) -> usize {
    (seat + n - (btn + 1) % n) % n
}

/// Physical seat holding button-relative position `pos` on a table of `n` seats.
pub fn to_seat(pos: usize, btn: usize, n: usize) -> usize {
    (pos + btn + 1) % n
}

/// Occupied seats ordered from the one after the button, wrapping around the
/// table. The result is the position order a [`crate::state::GameState`] uses.
pub fn build_seat_map(valid_seats: &[bool], button_seat: usize) -> TrackerResult<Vec<usize>> {
    let n = valid_seats.len();
    if button_seat >= n || !valid_seats[button_seat] {
        return Err(TrackerError::InvalidButton(button_seat));
    }
    Ok((0..n)
        .map(|pos| to_seat(pos, button_seat, n))
        .filter(|&seat| valid_seats[seat])
        .collect())
}

/// Conventional name of a position in an `n`-handed hand.
pub fn position_name(pos: usize, n: usize) -> String {
    if n == 2 {
        return if pos == 0 { "BB" } else { "BTN" }.to_string();
    }
    let from_button = n - 1 - pos;
    match (pos, from_button) {
        (0, _) => "SB".to_string(),
        (1, _) => "BB".to_string(),
        (_, 0) => "BTN".to_string(),
        (2, _) => "UTG".to_string(),
        (_, 1) => "CO".to_string(),
        (_, 2) => "HJ".to_string(),
        (_, 3) => "MP".to_string(),
        _ => format!("UTG{}", pos - 2),
    }
}

/// Seat order of one hand, fixed when the hand starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMap {
    button: usize,
    seats: Vec<usize>,
}

impl PositionMap {
    pub fn build(valid_seats: &[bool], button_seat: usize) -> TrackerResult<PositionMap> {
        let seats = build_seat_map(valid_seats, button_seat)?;
        Ok(PositionMap {
            button: button_seat,
            seats,
        })
    }

    pub fn seat(&self, pos: usize) -> usize {
        self.seats[pos]
    }

    pub fn position(&self, seat: usize) -> Option<usize> {
        self.seats.iter().position(|&s| s == seat)
    }

    pub fn button(&self) -> usize {
        self.button
    }

    pub fn seats(&self) -> &[usize] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pos_first_seat_after_button() {
        assert_eq!(to_pos(4, 3, 6), 0);
        assert_eq!(to_pos(3, 3, 6), 5);
        assert_eq!(to_pos(0, 5, 6), 0);
    }

    #[test]
    fn test_to_pos_button_out_of_range_wraps() {
        assert_eq!(to_pos(0, 7, 6), to_pos(0, 1, 6));
        assert_eq!(to_pos(0, 12, 6), 5);
    }

    #[test]
    fn test_to_seat_wraps() {
        assert_eq!(to_seat(0, 5, 6), 0);
        assert_eq!(to_seat(2, 4, 6), 1);
    }

    #[test]
    fn test_seat_map_skips_open_seats() {
        let valid = [true, false, true, true, false, true];
        let map = build_seat_map(&valid, 2).unwrap();
        assert_eq!(map, vec![3, 5, 0, 2]);
    }

    #[test]
    fn test_seat_map_rejects_empty_button() {
        let valid = [true, false, true];
        assert!(build_seat_map(&valid, 1).is_err());
        assert!(build_seat_map(&valid, 7).is_err());
    }

    #[test]
    fn test_position_names_9max() {
        let names: Vec<String> = (0..9).map(|p| position_name(p, 9)).collect();
        assert_eq!(
            names,
            vec!["SB", "BB", "UTG", "UTG1", "UTG2", "MP", "HJ", "CO", "BTN"]
        );
    }

    #[test]
    fn test_position_names_short_handed() {
        let names: Vec<String> = (0..6).map(|p| position_name(p, 6)).collect();
        assert_eq!(names, vec!["SB", "BB", "UTG", "HJ", "CO", "BTN"]);
        assert_eq!(position_name(0, 2), "BB");
        assert_eq!(position_name(1, 2), "BTN");
        assert_eq!(position_name(2, 3), "BTN");
    }
}
