//! Padded grid model shared by every other component.
//!
//! A level of `width x height` interior tiles is stored with a one-tile
//! wall border on every side, so the padded dimensions are
//! `(width+2) x (height+2)`. Every tile position is a single `usize`
//! index into a row-major array of that padded size; no neighbor lookup
//! ever needs a bounds check, only a `walls` test (see `Problem`).

pub type Pos = usize;

/// The four cardinal direction offsets, in the fixed order the search
/// drivers must use for successor generation: left, right, down, up.
/// This order, paired with the action alphabet `lrduLRDU`, is part of
/// the observable contract (it fixes BFS tie-breaking).
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Down,
    Direction::Up,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
}

impl Direction {
    /// Signed position offset for this direction, given the padded width.
    pub fn offset(self, padded_width: usize) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Down => padded_width as isize,
            Direction::Up => -(padded_width as isize),
        }
    }

    /// Lowercase action letter for a non-pushing move in this direction.
    pub fn move_char(self) -> char {
        match self {
            Direction::Left => 'l',
            Direction::Right => 'r',
            Direction::Down => 'd',
            Direction::Up => 'u',
        }
    }

    /// Uppercase action letter for a pushing move in this direction.
    pub fn push_char(self) -> char {
        self.move_char().to_ascii_uppercase()
    }
}

/// Padded grid dimensions for a declared `width x height` level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub padded_width: usize,
    pub padded_height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            padded_width: width + 2,
            padded_height: height + 2,
        }
    }

    pub fn area(&self) -> usize {
        self.padded_width * self.padded_height
    }

    /// Position of interior tile `(col, row)`, zero-indexed, shifted by
    /// the one-tile border.
    pub fn pos(&self, col: usize, row: usize) -> Pos {
        (row + 1) * self.padded_width + (col + 1)
    }

    /// Apply a signed offset to a position. Offsets never leave the
    /// padded array because the border is always a wall, but the
    /// arithmetic itself is unchecked here — callers test `walls` first.
    pub fn step(&self, p: Pos, offset: isize) -> Pos {
        (p as isize + offset) as usize
    }

    /// True for any position on the outer wall border (row 0, last row,
    /// col 0, last col of the padded grid).
    pub fn is_border(&self, p: Pos) -> bool {
        let row = p / self.padded_width;
        let col = p % self.padded_width;
        row == 0 || row == self.padded_height - 1 || col == 0 || col == self.padded_width - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_dimensions() {
        let g = Grid::new(4, 3);
        assert_eq!(g.padded_width, 6);
        assert_eq!(g.padded_height, 5);
        assert_eq!(g.area(), 30);
    }

    #[test]
    fn test_pos_and_step() {
        let g = Grid::new(4, 4);
        let p = g.pos(0, 0);
        assert_eq!(p, g.padded_width + 1);

        let right = g.step(p, Direction::Right.offset(g.padded_width));
        assert_eq!(right, g.pos(1, 0));

        let down = g.step(p, Direction::Down.offset(g.padded_width));
        assert_eq!(down, g.pos(0, 1));
    }

    #[test]
    fn test_border_detection() {
        let g = Grid::new(3, 3);
        assert!(g.is_border(0));
        assert!(g.is_border(g.padded_width - 1));
        assert!(!g.is_border(g.pos(0, 0)));
        assert!(!g.is_border(g.pos(2, 2)));
    }

    #[test]
    fn test_direction_chars() {
        assert_eq!(Direction::Left.move_char(), 'l');
        assert_eq!(Direction::Left.push_char(), 'L');
        assert_eq!(Direction::Up.move_char(), 'u');
        assert_eq!(Direction::Up.push_char(), 'U');
    }

    #[test]
    fn test_direction_order_is_fixed() {
        let chars: Vec<char> = DIRECTIONS.iter().map(|d| d.move_char()).collect();
        assert_eq!(chars, vec!['l', 'r', 'd', 'u']);
    }
}
