//! Level parsing: the textual-description collaborator from SPEC_FULL.md
//! section 6/10.1. Produces a `Problem`, never panics on malformed input.

use crate::bitset::Bitset;
use crate::grid::{Grid, Pos};
use crate::problem::Problem;
use std::fmt;
use std::fs;
use std::io;

#[derive(Debug)]
pub enum ParseError {
    Io(io::Error),
    InvalidLevel(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(err) => write!(f, "IO error: {}", err),
            ParseError::InvalidLevel(msg) => write!(f, "Invalid level: {}", msg),
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        ParseError::Io(err)
    }
}

impl From<String> for ParseError {
    fn from(err: String) -> Self {
        ParseError::InvalidLevel(err)
    }
}

/// Parse a level in the primary tile alphabet from SPEC_FULL.md section 6:
/// row-major, `width * height` tiles, no row separators. Unrecognized
/// characters are silently skipped; the parser advances until it finds a
/// valid tile character for the current position.
pub fn parse_level(text: &str, width: usize, height: usize) -> Result<Problem, ParseError> {
    let grid = Grid::new(width, height);
    let area = grid.area();

    // Every tile, including the border, starts as a wall; a tile is only
    // known to be open once the scan actually visits it. A `\0` stops the
    // scan early, so whatever interior tiles remain unvisited default to
    // walls rather than floor, matching the original parser's pre-fill.
    let mut walls = Bitset::new(area);
    for p in 0..area {
        walls.set(p);
    }
    let mut goals = Bitset::new(area);
    let mut crates = Bitset::new(area);
    let mut player: Option<Pos> = None;

    let mut chars = text.chars();
    'scan: for row in 0..height {
        for col in 0..width {
            let pos = grid.pos(col, row);
            let tile_char = loop {
                match chars.next() {
                    None => {
                        return Err(ParseError::InvalidLevel(
                            "level text ended before width*height tiles were read".to_string(),
                        ));
                    }
                    Some('\0') => break 'scan,
                    Some(c) if is_primary_tile_char(c) => break c,
                    Some(_) => continue,
                }
            };
            apply_primary_tile(tile_char, pos, &mut walls, &mut goals, &mut crates, &mut player)?;
        }
    }

    let player =
        player.ok_or_else(|| ParseError::InvalidLevel("level has no player tile".to_string()))?;

    Ok(Problem::build(grid, player, walls, goals, crates))
}

fn is_primary_tile_char(c: char) -> bool {
    matches!(c, '.' | 'W' | 'w' | 'A' | 'a' | '0' | '1' | 'g' | 'G' | '+')
}

fn apply_primary_tile(
    c: char,
    pos: Pos,
    walls: &mut Bitset,
    goals: &mut Bitset,
    crates: &mut Bitset,
    player: &mut Option<Pos>,
) -> Result<(), ParseError> {
    match c {
        '.' => walls.clear(pos),
        'W' | 'w' => walls.set(pos),
        'A' | 'a' => {
            walls.clear(pos);
            set_player(pos, player)?;
        }
        '0' => {
            walls.clear(pos);
            goals.set(pos);
        }
        '1' => {
            walls.clear(pos);
            crates.set(pos);
        }
        'g' | 'G' => {
            walls.clear(pos);
            goals.set(pos);
            crates.set(pos);
        }
        '+' => {
            walls.clear(pos);
            goals.set(pos);
            set_player(pos, player)?;
        }
        other => {
            return Err(ParseError::InvalidLevel(format!(
                "unreachable tile character '{}'",
                other
            )));
        }
    }
    Ok(())
}

fn set_player(pos: Pos, player: &mut Option<Pos>) -> Result<(), ParseError> {
    if player.is_some() {
        return Err(ParseError::InvalidLevel(
            "level has more than one player".to_string(),
        ));
    }
    *player = Some(pos);
    Ok(())
}

/// Parse a level in the XSB alphabet bundled with level-pack fixture
/// files: `#` wall, ` ` floor, `.` goal, `$` crate, `*` crate on goal,
/// `@` player, `+` player on goal. Row length varies per line; height is
/// the line count and width is the longest line, matching how ragged
/// (non-rectangular) XSB levels are usually written.
pub fn parse_xsb_level(text: &str) -> Result<Problem, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let height = lines.len();
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0);
    if height == 0 || width == 0 {
        return Err(ParseError::InvalidLevel("empty level text".to_string()));
    }

    let grid = Grid::new(width, height);
    let area = grid.area();
    let mut walls = Bitset::new(area);
    let mut goals = Bitset::new(area);
    let mut crates = Bitset::new(area);
    let mut player: Option<Pos> = None;

    for p in 0..area {
        if grid.is_border(p) {
            walls.set(p);
        }
    }

    for (row, line) in lines.iter().enumerate() {
        let chars: Vec<char> = line.chars().collect();
        for col in 0..width {
            let c = chars.get(col).copied().unwrap_or(' ');
            let pos = grid.pos(col, row);
            match c {
                ' ' => {}
                '#' => walls.set(pos),
                '.' => goals.set(pos),
                '$' => crates.set(pos),
                '*' => {
                    goals.set(pos);
                    crates.set(pos);
                }
                '@' => set_player(pos, &mut player)?,
                '+' => {
                    goals.set(pos);
                    set_player(pos, &mut player)?;
                }
                other => {
                    return Err(ParseError::InvalidLevel(format!(
                        "unrecognized XSB tile character '{}'",
                        other
                    )));
                }
            }
        }
    }

    let player =
        player.ok_or_else(|| ParseError::InvalidLevel("level has no player tile".to_string()))?;

    Ok(Problem::build(grid, player, walls, goals, crates))
}

impl fmt::Display for Problem {
    /// Renders the problem's interior (the declared `width x height` area,
    /// not the synthetic wall-border ring added by preprocessing) back to
    /// the XSB alphabet, trimming trailing floor tiles per row the same
    /// way ragged input levels were written.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.grid.height {
            let mut line = String::with_capacity(self.grid.width);
            for col in 0..self.grid.width {
                let p = self.grid.pos(col, row);
                let c = if self.walls.get(p) {
                    '#'
                } else if p == self.player {
                    if self.goals.get(p) { '+' } else { '@' }
                } else if self.initial_crates.get(p) {
                    if self.goals.get(p) { '*' } else { '$' }
                } else if self.goals.get(p) {
                    '.'
                } else {
                    ' '
                };
                line.push(c);
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// A collection of Sokoban levels loaded from one XSB-formatted file,
/// separated by blank lines or `;`-prefixed comment lines.
#[derive(Debug)]
pub struct Levels {
    problems: Vec<Problem>,
}

impl Levels {
    pub fn from_text(contents: &str) -> Result<Self, ParseError> {
        let mut problems = Vec::new();
        let mut current = String::new();

        for line in contents.lines() {
            if line.trim_start().starts_with(';') {
                flush_level(&mut current, &mut problems)?;
                continue;
            }
            if line.is_empty() {
                flush_level(&mut current, &mut problems)?;
                continue;
            }
            current.push_str(line);
            current.push('\n');
        }
        flush_level(&mut current, &mut problems)?;

        Ok(Levels { problems })
    }

    pub fn from_file(path: &str) -> Result<Self, ParseError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    pub fn get(&self, index: usize) -> Option<&Problem> {
        self.problems.get(index)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

fn flush_level(current: &mut String, problems: &mut Vec<Problem>) -> Result<(), ParseError> {
    if !current.is_empty() {
        let level_str = current.trim_end();
        if !level_str.is_empty() {
            problems.push(parse_xsb_level(level_str)?);
        }
        current.clear();
    }
    Ok(())
}
