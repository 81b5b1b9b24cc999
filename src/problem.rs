//! `Problem` type and the one-time preprocessing passes that decide
//! whether a level is worth searching at all: structural compilability,
//! the global 2x2 corner-deadlock scan, the deadlock/heuristic map, and
//! the player-reachability test.

use crate::bitset::{self, Bitset};
use crate::grid::{Direction, Grid, Pos, DIRECTIONS};
use std::collections::VecDeque;

/// Sentinel push-distance recorded for tiles the deadlock-map BFS never
/// reaches. Always at least `grid.area()`, as the spec requires.
pub const UNREACHABLE: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct Problem {
    pub grid: Grid,
    pub goal_count: usize,
    pub player: Pos,
    pub walls: Bitset,
    pub goals: Bitset,
    pub initial_crates: Bitset,
    pub deadlocks: Bitset,
    pub heuristics: Vec<u32>,
    pub compilable: bool,
    pub potentially_solvable: bool,
}

impl Problem {
    /// Build a `Problem` from a parsed level and run every preprocessing
    /// pass described in SPEC_FULL.md 4.3. `walls`/`goals`/`crates` are
    /// already padded to `grid`'s dimensions by the caller (the parser).
    pub fn build(grid: Grid, player: Pos, walls: Bitset, goals: Bitset, crates: Bitset) -> Self {
        let goal_count = goals.popcount() as usize;
        let crate_count = crates.popcount() as usize;
        let already_solved = bitset::equals(goals.words(), crates.words());

        let compilable = goal_count > 0 && goal_count == crate_count && !already_solved;

        let area = grid.area();
        let mut problem = Problem {
            grid,
            goal_count,
            player,
            walls,
            goals,
            initial_crates: crates,
            deadlocks: Bitset::new(area),
            heuristics: vec![UNREACHABLE; area],
            compilable,
            potentially_solvable: false,
        };

        if compilable {
            problem.potentially_solvable = problem.run_solvability_checks();
        }

        problem
    }

    fn run_solvability_checks(&mut self) -> bool {
        if global_2x2_deadlock(self) {
            return false;
        }
        generate_deadlock_map(self);
        if self.initial_crates.covers_any(&self.deadlocks) {
            return false;
        }
        reachable(self)
    }

    fn is_wall_or_crate(&self, crates: &Bitset, p: Pos) -> bool {
        self.walls.get(p) || crates.get(p)
    }
}

/// Slide a 2x2 window across every interior position. A window whose
/// four tiles are all wall-or-crate, with at least one non-goal crate
/// among them, is a terminal deadlock.
fn global_2x2_deadlock(problem: &Problem) -> bool {
    let w = problem.grid.padded_width;
    let h = problem.grid.padded_height;
    if w < 2 || h < 2 {
        return false;
    }
    for row in 0..h - 1 {
        for col in 0..w - 1 {
            let corners = [
                row * w + col,
                row * w + col + 1,
                (row + 1) * w + col,
                (row + 1) * w + col + 1,
            ];
            let all_blocked = corners
                .iter()
                .all(|&p| problem.is_wall_or_crate(&problem.initial_crates, p));
            if !all_blocked {
                continue;
            }
            let has_unsafe_crate = corners
                .iter()
                .any(|&p| problem.initial_crates.get(p) && !problem.goals.get(p));
            if has_unsafe_crate {
                return true;
            }
        }
    }
    false
}

/// Multi-source BFS from every goal over *reverse pushes*: moving from
/// tile `t` to neighbor `t+d` is admissible only if `t + 2d` is not a
/// wall, since pushing a crate from `t+d` to `t` in forward play needs
/// the player standing at `t+2d`. Paints `deadlocks[t] = 0` and records
/// `heuristics[t]` for every tile visited; everything else keeps the
/// `UNREACHABLE` sentinel and stays marked as a deadlock tile.
fn generate_deadlock_map(problem: &mut Problem) {
    let w = problem.grid.padded_width;
    problem.deadlocks = Bitset::new(problem.grid.area());
    for p in 0..problem.grid.area() {
        if !problem.walls.get(p) {
            problem.deadlocks.set(p);
        }
    }

    let mut queue: VecDeque<Pos> = VecDeque::new();
    for p in problem.goals.iter_set_bits() {
        problem.heuristics[p] = 0;
        problem.deadlocks.clear(p);
        queue.push_back(p);
    }

    while let Some(t) = queue.pop_front() {
        let dist = problem.heuristics[t];
        for dir in DIRECTIONS {
            let offset = dir.offset(w);
            let next = problem.grid.step(t, offset);
            if problem.walls.get(next) {
                continue;
            }
            let behind = problem.grid.step(t, 2 * offset);
            if problem.walls.get(behind) {
                continue;
            }
            if problem.heuristics[next] != UNREACHABLE {
                continue;
            }
            problem.heuristics[next] = dist + 1;
            problem.deadlocks.clear(next);
            queue.push_back(next);
        }
    }
}

/// Flood-fill from the player across non-wall tiles and require that
/// every tile holding exactly one of {crate, goal} is reachable.
fn reachable(problem: &Problem) -> bool {
    let w = problem.grid.padded_width;
    let mut reach = Bitset::new(problem.grid.area());
    let mut queue: VecDeque<Pos> = VecDeque::new();
    reach.set(problem.player);
    queue.push_back(problem.player);

    while let Some(p) = queue.pop_front() {
        for dir in DIRECTIONS {
            let next = problem.grid.step(p, dir.offset(w));
            if problem.walls.get(next) || reach.get(next) {
                continue;
            }
            reach.set(next);
            queue.push_back(next);
        }
    }

    let free = problem.initial_crates.xor(&problem.goals);
    free.covers_all(&reach)
}
