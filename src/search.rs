//! Search drivers: BFS and best-first/A* over the state arena, grounded
//! on the original solver's `solve_bfs`/`solve_astar` and successor
//! generator. Both drivers share `candidate_for_direction` for expanding
//! a node and `reconstruct` for walking the parent chain back to an
//! action string.

use crate::arena::{Arena, State};
use crate::bitset;
use crate::grid::{Direction, Pos, DIRECTIONS};
use crate::heap::Heap;
use crate::heuristic::Heuristic;
use crate::index::DedupIndex;
use crate::problem::Problem;

pub struct SolverConfig {
    pub capacity: usize,
    pub max_iterations: u64,
    pub h_factor: f64,
    pub g_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    pub solved: bool,
    pub actions: Option<String>,
    pub iterations: u64,
    pub limit_exceeded: bool,
}

impl SolveResult {
    /// A problem that failed preprocessing never reaches the arena.
    pub fn immediate_failure() -> Self {
        Self {
            solved: false,
            actions: None,
            iterations: 0,
            limit_exceeded: false,
        }
    }
}

enum CandidateOutcome {
    Move { player: Pos },
    Push { player: Pos, crates_stride: usize },
}

struct Candidate {
    outcome: CandidateOutcome,
    action: char,
}

/// Expand `parent_idx` in direction `dir`. Allocates a fresh bitset
/// stride only for a push candidate that survives every deadlock check;
/// the caller is responsible for rolling that allocation back if the
/// resulting state turns out to be a duplicate.
fn candidate_for_direction(
    problem: &Problem,
    arena: &mut Arena,
    parent_idx: usize,
    dir: Direction,
) -> Option<Candidate> {
    let w = problem.grid.padded_width;
    let offset = dir.offset(w);
    let parent = arena.state(parent_idx);
    let player = parent.player;
    let parent_stride = parent.crates;
    let target = problem.grid.step(player, offset);

    if problem.walls.get(target) {
        return None;
    }

    let pushing = bitset::get_bit(arena.crates_words(parent_stride), target);
    if !pushing {
        return Some(Candidate {
            outcome: CandidateOutcome::Move { player: target },
            action: dir.move_char(),
        });
    }

    let q = problem.grid.step(target, offset);
    if problem.walls.get(q) || problem.deadlocks.get(q) {
        return None;
    }
    if bitset::get_bit(arena.crates_words(parent_stride), q) {
        return None;
    }

    let mut words: Vec<u64> = arena.crates_words(parent_stride).to_vec();
    bitset::clear_bit(&mut words, target);
    bitset::set_bit(&mut words, q);

    if single_push_2x2_guard(problem, &words, q, dir) {
        return None;
    }

    let stride = arena.alloc_bitset();
    bitset::copy_into(&words, arena.crates_words_mut(stride));

    Some(Candidate {
        outcome: CandidateOutcome::Push {
            player: target,
            crates_stride: stride,
        },
        action: dir.push_char(),
    })
}

fn orthogonal_directions(dir: Direction) -> [Direction; 2] {
    match dir {
        Direction::Left | Direction::Right => [Direction::Up, Direction::Down],
        Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
    }
}

fn is_wall_or_crate(problem: &Problem, crates_words: &[u64], p: Pos) -> bool {
    problem.walls.get(p) || bitset::get_bit(crates_words, p)
}

fn is_unsafe_crate(problem: &Problem, crates_words: &[u64], p: Pos) -> bool {
    bitset::get_bit(crates_words, p) && !problem.goals.get(p)
}

/// Localized 2x2 deadlock check around the tile a crate was just pushed
/// to. Only the two squares on the far side of the push matter: the
/// squares touching the tile the player vacated always contain a floor
/// tile (the player now stands there), so they can never be fully
/// blocked.
fn single_push_2x2_guard(problem: &Problem, crates_words: &[u64], q: Pos, dir: Direction) -> bool {
    let w = problem.grid.padded_width;
    let ahead = problem.grid.step(q, dir.offset(w));

    for perp in orthogonal_directions(dir) {
        let perp_offset = perp.offset(w);
        let neighbor = problem.grid.step(q, perp_offset);
        let diagonal = problem.grid.step(ahead, perp_offset);
        let square = [q, ahead, neighbor, diagonal];

        let all_blocked = square
            .iter()
            .all(|&p| is_wall_or_crate(problem, crates_words, p));
        if !all_blocked {
            continue;
        }
        if square.iter().any(|&p| is_unsafe_crate(problem, crates_words, p)) {
            return true;
        }
    }
    false
}

fn reconstruct(arena: &Arena, mut idx: usize) -> String {
    let mut actions = Vec::new();
    loop {
        let state = arena.state(idx);
        match state.action {
            Some(c) => actions.push(c),
            None => break,
        }
        idx = state.parent.expect("state with an action must have a parent");
    }
    actions.reverse();
    actions.into_iter().collect()
}

/// Owns the arena, dedup index and heap for one solve call. Reused
/// across levels via `reset` so a batch run never reallocates its pools.
pub struct Context {
    arena: Arena,
    index: DedupIndex,
    heap: Heap,
}

impl Context {
    pub fn new(problem: &Problem, capacity: usize) -> Self {
        let bitset_words = bitset::word_count(problem.grid.area());
        let pool = capacity + 1;
        Self {
            arena: Arena::new(pool, bitset_words),
            index: DedupIndex::with_capacity(pool),
            heap: Heap::with_capacity(pool),
        }
    }

    fn reset(&mut self) {
        self.arena.reset();
        self.index.clear();
        self.heap.clear();
    }

    fn solved(&self, problem: &Problem, stride: usize) -> bool {
        bitset::equals(self.arena.crates_words(stride), problem.goals.words())
    }

    /// Breadth-first search: the arena's own append order doubles as the
    /// FIFO queue, `front` trailing `arena.len()` by however many nodes
    /// are still waiting to be expanded.
    pub fn solve_bfs(&mut self, problem: &Problem, config: &SolverConfig) -> SolveResult {
        if !problem.potentially_solvable {
            return SolveResult::immediate_failure();
        }
        self.reset();

        let root_stride = self.arena.alloc_bitset();
        bitset::copy_into(
            problem.initial_crates.words(),
            self.arena.crates_words_mut(root_stride),
        );
        let root = self.arena.push_state(State {
            player: problem.player,
            crates: root_stride,
            parent: None,
            action: None,
            cost: 0,
            heuristic: 0,
            priority: 0.0,
            heap_index: -1,
        });
        self.index.insert(&self.arena, root);

        // No root-solved check here: `problem.potentially_solvable` is only
        // ever true when the problem is `compilable`, which already requires
        // `goals != crates`, so the root can never be the solved state.

        let mut front = 0usize;
        let mut iterations = 0u64;

        while front < self.arena.len() {
            if iterations >= config.max_iterations {
                return SolveResult {
                    solved: false,
                    actions: None,
                    iterations,
                    limit_exceeded: true,
                };
            }
            iterations += 1;
            let current = front;
            front += 1;

            for dir in DIRECTIONS {
                if self.arena.is_full() {
                    return SolveResult {
                        solved: false,
                        actions: None,
                        iterations,
                        limit_exceeded: true,
                    };
                }

                let Some(candidate) = candidate_for_direction(problem, &mut self.arena, current, dir)
                else {
                    continue;
                };

                let (player, crates_stride, is_push) = match candidate.outcome {
                    CandidateOutcome::Move { player } => {
                        (player, self.arena.state(current).crates, false)
                    }
                    CandidateOutcome::Push {
                        player,
                        crates_stride,
                    } => (player, crates_stride, true),
                };

                if self
                    .index
                    .find(&self.arena, player, self.arena.crates_words(crates_stride))
                    .is_some()
                {
                    if is_push {
                        self.arena.rollback_bitset();
                    }
                    continue;
                }

                let cost = self.arena.state(current).cost + 1;
                let child = self.arena.push_state(State {
                    player,
                    crates: crates_stride,
                    parent: Some(current),
                    action: Some(candidate.action),
                    cost,
                    heuristic: 0,
                    priority: cost as f64,
                    heap_index: -1,
                });
                self.index.insert(&self.arena, child);

                if self.solved(problem, crates_stride) {
                    return SolveResult {
                        solved: true,
                        actions: Some(reconstruct(&self.arena, child)),
                        iterations,
                        limit_exceeded: false,
                    };
                }
            }
        }

        SolveResult {
            solved: false,
            actions: None,
            iterations,
            limit_exceeded: false,
        }
    }

    /// Best-first search with priority `h_factor*heuristic + g_factor*cost`.
    /// A state still sitting in the heap (`heap_index >= 0`) is reopened
    /// and re-sifted when a cheaper path to it is found; a state already
    /// popped is never revisited, since pops only get cheaper as search
    /// with a reasonable heuristic proceeds.
    pub fn solve_astar<H: Heuristic>(&mut self, problem: &Problem, config: &SolverConfig) -> SolveResult {
        if !problem.potentially_solvable {
            return SolveResult::immediate_failure();
        }
        self.reset();

        let root_stride = self.arena.alloc_bitset();
        bitset::copy_into(
            problem.initial_crates.words(),
            self.arena.crates_words_mut(root_stride),
        );
        let root_heuristic = H::compute(problem, self.arena.crates_words(root_stride));
        let root_priority = config.h_factor * root_heuristic as f64;
        let root = self.arena.push_state(State {
            player: problem.player,
            crates: root_stride,
            parent: None,
            action: None,
            cost: 0,
            heuristic: root_heuristic,
            priority: root_priority,
            heap_index: -1,
        });
        self.index.insert(&self.arena, root);
        self.heap.push(&mut self.arena, root);

        let mut iterations = 0u64;

        while !self.heap.is_empty() {
            if iterations >= config.max_iterations {
                return SolveResult {
                    solved: false,
                    actions: None,
                    iterations,
                    limit_exceeded: true,
                };
            }
            iterations += 1;

            let current = self.heap.pop(&mut self.arena).expect("heap reported non-empty");
            let current_stride = self.arena.state(current).crates;

            if self.solved(problem, current_stride) {
                return SolveResult {
                    solved: true,
                    actions: Some(reconstruct(&self.arena, current)),
                    iterations,
                    limit_exceeded: false,
                };
            }

            for dir in DIRECTIONS {
                if self.arena.is_full() {
                    return SolveResult {
                        solved: false,
                        actions: None,
                        iterations,
                        limit_exceeded: true,
                    };
                }

                let Some(candidate) = candidate_for_direction(problem, &mut self.arena, current, dir)
                else {
                    continue;
                };

                let (player, crates_stride, is_push) = match candidate.outcome {
                    CandidateOutcome::Move { player } => (player, current_stride, false),
                    CandidateOutcome::Push {
                        player,
                        crates_stride,
                    } => (player, crates_stride, true),
                };

                let cost = self.arena.state(current).cost + 1;
                let heuristic = if is_push {
                    H::compute(problem, self.arena.crates_words(crates_stride))
                } else {
                    self.arena.state(current).heuristic
                };
                let priority = config.h_factor * heuristic as f64 + config.g_factor * cost as f64;

                if let Some(existing) =
                    self.index
                        .find(&self.arena, player, self.arena.crates_words(crates_stride))
                {
                    if is_push {
                        self.arena.rollback_bitset();
                    }
                    let existing_heap_index = self.arena.state(existing).heap_index;
                    let existing_cost = self.arena.state(existing).cost;
                    if existing_heap_index >= 0 && existing_cost > cost {
                        let existing_mut = self.arena.state_mut(existing);
                        existing_mut.cost = cost;
                        existing_mut.heuristic = heuristic;
                        existing_mut.priority = priority;
                        existing_mut.parent = Some(current);
                        existing_mut.action = Some(candidate.action);
                        self.heap.sift_up_from(&mut self.arena, existing_heap_index as usize);
                    }
                    continue;
                }

                let child = self.arena.push_state(State {
                    player,
                    crates: crates_stride,
                    parent: Some(current),
                    action: Some(candidate.action),
                    cost,
                    heuristic,
                    priority,
                    heap_index: -1,
                });
                self.index.insert(&self.arena, child);
                self.heap.push(&mut self.arena, child);
            }
        }

        SolveResult {
            solved: false,
            actions: None,
            iterations,
            limit_exceeded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::PullDistanceHeuristic;
    use crate::levels::parse_level;

    fn config(capacity: usize) -> SolverConfig {
        SolverConfig {
            capacity,
            max_iterations: 10_000,
            h_factor: 1.0,
            g_factor: 1.0,
        }
    }

    #[test]
    fn test_solve_bfs_immediate_failure_for_unsolvable_problem() {
        let problem = parse_level(".Wg.gW...WWWA.10", 4, 4).unwrap();
        assert!(!problem.potentially_solvable);

        let mut ctx = Context::new(&problem, 64);
        let result = ctx.solve_bfs(&problem, &config(64));
        assert_eq!(result, SolveResult::immediate_failure());
    }

    #[test]
    fn test_solve_bfs_finds_single_push_solution() {
        let problem = parse_level(".....A10.....", 5, 3).unwrap();
        let mut ctx = Context::new(&problem, 64);
        let result = ctx.solve_bfs(&problem, &config(64));

        assert!(result.solved);
        assert_eq!(result.actions, Some("R".to_string()));
    }

    #[test]
    fn test_solve_bfs_respects_max_iterations() {
        let problem = parse_level(".....A10.....", 5, 3).unwrap();
        let mut ctx = Context::new(&problem, 64);
        let mut cfg = config(64);
        cfg.max_iterations = 0;
        let result = ctx.solve_bfs(&problem, &cfg);

        assert!(!result.solved);
        assert!(result.limit_exceeded);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_solve_astar_respects_max_iterations() {
        let problem = parse_level(".....A10.....", 5, 3).unwrap();
        let mut ctx = Context::new(&problem, 64);
        let mut cfg = config(64);
        cfg.max_iterations = 0;
        let result = ctx.solve_astar::<PullDistanceHeuristic>(&problem, &cfg);

        assert!(!result.solved);
        assert!(result.limit_exceeded);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_astar_matches_bfs_cost_on_routed_level() {
        // crate needs two pushes right; the player starts on the wrong
        // side and has to walk around first.
        let problem = parse_level("......1.0...A..", 5, 3).unwrap();

        let mut bfs_ctx = Context::new(&problem, 4096);
        let bfs_result = bfs_ctx.solve_bfs(&problem, &config(4096));
        assert!(bfs_result.solved);

        let mut astar_ctx = Context::new(&problem, 4096);
        let astar_result = astar_ctx.solve_astar::<PullDistanceHeuristic>(&problem, &config(4096));
        assert!(astar_result.solved);

        let bfs_len = bfs_result.actions.unwrap().len();
        let astar_len = astar_result.actions.unwrap().len();
        assert_eq!(bfs_len, astar_len);
        assert_eq!(bfs_len, 5);
    }

    #[test]
    fn test_solved_state_has_no_unsafe_crates_off_goal() {
        let problem = parse_level("......1.0...A..", 5, 3).unwrap();
        let mut ctx = Context::new(&problem, 4096);
        let result = ctx.solve_bfs(&problem, &config(4096));
        assert!(result.solved);

        // replay the action string and check every crate ends on a goal
        let mut player = problem.player;
        let mut crates = problem.initial_crates.clone();
        let w = problem.grid.padded_width;
        for action in result.actions.unwrap().chars() {
            let dir = match action.to_ascii_lowercase() {
                'l' => Direction::Left,
                'r' => Direction::Right,
                'd' => Direction::Down,
                'u' => Direction::Up,
                other => panic!("unexpected action char {other}"),
            };
            let offset = dir.offset(w);
            let target = problem.grid.step(player, offset);
            if action.is_ascii_uppercase() {
                let beyond = problem.grid.step(target, offset);
                crates.clear(target);
                crates.set(beyond);
            }
            player = target;
        }
        assert!(bitset::equals(crates.words(), problem.goals.words()));
    }
}
