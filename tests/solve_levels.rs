//! End-to-end check: parse a small bundled level set, run both drivers
//! over it, and replay each returned action string to confirm every
//! crate really does end up on a goal.

use sokosolver::{Context, Direction, Levels, NullHeuristic, PullDistanceHeuristic, SolverConfig};

const FIXTURE: &str = "\
; single push
#####
#@$.#
#####

; walk-around push
#######
#.....#
#.$.0.#
#..@..#
#.....#
#######
";

fn config() -> SolverConfig {
    SolverConfig {
        capacity: 8192,
        max_iterations: 200_000,
        h_factor: 1.0,
        g_factor: 1.0,
    }
}

fn direction_for_char(c: char) -> Direction {
    match c.to_ascii_lowercase() {
        'l' => Direction::Left,
        'r' => Direction::Right,
        'd' => Direction::Down,
        'u' => Direction::Up,
        other => panic!("unexpected action character '{other}'"),
    }
}

fn assert_actions_solve(problem: &sokosolver::Problem, actions: &str) {
    let mut player = problem.player;
    let mut crates = problem.initial_crates.clone();
    let w = problem.grid.padded_width;

    for action in actions.chars() {
        let dir = direction_for_char(action);
        let offset = dir.offset(w);
        let target = problem.grid.step(player, offset);
        assert!(!problem.walls.get(target), "walked into a wall");
        if action.is_ascii_uppercase() {
            let beyond = problem.grid.step(target, offset);
            assert!(crates.get(target), "pushed a tile with no crate on it");
            assert!(!problem.walls.get(beyond) && !crates.get(beyond), "pushed into an occupied tile");
            crates.clear(target);
            crates.set(beyond);
        } else {
            assert!(!crates.get(target), "walked into a crate");
        }
        player = target;
    }

    assert!(
        sokosolver::bitset::equals(crates.words(), problem.goals.words()),
        "replayed actions do not leave every crate on a goal"
    );
}

#[test]
fn bfs_solves_every_bundled_level() {
    let levels = Levels::from_text(FIXTURE).unwrap();
    assert_eq!(levels.len(), 2);

    for i in 0..levels.len() {
        let problem = levels.get(i).unwrap();
        let mut ctx = Context::new(problem, config().capacity);
        let result = ctx.solve_bfs(problem, &config());
        assert!(result.solved, "level {i} failed to solve under BFS");
        assert_actions_solve(problem, result.actions.as_ref().unwrap());
    }
}

#[test]
fn astar_solves_every_bundled_level_with_the_same_cost_as_bfs() {
    let levels = Levels::from_text(FIXTURE).unwrap();

    for i in 0..levels.len() {
        let problem = levels.get(i).unwrap();

        let mut bfs_ctx = Context::new(problem, config().capacity);
        let bfs_result = bfs_ctx.solve_bfs(problem, &config());

        let mut astar_ctx = Context::new(problem, config().capacity);
        let astar_result = astar_ctx.solve_astar::<PullDistanceHeuristic>(problem, &config());

        assert!(astar_result.solved, "level {i} failed to solve under A*");
        assert_actions_solve(problem, astar_result.actions.as_ref().unwrap());
        assert_eq!(
            bfs_result.actions.unwrap().len(),
            astar_result.actions.unwrap().len(),
            "level {i}: A* found a different-cost solution than BFS"
        );
    }
}

#[test]
fn astar_with_null_heuristic_degenerates_to_uniform_cost_search() {
    let levels = Levels::from_text(FIXTURE).unwrap();
    let problem = levels.get(0).unwrap();

    let mut ctx = Context::new(problem, config().capacity);
    let result = ctx.solve_astar::<NullHeuristic>(problem, &config());

    assert!(result.solved);
    assert_actions_solve(problem, result.actions.as_ref().unwrap());
}
