use clap::{Parser, ValueEnum};
use sokosolver::{Context, Direction, PullDistanceHeuristic, Problem, SolverConfig};
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DriverType {
    Bfs,
    Astar,
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

fn print_solution(problem: &Problem, actions: &str) {
    println!("\nStarting position:\n{}", problem);
    let mut scratch = problem.clone();
    let w = problem.grid.padded_width;
    let total = actions.chars().count();

    for (i, action) in actions.chars().enumerate() {
        let dir = direction_for_char(action);
        let offset = dir.offset(w);
        let target = problem.grid.step(scratch.player, offset);
        if action.is_ascii_uppercase() {
            let beyond = problem.grid.step(target, offset);
            scratch.initial_crates.clear(target);
            scratch.initial_crates.set(beyond);
        }
        scratch.player = target;
        println!("Move '{}' ({}/{}):\n{}", action, i + 1, total, scratch);
    }
}

struct LevelStats {
    solved: bool,
    steps: usize,
    iterations: u64,
    elapsed_ms: u128,
}

fn solve_level(
    problem: &Problem,
    level_num: usize,
    driver: DriverType,
    config: &SolverConfig,
    print_solution_flag: bool,
) -> LevelStats {
    let mut ctx = Context::new(problem, config.capacity);
    let start = Instant::now();
    let result = match driver {
        DriverType::Bfs => ctx.solve_bfs(problem, config),
        DriverType::Astar => ctx.solve_astar::<PullDistanceHeuristic>(problem, config),
    };
    let elapsed_ms = start.elapsed().as_millis();

    let solved_char = if result.solved {
        'Y'
    } else if result.limit_exceeded {
        'N'
    } else {
        'X'
    };
    let steps = result.actions.as_ref().map(|a| a.len()).unwrap_or(0);

    println!(
        "level: {:<3}  solved: {}  steps: {:<5}  iterations: {:<12}  elapsed: {} ms",
        level_num, solved_char, steps, result.iterations, elapsed_ms
    );

    if print_solution_flag {
        if let Some(actions) = &result.actions {
            print_solution(problem, actions);
        }
    }

    LevelStats {
        solved: result.solved,
        steps,
        iterations: result.iterations,
        elapsed_ms,
    }
}

#[derive(Parser)]
#[command(name = "sokosolver")]
#[command(about = "A Sokoban solver", long_about = None)]
struct Args {
    /// Path to the levels file (XSB format)
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number to solve (1-indexed), or start of range
    #[arg(value_name = "LEVEL")]
    level_start: usize,

    /// Optional end of level range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Print the solution step-by-step
    #[arg(short, long)]
    print_solution: bool,

    /// Search driver
    #[arg(short = 'd', long, value_enum, default_value = "astar")]
    driver: DriverType,

    /// Arena capacity (number of states that may be expanded)
    #[arg(short = 'c', long, default_value = "200000")]
    capacity: usize,

    /// Maximum number of iterations before giving up
    #[arg(short = 'n', long, default_value = "5000000")]
    max_iterations: u64,

    /// Weight applied to the heuristic term in the A* priority
    #[arg(long, default_value = "1.0")]
    h_factor: f64,

    /// Weight applied to the path-cost term in the A* priority
    #[arg(long, default_value = "1.0")]
    g_factor: f64,
}

fn main() {
    let args = Args::parse();

    let levels = match sokosolver::Levels::from_file(&args.levels_file) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    let level_end = args.level_end.unwrap_or(args.level_start);
    let num_levels = level_end - args.level_start + 1;

    if args.level_start == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    if level_end < args.level_start {
        eprintln!("Error: level end must be >= level start");
        std::process::exit(1);
    }

    if level_end > levels.len() {
        eprintln!(
            "Error: level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
        std::process::exit(1);
    }

    if args.print_solution && num_levels > 1 {
        eprintln!("Error: solution printing only supported when solving a single level");
        std::process::exit(1);
    }

    let config = SolverConfig {
        capacity: args.capacity,
        max_iterations: args.max_iterations,
        h_factor: args.h_factor,
        g_factor: args.g_factor,
    };

    let mut total_solved = 0;
    let mut total_steps = 0;
    let mut total_iterations = 0u64;
    let mut total_time_ms = 0u128;

    for level_num in args.level_start..=level_end {
        let problem = levels.get(level_num - 1).unwrap();
        let stats = solve_level(problem, level_num, args.driver, &config, args.print_solution);

        if stats.solved {
            total_solved += 1;
        }
        total_steps += stats.steps;
        total_iterations += stats.iterations;
        total_time_ms += stats.elapsed_ms;
    }

    if num_levels > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        steps: {:<5}  iterations: {:<12}  elapsed: {} ms",
            total_solved, num_levels, total_steps, total_iterations, total_time_ms
        );
    }
}
