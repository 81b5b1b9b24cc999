//! The heuristic model: additive pull-distance sum over the crate
//! bitset, grounded on the original solver's `compute_heuristic`. Unlike
//! the teacher's box-to-goal matching heuristics (simple/greedy/
//! Hungarian), this is the single additive model the spec calls for,
//! but it is still expressed behind a small trait so the search drivers
//! stay generic over which heuristic is plugged in.

use crate::bitset::SetBits;
use crate::problem::Problem;

pub trait Heuristic {
    /// Sum of `problem.heuristics[pos]` over the set bits of a crate
    /// bitset. A non-pushing child should reuse its parent's cached
    /// value instead of calling this again; only pushing transitions
    /// need a fresh computation.
    fn compute(problem: &Problem, crates_words: &[u64]) -> u32;
}

/// The pull-distance heuristic described in SPEC_FULL.md 4.6/9.
pub struct PullDistanceHeuristic;

impl Heuristic for PullDistanceHeuristic {
    fn compute(problem: &Problem, crates_words: &[u64]) -> u32 {
        SetBits::new(crates_words)
            .map(|pos| problem.heuristics[pos])
            .fold(0u32, |acc, h| acc.saturating_add(h))
    }
}

/// Always zero; turns best-first search into uniform-cost search when
/// paired with `h_factor = 0`, useful for isolating bugs in the
/// priority/decrease-key machinery from bugs in the heuristic itself.
pub struct NullHeuristic;

impl Heuristic for NullHeuristic {
    fn compute(_problem: &Problem, _crates_words: &[u64]) -> u32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::parse_level;

    #[test]
    fn test_null_heuristic_is_always_zero() {
        let problem = parse_level("..0...+..11....", 4, 4).unwrap();
        assert_eq!(
            NullHeuristic::compute(&problem, problem.initial_crates.words()),
            0
        );
    }

    #[test]
    fn test_pull_distance_heuristic_sums_per_crate_distance() {
        let problem = parse_level("..0...+..11....", 4, 4).unwrap();
        let expected: u32 = problem
            .initial_crates
            .iter_set_bits()
            .map(|pos| problem.heuristics[pos])
            .sum();
        assert_eq!(
            PullDistanceHeuristic::compute(&problem, problem.initial_crates.words()),
            expected
        );
        assert!(expected > 0);
    }

    #[test]
    fn test_pull_distance_heuristic_is_zero_on_goal_bitset() {
        let problem = parse_level("..0...+..11....", 4, 4).unwrap();
        assert_eq!(
            PullDistanceHeuristic::compute(&problem, problem.goals.words()),
            0
        );
    }
}
