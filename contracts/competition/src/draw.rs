//! Values derived from oracle words.

use soroban_sdk::Vec;

use crate::{CompetitionError, CENTER_MAX_SHIFT};

/// Shift a committed coordinate by `word mod (2*SHIFT+1) - SHIFT`, clamped to `[0, max]`.
pub(crate) fn shifted_coordinate(committed: u32, word: u64, max: u32) -> u32 {
    let span = u64::from(2 * CENTER_MAX_SHIFT + 1);
    let offset = (word % span) as i64 - i64::from(CENTER_MAX_SHIFT);
    (i64::from(committed) + offset).clamp(0, i64::from(max)) as u32
}

/// Pick `candidates[word mod len]`.
pub(crate) fn pick_candidate(candidates: &Vec<u32>, word: u64) -> Result<u32, CompetitionError> {
    let len = candidates.len();
    if len == 0 {
        return Err(CompetitionError::EmptyCandidates);
    }
    let slot = (word % u64::from(len)) as u32;
    candidates.get(slot).ok_or(CompetitionError::InvalidCandidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{vec, Env};

    #[test]
    fn shift_spans_both_directions() {
        assert_eq!(shifted_coordinate(2500, 0, 5000), 2450);
        assert_eq!(shifted_coordinate(2500, 50, 5000), 2500);
        assert_eq!(shifted_coordinate(2500, 100, 5000), 2550);
        assert_eq!(shifted_coordinate(2500, 101, 5000), 2450);
    }

    #[test]
    fn shift_clamps_to_grid() {
        assert_eq!(shifted_coordinate(10, 0, 5000), 0);
        assert_eq!(shifted_coordinate(4990, 100, 5000), 5000);
        assert_eq!(shifted_coordinate(5000, u64::MAX, 5000), 5000);
    }

    #[test]
    fn candidate_wraps_by_length() {
        let env = Env::default();
        let candidates = vec![&env, 4u32, 9, 17];
        assert_eq!(pick_candidate(&candidates, 0), Ok(4));
        assert_eq!(pick_candidate(&candidates, 5), Ok(17));
        assert_eq!(pick_candidate(&candidates, 7), Ok(9));
    }

    #[test]
    fn empty_candidates_rejected() {
        let env = Env::default();
        let candidates: Vec<u32> = Vec::new(&env);
        assert_eq!(
            pick_candidate(&candidates, 3),
            Err(CompetitionError::EmptyCandidates)
        );
    }
}
