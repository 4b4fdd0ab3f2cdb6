//! Session leaderboard
//!
//! Kept in memory only: the best runs since the program started.

use serde::Serialize;

/// Maximum number of runs kept
pub const MAX_HIGH_SCORES: usize = 10;

/// A finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighScoreEntry {
    pub score: u32,
    /// Level reached
    pub level: u32,
    /// Which run of the session (1-based)
    pub run: u32,
}

/// Runs sorted by score, best first
#[derive(Debug, Clone, Default, Serialize)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// 0-based insertion slot for `score`. Ties land below existing runs;
    /// scoreless runs never make the board.
    fn slot(&self, score: u32) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let slot = self.entries.partition_point(|e| e.score >= score);
        (slot < MAX_HIGH_SCORES).then_some(slot)
    }

    /// Record a finished run; returns its rank (1-based) if it made the board
    pub fn add_score(&mut self, score: u32, level: u32, run: u32) -> Option<usize> {
        let slot = self.slot(score)?;
        self.entries.insert(slot, HighScoreEntry { score, level, run });
        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("Run {} placed #{} with {} points", run, slot + 1, score);
        Some(slot + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.slot(0), None);
        assert_eq!(scores.add_score(0, 1, 1), None);
        assert!(scores.is_empty());
        assert_eq!(scores.top_score(), None);
    }

    #[test]
    fn test_ranks_sorted_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(100, 2, 1), Some(1));
        assert_eq!(scores.add_score(300, 4, 2), Some(1));
        assert_eq!(scores.add_score(200, 3, 3), Some(2));
        // Tie goes below the existing entry
        assert_eq!(scores.add_score(200, 3, 4), Some(3));

        let ordered: Vec<_> = scores.entries().iter().map(|e| e.run).collect();
        assert_eq!(ordered, vec![2, 3, 4, 1]);
        assert_eq!(scores.top_score(), Some(300));
    }

    #[test]
    fn test_full_board_trims() {
        let mut scores = HighScores::new();
        for run in 1..=MAX_HIGH_SCORES as u32 {
            scores.add_score(run * 10, 1, run);
        }
        assert_eq!(scores.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.slot(10), None);
        assert_eq!(scores.slot(15), Some(MAX_HIGH_SCORES - 1));

        assert_eq!(scores.add_score(1000, 9, 11), Some(1));
        assert_eq!(scores.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries().last().map(|e| e.score), Some(20));
    }
}
