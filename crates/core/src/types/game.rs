//! Mini-game identifiers and their scoring policy.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One of the two pop-up mini-games.
///
/// Serializes to the wire identifiers the widget sends (`"wordGame"`,
/// `"birdGame"`).
///
/// The two games keep *opposite* best-score semantics on purpose: the word
/// game counts guesses (fewer is better) while the bird game counts points
/// (more is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameKind {
    /// Guess-the-word game; score is the number of guesses taken.
    WordGame,
    /// Flappy-bird style game; score is the number of points earned.
    BirdGame,
}

impl GameKind {
    /// Fold a new score into the historical best for this game.
    ///
    /// Minimum for the word game, maximum for the bird game.
    #[must_use]
    pub fn better_score(self, best: i64, score: i64) -> i64 {
        match self {
            Self::WordGame => best.min(score),
            Self::BirdGame => best.max(score),
        }
    }

    /// Wire identifier used by the widget (`wordGame` / `birdGame`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WordGame => "wordGame",
            Self::BirdGame => "birdGame",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
