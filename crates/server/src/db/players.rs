//! Player statistics repository.
//!
//! One row per player email, with three counters per game. Play counts and
//! totals only ever increase; the `best` column is an extremum whose
//! direction depends on the game (see [`GameKind::better_score`]).

use serde::Serialize;
use sqlx::PgPool;

use popgames_core::{Email, GameKind};

use super::RepositoryError;

/// All six aggregate counters for a player.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub word_games_played: i64,
    pub word_games_total: i64,
    pub word_game_best: i64,
    pub bird_games_played: i64,
    pub bird_games_total: i64,
    pub bird_game_best: i64,
}

/// The three counters for a single game, as returned by a recorded play.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct GameStats {
    pub played: i64,
    pub total: i64,
    pub best: i64,
}

/// Repository for player statistics rows.
pub struct PlayerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlayerRepository<'a> {
    /// Create a new player repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a player's statistics by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, email: &Email) -> Result<Option<PlayerStats>, RepositoryError> {
        let row = sqlx::query_as::<_, PlayerStats>(
            "SELECT word_games_played, word_games_total, word_game_best, \
                    bird_games_played, bird_games_total, bird_game_best \
             FROM player_stats WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Record one play of a game and return the updated counters.
    ///
    /// A single `INSERT .. ON CONFLICT DO UPDATE` so concurrent plays by the
    /// same player cannot lose an update. A game's first play initialises its
    /// `best` column even when the row already exists for the other game
    /// (the stored default is not a real score until `played > 0`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record_play(
        &self,
        email: &Email,
        game: GameKind,
        score: i64,
    ) -> Result<GameStats, RepositoryError> {
        let sql = match game {
            GameKind::WordGame => {
                // Lower is better for the word game
                "INSERT INTO player_stats \
                     (email, word_games_played, word_games_total, word_game_best) \
                 VALUES ($1, 1, $2, $2) \
                 ON CONFLICT (email) DO UPDATE SET \
                     word_games_played = player_stats.word_games_played + 1, \
                     word_games_total = player_stats.word_games_total + EXCLUDED.word_games_total, \
                     word_game_best = CASE \
                         WHEN player_stats.word_games_played = 0 THEN EXCLUDED.word_game_best \
                         ELSE LEAST(player_stats.word_game_best, EXCLUDED.word_game_best) \
                     END, \
                     updated_at = NOW() \
                 RETURNING word_games_played AS played, \
                           word_games_total AS total, \
                           word_game_best AS best"
            }
            GameKind::BirdGame => {
                // Higher is better for the bird game
                "INSERT INTO player_stats \
                     (email, bird_games_played, bird_games_total, bird_game_best) \
                 VALUES ($1, 1, $2, $2) \
                 ON CONFLICT (email) DO UPDATE SET \
                     bird_games_played = player_stats.bird_games_played + 1, \
                     bird_games_total = player_stats.bird_games_total + EXCLUDED.bird_games_total, \
                     bird_game_best = CASE \
                         WHEN player_stats.bird_games_played = 0 THEN EXCLUDED.bird_game_best \
                         ELSE GREATEST(player_stats.bird_game_best, EXCLUDED.bird_game_best) \
                     END, \
                     updated_at = NOW() \
                 RETURNING bird_games_played AS played, \
                           bird_games_total AS total, \
                           bird_game_best AS best"
            }
        };

        let stats = sqlx::query_as::<_, GameStats>(sql)
            .bind(email)
            .bind(score)
            .fetch_one(self.pool)
            .await?;

        Ok(stats)
    }
}
