//! Scoring and ranking of guesses.
//!
//! A guess scores the mean absolute tilt of its two axes, so a perfectly
//! level device scores 0 and lower is better.

use crate::model::{Guess, Orientation};
use serde::Serialize;
use uuid::Uuid;

/// Number of entries a scoreboard shows before eliding the rest.
pub const DEFAULT_SCOREBOARD_SIZE: usize = 10;

/// `(|x| + |y|) / 2`
pub fn score(guess: &Guess) -> f64 {
    score_orientation(&guess.orientation())
}

pub fn score_orientation(orientation: &Orientation) -> f64 {
    (orientation.x.abs() + orientation.y.abs()) / 2.0
}

/// A guess with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGuess {
    /// 1-based place in the ranking.
    pub position: usize,
    pub score: f64,
    pub guess: Guess,
}

/// Rank guesses best first.
///
/// The sort is stable, so equal scores keep their chronological order.
///
/// ```rust
/// use tilt_guesser::model::{Guess, Orientation};
/// use tilt_guesser::scoring::rank;
///
/// let guesses: Vec<Guess> = [(0.0, 0.0), (4.0, 0.0), (1.0, 1.0)]
///     .into_iter()
///     .map(|(x, y)| Guess::capture(Orientation::new(x, y)))
///     .collect();
///
/// let scores: Vec<f64> = rank(&guesses).iter().map(|r| r.score).collect();
/// assert_eq!(scores, vec![0.0, 1.0, 2.0]);
/// ```
pub fn rank(guesses: &[Guess]) -> Vec<RankedGuess> {
    let mut scored: Vec<(f64, &Guess)> = guesses.iter().map(|g| (score(g), g)).collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (score, guess))| RankedGuess {
            position: idx + 1,
            score,
            guess: guess.clone(),
        })
        .collect()
}

/// One visible scoreboard line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreboardEntry {
    pub ranked: RankedGuess,
    pub is_latest: bool,
}

/// The ranking as shown after a guess: the top entries, with the latest
/// guess pulled out separately when it did not make the cut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scoreboard {
    pub entries: Vec<ScoreboardEntry>,
    /// Set only when the latest guess ranks below the visible entries.
    pub latest_outside: Option<RankedGuess>,
}

impl Scoreboard {
    /// Build a scoreboard for the most recent guess in `guesses`.
    pub fn new(guesses: &[Guess], size: usize) -> Self {
        let latest = guesses.last().map(|g| g.id);
        Self::for_guess(guesses, latest, size)
    }

    /// Build a scoreboard highlighting the guess with id `highlight`.
    pub fn for_guess(guesses: &[Guess], highlight: Option<Uuid>, size: usize) -> Self {
        let ranked = rank(guesses);

        let latest_outside = ranked
            .iter()
            .skip(size)
            .find(|r| Some(r.guess.id) == highlight)
            .cloned();

        let entries = ranked
            .into_iter()
            .take(size)
            .map(|ranked| ScoreboardEntry {
                is_latest: Some(ranked.guess.id) == highlight,
                ranked,
            })
            .collect();

        Self {
            entries,
            latest_outside,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
