use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-point score counting hundredths of a point.
///
/// Scores drive ranking priority; only strictly positive scores are ranked.
/// The integer representation keeps the total order exact (no float
/// comparison anywhere in the ordering path) while still round-tripping
/// the two-fractional-digit values the API accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i64);

impl Score {
    pub const ZERO: Score = Score(0);

    /// Score from hundredths of a point.
    pub fn from_centis(centis: i64) -> Self {
        Score(centis)
    }

    /// Score from whole points.
    pub fn from_points(points: i64) -> Self {
        Score(points.saturating_mul(100))
    }

    pub fn centis(self) -> i64 {
        self.0
    }

    /// Whether this score qualifies for a leaderboard position.
    pub fn is_ranked(self) -> bool {
        self.0 > 0
    }

    /// Delta application. Saturates at the representation limits so score
    /// arithmetic stays total.
    pub fn saturating_add(self, delta: Score) -> Score {
        Score(self.0.saturating_add(delta.0))
    }

    fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let (int, frac) = (abs / 100, abs % 100);
        if frac == 0 {
            write!(f, "{sign}{int}")
        } else if frac % 10 == 0 {
            write!(f, "{sign}{int}.{}", frac / 10)
        } else {
            write!(f, "{sign}{int}.{frac:02}")
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseScoreError {
    #[error("empty score literal")]
    Empty,

    #[error("invalid score literal: {0}")]
    Invalid(String),

    #[error("score literal out of range: {0}")]
    OutOfRange(String),
}

impl FromStr for Score {
    type Err = ParseScoreError;

    /// Parses decimal text such as `"124"`, `"-3.5"` or `"0.25"`.
    /// At most two fractional digits are representable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(ParseScoreError::Empty);
        }

        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (digits, None),
        };

        if int_part.is_empty() && frac_part.map_or(true, str::is_empty) {
            return Err(ParseScoreError::Invalid(s.to_string()));
        }

        let mut centis: i64 = 0;
        if !int_part.is_empty() {
            if !int_part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseScoreError::Invalid(s.to_string()));
            }
            let int: i64 = int_part
                .parse()
                .map_err(|_| ParseScoreError::OutOfRange(s.to_string()))?;
            centis = int
                .checked_mul(100)
                .ok_or_else(|| ParseScoreError::OutOfRange(s.to_string()))?;
        }

        if let Some(frac) = frac_part {
            if frac.is_empty() || frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseScoreError::Invalid(s.to_string()));
            }
            let mut cents: i64 = frac
                .parse()
                .map_err(|_| ParseScoreError::Invalid(s.to_string()))?;
            if frac.len() == 1 {
                cents *= 10;
            }
            centis = centis
                .checked_add(cents)
                .ok_or_else(|| ParseScoreError::OutOfRange(s.to_string()))?;
        }

        if negative {
            centis = -centis;
        }
        Ok(Score(centis))
    }
}

impl Serialize for Score {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Exact for two fractional digits at any realistic score magnitude.
        serializer.serialize_f64(self.to_f64())
    }
}

struct ScoreVisitor;

impl Visitor<'_> for ScoreVisitor {
    type Value = Score;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or decimal string score")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Score, E> {
        v.checked_mul(100)
            .map(Score)
            .ok_or_else(|| E::custom("score out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Score, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Score)
            .ok_or_else(|| E::custom("score out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Score, E> {
        let centis = (v * 100.0).round();
        if !centis.is_finite() || centis < i64::MIN as f64 || centis > i64::MAX as f64 {
            return Err(E::custom("score out of range"));
        }
        Ok(Score(centis as i64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Score, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Path and query parameters arrive as strings, JSON bodies as numbers.
        deserializer.deserialize_any(ScoreVisitor)
    }
}

/// A ranked participant: identity plus current score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankedEntry {
    pub id: i64,
    pub score: Score,
}

impl RankedEntry {
    pub fn new(id: i64, score: Score) -> Self {
        RankedEntry { id, score }
    }
}

/// Leaderboard total order: score descending, id ascending on ties.
/// `a < b` reads as "a ranks before b".
impl Ord for RankedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Query-result projection, produced fresh per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub customer_id: i64,
    pub score: Score,
    pub rank: u64,
}
