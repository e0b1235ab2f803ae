use std::fmt;

use crate::constants::{DEFAULT_RATING, MAX_RATING_LIMIT, MIN_RATING_LIMIT};

/// One standings row as handed to the engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandingsRow {
    pub handle: String,
    /// Higher is better.
    pub points: f64,
    /// Lower is better; breaks ties on points.
    pub penalty: i64,
    /// Rating before the contest. `None` for an unrated entrant.
    #[cfg_attr(feature = "serde", serde(default, alias = "priorRating", alias = "prior_rating"))]
    pub rating: Option<i32>,
}

/// Rating level a contestant performed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Performance {
    Finite(i32),
    /// Unique winner of the field: no finite rating makes their delta non-positive.
    Infinite,
}

impl Performance {
    pub fn finite(self) -> Option<i32> {
        match self {
            Performance::Finite(v) => Some(v),
            Performance::Infinite => None,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Performance::Infinite)
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Performance::Finite(v) => write!(f, "{v}"),
            Performance::Infinite => f.write_str("infinite"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Performance {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Performance::Finite(v) => serializer.serialize_i32(*v),
            Performance::Infinite => serializer.serialize_str("infinite"),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Performance {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Finite(i32),
            Tag(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Finite(v) => Ok(Performance::Finite(v)),
            Repr::Tag(tag) if tag.eq_ignore_ascii_case("infinite") || tag == "Infinity" => {
                Ok(Performance::Infinite)
            }
            Repr::Tag(tag) => Err(serde::de::Error::custom(format!(
                "expected an integer or \"infinite\", got \"{tag}\""
            ))),
        }
    }
}

/// Rating used for probability math: the prior rating, or `DEFAULT_RATING`
/// when unrated, kept inside the histogram range.
pub fn effective_rating(rating: Option<i32>) -> i32 {
    rating
        .unwrap_or(DEFAULT_RATING)
        .clamp(MIN_RATING_LIMIT, MAX_RATING_LIMIT - 1)
}

/// Working record of the rating calculator. Lives for one prediction call.
#[derive(Debug, Clone, PartialEq)]
pub struct Contestant {
    pub handle: String,
    pub points: f64,
    pub penalty: i64,
    /// True prior rating, reported back unchanged.
    pub rating: Option<i32>,
    pub effective_rating: i32,
    /// 1-based. 0 until ranks are assigned.
    pub rank: usize,
    pub delta: i32,
    pub performance: Option<Performance>,
}

impl Contestant {
    pub fn new(handle: impl Into<String>, points: f64, penalty: i64, rating: Option<i32>) -> Self {
        Contestant {
            handle: handle.into(),
            points,
            penalty,
            rating,
            effective_rating: effective_rating(rating),
            rank: 0,
            delta: 0,
            performance: None,
        }
    }
}

impl From<StandingsRow> for Contestant {
    fn from(row: StandingsRow) -> Self {
        Contestant::new(row.handle, row.points, row.penalty, row.rating)
    }
}

/// Engine output for one contestant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictResult {
    pub handle: String,
    /// True prior rating (not the effective one).
    pub rating: Option<i32>,
    pub delta: i32,
    /// `None` when performance was not requested.
    pub performance: Option<Performance>,
}

impl PredictResult {
    pub fn effective_rating(&self) -> i32 {
        effective_rating(self.rating)
    }
}

impl From<Contestant> for PredictResult {
    fn from(c: Contestant) -> Self {
        PredictResult {
            handle: c.handle,
            rating: c.rating,
            delta: c.delta,
            performance: c.performance,
        }
    }
}
