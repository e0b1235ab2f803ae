/// Per-handle view of prediction results, shaped for display.
///
/// A predicted response tells each entrant how far they are from the next
/// band; a final response tells them which band they land in.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{CarrotError, Result};
use crate::rank::Rank;
use crate::types::{Performance, PredictResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PredictionMode {
    /// Deltas predicted from live standings and current ratings.
    Predicted,
    /// Deltas published by the contest system.
    Final,
}

impl PredictionMode {
    pub const ALL: [PredictionMode; 2] = [PredictionMode::Predicted, PredictionMode::Final];

    pub fn tag(self) -> &'static str {
        match self {
            PredictionMode::Predicted => "PREDICTED",
            PredictionMode::Final => "FINAL",
        }
    }
}

impl FromStr for PredictionMode {
    type Err = CarrotError;

    fn from_str(s: &str) -> Result<Self> {
        PredictionMode::ALL
            .into_iter()
            .find(|m| m.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| CarrotError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for PredictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PerformanceCell {
    pub value: Performance,
    pub band: &'static Rank,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RowDetail {
    Predicted {
        /// Points needed to leave the current band. `None` in the top band.
        delta_req_for_rank_up: Option<i32>,
        next_rank: Option<&'static Rank>,
    },
    Final {
        new_rank: &'static Rank,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResponseRow {
    pub delta: i32,
    /// Band of the true prior rating (`Unrated` if there is none).
    pub rank: &'static Rank,
    pub performance: Option<PerformanceCell>,
    pub detail: RowDetail,
}

impl ResponseRow {
    fn build(result: &PredictResult, mode: PredictionMode) -> Self {
        let effective = result.effective_rating();
        let detail = match mode {
            PredictionMode::Predicted => {
                let effective_rank = Rank::for_rating(Some(effective));
                RowDetail::Predicted {
                    delta_req_for_rank_up: effective_rank.high.map(|high| high - effective),
                    next_rank: effective_rank.next(),
                }
            }
            PredictionMode::Final => RowDetail::Final {
                new_rank: Rank::for_rating(Some(effective + result.delta)),
            },
        };

        ResponseRow {
            delta: result.delta,
            rank: Rank::for_rating(result.rating),
            performance: result.performance.map(|value| PerformanceCell {
                value,
                band: Rank::for_performance(value),
            }),
            detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PredictResponse {
    pub mode: PredictionMode,
    pub rows: HashMap<String, ResponseRow>,
    /// Unix milliseconds at which the underlying data was fetched.
    pub fetch_time: i64,
}

impl PredictResponse {
    pub fn new(results: &[PredictResult], mode: PredictionMode, fetch_time: i64) -> Self {
        let rows = results
            .iter()
            .map(|r| (r.handle.clone(), ResponseRow::build(r, mode)))
            .collect();
        PredictResponse { mode, rows, fetch_time }
    }

    /// Same as [`PredictResponse::new`] for a mode given as a tag, e.g. from a
    /// config file or command line.
    pub fn from_tag(results: &[PredictResult], tag: &str, fetch_time: i64) -> Result<Self> {
        let mode = tag.parse()?;
        Ok(PredictResponse::new(results, mode, fetch_time))
    }

    pub fn get(&self, handle: &str) -> Option<&ResponseRow> {
        self.rows.get(handle)
    }
}
