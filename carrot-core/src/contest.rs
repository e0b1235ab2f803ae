/// Contest records as served by the remote API, and the rules that decide
/// whether a contest is rated.
///
/// Fetching is the caller's job; everything here works on records that are
/// already in memory.
use std::collections::HashMap;

use crate::constants::{
    FAKE_RATINGS_SINCE_CONTEST, NEW_DEFAULT_RATING, RATING_PENDING_MAX_DAYS, UNRATED_HINTS,
};
use crate::types::Performance;

const SECONDS_PER_DAY: i64 = 60 * 60 * 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ContestPhase {
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
    #[cfg_attr(feature = "serde", serde(other))]
    Other,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Contest {
    pub id: i64,
    pub name: String,
    pub phase: ContestPhase,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_time_seconds: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Party {
    pub members: Vec<Member>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub team_id: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub team_name: Option<String>,
}

impl Party {
    /// Handle of the first member; the one rated for individual contests.
    pub fn handle(&self) -> Option<&str> {
        self.members.first().map(|m| m.handle.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RanklistRow {
    pub party: Party,
    pub points: f64,
    pub penalty: i64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standings {
    pub contest: Contest,
    pub rows: Vec<RanklistRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RatingChange {
    pub handle: String,
    pub old_rating: i32,
    pub new_rating: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatedUser {
    pub handle: String,
    pub rating: i32,
}

/// Case-insensitive check of the contest name against known unrated formats.
pub fn is_unrated_by_name(contest_name: &str) -> bool {
    let lower = contest_name.to_lowercase();
    UNRATED_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Team contests are never rated per handle.
pub fn any_row_has_team(rows: &[RanklistRow]) -> bool {
    rows.iter()
        .any(|row| row.party.team_id.is_some() || row.party.team_name.is_some())
}

/// Ratings before the contest, keyed by handle.
///
/// From `FAKE_RATINGS_SINCE_CONTEST` on, first-time entrants are reported with
/// an old rating of 0 although they were treated as `NEW_DEFAULT_RATING`.
pub fn adjust_old_ratings(contest_id: i64, changes: &[RatingChange]) -> HashMap<String, i32> {
    changes
        .iter()
        .map(|change| {
            let old = if contest_id >= FAKE_RATINGS_SINCE_CONTEST && change.old_rating == 0 {
                NEW_DEFAULT_RATING
            } else {
                change.old_rating
            };
            (change.handle.clone(), old)
        })
        .collect()
}

/// True once the contest ended more than `RATING_PENDING_MAX_DAYS` ago.
pub fn is_old_contest(contest: &Contest, now_seconds: i64) -> bool {
    let end = contest.start_time_seconds.unwrap_or(0) + contest.duration_seconds.unwrap_or(0);
    (now_seconds - end) as f64 / SECONDS_PER_DAY as f64 > RATING_PENDING_MAX_DAYS as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum IsRated {
    Yes,
    No,
    /// Not settled yet: no rating changes, but they may still come.
    Likely,
}

/// What the caller got back when asking for the contest's rating changes.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingChangesLookup {
    /// Not asked (contest not finished) or the request failed.
    NotFetched,
    Fetched(Vec<RatingChange>),
    /// The remote said rating changes will never exist for this contest.
    Unavailable,
}

/// Everything known about one contest at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct ContestSnapshot {
    pub contest: Contest,
    pub rows: Vec<RanklistRow>,
    pub rating_changes: Option<Vec<RatingChange>>,
    /// Adjusted pre-contest ratings, present with `rating_changes`.
    pub old_ratings: Option<HashMap<String, i32>>,
    /// Filled on first use by the final-delta pipeline.
    pub performances: Option<HashMap<String, Performance>>,
    /// Unix milliseconds.
    pub fetch_time: i64,
    pub is_rated: IsRated,
}

impl ContestSnapshot {
    pub fn new(standings: Standings, lookup: RatingChangesLookup, fetch_time: i64) -> Self {
        let Standings { contest, rows } = standings;

        let mut is_rated = IsRated::Likely;
        let mut rating_changes = None;
        let mut old_ratings = None;
        match lookup {
            RatingChangesLookup::Fetched(changes) if !changes.is_empty() => {
                is_rated = IsRated::Yes;
                old_ratings = Some(adjust_old_ratings(contest.id, &changes));
                rating_changes = Some(changes);
            }
            RatingChangesLookup::Unavailable => is_rated = IsRated::No,
            RatingChangesLookup::Fetched(_) | RatingChangesLookup::NotFetched => {}
        }

        if is_rated == IsRated::Likely && is_old_contest(&contest, fetch_time / 1000) {
            is_rated = IsRated::No;
        }

        ContestSnapshot {
            contest,
            rows,
            rating_changes,
            old_ratings,
            performances: None,
            fetch_time,
            is_rated,
        }
    }

    /// Rated or unrated for good; nothing left to wait for.
    pub fn is_settled(&self) -> bool {
        self.is_rated != IsRated::Likely
    }
}
