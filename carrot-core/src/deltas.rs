/// Contest-level delta pipeline: decides between predicted and final deltas
/// and builds the matching response.
use std::collections::HashMap;

use crate::constants::EDU_ROUND_RATED_THRESHOLD;
use crate::contest::{any_row_has_team, is_unrated_by_name, ContestSnapshot, IsRated, RanklistRow};
use crate::error::Result;
use crate::predict::predict;
use crate::response::{PredictResponse, PredictionMode};
use crate::types::{Contestant, PredictResult};

/// User toggles. Everything is on by default.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Preferences {
    pub enable_predict_deltas: bool,
    pub enable_final_deltas: bool,
    pub show_col_current_performance: bool,
    pub show_col_predicted_delta: bool,
    pub show_col_rank_up_delta: bool,
    pub show_col_final_performance: bool,
    pub show_col_final_delta: bool,
    pub show_col_rank_change: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            enable_predict_deltas: true,
            enable_final_deltas: true,
            show_col_current_performance: true,
            show_col_predicted_delta: true,
            show_col_rank_up_delta: true,
            show_col_final_performance: true,
            show_col_final_delta: true,
            show_col_rank_change: true,
        }
    }
}

/// Which response a contest calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaPlan {
    Disabled,
    UnratedContest,
    /// Published deltas, see [`final_response`].
    Final,
    /// Needs current ratings, see [`predicted_response`].
    Predicted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeltasOutcome {
    Disabled,
    UnratedContest,
    Ok(PredictResponse),
}

/// Decide what to show for a contest.
///
/// `cached_name` is the contest name from an earlier contest listing, if any;
/// it lets unrated contests be skipped before anything else is looked at.
pub fn plan_deltas(snapshot: &ContestSnapshot, prefs: &Preferences, cached_name: Option<&str>) -> DeltaPlan {
    if !prefs.enable_predict_deltas && !prefs.enable_final_deltas {
        return DeltaPlan::Disabled;
    }
    if cached_name.is_some_and(is_unrated_by_name) {
        return DeltaPlan::UnratedContest;
    }

    match snapshot.is_rated {
        IsRated::No => return DeltaPlan::UnratedContest,
        IsRated::Yes if !prefs.enable_final_deltas => return DeltaPlan::Disabled,
        IsRated::Yes => return DeltaPlan::Final,
        IsRated::Likely => {}
    }

    if is_unrated_by_name(&snapshot.contest.name) || any_row_has_team(&snapshot.rows) {
        return DeltaPlan::UnratedContest;
    }
    if !prefs.enable_predict_deltas {
        return DeltaPlan::Disabled;
    }
    DeltaPlan::Predicted
}

/// Run [`plan_deltas`] and build the response. `current_ratings` is only
/// consulted for a predicted response.
pub fn calc_deltas(
    snapshot: &mut ContestSnapshot,
    prefs: &Preferences,
    cached_name: Option<&str>,
    current_ratings: &HashMap<String, i32>,
) -> Result<DeltasOutcome> {
    let outcome = match plan_deltas(snapshot, prefs, cached_name) {
        DeltaPlan::Disabled => DeltasOutcome::Disabled,
        DeltaPlan::UnratedContest => DeltasOutcome::UnratedContest,
        DeltaPlan::Final => DeltasOutcome::Ok(final_response(snapshot)?),
        DeltaPlan::Predicted => DeltasOutcome::Ok(predicted_response(snapshot, current_ratings)?),
    };
    Ok(outcome)
}

/// Predict over standings rows, looking ratings up by handle. Rows without a
/// member are skipped.
pub fn predict_for_rows(rows: &[RanklistRow], rating_before: &HashMap<String, i32>) -> Result<Vec<PredictResult>> {
    let contestants = rows
        .iter()
        .filter_map(|row| {
            let handle = row.party.handle()?;
            Some(Contestant::new(handle, row.points, row.penalty, rating_before.get(handle).copied()))
        })
        .collect();
    predict(contestants, true)
}

/// Deltas as published, with performances recomputed from the pre-contest
/// ratings of everyone who was actually rated. Performances are cached on the
/// snapshot.
pub fn final_response(snapshot: &mut ContestSnapshot) -> Result<PredictResponse> {
    let changes = snapshot.rating_changes.clone().unwrap_or_default();

    if snapshot.performances.is_none() {
        let old_ratings = snapshot.old_ratings.clone().unwrap_or_default();
        let rating_before: HashMap<String, i32> = changes
            .iter()
            .filter_map(|c| old_ratings.get(&c.handle).map(|&r| (c.handle.clone(), r)))
            .collect();
        let rows: Vec<RanklistRow> = snapshot
            .rows
            .iter()
            .filter(|row| row.party.handle().is_some_and(|h| rating_before.contains_key(h)))
            .cloned()
            .collect();

        let results = predict_for_rows(&rows, &rating_before)?;
        snapshot.performances = Some(
            results
                .into_iter()
                .filter_map(|r| r.performance.map(|p| (r.handle, p)))
                .collect(),
        );
    }

    let performances = snapshot.performances.as_ref();
    let results: Vec<PredictResult> = changes
        .iter()
        .map(|change| PredictResult {
            handle: change.handle.clone(),
            rating: Some(change.old_rating),
            delta: change.new_rating - change.old_rating,
            performance: performances.and_then(|p| p.get(&change.handle).copied()),
        })
        .collect();

    Ok(PredictResponse::new(&results, PredictionMode::Final, snapshot.fetch_time))
}

/// Deltas predicted from current ratings. Educational rounds only rate
/// entrants below `EDU_ROUND_RATED_THRESHOLD`.
pub fn predicted_response(snapshot: &ContestSnapshot, current_ratings: &HashMap<String, i32>) -> Result<PredictResponse> {
    let is_edu_round = snapshot.contest.name.to_lowercase().contains("educational");

    let results = if is_edu_round {
        let rows: Vec<RanklistRow> = snapshot
            .rows
            .iter()
            .filter(|row| {
                row.party.handle().is_some_and(|h| {
                    current_ratings.get(h).map_or(true, |&r| r < EDU_ROUND_RATED_THRESHOLD)
                })
            })
            .cloned()
            .collect();
        predict_for_rows(&rows, current_ratings)?
    } else {
        predict_for_rows(&snapshot.rows, current_ratings)?
    };

    Ok(PredictResponse::new(&results, PredictionMode::Predicted, snapshot.fetch_time))
}
