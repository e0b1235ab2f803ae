/// Prediction entry point.
///
/// One function, pure: contestants in, results out. Safe to call from several
/// threads at once; the only shared state is the read-only FFT plan.
use crate::calculator::RatingCalculator;
use crate::error::Result;
use crate::types::{Contestant, PredictResult, StandingsRow};

/// Rank the field, compute deltas (and performances if `calc_perfs`), and
/// project every contestant into a [`PredictResult`] carrying the true prior
/// rating. Results come back ordered by effective rating, highest first.
pub fn predict(contestants: Vec<Contestant>, calc_perfs: bool) -> Result<Vec<PredictResult>> {
    if contestants.is_empty() {
        return Ok(Vec::new());
    }
    let mut calculator = RatingCalculator::new(&contestants)?;
    let contestants = calculator.calculate_deltas(contestants, calc_perfs)?;
    Ok(contestants.into_iter().map(PredictResult::from).collect())
}

/// [`predict`] over raw standings rows.
pub fn predict_rows(rows: Vec<StandingsRow>, calc_perfs: bool) -> Result<Vec<PredictResult>> {
    predict(rows.into_iter().map(Contestant::from).collect(), calc_perfs)
}
