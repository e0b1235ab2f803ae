/// carrot-core: Pure-computation rating change predictor.
///
/// Standings + prior ratings → rank, rating delta and performance per contestant.
/// No IO, no HTTP, no filesystem: fetching standings and ratings is up to the caller.
///
/// Expected ranks come from an FFT convolution of the Elo win-probability
/// kernel with the field's rating histogram, so a prediction costs
/// O(R log R + n log R) for a rating range R instead of O(n²).
///
/// # Quick start
///
/// ```rust
/// use carrot_core::{predict, Contestant, Performance};
///
/// let field = vec![
///     Contestant::new("alice", 100.0, 0, Some(1500)),
///     Contestant::new("bob", 50.0, 0, Some(1500)),
///     Contestant::new("carol", 50.0, 30, None), // unrated entrant
/// ];
///
/// let results = predict(field, true).unwrap();
///
/// for r in &results {
///     println!("{}: {:+} (performance {})", r.handle, r.delta, r.performance.unwrap());
/// }
/// let alice = results.iter().find(|r| r.handle == "alice").unwrap();
/// assert_eq!(alice.performance, Some(Performance::Infinite));
/// ```

pub mod calculator;
pub mod constants;
pub mod contest;
pub mod deltas;
pub mod error;
pub mod fft;
pub mod predict;
pub mod rank;
pub mod response;
pub mod search;
pub mod types;

// Re-export primary public API at crate root.
pub use calculator::RatingCalculator;
pub use contest::{ContestSnapshot, IsRated, RatingChangesLookup, Standings};
pub use deltas::{calc_deltas, plan_deltas, DeltaPlan, DeltasOutcome, Preferences};
pub use error::CarrotError;
pub use fft::FftConv;
pub use predict::{predict, predict_rows};
pub use rank::Rank;
pub use response::{PredictResponse, PredictionMode, ResponseRow, RowDetail};
pub use search::binary_search;
pub use types::{Contestant, Performance, PredictResult, StandingsRow};
