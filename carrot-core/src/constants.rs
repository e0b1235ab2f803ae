/// Rating assumed for entrants with no prior rating.
/// Only used for probability math; the reported rating stays absent.
pub const DEFAULT_RATING: i32 = 1400;

/// Upper bound (exclusive for the seed histogram) of the supported rating scale.
pub const MAX_RATING_LIMIT: i32 = 6000;

/// Lower bound (inclusive) of the supported rating scale.
pub const MIN_RATING_LIMIT: i32 = -500;

/// Number of distinct integer ratings covered by the seed histogram.
pub const RATING_RANGE_LEN: i32 = MAX_RATING_LIMIT - MIN_RATING_LIMIT;

/// Offset of rating difference 0 in the win-probability kernel.
pub const ELO_OFFSET: i32 = RATING_RANGE_LEN;

/// Offset of `MIN_RATING_LIMIT` in the seed histogram.
pub const RATING_OFFSET: i32 = -MIN_RATING_LIMIT;

/// Elo scale: a 400 point gap means 10:1 odds.
pub const ELO_SCALE: f64 = 400.0;

/// Lower bound of the binary search that inverts a mid rank back to a rating.
pub const RANK_TO_RATING_LOW: i32 = 2;

/// The second zero-sum pass looks at the top `4 * round(sqrt(n))` entrants.
pub const ZERO_SUM_TOP_FACTOR: i64 = 4;

/// The second zero-sum pass never moves deltas by more than this (and never up).
pub const ZERO_SUM_MAX_DECREASE: i64 = 10;

/// Contests from this id on report brand new entrants with an old rating of 0.
pub const FAKE_RATINGS_SINCE_CONTEST: i64 = 1360;

/// Rating substituted for that fake 0.
pub const NEW_DEFAULT_RATING: i32 = 1400;

/// Educational rounds are rated only for entrants below this rating.
pub const EDU_ROUND_RATED_THRESHOLD: i32 = 2100;

/// A contest still without rating changes this many days after its end is unrated.
pub const RATING_PENDING_MAX_DAYS: i64 = 3;

/// Lowercase substrings of contest names that mark a contest as unrated.
pub const UNRATED_HINTS: [&str; 6] = ["unrated", "fools", "q#", "kotlin", "marathon", "teams"];

/// Message the remote API returns for contests that will never be rated.
pub const RATING_CHANGES_UNAVAILABLE: &str = "Rating changes are unavailable for this contest";
