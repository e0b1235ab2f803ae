/// Rating change calculator.
///
/// Stages run in a fixed order: seeds from the rating histogram, ranks from
/// the standings, raw deltas, the two zero-sum passes, then (optionally)
/// performances. Each stage takes the contestant list by value and hands it to
/// the next one.
use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::constants::{
    ELO_OFFSET, ELO_SCALE, MAX_RATING_LIMIT, MIN_RATING_LIMIT, RANK_TO_RATING_LOW, RATING_OFFSET,
    RATING_RANGE_LEN, ZERO_SUM_MAX_DECREASE, ZERO_SUM_TOP_FACTOR,
};
use crate::error::Result;
use crate::fft::FftConv;
use crate::search::{binary_search, try_binary_search};
use crate::types::{Contestant, Performance};

/// Tables shared by every calculation. Built on first use, never mutated.
struct EloTables {
    /// `win_prob[d + ELO_OFFSET]` = P(a player rated `d` points above you loses to you).
    win_prob: Vec<f64>,
    fft: FftConv,
}

fn elo_tables() -> &'static EloTables {
    static TABLES: OnceLock<EloTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let win_prob: Vec<f64> = (-RATING_RANGE_LEN..=RATING_RANGE_LEN)
            .map(|d| 1.0 / (1.0 + 10f64.powf(d as f64 / ELO_SCALE)))
            .collect();
        let fft = FftConv::new(win_prob.len() + RATING_RANGE_LEN as usize - 1);
        EloTables { win_prob, fft }
    })
}

fn win_prob(diff: i32) -> f64 {
    elo_tables().win_prob[(diff + ELO_OFFSET) as usize]
}

pub struct RatingCalculator {
    /// `seed[r + ELO_OFFSET + RATING_OFFSET]` = 1 + expected number of entrants
    /// beating a player rated `r`, self included.
    seed: Vec<f64>,
    /// Total shift applied by the zero-sum passes.
    adjustment: i32,
}

impl RatingCalculator {
    /// Build the seed table for a field.
    pub fn new(contestants: &[Contestant]) -> Result<Self> {
        let tables = elo_tables();

        let mut counts = vec![0.0; RATING_RANGE_LEN as usize];
        for c in contestants {
            counts[(c.effective_rating + RATING_OFFSET) as usize] += 1.0;
        }

        let mut seed = tables.fft.convolve(&tables.win_prob, &counts)?;
        for s in &mut seed {
            *s += 1.0;
        }

        Ok(RatingCalculator { seed, adjustment: 0 })
    }

    /// Expected rank of a player rated `rating` in this field, not counting
    /// the pairing with an entrant rated `exclude` (the player themselves).
    pub fn get_seed(&self, rating: i32, exclude: i32) -> f64 {
        self.seed[(rating + ELO_OFFSET + RATING_OFFSET) as usize] - win_prob(rating - exclude)
    }

    /// Net shift added to every raw delta by the zero-sum passes.
    pub fn adjustment(&self) -> i32 {
        self.adjustment
    }

    /// Run every stage. Performances are computed only when `calc_perfs` is set.
    pub fn calculate_deltas(
        &mut self,
        contestants: Vec<Contestant>,
        calc_perfs: bool,
    ) -> Result<Vec<Contestant>> {
        if contestants.is_empty() {
            return Ok(contestants);
        }

        let contestants = reassign_ranks(contestants);
        let contestants = self.calc_deltas(contestants)?;
        let contestants = self.adjust_deltas(contestants);
        tracing::debug!(
            contestants = contestants.len(),
            adjustment = self.adjustment,
            "rating deltas computed"
        );

        if calc_perfs {
            self.calc_perfs(contestants)
        } else {
            Ok(contestants)
        }
    }

    /// Smallest rating whose seed drops below `rank`, minus one.
    fn rank_to_rating(&self, rank: f64, self_rating: i32) -> Result<i32> {
        let found = binary_search(RANK_TO_RATING_LOW, MAX_RATING_LIMIT, |rating| {
            self.get_seed(rating, self_rating) < rank
        })?;
        Ok(found - 1)
    }

    /// Raw delta the contestant would get had they entered with `assumed_rating`.
    /// The zero-sum adjustment is not included.
    pub fn delta_at(&self, c: &Contestant, assumed_rating: i32) -> Result<i32> {
        let seed = self.get_seed(assumed_rating, c.effective_rating);
        let mid_rank = (c.rank as f64 * seed).sqrt();
        let need_rating = self.rank_to_rating(mid_rank, c.effective_rating)?;
        Ok((need_rating - assumed_rating) / 2)
    }

    fn calc_deltas(&self, mut contestants: Vec<Contestant>) -> Result<Vec<Contestant>> {
        for c in &mut contestants {
            c.delta = self.delta_at(c, c.effective_rating)?;
        }
        Ok(contestants)
    }

    /// Two passes, both truncating toward zero. The first pulls the total to
    /// just below zero; the second nudges the top-rated slice down by at most
    /// `ZERO_SUM_MAX_DECREASE`.
    fn adjust_deltas(&mut self, mut contestants: Vec<Contestant>) -> Vec<Contestant> {
        contestants.sort_by(|a, b| b.effective_rating.cmp(&a.effective_rating));
        let n = contestants.len() as i64;

        let delta_sum: i64 = contestants.iter().map(|c| c.delta as i64).sum();
        let inc = -delta_sum / n - 1;
        self.adjustment = inc as i32;
        for c in &mut contestants {
            c.delta += inc as i32;
        }

        let zero_sum_count = (ZERO_SUM_TOP_FACTOR * (n as f64).sqrt().round() as i64).min(n);
        let top_sum: i64 = contestants[..zero_sum_count as usize]
            .iter()
            .map(|c| c.delta as i64)
            .sum();
        let inc = (-top_sum / zero_sum_count).clamp(-ZERO_SUM_MAX_DECREASE, 0);
        self.adjustment += inc as i32;
        for c in &mut contestants {
            c.delta += inc as i32;
        }

        contestants
    }

    fn calc_perfs(&self, mut contestants: Vec<Contestant>) -> Result<Vec<Contestant>> {
        for c in &mut contestants {
            let performance = if c.rank == 1 {
                Performance::Infinite
            } else {
                let rating = try_binary_search(MIN_RATING_LIMIT, MAX_RATING_LIMIT, |assumed| {
                    Ok(self.delta_at(c, assumed)? + self.adjustment <= 0)
                })?;
                Performance::Finite(rating)
            };
            c.performance = Some(performance);
        }
        Ok(contestants)
    }
}

/// Sort by (points desc, penalty asc) and assign ranks. Walking up from the
/// bottom, a tied block takes the rank of its lowest position, so rank 1 is
/// only ever held by a unique winner.
pub fn reassign_ranks(mut contestants: Vec<Contestant>) -> Vec<Contestant> {
    contestants.sort_by(|a, b| {
        b.points
            .partial_cmp(&a.points)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.penalty.cmp(&b.penalty))
    });

    let mut last_key: Option<(f64, i64)> = None;
    let mut rank = 0;
    for i in (0..contestants.len()).rev() {
        let key = (contestants[i].points, contestants[i].penalty);
        if last_key != Some(key) {
            last_key = Some(key);
            rank = i + 1;
        }
        contestants[i].rank = rank;
    }
    contestants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_RATING;

    fn make(handle: &str, points: f64, penalty: i64, rating: Option<i32>) -> Contestant {
        Contestant::new(handle, points, penalty, rating)
    }

    fn pair_field() -> Vec<Contestant> {
        vec![make("b", 50.0, 0, Some(1500)), make("a", 100.0, 0, Some(1500))]
    }

    #[test]
    fn test_kernel_is_half_at_zero_and_symmetric() {
        assert!((win_prob(0) - 0.5).abs() < 1e-12);
        assert!((win_prob(400) - 1.0 / 11.0).abs() < 1e-12);
        assert!((win_prob(250) + win_prob(-250) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_seed_matches_pairwise_sum() {
        let field = vec![
            make("x", 0.0, 0, Some(1200)),
            make("y", 0.0, 0, Some(1850)),
            make("z", 0.0, 0, None),
        ];
        let calc = RatingCalculator::new(&field).unwrap();

        for &r in &[MIN_RATING_LIMIT, 900, 1400, 2333, MAX_RATING_LIMIT] {
            let direct: f64 = 1.0 + field.iter().map(|c| win_prob(r - c.effective_rating)).sum::<f64>();
            let via_fft = calc.get_seed(r, 1850) + win_prob(r - 1850);
            assert!((direct - via_fft).abs() < 1e-9, "rating {r}: {direct} vs {via_fft}");
        }
    }

    #[test]
    fn test_seed_excludes_self() {
        let field = vec![make("solo", 0.0, 0, Some(1500))];
        let calc = RatingCalculator::new(&field).unwrap();
        assert!((calc.get_seed(1500, 1500) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ranks_sort_by_points_then_penalty() {
        let ranked = reassign_ranks(vec![
            make("slow", 3.0, 200, None),
            make("fast", 3.0, 100, None),
            make("top", 4.0, 500, None),
            make("last", 1.0, 0, None),
        ]);
        let order: Vec<(&str, usize)> = ranked.iter().map(|c| (c.handle.as_str(), c.rank)).collect();
        assert_eq!(order, vec![("top", 1), ("fast", 2), ("slow", 3), ("last", 4)]);
    }

    #[test]
    fn test_tied_block_takes_lowest_position() {
        let ranked = reassign_ranks(vec![
            make("a", 5.0, 10, None),
            make("b", 5.0, 10, None),
            make("c", 2.0, 0, None),
            make("d", 2.0, 0, None),
            make("e", 2.0, 0, None),
        ]);
        let ranks: Vec<usize> = ranked.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![2, 2, 5, 5, 5]);
    }

    #[test]
    fn test_rank_sort_is_stable_for_ties() {
        let ranked = reassign_ranks(vec![make("first", 1.0, 0, None), make("second", 1.0, 0, None)]);
        assert_eq!(ranked[0].handle, "first");
        assert_eq!(ranked[1].handle, "second");
    }

    #[test]
    fn test_two_player_regression() {
        let mut calc = RatingCalculator::new(&pair_field()).unwrap();
        let result = calc.calculate_deltas(pair_field(), false).unwrap();

        let a = result.iter().find(|c| c.handle == "a").unwrap();
        let b = result.iter().find(|c| c.handle == "b").unwrap();
        assert_eq!(a.rank, 1);
        assert_eq!(b.rank, 2);
        // Raw deltas are +107 / -87, first pass shifts by -11, second by 0.
        assert_eq!(a.delta, 96);
        assert_eq!(b.delta, -98);
        assert_eq!(calc.adjustment(), -11);
        assert!(a.performance.is_none());
    }

    #[test]
    fn test_first_pass_truncates_toward_zero() {
        let mut calc = RatingCalculator::new(&[]).unwrap();
        let mut field = vec![
            make("p", 0.0, 0, Some(2000)),
            make("q", 0.0, 0, Some(1000)),
            make("r", 0.0, 0, Some(1500)),
        ];
        for (c, d) in field.iter_mut().zip([-5, -1, 0]) {
            c.delta = d;
        }
        // sum = -6, trunc(6 / 3) - 1 = 1; top slice is everyone: sum = -3, trunc(3 / 3) = 1 -> clamped to 0.
        let adjusted = calc.adjust_deltas(field);
        let deltas: Vec<i32> = adjusted.iter().map(|c| c.delta).collect();
        assert_eq!(deltas, vec![-4, 1, 0]);
        assert_eq!(calc.adjustment(), 1);
    }

    #[test]
    fn test_second_pass_clamped_to_ten() {
        let mut calc = RatingCalculator::new(&[]).unwrap();
        let mut field: Vec<Contestant> = (0..16)
            .map(|i| make(&format!("u{i}"), 0.0, 0, Some(3000 - i * 100)))
            .collect();
        // Top-rated half gains a lot, bottom half loses the same amount.
        for (i, c) in field.iter_mut().enumerate() {
            c.delta = if i < 8 { 100 } else { -100 };
        }
        // Pass A: sum 0 -> inc -1. Pass B: 16 top entrants (4 * 4), sum -16 -> +1 -> clamped to 0.
        let adjusted = calc.adjust_deltas(field);
        assert_eq!(calc.adjustment(), -1);
        assert_eq!(adjusted[0].delta, 99);

        let mut field: Vec<Contestant> = (0..100)
            .map(|i| make(&format!("v{i}"), 0.0, 0, Some(3000 - i * 10)))
            .collect();
        for (i, c) in field.iter_mut().enumerate() {
            c.delta = if i < 40 { 200 } else { -(200 * 40) / 60 };
        }
        // Pass A: sum = 8000 - 7980 = 20 -> trunc(-0.2) - 1 = -1.
        // Pass B: top 40 all at 199 -> trunc(-199) clamped to -10.
        let adjusted = calc.adjust_deltas(field);
        assert_eq!(calc.adjustment(), -11);
        assert_eq!(adjusted[0].delta, 189);
    }

    #[test]
    fn test_performance_exit_condition() {
        let field: Vec<Contestant> = (0..30)
            .map(|i| make(&format!("h{i}"), (30 - i) as f64, i as i64, Some(1000 + (i * 37) % 1500)))
            .collect();
        let mut calc = RatingCalculator::new(&field).unwrap();
        let result = calc.calculate_deltas(field, true).unwrap();

        for c in &result {
            match c.performance.unwrap() {
                Performance::Infinite => assert_eq!(c.rank, 1),
                Performance::Finite(p) => {
                    assert!(c.rank > 1);
                    if p < MAX_RATING_LIMIT {
                        assert!(calc.delta_at(c, p).unwrap() + calc.adjustment() <= 0, "{}", c.handle);
                    }
                    if p > MIN_RATING_LIMIT {
                        assert!(calc.delta_at(c, p - 1).unwrap() + calc.adjustment() > 0, "{}", c.handle);
                    }
                }
            }
        }
    }

    #[test]
    fn test_better_rank_never_lower_delta_at_equal_rating() {
        let field: Vec<Contestant> = (0..20)
            .map(|i| make(&format!("e{i}"), (20 - i) as f64, 0, Some(DEFAULT_RATING)))
            .collect();
        let mut calc = RatingCalculator::new(&field).unwrap();
        let mut result = calc.calculate_deltas(field, false).unwrap();
        result.sort_by_key(|c| c.rank);
        for w in result.windows(2) {
            assert!(w[0].delta >= w[1].delta, "{} vs {}", w[0].handle, w[1].handle);
        }
    }
}
