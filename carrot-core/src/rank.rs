/// Named rating bands.
use crate::types::Performance;

/// A rating band: `[low, high)`, `None` meaning unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rank {
    pub name: &'static str,
    pub abbr: &'static str,
    pub low: Option<i32>,
    pub high: Option<i32>,
    pub color_class: Option<&'static str>,
}

const fn band(
    name: &'static str,
    abbr: &'static str,
    low: Option<i32>,
    high: Option<i32>,
    color_class: &'static str,
) -> Rank {
    Rank { name, abbr, low, high, color_class: Some(color_class) }
}

pub static UNRATED: Rank = Rank {
    name: "Unrated",
    abbr: "U",
    low: None,
    high: None,
    color_class: None,
};

/// Rated bands in ascending order. Each band's `high` is the next band's `low`.
pub static RATED: [Rank; 11] = [
    band("Newbie", "N", None, Some(1200), "user-gray"),
    band("Pupil", "P", Some(1200), Some(1400), "user-green"),
    band("Specialist", "S", Some(1400), Some(1600), "user-cyan"),
    band("Expert", "E", Some(1600), Some(1900), "user-blue"),
    band("Candidate Master", "CM", Some(1900), Some(2100), "user-violet"),
    band("Master", "M", Some(2100), Some(2300), "user-orange"),
    band("International Master", "IM", Some(2300), Some(2400), "user-orange"),
    band("Grandmaster", "GM", Some(2400), Some(2600), "user-red"),
    band("International Grandmaster", "IGM", Some(2600), Some(3000), "user-red"),
    band("Legendary Grandmaster", "LGM", Some(3000), Some(4000), "user-legendary"),
    band("Tourist", "T", Some(4000), None, "user-4000"),
];

impl Rank {
    /// Band containing `rating`; `Unrated` when there is no rating.
    pub fn for_rating(rating: Option<i32>) -> &'static Rank {
        let Some(rating) = rating else {
            return &UNRATED;
        };
        let idx = RATED.partition_point(|r| matches!(r.high, Some(high) if high <= rating));
        &RATED[idx.min(RATED.len() - 1)]
    }

    /// Band of a performance level. An infinite performance sits in the top band.
    pub fn for_performance(performance: Performance) -> &'static Rank {
        match performance {
            Performance::Finite(v) => Rank::for_rating(Some(v)),
            Performance::Infinite => &RATED[RATED.len() - 1],
        }
    }

    /// The rated band right above this one.
    pub fn next(&self) -> Option<&'static Rank> {
        let idx = RATED.iter().position(|r| r == self)?;
        RATED.get(idx + 1)
    }

    pub fn is_rated(&self) -> bool {
        *self != UNRATED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_are_contiguous() {
        for w in RATED.windows(2) {
            assert_eq!(w[0].high, w[1].low, "{} / {}", w[0].name, w[1].name);
        }
        assert_eq!(RATED[0].low, None);
        assert_eq!(RATED[RATED.len() - 1].high, None);
    }

    #[test]
    fn test_for_rating_boundaries() {
        assert_eq!(Rank::for_rating(None).abbr, "U");
        assert_eq!(Rank::for_rating(Some(-300)).abbr, "N");
        assert_eq!(Rank::for_rating(Some(1199)).abbr, "N");
        assert_eq!(Rank::for_rating(Some(1200)).abbr, "P");
        assert_eq!(Rank::for_rating(Some(2099)).abbr, "CM");
        assert_eq!(Rank::for_rating(Some(2100)).abbr, "M");
        assert_eq!(Rank::for_rating(Some(3999)).abbr, "LGM");
        assert_eq!(Rank::for_rating(Some(4000)).abbr, "T");
        assert_eq!(Rank::for_rating(Some(9000)).abbr, "T");
    }

    #[test]
    fn test_for_performance() {
        assert_eq!(Rank::for_performance(Performance::Infinite).abbr, "T");
        assert_eq!(Rank::for_performance(Performance::Finite(1650)).abbr, "E");
    }

    #[test]
    fn test_next_band() {
        assert_eq!(Rank::for_rating(Some(1500)).next().map(|r| r.abbr), Some("E"));
        assert_eq!(Rank::for_rating(Some(4500)).next(), None);
        assert_eq!(UNRATED.next(), None);
        assert!(!UNRATED.is_rated());
        assert!(RATED[0].is_rated());
    }
}
