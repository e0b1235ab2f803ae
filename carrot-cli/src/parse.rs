/// Standings and ratings file parsing.
///
/// Both formats are auto-detected: JSON if the content starts with `[` or `{`,
/// otherwise whitespace-separated text with one record per line. Blank lines
/// and lines starting with `#` are ignored.
use carrot_core::contest::RatedUser;
use carrot_core::StandingsRow;
use serde::Deserialize;
use std::collections::HashMap;

fn is_json(trimmed: &str) -> bool {
    trimmed.starts_with('[') || trimmed.starts_with('{')
}

fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
}

/// Parse standings: a JSON array of `{handle, points, penalty, rating?}` or
/// lines of `handle points penalty [rating]`.
pub fn parse_standings(content: &str) -> Result<Vec<StandingsRow>, String> {
    let trimmed = content.trim();
    if is_json(trimmed) {
        return serde_json::from_str(trimmed)
            .map_err(|e| format!("Standings look like JSON but failed to parse: {e}"));
    }

    data_lines(trimmed)
        .map(|(line_no, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if !(3..=4).contains(&fields.len()) {
                return Err(format!(
                    "line {line_no}: expected \"handle points penalty [rating]\", got \"{line}\""
                ));
            }
            let points: f64 = fields[1]
                .parse()
                .map_err(|_| format!("line {line_no}: invalid points \"{}\"", fields[1]))?;
            let penalty: i64 = fields[2]
                .parse()
                .map_err(|_| format!("line {line_no}: invalid penalty \"{}\"", fields[2]))?;
            let rating = match fields.get(3) {
                Some(r) => Some(r.parse().map_err(|_| format!("line {line_no}: invalid rating \"{r}\""))?),
                None => None,
            };
            Ok(StandingsRow { handle: fields[0].to_string(), points, penalty, rating })
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RatingsJson {
    Map(HashMap<String, i32>),
    List(Vec<RatedUser>),
}

/// Parse ratings: a JSON object `{handle: rating}`, a JSON array of
/// `{handle, rating}` (the shape of the rated-user list), or lines of
/// `handle rating`.
pub fn parse_ratings(content: &str) -> Result<HashMap<String, i32>, String> {
    let trimmed = content.trim();
    if is_json(trimmed) {
        let parsed: RatingsJson = serde_json::from_str(trimmed)
            .map_err(|e| format!("Ratings look like JSON but failed to parse: {e}"))?;
        return Ok(match parsed {
            RatingsJson::Map(map) => map,
            RatingsJson::List(users) => users.into_iter().map(|u| (u.handle, u.rating)).collect(),
        });
    }

    data_lines(trimmed)
        .map(|(line_no, line)| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(handle), Some(rating), None) => rating
                    .parse()
                    .map(|r| (handle.to_string(), r))
                    .map_err(|_| format!("line {line_no}: invalid rating \"{rating}\"")),
                _ => Err(format!("line {line_no}: expected \"handle rating\", got \"{line}\"")),
            }
        })
        .collect()
}

/// Ratings from a separate file win over ratings inlined in the standings.
pub fn apply_ratings(rows: &mut [StandingsRow], ratings: &HashMap<String, i32>) {
    for row in rows {
        if let Some(&rating) = ratings.get(&row.handle) {
            row.rating = Some(rating);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standings_text() {
        let text = "# handle points penalty rating\nalice 3000 45 1820\n\nbob 2500 10\n";
        let rows = parse_standings(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].handle, "alice");
        assert_eq!(rows[0].points, 3000.0);
        assert_eq!(rows[0].penalty, 45);
        assert_eq!(rows[0].rating, Some(1820));
        assert_eq!(rows[1].rating, None);
    }

    #[test]
    fn test_parse_standings_json() {
        let json = r#"[{"handle": "a", "points": 1.5, "penalty": 3, "rating": 2000},
                       {"handle": "b", "points": 1, "penalty": 0}]"#;
        let rows = parse_standings(json).unwrap();
        assert_eq!(rows[0].points, 1.5);
        assert_eq!(rows[1].rating, None);
    }

    #[test]
    fn test_parse_standings_errors_name_the_line() {
        let err = parse_standings("alice 10 0\nbob ten 0\n").unwrap_err();
        assert!(err.contains("line 2"), "{err}");
        assert!(err.contains("points"), "{err}");

        let err = parse_standings("alice 10\n").unwrap_err();
        assert!(err.contains("line 1"), "{err}");
    }

    #[test]
    fn test_parse_ratings_formats() {
        let text = parse_ratings("alice 1500\nbob -20\n").unwrap();
        assert_eq!(text["bob"], -20);

        let map = parse_ratings(r#"{"alice": 1500}"#).unwrap();
        assert_eq!(map["alice"], 1500);

        let list = parse_ratings(r#"[{"handle": "carol", "rating": 2100, "rank": "master"}]"#).unwrap();
        assert_eq!(list["carol"], 2100);

        assert!(parse_ratings("alice\n").is_err());
    }

    #[test]
    fn test_apply_ratings_overrides_inline() {
        let mut rows = parse_standings("alice 1 0 1500\nbob 1 0\ncarol 0 0 1300").unwrap();
        let ratings = parse_ratings("alice 1600\nbob 1200").unwrap();
        apply_ratings(&mut rows, &ratings);
        let got: Vec<Option<i32>> = rows.iter().map(|r| r.rating).collect();
        assert_eq!(got, vec![Some(1600), Some(1200), Some(1300)]);
    }
}
