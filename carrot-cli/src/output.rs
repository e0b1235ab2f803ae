/// Output formatting: terminal table and JSON.
use carrot_core::{PredictResponse, PredictionMode, Preferences, ResponseRow, RowDetail};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Performance,
    Delta,
    RankUp,
    RankChange,
}

impl Column {
    fn header(self, mode: PredictionMode) -> &'static str {
        match (self, mode) {
            (Column::Performance, _) => "Performance",
            (Column::Delta, PredictionMode::Predicted) => "Predicted Δ",
            (Column::Delta, PredictionMode::Final) => "Δ",
            (Column::RankUp, _) => "Rank Up",
            (Column::RankChange, _) => "Rank Change",
        }
    }

    fn cell(self, row: &ResponseRow) -> String {
        match self {
            Column::Performance => match row.performance {
                Some(p) => format!("{} ({})", p.value, p.band.abbr),
                None => "-".to_string(),
            },
            Column::Delta => format!("{:+}", row.delta),
            Column::RankUp => match row.detail {
                RowDetail::Predicted { delta_req_for_rank_up: Some(req), next_rank: Some(next) } => {
                    format!("+{req} to {}", next.abbr)
                }
                _ => "-".to_string(),
            },
            Column::RankChange => match row.detail {
                RowDetail::Final { new_rank } if new_rank != row.rank => {
                    format!("{} -> {}", row.rank.abbr, new_rank.abbr)
                }
                RowDetail::Final { new_rank } => new_rank.abbr.to_string(),
                RowDetail::Predicted { .. } => "-".to_string(),
            },
        }
    }
}

/// Columns enabled by the preferences for this mode, in display order.
fn columns(mode: PredictionMode, prefs: &Preferences) -> Vec<Column> {
    let toggles = match mode {
        PredictionMode::Predicted => [
            (Column::Performance, prefs.show_col_current_performance),
            (Column::Delta, prefs.show_col_predicted_delta),
            (Column::RankUp, prefs.show_col_rank_up_delta),
        ],
        PredictionMode::Final => [
            (Column::Performance, prefs.show_col_final_performance),
            (Column::Delta, prefs.show_col_final_delta),
            (Column::RankChange, prefs.show_col_rank_change),
        ],
    };
    toggles.into_iter().filter(|&(_, on)| on).map(|(c, _)| c).collect()
}

/// Lay out a left-aligned text table. Widths count chars, not bytes.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let pad = |s: &str, w: usize| format!("{s}{}", " ".repeat(w - s.chars().count()));
    let line = |cells: Vec<String>| cells.join(" | ").trim_end().to_string();

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.iter().zip(&widths).map(|(h, &w)| pad(h, w)).collect()));
    out.push(widths.iter().map(|&w| "-".repeat(w)).collect::<Vec<_>>().join("-|-"));
    for row in rows {
        out.push(line(row.iter().zip(&widths).map(|(c, &w)| pad(c, w)).collect()));
    }
    out.join("\n")
}

/// Table text for a response. `order` fixes the row order; handles missing
/// from the response are skipped.
pub fn render_table(resp: &PredictResponse, order: &[String], prefs: &Preferences) -> String {
    let cols = columns(resp.mode, prefs);
    let mut headers = vec!["#", "Handle", "Rank"];
    headers.extend(cols.iter().map(|c| c.header(resp.mode)));

    let rows: Vec<Vec<String>> = order
        .iter()
        .filter_map(|handle| resp.get(handle).map(|row| (handle, row)))
        .enumerate()
        .map(|(i, (handle, row))| {
            let mut cells = vec![(i + 1).to_string(), handle.clone(), row.rank.abbr.to_string()];
            cells.extend(cols.iter().map(|c| c.cell(row)));
            cells
        })
        .collect();

    let mut out = format_table(&headers, &rows);
    out.push_str(&format!("\n\n{} rows, mode {}", rows.len(), resp.mode));
    out
}

/// Print a response as a formatted terminal table.
pub fn print_table(resp: &PredictResponse, order: &[String], prefs: &Preferences) {
    println!("{}", render_table(resp, order, prefs));
}

#[derive(Serialize)]
struct JsonRow<'a> {
    handle: &'a str,
    #[serde(flatten)]
    row: &'a ResponseRow,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    mode: PredictionMode,
    fetch_time: i64,
    rows: Vec<JsonRow<'a>>,
}

fn to_json(resp: &PredictResponse, order: &[String]) -> serde_json::Result<String> {
    let rows = order
        .iter()
        .filter_map(|handle| resp.get(handle).map(|row| JsonRow { handle, row }))
        .collect();
    let output = JsonOutput { mode: resp.mode, fetch_time: resp.fetch_time, rows };
    serde_json::to_string_pretty(&output)
}

/// Print a response as JSON, rows in `order`.
pub fn print_json(resp: &PredictResponse, order: &[String]) {
    match to_json(resp, order) {
        Ok(text) => println!("{text}"),
        Err(e) => crate::bail(format!("Failed to serialize output: {e}")),
    }
}
