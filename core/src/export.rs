use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::models::DayLog;

pub const CSV_HEADER: [&str; 11] = [
    "date",
    "weight_am",
    "waist_in",
    "calories_total",
    "protein_g_total",
    "cal_target",
    "prot_target",
    "walk_done",
    "lift_done",
    "if_done",
    "notes",
];

/// Render day logs as CSV, one line per log in the order given.
///
/// Fields are never quoted, so notes are flattened instead: newlines become a
/// literal `\n` and commas become `;`. The result has no trailing newline.
pub fn export_csv(logs: &[DayLog]) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADER)?;
    for log in logs {
        wtr.write_record(&[
            log.date.format("%Y-%m-%d").to_string(),
            opt_float(log.weight_am),
            opt_float(log.waist_in),
            opt_int(log.calories_total),
            opt_int(log.protein_g_total),
            opt_int(log.cal_target),
            opt_int(log.prot_target),
            flag(log.walk_done).to_string(),
            flag(log.lift_done).to_string(),
            flag(log.if_done).to_string(),
            escape_notes(log.notes.as_deref().unwrap_or_default()),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(csv::IntoInnerError::into_error)
        .context("Failed to flush CSV writer")?;
    let mut out = String::from_utf8(bytes).context("CSV output is not valid UTF-8")?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn opt_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// Whole numbers keep one decimal so 221 reads as a weight, not a count.
fn opt_float(value: Option<f64>) -> String {
    value
        .map(|v| {
            if v.fract().abs() < f64::EPSILON {
                format!("{v:.1}")
            } else {
                v.to_string()
            }
        })
        .unwrap_or_default()
}

fn escape_notes(notes: &str) -> String {
    notes.replace('\n', "\\n").replace(',', ";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_export_header_only() {
        let csv = export_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "date,weight_am,waist_in,calories_total,protein_g_total,cal_target,prot_target,walk_done,lift_done,if_done,notes"
        );
    }

    #[test]
    fn test_export_row() {
        let log = DayLog {
            weight_am: Some(221.4),
            waist_in: Some(40.0),
            calories_total: Some(1850),
            protein_g_total: Some(195),
            walk_done: true,
            if_done: true,
            notes: Some("good day".to_string()),
            ..DayLog::blank(date(2024, 6, 15))
        };
        let csv = export_csv(&[log]).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "2024-06-15,221.4,40.0,1850,195,2000,190,1,0,1,good day"
        );
    }

    #[test]
    fn test_export_absent_values_are_empty() {
        let log = DayLog {
            cal_target: None,
            prot_target: None,
            ..DayLog::blank(date(2024, 6, 15))
        };
        let csv = export_csv(&[log]).unwrap();
        assert!(csv.ends_with("\n2024-06-15,,,,,,,0,0,0,"));
    }

    #[test]
    fn test_export_escapes_notes() {
        let log = DayLog {
            notes: Some("tired, sore\nskipped lift".to_string()),
            ..DayLog::blank(date(2024, 6, 15))
        };
        let csv = export_csv(&[log]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(",tired; sore\\nskipped lift"));
        assert_eq!(row.split(',').count(), CSV_HEADER.len());
    }

    #[test]
    fn test_export_keeps_given_order() {
        let logs = vec![
            DayLog::blank(date(2024, 6, 14)),
            DayLog::blank(date(2024, 6, 15)),
        ];
        let csv = export_csv(&logs).unwrap();
        let dates: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-06-14", "2024-06-15"]);
    }
}
