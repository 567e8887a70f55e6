use anyhow::{Context, Result};
use std::path::Path;

use fittrack_core::service::Tracker;

/// Write the CSV export to `output`, or stdout when no path is given.
pub(crate) fn cmd_export(tracker: &Tracker, output: Option<&Path>) -> Result<()> {
    let csv = tracker.export_csv()?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{csv}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported to {}", path.display());
        }
        None => println!("{csv}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_export_to_file() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let tracker = Tracker::open_in_memory(today).unwrap();
        tracker.day_view(today).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitness_export.csv");
        cmd_export(&tracker, Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert!(lines.next().unwrap().starts_with("date,weight_am,"));
        assert!(lines.next().unwrap().starts_with("2024-06-15,"));
        assert!(lines.next().is_none());
    }
}
