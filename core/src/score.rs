use crate::models::DayLog;

/// Highest possible compliance score.
pub const MAX_SCORE: u8 = 5;

/// Count of daily targets met, 0-5.
///
/// One point each for: calories at or under target, protein at or over target,
/// walk done, lift done, rings closed. A missing total or target scores zero for
/// that criterion.
#[must_use]
pub fn compliance_score(log: &DayLog) -> u8 {
    let calories_met = matches!(
        (log.calories_total, log.cal_target),
        (Some(total), Some(target)) if total <= target
    );
    let protein_met = matches!(
        (log.protein_g_total, log.prot_target),
        (Some(total), Some(target)) if total >= target
    );

    [
        calories_met,
        protein_met,
        log.walk_done,
        log.lift_done,
        log.rings_closed,
    ]
    .into_iter()
    .map(u8::from)
    .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> DayLog {
        DayLog::blank(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn test_score_example_day() {
        let log = DayLog {
            calories_total: Some(1800),
            cal_target: Some(2000),
            protein_g_total: Some(200),
            prot_target: Some(190),
            walk_done: true,
            lift_done: false,
            rings_closed: true,
            ..day()
        };
        assert_eq!(compliance_score(&log), 4);
    }

    #[test]
    fn test_score_empty_day_is_zero() {
        assert_eq!(compliance_score(&day()), 0);
    }

    #[test]
    fn test_score_perfect_day() {
        let log = DayLog {
            calories_total: Some(2000),
            protein_g_total: Some(190),
            walk_done: true,
            lift_done: true,
            rings_closed: true,
            ..day()
        };
        assert_eq!(compliance_score(&log), MAX_SCORE);
    }

    #[test]
    fn test_score_boundaries_are_inclusive() {
        let log = DayLog {
            calories_total: Some(2000),
            protein_g_total: Some(190),
            ..day()
        };
        assert_eq!(compliance_score(&log), 2);

        let over = DayLog {
            calories_total: Some(2001),
            protein_g_total: Some(189),
            ..day()
        };
        assert_eq!(compliance_score(&over), 0);
    }

    #[test]
    fn test_score_missing_targets_score_zero() {
        let log = DayLog {
            calories_total: Some(1500),
            protein_g_total: Some(250),
            cal_target: None,
            prot_target: None,
            ..day()
        };
        assert_eq!(compliance_score(&log), 0);
    }

    #[test]
    fn test_score_if_done_does_not_count() {
        let log = DayLog {
            if_done: true,
            ..day()
        };
        assert_eq!(compliance_score(&log), 0);
    }

    #[test]
    fn test_score_is_monotonic_in_flags() {
        let base = DayLog {
            calories_total: Some(2100),
            protein_g_total: Some(150),
            ..day()
        };
        let setters: [fn(&mut DayLog); 3] = [
            |l| l.walk_done = true,
            |l| l.lift_done = true,
            |l| l.rings_closed = true,
        ];
        for mask in 0u8..8 {
            let mut log = base.clone();
            for (bit, set) in setters.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    set(&mut log);
                }
            }
            let score = compliance_score(&log);
            assert!(score <= MAX_SCORE);
            for set in &setters {
                let mut more = log.clone();
                set(&mut more);
                assert!(compliance_score(&more) >= score);
            }
        }
    }

    #[test]
    fn test_score_is_monotonic_toward_targets() {
        let mut previous = 0;
        for calories in (1500..=2500).rev().step_by(100) {
            let log = DayLog {
                calories_total: Some(calories),
                ..day()
            };
            let score = compliance_score(&log);
            assert!(score >= previous);
            previous = score;
        }

        let mut previous = 0;
        for protein in (100..=250).step_by(10) {
            let log = DayLog {
                protein_g_total: Some(protein),
                ..day()
            };
            let score = compliance_score(&log);
            assert!(score >= previous);
            previous = score;
        }
    }
}
