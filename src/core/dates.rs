use chrono::{Datelike, NaiveDate};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// 1-based index of the calendar month containing `today`, counted from the
/// month of `start`. Never below 1.
pub fn current_month_index(start: NaiveDate, today: NaiveDate) -> u32 {
    let elapsed = month_ordinal(today) - month_ordinal(start) + 1;
    u32::try_from(elapsed.max(1)).unwrap_or(u32::MAX)
}

/// First day of simulated month `offset` (1-based).
pub fn month_start(start: NaiveDate, offset: u32) -> Option<NaiveDate> {
    let (year, month0) = shifted_year_month(start, offset);
    let year = i32::try_from(year).ok()?;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// Short label such as `jan/25` for simulated month `offset` (1-based).
pub fn month_label(start: NaiveDate, offset: u32) -> String {
    let (year, month0) = shifted_year_month(start, offset);
    format!(
        "{}/{:02}",
        MONTH_ABBREVIATIONS[month0 as usize],
        year.rem_euclid(100)
    )
}

fn shifted_year_month(start: NaiveDate, offset: u32) -> (i64, u32) {
    let ordinal = month_ordinal(start) + i64::from(offset) - 1;
    (ordinal.div_euclid(12), ordinal.rem_euclid(12) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn current_month_index_is_one_in_start_month() {
        assert_eq!(current_month_index(date(2025, 3, 31), date(2025, 3, 1)), 1);
    }

    #[test]
    fn current_month_index_counts_calendar_months_across_years() {
        assert_eq!(current_month_index(date(2024, 11, 20), date(2025, 2, 3)), 4);
    }

    #[test]
    fn current_month_index_floors_at_one_before_start() {
        assert_eq!(current_month_index(date(2025, 6, 1), date(2024, 1, 1)), 1);
    }

    #[test]
    fn month_label_shifts_from_start_month() {
        assert_eq!(month_label(date(2025, 1, 15), 1), "jan/25");
        assert_eq!(month_label(date(2025, 11, 15), 3), "jan/26");
        assert_eq!(month_label(date(1999, 12, 31), 2), "jan/00");
    }

    #[test]
    fn month_start_pins_day_to_first() {
        assert_eq!(month_start(date(2025, 8, 31), 7), Some(date(2026, 2, 1)));
    }
}
