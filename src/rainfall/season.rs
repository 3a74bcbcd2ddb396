//! Growing seasons and the historical date window used as a rainfall proxy

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Zaid,
    Kharif,
    Rabi,
}

impl Season {
    pub fn name(&self) -> &'static str {
        match self {
            Season::Zaid => "Zaid",
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    pub season: Season,
    pub start_month: u32,
    pub end_month: u32,
    /// The window ends in the calendar year after it starts
    pub cross_year: bool,
}

impl SeasonWindow {
    /// Season in progress during `month` (1-12). Out-of-range months are
    /// folded into 1-12 so the mapping stays total.
    pub fn for_month(month: u32) -> Self {
        let month = (month % 12 + 11) % 12 + 1;
        match month {
            2..=5 => Self {
                season: Season::Zaid,
                start_month: 2,
                end_month: 6,
                cross_year: false,
            },
            6..=9 => Self {
                season: Season::Kharif,
                start_month: 6,
                end_month: 11,
                cross_year: false,
            },
            _ => Self {
                season: Season::Rabi,
                start_month: 10,
                end_month: 3,
                cross_year: true,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.season.name()
    }
}

/// Date range and position for one archive lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainfallQuery {
    pub window: SeasonWindow,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
}

impl RainfallQuery {
    /// Last year's run of the season in progress on `today`
    pub fn for_date(today: NaiveDate, latitude: f64, longitude: f64) -> Self {
        let window = SeasonWindow::for_month(today.month());
        let start_year = today.year() - 1;
        let end_year = if window.cross_year {
            today.year()
        } else {
            start_year
        };

        Self {
            window,
            start_date: first_day(start_year, window.start_month),
            end_date: last_day(end_year, window.end_month),
            latitude,
            longitude,
        }
    }
}

fn first_day(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn last_day(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    first_day(next_year, next_month)
        .pred_opt()
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_season_for_each_month() {
        let expected = [
            (1, Season::Rabi),
            (2, Season::Zaid),
            (3, Season::Zaid),
            (4, Season::Zaid),
            (5, Season::Zaid),
            (6, Season::Kharif),
            (7, Season::Kharif),
            (8, Season::Kharif),
            (9, Season::Kharif),
            (10, Season::Rabi),
            (11, Season::Rabi),
            (12, Season::Rabi),
        ];
        for (month, season) in expected {
            assert_eq!(SeasonWindow::for_month(month).season, season, "month {}", month);
        }
    }

    #[test]
    fn test_rabi_crosses_year() {
        assert!(SeasonWindow::for_month(11).cross_year);
        assert!(SeasonWindow::for_month(1).cross_year);
        assert!(!SeasonWindow::for_month(3).cross_year);
        assert!(!SeasonWindow::for_month(7).cross_year);
        assert_eq!(SeasonWindow::for_month(11).name(), "Rabi");
    }

    #[test]
    fn test_zaid_query_uses_prior_year() {
        let query = RainfallQuery::for_date(date(2025, 3, 14), 28.6, 77.2);
        assert_eq!(query.window.season, Season::Zaid);
        assert_eq!(query.start_date, date(2024, 2, 1));
        assert_eq!(query.end_date, date(2024, 6, 30));
    }

    #[test]
    fn test_kharif_query() {
        let query = RainfallQuery::for_date(date(2025, 7, 1), 28.6, 77.2);
        assert_eq!(query.start_date, date(2024, 6, 1));
        assert_eq!(query.end_date, date(2024, 11, 30));
    }

    #[test]
    fn test_rabi_query_spans_year_boundary() {
        let query = RainfallQuery::for_date(date(2025, 11, 20), 28.6, 77.2);
        assert_eq!(query.start_date, date(2024, 10, 1));
        assert_eq!(query.end_date, date(2025, 3, 31));

        let query = RainfallQuery::for_date(date(2025, 1, 5), 28.6, 77.2);
        assert_eq!(query.start_date, date(2024, 10, 1));
        assert_eq!(query.end_date, date(2025, 3, 31));
    }

    #[test]
    fn test_last_day_handles_leap_february() {
        assert_eq!(last_day(2024, 2), date(2024, 2, 29));
        assert_eq!(last_day(2023, 2), date(2023, 2, 28));
        assert_eq!(last_day(2024, 12), date(2024, 12, 31));
    }

    proptest! {
        #[test]
        fn query_range_is_ordered(year in 1950i32..2100, ordinal in 1u32..=365) {
            let today = NaiveDate::from_yo_opt(year, ordinal).unwrap();
            let query = RainfallQuery::for_date(today, 0.0, 0.0);
            prop_assert!(query.start_date < query.end_date);
            prop_assert!(query.start_date.year() == year - 1);
        }
    }
}
