use chrono::NaiveDate;
use reqwest::Url;
use serde::Deserialize;
use utoipa::IntoParams;

/// `date`/`period` filter shared by the period attendance endpoints.
/// Blank values count as absent and never reach the query string.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PeriodQuery {
    /// ISO date, e.g. `2024-01-10`
    pub date: Option<String>,
    /// Period label, e.g. `1st Period (9:00-10:00)`
    pub period: Option<String>,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl PeriodQuery {
    pub fn new(date: Option<NaiveDate>, period: Option<&str>) -> Self {
        Self {
            date: date.map(|d| d.format("%Y-%m-%d").to_string()),
            period: period.map(str::to_string),
        }
    }

    pub fn date(&self) -> Option<&str> {
        non_blank(&self.date)
    }

    pub fn period(&self) -> Option<&str> {
        non_blank(&self.period)
    }

    pub fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        if let Some(date) = self.date() {
            pairs.append_pair("date", date);
        }
        if let Some(period) = self.period() {
            pairs.append_pair("period", period);
        }
        drop(pairs);
        if url.query() == Some("") {
            url.set_query(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("http://localhost:5001/api/period-attendance/export").unwrap()
    }

    #[test]
    fn blank_period_is_left_out() {
        let mut u = url();
        PeriodQuery {
            date: Some("2024-01-10".into()),
            period: Some("".into()),
        }
        .apply(&mut u);
        assert_eq!(
            u.as_str(),
            "http://localhost:5001/api/period-attendance/export?date=2024-01-10"
        );
    }

    #[test]
    fn period_label_is_encoded() {
        let mut u = url();
        PeriodQuery::new(
            NaiveDate::from_ymd_opt(2024, 1, 10),
            Some("1st Period (9:00-10:00)"),
        )
        .apply(&mut u);
        assert_eq!(u.query_pairs().count(), 2);
        assert!(u.as_str().contains("period=1st+Period+%289%3A00-10%3A00%29"));
    }

    #[test]
    fn no_filters_means_no_query() {
        let mut u = url();
        PeriodQuery::default().apply(&mut u);
        assert_eq!(u.query(), None);
    }
}
