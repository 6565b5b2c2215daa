use crate::error::AppError;
use crate::model::stats::{SchoolSummary, StudentStats};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const DISTRICT_HEADER: [&str; 9] = [
    "School Name",
    "ID",
    "Location",
    "Total Students",
    "Current Students",
    "Teachers",
    "Attendance %",
    "Dropout Rate %",
    "Last Updated",
];

/// Spreadsheet-friendly CSV: BOM, every field quoted, `\n` line ends, rows of
/// any width.
fn write_rows(rows: Vec<Vec<String>>) -> Result<Vec<u8>, AppError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(BOM.to_vec());
    for row in rows {
        wtr.write_record(&row)
            .map_err(|e| AppError::Internal(format!("csv write failed: {e}")))?;
    }
    wtr.into_inner()
        .map_err(|e| AppError::Internal(format!("csv flush failed: {e}")))
}

fn row<I, S>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    fields.into_iter().map(|f| f.to_string()).collect()
}

fn blank() -> Vec<String> {
    vec![String::new()]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn student_report(stats: &StudentStats, generated_on: NaiveDate) -> Result<Vec<u8>, AppError> {
    let rank = stats
        .rank
        .map(|r| format!("#{r}"))
        .unwrap_or_else(|| "N/A".into());

    let mut rows = vec![
        row(["Student Attendance Report"]),
        row(["Generated on".to_string(), generated_on.format("%Y-%m-%d").to_string()]),
        blank(),
        row(["Summary"]),
        row(["Attendance Percentage".to_string(), format!("{}%", stats.attendance_percentage)]),
        row(["Total Days".to_string(), stats.total_days.to_string()]),
        row(["Present Days".to_string(), stats.present_days.to_string()]),
        row(["Absent Days".to_string(), stats.absent_days.to_string()]),
        row(["Rank".to_string(), rank]),
        blank(),
        row(["Detailed Attendance"]),
        row(["Date", "Status", "Subject"]),
    ];
    rows.extend(stats.attendance_records.iter().map(|day| {
        vec![
            day.date.clone(),
            capitalize(&day.status),
            day.subject
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "N/A".into()),
        ]
    }));
    write_rows(rows)
}

pub fn student_report_filename(today: NaiveDate) -> String {
    format!("attendance_report_{}.csv", today.format("%Y%m%d"))
}

pub fn district_report(schools: &[SchoolSummary]) -> Result<Vec<u8>, AppError> {
    let mut rows = vec![row(DISTRICT_HEADER)];
    rows.extend(schools.iter().map(|s| {
        vec![
            s.name.clone(),
            s.id.clone(),
            s.location.clone(),
            s.total_students.to_string(),
            s.current_students.unwrap_or(s.total_students).to_string(),
            s.total_teachers.to_string(),
            format!("{:.1}", s.attendance_rate.unwrap_or(0.0)),
            format!("{:.1}", s.dropout_rate.unwrap_or(0.0)),
            s.last_updated
                .as_deref()
                .map(|d| d.get(..10).unwrap_or(d).to_string())
                .unwrap_or_default(),
        ]
    }));
    write_rows(rows)
}

pub fn district_report_filename(today: NaiveDate) -> String {
    format!("district_report_{}.csv", today.format("%Y-%m-%d"))
}

/// `attendance_2024-01-10_1st_Period.csv`, `attendance_2024-01-10_all_periods.csv`
pub fn period_export_filename(date: &str, period: Option<&str>) -> String {
    let period = period
        .map(|p| p.split_whitespace().take(2).collect::<Vec<_>>().join("_"))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "all_periods".into());
    format!("attendance_{date}_{period}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stats::StudentAttendanceDay;

    fn day(date: &str, status: &str, subject: Option<&str>) -> StudentAttendanceDay {
        StudentAttendanceDay {
            date: date.into(),
            status: status.into(),
            subject: subject.map(str::to_string),
        }
    }

    #[test]
    fn student_report_layout() {
        let stats = StudentStats {
            attendance_percentage: 87.5,
            total_days: 8,
            present_days: 7,
            absent_days: 1,
            rank: Some(3),
            attendance_records: vec![
                day("2024-01-09", "present", Some("Maths")),
                day("2024-01-10", "absent", None),
            ],
        };
        let bytes = student_report(&stats, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()).unwrap();

        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], r#""Student Attendance Report""#);
        assert_eq!(lines[1], r#""Generated on","2024-01-10""#);
        assert_eq!(lines[2], r#""""#);
        assert_eq!(lines[4], r#""Attendance Percentage","87.5%""#);
        assert_eq!(lines[8], r##""Rank","#3""##);
        assert_eq!(lines[11], r#""Date","Status","Subject""#);
        assert_eq!(lines[12], r#""2024-01-09","Present","Maths""#);
        assert_eq!(lines[13], r#""2024-01-10","Absent","N/A""#);
    }

    #[test]
    fn quotes_inside_fields_are_doubled() {
        let schools = vec![SchoolSummary {
            id: "7".into(),
            name: r#"St. "Xavier" High"#.into(),
            location: "Puri".into(),
            total_students: 500,
            current_students: None,
            total_teachers: 25,
            attendance_rate: Some(91.26),
            dropout_rate: Some(2.0),
            last_updated: Some("2024-01-10T08:30:00".into()),
        }];
        let bytes = district_report(&schools).unwrap();
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with(r#""School Name","ID""#));
        assert_eq!(
            lines[1],
            r#""St. ""Xavier"" High","7","Puri","500","500","25","91.3","2.0","2024-01-10""#
        );
    }

    #[test]
    fn filenames() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(student_report_filename(d), "attendance_report_20240110.csv");
        assert_eq!(district_report_filename(d), "district_report_2024-01-10.csv");
        assert_eq!(
            period_export_filename("2024-01-10", Some("1st Period (9:00-10:00)")),
            "attendance_2024-01-10_1st_Period.csv"
        );
        assert_eq!(
            period_export_filename("2024-01-10", None),
            "attendance_2024-01-10_all_periods.csv"
        );
    }
}
