// src/utils/csv.rs

use chrono::SecondsFormat;

use crate::models::submission::ExportRow;

pub const EXPORT_HEADER: [&str; 6] = [
    "Name",
    "Registration Number",
    "Email",
    "College",
    "Score",
    "Submission Time",
];

/// Escapes one field of the export.
///
/// Values a spreadsheet would read as a formula (leading `=`, `+`, `-`, `@`
/// or a control character) get a tab prefix. Fields with a comma, a quote or
/// a newline are then quoted, with embedded quotes doubled.
pub fn escape_field(value: &str) -> String {
    let value = if value.starts_with(['=', '+', '-', '@', '\t', '\r', '\n']) {
        format!("\t{}", value)
    } else {
        value.to_string()
    };

    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value
    }
}

/// Renders the results export. Lines are separated by `\n`, no trailing newline.
pub fn render_export(rows: &[ExportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(EXPORT_HEADER.join(","));

    for row in rows {
        lines.push(
            [
                escape_field(&row.name),
                escape_field(&row.registration_number),
                escape_field(&row.email),
                escape_field(&row.college),
                row.score.to_string(),
                row.submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ]
            .join(","),
        );
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn plain_fields_are_left_alone() {
        assert_eq!(escape_field("Jane Doe"), "Jane Doe");
    }

    #[test]
    fn awkward_fields_are_quoted() {
        assert_eq!(escape_field("Doe, Jane"), "\"Doe, Jane\"");
        assert_eq!(escape_field("The \"Best\" College"), "\"The \"\"Best\"\" College\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn formula_like_fields_are_neutralised() {
        assert_eq!(escape_field("@SUM(A1)"), "\t@SUM(A1)");
        assert_eq!(escape_field("-2+3"), "\t-2+3");
        assert_eq!(
            escape_field("=HYPERLINK(\"http://evil\")"),
            "\"\t=HYPERLINK(\"\"http://evil\"\")\""
        );
        assert_eq!(escape_field("\nName"), "\"\t\nName\"");
        // Only the leading character matters.
        assert_eq!(escape_field("R-1"), "R-1");
    }

    #[test]
    fn renders_header_and_rows() {
        let rows = vec![ExportRow {
            name: "Doe, Jane".to_string(),
            registration_number: "R-1".to_string(),
            email: "jane@uni.edu".to_string(),
            college: "Uni".to_string(),
            score: 17,
            submitted_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap(),
        }];

        let csv = render_export(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Name,Registration Number,Email,College,Score,Submission Time"
        );
        assert_eq!(
            lines[1],
            "\"Doe, Jane\",R-1,jane@uni.edu,Uni,17,2025-03-01T10:30:00Z"
        );
    }
}
