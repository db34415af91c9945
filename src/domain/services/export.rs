use crate::domain::models::attendance::Attendance;

pub const ATTENDANCE_CSV_HEADER: &str = "attendance_id,event_id,attendee_id,checked_in_at";

fn esc(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders attendance rows as CSV, one line per check-in, timestamps in
/// RFC 3339 UTC.
pub fn attendance_csv(rows: &[Attendance]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(ATTENDANCE_CSV_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{}\n",
            esc(&row.id),
            esc(&row.event_id),
            esc(&row.attendee_id),
            row.checked_in_at.to_rfc3339()
        ));
    }
    out
}
