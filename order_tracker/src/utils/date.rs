use chrono::{DateTime, Utc};

/// `19 October 2026 | 14 : 05`
pub fn format_created_at(created_at: &DateTime<Utc>) -> String {
    format!(
        "{} | {}",
        created_at.format("%d %B %Y"),
        created_at.format("%H : %M")
    )
}
