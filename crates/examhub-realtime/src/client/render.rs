//! HTML rendering of notification feed entries.

use chrono::{DateTime, Local, NaiveDateTime};

use super::panel::NotificationEntry;

/// Render one feed entry as the dashboard's alert card.
pub fn notification_html(entry: &NotificationEntry) -> String {
    format!(
        concat!(
            "<div class=\"alert alert-info alert-sm mb-2\">",
            "<div class=\"d-flex justify-content-between align-items-start\">",
            "<div><strong>{}:</strong><br><small>{}</small></div>",
            "<small class=\"text-muted\">{}</small>",
            "</div></div>"
        ),
        escape_html(&entry.title),
        escape_html(&entry.message),
        escape_html(&display_time(entry.timestamp.as_deref())),
    )
}

/// Format an ISO-8601 timestamp as local `HH:MM:SS`.
///
/// Offset-aware values are converted to local time, naive values are shown
/// as-is, anything unparseable is returned verbatim.
pub fn display_time(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%H:%M:%S").to_string();
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.format("%H:%M:%S").to_string();
        }
    }

    raw.to_string()
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
