//! Plain-text case summary placed at the root of whole-case archives.

use chrono::Utc;

use crate::entity::recall_case;

use super::{LogBundle, us_datetime};

/// Render the `case_summary.txt` body: case header, numbered log entries in
/// chronological order, generation footer.
pub fn case_summary(case: &recall_case::Model, bundles: &[LogBundle]) -> String {
    let mut ordered: Vec<&LogBundle> = bundles.iter().collect();
    ordered.sort_by_key(|b| b.log.created_at);

    let mut out = format!("Case: {}\n", case.title);
    if let Some(client) = case.client_name.as_deref() {
        out.push_str(&format!("Client: {client}\n"));
    }
    if let Some(location) = case.location_text.as_deref() {
        out.push_str(&format!("Location: {location}\n"));
    }
    out.push_str(&format!("Created: {}\n", us_datetime(&case.created_at)));
    out.push_str(&format!(
        "Last Updated: {}\n\n",
        us_datetime(&case.updated_at)
    ));

    out.push_str(&format!("=== LOGS ({}) ===\n\n", ordered.len()));

    for (index, bundle) in ordered.iter().enumerate() {
        let log = &bundle.log;
        out.push_str(&format!(
            "{}. {} - {}\n",
            index + 1,
            log.log_type,
            us_datetime(&log.created_at)
        ));
        if !log.note.trim().is_empty() {
            out.push_str(&format!("   {}\n", log.note));
        }
        let photo_count = bundle.photos.len();
        if photo_count > 0 {
            let label = if photo_count == 1 { "photo" } else { "photos" };
            out.push_str(&format!("   [photo] {photo_count} {label}\n"));
        }
        out.push('\n');
    }

    out.push_str(&format!("Generated: {}\n", us_datetime(&Utc::now())));
    out.push_str("Recall - Case Management System");
    out
}
