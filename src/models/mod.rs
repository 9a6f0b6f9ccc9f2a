use time::format_description::FormatItem;
use time::macros::format_description;

pub mod agm_report;
pub mod event;
pub mod member;

pub const DATE_FORMAT: &[FormatItem] = format_description!("[year]-[month]-[day]");

/// Renders a record id as the plain string the view models expose.
/// Documents read back from the database always carry an id, so the
/// fallback arm is never hit in practice.
pub fn id_string(id: &Option<surrealdb::RecordId>) -> String {
    id.as_ref()
        .map(|id| id.key().to_string())
        .unwrap_or_default()
}
