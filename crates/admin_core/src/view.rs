//! Derived view data for the edit form: avatar fallbacks, audit-date
//! strings and the assignable-role checkbox list. Nothing here is stored;
//! callers recompute per render.

use chrono::{DateTime, Utc};
use url::Url;

use crate::form::UserFormValues;

pub const LAST_SEEN_NEVER: &str = "Never";

/// Checkbox model for one assignable role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOption {
    pub name: String,
    pub granted: bool,
}

/// Fallback initials when the avatar is missing: first two characters of
/// the display name, uppercased.
pub fn avatar_initials(display_name: &str) -> String {
    display_name
        .chars()
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Detects the backend's placeholder avatar, which is served with a
/// `default=blank` query parameter.
pub fn has_placeholder_avatar(avatar_url: &str) -> bool {
    match Url::parse(avatar_url) {
        Ok(url) => url
            .query_pairs()
            .any(|(key, value)| key == "default" && value == "blank"),
        // Relative or malformed URLs still carry the query text.
        Err(_) => avatar_url.contains("default=blank"),
    }
}

/// Creation date in the dashboard's "3 Feb 2024" form.
pub fn format_created_at(created_at: DateTime<Utc>) -> String {
    created_at.format("%-d %b %Y").to_string()
}

/// Relative last-seen description, or the literal sentinel when the user
/// has never signed in.
pub fn last_seen_label(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(seen) = last_seen else {
        return LAST_SEEN_NEVER.to_string();
    };

    let elapsed = now.signed_duration_since(seen);
    if elapsed.num_seconds() < 60 {
        return "just now".to_string();
    }
    if elapsed.num_minutes() < 60 {
        return plural(elapsed.num_minutes(), "minute");
    }
    if elapsed.num_hours() < 24 {
        return plural(elapsed.num_hours(), "hour");
    }
    if elapsed.num_days() < 7 {
        return plural(elapsed.num_days(), "day");
    }
    format_created_at(seen)
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Whether the phone-verified checkbox is editable: only once a phone
/// number is present.
pub fn phone_verified_editable(values: &UserFormValues) -> bool {
    values
        .phone_number
        .as_deref()
        .is_some_and(|number| !number.is_empty())
}

/// Builds the assignable-role checkbox list: one entry per role the
/// project allows, checked when the user currently holds it.
pub fn role_options(project_roles: &[String], granted: &[String]) -> Vec<RoleOption> {
    project_roles
        .iter()
        .map(|name| RoleOption {
            name: name.clone(),
            granted: granted.iter().any(|held| held == name),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
