//! Location to event category mapping.
//!
//! Field reports carry free-text event and disaster type names, so the
//! category is derived with an ordered chain of case-insensitive keyword
//! checks. The first matching rule wins.

use globe_dataset_models::LocationRecord;
use globe_event_models::EventCategory;

/// Classifies a location into exactly one [`EventCategory`].
///
/// Priority order:
///
/// 1. `is_covid` → [`EventCategory::Covid`]
/// 2. event name mentions Ukraine → [`EventCategory::Ukraine`]
/// 3. disaster type keywords (flood, cyclone, earthquake, epidemic,
///    drought, civil unrest, in that order)
/// 4. everything else → [`EventCategory::Others`]
#[must_use]
pub fn classify(location: &LocationRecord) -> EventCategory {
    if location.is_covid {
        return EventCategory::Covid;
    }

    let event_name = lowercase(location.event_name.as_deref());
    if event_name.contains("ukraine") {
        return EventCategory::Ukraine;
    }

    classify_disaster_type(&lowercase(location.dtype_name.as_deref()))
}

/// Maps an already-lowercased disaster type name to a category.
fn classify_disaster_type(dtype: &str) -> EventCategory {
    // ── Hydro-meteorological ────────────────────────────────────────
    if dtype.contains("flood") {
        return EventCategory::Flood;
    }
    if contains_any(dtype, &["cyclone", "hurricane", "typhoon"]) {
        return EventCategory::Cyclone;
    }

    // ── Geophysical ─────────────────────────────────────────────────
    if dtype.contains("earthquake") {
        return EventCategory::Earthquake;
    }

    // ── Health ──────────────────────────────────────────────────────
    if contains_any(dtype, &["epidemic", "outbreak"]) {
        return EventCategory::Epidemic;
    }

    if dtype.contains("drought") {
        return EventCategory::Drought;
    }

    // ── Human-made ──────────────────────────────────────────────────
    if contains_any(dtype, &["civil unrest", "violence", "conflict"]) {
        return EventCategory::CivilUnrest;
    }

    EventCategory::Others
}

fn lowercase(value: Option<&str>) -> String {
    value.unwrap_or_default().to_lowercase()
}

/// Checks if `haystack` contains any of the given `needles`.
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
