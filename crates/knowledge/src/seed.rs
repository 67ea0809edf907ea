//! Built-in passages for local development and tests.

use crate::types::Passage;

pub const SEED_MANUAL_ID: &str = "seed-manual-1";
pub const SEED_VEHICLE_MODEL: &str = "mvp-manual";

const SEED_ROWS: [(&str, &str, &str, u32); 5] = [
    ("seed-chunk-1", "Oil change interval is 5000 miles.", "Maintenance", 1),
    ("seed-chunk-2", "Check tire pressure monthly.", "Safety", 2),
    ("seed-chunk-3", "Coolant level should be between MIN and MAX.", "Maintenance", 3),
    ("seed-chunk-4", "Replace brake fluid every two years.", "Maintenance", 4),
    ("seed-chunk-5", "Battery terminals must be clean and tight.", "Electrical", 5),
];

/// The five seed passages, one manual, one vehicle model.
pub fn seed_passages() -> Vec<Passage> {
    SEED_ROWS
        .iter()
        .map(|(id, text, section, page)| Passage {
            id: (*id).to_string(),
            text: (*text).to_string(),
            source_doc_id: SEED_MANUAL_ID.to_string(),
            scope_tag: SEED_VEHICLE_MODEL.to_string(),
            section: Some((*section).to_string()),
            page: Some(*page),
        })
        .collect()
}
