//! Request validation.

use manual_core::FieldError;

use crate::dto::QueryRequest;

pub const MAX_TEXT_CHARS: usize = 8192;
pub const MAX_VEHICLE_MODEL_CHARS: usize = 255;
pub const MAX_IMAGE_URL_CHARS: usize = 2048;

/// Check a query body, collecting every violated constraint.
pub fn validate_query(request: &QueryRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    match request.text.as_deref() {
        Some(text) if !text.trim().is_empty() => {
            if text.chars().count() > MAX_TEXT_CHARS {
                errors.push(FieldError::new(
                    "text",
                    format!("query text must not exceed {} characters", MAX_TEXT_CHARS),
                ));
            }
        }
        _ => errors.push(FieldError::new("text", "query text is required")),
    }

    if exceeds(request.vehicle_model.as_deref(), MAX_VEHICLE_MODEL_CHARS) {
        errors.push(FieldError::new(
            "vehicleModel",
            format!("vehicle model must not exceed {} characters", MAX_VEHICLE_MODEL_CHARS),
        ));
    }

    if exceeds(request.image_url.as_deref(), MAX_IMAGE_URL_CHARS) {
        errors.push(FieldError::new(
            "imageUrl",
            format!("image URL must not exceed {} characters", MAX_IMAGE_URL_CHARS),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn exceeds(value: Option<&str>, max_chars: usize) -> bool {
    value.is_some_and(|v| v.chars().count() > max_chars)
}
