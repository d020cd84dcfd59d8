// Request body validation for the group creation schema

use crate::core::errors::ServiceError;
use crate::core::models::NewGroup;

pub const MAX_NAME_CHARS: usize = 120;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Parse and validate a raw creation payload against the group schema.
///
/// Unknown fields (including owner-like ones) are dropped, not rejected.
/// The returned name is trimmed.
pub fn parse_create_group(payload: serde_json::Value) -> Result<NewGroup, ServiceError> {
    let parsed: NewGroup = serde_json::from_value(payload)
        .map_err(|e| ServiceError::Validation(format!("Invalid group payload: {}", e)))?;

    let name = parsed.name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation(
            "Group name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ServiceError::Validation(format!(
            "Group name must be at most {} characters",
            MAX_NAME_CHARS
        )));
    }
    if let Some(ref description) = parsed.description {
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(ServiceError::Validation(format!(
                "Group description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            )));
        }
    }

    Ok(NewGroup {
        name: name.to_string(),
        description: parsed.description,
    })
}
