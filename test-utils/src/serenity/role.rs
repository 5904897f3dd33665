use serenity::all::Role;

fn role_json(role_id: u64, name: &str, color: u32, position: i16, managed: bool) -> Role {
    serde_json::from_value(serde_json::json!({
        "id": role_id.to_string(),
        "name": name,
        "color": color,
        "colors": {
            "primary_color": color,
            "secondary_color": null,
            "tertiary_color": null,
        },
        "hoist": false,
        "icon": null,
        "unicode_emoji": null,
        "position": position,
        "permissions": "0",
        "flags": 0,
        "managed": managed,
        "mentionable": false,
    }))
    .expect("Failed to create test role - invalid JSON structure")
}

/// Creates a plain guild role with no permissions.
///
/// Only the id, name, color and hierarchy position vary; hierarchy tests and the
/// nuke role filter look at nothing else.
///
/// # Arguments
/// - `role_id` - Discord role ID (snowflake)
/// - `position` - Role position in the hierarchy (higher = more important)
///
/// # Panics
/// - If the JSON cannot be deserialized into a Role (indicates invalid test data)
pub fn create_test_role(role_id: u64, name: &str, color: u32, position: i16) -> Role {
    role_json(role_id, name, color, position, false)
}

/// Creates a role owned by an integration, such as a bot's own role.
///
/// Discord refuses to delete these, so nuke must leave them alone.
pub fn create_managed_role(role_id: u64, name: &str, position: i16) -> Role {
    role_json(role_id, name, 0, position, true)
}
