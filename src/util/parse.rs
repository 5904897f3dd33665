use crate::error::{internal::InternalError, AppError};

/// Parses a u64 value from String
///
/// # Arguments
/// - `value` - The String to attempt to parse into `u64`
///
/// # Returns
/// - `Ok(u64)` - Successfully parsed String to `u64`
/// - `Err(AppError::InternalErr(ParseStringId))` - Failed to parse
///   the string as a u64
pub fn parse_u64_from_string(value: String) -> Result<u64, AppError> {
    let result = value
        .parse::<u64>()
        .map_err(|e| InternalError::ParseStringId { value, source: e })?;

    Ok(result)
}

/// Parses an optional stored id column.
pub fn parse_optional_u64(value: Option<String>) -> Result<Option<u64>, AppError> {
    value.map(parse_u64_from_string).transpose()
}

/// Decodes the JSON id list stored in a text column.
///
/// # Arguments
/// - `column` - Column name, used in the error
/// - `value` - JSON array of id strings, e.g. `["1","2"]`
pub fn parse_id_list(column: &'static str, value: &str) -> Result<Vec<u64>, AppError> {
    let raw: Vec<String> = serde_json::from_str(value)
        .map_err(|source| InternalError::InvalidJsonColumn { column, source })?;

    raw.into_iter().map(parse_u64_from_string).collect()
}

/// Encodes an id list for storage in a text column.
///
/// Ids are stored as strings to survive JSON number precision limits.
pub fn encode_id_list(ids: &[u64]) -> String {
    let raw: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    serde_json::Value::from(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_snowflake() {
        let id = parse_u64_from_string("1027978441573793853".to_string()).unwrap();
        assert_eq!(id, 1027978441573793853);
    }

    #[test]
    fn rejects_non_numeric_id() {
        let result = parse_u64_from_string("not-an-id".to_string());
        assert!(matches!(result, Err(AppError::InternalErr(_))));
    }

    #[test]
    fn id_list_survives_storage() {
        let ids = vec![u64::MAX, 1, 42];
        let stored = encode_id_list(&ids);
        assert_eq!(parse_id_list("ban_roles", &stored).unwrap(), ids);
        assert_eq!(parse_id_list("ban_roles", "[]").unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn rejects_malformed_id_list() {
        assert!(parse_id_list("ban_roles", "{oops").is_err());
    }
}
