use serde::{Deserialize, Deserializer};

// `?page=abc` or `?page=` falls back to the first page instead of rejecting the request
pub fn deserialize_lenient_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(1))
}
