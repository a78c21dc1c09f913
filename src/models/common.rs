use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Generic API response wrapper used by the user administration endpoints
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            total: None,
        }
    }

    pub fn success_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            total: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(message: impl Into<String>, data: Vec<T>) -> Self {
        let total = data.len();
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            total: Some(total),
        }
    }
}

/// `{"codigo": "ARG", "nombre": "ARGENTINA"}` pairs used for nationalities and positions
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct CodeName {
    pub codigo: String,
    pub nombre: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

/// Accepts `3`, `"3"`, `null`, `""` or a missing field. The SPA sends form values as strings.
pub fn deserialize_optional_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => i32::try_from(n)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("{} is out of range", n))),
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<i32>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("'{}' is not a whole number", trimmed)))
        }
    }
}

/// Present-but-empty clears the value, absent leaves it alone. Use with `#[serde(default)]`.
pub fn deserialize_clearable_i32<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_i32(deserializer).map(Some)
}

/// Identifiers such as `matchIdFbr` are text, but forms sometimes post them as numbers.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n.to_string())),
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlexibleBool {
    Bool(bool),
    Number(i64),
    Text(String),
}

/// Accepts `true`, `1`, `"true"`, `"1"` and their negatives.
pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlexibleBool>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlexibleBool::Bool(b)) => Ok(Some(b)),
        Some(FlexibleBool::Number(n)) => Ok(Some(n != 0)),
        Some(FlexibleBool::Text(s)) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            other => Err(de::Error::custom(format!("'{}' is not a boolean", other))),
        },
    }
}
