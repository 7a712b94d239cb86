use serde::{Deserialize, Deserializer, de};

fn parse_flag<E: de::Error>(value: &str) -> Result<Option<bool>, E> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "y" | "t" => Ok(Some(true)),
        "0" | "false" | "no" | "n" | "f" => Ok(Some(false)),
        other => Err(E::custom(format!("invalid boolean flag '{other}'"))),
    }
}

/// Required boolean written as `0/1`, `true/false` or `yes/no`
pub(super) fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_flag(&value)?.ok_or_else(|| de::Error::custom("missing boolean flag"))
}

/// Like [`deserialize_flag`] but empty stays missing
pub(super) fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_flag(&value)
}
