//! Client-side checks run before a fact is submitted.

use url::Url;

use crate::records::MAX_FACT_LEN;
use crate::{Category, NewFact, ValidationError};

/// Check raw form input and build the insert payload.
///
/// The source check only asks whether the URL parser accepts the string, so
/// odd but parseable inputs such as `foo:bar` pass.
pub fn validate_new_fact(
    text: &str,
    source: &str,
    category: &str,
) -> Result<NewFact, ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let len = text.chars().count();
    if len > MAX_FACT_LEN {
        return Err(ValidationError::TextTooLong {
            len,
            limit: MAX_FACT_LEN,
        });
    }

    if Url::parse(source).is_err() {
        return Err(ValidationError::InvalidSource(source.to_string()));
    }

    if category.is_empty() {
        return Err(ValidationError::MissingCategory);
    }
    let category: Category = category
        .parse()
        .map_err(|_| ValidationError::UnknownCategory(category.to_string()))?;

    Ok(NewFact {
        text: text.to_string(),
        source: source.to_string(),
        category,
    })
}

/// Characters left before the limit; negative once the text is too long.
pub fn remaining_chars(text: &str) -> i64 {
    MAX_FACT_LEN as i64 - text.chars().count() as i64
}
