use crate::error::CoreError;

/// Uppercases and validates an ISO-style currency code (3 or 4 ASCII
/// letters, e.g. "USD", "EUR", "USDT").
pub fn normalize_currency_code(code: &str) -> Result<String, CoreError> {
    let normalized = code.trim().to_ascii_uppercase();
    let valid = (3..=4).contains(&normalized.len())
        && normalized.chars().all(|c| c.is_ascii_uppercase());
    if valid {
        Ok(normalized)
    } else {
        Err(CoreError::InvalidCurrency(code.to_string()))
    }
}
