//! Ticker symbol normalization.

/// Symbol type alias
pub type Symbol = String;

/// Canonical form of a ticker: trimmed, uppercase, `.` replaced by `-`.
///
/// Returns `None` for blank input.
pub fn normalize_symbol(raw: &str) -> Option<Symbol> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_uppercase().replace('.', "-"))
}
