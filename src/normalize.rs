use crate::fields::TargetIndexes;
use crate::models::Row;
use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// Concatenates every run of ASCII digits in `field`; no digits gives `""`.
pub fn extract_digits(field: &str) -> String {
    DIGIT_RUN_REGEX
        .find_iter(field)
        .map(|m| m.as_str())
        .collect()
}

/// Returns a copy of `row` with digit extraction applied at the target positions.
///
/// Field count is preserved and the input row is left untouched.
pub fn normalize_row(row: &[String], targets: &TargetIndexes) -> Row {
    row.iter()
        .enumerate()
        .map(|(i, field)| {
            if targets.contains(i) {
                extract_digits(field)
            } else {
                field.clone()
            }
        })
        .collect()
}
