use chrono::NaiveDate;

use crate::error::{AppError, AppResult};

/// Validates and normalizes a `YYYY-MM` month identifier. The zero-padded
/// form is required so that lexicographic ordering of stored months equals
/// chronological ordering.
pub fn normalize_month(raw: &str) -> AppResult<String> {
    let month = raw.trim();

    let shape_ok = month.len() == 7
        && month.as_bytes()[4] == b'-'
        && month
            .chars()
            .enumerate()
            .all(|(index, ch)| index == 4 || ch.is_ascii_digit());

    if !shape_ok {
        return Err(AppError::validation_with_details(
            "月份格式无效，应为 YYYY-MM",
            serde_json::json!({ "month": raw }),
        ));
    }

    // Shape alone admits "2024-13"; let the calendar reject it.
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").map_err(|err| {
        AppError::validation_with_details(
            "月份格式无效，应为 YYYY-MM",
            serde_json::json!({ "month": raw, "reason": err.to_string() }),
        )
    })?;

    Ok(month.to_string())
}
