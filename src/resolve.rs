use serde_json::Value;

pub const PROBABILITY_KEYS: &[&str] = &[
    "probability",
    "churnProbability",
    "churn_probability",
    "probabilidade",
];

pub const RISK_FACTOR_KEYS: &[&str] = &[
    "primary_risk_factor",
    "primaryRiskFactor",
    "main_factor",
    "fator_risco",
];

pub const RETENTION_FACTOR_KEYS: &[&str] = &[
    "primary_retention_factor",
    "primaryRetentionFactor",
    "secondary_factor",
    "secondaryFactor",
    "retention_factor",
];

pub const CLIENT_ID_KEYS: &[&str] = &["clientId", "userId", "user_id"];

pub fn safe_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|parsed| parsed.is_finite()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite()),
        _ => None,
    }
}

/// The first alias that is present and non-null wins, even when its value
/// fails to coerce. A record that names a field with garbage does not fall
/// through to a later alias.
pub fn resolve_number(record: &Value, aliases: &[&str]) -> Option<f64> {
    let field = aliases
        .iter()
        .find_map(|key| record.get(key).filter(|value| !value.is_null()))?;
    safe_number(field)
}

/// Walks aliases until one holds a non-empty string. `"N/A"` is an absence
/// marker: it ends the walk with no value instead of falling through.
pub fn resolve_text(record: &Value, aliases: &[&str]) -> Option<String> {
    for key in aliases {
        match record.get(key).and_then(Value::as_str) {
            Some("") | None => continue,
            Some("N/A") => return None,
            Some(text) => return Some(text.to_string()),
        }
    }
    None
}

pub fn resolve_client_id(record: &Value) -> Option<String> {
    for key in CLIENT_ID_KEYS {
        match record.get(key) {
            Some(Value::String(text)) if !text.is_empty() => return Some(text.clone()),
            Some(Value::Number(number)) => return Some(number.to_string()),
            _ => continue,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn probability_aliases_resolve_in_order() {
        let record = json!({ "churn_probability": 0.72 });
        assert_eq!(resolve_number(&record, PROBABILITY_KEYS), Some(0.72));

        let record = json!({ "probability": 0.3, "churn_probability": 0.72 });
        assert_eq!(resolve_number(&record, PROBABILITY_KEYS), Some(0.3));
    }

    #[test]
    fn numeric_strings_coerce() {
        let record = json!({ "probabilidade": "0.55" });
        assert_eq!(resolve_number(&record, PROBABILITY_KEYS), Some(0.55));

        let record = json!({ "probability": " 0.25 " });
        assert_eq!(resolve_number(&record, PROBABILITY_KEYS), Some(0.25));
    }

    #[test]
    fn present_garbage_does_not_fall_through() {
        let record = json!({ "probability": "not a number", "churn_probability": 0.9 });
        assert_eq!(resolve_number(&record, PROBABILITY_KEYS), None);
    }

    #[test]
    fn null_aliases_fall_through() {
        let record = json!({ "probability": null, "churnProbability": 0.41 });
        assert_eq!(resolve_number(&record, PROBABILITY_KEYS), Some(0.41));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let record = json!({ "probability": "NaN" });
        assert_eq!(resolve_number(&record, PROBABILITY_KEYS), None);

        let record = json!({ "probability": "Infinity" });
        assert_eq!(resolve_number(&record, PROBABILITY_KEYS), None);
    }

    #[test]
    fn empty_text_falls_through_to_later_alias() {
        let record = json!({ "primary_risk_factor": "", "main_factor": "skip_rate" });
        assert_eq!(
            resolve_text(&record, RISK_FACTOR_KEYS),
            Some("skip_rate".to_string())
        );
    }

    #[test]
    fn not_available_marker_means_absent() {
        let record = json!({
            "primary_retention_factor": "N/A",
            "retention_factor": "offline_listening"
        });
        assert_eq!(resolve_text(&record, RETENTION_FACTOR_KEYS), None);
    }

    #[test]
    fn non_string_factors_are_skipped() {
        let record = json!({ "primary_risk_factor": 7, "main_factor": "ad_intensity" });
        assert_eq!(
            resolve_text(&record, RISK_FACTOR_KEYS),
            Some("ad_intensity".to_string())
        );
    }

    #[test]
    fn client_ids_accept_strings_and_numbers() {
        let record = json!({ "userId": 1042 });
        assert_eq!(resolve_client_id(&record), Some("1042".to_string()));

        let record = json!({ "clientId": "user-77", "userId": 3 });
        assert_eq!(resolve_client_id(&record), Some("user-77".to_string()));

        let record = json!({ "name": "no id here" });
        assert_eq!(resolve_client_id(&record), None);
    }
}
