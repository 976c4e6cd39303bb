use serde_json::Value;

use crate::models::{ClassifiedCustomer, Prediction, RiskBand};
use crate::resolve;
use crate::translate;

pub const LOW_MAX: f64 = 0.40;
pub const MODERATE_MAX: f64 = 0.60;

const LOW_TOKENS: &[&str] = &["low", "baixo"];
const MODERATE_TOKENS: &[&str] = &["mod", "moder"];
const HIGH_TOKENS: &[&str] = &["high", "alto"];

pub fn clamp_probability(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}

/// An upstream label takes precedence over the numeric bands; an
/// unrecognized label falls back to the thresholds. UNKNOWN only comes out
/// when neither a usable probability nor a recognizable label is present.
pub fn classify(probability: Option<f64>, label: Option<&str>) -> RiskBand {
    if let Some(band) = label.and_then(band_from_label) {
        return band;
    }
    match probability {
        Some(p) => band_from_probability(p),
        None => RiskBand::Unknown,
    }
}

/// Label families are matched case-insensitively as substrings, in low,
/// moderate, high priority order.
pub fn band_from_label(label: &str) -> Option<RiskBand> {
    let lowered = label.to_lowercase();
    if LOW_TOKENS.iter().any(|token| lowered.contains(token)) {
        return Some(RiskBand::Low);
    }
    if MODERATE_TOKENS.iter().any(|token| lowered.contains(token)) {
        return Some(RiskBand::Moderate);
    }
    if HIGH_TOKENS.iter().any(|token| lowered.contains(token)) {
        return Some(RiskBand::High);
    }
    None
}

/// 0.40 lands in MODERATE and 0.60 lands in HIGH.
pub fn band_from_probability(probability: f64) -> RiskBand {
    let p = clamp_probability(probability);
    if p < LOW_MAX {
        RiskBand::Low
    } else if p < MODERATE_MAX {
        RiskBand::Moderate
    } else {
        RiskBand::High
    }
}

/// Classifies one loose customer record from the bulk listing. These records
/// carry no risk label, so banding is purely numeric; a record without a
/// usable probability field scores 0 and lands in LOW.
pub fn classify_customer(record: &Value) -> ClassifiedCustomer {
    let probability = clamp_probability(
        resolve::resolve_number(record, resolve::PROBABILITY_KEYS).unwrap_or(0.0),
    );
    let band = band_from_probability(probability);

    // LOW customers never show a risk factor, whatever the record claims.
    let risk_factor = if band == RiskBand::Low {
        translate::NO_RISK_FACTOR.to_string()
    } else {
        match resolve::resolve_text(record, resolve::RISK_FACTOR_KEYS) {
            Some(raw) => translate::translate(&raw),
            None => translate::NO_RISK_FACTOR.to_string(),
        }
    };

    let retention_factor = match resolve::resolve_text(record, resolve::RETENTION_FACTOR_KEYS) {
        Some(raw) => translate::translate(&raw),
        None => translate::NO_RETENTION_FACTOR.to_string(),
    };

    ClassifiedCustomer {
        client_id: resolve::resolve_client_id(record).unwrap_or_else(|| "Cliente".to_string()),
        probability,
        band,
        risk_factor,
        retention_factor,
    }
}

/// Normalizes a `/predict` response. The payload may carry a free-text
/// `risk_level` and a nested `ai_diagnosis` block.
pub fn classify_prediction(result: &Value, profile: Option<&Value>) -> Prediction {
    let label = result.get("risk_level").and_then(Value::as_str);
    let resolved = resolve::resolve_number(result, resolve::PROBABILITY_KEYS);
    let probability = clamp_probability(resolved.unwrap_or(0.0));
    let band = classify(resolved, label);

    let diagnosis = result.get("ai_diagnosis");
    let raw_risk = resolve::resolve_text(result, resolve::RISK_FACTOR_KEYS).or_else(|| {
        diagnosis.and_then(|block| resolve::resolve_text(block, resolve::RISK_FACTOR_KEYS))
    });

    let risk_factor = match (band, raw_risk) {
        (RiskBand::Moderate | RiskBand::High, Some(raw)) => translate::translate(&raw),
        _ => translate::NO_RISK_FACTOR.to_string(),
    };

    let raw_retention = resolve::resolve_text(result, resolve::RETENTION_FACTOR_KEYS).or_else(|| {
        diagnosis.and_then(|block| resolve::resolve_text(block, resolve::RETENTION_FACTOR_KEYS))
    });
    let retention_factor = match raw_retention {
        Some(raw) => translate::translate(&raw),
        None if profile_uses_offline(profile) => "Uso Offline".to_string(),
        None => translate::NO_RETENTION_FACTOR.to_string(),
    };

    let suggested_action = resolve::resolve_text(result, &["recommended_action"]).or_else(|| {
        diagnosis.and_then(|block| resolve::resolve_text(block, &["suggested_action"]))
    });

    Prediction {
        probability,
        band,
        risk_factor,
        retention_factor,
        suggested_action,
    }
}

fn profile_uses_offline(profile: Option<&Value>) -> bool {
    profile
        .and_then(|value| value.get("offline_listening"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bands_follow_product_thresholds() {
        assert_eq!(band_from_probability(0.0), RiskBand::Low);
        assert_eq!(band_from_probability(0.3999), RiskBand::Low);
        assert_eq!(band_from_probability(0.40), RiskBand::Moderate);
        assert_eq!(band_from_probability(0.5999), RiskBand::Moderate);
        assert_eq!(band_from_probability(0.60), RiskBand::High);
        assert_eq!(band_from_probability(1.0), RiskBand::High);
    }

    #[test]
    fn probabilities_clamp_into_unit_range() {
        assert_eq!(clamp_probability(1.5), 1.0);
        assert_eq!(clamp_probability(-0.2), 0.0);
        assert_eq!(clamp_probability(f64::NAN), 0.0);
        assert_eq!(band_from_probability(1.5), RiskBand::High);
        assert_eq!(band_from_probability(-0.2), RiskBand::Low);
    }

    #[test]
    fn labels_override_numeric_bands() {
        assert_eq!(classify(Some(0.1), Some("ALTO RISCO")), RiskBand::High);
        assert_eq!(classify(Some(0.9), Some("baixo")), RiskBand::Low);
        assert_eq!(classify(Some(0.1), Some("Moderado")), RiskBand::Moderate);
    }

    #[test]
    fn unrecognized_labels_fall_back_to_thresholds() {
        let band = classify(Some(0.5), Some("sem classificacao"));
        assert_eq!(band, RiskBand::Moderate);
        assert_eq!(classify(Some(0.7), None), RiskBand::High);
    }

    #[test]
    fn unknown_needs_neither_probability_nor_label() {
        assert_eq!(classify(None, Some("???")), RiskBand::Unknown);
        assert_eq!(classify(None, None), RiskBand::Unknown);
        assert_eq!(classify(None, Some("alto")), RiskBand::High);
    }

    #[test]
    fn label_families_check_low_before_high() {
        // "baixo/alto" style labels can embed both words; low wins by order
        assert_eq!(band_from_label("baixo para alto"), Some(RiskBand::Low));
        assert_eq!(band_from_label("indefinido"), None);
    }

    #[test]
    fn bulk_records_without_probability_land_in_low() {
        let record = json!({ "clientId": "user-1", "primary_risk_factor": "skip_rate" });
        let customer = classify_customer(&record);
        assert_eq!(customer.probability, 0.0);
        assert_eq!(customer.band, RiskBand::Low);
        assert_eq!(customer.risk_factor, translate::NO_RISK_FACTOR);
    }

    #[test]
    fn low_band_suppresses_risk_factor() {
        let record = json!({ "probability": 0.2, "primary_risk_factor": "skip_rate" });
        let customer = classify_customer(&record);
        assert_eq!(customer.band, RiskBand::Low);
        assert_eq!(customer.risk_factor, translate::NO_RISK_FACTOR);
    }

    #[test]
    fn high_band_translates_risk_factor() {
        let record = json!({
            "userId": 42,
            "churn_probability": "0.72",
            "primaryRiskFactor": "num__skip_rate",
            "retention_factor": "offline_listening"
        });
        let customer = classify_customer(&record);
        assert_eq!(customer.client_id, "42");
        assert_eq!(customer.band, RiskBand::High);
        assert_eq!(customer.risk_factor, "Taxa de Pulagem");
        assert_eq!(customer.retention_factor, "Uso Offline");
    }

    #[test]
    fn moderate_customer_without_factor_gets_sentinel() {
        let record = json!({ "probability": 0.5 });
        let customer = classify_customer(&record);
        assert_eq!(customer.band, RiskBand::Moderate);
        assert_eq!(customer.risk_factor, translate::NO_RISK_FACTOR);
        assert_eq!(customer.retention_factor, translate::NO_RETENTION_FACTOR);
    }

    #[test]
    fn prediction_prefers_the_label() {
        let result = json!({ "probability": 0.2, "risk_level": "HIGH_RISK" });
        let prediction = classify_prediction(&result, None);
        assert_eq!(prediction.band, RiskBand::High);
        assert_eq!(prediction.probability, 0.2);
    }

    #[test]
    fn prediction_without_signal_is_unknown() {
        let result = json!({ "risk_level": "???" });
        let prediction = classify_prediction(&result, None);
        assert_eq!(prediction.band, RiskBand::Unknown);
        assert_eq!(prediction.probability, 0.0);
        assert_eq!(prediction.risk_factor, translate::NO_RISK_FACTOR);
    }

    #[test]
    fn prediction_reads_the_diagnosis_block() {
        let result = json!({
            "churn_probability": 0.65,
            "ai_diagnosis": {
                "primary_risk_factor": "cat__ad_intensity",
                "primary_retention_factor": "fav_genre",
                "suggested_action": "Ofertar plano sem anúncios"
            }
        });
        let prediction = classify_prediction(&result, None);
        assert_eq!(prediction.band, RiskBand::High);
        assert_eq!(prediction.risk_factor, "Intensidade de Anúncios");
        assert_eq!(prediction.retention_factor, "Gênero Favorito");
        assert_eq!(
            prediction.suggested_action.as_deref(),
            Some("Ofertar plano sem anúncios")
        );
    }

    #[test]
    fn low_prediction_suppresses_api_risk_factor() {
        let result = json!({ "probability": 0.1, "primary_risk_factor": "skip_rate" });
        let prediction = classify_prediction(&result, None);
        assert_eq!(prediction.band, RiskBand::Low);
        assert_eq!(prediction.risk_factor, translate::NO_RISK_FACTOR);
    }

    #[test]
    fn offline_profiles_fall_back_to_offline_retention() {
        let result = json!({ "probability": 0.5 });
        let profile = json!({ "user_id": "u-1", "offline_listening": true });
        let prediction = classify_prediction(&result, Some(&profile));
        assert_eq!(prediction.retention_factor, "Uso Offline");

        let profile = json!({ "user_id": "u-1", "offline_listening": false });
        let prediction = classify_prediction(&result, Some(&profile));
        assert_eq!(prediction.retention_factor, translate::NO_RETENTION_FACTOR);
    }
}
