use serde_json::Value;

use crate::models::{ChurnDistribution, DashboardSummary, FeatureWeight, RiskFactorCount};
use crate::resolve;

/// Normalizes the loose `/dashboard/metrics` payload into the canonical
/// summary. Every field degrades to a neutral value instead of failing;
/// `global_churn_rate` arrives as a percentage already.
pub fn normalize_metrics(payload: &Value) -> DashboardSummary {
    DashboardSummary {
        total_customers: count_field(payload, "total_customers"),
        global_churn_rate: number_field(payload, "global_churn_rate"),
        customers_at_risk: count_field(payload, "customers_at_risk"),
        revenue_at_risk: number_field(payload, "revenue_at_risk"),
        model_accuracy_pct: accuracy_pct(payload.get("model_accuracy")),
        churn_distribution: distribution(payload.get("churn_distribution")),
        feature_importance: feature_weights(payload.get("feature_importance")),
        risk_factors: risk_factor_counts(payload.get("risk_factors")),
    }
}

fn number_field(payload: &Value, key: &str) -> f64 {
    payload
        .get(key)
        .and_then(resolve::safe_number)
        .unwrap_or(0.0)
}

fn count_field(payload: &Value, key: &str) -> u64 {
    number_field(payload, key).max(0.0) as u64
}

/// Backends disagree on the accuracy scale: values above 1 are taken as
/// percentages already, values in [0, 1] as fractions.
fn accuracy_pct(value: Option<&Value>) -> f64 {
    let Some(accuracy) = value.and_then(resolve::safe_number) else {
        return 0.0;
    };
    if accuracy > 1.0 {
        accuracy
    } else {
        accuracy * 100.0
    }
}

/// Only an exact `[stay, churn]` pair is usable; any other shape means the
/// distribution is not available yet.
fn distribution(value: Option<&Value>) -> Option<ChurnDistribution> {
    let items = value.and_then(Value::as_array)?;
    if items.len() != 2 {
        return None;
    }
    Some(ChurnDistribution {
        will_stay: resolve::safe_number(&items[0]).unwrap_or(0.0),
        will_churn: resolve::safe_number(&items[1]).unwrap_or(0.0),
    })
}

fn feature_weights(value: Option<&Value>) -> Vec<FeatureWeight> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").and_then(Value::as_str)?;
            Some(FeatureWeight {
                name: name.to_string(),
                weight: item
                    .get("value")
                    .and_then(resolve::safe_number)
                    .unwrap_or(0.0),
            })
        })
        .collect()
}

fn risk_factor_counts(value: Option<&Value>) -> Vec<RiskFactorCount> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").and_then(Value::as_str)?;
            if name.is_empty() {
                return None;
            }
            Some(RiskFactorCount {
                name: name.to_string(),
                count: item
                    .get("count")
                    .and_then(resolve::safe_number)
                    .unwrap_or(0.0)
                    .max(0.0) as u64,
            })
        })
        .collect()
}
