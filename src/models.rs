use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
    Unknown,
}

impl RiskBand {
    pub fn status_label(self) -> &'static str {
        match self {
            RiskBand::Low => "Baixo Risco de Cancelamento",
            RiskBand::Moderate => "Risco Moderado de Cancelamento",
            RiskBand::High => "Alto Risco de Cancelamento",
            RiskBand::Unknown => "Risco Indefinido",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            RiskBand::Low => "BAIXO RISCO",
            RiskBand::Moderate => "RISCO MODERADO",
            RiskBand::High => "ALTO RISCO",
            RiskBand::Unknown => "INDEFINIDO",
        }
    }

    pub fn range_label(self) -> &'static str {
        match self {
            RiskBand::Low => "0–40% → Baixo Risco",
            RiskBand::Moderate => "40–60% → Risco Moderado",
            RiskBand::High => "60–100% → Alto Risco",
            RiskBand::Unknown => "Faixa não disponível",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    Checking,
    Online,
    Degraded,
    Offline,
}

impl ConnectivityState {
    pub fn badge(self) -> &'static str {
        match self {
            ConnectivityState::Checking => "⏳ Verificando...",
            ConnectivityState::Online => "🟢 API Online",
            ConnectivityState::Degraded => "🟡 API Degradada",
            ConnectivityState::Offline => "🔴 API Offline",
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, ConnectivityState::Online)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedCustomer {
    pub client_id: String,
    pub probability: f64,
    pub band: RiskBand,
    pub risk_factor: String,
    pub retention_factor: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub probability: f64,
    pub band: RiskBand,
    pub risk_factor: String,
    pub retention_factor: String,
    pub suggested_action: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChurnDistribution {
    pub will_stay: f64,
    pub will_churn: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureWeight {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskFactorCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_customers: u64,
    pub global_churn_rate: f64,
    pub customers_at_risk: u64,
    pub revenue_at_risk: f64,
    pub model_accuracy_pct: f64,
    pub churn_distribution: Option<ChurnDistribution>,
    pub feature_importance: Vec<FeatureWeight>,
    pub risk_factors: Vec<RiskFactorCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskFactorStat {
    pub display_name: String,
    pub count: u64,
    pub total_considered: u64,
}

impl RiskFactorStat {
    pub fn share(&self) -> f64 {
        if self.total_considered == 0 {
            0.0
        } else {
            self.count as f64 / self.total_considered as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub refresh_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub connectivity: ConnectivityState,
    pub summary: Option<DashboardSummary>,
    pub customers: Vec<ClassifiedCustomer>,
    pub risk_factors: Vec<RiskFactorStat>,
}
