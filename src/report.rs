use std::cmp::Ordering;
use std::fmt::Write;

use crate::models::{ClassifiedCustomer, FeatureWeight, Prediction, Snapshot};
use crate::translate;

const OFFLINE_BANNER: &str =
    "⚠️ API indisponível: nenhum dado será exibido enquanto o status não for ONLINE.";
const OFFLINE_BLOCK: &str = "Dados indisponíveis (API Offline)";
const NO_MODEL_INTERPRETABILITY: &str = "A versão atual do modelo utiliza Regressão Logística com SMOTE, que não fornece interpretabilidade nativa de features. Esta funcionalidade requer algoritmos com suporte a feature importance (ex: XGBoost, Random Forest).";

/// pt-BR currency: '.' groups the thousands, ',' separates the cents.
pub fn format_brl(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::new();
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac:02}")
}

pub fn build_report(snapshot: &Snapshot, selected_factor: Option<&str>) -> String {
    let online = snapshot.connectivity.is_online();
    let data = if online { snapshot.summary.as_ref() } else { None };

    let mut output = String::new();
    let _ = writeln!(output, "# ChurnInsight");
    let _ = writeln!(output, "Dashboard de Retenção de Clientes (Spotify Edition)");
    let _ = writeln!(output);
    let _ = writeln!(output, "Status da API: {}", snapshot.connectivity.badge());
    let _ = writeln!(
        output,
        "Atualizado em {}",
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if !online {
        let _ = writeln!(output);
        let _ = writeln!(output, "{}", OFFLINE_BANNER);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Indicadores");
    match data {
        Some(summary) => {
            let _ = writeln!(output, "- Total de Clientes: {}", summary.total_customers);
            let _ = writeln!(
                output,
                "- Clientes Prioritários para Ação: {:.1}% (Top 25% da base com maior instabilidade)",
                summary.global_churn_rate
            );
            let _ = writeln!(output, "- Clientes em Risco: {}", summary.customers_at_risk);
            let _ = writeln!(
                output,
                "- Receita Potencial em Risco (Est.): {}",
                format_brl(summary.revenue_at_risk)
            );
            let _ = writeln!(
                output,
                "- Precisão do Modelo: {:.1}%",
                summary.model_accuracy_pct
            );
        }
        None => {
            let _ = writeln!(output, "- Total de Clientes: —");
            let _ = writeln!(output, "- Clientes Prioritários para Ação: —");
            let _ = writeln!(output, "- Clientes em Risco: —");
            let _ = writeln!(output, "- Receita Potencial em Risco (Est.): —");
            let _ = writeln!(output, "- Precisão do Modelo: —");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Distribuição da Classificação do Modelo");
    if !online {
        let _ = writeln!(output, "{}", OFFLINE_BLOCK);
    } else {
        match data.and_then(|summary| summary.churn_distribution.as_ref()) {
            Some(dist) => {
                let total = dist.will_stay + dist.will_churn;
                let share = |part: f64| if total > 0.0 { part / total * 100.0 } else { 0.0 };
                let _ = writeln!(
                    output,
                    "- Vai ficar: {:.0} ({:.1}%)",
                    dist.will_stay,
                    share(dist.will_stay)
                );
                let _ = writeln!(
                    output,
                    "- Vai cancelar: {:.0} ({:.1}%)",
                    dist.will_churn,
                    share(dist.will_churn)
                );
            }
            None => {
                let _ = writeln!(output, "Sem dados de distribuição disponíveis no momento.");
                let _ = writeln!(output, "(O backend ainda não forneceu churn_distribution.)");
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Importância das Variáveis (Top 10)");
    let _ = writeln!(output, "Variáveis com maior peso na predição do modelo");
    if !online {
        let _ = writeln!(output, "{}", OFFLINE_BLOCK);
    } else {
        let weights: &[FeatureWeight] = data
            .map(|summary| summary.feature_importance.as_slice())
            .unwrap_or(&[]);
        if weights.is_empty() {
            let _ = writeln!(output, "{}", NO_MODEL_INTERPRETABILITY);
        } else {
            let mut ranked: Vec<&FeatureWeight> = weights.iter().collect();
            ranked.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
            for feature in ranked.iter().take(10) {
                let _ = writeln!(
                    output,
                    "- {}: {:.4}",
                    translate::translate(&feature.name),
                    feature.weight
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Principais Fatores de Risco");
    let _ = writeln!(output, "Fatores mais frequentes entre os clientes prioritários");
    if !online {
        let _ = writeln!(output, "{}", OFFLINE_BLOCK);
    } else if snapshot.risk_factors.is_empty() {
        let _ = writeln!(output, "Nenhum fator de risco detectado nos dados carregados.");
    } else {
        for stat in snapshot.risk_factors.iter() {
            let _ = writeln!(
                output,
                "- {}: {} usuários ({:.1}%)",
                stat.display_name,
                stat.count,
                stat.share()
            );
        }
    }

    if online {
        if let Some(name) = selected_factor {
            let stat = snapshot
                .risk_factors
                .iter()
                .find(|stat| stat.display_name == name);
            if let (Some(stat), Some(action)) = (stat, translate::recommended_action(name)) {
                let _ = writeln!(output);
                let _ = writeln!(output, "### {}", stat.display_name);
                let _ = writeln!(output, "{} clientes impactados", stat.count);
                let _ = writeln!(output, "\"Ação Recomendada: {}\"", action);
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Análise Detalhada (Amostra)");
        if let Some(customer) = snapshot.customers.first() {
            output.push_str(&build_diagnosis_block(customer));
        }
    }

    output
}

pub fn build_diagnosis_block(customer: &ClassifiedCustomer) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Diagnóstico");
    let _ = writeln!(output, "ID do Cliente: {}", customer.client_id);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Probabilidade de Churn: {:.1}%",
        customer.probability * 100.0
    );
    let _ = writeln!(output, "{}", customer.band.range_label());
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Status: {} [{}]",
        customer.band.status_label(),
        customer.band.badge()
    );
    let _ = writeln!(output, "Fator de Risco: {}", customer.risk_factor);
    let _ = writeln!(output, "Fator de Retenção: {}", customer.retention_factor);
    output
}

pub fn build_prediction_block(prediction: &Prediction, client_label: &str) -> String {
    let mut output = String::new();
    // display cap only, the classified probability stays untouched
    let percent = (prediction.probability * 100.0).min(99.9);
    let _ = writeln!(output, "Diagnóstico: {}", client_label);
    let _ = writeln!(output);
    let _ = writeln!(output, "Probabilidade de Churn: {:.1}%", percent);
    let _ = writeln!(output, "{}", prediction.band.range_label());
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Status: {} [{}]",
        prediction.band.status_label(),
        prediction.band.badge()
    );
    let _ = writeln!(output, "Fator de Risco: {}", prediction.risk_factor);
    let _ = writeln!(output, "Fator de Retenção: {}", prediction.retention_factor);
    if let Some(action) = &prediction.suggested_action {
        let _ = writeln!(output, "Recomendação: {}", action);
    }
    output
}
