use crate::models::{ClassifiedCustomer, RiskFactorCount, RiskFactorStat};
use crate::translate;

/// Probability floor for the locally computed breakdown. Not the same cut as
/// the 0.40 band boundary.
pub const INCLUSION_SILL: f64 = 0.45;

/// A non-empty upstream breakdown wins outright; the local computation only
/// runs when the backend sent nothing to rank.
pub fn aggregate(
    upstream: &[RiskFactorCount],
    customers: &[ClassifiedCustomer],
) -> Vec<RiskFactorStat> {
    if !upstream.is_empty() {
        return from_upstream(upstream);
    }
    from_customers(customers)
}

fn from_upstream(factors: &[RiskFactorCount]) -> Vec<RiskFactorStat> {
    let total: u64 = factors.iter().map(|factor| factor.count).sum();
    let total = total.max(1);

    let mut stats: Vec<RiskFactorStat> = factors
        .iter()
        .map(|factor| RiskFactorStat {
            display_name: factor.name.clone(),
            count: factor.count,
            total_considered: total,
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

fn from_customers(customers: &[ClassifiedCustomer]) -> Vec<RiskFactorStat> {
    let at_risk: Vec<&ClassifiedCustomer> = customers
        .iter()
        .filter(|customer| customer.probability > INCLUSION_SILL)
        .collect();
    let total = at_risk.len() as u64;

    // Grouped in a Vec so equal counts keep first-seen order after the sort.
    let mut stats: Vec<RiskFactorStat> = Vec::new();
    for customer in at_risk {
        let display = customer.risk_factor.as_str();
        if display == translate::UNKNOWN_FEATURE || display == translate::NO_RISK_FACTOR {
            continue;
        }
        match stats.iter_mut().find(|stat| stat.display_name == display) {
            Some(stat) => stat.count += 1,
            None => stats.push(RiskFactorStat {
                display_name: display.to_string(),
                count: 1,
                total_considered: total,
            }),
        }
    }

    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}
