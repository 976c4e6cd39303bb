use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregate;
use crate::models::{ClassifiedCustomer, ConnectivityState, Snapshot};
use crate::risk;
use crate::summary;
use crate::upstream::{Upstream, UpstreamResult};

pub const CLIENT_PAGE_SIZE: u32 = 1000;

/// Holds the connectivity state machine and the last snapshot. Derived data
/// only exists while the state is ONLINE; every transition into any other
/// state clears the snapshot and both selections.
pub struct Engine<U> {
    upstream: U,
    state: ConnectivityState,
    snapshot: Snapshot,
    selected_factor: Option<String>,
    selected_client: Option<String>,
}

impl<U: Upstream> Engine<U> {
    pub fn new(upstream: U) -> Self {
        Self {
            upstream,
            state: ConnectivityState::Checking,
            snapshot: empty_snapshot(ConnectivityState::Checking),
            selected_factor: None,
            selected_client: None,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn select_factor(&mut self, factor: Option<String>) {
        self.selected_factor = factor;
    }

    pub fn selected_factor(&self) -> Option<&str> {
        self.selected_factor.as_deref()
    }

    pub fn select_client(&mut self, client_id: Option<String>) {
        self.selected_client = client_id;
    }

    /// The selected customer, or the first classified one as a sample.
    /// Nothing is ever returned while not ONLINE.
    pub fn selected_customer(&self) -> Option<&ClassifiedCustomer> {
        if !self.state.is_online() {
            return None;
        }
        let customers = &self.snapshot.customers;
        match &self.selected_client {
            Some(id) => customers
                .iter()
                .find(|customer| &customer.client_id == id)
                .or_else(|| customers.first()),
            None => customers.first(),
        }
    }

    /// Probes the health endpoint without loading data. The outcome drives
    /// the state machine, so a failed probe clears whatever the last refresh
    /// produced.
    pub fn probe(&mut self) -> ConnectivityState {
        self.transition(ConnectivityState::Checking);

        let next = match self.upstream.health() {
            Ok(health) if health.is_up() => ConnectivityState::Online,
            Ok(health) => {
                warn!(status = ?health.status, "health probe resolved without UP");
                ConnectivityState::Degraded
            }
            Err(err) => {
                warn!(error = %err, "health probe failed");
                ConnectivityState::Offline
            }
        };
        self.transition(next);
        self.state
    }

    /// One full refresh cycle: probe, then load and classify live data only
    /// if the probe landed ONLINE. Any fetch failure after a healthy probe
    /// drops straight to OFFLINE.
    pub fn refresh(&mut self) -> ConnectivityState {
        if self.probe().is_online() {
            if let Err(err) = self.load_live_data() {
                warn!(error = %err, "dropping to offline after fetch failure");
                self.transition(ConnectivityState::Offline);
            }
        }
        self.state
    }

    pub fn predict(&self, profile: &Value) -> UpstreamResult<Value> {
        self.upstream.predict(profile)
    }

    fn load_live_data(&mut self) -> UpstreamResult<()> {
        let metrics = self.upstream.dashboard_metrics()?;
        let clients = self.upstream.clients(0, CLIENT_PAGE_SIZE)?;

        let summary = summary::normalize_metrics(&metrics);
        let customers: Vec<ClassifiedCustomer> =
            clients.iter().map(risk::classify_customer).collect();
        let stats = aggregate::aggregate(&summary.risk_factors, &customers);

        info!(
            customers = customers.len(),
            factors = stats.len(),
            "refresh loaded live data"
        );

        self.snapshot = Snapshot {
            refresh_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            connectivity: self.state,
            summary: Some(summary),
            customers,
            risk_factors: stats,
        };
        Ok(())
    }

    fn transition(&mut self, next: ConnectivityState) {
        if next != self.state {
            info!(from = ?self.state, to = ?next, "connectivity transition");
        }
        self.state = next;
        if next.is_online() {
            self.snapshot.connectivity = next;
        } else {
            self.snapshot = empty_snapshot(next);
            self.selected_factor = None;
            self.selected_client = None;
        }
    }
}

fn empty_snapshot(connectivity: ConnectivityState) -> Snapshot {
    Snapshot {
        refresh_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        connectivity,
        summary: None,
        customers: Vec::new(),
        risk_factors: Vec::new(),
    }
}
