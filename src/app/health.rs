//! Prediction service health probe

use super::App;
use crate::constants::MOCK_PREDICTION_ENV;
use crate::predictor;
use crate::types::HealthStatus;
use eframe::egui;
use std::time::Duration;
use tracing::{debug, info, warn};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub enum HealthState {
    Checking,
    Online(HealthStatus),
    Offline(String),
    /// Mock predictor in use, nothing to probe
    Mock,
}

impl App {
    /// Probe `<base>/health` once, on a plain thread. The result is handed
    /// back through egui temp memory and picked up by `poll_health_result`.
    pub fn check_health(&mut self, ctx: &egui::Context) {
        if self.health_check_started {
            return;
        }
        self.health_check_started = true;

        if std::env::var(MOCK_PREDICTION_ENV).is_ok() {
            self.health = HealthState::Mock;
            return;
        }

        let ctx = ctx.clone();
        let endpoint = self.settings.resolved_endpoint();
        debug!(endpoint = %endpoint, "Starting health check");

        std::thread::spawn(move || {
            let result = predictor::check_health(&endpoint, HEALTH_TIMEOUT);
            ctx.memory_mut(|mem| match result {
                Ok(status) => {
                    info!(
                        status = %status.status,
                        model_loaded = status.model_loaded,
                        device = ?status.device,
                        "Prediction service reachable"
                    );
                    mem.data.insert_temp("health_status".into(), status);
                }
                Err(e) => {
                    warn!(error = %e, "Prediction service health check failed");
                    mem.data.insert_temp("health_error".into(), e.to_string());
                }
            });
            ctx.request_repaint();
        });
    }

    pub fn poll_health_result(&mut self, ctx: &egui::Context) {
        if let Some(status) = ctx.memory(|mem| mem.data.get_temp::<HealthStatus>("health_status".into())) {
            ctx.memory_mut(|mem| mem.data.remove::<HealthStatus>("health_status".into()));
            self.health = HealthState::Online(status);
        }
        if let Some(err) = ctx.memory(|mem| mem.data.get_temp::<String>("health_error".into())) {
            ctx.memory_mut(|mem| mem.data.remove::<String>("health_error".into()));
            self.health = HealthState::Offline(err);
        }
    }
}
