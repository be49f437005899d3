mod dispatch_api;
mod onboarding_api;
mod payment_api;
mod ride_api;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    api::API,
    auth::OtpChallenge,
    clock::Clock,
    config::{Config, SimulationConfig},
    entities::Ride,
    error::{invalid_state_error, Error},
    simulation::Cancellation,
    store::RideStore,
};

pub struct Engine {
    store: RideStore,
    clock: Arc<dyn Clock>,
    simulation: SimulationConfig,
    challenges: Mutex<HashMap<String, OtpChallenge>>,
    search: Mutex<Option<Cancellation>>,
    payment: Mutex<()>,
    shutdown: Cancellation,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        tracing::info!(fares = ?config.fares, simulation = ?config.simulation, "starting engine");

        Self {
            store: RideStore::new(clock.clone(), config.fares.clone()),
            clock,
            simulation: config.simulation.clone(),
            challenges: Mutex::new(HashMap::new()),
            search: Mutex::new(None),
            payment: Mutex::new(()),
            shutdown: Cancellation::new(),
        }
    }

    /// Cancels every in-flight simulated task and refuses new ones.
    #[tracing::instrument(name = "Engine::shutdown", skip_all)]
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        if let Some(search) = self.search.lock().await.take() {
            search.cancel();
        }
    }

    async fn active_ride(&self) -> Result<Ride, Error> {
        self.store
            .snapshot()
            .await
            .active_ride()
            .cloned()
            .ok_or_else(invalid_state_error)
    }
}

impl API for Engine {}
