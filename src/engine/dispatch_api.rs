use super::Engine;

use async_trait::async_trait;

use crate::{
    api::DispatchAPI,
    entities::Ride,
    error::{cancelled_error, invalid_invocation_error, invalid_state_error, Error},
    simulation::{self, Cancellation},
};

#[async_trait]
impl DispatchAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn find_driver(&self) -> Result<Ride, Error> {
        if self.shutdown.is_cancelled() {
            return Err(cancelled_error());
        }

        let ride = self.active_ride().await?;

        if !ride.is_active() || ride.driver.is_some() {
            tracing::info!(ride_id = %ride.id, "ride is not waiting for a driver, returning early...");
            return Err(invalid_invocation_error());
        }

        let token = Cancellation::new();
        if let Some(previous) = self.search.lock().await.replace(token.clone()) {
            tracing::info!("superseding in-flight driver search");
            previous.cancel();
        }

        let class = ride.details.vehicle.as_ref().map(|vehicle| vehicle.class);
        let result = simulation::match_driver(
            &*self.clock,
            self.simulation.matching_delay,
            &token,
            class,
        )
        .await;

        {
            let mut search = self.search.lock().await;
            if search.as_ref().map_or(false, |current| current.same_as(&token)) {
                *search = None;
            }
        }

        let driver = result?;

        match self.store.snapshot().await.active_ride() {
            Some(current) if current.id == ride.id && current.is_active() => (),
            _ => {
                tracing::warn!(ride_id = %ride.id, "ride changed while searching for a driver");
                return Err(invalid_state_error());
            }
        }

        let state = self.store.assign_driver(driver).await;

        state.active_ride().cloned().ok_or_else(invalid_state_error)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_driver_search(&self) -> Result<bool, Error> {
        match self.search.lock().await.take() {
            Some(token) => {
                token.cancel();
                tracing::info!("driver search cancelled");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
