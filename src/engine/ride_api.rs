use super::Engine;

use async_trait::async_trait;

use crate::{
    api::RideAPI,
    entities::{
        BookingType, CurrentRide, Location, PaymentMethod, PaymentStatus, Ride, RideId,
        RideStatus, TripType, Vehicle,
    },
    error::{invalid_input_error, invalid_invocation_error, invalid_state_error, Error},
    fixtures::{self, MAX_PASSENGERS},
    store::{Action, RideState},
};

fn validate_rating(rating: Option<u8>) -> Result<(), Error> {
    match rating {
        Some(rating) if !(1..=5).contains(&rating) => Err(invalid_input_error()),
        _ => Ok(()),
    }
}

#[async_trait]
impl RideAPI for Engine {
    async fn state(&self) -> Result<RideState, Error> {
        Ok(self.store.snapshot().await)
    }

    async fn current_ride(&self) -> Result<Option<CurrentRide>, Error> {
        Ok(self.store.snapshot().await.current_ride)
    }

    async fn rides(&self) -> Result<Vec<Ride>, Error> {
        Ok(self.store.snapshot().await.rides)
    }

    async fn past_rides(&self) -> Result<Vec<Ride>, Error> {
        Ok(self.store.snapshot().await.past_rides)
    }

    async fn vehicles(&self) -> Result<Vec<Vehicle>, Error> {
        Ok(fixtures::vehicles())
    }

    async fn saved_places(&self) -> Result<Vec<Location>, Error> {
        Ok(fixtures::saved_places())
    }

    #[tracing::instrument(skip(self))]
    async fn set_booking_type(&self, booking_type: BookingType) -> Result<RideState, Error> {
        Ok(self.store.set_booking_type(booking_type).await)
    }

    #[tracing::instrument(skip(self))]
    async fn set_trip_type(&self, trip_type: TripType) -> Result<RideState, Error> {
        Ok(self.store.set_trip_type(trip_type).await)
    }

    #[tracing::instrument(skip(self))]
    async fn set_pickup(&self, location: Location) -> Result<RideState, Error> {
        Ok(self.store.set_pickup(location).await)
    }

    #[tracing::instrument(skip(self))]
    async fn set_dropoff(&self, location: Location) -> Result<RideState, Error> {
        Ok(self.store.set_dropoff(location).await)
    }

    #[tracing::instrument(skip(self))]
    async fn set_date_time(&self, date: String, time: String) -> Result<RideState, Error> {
        if date.trim().is_empty() || time.trim().is_empty() {
            return Err(invalid_input_error());
        }

        Ok(self.store.set_date_time(date, time).await)
    }

    #[tracing::instrument(skip(self))]
    async fn set_passengers(&self, count: u32) -> Result<RideState, Error> {
        if !(1..=MAX_PASSENGERS).contains(&count) {
            tracing::info!("passenger count out of range");
            return Err(invalid_input_error());
        }

        self.store
            .dispatch_if(Action::SetPassengers(count), |state| {
                let vehicle = state
                    .current_ride
                    .as_ref()
                    .and_then(|current| current.details().vehicle.as_ref());

                match vehicle {
                    Some(vehicle) if count > vehicle.capacity => {
                        tracing::info!(capacity = vehicle.capacity, "selected vehicle is too small");
                        Err(invalid_input_error())
                    }
                    _ => Ok(()),
                }
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn set_vehicle(&self, vehicle_id: String) -> Result<RideState, Error> {
        let vehicle = fixtures::find_vehicle(&vehicle_id).ok_or_else(invalid_input_error)?;
        let capacity = vehicle.capacity;

        self.store
            .dispatch_if(Action::SetVehicle(vehicle), |state| {
                if let Some(ride) = state.active_ride() {
                    if ride.payment_status != PaymentStatus::Pending {
                        tracing::info!(ride_id = %ride.id, "fare is locked once payment has started");
                        return Err(invalid_invocation_error());
                    }
                }

                let passengers = state
                    .current_ride
                    .as_ref()
                    .and_then(|current| current.details().passengers);

                match passengers {
                    Some(passengers) if passengers > capacity => {
                        tracing::info!(passengers, "vehicle cannot seat the party");
                        Err(invalid_input_error())
                    }
                    _ => Ok(()),
                }
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn set_payment_method(&self, method: PaymentMethod) -> Result<RideState, Error> {
        Ok(self.store.set_payment_method(method).await)
    }

    #[tracing::instrument(skip(self, review))]
    async fn confirm_booking(
        &self,
        rating: Option<u8>,
        review: Option<String>,
    ) -> Result<Ride, Error> {
        validate_rating(rating)?;

        match self.store.snapshot().await.current_ride {
            Some(CurrentRide::Draft(draft)) if draft.is_bookable() => (),
            Some(CurrentRide::Confirmed(_)) => {
                tracing::info!("booking already confirmed, returning early...");
                return Err(invalid_invocation_error());
            }
            _ => {
                tracing::info!("draft is missing pickup, dropoff or vehicle");
                return Err(invalid_state_error());
            }
        }

        let state = self.store.confirm_booking(rating, review).await;

        state.active_ride().cloned().ok_or_else(invalid_state_error)
    }

    #[tracing::instrument(skip(self, review))]
    async fn complete_ride(
        &self,
        rating: Option<u8>,
        review: Option<String>,
    ) -> Result<Ride, Error> {
        validate_rating(rating)?;

        let ride = self.active_ride().await?;
        ride.status.try_transition(RideStatus::Completed)?;

        let state = self.store.complete_ride(rating, review).await;

        state
            .past_rides
            .iter()
            .rev()
            .find(|r| r.id == ride.id)
            .cloned()
            .ok_or_else(invalid_state_error)
    }

    #[tracing::instrument(skip(self))]
    async fn update_ride_status(&self, ride_id: RideId, status: RideStatus) -> Result<Ride, Error> {
        let snapshot = self.store.snapshot().await;

        let ride = match snapshot.rides.iter().find(|r| r.id == ride_id) {
            Some(ride) => ride,
            None if snapshot.find_ride(&ride_id).is_some() => {
                tracing::info!("ride already moved to past rides");
                return Err(invalid_invocation_error());
            }
            None => return Err(invalid_input_error()),
        };

        ride.status.try_transition(status)?;

        let state = self.store.update_ride_status(ride_id.clone(), status).await;

        state
            .rides
            .iter()
            .find(|r| r.id == ride_id && r.status == status)
            .cloned()
            .ok_or_else(invalid_state_error)
    }

    #[tracing::instrument(skip(self))]
    async fn reset_ride(&self) -> Result<RideState, Error> {
        Ok(self.store.reset_ride().await)
    }
}
