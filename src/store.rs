//! Ride draft store.
//!
//! [`RideState`] is a plain value: every operation is an [`Action`] applied by
//! [`RideState::reduce`], which returns the next snapshot and leaves the input
//! untouched. Operations never fail; when the ride they target is missing the
//! snapshot comes back unchanged. [`RideStore`] is the shared handle the engine
//! owns, serializing dispatches behind a mutex and stamping them with the
//! injected clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::entities::{
    BookingType, CurrentRide, Driver, FareConfig, Location, PaymentMethod, PaymentStatus, Ride,
    RideDraft, RideId, RideStatus, TripType, Vehicle,
};
use crate::error::Error;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RideState {
    pub current_ride: Option<CurrentRide>,
    pub rides: Vec<Ride>,
    pub past_rides: Vec<Ride>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetBookingType(BookingType),
    SetTripType(TripType),
    SetPickup(Location),
    SetDropoff(Location),
    SetDateTime { date: String, time: String },
    SetPassengers(u32),
    SetVehicle(Vehicle),
    SetPaymentMethod(PaymentMethod),
    ConfirmBooking {
        rating: Option<u8>,
        review: Option<String>,
    },
    CompleteRide {
        rating: Option<u8>,
        review: Option<String>,
    },
    UpdateRideStatus {
        ride_id: RideId,
        status: RideStatus,
    },
    AssignDriver(Driver),
    SetPaymentStatus(PaymentStatus),
    ResetRide,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetBookingType(_) => "set_booking_type",
            Self::SetTripType(_) => "set_trip_type",
            Self::SetPickup(_) => "set_pickup",
            Self::SetDropoff(_) => "set_dropoff",
            Self::SetDateTime { .. } => "set_date_time",
            Self::SetPassengers(_) => "set_passengers",
            Self::SetVehicle(_) => "set_vehicle",
            Self::SetPaymentMethod(_) => "set_payment_method",
            Self::ConfirmBooking { .. } => "confirm_booking",
            Self::CompleteRide { .. } => "complete_ride",
            Self::UpdateRideStatus { .. } => "update_ride_status",
            Self::AssignDriver(_) => "assign_driver",
            Self::SetPaymentStatus(_) => "set_payment_status",
            Self::ResetRide => "reset_ride",
        }
    }
}

impl RideState {
    pub fn reduce(&self, action: Action, now: DateTime<Utc>, fares: &FareConfig) -> RideState {
        let mut next = self.clone();
        next.apply(action, now, fares);
        next
    }

    pub fn find_ride(&self, id: &RideId) -> Option<&Ride> {
        self.rides
            .iter()
            .chain(self.past_rides.iter())
            .find(|ride| &ride.id == id)
    }

    /// The confirmed ride currently in progress, if any.
    pub fn active_ride(&self) -> Option<&Ride> {
        self.current_ride.as_ref().and_then(CurrentRide::confirmed)
    }

    fn apply(&mut self, action: Action, now: DateTime<Utc>, fares: &FareConfig) {
        match action {
            Action::SetBookingType(booking_type) => {
                self.details_mut().booking_type = Some(booking_type)
            }
            Action::SetTripType(trip_type) => self.details_mut().trip_type = Some(trip_type),
            Action::SetPickup(location) => self.details_mut().pickup = Some(location),
            Action::SetDropoff(location) => self.details_mut().dropoff = Some(location),
            Action::SetDateTime { date, time } => {
                let details = self.details_mut();
                details.date = Some(date);
                details.time = Some(time);
            }
            Action::SetPassengers(count) => self.details_mut().passengers = Some(count),
            Action::SetVehicle(vehicle) => self.details_mut().select_vehicle(vehicle, fares),
            Action::SetPaymentMethod(method) => self.details_mut().payment_method = Some(method),
            Action::ConfirmBooking { rating, review } => self.confirm_booking(rating, review, now),
            Action::CompleteRide { rating, review } => self.complete_ride(rating, review, now),
            Action::UpdateRideStatus { ride_id, status } => {
                self.update_ride_status(&ride_id, status)
            }
            Action::AssignDriver(driver) => self.patch_active_ride(|ride| {
                ride.driver = Some(driver.clone());
            }),
            Action::SetPaymentStatus(status) => self.patch_active_ride(|ride| {
                ride.payment_status = status;
            }),
            Action::ResetRide => self.current_ride = None,
        }
    }

    fn details_mut(&mut self) -> &mut RideDraft {
        self.current_ride
            .get_or_insert_with(|| CurrentRide::Draft(RideDraft::default()))
            .details_mut()
    }

    fn contains_ride(&self, id: &RideId) -> bool {
        self.find_ride(id).is_some()
    }

    fn next_ride_id(&self, now: DateTime<Utc>) -> RideId {
        let base = RideId::from_timestamp(now);

        let mut id = base.clone();
        let mut suffix = 1;
        while self.contains_ride(&id) {
            id = base.with_suffix(suffix);
            suffix += 1;
        }

        id
    }

    fn confirm_booking(&mut self, rating: Option<u8>, review: Option<String>, now: DateTime<Utc>) {
        let draft = match &self.current_ride {
            Some(CurrentRide::Draft(draft)) => draft.clone(),
            Some(CurrentRide::Confirmed(ride)) => {
                tracing::debug!(ride_id = %ride.id, "booking already confirmed, ignoring");
                return;
            }
            None => {
                tracing::debug!("no ride draft to confirm, ignoring");
                return;
            }
        };

        let ride = Ride::confirm(self.next_ride_id(now), draft, rating, review, now);

        tracing::info!(ride_id = %ride.id, "booking confirmed");

        self.rides.push(ride.clone());
        self.current_ride = Some(CurrentRide::Confirmed(ride));
    }

    fn complete_ride(&mut self, rating: Option<u8>, review: Option<String>, now: DateTime<Utc>) {
        let mut ride = match self.active_ride() {
            Some(ride) => ride.clone(),
            None => {
                tracing::debug!("no confirmed ride to complete, ignoring");
                return;
            }
        };

        if let Err(err) = ride.complete(rating, review, now) {
            tracing::warn!(ride_id = %ride.id, status = %ride.status.name(), "cannot complete ride: {}", err);
            return;
        }

        tracing::info!(ride_id = %ride.id, "ride completed");

        self.rides.retain(|r| r.id != ride.id);
        self.past_rides.push(ride);
        self.current_ride = None;
    }

    fn update_ride_status(&mut self, ride_id: &RideId, status: RideStatus) {
        let ride = match self.rides.iter_mut().find(|ride| &ride.id == ride_id) {
            Some(ride) => ride,
            None => {
                tracing::debug!(%ride_id, "no ride with this id, ignoring status update");
                return;
            }
        };

        if let Err(err) = ride.transition(status) {
            tracing::warn!(%ride_id, from = %ride.status.name(), to = %status.name(), "rejected status update: {}", err);
            return;
        }

        if let Some(current) = self.current_ride.as_mut().and_then(CurrentRide::confirmed_mut) {
            if &current.id == ride_id {
                current.status = status;
            }
        }
    }

    fn patch_active_ride<F>(&mut self, patch: F)
    where
        F: Fn(&mut Ride),
    {
        let id = match self.current_ride.as_mut().and_then(CurrentRide::confirmed_mut) {
            Some(ride) => {
                patch(ride);
                ride.id.clone()
            }
            None => {
                tracing::debug!("no confirmed ride to patch, ignoring");
                return;
            }
        };

        if let Some(ride) = self.rides.iter_mut().find(|ride| ride.id == id) {
            patch(ride);
        }
    }
}

pub struct RideStore {
    state: Mutex<RideState>,
    clock: Arc<dyn Clock>,
    fares: FareConfig,
}

impl RideStore {
    pub fn new(clock: Arc<dyn Clock>, fares: FareConfig) -> Self {
        Self {
            state: Mutex::new(RideState::default()),
            clock,
            fares,
        }
    }

    #[tracing::instrument(name = "RideStore::dispatch", skip_all, fields(action = action.name()))]
    pub async fn dispatch(&self, action: Action) -> RideState {
        let mut state = self.state.lock().await;

        let next = state.reduce(action, self.clock.now(), &self.fares);
        *state = next.clone();

        next
    }

    /// Applies `action` only if `check` accepts the state it would apply to.
    /// Both run under the same lock, so nothing can slip in between.
    #[tracing::instrument(name = "RideStore::dispatch_if", skip_all, fields(action = action.name()))]
    pub async fn dispatch_if<F>(&self, action: Action, check: F) -> Result<RideState, Error>
    where
        F: FnOnce(&RideState) -> Result<(), Error>,
    {
        let mut state = self.state.lock().await;

        check(&state)?;

        let next = state.reduce(action, self.clock.now(), &self.fares);
        *state = next.clone();

        Ok(next)
    }

    pub async fn snapshot(&self) -> RideState {
        self.state.lock().await.clone()
    }

    pub async fn set_booking_type(&self, booking_type: BookingType) -> RideState {
        self.dispatch(Action::SetBookingType(booking_type)).await
    }

    pub async fn set_trip_type(&self, trip_type: TripType) -> RideState {
        self.dispatch(Action::SetTripType(trip_type)).await
    }

    pub async fn set_pickup(&self, location: Location) -> RideState {
        self.dispatch(Action::SetPickup(location)).await
    }

    pub async fn set_dropoff(&self, location: Location) -> RideState {
        self.dispatch(Action::SetDropoff(location)).await
    }

    pub async fn set_date_time(&self, date: String, time: String) -> RideState {
        self.dispatch(Action::SetDateTime { date, time }).await
    }

    pub async fn set_passengers(&self, count: u32) -> RideState {
        self.dispatch(Action::SetPassengers(count)).await
    }

    pub async fn set_vehicle(&self, vehicle: Vehicle) -> RideState {
        self.dispatch(Action::SetVehicle(vehicle)).await
    }

    pub async fn set_payment_method(&self, method: PaymentMethod) -> RideState {
        self.dispatch(Action::SetPaymentMethod(method)).await
    }

    pub async fn confirm_booking(&self, rating: Option<u8>, review: Option<String>) -> RideState {
        self.dispatch(Action::ConfirmBooking { rating, review }).await
    }

    pub async fn complete_ride(&self, rating: Option<u8>, review: Option<String>) -> RideState {
        self.dispatch(Action::CompleteRide { rating, review }).await
    }

    pub async fn update_ride_status(&self, ride_id: RideId, status: RideStatus) -> RideState {
        self.dispatch(Action::UpdateRideStatus { ride_id, status }).await
    }

    pub async fn assign_driver(&self, driver: Driver) -> RideState {
        self.dispatch(Action::AssignDriver(driver)).await
    }

    pub async fn set_payment_status(&self, status: PaymentStatus) -> RideState {
        self.dispatch(Action::SetPaymentStatus(status)).await
    }

    pub async fn reset_ride(&self) -> RideState {
        self.dispatch(Action::ResetRide).await
    }
}
