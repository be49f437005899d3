use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::{OtpChallenge, Role, User};
use crate::entities::{
    BookingType, CurrentRide, Location, PaymentMethod, PaymentReceipt, Ride, RideId, RideStatus,
    TripType, Vehicle,
};
use crate::error::Error;
use crate::store::RideState;

#[async_trait]
pub trait RideAPI {
    async fn state(&self) -> Result<RideState, Error>;
    async fn current_ride(&self) -> Result<Option<CurrentRide>, Error>;
    async fn rides(&self) -> Result<Vec<Ride>, Error>;
    async fn past_rides(&self) -> Result<Vec<Ride>, Error>;
    async fn vehicles(&self) -> Result<Vec<Vehicle>, Error>;
    async fn saved_places(&self) -> Result<Vec<Location>, Error>;

    async fn set_booking_type(&self, booking_type: BookingType) -> Result<RideState, Error>;
    async fn set_trip_type(&self, trip_type: TripType) -> Result<RideState, Error>;
    async fn set_pickup(&self, location: Location) -> Result<RideState, Error>;
    async fn set_dropoff(&self, location: Location) -> Result<RideState, Error>;
    async fn set_date_time(&self, date: String, time: String) -> Result<RideState, Error>;
    async fn set_passengers(&self, count: u32) -> Result<RideState, Error>;
    async fn set_vehicle(&self, vehicle_id: String) -> Result<RideState, Error>;
    async fn set_payment_method(&self, method: PaymentMethod) -> Result<RideState, Error>;

    async fn confirm_booking(&self, rating: Option<u8>, review: Option<String>)
        -> Result<Ride, Error>;
    async fn complete_ride(&self, rating: Option<u8>, review: Option<String>)
        -> Result<Ride, Error>;
    async fn update_ride_status(&self, ride_id: RideId, status: RideStatus) -> Result<Ride, Error>;
    async fn reset_ride(&self) -> Result<RideState, Error>;
}

#[async_trait]
pub trait PaymentAPI {
    async fn pay_advance(&self) -> Result<PaymentReceipt, Error>;
    async fn pay_remaining(&self) -> Result<PaymentReceipt, Error>;
}

#[async_trait]
pub trait DispatchAPI {
    async fn find_driver(&self) -> Result<Ride, Error>;
    async fn cancel_driver_search(&self) -> Result<bool, Error>;
}

#[async_trait]
pub trait OnboardingAPI {
    async fn send_otp(&self, phone: String, role: Role) -> Result<OtpChallenge, Error>;
    async fn verify_otp(&self, phone: String, code: String) -> Result<User, Error>;
}

pub trait API: RideAPI + PaymentAPI + DispatchAPI + OnboardingAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
