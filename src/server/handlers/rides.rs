use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::{
    BookingType, CurrentRide, Location, PaymentMethod, Ride, RideId, RideStatus, TripType,
};
use crate::error::Error;
use crate::store::RideState;

#[derive(Serialize, Deserialize)]
pub struct BookingTypeParams {
    booking_type: BookingType,
}

#[derive(Serialize, Deserialize)]
pub struct TripTypeParams {
    trip_type: TripType,
}

#[derive(Serialize, Deserialize)]
pub struct DateTimeParams {
    date: String,
    time: String,
}

#[derive(Serialize, Deserialize)]
pub struct PassengersParams {
    passengers: u32,
}

#[derive(Serialize, Deserialize)]
pub struct VehicleParams {
    vehicle_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct PaymentMethodParams {
    payment_method: PaymentMethod,
}

#[derive(Default, Serialize, Deserialize)]
pub struct FeedbackParams {
    #[serde(default)]
    rating: Option<u8>,
    #[serde(default)]
    review: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct StatusParams {
    status: RideStatus,
}

pub async fn state(Extension(api): Extension<DynAPI>) -> Result<Json<RideState>, Error> {
    let state = api.state().await?;

    Ok(state.into())
}

pub async fn current(
    Extension(api): Extension<DynAPI>,
) -> Result<Json<Option<CurrentRide>>, Error> {
    let current = api.current_ride().await?;

    Ok(current.into())
}

pub async fn reset(Extension(api): Extension<DynAPI>) -> Result<Json<RideState>, Error> {
    let state = api.reset_ride().await?;

    Ok(state.into())
}

pub async fn list(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Ride>>, Error> {
    let rides = api.rides().await?;

    Ok(rides.into())
}

pub async fn past(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Ride>>, Error> {
    let rides = api.past_rides().await?;

    Ok(rides.into())
}

pub async fn set_booking_type(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<BookingTypeParams>,
) -> Result<Json<RideState>, Error> {
    let state = api.set_booking_type(params.booking_type).await?;

    Ok(state.into())
}

pub async fn set_trip_type(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<TripTypeParams>,
) -> Result<Json<RideState>, Error> {
    let state = api.set_trip_type(params.trip_type).await?;

    Ok(state.into())
}

pub async fn set_pickup(
    Extension(api): Extension<DynAPI>,
    Json(location): Json<Location>,
) -> Result<Json<RideState>, Error> {
    let state = api.set_pickup(location).await?;

    Ok(state.into())
}

pub async fn set_dropoff(
    Extension(api): Extension<DynAPI>,
    Json(location): Json<Location>,
) -> Result<Json<RideState>, Error> {
    let state = api.set_dropoff(location).await?;

    Ok(state.into())
}

pub async fn set_date_time(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<DateTimeParams>,
) -> Result<Json<RideState>, Error> {
    let state = api.set_date_time(params.date, params.time).await?;

    Ok(state.into())
}

pub async fn set_passengers(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<PassengersParams>,
) -> Result<Json<RideState>, Error> {
    let state = api.set_passengers(params.passengers).await?;

    Ok(state.into())
}

pub async fn set_vehicle(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<VehicleParams>,
) -> Result<Json<RideState>, Error> {
    let state = api.set_vehicle(params.vehicle_id).await?;

    Ok(state.into())
}

pub async fn set_payment_method(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<PaymentMethodParams>,
) -> Result<Json<RideState>, Error> {
    let state = api.set_payment_method(params.payment_method).await?;

    Ok(state.into())
}

pub async fn confirm(
    Extension(api): Extension<DynAPI>,
    params: Option<Json<FeedbackParams>>,
) -> Result<Json<Ride>, Error> {
    let params = params.map(|Json(params)| params).unwrap_or_default();
    let ride = api.confirm_booking(params.rating, params.review).await?;

    Ok(ride.into())
}

pub async fn complete(
    Extension(api): Extension<DynAPI>,
    params: Option<Json<FeedbackParams>>,
) -> Result<Json<Ride>, Error> {
    let params = params.map(|Json(params)| params).unwrap_or_default();
    let ride = api.complete_ride(params.rating, params.review).await?;

    Ok(ride.into())
}

pub async fn update_status(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
    Json(params): Json<StatusParams>,
) -> Result<Json<Ride>, Error> {
    let ride = api.update_ride_status(RideId(id), params.status).await?;

    Ok(ride.into())
}
