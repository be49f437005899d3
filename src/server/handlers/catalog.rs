use axum::extract::{Extension, Json};

use crate::api::DynAPI;
use crate::entities::{Location, Vehicle};
use crate::error::Error;

pub async fn vehicles(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Vehicle>>, Error> {
    let vehicles = api.vehicles().await?;

    Ok(vehicles.into())
}

pub async fn places(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Location>>, Error> {
    let places = api.saved_places().await?;

    Ok(places.into())
}
