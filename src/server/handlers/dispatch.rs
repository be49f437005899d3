use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::Ride;
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct CancelSearchResponse {
    cancelled: bool,
}

pub async fn find_driver(Extension(api): Extension<DynAPI>) -> Result<Json<Ride>, Error> {
    let ride = api.find_driver().await?;

    Ok(ride.into())
}

pub async fn cancel_search(
    Extension(api): Extension<DynAPI>,
) -> Result<Json<CancelSearchResponse>, Error> {
    let cancelled = api.cancel_driver_search().await?;

    Ok(CancelSearchResponse { cancelled }.into())
}
