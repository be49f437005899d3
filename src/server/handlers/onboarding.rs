use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::auth::{OtpChallenge, Role, User};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct SendOtpParams {
    phone: String,
    role: Role,
}

#[derive(Serialize, Deserialize)]
pub struct VerifyOtpParams {
    phone: String,
    code: String,
}

pub async fn send_otp(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<SendOtpParams>,
) -> Result<Json<OtpChallenge>, Error> {
    let challenge = api.send_otp(params.phone, params.role).await?;

    Ok(challenge.into())
}

pub async fn verify_otp(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<VerifyOtpParams>,
) -> Result<Json<User>, Error> {
    let user = api.verify_otp(params.phone, params.code).await?;

    Ok(user.into())
}
