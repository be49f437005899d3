use axum::extract::{Extension, Json};

use crate::api::DynAPI;
use crate::entities::PaymentReceipt;
use crate::error::Error;

pub async fn advance(Extension(api): Extension<DynAPI>) -> Result<Json<PaymentReceipt>, Error> {
    let receipt = api.pay_advance().await?;

    Ok(receipt.into())
}

pub async fn remaining(Extension(api): Extension<DynAPI>) -> Result<Json<PaymentReceipt>, Error> {
    let receipt = api.pay_remaining().await?;

    Ok(receipt.into())
}
