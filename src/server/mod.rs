mod handlers;

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::DynAPI;
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{catalog, dispatch, onboarding, payments, rides};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/state", get(rides::state))
        .route("/vehicles", get(catalog::vehicles))
        .route("/places", get(catalog::places))
        .route("/rides", get(rides::list))
        .route("/rides/past", get(rides::past))
        .route("/rides/:id/status", patch(rides::update_status))
        .route("/rides/current", get(rides::current).delete(rides::reset))
        .route("/rides/current/booking_type", patch(rides::set_booking_type))
        .route("/rides/current/trip_type", patch(rides::set_trip_type))
        .route("/rides/current/pickup", patch(rides::set_pickup))
        .route("/rides/current/dropoff", patch(rides::set_dropoff))
        .route("/rides/current/date_time", patch(rides::set_date_time))
        .route("/rides/current/passengers", patch(rides::set_passengers))
        .route("/rides/current/vehicle", patch(rides::set_vehicle))
        .route("/rides/current/payment_method", patch(rides::set_payment_method))
        .route("/rides/current/confirm", post(rides::confirm))
        .route("/rides/current/complete", post(rides::complete))
        .route("/rides/current/payments/advance", post(payments::advance))
        .route("/rides/current/payments/remaining", post(payments::remaining))
        .route(
            "/rides/current/driver",
            post(dispatch::find_driver).delete(dispatch::cancel_search),
        )
        .route("/otp", post(onboarding::send_otp))
        .route("/otp/verify", post(onboarding::verify_otp))
        .layer(Extension(api))
}

pub async fn serve<F>(api: DynAPI, addr: SocketAddr, shutdown: F) -> Result<(), Error>
where
    F: Future<Output = ()>,
{
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|err| {
            tracing::error!("server error: {}", err);
            unexpected_error()
        })
}
