use super::Engine;

use async_trait::async_trait;

use crate::{
    api::PaymentAPI,
    entities::{PaymentMethod, PaymentReceipt, PaymentStatus},
    error::{invalid_invocation_error, invalid_state_error, Error},
    simulation,
};

impl Engine {
    async fn collect(
        &self,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<PaymentReceipt, Error> {
        // one payment at a time, held until the status is written
        let _in_flight = self.payment.try_lock().map_err(|_| {
            tracing::info!("payment already processing, returning early...");
            invalid_invocation_error()
        })?;

        let ride = self.active_ride().await?;

        if !ride.is_active() || ride.payment_status != expected {
            tracing::info!(ride_id = %ride.id, "payment not due, returning early...");
            return Err(invalid_invocation_error());
        }

        let fare = ride.details.fare.as_ref().ok_or_else(invalid_state_error)?;
        let amount = match next {
            PaymentStatus::AdvancePaid => fare.advance_payment,
            _ => fare.remaining_payment,
        };
        let method = ride.details.payment_method.unwrap_or(PaymentMethod::Cash);

        let receipt = simulation::process_payment(
            &*self.clock,
            self.simulation.payment_delay,
            &self.shutdown,
            amount,
            method,
        )
        .await?;

        let state = self.store.set_payment_status(next).await;

        match state.active_ride() {
            Some(current) if current.id == ride.id => Ok(receipt),
            _ => {
                tracing::warn!(ride_id = %ride.id, "ride changed while payment was processing");
                Err(invalid_state_error())
            }
        }
    }
}

#[async_trait]
impl PaymentAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn pay_advance(&self) -> Result<PaymentReceipt, Error> {
        self.collect(PaymentStatus::Pending, PaymentStatus::AdvancePaid)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn pay_remaining(&self) -> Result<PaymentReceipt, Error> {
        self.collect(PaymentStatus::AdvancePaid, PaymentStatus::Paid)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RideAPI;
    use crate::clock::{SteppingClock, SystemClock};
    use crate::config::Config;
    use crate::entities::{Coordinates, Location};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn engine() -> Engine {
        let clock = SteppingClock::new(Utc.with_ymd_and_hms(2024, 8, 1, 20, 0, 0).unwrap());
        Engine::new(&Config::default(), Arc::new(clock))
    }

    fn place() -> Location {
        Location::new(
            "Somewhere",
            "",
            Coordinates {
                latitude: 1.0,
                longitude: 1.0,
            },
        )
    }

    async fn book(engine: &Engine) {
        engine.set_pickup(place()).await.unwrap();
        engine.set_dropoff(place()).await.unwrap();
        engine.set_vehicle("mini".into()).await.unwrap();
        engine.set_payment_method(PaymentMethod::Upi).await.unwrap();
        engine.confirm_booking(None, None).await.unwrap();
    }

    #[tokio::test]
    async fn advance_then_remaining() {
        let engine = engine();
        book(&engine).await;

        let advance = engine.pay_advance().await.unwrap();
        assert_eq!(advance.amount, Decimal::new(391875, 4));
        assert_eq!(advance.method, PaymentMethod::Upi);
        assert_eq!(
            engine.rides().await.unwrap()[0].payment_status,
            PaymentStatus::AdvancePaid
        );

        let remaining = engine.pay_remaining().await.unwrap();
        assert_eq!(remaining.amount, Decimal::new(1175625, 4));
        assert_eq!(advance.amount + remaining.amount, Decimal::new(15675, 2));
        assert_eq!(
            engine.rides().await.unwrap()[0].payment_status,
            PaymentStatus::Paid
        );
    }

    #[tokio::test]
    async fn advance_cannot_be_paid_twice() {
        let engine = engine();
        book(&engine).await;

        engine.pay_advance().await.unwrap();
        let err = engine.pay_advance().await.unwrap_err();
        assert_eq!(err, invalid_invocation_error());
    }

    #[tokio::test]
    async fn remaining_requires_advance() {
        let engine = engine();
        book(&engine).await;

        let err = engine.pay_remaining().await.unwrap_err();
        assert_eq!(err, invalid_invocation_error());
    }

    #[tokio::test]
    async fn payment_requires_confirmed_ride() {
        let engine = engine();
        let err = engine.pay_advance().await.unwrap_err();
        assert_eq!(err, invalid_state_error());
    }

    #[tokio::test]
    async fn shutdown_cancels_payments() {
        let engine = engine();
        book(&engine).await;
        engine.shutdown().await;

        let err = engine.pay_advance().await.unwrap_err();
        assert!(err.is_cancelled_error());
        assert_eq!(
            engine.rides().await.unwrap()[0].payment_status,
            PaymentStatus::Pending
        );
    }

    #[tokio::test]
    async fn overlapping_advance_requests_charge_once() {
        let mut config = Config::default();
        config.simulation.payment_delay = std::time::Duration::from_millis(50);

        let engine = Engine::new(&config, Arc::new(SystemClock));
        book(&engine).await;

        let (first, second) = tokio::join!(engine.pay_advance(), engine.pay_advance());

        let receipts: Vec<_> = vec![first, second].into_iter().filter_map(Result::ok).collect();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].amount, Decimal::new(391875, 4));
        assert_eq!(
            engine.rides().await.unwrap()[0].payment_status,
            PaymentStatus::AdvancePaid
        );

        // the guard is gone, so the next stage can be paid
        assert!(engine.pay_remaining().await.is_ok());
    }
}
