//! Simulated backend round trips.
//!
//! OTP delivery, payment processing and driver matching have no real backend:
//! each resolves unconditionally after a fixed delay on the injected clock.
//! Every task takes a [`Cancellation`] and gives up as soon as it fires.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use tokio::sync::watch;
use uuid::Uuid;

use crate::clock::Clock;
use crate::entities::{Driver, PaymentMethod, PaymentReceipt, VehicleClass};
use crate::error::{cancelled_error, unexpected_error, Error};
use crate::fixtures;

#[derive(Clone, Debug)]
pub struct Cancellation {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// True when both handles were cloned from the same token.
    pub fn same_as(&self, other: &Cancellation) -> bool {
        Arc::ptr_eq(&self.tx, &other.tx)
    }

    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();

        loop {
            let cancelled = *rx.borrow_and_update();
            if cancelled {
                return;
            }

            // the sender lives as long as `self`, so this only errors after drop
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn run_after<T>(
    clock: &dyn Clock,
    delay: Duration,
    token: &Cancellation,
    value: T,
) -> Result<T, Error> {
    if token.is_cancelled() {
        return Err(cancelled_error());
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(cancelled_error()),
        _ = clock.sleep(delay) => Ok(value),
    }
}

#[tracing::instrument(skip(clock, token))]
pub async fn deliver_otp(
    clock: &dyn Clock,
    delay: Duration,
    token: &Cancellation,
    phone: &str,
) -> Result<String, Error> {
    let code = format!("{:04}", rand::thread_rng().gen_range(0..10_000));

    let code = run_after(clock, delay, token, code).await?;

    tracing::info!("otp delivered");

    Ok(code)
}

#[tracing::instrument(skip(clock, token))]
pub async fn process_payment(
    clock: &dyn Clock,
    delay: Duration,
    token: &Cancellation,
    amount: Decimal,
    method: PaymentMethod,
) -> Result<PaymentReceipt, Error> {
    run_after(clock, delay, token, ()).await?;

    let receipt = PaymentReceipt {
        reference: Uuid::new_v4(),
        amount,
        method,
        paid_at: clock.now(),
    };

    tracing::info!(reference = %receipt.reference, "payment processed");

    Ok(receipt)
}

/// Picks a fixture driver for the requested vehicle class, falling back to
/// any driver when none drives that class.
#[tracing::instrument(skip(clock, token))]
pub async fn match_driver(
    clock: &dyn Clock,
    delay: Duration,
    token: &Cancellation,
    class: Option<VehicleClass>,
) -> Result<Driver, Error> {
    let drivers = fixtures::drivers();

    let candidates: Vec<&Driver> = match class {
        Some(class) => drivers.iter().filter(|d| d.drives(class)).collect(),
        None => Vec::new(),
    };

    let chosen = {
        let mut rng = rand::thread_rng();
        match candidates.choose(&mut rng) {
            Some(driver) => Some((*driver).clone()),
            None => drivers.choose(&mut rng).cloned(),
        }
    };

    let driver = chosen.ok_or_else(unexpected_error)?;
    let driver = run_after(clock, delay, token, driver).await?;

    tracing::info!(driver_id = %driver.id, "driver matched");

    Ok(driver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{SteppingClock, SystemClock};
    use chrono::{TimeZone, Utc};

    fn clock() -> SteppingClock {
        SteppingClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn run_after_resolves_after_delay() {
        let clock = clock();
        let start = clock.now();

        let value = run_after(&clock, Duration::from_secs(3), &Cancellation::new(), 7)
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(clock.now() - start, chrono::Duration::seconds(3));
    }

    #[tokio::test]
    async fn already_cancelled_token_short_circuits() {
        let clock = clock();
        let start = clock.now();
        let token = Cancellation::new();
        token.cancel();

        let err = run_after(&clock, Duration::from_secs(3), &token, ())
            .await
            .unwrap_err();

        assert!(err.is_cancelled_error());
        assert_eq!(clock.now(), start);
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_pending_delay() {
        let token = Cancellation::new();
        let handle = {
            let token = token.clone();
            tokio::spawn(async move {
                run_after(&SystemClock, Duration::from_secs(3600), &token, ()).await
            })
        };

        tokio::task::yield_now().await;
        token.cancel();

        let result = handle.await.unwrap();
        assert!(result.unwrap_err().is_cancelled_error());
    }

    #[tokio::test]
    async fn otp_is_four_digits() {
        let code = deliver_otp(&clock(), Duration::from_secs(2), &Cancellation::new(), "+911234567890")
            .await
            .unwrap();

        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn payment_always_succeeds() {
        let clock = clock();
        let amount = Decimal::new(391875, 4);

        let receipt = process_payment(
            &clock,
            Duration::from_secs(3),
            &Cancellation::new(),
            amount,
            PaymentMethod::Card,
        )
        .await
        .unwrap();

        assert_eq!(receipt.amount, amount);
        assert_eq!(receipt.method, PaymentMethod::Card);
        assert_eq!(receipt.paid_at, clock.now());
    }

    #[tokio::test]
    async fn matched_driver_drives_requested_class() {
        for _ in 0..10 {
            let driver = match_driver(
                &clock(),
                Duration::from_secs(4),
                &Cancellation::new(),
                Some(VehicleClass::Mini),
            )
            .await
            .unwrap();

            assert_eq!(driver.vehicle_class, VehicleClass::Mini);
        }
    }

    #[tokio::test]
    async fn matching_without_class_picks_any_driver() {
        let driver = match_driver(&clock(), Duration::from_secs(4), &Cancellation::new(), None)
            .await
            .unwrap();

        assert!(fixtures::drivers().contains(&driver));
    }
}
