use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    BookingType, Driver, FareBreakdown, FareConfig, Location, PaymentMethod, PaymentStatus,
    TripType, Vehicle,
};
use crate::error::{invalid_invocation_error, Error};

/// Booking fields accumulated across the booking screens. Every field is
/// optional and setters never clear unrelated fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RideDraft {
    pub booking_type: Option<BookingType>,
    pub trip_type: Option<TripType>,
    pub pickup: Option<Location>,
    pub dropoff: Option<Location>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub passengers: Option<u32>,
    pub vehicle: Option<Vehicle>,
    pub fare: Option<FareBreakdown>,
    pub payment_method: Option<PaymentMethod>,
}

impl RideDraft {
    pub fn select_vehicle(&mut self, vehicle: Vehicle, config: &FareConfig) {
        self.fare = Some(FareBreakdown::calculate(vehicle.price, config));
        self.vehicle = Some(vehicle);
    }

    pub fn is_bookable(&self) -> bool {
        self.pickup.is_some() && self.dropoff.is_some() && self.vehicle.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(pub String);

impl RideId {
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis().to_string())
    }

    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{}", self.0, n))
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Active => "active".into(),
            Self::Completed => "completed".into(),
            Self::Cancelled => "cancelled".into(),
        }
    }

    pub fn can_transition_to(&self, next: Status) -> bool {
        if *self == next {
            return true;
        }

        match (self, next) {
            (Self::Pending, Self::Active)
            | (Self::Pending, Self::Cancelled)
            | (Self::Active, Self::Completed)
            | (Self::Active, Self::Cancelled) => true,
            _ => false,
        }
    }

    pub fn try_transition(&self, next: Status) -> Result<Status, Error> {
        match self.can_transition_to(next) {
            true => Ok(next),
            false => Err(invalid_invocation_error()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    #[serde(flatten)]
    pub details: RideDraft,
    pub status: Status,
    pub payment_status: PaymentStatus,
    pub rating: Option<u8>,
    pub review: Option<String>,
    pub driver: Option<Driver>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Ride {
    pub fn confirm(
        id: RideId,
        details: RideDraft,
        rating: Option<u8>,
        review: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            details,
            status: Status::Active,
            payment_status: PaymentStatus::Pending,
            rating,
            review,
            driver: None,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        match self.status {
            Status::Active => true,
            _ => false,
        }
    }

    #[tracing::instrument(skip(self), fields(ride_id = %self.id))]
    pub fn transition(&mut self, next: Status) -> Result<(), Error> {
        self.status = self.status.try_transition(next)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, review), fields(ride_id = %self.id))]
    pub fn complete(
        &mut self,
        rating: Option<u8>,
        review: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.transition(Status::Completed)?;

        self.payment_status = PaymentStatus::Paid;
        self.completed_at = Some(now);

        if rating.is_some() {
            self.rating = rating;
        }
        if review.is_some() {
            self.review = review;
        }

        Ok(())
    }
}

/// The ride the screens are currently working on: a draft until the booking
/// is confirmed, the confirmed ride afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum CurrentRide {
    Draft(RideDraft),
    Confirmed(Ride),
}

impl CurrentRide {
    pub fn details(&self) -> &RideDraft {
        match self {
            Self::Draft(draft) => draft,
            Self::Confirmed(ride) => &ride.details,
        }
    }

    pub fn details_mut(&mut self) -> &mut RideDraft {
        match self {
            Self::Draft(draft) => draft,
            Self::Confirmed(ride) => &mut ride.details,
        }
    }

    pub fn confirmed(&self) -> Option<&Ride> {
        match self {
            Self::Confirmed(ride) => Some(ride),
            Self::Draft(_) => None,
        }
    }

    pub fn confirmed_mut(&mut self) -> Option<&mut Ride> {
        match self {
            Self::Confirmed(ride) => Some(ride),
            Self::Draft(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn status_transitions() {
        use Status::*;

        assert!(Pending.can_transition_to(Active));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Completed));
        assert!(Active.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Active));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(Active));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Active.can_transition_to(Pending));
    }

    #[test]
    fn rejected_transition_is_an_invocation_error() {
        let err = Status::Completed.try_transition(Status::Active).unwrap_err();
        assert_eq!(err, invalid_invocation_error());
    }

    #[test]
    fn complete_keeps_confirmation_rating_unless_overridden() {
        let id = RideId::from_timestamp(now());
        let mut ride = Ride::confirm(id, RideDraft::default(), Some(4), None, now());

        ride.complete(None, Some("smooth".into()), now()).unwrap();

        assert_eq!(ride.status, Status::Completed);
        assert_eq!(ride.payment_status, PaymentStatus::Paid);
        assert_eq!(ride.rating, Some(4));
        assert_eq!(ride.review.as_deref(), Some("smooth"));
        assert_eq!(ride.completed_at, Some(now()));
    }

    #[test]
    fn cancelled_rides_cannot_complete() {
        let id = RideId::from_timestamp(now());
        let mut ride = Ride::confirm(id, RideDraft::default(), None, None, now());

        ride.transition(Status::Cancelled).unwrap();

        assert!(ride.complete(Some(5), None, now()).is_err());
        assert_eq!(ride.status, Status::Cancelled);
        assert_eq!(ride.rating, None);
    }

    #[test]
    fn ride_id_is_the_millisecond_timestamp() {
        let id = RideId::from_timestamp(now());
        assert_eq!(id.to_string(), now().timestamp_millis().to_string());
        assert_eq!(id.with_suffix(2).0, format!("{}-2", id));
    }

    #[test]
    fn confirmed_ride_serializes_flat() {
        let id = RideId("1".into());
        let draft = RideDraft {
            passengers: Some(2),
            ..RideDraft::default()
        };
        let ride = Ride::confirm(id, draft, None, None, now());

        let value = serde_json::to_value(CurrentRide::Confirmed(ride)).unwrap();

        assert_eq!(value["stage"], "confirmed");
        assert_eq!(value["id"], "1");
        assert_eq!(value["passengers"], 2);
        assert_eq!(value["status"], "active");
        assert_eq!(value["payment_status"], "pending");
    }
}
