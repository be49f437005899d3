use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Constants the mock fare is computed from. The distance and duration are
/// placeholders; pickup and dropoff never feed into the fare.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareConfig {
    pub distance_km: Decimal,
    pub duration_minutes: Decimal,
    pub rate_per_km: Decimal,
    pub rate_per_minute: Decimal,
    pub surge: Decimal,
    pub tax_rate: Decimal,
    pub advance_rate: Decimal,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            distance_km: Decimal::new(15, 0),
            duration_minutes: Decimal::new(25, 0),
            rate_per_km: Decimal::new(2, 0),
            rate_per_minute: Decimal::new(5, 1),
            surge: Decimal::ZERO,
            tax_rate: Decimal::new(10, 2),
            advance_rate: Decimal::new(25, 2),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base_fare: Decimal,
    pub distance_charge: Decimal,
    pub time_charge: Decimal,
    pub surge: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub advance_payment: Decimal,
    pub remaining_payment: Decimal,
}

impl FareBreakdown {
    pub fn calculate(base_fare: Decimal, config: &FareConfig) -> Self {
        let distance_charge = config.distance_km * config.rate_per_km;
        let time_charge = config.duration_minutes * config.rate_per_minute;
        let subtotal = base_fare + distance_charge + time_charge + config.surge;

        let tax = subtotal * config.tax_rate;
        let total = subtotal + tax;
        let advance_payment = total * config.advance_rate;

        Self {
            base_fare,
            distance_charge,
            time_charge,
            surge: config.surge,
            tax,
            total,
            advance_payment,
            remaining_payment: total - advance_payment,
        }
    }
}
