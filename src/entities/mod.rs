mod booking;
mod driver;
mod fare;
mod location;
mod payment;
mod ride;
mod vehicle;

pub use booking::{BookingType, TripType};
pub use driver::Driver;
pub use fare::{FareBreakdown, FareConfig};
pub use location::{Coordinates, Location};
pub use payment::{PaymentMethod, PaymentReceipt, PaymentStatus};
pub use ride::{CurrentRide, Ride, RideDraft, RideId, Status as RideStatus};
pub use vehicle::{Vehicle, VehicleClass};
