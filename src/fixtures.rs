use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entities::{Coordinates, Driver, Location, Vehicle, VehicleClass};

pub const MAX_PASSENGERS: u32 = 6;

fn vehicle(id: &str, name: &str, class: VehicleClass, capacity: u32, price: i64, eta_minutes: u32) -> Vehicle {
    Vehicle {
        id: id.into(),
        name: name.into(),
        class,
        capacity,
        price: Decimal::new(price, 0),
        eta_minutes,
    }
}

pub fn vehicles() -> Vec<Vehicle> {
    vec![
        vehicle("bike", "Bike", VehicleClass::Bike, 1, 40, 2),
        vehicle("auto", "Auto", VehicleClass::Auto, 3, 70, 3),
        vehicle("mini", "Mini", VehicleClass::Mini, 4, 100, 4),
        vehicle("sedan", "Sedan", VehicleClass::Sedan, 4, 150, 5),
        vehicle("suv", "SUV", VehicleClass::Suv, 6, 220, 7),
        vehicle("luxury", "Luxury", VehicleClass::Luxury, 4, 400, 10),
    ]
}

pub fn find_vehicle(id: &str) -> Option<Vehicle> {
    vehicles().into_iter().find(|vehicle| vehicle.id == id)
}

fn driver(
    id: u128,
    name: &str,
    phone: &str,
    rating: f32,
    vehicle_class: VehicleClass,
    vehicle_model: &str,
    plate_number: &str,
) -> Driver {
    Driver {
        id: Uuid::from_u128(id),
        name: name.into(),
        phone: phone.into(),
        rating,
        vehicle_class,
        vehicle_model: vehicle_model.into(),
        plate_number: plate_number.into(),
    }
}

pub fn drivers() -> Vec<Driver> {
    vec![
        driver(1, "Arjun Mehta", "+919800000001", 4.8, VehicleClass::Bike, "Honda Activa", "KA01AB1234"),
        driver(2, "Priya Nair", "+919800000002", 4.7, VehicleClass::Auto, "Bajaj RE", "KA02CD5678"),
        driver(3, "Rahul Verma", "+919800000003", 4.9, VehicleClass::Mini, "Maruti Swift", "KA03EF9012"),
        driver(4, "Sneha Iyer", "+919800000004", 4.6, VehicleClass::Sedan, "Honda City", "KA04GH3456"),
        driver(5, "Vikram Singh", "+919800000005", 4.8, VehicleClass::Suv, "Toyota Innova", "KA05IJ7890"),
        driver(6, "Kavya Rao", "+919800000006", 5.0, VehicleClass::Luxury, "Mercedes E-Class", "KA06KL2345"),
        driver(7, "Imran Khan", "+919800000007", 4.5, VehicleClass::Mini, "Hyundai i20", "KA07MN6789"),
    ]
}

pub fn saved_places() -> Vec<Location> {
    vec![
        Location::new(
            "Home",
            "Indiranagar, Bengaluru",
            Coordinates {
                latitude: 12.9719,
                longitude: 77.6412,
            },
        ),
        Location::new(
            "Work",
            "Whitefield, Bengaluru",
            Coordinates {
                latitude: 12.9698,
                longitude: 77.7500,
            },
        ),
        Location::new(
            "Airport",
            "Kempegowda International Airport, Bengaluru",
            Coordinates {
                latitude: 13.1986,
                longitude: 77.7066,
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn vehicle_ids_are_unique() {
        let ids: HashSet<String> = vehicles().into_iter().map(|v| v.id).collect();
        assert_eq!(ids.len(), vehicles().len());
    }

    #[test]
    fn every_vehicle_class_has_a_driver() {
        for vehicle in vehicles() {
            assert!(drivers().iter().any(|d| d.drives(vehicle.class)));
        }
    }

    #[test]
    fn no_vehicle_exceeds_passenger_limit() {
        assert!(vehicles().iter().all(|v| v.capacity <= MAX_PASSENGERS));
    }

    #[test]
    fn find_vehicle_by_id() {
        assert_eq!(find_vehicle("mini").map(|v| v.price), Some(Decimal::new(100, 0)));
        assert!(find_vehicle("spaceship").is_none());
    }
}
