use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, address: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            coordinates,
        }
    }
}
