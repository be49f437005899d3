use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::VehicleClass;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub rating: f32,
    pub vehicle_class: VehicleClass,
    pub vehicle_model: String,
    pub plate_number: String,
}

impl Driver {
    pub fn drives(&self, class: VehicleClass) -> bool {
        self.vehicle_class == class
    }
}
