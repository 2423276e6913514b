use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub designation: String,
    pub salary: f64,
}

impl Employee {
    pub fn new(name: String, designation: String, salary: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            designation,
            salary,
        }
    }
}
