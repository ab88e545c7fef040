//! Car entity type

use serde::{Deserialize, Serialize};

use super::{matches_search, required};
use crate::core::error::ShopError;

/// A vehicle owned by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub client_id: i64,
    pub brand: String,
    pub model: String,
    pub vin: String,
}

impl Car {
    /// "Brand Model" as shown in lists
    pub fn title(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    pub fn matches(&self, term: &str) -> bool {
        matches_search(
            term,
            [self.brand.as_str(), self.model.as_str(), self.vin.as_str()],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarForm {
    pub brand: String,
    pub model: String,
    pub vin: String,
}

impl CarForm {
    pub fn new(brand: &str, model: &str, vin: &str) -> Self {
        Self {
            brand: brand.trim().to_string(),
            model: model.trim().to_string(),
            vin: vin.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ShopError> {
        required("brand", &self.brand)?;
        required("model", &self.model)?;
        required("vin", &self.vin)
    }
}

impl From<&Car> for CarForm {
    fn from(car: &Car) -> Self {
        Self {
            brand: car.brand.clone(),
            model: car.model.clone(),
            vin: car.vin.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_car_fields_required() {
        assert!(CarForm::new("Lada", "Vesta", "X1").validate().is_ok());
        let err = CarForm::new("Lada", "", "X1").validate().unwrap_err();
        assert_eq!(err.field(), Some("model"));
        let err = CarForm::new("Lada", "Vesta", " ").validate().unwrap_err();
        assert_eq!(err.field(), Some("vin"));
    }

    #[test]
    fn test_car_title_and_search() {
        let car = Car {
            id: 1,
            client_id: 1,
            brand: "Lada".to_string(),
            model: "Vesta".to_string(),
            vin: "XTA000111".to_string(),
        };
        assert_eq!(car.title(), "Lada Vesta");
        assert!(car.matches("xta"));
        assert!(!car.matches("granta"));
    }
}
