use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Standard,
    Suv,
    Premium,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 3] = [
        VehicleClass::Standard,
        VehicleClass::Suv,
        VehicleClass::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Standard => "standard",
            VehicleClass::Suv => "suv",
            VehicleClass::Premium => "premium",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            VehicleClass::Standard => "Affordable and comfortable sedan",
            VehicleClass::Suv => "Spacious vehicle for groups or luggage",
            VehicleClass::Premium => "Luxury experience with top-rated drivers",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(VehicleClass::Standard),
            "suv" => Ok(VehicleClass::Suv),
            "premium" => Ok(VehicleClass::Premium),
            _ => Err(AppError::InvalidVehicleClass(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::VehicleClass;
    use crate::error::AppError;

    #[test]
    fn parses_known_classes_case_insensitively() {
        assert_eq!("standard".parse::<VehicleClass>().unwrap(), VehicleClass::Standard);
        assert_eq!(" SUV ".parse::<VehicleClass>().unwrap(), VehicleClass::Suv);
        assert_eq!("Premium".parse::<VehicleClass>().unwrap(), VehicleClass::Premium);
    }

    #[test]
    fn unknown_class_is_rejected() {
        let err = "limo".parse::<VehicleClass>().unwrap_err();
        assert!(matches!(err, AppError::InvalidVehicleClass(ref raw) if raw == "limo"));
    }

    #[test]
    fn display_matches_wire_name() {
        for class in VehicleClass::ALL {
            let wire = serde_json::to_value(class).unwrap();
            assert_eq!(wire, class.to_string());
        }
    }
}
