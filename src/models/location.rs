use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A place picked by the rider, as handed over by the geocoding widget.
///
/// The lifecycle never looks inside `id`; only distance providers may.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationRef {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

impl LocationRef {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.id.trim().is_empty()
    }

    /// Fills an empty label from the id so the view always has something to
    /// show. The id itself is passed through untouched.
    pub fn normalized(mut self) -> Self {
        if self.label.trim().is_empty() {
            self.label = self.id.trim().to_string();
        }
        self
    }
}

impl From<&str> for LocationRef {
    fn from(value: &str) -> Self {
        LocationRef::new(value, value)
    }
}
