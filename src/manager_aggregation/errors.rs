use std::fmt;
use crate::manager_owm::errors::OWMError;

/// Errors that abort an aggregation, only the current conditions lookup is fatal
#[derive(Debug)]
pub enum AggregationError {
    Current(OWMError),
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AggregationError::Current(e) => write!(f, "AggregationError::Current: {}", e),
        }
    }
}
impl From<OWMError> for AggregationError {
    fn from(e: OWMError) -> Self {
        AggregationError::Current(e)
    }
}
