use std::fmt;

#[derive(Debug)]
pub enum OWMError {
    OWM(String),
    Status(u16, String),
    NotFound(String),
    Document(String),
}

impl fmt::Display for OWMError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OWMError::OWM(e) => write!(f, "OWMError::OWM: {}", e),
            OWMError::Status(s, e) => write!(f, "OWMError::Status: {} {}", s, e),
            OWMError::NotFound(e) => write!(f, "OWMError::NotFound: {}", e),
            OWMError::Document(e) => write!(f, "OWMError::Document: {}", e),
        }
    }
}
impl From<reqwest::Error> for OWMError {
    fn from(e: reqwest::Error) -> Self {
        OWMError::OWM(e.to_string())
    }
}
impl From<serde_json::Error> for OWMError {
    fn from(e: serde_json::Error) -> Self {
        OWMError::Document(e.to_string())
    }
}
