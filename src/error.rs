/// Error type shared by the bridge, storage and DOM helpers
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Browser API call failed: {0}")]
    Bridge(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Page element not found: {0}")]
    MissingDom(&'static str),
}

impl Error {
    pub fn bridge(err: JsValue) -> Self {
        Error::Bridge(format!("{:?}", err))
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
