pub mod toml_config;

pub use toml_config::{ClientConfig, API_URL, ASTEROID_ENDPOINT, PAGE_SIZE, PREDICTION_ENDPOINT};
