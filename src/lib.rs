//! Client for the LIneA Solar System Portal occultation prediction API.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::LocalStorage;
pub use config::ClientConfig;
pub use self::core::{
    asteroid::Asteroid,
    base::{BaseApi, DataRequest, QueryParams},
    geofilter::{geofilter, GeofilterOptions},
    occmap::{generate_map, generate_map_from_value, generate_map_with, MapStyle, OccMapParams, ParameterFileRenderer},
    occviz::{visibility_from_coeff, PathCoefficients},
    prediction::{OccultationQuery, Prediction},
};
pub use domain::model::{ApiFailure, AsteroidName, Page, Record, Reply};
pub use domain::ports::{ConfigProvider, MapRenderer, Storage};
pub use utils::error::{Result, SspError};
