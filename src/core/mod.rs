pub mod asteroid;
pub mod base;
pub mod geofilter;
pub mod occmap;
pub mod occviz;
pub mod prediction;

pub use crate::domain::model::{ApiFailure, AsteroidName, Page, Record, Reply};
pub use crate::domain::ports::{ConfigProvider, MapRenderer, Storage};
pub use crate::utils::error::Result;
