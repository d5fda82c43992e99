pub mod classifier;
pub mod geocoder;
pub mod normalizer;
pub mod stats;

pub use classifier::{classify, classify_all, RuleSet};
pub use geocoder::{geocode_incidents, Geocoder, NominatimGeocoder};
pub use normalizer::normalize;
pub use stats::RunStats;
