//! Value Objects - Immutable, identity-less domain primitives

mod coordinate_key;
mod country_code;
mod geo_location;

pub use coordinate_key::CoordinateKey;
pub use country_code::CountryCode;
pub use geo_location::GeoLocation;
