//! HTTP API definitions.

pub mod params;
pub mod parcel;

pub use self::params::Params;
