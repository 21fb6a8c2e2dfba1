//! Domain entities definitions.

pub mod parcel;

pub use self::parcel::Parcel;
