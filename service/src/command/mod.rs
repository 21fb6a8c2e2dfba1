//! [`Command`] definition.

pub mod create_parcel;
pub mod delete_parcel;
pub mod update_parcel;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_parcel::CreateParcel, delete_parcel::DeleteParcel,
    update_parcel::UpdateParcel,
};
