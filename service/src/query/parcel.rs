//! [`Query`] collection related to a single [`Parcel`].

use common::operations::By;

use crate::domain::{parcel, Parcel};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Parcel`] by its [`parcel::Id`].
pub type ById = DatabaseQuery<By<Option<Parcel>, parcel::Id>>;
