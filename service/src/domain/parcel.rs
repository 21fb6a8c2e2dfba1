//! [`Parcel`] definitions.

use common::define_kind;
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

/// Land parcel tracked by the system.
#[derive(Clone, Debug, PartialEq)]
pub struct Parcel {
    /// ID of this [`Parcel`].
    pub id: Id,

    /// [`Name`] of this [`Parcel`].
    pub name: Name,

    /// [`Status`] of this [`Parcel`].
    pub status: Status,

    /// [`Area`] of this [`Parcel`].
    pub area: Area,

    /// Indicator whether this [`Parcel`] has planning constraints.
    pub has_constraints: HasConstraints,
}

/// ID of a [`Parcel`].
///
/// Chosen by the caller on creation and never modified afterwards.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

/// Name of a [`Parcel`].
///
/// Free-form text, not validated.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

define_kind! {
    #[doc = "Status of a [`Parcel`]."]
    enum Status {
        #[doc = "Saved for later review."]
        Saved = 1,

        #[doc = "Short-listed as a candidate."]
        ShortListed = 2,

        #[doc = "Under active consideration."]
        UnderConsideration = 3,

        #[doc = "Approved."]
        Approved = 4,
    }
}

/// Area of a [`Parcel`].
pub type Area = f64;

/// Indicator whether a [`Parcel`] has planning constraints.
pub type HasConstraints = bool;
