//! [`Parcel`]-related definitions.

use axum::{extract::Path, Extension, Json};
use common::Handler as _;
use serde::{Deserialize, Serialize};
use service::{command, domain, query};

use crate::{define_error, AsError, Error};

use super::Params;

/// A land parcel, as represented on the wire.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Parcel {
    /// Unique identifier of this `Parcel`.
    #[serde(rename = "objectId")]
    pub object_id: i64,

    /// Name of this `Parcel`.
    pub name: String,

    /// [`Status`] of this `Parcel`.
    pub status: Status,

    /// Area of this `Parcel`.
    pub area: f64,

    /// Indicator whether this `Parcel` has planning constraints.
    pub constraints: bool,
}

impl From<domain::Parcel> for Parcel {
    fn from(parcel: domain::Parcel) -> Self {
        let domain::Parcel {
            id,
            name,
            status,
            area,
            has_constraints,
        } = parcel;

        Self {
            object_id: id.into(),
            name: name.into(),
            status: status.into(),
            area,
            constraints: has_constraints,
        }
    }
}

/// Status of a `Parcel`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Saved for later review.
    Saved,

    /// Short-listed as a candidate.
    ShortListed,

    /// Under active consideration.
    UnderConsideration,

    /// Approved.
    Approved,
}

impl From<domain::parcel::Status> for Status {
    fn from(status: domain::parcel::Status) -> Self {
        use domain::parcel::Status as S;

        match status {
            S::Saved => Self::Saved,
            S::ShortListed => Self::ShortListed,
            S::UnderConsideration => Self::UnderConsideration,
            S::Approved => Self::Approved,
        }
    }
}

impl From<Status> for domain::parcel::Status {
    fn from(status: Status) -> Self {
        use Status as S;

        match status {
            S::Saved => Self::Saved,
            S::ShortListed => Self::ShortListed,
            S::UnderConsideration => Self::UnderConsideration,
            S::Approved => Self::Approved,
        }
    }
}

/// Parameters of the [`create()`] endpoint.
///
/// Every field is required.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateParams {
    /// Name of a new `Parcel`.
    pub name: String,

    /// [`Status`] of a new `Parcel`.
    pub status: Status,

    /// Area of a new `Parcel`.
    pub area: f64,

    /// Indicator whether a new `Parcel` has planning constraints.
    pub constraints: bool,
}

/// Parameters of the [`update()`] endpoint.
///
/// Absent fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateParams {
    /// New name of the `Parcel`.
    pub name: Option<String>,

    /// New [`Status`] of the `Parcel`.
    pub status: Option<Status>,

    /// New area of the `Parcel`.
    pub area: Option<f64>,

    /// New planning constraints indicator of the `Parcel`.
    pub constraints: Option<bool>,
}

define_error! {
    enum ParcelError {
        #[code = "PARCEL_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Parcel` with the provided ID does not exist"]
        NotExists,
    }
}

/// `GET /landParcel` handler listing all the stored `Parcel`s.
pub async fn retrieve_all(
    Extension(service): Extension<crate::Service>,
) -> Result<Json<Vec<Parcel>>, Error> {
    service
        .execute(query::parcels::All::by(()))
        .await
        .map_err(AsError::into_error)
        .map(|parcels| Json(parcels.into_iter().map(Into::into).collect()))
}

/// `GET /landParcel/{id}` handler retrieving a single `Parcel`.
pub async fn retrieve(
    Extension(service): Extension<crate::Service>,
    Path(id): Path<i64>,
) -> Result<Json<Parcel>, Error> {
    service
        .execute(query::parcel::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|parcel| Json(parcel.into()))
        .ok_or_else(|| ParcelError::NotExists.into())
}

/// `POST /landParcel/{id}` handler creating a new `Parcel`.
pub async fn create(
    Extension(service): Extension<crate::Service>,
    Path(id): Path<i64>,
    Params(params): Params<CreateParams>,
) -> Result<Json<Parcel>, Error> {
    let CreateParams {
        name,
        status,
        area,
        constraints,
    } = params;

    service
        .execute(command::CreateParcel {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            area,
            has_constraints: constraints,
        })
        .await
        .map_err(AsError::into_error)
        .map(|parcel| Json(parcel.into()))
}

/// `PUT /landParcel/{id}` handler updating the supplied fields of an existing
/// `Parcel`.
pub async fn update(
    Extension(service): Extension<crate::Service>,
    Path(id): Path<i64>,
    Params(params): Params<UpdateParams>,
) -> Result<Json<Parcel>, Error> {
    let UpdateParams {
        name,
        status,
        area,
        constraints,
    } = params;

    service
        .execute(command::UpdateParcel {
            id: id.into(),
            name: name.map(Into::into),
            status: status.map(Into::into),
            area,
            has_constraints: constraints,
        })
        .await
        .map_err(AsError::into_error)
        .map(|parcel| Json(parcel.into()))
}

/// `DELETE /landParcel/{id}` handler removing an existing `Parcel`.
pub async fn delete(
    Extension(service): Extension<crate::Service>,
    Path(id): Path<i64>,
) -> Result<(), Error> {
    service
        .execute(command::DeleteParcel { id: id.into() })
        .await
        .map_err(AsError::into_error)
}

impl AsError for command::create_parcel::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PARCEL_ALREADY_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "`Parcel` with the provided ID already exists"]
                AlreadyExists,
            }
        }

        match self {
            Self::AlreadyExists(_) => Some(Error::AlreadyExists.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_parcel::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::NotExists(_) => Some(ParcelError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_parcel::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::NotExists(_) => Some(ParcelError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::command::{create_parcel, delete_parcel, update_parcel};

    use crate::AsError as _;

    use super::{CreateParams, Parcel, Status, UpdateParams};

    #[test]
    fn serializes_in_wire_field_order() {
        let parcel = Parcel {
            object_id: 123,
            name: "Alice House".to_owned(),
            status: Status::Saved,
            area: 42.0,
            constraints: true,
        };

        assert_eq!(
            serde_json::to_string(&parcel).unwrap(),
            "{\"objectId\":123,\"name\":\"Alice House\",\
             \"status\":\"SAVED\",\"area\":42.0,\"constraints\":true}",
        );
    }

    #[test]
    fn status_uses_screaming_snake_case_names() {
        for (status, name) in [
            (Status::Saved, "\"SAVED\""),
            (Status::ShortListed, "\"SHORT_LISTED\""),
            (Status::UnderConsideration, "\"UNDER_CONSIDERATION\""),
            (Status::Approved, "\"APPROVED\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), name);
        }
    }

    #[test]
    fn create_params_require_every_field() {
        let params: CreateParams = serde_urlencoded::from_str(
            "name=Alice+House&status=SAVED&area=42&constraints=true",
        )
        .unwrap();
        assert_eq!(params.name, "Alice House");
        assert_eq!(params.status, Status::Saved);
        assert_eq!(params.area, 42.0);
        assert!(params.constraints);

        assert!(serde_urlencoded::from_str::<CreateParams>(
            "name=Alice+House&status=SAVED&area=42",
        )
        .is_err());
        assert!(serde_urlencoded::from_str::<CreateParams>(
            "name=Alice+House&status=NO_CHANGE&area=42&constraints=true",
        )
        .is_err());
    }

    #[test]
    fn update_params_default_to_unchanged() {
        let params: UpdateParams = serde_urlencoded::from_str("").unwrap();
        assert_eq!(params.name, None);
        assert_eq!(params.status, None);
        assert_eq!(params.area, None);
        assert_eq!(params.constraints, None);

        let params: UpdateParams =
            serde_urlencoded::from_str("area=423.0").unwrap();
        assert_eq!(params.name, None);
        assert_eq!(params.status, None);
        assert_eq!(params.area, Some(423.0));
        assert_eq!(params.constraints, None);
    }

    #[test]
    fn maps_service_errors_to_statuses() {
        let err = create_parcel::ExecutionError::AlreadyExists(123.into());
        assert_eq!(err.as_error().status_code, http::StatusCode::BAD_REQUEST);

        let err = update_parcel::ExecutionError::NotExists(123.into());
        assert_eq!(err.as_error().status_code, http::StatusCode::NOT_FOUND);

        let err = delete_parcel::ExecutionError::NotExists(123.into());
        assert_eq!(err.as_error().status_code, http::StatusCode::NOT_FOUND);
    }
}
