//! [`Command`] for updating an existing [`Parcel`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{parcel, Parcel},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Parcel`].
///
/// Every field except the [`parcel::Id`] is optional: [`None`] means "leave
/// the field unchanged". The [`parcel::Id`] itself is never modifiable.
#[derive(Clone, Debug)]
pub struct UpdateParcel {
    /// [`parcel::Id`] of the [`Parcel`] to update.
    pub id: parcel::Id,

    /// New [`parcel::Name`], if it should change.
    pub name: Option<parcel::Name>,

    /// New [`parcel::Status`], if it should change.
    pub status: Option<parcel::Status>,

    /// New [`parcel::Area`], if it should change.
    pub area: Option<parcel::Area>,

    /// New planning constraints indicator, if it should change.
    pub has_constraints: Option<parcel::HasConstraints>,
}

impl<Db> Command<UpdateParcel> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Parcel, parcel::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Parcel>, parcel::Id>>,
            Ok = Option<Parcel>,
            Err = Traced<database::Error>,
        > + Database<Update<Parcel>, Ok = Parcel, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Parcel;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateParcel) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateParcel {
            id,
            name,
            status,
            area,
            has_constraints,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent mutations of the same `parcel::Id`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let Some(mut parcel) = tx
            .execute(Select(By::<Option<Parcel>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Err(tracerr::new!(E::NotExists(id)));
        };

        if let Some(name) = name {
            parcel.name = name;
        }
        if let Some(status) = status {
            parcel.status = status;
        }
        if let Some(area) = area {
            parcel.area = area;
        }
        if let Some(has_constraints) = has_constraints {
            parcel.has_constraints = has_constraints;
        }

        let parcel = tx
            .execute(Update(parcel))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::debug!(id = %parcel.id, "updated `Parcel`");
        Ok(parcel)
    }
}

/// Error of [`UpdateParcel`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Parcel`] with the provided [`parcel::Id`] does not exist.
    #[display("`Parcel` with `{_0}` ID does not exist")]
    NotExists(#[error(not(source))] parcel::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::CreateParcel,
        domain::{parcel, Parcel},
        infra::InMemory,
        query, Service,
    };

    use super::{ExecutionError, UpdateParcel};

    async fn service_with_alice_house() -> Service<InMemory> {
        let service = Service::new(InMemory::default());
        drop(
            service
                .execute(CreateParcel {
                    id: 123.into(),
                    name: parcel::Name::from("Alice House".to_owned()),
                    status: parcel::Status::Saved,
                    area: 42.0,
                    has_constraints: true,
                })
                .await
                .unwrap(),
        );
        service
    }

    fn unchanged(id: i64) -> UpdateParcel {
        UpdateParcel {
            id: id.into(),
            name: None,
            status: None,
            area: None,
            has_constraints: None,
        }
    }

    #[tokio::test]
    async fn fails_on_absent_parcel() {
        let service = Service::new(InMemory::default());

        let err = service.execute(unchanged(123)).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotExists(id) if *id == 123.into(),
        ));
    }

    #[tokio::test]
    async fn modifies_supplied_fields_only() {
        let service = service_with_alice_house().await;

        let updated = service
            .execute(UpdateParcel {
                area: Some(423.0),
                ..unchanged(123)
            })
            .await
            .unwrap();
        assert_eq!(
            updated,
            Parcel {
                id: 123.into(),
                name: parcel::Name::from("Alice House".to_owned()),
                status: parcel::Status::Saved,
                area: 423.0,
                has_constraints: true,
            },
        );

        let retrieved = service
            .execute(query::parcel::ById::by(123.into()))
            .await
            .unwrap();
        assert_eq!(retrieved, Some(updated));
    }

    #[tokio::test]
    async fn absent_status_leaves_status_unchanged() {
        let service = service_with_alice_house().await;

        let updated = service
            .execute(UpdateParcel {
                name: Some(parcel::Name::from("Alice Laboratory".to_owned())),
                ..unchanged(123)
            })
            .await
            .unwrap();
        assert_eq!(updated.status, parcel::Status::Saved);
        assert_eq!(
            updated.name,
            parcel::Name::from("Alice Laboratory".to_owned()),
        );
    }

    #[tokio::test]
    async fn replaces_all_supplied_fields() {
        let service = service_with_alice_house().await;

        let updated = service
            .execute(UpdateParcel {
                id: 123.into(),
                name: Some(parcel::Name::from("Bob Meadow".to_owned())),
                status: Some(parcel::Status::Approved),
                area: Some(7.5),
                has_constraints: Some(false),
            })
            .await
            .unwrap();
        assert_eq!(
            updated,
            Parcel {
                id: 123.into(),
                name: parcel::Name::from("Bob Meadow".to_owned()),
                status: parcel::Status::Approved,
                area: 7.5,
                has_constraints: false,
            },
        );
    }

    #[tokio::test]
    async fn never_alters_id() {
        let service = service_with_alice_house().await;

        let updated = service
            .execute(UpdateParcel {
                status: Some(parcel::Status::UnderConsideration),
                ..unchanged(123)
            })
            .await
            .unwrap();
        assert_eq!(updated.id, 123.into());

        let retrieved = service
            .execute(query::parcel::ById::by(123.into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.id, 123.into());
    }

    #[tokio::test]
    async fn serializes_concurrent_updates_of_same_id() {
        let service = service_with_alice_house().await;

        let (renamed, resized) = tokio::join!(
            service.execute(UpdateParcel {
                name: Some(parcel::Name::from("Bob Meadow".to_owned())),
                ..unchanged(123)
            }),
            service.execute(UpdateParcel {
                area: Some(423.0),
                ..unchanged(123)
            }),
        );
        drop(renamed.unwrap());
        drop(resized.unwrap());

        // Neither read-modify-write clobbers the other's field.
        let retrieved = service
            .execute(query::parcel::ById::by(123.into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.name, parcel::Name::from("Bob Meadow".to_owned()));
        assert_eq!(retrieved.area, 423.0);
    }
}
