//! [`Command`] for creating a new [`Parcel`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{parcel, Parcel},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Parcel`].
///
/// The [`parcel::Id`] is chosen by the caller and must not be occupied yet.
#[derive(Clone, Debug)]
pub struct CreateParcel {
    /// [`parcel::Id`] of a new [`Parcel`].
    pub id: parcel::Id,

    /// [`parcel::Name`] of a new [`Parcel`].
    pub name: parcel::Name,

    /// [`parcel::Status`] of a new [`Parcel`].
    pub status: parcel::Status,

    /// [`parcel::Area`] of a new [`Parcel`].
    pub area: parcel::Area,

    /// Indicator whether a new [`Parcel`] has planning constraints.
    pub has_constraints: parcel::HasConstraints,
}

impl<Db> Command<CreateParcel> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Parcel, parcel::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<bool, parcel::Id>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<Parcel>, Ok = Parcel, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Parcel;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateParcel) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateParcel {
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

        let occupied = tx
            .execute(Select(By::<bool, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied {
            return Err(tracerr::new!(E::AlreadyExists(id)));
        }

        let parcel = tx
            .execute(Insert(Parcel {
                id,
                name,
                status,
                area,
                has_constraints,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::debug!(id = %parcel.id, "created `Parcel`");
        Ok(parcel)
    }
}

/// Error of [`CreateParcel`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Parcel`] with the provided [`parcel::Id`] already exists.
    #[display("`Parcel` with `{_0}` ID already exists")]
    AlreadyExists(#[error(not(source))] parcel::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        domain::{parcel, Parcel},
        infra::InMemory,
        query, Service,
    };

    use super::{CreateParcel, ExecutionError};

    fn alice_house(id: i64) -> CreateParcel {
        CreateParcel {
            id: id.into(),
            name: parcel::Name::from("Alice House".to_owned()),
            status: parcel::Status::Saved,
            area: 42.0,
            has_constraints: true,
        }
    }

    #[tokio::test]
    async fn stores_new_parcel() {
        let service = Service::new(InMemory::default());

        let created = service.execute(alice_house(123)).await.unwrap();
        assert_eq!(
            created,
            Parcel {
                id: 123.into(),
                name: parcel::Name::from("Alice House".to_owned()),
                status: parcel::Status::Saved,
                area: 42.0,
                has_constraints: true,
            },
        );

        let retrieved = service
            .execute(query::parcel::ById::by(123.into()))
            .await
            .unwrap();
        assert_eq!(retrieved, Some(created));
    }

    #[tokio::test]
    async fn rejects_occupied_id() {
        let service = Service::new(InMemory::default());

        let first = service.execute(alice_house(123)).await.unwrap();

        let err = service
            .execute(CreateParcel {
                id: 123.into(),
                name: parcel::Name::from("Bob Meadow".to_owned()),
                status: parcel::Status::Approved,
                area: 7.5,
                has_constraints: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyExists(id) if *id == 123.into(),
        ));

        // The original record is left untouched.
        let retrieved = service
            .execute(query::parcel::ById::by(123.into()))
            .await
            .unwrap();
        assert_eq!(retrieved, Some(first));
    }

    #[tokio::test]
    async fn serializes_concurrent_creations_of_same_id() {
        let service = Service::new(InMemory::default());

        let (first, second) = tokio::join!(
            service.execute(alice_house(123)),
            service.execute(CreateParcel {
                id: 123.into(),
                name: parcel::Name::from("Bob Meadow".to_owned()),
                status: parcel::Status::Approved,
                area: 7.5,
                has_constraints: false,
            }),
        );

        // Exactly one creation wins, and the stored record is the winner's.
        assert!(first.is_ok() != second.is_ok());
        let winner = first.or(second).unwrap();
        let retrieved = service
            .execute(query::parcel::ById::by(123.into()))
            .await
            .unwrap();
        assert_eq!(retrieved, Some(winner));
    }
}
