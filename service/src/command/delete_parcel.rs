//! [`Command`] for deleting a [`Parcel`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{parcel, Parcel},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Parcel`] by its [`parcel::Id`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteParcel {
    /// [`parcel::Id`] of the [`Parcel`] to delete.
    pub id: parcel::Id,
}

impl<Db> Command<DeleteParcel> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Parcel, parcel::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<bool, parcel::Id>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Parcel, parcel::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteParcel) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteParcel { id } = cmd;

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
        if !occupied {
            return Err(tracerr::new!(E::NotExists(id)));
        }

        tx.execute(Delete(By::<Parcel, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::debug!(%id, "deleted `Parcel`");
        Ok(())
    }
}

/// Error of [`DeleteParcel`] [`Command`] execution.
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
        command::CreateParcel, domain::parcel, infra::InMemory, query, Service,
    };

    use super::{DeleteParcel, ExecutionError};

    #[tokio::test]
    async fn fails_on_absent_parcel() {
        let service = Service::new(InMemory::default());

        let err = service
            .execute(DeleteParcel { id: 123.into() })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotExists(id) if *id == 123.into(),
        ));
    }

    #[tokio::test]
    async fn removes_existing_parcel() {
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
            .execute(DeleteParcel { id: 123.into() })
            .await
            .unwrap();

        let retrieved = service
            .execute(query::parcel::ById::by(123.into()))
            .await
            .unwrap();
        assert_eq!(retrieved, None);

        // A second deletion fails the same way as for a never existed ID.
        let err = service
            .execute(DeleteParcel { id: 123.into() })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NotExists(_)));
    }
}
