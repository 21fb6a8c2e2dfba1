//! In-memory [`Database`] implementation.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{parcel, Parcel},
    infra::{database, Database},
};

/// In-memory [`Database`] keeping [`Parcel`]s in a [`BTreeMap`].
///
/// Serves as the reference store for tests. Listing iterates the map in
/// [`parcel::Id`] order, so results are deterministic. Conflicting writers to
/// the same [`parcel::Id`] serialize on the per-id [`Lock`]s acquired by
/// [`Transaction`]s.
#[derive(Clone, Debug, Default)]
pub struct InMemory {
    /// Stored [`Parcel`]s, keyed by their [`parcel::Id`].
    parcels: Arc<Mutex<BTreeMap<parcel::Id, Parcel>>>,

    /// Per-[`parcel::Id`] locks held by [`Transaction`]s.
    locks: Arc<Mutex<HashMap<parcel::Id, Arc<Mutex<()>>>>>,
}

/// [`Transact`]ion over an [`InMemory`] database.
///
/// [`Lock`]s acquired by this [`Transaction`] are held until it's
/// [`Commit`]ted or dropped, so check-then-act sequences on the same
/// [`parcel::Id`] cannot interleave.
#[derive(Debug)]
pub struct Transaction {
    /// [`InMemory`] database this [`Transaction`] operates on.
    store: InMemory,

    /// Guards of the [`Lock`]s acquired by this [`Transaction`].
    guards: Mutex<Vec<OwnedMutexGuard<()>>>,
}

impl Database<Transact> for InMemory {
    type Ok = Transaction;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Transaction {
            store: self.clone(),
            guards: Mutex::new(Vec::new()),
        })
    }
}

impl Database<Select<By<Option<Parcel>, parcel::Id>>> for InMemory {
    type Ok = Option<Parcel>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Parcel>, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.parcels.lock().await.get(&id).cloned())
    }
}

impl Database<Select<By<bool, parcel::Id>>> for InMemory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<bool, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.parcels.lock().await.contains_key(&id))
    }
}

impl Database<Select<By<Vec<Parcel>, ()>>> for InMemory {
    type Ok = Vec<Parcel>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Parcel>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.parcels.lock().await.values().cloned().collect())
    }
}

impl Database<Lock<By<Parcel, parcel::Id>>> for Transaction {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Parcel, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let lock =
            Arc::clone(self.store.locks.lock().await.entry(id).or_default());
        let guard = lock.lock_owned().await;
        self.guards.lock().await.push(guard);
        Ok(())
    }
}

impl Database<Select<By<Option<Parcel>, parcel::Id>>> for Transaction {
    type Ok = Option<Parcel>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        op: Select<By<Option<Parcel>, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.store.execute(op).await
    }
}

impl Database<Select<By<bool, parcel::Id>>> for Transaction {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        op: Select<By<bool, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.store.execute(op).await
    }
}

impl Database<Insert<Parcel>> for Transaction {
    type Ok = Parcel;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(parcel): Insert<Parcel>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(parcel)).await
    }
}

impl Database<Update<Parcel>> for Transaction {
    type Ok = Parcel;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(parcel): Update<Parcel>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.store
                .parcels
                .lock()
                .await
                .insert(parcel.id, parcel.clone()),
        );
        Ok(parcel)
    }
}

impl Database<Delete<By<Parcel, parcel::Id>>> for Transaction {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Parcel, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        drop(self.store.parcels.lock().await.remove(&id));
        Ok(())
    }
}

impl Database<Commit> for Transaction {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        // Writes are applied eagerly, so only the locks need releasing.
        self.guards.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::{By, Commit, Lock, Transact};

    use crate::{
        domain::{parcel, Parcel},
        infra::Database as _,
    };

    use super::InMemory;

    fn lock(id: i64) -> Lock<By<Parcel, parcel::Id>> {
        Lock(By::new(id.into()))
    }

    #[tokio::test]
    async fn lock_blocks_conflicting_transaction() {
        let store = InMemory::default();

        let tx1 = store.execute(Transact).await.unwrap();
        tx1.execute(lock(1)).await.unwrap();

        let tx2 = store.execute(Transact).await.unwrap();
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            tx2.execute(lock(1)),
        )
        .await;
        assert!(blocked.is_err());

        tx1.execute(Commit).await.unwrap();
        tx2.execute(lock(1)).await.unwrap();
    }

    #[tokio::test]
    async fn lock_releases_on_drop() {
        let store = InMemory::default();

        let tx1 = store.execute(Transact).await.unwrap();
        tx1.execute(lock(1)).await.unwrap();
        drop(tx1);

        let tx2 = store.execute(Transact).await.unwrap();
        tx2.execute(lock(1)).await.unwrap();
    }

    #[tokio::test]
    async fn locks_are_per_id() {
        let store = InMemory::default();

        let tx1 = store.execute(Transact).await.unwrap();
        tx1.execute(lock(1)).await.unwrap();

        let tx2 = store.execute(Transact).await.unwrap();
        tx2.execute(lock(2)).await.unwrap();
    }
}
