//! [`Parcel`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{parcel, Parcel},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Constructs a [`Parcel`] out of the provided [`Row`].
fn parcel_from_row(row: &Row) -> Parcel {
    Parcel {
        id: row.get("id"),
        name: row.get("name"),
        status: row.get("status"),
        area: row.get("area"),
        has_constraints: row.get("has_constraints"),
    }
}

impl<C> Database<Select<By<Option<Parcel>, parcel::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Parcel>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Parcel>, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: parcel::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, status, area, has_constraints \
            FROM land_parcels \
            WHERE id = $1::INT8 \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(parcel_from_row))
    }
}

impl<C> Database<Select<By<bool, parcel::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<bool, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: parcel::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM land_parcels \
            WHERE id = $1::INT8 \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.is_some())
    }
}

impl<C> Database<Select<By<Vec<Parcel>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Parcel>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Parcel>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, status, area, has_constraints \
            FROM land_parcels \
            ORDER BY id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(parcel_from_row)
            .collect())
    }
}

impl<C> Database<Insert<Parcel>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Parcel>, Ok = Parcel, Err = Traced<database::Error>>,
{
    type Ok = Parcel;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(parcel): Insert<Parcel>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(parcel)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Parcel>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Parcel;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(parcel): Update<Parcel>,
    ) -> Result<Self::Ok, Self::Err> {
        let Parcel {
            id,
            name,
            status,
            area,
            has_constraints,
        } = parcel;

        const SQL: &str = "\
            INSERT INTO land_parcels (\
                id, name, status, area, has_constraints \
            ) VALUES (\
                $1::INT8, $2::VARCHAR, $3::INT2, $4::FLOAT8, $5::BOOL \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                status = EXCLUDED.status, \
                area = EXCLUDED.area, \
                has_constraints = EXCLUDED.has_constraints \
            RETURNING id, name, status, area, has_constraints";
        self.query_opt(SQL, &[&id, &name, &status, &area, &has_constraints])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                parcel_from_row(&row.expect("upsert always returns the row"))
            })
    }
}

impl<C> Database<Delete<By<Parcel, parcel::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Parcel, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: parcel::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM land_parcels \
            WHERE id = $1::INT8";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Parcel, parcel::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Parcel, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: parcel::Id = by.into_inner();

        // `DO UPDATE` locks the row even when it already exists, unlike
        // `DO NOTHING`.
        const SQL: &str = "\
            INSERT INTO land_parcels_lock \
            VALUES ($1::INT8) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
