//! [`Query`] collection related to all [`Parcel`]s.

use common::operations::By;

use crate::domain::Parcel;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Parcel`]s, ordered by their [`parcel::Id`].
///
/// [`parcel::Id`]: crate::domain::parcel::Id
pub type All = DatabaseQuery<By<Vec<Parcel>, ()>>;

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{command::CreateParcel, domain::parcel, infra::InMemory, Service};

    use super::All;

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let service = Service::new(InMemory::default());

        let parcels = service.execute(All::by(())).await.unwrap();
        assert!(parcels.is_empty());
    }

    #[tokio::test]
    async fn lists_every_stored_parcel() {
        let service = Service::new(InMemory::default());
        for (id, name, area) in
            [(246, "Bob Meadow", 7.5), (123, "Alice House", 42.0)]
        {
            drop(
                service
                    .execute(CreateParcel {
                        id: id.into(),
                        name: parcel::Name::from(name.to_owned()),
                        status: parcel::Status::Saved,
                        area,
                        has_constraints: true,
                    })
                    .await
                    .unwrap(),
            );
        }

        let parcels = service.execute(All::by(())).await.unwrap();
        assert_eq!(parcels.len(), 2);
        assert_eq!(parcels[0].id, 123.into());
        assert_eq!(
            parcels[0].name,
            parcel::Name::from("Alice House".to_owned()),
        );
        assert_eq!(parcels[0].area, 42.0);
        assert_eq!(parcels[1].id, 246.into());
        assert_eq!(parcels[1].name, parcel::Name::from("Bob Meadow".to_owned()));
        assert_eq!(parcels[1].area, 7.5);
    }
}
