use async_trait::async_trait;
use uuid::Uuid;

use models::restaurant::{NewRestaurant, Restaurant, RestaurantPatch};

use super::domain::RestaurantFilter;
use crate::errors::ServiceError;
use crate::pagination::{Page, QueryResult};

/// Repository abstraction over the restaurant collection.
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Restaurant>, ServiceError>;
    async fn is_name_taken(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, ServiceError>;
    async fn insert(&self, new: NewRestaurant) -> Result<Restaurant, ServiceError>;
    async fn paginate(&self, filter: &RestaurantFilter, page: &Page) -> Result<QueryResult<Restaurant>, ServiceError>;
    /// Merge `patch` into `current` and persist the result.
    async fn update(&self, current: Restaurant, patch: RestaurantPatch) -> Result<Restaurant, ServiceError>;
    /// Delete one record; returns whether it existed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ServiceError>;
}

/// Simple in-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::HashMap;

    use models::restaurant::ActiveModel;
    use sea_orm::{IntoActiveModel, TryIntoModel};
    use tokio::sync::RwLock;

    use crate::pagination::{SortField, SortKey, SortOrder};

    #[derive(Default)]
    struct Rows {
        next_seq: u64,
        // value: (insertion sequence, record)
        by_id: HashMap<Uuid, (u64, Restaurant)>,
    }

    #[derive(Default)]
    pub struct InMemoryRestaurantRepository {
        rows: RwLock<Rows>,
    }

    impl InMemoryRestaurantRepository {
        pub async fn len(&self) -> usize {
            self.rows.read().await.by_id.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.len().await == 0
        }
    }

    fn compare(a: &Restaurant, b: &Restaurant, key: &SortKey) -> Ordering {
        let ord = match key.field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
            SortField::ReviewCount => a.review_count.cmp(&b.review_count),
            SortField::City => a.city.cmp(&b.city),
            SortField::State => a.state.cmp(&b.state),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        match key.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }

    fn materialize(am: ActiveModel) -> Result<Restaurant, ServiceError> {
        am.try_into_model().map_err(|e| ServiceError::Db(e.to_string()))
    }

    #[async_trait]
    impl RestaurantRepository for InMemoryRestaurantRepository {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError> {
            let rows = self.rows.read().await;
            Ok(rows.by_id.get(&id).map(|(_, r)| r.clone()))
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Restaurant>, ServiceError> {
            let rows = self.rows.read().await;
            let name = name.trim();
            Ok(rows.by_id.values().find(|(_, r)| r.name == name).map(|(_, r)| r.clone()))
        }

        async fn is_name_taken(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, ServiceError> {
            let rows = self.rows.read().await;
            let name = name.trim();
            Ok(rows.by_id.values().any(|(_, r)| r.name == name && Some(r.id) != exclude_id))
        }

        async fn insert(&self, new: NewRestaurant) -> Result<Restaurant, ServiceError> {
            let new = new.normalized();
            new.validate()?;
            let mut am = new.into_active_model();
            am.stamp(true);
            let created = materialize(am)?;

            let mut rows = self.rows.write().await;
            let seq = rows.next_seq;
            rows.next_seq += 1;
            rows.by_id.insert(created.id, (seq, created.clone()));
            Ok(created)
        }

        async fn paginate(&self, filter: &RestaurantFilter, page: &Page) -> Result<QueryResult<Restaurant>, ServiceError> {
            let rows = self.rows.read().await;
            let name = filter.name.as_deref().map(str::trim);
            let mut matched: Vec<&(u64, Restaurant)> = rows
                .by_id
                .values()
                .filter(|(_, r)| name.map_or(true, |n| r.name == n))
                .collect();
            matched.sort_by(|(sa, a), (sb, b)| {
                page.sort
                    .iter()
                    .map(|key| compare(a, b, key))
                    .find(|o| o.is_ne())
                    .unwrap_or_else(|| sa.cmp(sb))
            });
            let total = matched.len() as u64;
            let results = matched
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit as usize)
                .map(|(_, r)| r.clone())
                .collect();
            Ok(QueryResult::new(results, page, total))
        }

        async fn update(&self, current: Restaurant, patch: RestaurantPatch) -> Result<Restaurant, ServiceError> {
            let patch = patch.normalized();
            patch.validate()?;
            let mut rows = self.rows.write().await;
            let Some((seq, _)) = rows.by_id.get(&current.id) else {
                return Err(ServiceError::not_found("restaurant"));
            };
            let seq = *seq;
            let mut am: ActiveModel = current.into();
            patch.apply(&mut am);
            am.stamp(false);
            let updated = materialize(am)?;
            rows.by_id.insert(updated.id, (seq, updated.clone()));
            Ok(updated)
        }

        async fn delete_by_id(&self, id: Uuid) -> Result<bool, ServiceError> {
            let mut rows = self.rows.write().await;
            Ok(rows.by_id.remove(&id).is_some())
        }
    }
}
