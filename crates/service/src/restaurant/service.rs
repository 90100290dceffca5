use std::sync::Arc;

use configs::PaginationConfig;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::restaurant::Restaurant;

use super::domain::{CreateRestaurantInput, RestaurantFilter, UpdateRestaurantInput};
use super::repository::RestaurantRepository;
use crate::errors::ServiceError;
use crate::pagination::{QueryOptions, QueryResult};

/// Restaurant business service independent of web framework
pub struct RestaurantService<R: RestaurantRepository> {
    repo: Arc<R>,
    pagination: PaginationConfig,
}

impl<R: RestaurantRepository> RestaurantService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self::with_pagination(repo, PaginationConfig::default()) }

    /// Page sizes are normalized per query, so a zero `max_limit` behaves as 1.
    pub fn with_pagination(repo: Arc<R>, pagination: PaginationConfig) -> Self { Self { repo, pagination } }

    /// Create a restaurant whose name is not used yet.
    ///
    /// # Examples
    /// ```
    /// use service::restaurant::{RestaurantService, domain::CreateRestaurantInput, repository::mock::InMemoryRestaurantRepository};
    /// use std::sync::Arc;
    /// let svc = RestaurantService::new(Arc::new(InMemoryRestaurantRepository::default()));
    /// let input = CreateRestaurantInput {
    ///     name: "Blue Door".into(), description: "Bistro".into(), address: "1 Main St".into(),
    ///     city: "Boise".into(), state: "ID".into(), rating: 4.0, review_count: 10,
    ///     location: Some([-116.2, 43.6]), menu: None,
    /// };
    /// let created = tokio_test::block_on(svc.create_restaurant(input.clone())).unwrap();
    /// assert_eq!(created.name, "Blue Door");
    /// assert!(tokio_test::block_on(svc.create_restaurant(input)).is_err());
    /// ```
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_restaurant(&self, input: CreateRestaurantInput) -> Result<Restaurant, ServiceError> {
        if self.repo.is_name_taken(&input.name, None).await? {
            debug!("name already taken");
            return Err(ServiceError::NameAlreadyExists);
        }
        let created = self.repo.insert(input.into_new_restaurant()?).await?;
        info!(restaurant_id = %created.id, name = %created.name, "restaurant_created");
        Ok(created)
    }

    /// Paginated listing. Missing options fall back to the configured defaults.
    #[instrument(skip(self))]
    pub async fn query_restaurants(
        &self,
        filter: &RestaurantFilter,
        options: &QueryOptions,
    ) -> Result<QueryResult<Restaurant>, ServiceError> {
        let page = options.normalize(&self.pagination);
        self.repo.paginate(filter, &page).await
    }

    #[instrument(skip(self))]
    pub async fn get_restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError> {
        self.repo.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_restaurant_by_name(&self, name: &str) -> Result<Option<Restaurant>, ServiceError> {
        self.repo.find_by_name(name).await
    }

    /// Merge the provided fields into the stored record.
    #[instrument(skip(self, input))]
    pub async fn update_restaurant_by_id(&self, id: Uuid, input: UpdateRestaurantInput) -> Result<Restaurant, ServiceError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("restaurant"))?;
        if let Some(name) = &input.name {
            if self.repo.is_name_taken(name, Some(current.id)).await? {
                debug!(name = %name, "rename rejected, name already taken");
                return Err(ServiceError::NameAlreadyExists);
            }
        }
        let updated = self.repo.update(current, input.into_patch()?).await?;
        info!(restaurant_id = %updated.id, "restaurant_updated");
        Ok(updated)
    }

    /// Delete the record and hand it back.
    #[instrument(skip(self))]
    pub async fn delete_restaurant_by_id(&self, id: Uuid) -> Result<Restaurant, ServiceError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("restaurant"))?;
        if !self.repo.delete_by_id(current.id).await? {
            return Err(ServiceError::not_found("restaurant"));
        }
        info!(restaurant_id = %current.id, "restaurant_deleted");
        Ok(current)
    }
}
