use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, Select};
use uuid::Uuid;

use models::restaurant::{self, Column, Entity, NewRestaurant, Restaurant, RestaurantPatch};

use crate::errors::ServiceError;
use crate::pagination::{Page, QueryResult, SortField, SortOrder};
use crate::restaurant::domain::RestaurantFilter;
use crate::restaurant::repository::RestaurantRepository;

pub struct SeaOrmRestaurantRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmRestaurantRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn column(field: SortField) -> Column {
    match field {
        SortField::Name => Column::Name,
        SortField::Rating => Column::Rating,
        SortField::ReviewCount => Column::ReviewCount,
        SortField::City => Column::City,
        SortField::State => Column::State,
        SortField::CreatedAt => Column::CreatedAt,
        SortField::UpdatedAt => Column::UpdatedAt,
    }
}

fn sorted(mut select: Select<Entity>, page: &Page) -> Select<Entity> {
    for key in &page.sort {
        let order = match key.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        select = select.order_by(column(key.field), order);
    }
    // stable paging across equal sort values
    select.order_by_asc(Column::Id)
}

#[async_trait::async_trait]
impl RestaurantRepository for SeaOrmRestaurantRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError> {
        Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Restaurant>, ServiceError> {
        Ok(restaurant::find_by_name(&self.db, name).await?)
    }

    async fn is_name_taken(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, ServiceError> {
        Ok(restaurant::is_name_taken(&self.db, name, exclude_id).await?)
    }

    async fn insert(&self, new: NewRestaurant) -> Result<Restaurant, ServiceError> {
        Ok(restaurant::create(&self.db, new).await?)
    }

    async fn paginate(&self, filter: &RestaurantFilter, page: &Page) -> Result<QueryResult<Restaurant>, ServiceError> {
        let mut select = Entity::find();
        if let Some(name) = &filter.name {
            select = select.filter(Column::Name.eq(name.trim()));
        }
        let paginator = sorted(select, page).paginate(&self.db, page.limit);
        let totals = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let results = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(QueryResult::new(results, page, totals.number_of_items))
    }

    async fn update(&self, current: Restaurant, patch: RestaurantPatch) -> Result<Restaurant, ServiceError> {
        Ok(restaurant::update(&self.db, current, patch).await?)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(restaurant::hard_delete(&self.db, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::QueryOptions;
    use crate::test_support::{db_tests_enabled, get_db};
    use configs::PaginationConfig;

    fn new_restaurant(name: &str, rating: f64) -> NewRestaurant {
        NewRestaurant {
            name: name.to_string(),
            description: "Wood-fired pizza".into(),
            address: "9 Quay Rd".into(),
            city: "Hobart".into(),
            state: "TAS".into(),
            rating: Some(rating),
            review_count: Some(3),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn paginate_filters_by_name_and_sorts() -> anyhow::Result<()> {
        if !db_tests_enabled() {
            return Ok(());
        }
        let repo = SeaOrmRestaurantRepository::new(get_db().await?);
        let name = format!("paged_{}", Uuid::new_v4());
        for rating in [1.0, 3.0, 2.0] {
            repo.insert(new_restaurant(&name, rating)).await?;
        }

        let filter = RestaurantFilter { name: Some(name.clone()) };
        let options = QueryOptions {
            sort_by: crate::pagination::parse_sort_by("rating:desc").map_err(anyhow::Error::msg)?,
            limit: Some(2),
            page: Some(1),
        };
        let page = options.normalize(&PaginationConfig::default());
        let first = repo.paginate(&filter, &page).await?;
        assert_eq!(first.total_results, 3);
        assert_eq!(first.total_pages, 2);
        let ratings: Vec<f64> = first.results.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![3.0, 2.0]);

        let page = QueryOptions { page: Some(2), ..options }.normalize(&PaginationConfig::default());
        let second = repo.paginate(&filter, &page).await?;
        assert_eq!(second.results.len(), 1);
        assert_eq!(second.results[0].rating, 1.0);

        for r in first.results.into_iter().chain(second.results) {
            assert!(repo.delete_by_id(r.id).await?);
        }
        Ok(())
    }

    #[tokio::test]
    async fn name_check_excludes_own_record() -> anyhow::Result<()> {
        if !db_tests_enabled() {
            return Ok(());
        }
        let repo = SeaOrmRestaurantRepository::new(get_db().await?);
        let name = format!("owned_{}", Uuid::new_v4());
        let created = repo.insert(new_restaurant(&name, 4.0)).await?;

        assert!(repo.is_name_taken(&name, None).await?);
        assert!(!repo.is_name_taken(&name, Some(created.id)).await?);
        assert_eq!(repo.find_by_name(&format!(" {name} ")).await?.map(|r| r.id), Some(created.id));

        assert!(repo.delete_by_id(created.id).await?);
        assert!(!repo.delete_by_id(created.id).await?);
        assert!(repo.find_by_id(created.id).await?.is_none());
        Ok(())
    }
}
