use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    sea_query::Query,
};
use std::collections::HashSet;

use super::page_in_range;
use super::recipe_lists::is_unique_violation;
use super::user::User;
use crate::entities::{subscriptions, users};

pub struct SubscriptionRepository {
    conn: DatabaseConnection,
}

impl SubscriptionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `false` when already subscribed. A self-subscription fails
    /// the table's CHECK constraint and comes back as an error.
    pub async fn add(&self, user_id: i32, author_id: i32) -> Result<bool> {
        let result = subscriptions::Entity::insert(subscriptions::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
        })
        .exec_without_returning(&self.conn)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err).context("Failed to insert subscription"),
        }
    }

    pub async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.eq(author_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete subscription")?;

        Ok(result.rows_affected > 0)
    }

    /// Which of `author_ids` the user follows
    pub async fn followed_among(&self, user_id: i32, author_ids: &[i32]) -> Result<HashSet<i32>> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.is_in(author_ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query subscriptions")?;

        Ok(rows.into_iter().map(|s| s.author_id).collect())
    }

    /// One page of authors the user follows, ordered by id, plus the total.
    pub async fn authors_page(
        &self,
        user_id: i32,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<User>, u64)> {
        let paginator = users::Entity::find()
            .filter(
                users::Column::Id.in_subquery(
                    Query::select()
                        .column(subscriptions::Column::AuthorId)
                        .from(subscriptions::Entity)
                        .and_where(subscriptions::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            )
            .order_by_asc(users::Column::Id)
            .paginate(&self.conn, page_size);

        let total = paginator
            .num_items()
            .await
            .context("Failed to count subscriptions")?;
        let authors = if page_in_range(page, page_size, total) {
            paginator
                .fetch_page(page - 1)
                .await
                .context("Failed to fetch subscriptions page")?
        } else {
            Vec::new()
        };

        Ok((authors.into_iter().map(User::from).collect(), total))
    }
}
