use crate::entities::prelude::*;
use crate::entities::tags;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Meal tags every fresh install starts with.
const DEFAULT_TAGS: &[(&str, &str, &str)] = &[
    ("Breakfast", "#E26C2D", "breakfast"),
    ("Lunch", "#49B64E", "lunch"),
    ("Dinner", "#8775D2", "dinner"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = sea_orm_migration::sea_query::Query::insert();
        insert
            .into_table(Tags)
            .columns([tags::Column::Name, tags::Column::Color, tags::Column::Slug]);

        for (name, color, slug) in DEFAULT_TAGS {
            insert.values_panic([(*name).into(), (*color).into(), (*slug).into()]);
        }

        manager.exec_stmt(insert.to_owned()).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let slugs = DEFAULT_TAGS.iter().map(|(_, _, slug)| *slug);
        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(Tags)
            .and_where(Expr::col(tags::Column::Slug).is_in(slugs))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
