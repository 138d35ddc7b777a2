pub mod account;
pub mod department;
pub mod location;
pub mod profile;

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
};

/// One generic create-one-or-many primitive shared by every directory
/// resource: inserts each record and returns the stored models.
pub(crate) async fn insert_all<A, C, I>(
    conn: &C,
    items: I,
) -> Result<Vec<<A::Entity as EntityTrait>::Model>>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
    I: IntoIterator<Item = A>,
{
    let mut out = Vec::new();
    for item in items {
        out.push(item.insert(conn).await.context("Failed to insert record")?);
    }
    Ok(out)
}
