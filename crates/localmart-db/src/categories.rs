//! Read operations for `categories` and `sub_categories`.

use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubCategoryRow {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
}

/// A category with its sub-categories, ready for a filter dropdown.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub sub_categories: Vec<SubCategoryRow>,
}

/// List all categories ordered by `name ASC`, each with its sub-categories
/// ordered by `name ASC`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if either query fails.
pub async fn list_categories_with_sub_categories(
    pool: &PgPool,
) -> Result<Vec<CategoryRow>, sqlx::Error> {
    let categories: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, name FROM categories ORDER BY name ASC")
            .fetch_all(pool)
            .await?;

    let subs = sqlx::query_as::<_, SubCategoryRow>(
        "SELECT id, category_id, name FROM sub_categories ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(group_sub_categories(categories, subs))
}

fn group_sub_categories(
    categories: Vec<(i64, String)>,
    subs: Vec<SubCategoryRow>,
) -> Vec<CategoryRow> {
    let mut rows: Vec<CategoryRow> = categories
        .into_iter()
        .map(|(id, name)| CategoryRow {
            id,
            name,
            sub_categories: Vec::new(),
        })
        .collect();

    for sub in subs {
        if let Some(parent) = rows.iter_mut().find(|c| c.id == sub.category_id) {
            parent.sub_categories.push(sub);
        }
    }

    rows
}
