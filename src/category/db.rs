//! Database operations for categories.

use rusqlite::{Connection, Row};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName, CategoryUpdate, NewCategory},
};

/// Create a category and return it with its generated ID and timestamps.
///
/// # Errors
/// Returns [Error::DuplicateCategoryName] if a category with the same name
/// already exists.
pub fn insert_category(
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    let now = OffsetDateTime::now_utc();
    let timestamp = timestamp_to_sql(now)?;

    connection.execute(
        "INSERT INTO category (name, provider_id, main_image, icon_image, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        (
            new_category.name.as_ref(),
            &new_category.provider_id,
            &new_category.main_image,
            &new_category.icon_image,
            &timestamp,
            &timestamp,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name: new_category.name,
        provider_id: new_category.provider_id,
        main_image: new_category.main_image,
        icon_image: new_category.icon_image,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, name, provider_id, main_image, icon_image, created_at, updated_at
             FROM category WHERE id = :id;",
        )?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories, newest-created first.
///
/// Row ids are assigned in insertion order, so ordering on them gives
/// creation order without relying on timestamp collation.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, provider_id, main_image, icon_image, created_at, updated_at
             FROM category ORDER BY id DESC;",
        )?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Apply a partial update to a category and return the updated record.
///
/// Fields left as `None` keep their current value; `updated_at` is always
/// refreshed.
///
/// # Errors
/// Returns [Error::NotFound] if no category has `category_id`, and
/// [Error::DuplicateCategoryName] if the new name is already taken.
pub fn update_category(
    category_id: CategoryId,
    update: CategoryUpdate,
    connection: &Connection,
) -> Result<Category, Error> {
    let existing = get_category(category_id, connection)?;

    let now = OffsetDateTime::now_utc();
    let name = update.name.unwrap_or(existing.name);
    let provider_id = update.provider_id.unwrap_or(existing.provider_id);
    let main_image = update.main_image.unwrap_or(existing.main_image);
    let icon_image = update.icon_image.unwrap_or(existing.icon_image);

    let rows_affected = connection.execute(
        "UPDATE category
         SET name = ?1, provider_id = ?2, main_image = ?3, icon_image = ?4, updated_at = ?5
         WHERE id = ?6;",
        (
            name.as_ref(),
            &provider_id,
            &main_image,
            &icon_image,
            &timestamp_to_sql(now)?,
            category_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Category {
        id: category_id,
        name,
        provider_id,
        main_image,
        icon_image,
        created_at: existing.created_at,
        updated_at: now,
    })
}

/// Delete a category by ID. Deleting an absent ID is a no-op, not an error.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    connection.execute("DELETE FROM category WHERE id = ?1;", [category_id])?;

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            provider_id TEXT NOT NULL,
            main_image TEXT NOT NULL,
            icon_image TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn timestamp_to_sql(timestamp: OffsetDateTime) -> Result<String, Error> {
    timestamp
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidTimestamp(error.to_string()))
}

fn timestamp_from_sql(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let raw: String = row.get(index)?;

    OffsetDateTime::parse(&raw, &Rfc3339).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let provider_id = row.get(2)?;
    let main_image = row.get(3)?;
    let icon_image = row.get(4)?;
    let created_at = timestamp_from_sql(row, 5)?;
    let updated_at = timestamp_from_sql(row, 6)?;

    Ok(Category {
        id,
        name,
        provider_id,
        main_image,
        icon_image,
        created_at,
        updated_at,
    })
}
