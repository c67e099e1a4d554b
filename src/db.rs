//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, category::create_category_table};

/// Create the application's tables if they do not exist yet.
///
/// # Errors
/// Returns an error if the schema cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
