use sea_orm::DatabaseConnection;

use crate::{Database, Error};

/// Holds at most one reference to a [`Database`] for as long as it lives.
///
/// Creating the wrapper does not open anything. The reference taken by
/// [`Connection::connect`] is given back by [`Connection::release`], or by
/// `Drop` on any other exit path. A wrapper that never connected releases
/// nothing.
#[derive(Debug)]
pub struct Connection<'a> {
    database: &'a Database,
    connection: Option<DatabaseConnection>,
}

impl<'a> Connection<'a> {
    pub(crate) fn new(database: &'a Database) -> Self {
        Self {
            database,
            connection: None,
        }
    }

    pub async fn connect(&mut self) -> Result<&DatabaseConnection, Error> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => self.database.connect().await?,
        };

        Ok(&*self.connection.insert(connection))
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Releases the reference and waits for the physical close if it was the last one.
    pub async fn release(mut self) -> Result<(), Error> {
        if self.connection.take().is_some() {
            self.database.close().await?;
        }

        Ok(())
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        if self.connection.take().is_none() {
            return;
        }

        match self.database.release() {
            Ok(Some(connection)) => close_in_background(connection, self.database.location().to_owned()),
            Ok(None) => {}
            Err(err) => tracing::error!("Failed to release database connection: {}", err),
        }
    }
}

fn close_in_background(connection: DatabaseConnection, location: String) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                match connection.close().await {
                    Ok(()) => tracing::debug!("Closed database {} in background", location),
                    Err(err) => tracing::error!("Failed to close database {}: {}", location, err),
                }
            });
        }
        // Dropping the pool closes it without waiting.
        Err(_) => drop(connection),
    }
}
