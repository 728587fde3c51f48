use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::ConnectOptions as _;
use sea_orm::{ConnectOptions, ConnectionTrait, DatabaseConnection, DbErr, RuntimeErr, SqlxSqliteConnector};

use postbot_common::config::Config;

use crate::{Connection, Error};

/// Snapshot of a [`Database`]'s reference count and lifetime counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Logical callers currently holding the connection open.
    pub references: usize,
    /// Physical connections opened so far.
    pub opened: u64,
    /// Physical connections closed so far.
    pub closed: u64,
}

#[derive(Debug)]
enum Source {
    Url(ConnectOptions),
    // Kept as a path so file names never pass through URL parsing.
    File {
        path: PathBuf,
        max_connections: u32,
        sqlx_logging: bool,
    },
}

#[derive(Debug, Default)]
struct State {
    // Some exactly while `stats.references > 0`.
    connection: Option<DatabaseConnection>,
    stats: Stats,
}

/// A SQLite database shared by several independent callers.
///
/// The physical connection is opened when the first caller connects and
/// closed when the last one closes. Every [`Database::connect`] must be paired
/// with one [`Database::close`]; prefer [`Database::connection`], which pairs
/// them for you.
#[derive(Debug)]
pub struct Database {
    source: Source,
    location: String,
    state: Mutex<State>,
    opening: tokio::sync::Mutex<()>,
}

impl Database {
    pub fn new(options: impl Into<ConnectOptions>) -> Self {
        let options = options.into();
        let location = options.get_url().to_owned();
        Self::from_source(Source::Url(options), location)
    }

    pub fn with_config(url: impl Into<String>, config: &Config) -> Self {
        let mut options = ConnectOptions::new(url.into());
        options
            .max_connections(config.db_max_connections)
            .sqlx_logging(config.db_sqlx_logging);

        Self::new(options)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_config(config.database_url.clone(), config)
    }

    /// A database file on disk, created if it does not exist yet.
    pub fn open_path(path: impl AsRef<Path>, config: &Config) -> Self {
        let path = path.as_ref().to_path_buf();
        let location = path.display().to_string();
        let source = Source::File {
            path,
            max_connections: config.db_max_connections,
            sqlx_logging: config.db_sqlx_logging,
        };

        Self::from_source(source, location)
    }

    fn from_source(source: Source, location: String) -> Self {
        Self {
            source,
            location,
            state: Mutex::new(State::default()),
            opening: tokio::sync::Mutex::new(()),
        }
    }

    /// The URL or file path this handle opens, for display.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Takes one reference, opening the physical connection if it is the first.
    pub async fn connect(&self) -> Result<DatabaseConnection, Error> {
        if let Some(connection) = self.retain() {
            return Ok(connection);
        }

        let _opening = self.opening.lock().await;
        if let Some(connection) = self.retain() {
            return Ok(connection);
        }

        let connection = self.open().await?;

        let mut state = self.state();
        state.connection = Some(connection.clone());
        state.stats.references = 1;
        state.stats.opened += 1;
        log::debug!("Opened database {}", self.location());

        Ok(connection)
    }

    /// Gives back one reference, closing the physical connection if it was the last.
    pub async fn close(&self) -> Result<(), Error> {
        if let Some(connection) = self.release()? {
            connection.close().await?;
            log::debug!("Closed database {}", self.location());
        }

        Ok(())
    }

    /// Creates every table that does not exist yet.
    #[tracing::instrument(skip(self), fields(location = self.location()))]
    pub async fn update_tables(&self) -> Result<(), Error> {
        let mut connection = self.connection();
        let db = connection.connect().await?;

        let backend = db.get_database_backend();
        for statement in postbot_entities::create_table_statements(backend) {
            db.execute(backend.build(&statement)).await?;
        }

        tracing::debug!("Tables are up to date");

        connection.release().await
    }

    /// A scoped wrapper that releases its reference when dropped.
    pub fn connection(&self) -> Connection<'_> {
        Connection::new(self)
    }

    pub fn stats(&self) -> Stats {
        self.state().stats
    }

    pub fn is_open(&self) -> bool {
        self.state().connection.is_some()
    }

    async fn open(&self) -> Result<DatabaseConnection, DbErr> {
        match &self.source {
            Source::Url(options) => sea_orm::Database::connect(options.clone()).await,
            Source::File {
                path,
                max_connections,
                sqlx_logging,
            } => {
                let mut options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
                if !*sqlx_logging {
                    options = options.disable_statement_logging();
                }

                let pool = SqlitePoolOptions::new()
                    .max_connections(*max_connections)
                    .connect_with(options)
                    .await
                    .map_err(|err| DbErr::Conn(RuntimeErr::SqlxError(err)))?;

                Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
            }
        }
    }

    fn retain(&self) -> Option<DatabaseConnection> {
        let mut state = self.state();
        let connection = state.connection.clone()?;
        state.stats.references += 1;
        Some(connection)
    }

    /// Drops one reference and hands back the connection if nobody else holds it.
    pub(crate) fn release(&self) -> Result<Option<DatabaseConnection>, Error> {
        let mut state = self.state();
        if state.stats.references == 0 {
            return Err(Error::UnbalancedClose);
        }

        state.stats.references -= 1;
        if state.stats.references > 0 {
            return Ok(None);
        }

        state.stats.closed += 1;
        Ok(state.connection.take())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
