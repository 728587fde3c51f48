use std::path::{Path, PathBuf};

use sea_orm_migration::prelude::{DbErr, MigrationTrait, SchemaManager};

use postbot_common::config::Config;
use postbot_database::Database;

pub use m20240701_120000_add_post_times_sent::Migration as AddPostTimesSent;

mod m20240701_120000_add_post_times_sent;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(#[from] postbot_database::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] DbErr),
}

/// Regular files directly inside `dir` whose names contain `.db`, sorted.
pub fn find_database_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        if entry.file_name().to_string_lossy().contains(".db") {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Applies [`AddPostTimesSent`] to one file. Nothing records that it ran, so a
/// second run fails on the duplicate column.
#[tracing::instrument(skip(config))]
pub async fn migrate_file(path: &Path, config: &Config) -> Result<(), Error> {
    let database = Database::open_path(path, config);

    let mut connection = database.connection();
    let db = connection.connect().await?;
    AddPostTimesSent.up(&SchemaManager::new(db)).await?;
    connection.release().await?;

    log::info!("Migrated {}", path.display());

    Ok(())
}

/// Migrates every database file in `dir`, stopping at the first failure.
pub async fn migrate_directory(dir: &Path, config: &Config) -> Result<Vec<PathBuf>, Error> {
    let files = find_database_files(dir)?;
    log::info!("Found {} database files in {}", files.len(), dir.display());

    for file in &files {
        migrate_file(file, config).await?;
    }

    Ok(files)
}
