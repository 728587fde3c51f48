use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),
    #[error("Unbalanced close: the database has no open references")]
    UnbalancedClose,
}
