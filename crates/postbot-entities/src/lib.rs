use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{DbBackend, Schema};

pub mod post;
pub mod post_weekly_schedule;
pub mod request;
pub mod user;

/// `CREATE TABLE IF NOT EXISTS` statements for every entity, parents first so
/// that foreign keys always point at an existing table.
pub fn create_table_statements(backend: DbBackend) -> Vec<TableCreateStatement> {
    let schema = Schema::new(backend);

    vec![
        schema.create_table_from_entity(user::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(request::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(post::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(post_weekly_schedule::Entity).if_not_exists().to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use sea_orm::EntityName;

    use super::*;

    #[test]
    fn tables_are_created_parents_first() {
        let sql = create_table_statements(DbBackend::Sqlite)
            .iter()
            .map(|statement| DbBackend::Sqlite.build(statement).to_string())
            .collect::<Vec<_>>();

        let names = [
            user::Entity.table_name(),
            request::Entity.table_name(),
            post::Entity.table_name(),
            post_weekly_schedule::Entity.table_name(),
        ];
        for (statement, name) in sql.iter().zip(names) {
            assert!(
                statement.starts_with(&format!("CREATE TABLE IF NOT EXISTS \"{}\"", name)),
                "{}",
                statement
            );
        }

        assert!(sql[1].contains("FOREIGN KEY"));
        assert!(sql[3].contains("FOREIGN KEY"));
        assert!(sql[2].contains("\"times_sent\""));
        assert!(sql[2].contains("DEFAULT 0"));
    }
}
