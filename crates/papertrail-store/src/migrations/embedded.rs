//! Migrations compiled into the binary with include_str!

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All migrations, in application order
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_trails",
        sql: include_str!("../../migrations/001_trails.sql"),
    }]
}
