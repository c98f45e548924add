use std::fmt;

use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::error::TypedQueryError;
use crate::lock::LockMode;

use super::Sqlite;

/// Path that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

const DEFAULT_STATEMENT_CACHE_CAPACITY: usize = 16;

/// `SQLite` journal modes accepted by `PRAGMA journal_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Memory => "MEMORY",
            JournalMode::Wal => "WAL",
            JournalMode::Off => "OFF",
        }
    }
}

impl fmt::Display for JournalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for opening a `SQLite` connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    pub db_path: String,
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
    #[serde(default)]
    pub journal_mode: Option<JournalMode>,
    #[serde(default = "default_statement_cache_capacity")]
    pub statement_cache_capacity: usize,
}

fn default_foreign_keys() -> bool {
    true
}

fn default_statement_cache_capacity() -> usize {
    DEFAULT_STATEMENT_CACHE_CAPACITY
}

impl SqliteConfig {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            foreign_keys: default_foreign_keys(),
            journal_mode: None,
            statement_cache_capacity: DEFAULT_STATEMENT_CACHE_CAPACITY,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MEMORY_PATH)
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.db_path == MEMORY_PATH
    }

    #[must_use]
    pub fn with_journal_mode(mut self, journal_mode: JournalMode) -> Self {
        self.journal_mode = Some(journal_mode);
        self
    }

    /// Statements run right after the connection opens.
    ///
    /// The compiled-in foreign key default varies between builds, so both
    /// states are set explicitly.
    pub(crate) fn setup_script(&self) -> String {
        let mut script = String::new();
        if self.foreign_keys {
            script.push_str("PRAGMA foreign_keys = ON;\n");
        } else {
            script.push_str("PRAGMA foreign_keys = OFF;\n");
        }
        if let Some(mode) = self.journal_mode {
            script.push_str(&format!("PRAGMA journal_mode = {mode};\n"));
        }
        script
    }
}

/// Fluent builder for [`SqliteConfig`].
#[derive(Debug, Clone)]
pub struct SqliteConfigBuilder {
    config: SqliteConfig,
}

impl SqliteConfigBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            config: SqliteConfig::new(db_path),
        }
    }

    #[must_use]
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.config.foreign_keys = enabled;
        self
    }

    #[must_use]
    pub fn journal_mode(mut self, journal_mode: JournalMode) -> Self {
        self.config.journal_mode = Some(journal_mode);
        self
    }

    #[must_use]
    pub fn statement_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.statement_cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteConfig {
        self.config
    }

    /// Open a connection with the built settings.
    ///
    /// # Errors
    /// Returns `TypedQueryError` if the database cannot be opened or set up.
    pub fn connect<M: LockMode>(self) -> Result<Connection<Sqlite, M>, TypedQueryError> {
        Connection::connect(&self.finish())
    }
}

impl SqliteConfig {
    #[must_use]
    pub fn builder(db_path: impl Into<String>) -> SqliteConfigBuilder {
        SqliteConfigBuilder::new(db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_only_enable_foreign_keys() {
        let config = SqliteConfig::in_memory();
        assert!(config.is_in_memory());
        assert_eq!(config.setup_script(), "PRAGMA foreign_keys = ON;\n");
    }

    #[test]
    fn builder_sets_every_field() {
        let config = SqliteConfig::builder("app.db")
            .foreign_keys(false)
            .journal_mode(JournalMode::Wal)
            .statement_cache_capacity(4)
            .finish();
        assert_eq!(config.db_path, "app.db");
        assert_eq!(config.statement_cache_capacity, 4);
        assert_eq!(
            config.setup_script(),
            "PRAGMA foreign_keys = OFF;\nPRAGMA journal_mode = WAL;\n"
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: SqliteConfig =
            serde_json::from_str(r#"{"db_path": "x.db", "journal_mode": "WAL"}"#).unwrap();
        assert!(config.foreign_keys);
        assert_eq!(config.journal_mode, Some(JournalMode::Wal));
        assert_eq!(config.statement_cache_capacity, 16);
    }
}
