use serde::{Deserialize, Serialize};

use crate::error::TypedQueryError;

/// Settings for opening a PostgreSQL connection.
///
/// Every field except `application_name` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dbname: Option<String>,
    #[serde(default)]
    pub application_name: Option<String>,
}

fn required<'a, T>(value: Option<&'a T>, name: &str) -> Result<&'a T, TypedQueryError>
where
    T: ?Sized,
{
    value.ok_or_else(|| TypedQueryError::ConfigError(format!("{name} is required")))
}

impl PostgresConfig {
    #[must_use]
    pub fn new(host: &str, port: u16, user: &str, password: &str, dbname: &str) -> Self {
        Self {
            host: Some(host.to_owned()),
            port: Some(port),
            user: Some(user.to_owned()),
            password: Some(password.to_owned()),
            dbname: Some(dbname.to_owned()),
            application_name: None,
        }
    }

    #[must_use]
    pub fn with_application_name(mut self, name: &str) -> Self {
        self.application_name = Some(name.to_owned());
        self
    }

    /// Build the client configuration.
    ///
    /// # Errors
    /// Returns `TypedQueryError::ConfigError` naming the first missing field.
    pub fn to_client_config(&self) -> Result<postgres::Config, TypedQueryError> {
        let dbname = required(self.dbname.as_deref(), "dbname")?;
        let host = required(self.host.as_deref(), "host")?;
        let port = *required(self.port.as_ref(), "port")?;
        let user = required(self.user.as_deref(), "user")?;
        let password = required(self.password.as_deref(), "password")?;

        let mut config = postgres::Config::new();
        config
            .host(host)
            .port(port)
            .user(user)
            .password(password)
            .dbname(dbname);
        if let Some(name) = &self.application_name {
            config.application_name(name);
        }
        Ok(config)
    }
}
