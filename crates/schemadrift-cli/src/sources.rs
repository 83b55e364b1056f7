//! Turning command-line flags and config sections into schema sources

use anyhow::{bail, Context, Result};
use schemadrift_catalog::{SchemaSource, SnapshotSource};
use schemadrift_core::{Config, Side};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `--password` is given
pub const PASSWORD_ENV: &str = "SCHEMADRIFT_PASSWORD";

/// Database server flavour behind `--from`/`--to` flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Driver {
    #[default]
    Postgres,
    Mysql,
}

impl Driver {
    /// `mysql://` and `mariadb://` URLs are MySQL, anything else goes to PostgreSQL
    pub fn from_url(url: &str) -> Self {
        let scheme = url.split_once("://").map(|(scheme, _)| scheme.to_ascii_lowercase());
        match scheme.as_deref() {
            Some("mysql" | "mariadb") => Driver::Mysql,
            _ => Driver::Postgres,
        }
    }
}

/// Server connection flags shared by every command
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConnectionArgs {
    /// Database server flavour
    #[arg(long, value_enum, default_value_t = Driver::Postgres)]
    pub driver: Driver,

    /// Database server host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Database server port
    #[arg(long)]
    pub port: Option<u16>,

    /// User name
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password (falls back to $SCHEMADRIFT_PASSWORD)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Schema whose tables are compared (PostgreSQL only)
    #[arg(long, default_value = "public")]
    pub schema: String,

    /// Connect with TLS
    #[arg(long)]
    pub tls: bool,
}

impl ConnectionArgs {
    /// Fill in the password from the environment if no flag was given
    pub fn with_env_password(mut self) -> Self {
        if self.password.is_none() {
            self.password = std::env::var(PASSWORD_ENV).ok();
        }
        self
    }

    /// libpq key/value connection string for `database`
    pub fn conn_str(&self, database: &str) -> String {
        let mut params = vec![("host", self.host.as_deref().unwrap_or("localhost").to_string())];
        if let Some(port) = self.port {
            params.push(("port", port.to_string()));
        }
        if let Some(user) = &self.user {
            params.push(("user", user.clone()));
        }
        if let Some(password) = &self.password {
            params.push(("password", password.clone()));
        }
        params.push(("dbname", database.to_string()));

        params
            .iter()
            .map(|(key, value)| format!("{}={}", key, quote(value)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Quote a connection string value when it contains spaces, quotes or backslashes
fn quote(value: &str) -> String {
    let plain = !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if plain {
        return value.to_string();
    }

    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Where a side's metadata comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Snapshot(PathBuf),

    /// A database on the server named by the connection flags
    Server { driver: Driver, database: String, tls: bool },

    /// A connection URL (or libpq string) from the config file
    Url { driver: Driver, url: String, tls: bool },
}

/// A resolved, not yet opened, source for one side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub side: Side,

    /// Display label; a live database without one is labelled with its name
    pub label: Option<String>,

    pub location: Location,
}

impl SourceSpec {
    /// Resolve a side from flags first, then from its config section
    pub fn resolve(
        side: Side,
        database: Option<&str>,
        snapshot: Option<&Path>,
        conn: &ConnectionArgs,
        config: &Config,
    ) -> Result<Self> {
        if let Some(path) = snapshot {
            return Ok(Self {
                side,
                label: Some(snapshot_label(path)),
                location: Location::Snapshot(path.to_path_buf()),
            });
        }

        if let Some(database) = database {
            return Ok(Self {
                side,
                label: Some(database.to_string()),
                location: Location::Server {
                    driver: conn.driver,
                    database: database.to_string(),
                    tls: conn.tls,
                },
            });
        }

        let configured = match side {
            Side::Reference => config.reference.as_ref(),
            Side::Compared => config.compared.as_ref(),
        };
        let Some(configured) = configured else {
            let flag = match side {
                Side::Reference => "--from",
                Side::Compared => "--to",
            };
            bail!(
                "no {} database given: pass {} or add a [{}] section to schemadrift.toml",
                side,
                flag,
                side
            );
        };

        if let Some(path) = &configured.snapshot {
            let path = config.resolve_path(path);
            let label = configured
                .label
                .clone()
                .unwrap_or_else(|| snapshot_label(&path));
            return Ok(Self {
                side,
                label: Some(label),
                location: Location::Snapshot(path),
            });
        }

        match &configured.url {
            Some(url) => Ok(Self {
                side,
                label: configured.label.clone(),
                location: Location::Url {
                    driver: Driver::from_url(url),
                    url: url.clone(),
                    tls: configured.tls || conn.tls,
                },
            }),
            None => bail!("[{}] needs either `url` or `snapshot`", side),
        }
    }

    /// Open the source and settle its display label
    pub async fn open(&self, conn: &ConnectionArgs) -> Result<(Box<dyn SchemaSource>, String)> {
        let (source, name) = match &self.location {
            Location::Snapshot(path) => {
                tracing::debug!(side = %self.side, path = %path.display(), "loading snapshot");
                let source: Box<dyn SchemaSource> = Box::new(
                    SnapshotSource::from_file(path)
                        .with_context(|| format!("failed to load {} snapshot", self.side))?,
                );
                (source, snapshot_label(path))
            }
            Location::Server { driver, database, tls } => {
                tracing::debug!(side = %self.side, ?driver, tls, "connecting");
                let opened = match driver {
                    Driver::Postgres => open_postgres(&conn.conn_str(database), *tls, &conn.schema).await,
                    Driver::Mysql => open_mysql_server(conn, database, *tls).await,
                };
                opened.with_context(|| format!("failed to connect to the {} database", self.side))?
            }
            Location::Url { driver, url, tls } => {
                tracing::debug!(side = %self.side, ?driver, tls, "connecting");
                let opened = match driver {
                    Driver::Postgres => open_postgres(url, *tls, &conn.schema).await,
                    Driver::Mysql => open_mysql_url(url, *tls).await,
                };
                opened.with_context(|| format!("failed to connect to the {} database", self.side))?
            }
        };

        let label = self.label.clone().unwrap_or(name);
        Ok((source, label))
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(conn_str: &str, tls: bool, schema: &str) -> Result<(Box<dyn SchemaSource>, String)> {
    use schemadrift_catalog::PostgresSource;

    let source = if tls {
        PostgresSource::connect_with_tls(conn_str, schema).await?
    } else {
        PostgresSource::connect(conn_str, schema).await?
    };
    let name = source.database().to_string();
    let source: Box<dyn SchemaSource> = Box::new(source);
    Ok((source, name))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_conn_str: &str, _tls: bool, _schema: &str) -> Result<(Box<dyn SchemaSource>, String)> {
    bail!("built without PostgreSQL support; rebuild with `--features postgres` or compare snapshots")
}

#[cfg(feature = "mysql")]
async fn open_mysql_server(
    conn: &ConnectionArgs,
    database: &str,
    tls: bool,
) -> Result<(Box<dyn SchemaSource>, String)> {
    use schemadrift_catalog::MySqlConnectOptions;

    let mut options = MySqlConnectOptions::new()
        .host(conn.host.as_deref().unwrap_or("localhost"))
        .port(conn.port.unwrap_or(3306))
        .database(database);
    if let Some(user) = &conn.user {
        options = options.username(user);
    }
    if let Some(password) = &conn.password {
        options = options.password(password);
    }

    open_mysql(schemadrift_catalog::MysqlSource::connect_with(options, tls).await?)
}

#[cfg(feature = "mysql")]
async fn open_mysql_url(url: &str, tls: bool) -> Result<(Box<dyn SchemaSource>, String)> {
    use schemadrift_catalog::MysqlSource;

    let source = if tls {
        MysqlSource::connect_with_tls(url).await?
    } else {
        MysqlSource::connect(url).await?
    };
    open_mysql(source)
}

#[cfg(feature = "mysql")]
fn open_mysql(source: schemadrift_catalog::MysqlSource) -> Result<(Box<dyn SchemaSource>, String)> {
    let name = source.database().to_string();
    let source: Box<dyn SchemaSource> = Box::new(source);
    Ok((source, name))
}

#[cfg(not(feature = "mysql"))]
async fn open_mysql_server(
    _conn: &ConnectionArgs,
    _database: &str,
    _tls: bool,
) -> Result<(Box<dyn SchemaSource>, String)> {
    bail!("built without MySQL support; rebuild with `--features mysql` or compare snapshots")
}

#[cfg(not(feature = "mysql"))]
async fn open_mysql_url(_url: &str, _tls: bool) -> Result<(Box<dyn SchemaSource>, String)> {
    bail!("built without MySQL support; rebuild with `--features mysql` or compare snapshots")
}

/// Snapshot files are labelled by their file stem
fn snapshot_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
