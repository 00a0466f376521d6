//! sea-orm backed store
//!
//! One table, `urls(short PRIMARY KEY, long TEXT)`, created by the
//! migration crate on connect.

use std::time::Duration;

use sea_orm::{ActiveValue::Set, ConnectOptions, Database, DatabaseConnection, EntityTrait};
use sea_orm::sea_query::OnConflict;
use tracing::{debug, info, warn};

use super::Store;
use crate::errors::{Result, UrlxError};
use migration::entities::url;
use migration::{Migrator, MigratorTrait};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<&'static str> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite")
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql")
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(UrlxError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite:, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

pub struct DatabaseStore {
    db: DatabaseConnection,
    kind: &'static str,
}

impl DatabaseStore {
    /// Connects, then runs pending migrations.
    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self> {
        let kind = infer_backend_from_url(database_url)?;

        let db = if kind == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, kind, pool_size).await?
        };

        run_migrations(&db).await?;
        warn!("{} store initialized.", kind.to_uppercase());

        Ok(Self { db, kind })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// 连接 SQLite 数据库（自动创建，WAL 模式）
async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
    use std::str::FromStr;

    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    };

    let opt = SqliteConnectOptions::from_str(&url)
        .map_err(|e| UrlxError::database_config(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
        UrlxError::database_connection(format!("Cannot connect to SQLite database: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接 MySQL / PostgreSQL
async fn connect_generic(
    database_url: &str,
    kind: &str,
    pool_size: u32,
) -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(pool_size.max(1))
        .min_connections(pool_size.clamp(1, 5))
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        UrlxError::database_connection(format!(
            "Cannot connect to {} database: {}",
            kind.to_uppercase(),
            e
        ))
    })
}

async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| UrlxError::database_operation(format!("Migration failed: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}

#[async_trait::async_trait]
impl Store for DatabaseStore {
    async fn set(&self, short: &str, long: &str) -> Result<()> {
        let model = url::ActiveModel {
            short: Set(short.to_string()),
            long: Set(long.to_string()),
        };

        url::Entity::insert(model)
            .on_conflict(
                OnConflict::column(url::Column::Short)
                    .update_column(url::Column::Long)
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| {
                UrlxError::database_operation(format!("Failed to save '{}': {}", short, e))
            })?;

        debug!("URL stored: {}", short);
        Ok(())
    }

    async fn get(&self, short: &str) -> Result<Option<String>> {
        let model = url::Entity::find_by_id(short.to_string())
            .one(&self.db)
            .await
            .map_err(|e| {
                UrlxError::database_operation(format!("Failed to look up '{}': {}", short, e))
            })?;

        Ok(model.map(|m| m.long))
    }

    async fn delete(&self, short: &str) -> Result<()> {
        let result = url::Entity::delete_by_id(short.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| {
                UrlxError::database_operation(format!("Failed to delete '{}': {}", short, e))
            })?;

        if result.rows_affected == 0 {
            debug!("Delete of unknown code: {}", short);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "database"
    }
}
