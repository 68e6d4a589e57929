//! Database management statements

use std::sync::Arc;
use tracing::{debug, info};

use super::api::{quote, ApiClient};
use super::error::{ClientError, ClientResult};
use super::transport::Transport;

/// Name of the server's own monitoring database
pub const INTERNAL_DATABASE: &str = "_internal";

/// Lists, creates and drops databases
pub struct DatabaseManager<T: Transport> {
    api: Arc<ApiClient<T>>,
}

impl<T: Transport> DatabaseManager<T> {
    pub fn new(api: Arc<ApiClient<T>>) -> Self {
        Self { api }
    }

    pub async fn databases(&self) -> ClientResult<Vec<String>> {
        let databases: Vec<String> = match self.api.query("SHOW DATABASES").await? {
            Some(series) => series
                .points()
                .iter()
                .flat_map(|point| point.tags().values().cloned())
                .collect(),
            None => Vec::new(),
        };
        debug!(?databases, "Found databases");
        Ok(databases)
    }

    pub async fn exists(&self, database: &str) -> ClientResult<bool> {
        Ok(self.databases().await?.iter().any(|d| d == database))
    }

    pub async fn create(&self, database: &str) -> ClientResult<()> {
        self.api
            .execute(&format!("CREATE DATABASE {}", quote(database)))
            .await?;
        info!(database = database, "Created database");
        Ok(())
    }

    pub async fn drop(&self, database: &str) -> ClientResult<()> {
        if database == INTERNAL_DATABASE {
            return Err(ClientError::InvalidArgument(
                "Cannot drop internal database".to_string(),
            ));
        }

        self.api
            .execute(&format!("DROP DATABASE {}", quote(database)))
            .await?;
        info!(database = database, "Dropped database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockTransport;

    fn manager() -> DatabaseManager<MockTransport> {
        DatabaseManager::new(Arc::new(ApiClient::new(MockTransport::standard())))
    }

    #[tokio::test]
    async fn test_list_databases() {
        let manager = manager();
        assert_eq!(manager.databases().await.unwrap(), vec!["_internal", "metrics"]);
        assert!(manager.exists("metrics").await.unwrap());
        assert!(!manager.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_and_drop_statements() {
        let manager = manager();
        manager.create("fresh").await.unwrap();
        manager.drop("metrics").await.unwrap();
        assert_eq!(
            manager.api.transport().executed(),
            vec!["CREATE DATABASE \"fresh\"", "DROP DATABASE \"metrics\""]
        );
    }

    #[tokio::test]
    async fn test_internal_database_protected() {
        let manager = manager();
        assert!(matches!(
            manager.drop(INTERNAL_DATABASE).await,
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(manager.api.transport().executed().is_empty());
    }
}
