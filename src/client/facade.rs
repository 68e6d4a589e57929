//! Client facade
//!
//! [`FluxClient`] validates database and retention-policy state before
//! delegating to the managers, and maps records to points for writes and
//! reads. A [`DatabaseHandle`] binds the same operations to one database.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::api::{quote, ApiClient};
use super::database::DatabaseManager;
use super::error::{ClientError, ClientResult};
use super::retention::RetentionPolicyManager;
use super::transport::{HttpTransport, Transport};
use crate::codec::LineProtocolEncoder;
use crate::config::ClientConfig;
use crate::domain::{Point, ResponseMetadata, RetentionPolicy};
use crate::mapping::{Mapper, Record};

/// High-level database client
pub struct FluxClient<T: Transport = HttpTransport> {
    api: Arc<ApiClient<T>>,
    databases: DatabaseManager<T>,
    policies: RetentionPolicyManager<T>,
    encoder: LineProtocolEncoder,
    mapper: Mapper,
    server: ResponseMetadata,
}

impl FluxClient<HttpTransport> {
    /// Connect over HTTP
    pub async fn connect(url: &str, timeout: Duration) -> ClientResult<Self> {
        Self::with_transport(HttpTransport::new(url, timeout)?).await
    }

    pub async fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_transport(HttpTransport::from_config(config)?).await
    }
}

impl<T: Transport> FluxClient<T> {
    /// Connect through the given transport; fails if the server does not answer a ping
    pub async fn with_transport(transport: T) -> ClientResult<Self> {
        let api = Arc::new(ApiClient::new(transport));
        let server = api.ping().await?;

        info!(
            build = %server.build_type.map(|b| b.to_string()).unwrap_or_else(|| "unknown".to_string()),
            version = %server.version.map(|v| v.to_string()).unwrap_or_else(|| "unknown".to_string()),
            url = api.host_url(),
            "Connected to database"
        );

        Ok(Self {
            databases: DatabaseManager::new(Arc::clone(&api)),
            policies: RetentionPolicyManager::new(Arc::clone(&api)),
            api,
            encoder: LineProtocolEncoder::new(),
            mapper: Mapper::default(),
            server,
        })
    }

    /// Statement-level access
    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// Metadata reported by the server when connecting
    pub fn server(&self) -> &ResponseMetadata {
        &self.server
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    // ============================================
    // Databases
    // ============================================

    pub async fn databases(&self) -> ClientResult<Vec<String>> {
        self.databases.databases().await
    }

    pub async fn database_exists(&self, database: &str) -> ClientResult<bool> {
        self.databases.exists(database).await
    }

    pub async fn create_database(&self, database: &str) -> ClientResult<()> {
        if self.database_exists(database).await? {
            return Err(ClientError::DatabaseAlreadyExists(database.to_string()));
        }
        self.databases.create(database).await
    }

    pub async fn drop_database(&self, database: &str) -> ClientResult<()> {
        self.require_database(database).await?;
        self.databases.drop(database).await
    }

    /// Bind operations to an existing database
    pub async fn use_database(&self, database: &str) -> ClientResult<DatabaseHandle<'_, T>> {
        self.require_database(database).await?;
        Ok(DatabaseHandle {
            client: self,
            database: database.to_string(),
        })
    }

    // ============================================
    // Retention policies
    // ============================================

    pub async fn retention_policies(&self, database: &str) -> ClientResult<Vec<RetentionPolicy>> {
        self.require_database(database).await?;
        self.policies.policies(database).await
    }

    pub async fn retention_policy(
        &self,
        name: &str,
        database: &str,
    ) -> ClientResult<Option<RetentionPolicy>> {
        self.require_database(database).await?;
        self.policies.policy(name, database).await
    }

    pub async fn retention_policy_exists(&self, name: &str, database: &str) -> ClientResult<bool> {
        self.require_database(database).await?;
        self.policies.exists(name, database).await
    }

    pub async fn create_retention_policy(
        &self,
        policy: &RetentionPolicy,
        database: &str,
    ) -> ClientResult<()> {
        if self.retention_policy_exists(policy.name(), database).await? {
            return Err(ClientError::RetentionPolicyAlreadyExists {
                policy: policy.name().to_string(),
                database: database.to_string(),
            });
        }
        self.policies.create(policy, database).await
    }

    pub async fn alter_retention_policy(
        &self,
        name: &str,
        database: &str,
        new_definition: &RetentionPolicy,
    ) -> ClientResult<()> {
        self.require_retention_policy(name, database).await?;
        self.policies.alter(name, database, new_definition).await
    }

    pub async fn drop_retention_policy(&self, name: &str, database: &str) -> ClientResult<()> {
        self.require_retention_policy(name, database).await?;
        self.policies.drop(name, database).await
    }

    // ============================================
    // Writes and reads
    // ============================================

    /// Write points to a measurement, one request per tag set
    pub async fn write_points(
        &self,
        database: &str,
        measurement: &str,
        points: &[Point],
        retention_policy: Option<&str>,
    ) -> ClientResult<()> {
        match retention_policy {
            Some(rp) => self.require_retention_policy(rp, database).await?,
            None => self.require_database(database).await?,
        }

        for line_protocol in self.encoder.encode(measurement, points)? {
            self.api
                .write(database, retention_policy, &line_protocol)
                .await?;
        }
        Ok(())
    }

    /// Write records to the measurement named by their schema
    ///
    /// An empty slice is a no-op.
    pub async fn write<R: Record>(
        &self,
        database: &str,
        records: &[R],
        retention_policy: Option<&str>,
    ) -> ClientResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let measurement = self.mapper.measurement_name::<R>()?;
        let points = self.mapper.to_points(records)?;
        self.write_points(database, &measurement, &points, retention_policy)
            .await
    }

    /// Read every point of a measurement
    pub async fn get_all_points(&self, database: &str, measurement: &str) -> ClientResult<Vec<Point>> {
        if measurement.trim().is_empty() {
            return Err(ClientError::InvalidArgument(
                "Measurement name cannot be blank".to_string(),
            ));
        }
        self.require_database(database).await?;

        let query = format!("SELECT * FROM {}..{}", quote(database), quote(measurement));
        Ok(self
            .api
            .query(&query)
            .await?
            .map(|series| series.into_points())
            .unwrap_or_default())
    }

    /// Read every record stored in the measurement named by the record schema
    pub async fn get_all<R: Record>(&self, database: &str) -> ClientResult<Vec<R>> {
        let measurement = self.mapper.measurement_name::<R>()?;
        let points = self.get_all_points(database, &measurement).await?;
        Ok(self.mapper.from_points(&points)?)
    }

    async fn require_database(&self, database: &str) -> ClientResult<()> {
        if database.trim().is_empty() {
            return Err(ClientError::InvalidArgument(
                "Database name cannot be blank".to_string(),
            ));
        }
        if !self.database_exists(database).await? {
            return Err(ClientError::UnknownDatabase(database.to_string()));
        }
        Ok(())
    }

    async fn require_retention_policy(&self, name: &str, database: &str) -> ClientResult<()> {
        if !self.retention_policy_exists(name, database).await? {
            return Err(ClientError::UnknownRetentionPolicy {
                policy: name.to_string(),
                database: database.to_string(),
            });
        }
        Ok(())
    }
}

/// Operations bound to one database
pub struct DatabaseHandle<'a, T: Transport> {
    client: &'a FluxClient<T>,
    database: String,
}

impl<'a, T: Transport> DatabaseHandle<'a, T> {
    pub fn name(&self) -> &str {
        &self.database
    }

    pub async fn retention_policies(&self) -> ClientResult<Vec<RetentionPolicy>> {
        self.client.retention_policies(&self.database).await
    }

    pub async fn retention_policy(&self, name: &str) -> ClientResult<Option<RetentionPolicy>> {
        self.client.retention_policy(name, &self.database).await
    }

    pub async fn retention_policy_exists(&self, name: &str) -> ClientResult<bool> {
        self.client.retention_policy_exists(name, &self.database).await
    }

    pub async fn create_retention_policy(&self, policy: &RetentionPolicy) -> ClientResult<()> {
        self.client
            .create_retention_policy(policy, &self.database)
            .await
    }

    pub async fn alter_retention_policy(
        &self,
        name: &str,
        new_definition: &RetentionPolicy,
    ) -> ClientResult<()> {
        self.client
            .alter_retention_policy(name, &self.database, new_definition)
            .await
    }

    pub async fn drop_retention_policy(&self, name: &str) -> ClientResult<()> {
        self.client.drop_retention_policy(name, &self.database).await
    }

    pub async fn write_points(
        &self,
        measurement: &str,
        points: &[Point],
        retention_policy: Option<&str>,
    ) -> ClientResult<()> {
        self.client
            .write_points(&self.database, measurement, points, retention_policy)
            .await
    }

    pub async fn write<R: Record>(
        &self,
        records: &[R],
        retention_policy: Option<&str>,
    ) -> ClientResult<()> {
        self.client
            .write(&self.database, records, retention_policy)
            .await
    }

    pub async fn get_all_points(&self, measurement: &str) -> ClientResult<Vec<Point>> {
        self.client.get_all_points(&self.database, measurement).await
    }

    pub async fn get_all<R: Record>(&self) -> ClientResult<Vec<R>> {
        self.client.get_all(&self.database).await
    }
}
