//! Retention policy management statements

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::api::{quote, ApiClient};
use super::error::ClientResult;
use super::transport::Transport;
use crate::codec::{duration, RetentionPolicyDecoder};
use crate::domain::RetentionPolicy;

/// Lists, creates, alters and drops retention policies
pub struct RetentionPolicyManager<T: Transport> {
    api: Arc<ApiClient<T>>,
    decoder: RetentionPolicyDecoder,
}

impl<T: Transport> RetentionPolicyManager<T> {
    pub fn new(api: Arc<ApiClient<T>>) -> Self {
        Self {
            api,
            decoder: RetentionPolicyDecoder::new(),
        }
    }

    pub async fn policies(&self, database: &str) -> ClientResult<Vec<RetentionPolicy>> {
        let query = format!("SHOW RETENTION POLICIES ON {}", quote(database));
        let policies = match self.api.query(&query).await? {
            Some(series) => series
                .points()
                .iter()
                .map(|point| self.decoder.parse(point))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        debug!(database = database, count = policies.len(), "Found retention policies");
        Ok(policies)
    }

    pub async fn policy(&self, name: &str, database: &str) -> ClientResult<Option<RetentionPolicy>> {
        Ok(self
            .policies(database)
            .await?
            .into_iter()
            .find(|policy| policy.name() == name))
    }

    pub async fn exists(&self, name: &str, database: &str) -> ClientResult<bool> {
        Ok(self.policy(name, database).await?.is_some())
    }

    pub async fn create(&self, policy: &RetentionPolicy, database: &str) -> ClientResult<()> {
        let statement = format!(
            "CREATE RETENTION POLICY {} ON {} {}",
            quote(policy.name()),
            quote(database),
            policy_clause(policy)?
        );
        self.api.execute(&statement).await?;
        info!(database = database, policy = %policy, "Created retention policy");
        Ok(())
    }

    /// Apply a new definition; the policy keeps its current name
    pub async fn alter(
        &self,
        name: &str,
        database: &str,
        new_definition: &RetentionPolicy,
    ) -> ClientResult<()> {
        if new_definition.name() != name {
            warn!(
                policy = name,
                requested = new_definition.name(),
                "Retention policy name cannot be altered, keeping the current name"
            );
        }

        let statement = format!(
            "ALTER RETENTION POLICY {} ON {} {}",
            quote(name),
            quote(database),
            policy_clause(new_definition)?
        );
        self.api.execute(&statement).await?;
        info!(
            database = database,
            policy = name,
            definition = %new_definition,
            "Updated retention policy"
        );
        Ok(())
    }

    pub async fn drop(&self, name: &str, database: &str) -> ClientResult<()> {
        let statement = format!(
            "DROP RETENTION POLICY {} ON {}",
            quote(name),
            quote(database)
        );
        self.api.execute(&statement).await?;
        info!(database = database, policy = name, "Dropped retention policy");
        Ok(())
    }
}

fn policy_clause(policy: &RetentionPolicy) -> ClientResult<String> {
    let mut clause = format!(
        "DURATION {} REPLICATION {} SHARD DURATION {}",
        duration::format(policy.duration())?,
        policy.replication(),
        duration::format(policy.shard_duration())?
    );
    if policy.is_default() {
        clause.push_str(" DEFAULT");
    }
    Ok(clause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockTransport;
    use chrono::Duration;

    fn manager() -> RetentionPolicyManager<MockTransport> {
        RetentionPolicyManager::new(Arc::new(ApiClient::new(MockTransport::standard())))
    }

    #[tokio::test]
    async fn test_list_policies() {
        let manager = manager();
        let policies = manager.policies("metrics").await.unwrap();
        assert_eq!(policies.len(), 2);
        assert_eq!(policies[1].name(), "weekly");
        assert_eq!(policies[1].duration(), Duration::days(7));
        assert_eq!(policies[1].replication(), 2);
        assert!(policies[0].is_default());

        assert!(manager.exists("autogen", "metrics").await.unwrap());
        assert!(manager.policy("missing", "metrics").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_statement() {
        let manager = manager();
        let policy = RetentionPolicy::builder("hourly", Duration::hours(6) + Duration::minutes(20))
            .replication(2)
            .shard_duration(Duration::hours(1))
            .default(true)
            .build()
            .unwrap();

        manager.create(&policy, "metrics").await.unwrap();
        assert_eq!(
            manager.api.transport().executed(),
            vec![
                "CREATE RETENTION POLICY \"hourly\" ON \"metrics\" DURATION 6h20m REPLICATION 2 SHARD DURATION 1h DEFAULT"
            ]
        );
    }

    #[tokio::test]
    async fn test_alter_keeps_name() {
        let manager = manager();
        let policy = RetentionPolicy::builder("renamed", Duration::days(1))
            .build()
            .unwrap();

        manager.alter("weekly", "metrics", &policy).await.unwrap();
        manager.drop("weekly", "metrics").await.unwrap();
        assert_eq!(
            manager.api.transport().executed(),
            vec![
                "ALTER RETENTION POLICY \"weekly\" ON \"metrics\" DURATION 24h REPLICATION 1 SHARD DURATION 0s",
                "DROP RETENTION POLICY \"weekly\" ON \"metrics\"",
            ]
        );
    }
}
