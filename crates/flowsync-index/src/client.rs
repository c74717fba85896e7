//! Async Postgres client for the instance index.
//!
//! Each published definition has one row per instance in
//! `<schema>."Instances"`, where the schema name is derived from the flow
//! identifier. The index answers exactly two questions for reconciliation:
//! "what is the newest instance for this key?" and "delete this instance".

use tokio_postgres::NoTls;

use crate::error::{IndexError, Result};

/// Derive the database schema name for a flow identifier.
///
/// Flow ids use hyphens (`sys-flows`); schema names use underscores
/// (`sys_flows`).
pub fn schema_for_flow(flow: &str) -> String {
    flow.replace('-', "_")
}

/// Check that an interpolated identifier is a plain lowercase name.
///
/// Schema names are derived from flow ids and end up inside quoted
/// identifiers, where bind parameters cannot be used.
fn validate_identifier(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(IndexError::InvalidSchema(name.to_string()))
    }
}

/// Client for the instance-index database.
pub struct IndexClient {
    client: tokio_postgres::Client,
}

impl IndexClient {
    /// Connect using a Postgres connection string.
    ///
    /// The connection driver is moved onto a background task; it ends when
    /// the client is dropped.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(IndexError::Connect)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "index connection closed");
            }
        });

        Ok(Self { client })
    }

    /// Check that the database answers a trivial query.
    pub async fn test_connection(&self) -> bool {
        self.client.simple_query("SELECT 1").await.is_ok()
    }

    /// Newest instance id for a key within a schema, or `None`.
    ///
    /// Version is deliberately not part of the predicate: the index tracks a
    /// single "latest" instance per key, and the lookup only decides whether
    /// something must be deleted before republishing.
    pub async fn latest_instance_id(&self, schema: &str, key: &str) -> Result<Option<String>> {
        validate_identifier(schema)?;
        let query = format!(
            "SELECT \"Id\"::text FROM \"{schema}\".\"Instances\" \
             WHERE \"Key\" = $1 ORDER BY \"CreatedAt\" DESC LIMIT 1"
        );
        let row = self.client.query_opt(&query, &[&key]).await?;
        Ok(row.map(|r| r.get(0)))
    }

    /// Delete one instance row by id within a schema.
    pub async fn delete_instance(&self, schema: &str, instance_id: &str) -> Result<u64> {
        validate_identifier(schema)?;
        let query = format!("DELETE FROM \"{schema}\".\"Instances\" WHERE \"Id\"::text = $1");
        let deleted = self.client.execute(&query, &[&instance_id]).await?;
        tracing::debug!(schema, instance_id, deleted, "deleted index instance");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_replaces_hyphens() {
        assert_eq!(schema_for_flow("sys-flows"), "sys_flows");
        assert_eq!(schema_for_flow("sys-tasks"), "sys_tasks");
        assert_eq!(schema_for_flow("plain"), "plain");
    }

    #[test]
    fn identifier_validation() {
        assert!(validate_identifier("sys_flows").is_ok());
        assert!(validate_identifier("a1_b2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("Sys_Flows").is_err());
        assert!(validate_identifier("sys;drop").is_err());
        assert!(validate_identifier("sys-flows").is_err());
    }
}
