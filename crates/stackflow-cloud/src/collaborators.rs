//! Narrow clients over single external services.
//!
//! They supply inputs to composers (a certificate ARN, a hosted zone id) or
//! consume outputs once a stack is deployed. Only the interfaces live here;
//! each deployment brings its own implementation.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait CertificateStatus: Send + Sync {
    /// Issuance status of a certificate, e.g. `ISSUED` or `PENDING_VALIDATION`
    async fn certificate_status(&self, certificate_arn: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerRule {
    pub arn: String,
    pub priority: Option<u32>,
    pub host_headers: Vec<String>,
}

#[async_trait]
pub trait ListenerInspector: Send + Sync {
    async fn listener_rules(&self, listener_arn: &str) -> Result<Vec<ListenerRule>>;

    async fn remove_listener_rule(&self, rule_arn: &str) -> Result<()>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;

    /// `None` when the key does not exist
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Delete every object in the bucket, returning how many were removed
    async fn empty_bucket(&self, bucket: &str) -> Result<usize>;
}

#[async_trait]
pub trait SecretRotator: Send + Sync {
    /// Create a secret and return its ARN
    async fn create_secret(&self, name: &str, value: &str) -> Result<String>;

    async fn rotate_secret(&self, secret_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub name: String,
    pub record_type: String,
    pub ttl: u32,
    pub values: Vec<String>,
}

#[async_trait]
pub trait HostedZoneRecords: Send + Sync {
    async fn upsert_record(&self, hosted_zone_id: &str, record: &DnsRecord) -> Result<()>;

    async fn delete_record(&self, hosted_zone_id: &str, record: &DnsRecord) -> Result<()>;
}

#[async_trait]
pub trait IdentityProviderLookup: Send + Sync {
    /// Custom domain attached to a user pool, if any
    async fn user_pool_domain(&self, user_pool_id: &str) -> Result<Option<String>>;

    async fn user_pool_client_id(
        &self,
        user_pool_id: &str,
        client_name: &str,
    ) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
            self.objects
                .lock()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), body);
            Ok(())
        }

        async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self
                .objects
                .lock()
                .unwrap()
                .get(&(bucket.to_string(), key.to_string()))
                .cloned())
        }

        async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
            self.objects
                .lock()
                .unwrap()
                .remove(&(bucket.to_string(), key.to_string()));
            Ok(())
        }

        async fn empty_bucket(&self, bucket: &str) -> Result<usize> {
            let mut objects = self.objects.lock().unwrap();
            let before = objects.len();
            objects.retain(|(b, _), _| b != bucket);
            Ok(before - objects.len())
        }
    }

    #[tokio::test]
    async fn test_object_store_as_trait_object() {
        let store: Box<dyn ObjectStore> = Box::new(MemoryStore::default());
        store.put_object("assets", "a.txt", b"a".to_vec()).await.unwrap();
        store.put_object("assets", "b.txt", b"b".to_vec()).await.unwrap();
        store.put_object("logs", "x.log", b"x".to_vec()).await.unwrap();

        assert_eq!(
            store.get_object("assets", "a.txt").await.unwrap(),
            Some(b"a".to_vec())
        );
        assert_eq!(store.empty_bucket("assets").await.unwrap(), 2);
        assert_eq!(store.get_object("assets", "b.txt").await.unwrap(), None);
        assert!(store.get_object("logs", "x.log").await.unwrap().is_some());
    }
}
