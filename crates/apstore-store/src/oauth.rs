//! OAuth2 client, authorization-code, and token storage.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::memory::MemoryStorage;
use crate::traits::OAuthStorage;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthClient {
    pub id: String,
    pub secret: String,
    pub redirect_uri: String,
    /// Usually the IRI of the actor that owns the client.
    pub user_data: Option<serde_json::Value>,
}

/// A pending authorization code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeData {
    pub client_id: String,
    pub code: String,
    /// Lifetime in seconds from `created_at`.
    pub expires_in: i64,
    pub scope: String,
    pub redirect_uri: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub user_data: Option<serde_json::Value>,
}

/// An issued access token and its optional refresh token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessData {
    pub client_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds from `created_at`.
    pub expires_in: i64,
    pub scope: String,
    pub redirect_uri: String,
    pub created_at: DateTime<Utc>,
    pub user_data: Option<serde_json::Value>,
}

impl AuthorizeData {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.expires_in)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

impl AccessData {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.expires_in)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Backing maps for [`OAuthStorage`] on [`MemoryStorage`].
#[derive(Debug, Default)]
pub struct OAuthTables {
    clients: DashMap<String, OAuthClient>,
    authorize: DashMap<String, AuthorizeData>,
    access: DashMap<String, AccessData>,
    /// Refresh token → access token.
    refresh: DashMap<String, String>,
}

fn not_empty(what: &str, value: &str) -> StorageResult<()> {
    if value.trim().is_empty() {
        return Err(StorageError::InvalidArgument(format!("empty {what}")));
    }
    Ok(())
}

impl OAuthStorage for MemoryStorage {
    fn create_client(&self, client: OAuthClient) -> StorageResult<()> {
        not_empty("client id", &client.id)?;
        debug!(client = %client.id, "created oauth client");
        self.oauth.clients.insert(client.id.clone(), client);
        Ok(())
    }

    fn update_client(&self, client: OAuthClient) -> StorageResult<()> {
        not_empty("client id", &client.id)?;
        self.oauth.clients.insert(client.id.clone(), client);
        Ok(())
    }

    fn remove_client(&self, id: &str) -> StorageResult<()> {
        self.oauth.clients.remove(id);
        Ok(())
    }

    fn get_client(&self, id: &str) -> StorageResult<OAuthClient> {
        self.oauth
            .clients
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found("oauth client", id))
    }

    fn list_clients(&self) -> StorageResult<Vec<OAuthClient>> {
        let mut clients: Vec<OAuthClient> = self
            .oauth
            .clients
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        clients.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(clients)
    }

    fn save_authorize(&self, data: AuthorizeData) -> StorageResult<()> {
        not_empty("authorization code", &data.code)?;
        self.oauth.authorize.insert(data.code.clone(), data);
        Ok(())
    }

    fn load_authorize(&self, code: &str) -> StorageResult<AuthorizeData> {
        self.oauth
            .authorize
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found("authorization code", code))
    }

    fn remove_authorize(&self, code: &str) -> StorageResult<()> {
        self.oauth.authorize.remove(code);
        Ok(())
    }

    fn save_access(&self, data: AccessData) -> StorageResult<()> {
        not_empty("access token", &data.access_token)?;
        if let Some(refresh) = data.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            self.oauth
                .refresh
                .insert(refresh.to_string(), data.access_token.clone());
        }
        debug!(client = %data.client_id, "saved access token");
        self.oauth.access.insert(data.access_token.clone(), data);
        Ok(())
    }

    fn load_access(&self, token: &str) -> StorageResult<AccessData> {
        self.oauth
            .access
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found("access token", token))
    }

    fn remove_access(&self, token: &str) -> StorageResult<()> {
        if let Some((_, data)) = self.oauth.access.remove(token) {
            if let Some(refresh) = data.refresh_token {
                self.oauth.refresh.remove(&refresh);
            }
        }
        Ok(())
    }

    fn load_refresh(&self, token: &str) -> StorageResult<AccessData> {
        let access = self
            .oauth
            .refresh
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found("refresh token", token))?;
        self.load_access(&access)
    }

    fn remove_refresh(&self, token: &str) -> StorageResult<()> {
        self.oauth.refresh.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str) -> OAuthClient {
        OAuthClient {
            id: id.into(),
            secret: "s3cr3t".into(),
            redirect_uri: "https://app.example.com/callback".into(),
            user_data: Some(serde_json::json!("https://example.com/~jdoe")),
        }
    }

    fn access(token: &str, refresh: Option<&str>) -> AccessData {
        AccessData {
            client_id: "app".into(),
            access_token: token.into(),
            refresh_token: refresh.map(Into::into),
            expires_in: 3600,
            scope: "read".into(),
            redirect_uri: "https://app.example.com/callback".into(),
            created_at: Utc::now(),
            user_data: None,
        }
    }

    // -----------------------------------------------------------------------
    // Clients
    // -----------------------------------------------------------------------

    #[test]
    fn client_lifecycle() {
        let store = MemoryStorage::default();
        let oauth = store.oauth_storage().unwrap();
        oauth.create_client(client("b")).unwrap();
        oauth.create_client(client("a")).unwrap();

        let mut updated = client("a");
        updated.secret = "rotated".into();
        oauth.update_client(updated.clone()).unwrap();
        assert_eq!(oauth.get_client("a").unwrap(), updated);

        let ids: Vec<_> = oauth.list_clients().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        oauth.remove_client("a").unwrap();
        assert!(oauth.get_client("a").unwrap_err().is_not_found());
        assert_eq!(oauth.list_clients().unwrap().len(), 1);
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let store = MemoryStorage::default();
        assert!(matches!(
            store.create_client(client(" ")),
            Err(StorageError::InvalidArgument(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Authorization codes
    // -----------------------------------------------------------------------

    #[test]
    fn authorize_lifecycle() {
        let store = MemoryStorage::default();
        let created_at = Utc::now();
        let data = AuthorizeData {
            client_id: "app".into(),
            code: "code-1".into(),
            expires_in: 60,
            scope: "read".into(),
            redirect_uri: "https://app.example.com/callback".into(),
            state: "xyz".into(),
            created_at,
            user_data: None,
        };
        store.save_authorize(data.clone()).unwrap();
        assert_eq!(store.load_authorize("code-1").unwrap(), data);
        assert!(!data.is_expired_at(created_at + Duration::seconds(59)));
        assert!(data.is_expired_at(created_at + Duration::seconds(60)));

        store.remove_authorize("code-1").unwrap();
        assert!(store.load_authorize("code-1").unwrap_err().is_not_found());
    }

    // -----------------------------------------------------------------------
    // Tokens
    // -----------------------------------------------------------------------

    #[test]
    fn refresh_resolves_to_access() {
        let store = MemoryStorage::default();
        let data = access("at-1", Some("rt-1"));
        store.save_access(data.clone()).unwrap();
        assert_eq!(store.load_access("at-1").unwrap(), data);
        assert_eq!(store.load_refresh("rt-1").unwrap(), data);
    }

    #[test]
    fn removing_access_removes_refresh() {
        let store = MemoryStorage::default();
        store.save_access(access("at-1", Some("rt-1"))).unwrap();
        store.remove_access("at-1").unwrap();
        assert!(store.load_access("at-1").unwrap_err().is_not_found());
        assert!(store.load_refresh("rt-1").unwrap_err().is_not_found());
    }

    #[test]
    fn removing_refresh_keeps_access() {
        let store = MemoryStorage::default();
        store.save_access(access("at-1", Some("rt-1"))).unwrap();
        store.remove_refresh("rt-1").unwrap();
        assert!(store.load_refresh("rt-1").unwrap_err().is_not_found());
        assert!(store.load_access("at-1").is_ok());
    }

    #[test]
    fn access_without_refresh() {
        let store = MemoryStorage::default();
        store.save_access(access("at-2", None)).unwrap();
        store.remove_access("at-2").unwrap();
        assert!(store.load_access("at-2").unwrap_err().is_not_found());
    }
}
