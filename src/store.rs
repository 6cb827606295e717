//! Contracts of the external collaborators the session persists through:
//! the configuration store and the identity provider.

use std::result::Result as StdResult;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    color::Rgb,
    customize::{CustomizationRequest, Finish},
    error::{Error, Result},
};

/// A configuration as stored by the configuration service (camelCase JSON).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub body_color: Rgb,
    pub wheel_color: Rgb,
    /// Written as a number; older clients stored it as a string.
    #[serde(deserialize_with = "number_or_string")]
    pub wheel_scale: f32,
    #[serde(default, alias = "finishType")]
    pub finish: Finish,
    #[serde(default)]
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
}

impl SavedConfiguration {
    pub fn new(
        model_id: impl Into<String>,
        user: &Identity,
        request: &CustomizationRequest,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            model_name: None,
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            user_name: user.display_name.clone(),
            body_color: request.body_color,
            wheel_color: request.wheel_color,
            wheel_scale: request.wheel_scale,
            finish: request.finish,
            is_shared: false,
            created_at,
        }
    }

    pub fn request(&self) -> CustomizationRequest {
        CustomizationRequest {
            body_color: self.body_color,
            wheel_color: self.wheel_color,
            wheel_scale: self.wheel_scale,
            finish: self.finish,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Store(e.into()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Store(e.into()))
    }
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> StdResult<f32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scale {
        Number(f32),
        Text(String),
    }
    match Scale::deserialize(deserializer)? {
        Scale::Number(n) => Ok(n),
        Scale::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Persists and lists saved configurations.
#[allow(async_fn_in_trait)]
pub trait ConfigurationStore {
    /// Stores `config` and returns the id the store assigned to it.
    async fn create(&self, config: SavedConfiguration) -> anyhow::Result<String>;

    /// Configurations for `model_id`, ordered by creation time, at most `limit` of them.
    async fn list(
        &self,
        model_id: &str,
        most_recent_first: bool,
        limit: usize,
    ) -> anyhow::Result<Vec<SavedConfiguration>>;

    async fn latest(&self, model_id: &str) -> anyhow::Result<Option<SavedConfiguration>> {
        Ok(self.list(model_id, true, 1).await?.into_iter().next())
    }
}

/// Process-local [`ConfigurationStore`], handy for tests and offline use.
#[derive(Debug, Default)]
pub struct MemoryConfigurationStore {
    documents: Mutex<Vec<(String, SavedConfiguration)>>,
}

impl MemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<SavedConfiguration> {
        self.documents
            .lock()
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, config)| config.clone())
    }
}

impl ConfigurationStore for MemoryConfigurationStore {
    async fn create(&self, config: SavedConfiguration) -> anyhow::Result<String> {
        if config.model_id.is_empty() {
            anyhow::bail!("configuration has no model id");
        }
        let mut documents = self.documents.lock();
        let id = format!("cfg-{}", documents.len() + 1);
        documents.push((id.clone(), config));
        Ok(id)
    }

    async fn list(
        &self,
        model_id: &str,
        most_recent_first: bool,
        limit: usize,
    ) -> anyhow::Result<Vec<SavedConfiguration>> {
        let documents = self.documents.lock();
        // insertion index breaks ties between equal timestamps
        let mut matching: Vec<(usize, &SavedConfiguration)> = documents
            .iter()
            .enumerate()
            .filter(|(_, (_, config))| config.model_id == model_id)
            .map(|(idx, (_, config))| (idx, config))
            .collect();
        matching.sort_by_key(|(idx, config)| (config.created_at, *idx));
        if most_recent_first {
            matching.reverse();
        }
        Ok(matching
            .into_iter()
            .take(limit)
            .map(|(_, config)| config.clone())
            .collect())
    }
}

/// Profile of an authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum User {
    Anonymous,
    Authenticated(Identity),
}

impl User {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            User::Anonymous => None,
            User::Authenticated(identity) => Some(identity),
        }
    }
}

/// Supplies the user on whose behalf the session acts.
pub trait IdentityProvider {
    fn current_user(&self) -> User;
}

/// A fixed user, e.g. one resolved once at startup.
impl IdentityProvider for User {
    fn current_user(&self) -> User {
        self.clone()
    }
}
