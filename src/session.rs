//! The customization session: one selected asset, its loaded graph, and the
//! requests applied to it.
//!
//! ```text
//! Idle ──select──▶ Loading ──ok──▶ Ready ◀──▶ Customizing
//!                     │                │
//!                     └─err─▶ LoadFailed
//! any state with an asset ──replace/unload──▶ Unloaded ──select──▶ Loading
//! ```
//!
//! Loads are asynchronous and may overlap when the user switches models
//! quickly. Every selection hands out a [`LoadTicket`] carrying a monotonically
//! increasing token; a completed load whose token is no longer current is
//! discarded with [`Error::LoadSuperseded`]. Customization requests are
//! last-write-wins: [`CustomizationSession::submit`] replaces any pending
//! request and [`CustomizationSession::flush`] applies only the newest one.

use chrono::Utc;
use log::{debug, info, warn};

use crate::{
    config::CustomizerConfig,
    customize::{self, CustomizationRequest, PassSummary},
    data_structures::scene_graph::SceneGraph,
    error::{Error, Result},
    resources::{AssetStore, SceneLoader, file_id_from_path},
    store::{ConfigurationStore, IdentityProvider, SavedConfiguration, User},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No asset selected yet.
    Idle,
    /// A fetch/parse is in flight; customization is rejected.
    Loading,
    /// A graph is loaded and accepts customization passes.
    Ready,
    /// A pass is running. Passes are synchronous, so this is only observable from inside one.
    Customizing,
    /// The last load failed. Left by selecting another asset.
    LoadFailed,
    /// The previous asset was dropped.
    Unloaded,
}

/// Proof of a selection, to be handed back with the load result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    reference: String,
}

impl LoadTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

#[derive(Debug)]
pub struct CustomizationSession {
    state: SessionState,
    token: u64,
    reference: Option<String>,
    graph: Option<SceneGraph>,
    request: CustomizationRequest,
    pending: Option<CustomizationRequest>,
    failure: Option<String>,
}

impl CustomizationSession {
    /// `initial` is applied to every freshly loaded graph until a pass with another request succeeds.
    pub fn new(initial: CustomizationRequest) -> Self {
        Self {
            state: SessionState::Idle,
            token: 0,
            reference: None,
            graph: None,
            request: initial,
            pending: None,
            failure: None,
        }
    }

    pub fn from_config(config: &CustomizerConfig) -> Self {
        Self::new(config.defaults)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn graph(&self) -> Option<&SceneGraph> {
        self.graph.as_ref()
    }

    /// Mutable access for the renderer, e.g. to acknowledge material uploads.
    pub fn graph_mut(&mut self) -> Option<&mut SceneGraph> {
        self.graph.as_mut()
    }

    /// The request currently reflected by the graph.
    pub fn request(&self) -> &CustomizationRequest {
        &self.request
    }

    pub fn pending(&self) -> Option<&CustomizationRequest> {
        self.pending.as_ref()
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// File id of the selected asset, used as the model id when persisting.
    pub fn model_id(&self) -> Option<&str> {
        self.reference.as_deref().map(file_id_from_path)
    }

    /// User-visible message of the last failed load.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Status line for the viewer overlay.
    pub fn status(&self) -> &str {
        match self.state {
            SessionState::Idle | SessionState::Unloaded => "No model selected",
            SessionState::Loading => "Loading model...",
            SessionState::Ready | SessionState::Customizing => "Ready",
            SessionState::LoadFailed => self.failure.as_deref().unwrap_or("Failed to load model"),
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /**
     * Selects a new asset and moves to `Loading`.
     *
     * A previously loaded graph is dropped and any in-flight load is
     * invalidated. The returned ticket must be passed to
     * [`complete_load`](Self::complete_load) together with the load result.
     */
    pub fn select_asset(&mut self, reference: impl Into<String>) -> LoadTicket {
        if self.graph.is_some() || self.state == SessionState::Loading {
            self.unload();
        }
        self.token += 1;
        let reference = reference.into();
        info!("Selected {reference}");
        self.reference = Some(reference.clone());
        self.failure = None;
        self.transition(SessionState::Loading);
        LoadTicket {
            token: self.token,
            reference,
        }
    }

    /// Drops the current graph and invalidates any in-flight load.
    pub fn unload(&mut self) {
        self.graph = None;
        self.pending = None;
        self.token += 1;
        self.transition(SessionState::Unloaded);
    }

    /**
     * Accepts the outcome of the load started by `ticket`.
     *
     * Stale tickets are rejected with [`Error::LoadSuperseded`] and change
     * nothing. A failed load moves to `LoadFailed`. A successful one moves to
     * `Ready` and immediately runs a pass with the current request.
     */
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SceneGraph>,
    ) -> Result<PassSummary> {
        if self.state != SessionState::Loading || ticket.token != self.token {
            debug!(
                "Discarding stale load of {} (token {}, current {})",
                ticket.reference, ticket.token, self.token
            );
            return Err(Error::LoadSuperseded(ticket.reference));
        }
        match result {
            Err(e) => {
                warn!("Loading {} failed: {e}", ticket.reference);
                self.failure = Some(e.to_string());
                self.transition(SessionState::LoadFailed);
                Err(e)
            }
            Ok(graph) => {
                self.graph = Some(graph);
                self.transition(SessionState::Ready);
                let request = self.request;
                self.run_pass(request)
            }
        }
    }

    /// Selects `reference`, loads it through `loader` and completes the load.
    pub async fn load<S: AssetStore>(
        &mut self,
        loader: &SceneLoader<S>,
        reference: impl Into<String>,
    ) -> Result<PassSummary> {
        let ticket = self.select_asset(reference);
        let result = loader.load(ticket.reference()).await;
        self.complete_load(ticket, result)
    }

    /**
     * Queues `request` as the next pass, replacing any request still pending.
     *
     * Rejected with [`Error::NotReady`] (and dropped) unless a graph is loaded.
     */
    pub fn submit(&mut self, request: CustomizationRequest) -> Result<()> {
        if self.state != SessionState::Ready {
            debug!("Rejecting customization while {:?}", self.state);
            return Err(Error::NotReady);
        }
        request.validate()?;
        if self.pending.replace(request).is_some() {
            debug!("Dropped superseded customization request");
        }
        Ok(())
    }

    /// Applies the newest pending request, if any.
    pub fn flush(&mut self) -> Result<Option<PassSummary>> {
        match self.pending.take() {
            Some(request) => self.run_pass(request).map(Some),
            None => Ok(None),
        }
    }

    /// Submits and immediately applies `request`.
    pub fn customize(&mut self, request: CustomizationRequest) -> Result<PassSummary> {
        self.submit(request)?;
        self.flush()?.ok_or(Error::NotReady)
    }

    /// A failing pass leaves the graph and the current request as they were.
    fn run_pass(&mut self, request: CustomizationRequest) -> Result<PassSummary> {
        if self.graph.is_none() {
            return Err(Error::NotReady);
        }
        self.transition(SessionState::Customizing);
        let result = match self.graph.as_mut() {
            Some(graph) => customize::customize(graph, &request),
            None => Err(Error::NotReady),
        };
        self.transition(SessionState::Ready);
        match result {
            Ok(summary) => {
                self.request = request;
                Ok(summary)
            }
            Err(e) => {
                warn!("Customization pass aborted: {e}");
                Err(e)
            }
        }
    }

    /// Persists the current request for the loaded model on behalf of the current user.
    pub async fn save<I, C>(&self, identity: &I, store: &C) -> Result<String>
    where
        I: IdentityProvider,
        C: ConfigurationStore,
    {
        let User::Authenticated(user) = identity.current_user() else {
            return Err(Error::AnonymousUser);
        };
        let model_id = match (self.state, self.model_id()) {
            (SessionState::Ready, Some(model_id)) => model_id,
            _ => return Err(Error::NotReady),
        };
        let config = SavedConfiguration::new(model_id, &user, &self.request, Utc::now());
        let id = store.create(config).await?;
        info!("Saved configuration {id} of {model_id} for {}", user.id);
        Ok(id)
    }

    /// Applies the most recently saved configuration of the loaded model, if there is one.
    pub async fn restore_latest<C: ConfigurationStore>(
        &mut self,
        store: &C,
    ) -> Result<Option<PassSummary>> {
        let model_id = match (self.state, self.model_id()) {
            (SessionState::Ready, Some(model_id)) => model_id.to_string(),
            _ => return Err(Error::NotReady),
        };
        let Some(saved) = store.latest(&model_id).await? else {
            debug!("No saved configuration for {model_id}");
            return Ok(None);
        };
        self.submit(saved.request())?;
        self.flush()
    }
}

impl Default for CustomizationSession {
    fn default() -> Self {
        Self::new(CustomizationRequest::default())
    }
}
