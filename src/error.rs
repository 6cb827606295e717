//! Error taxonomy shared by the loader, the customizer and the session.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The referenced asset does not exist (missing file or HTTP 404).
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// The asset was fetched but could not be parsed as glTF.
    #[error("failed to parse asset {reference}: {reason}")]
    AssetParseError { reference: String, reason: String },

    /// The asset parsed but contains no scene nodes.
    #[error("asset {0} contains no nodes")]
    AssetEmpty(String),

    /// Transient retrieval failure; the caller may re-issue the load.
    #[error("asset {reference} is unavailable: {reason}")]
    AssetUnavailable { reference: String, reason: String },

    /// A renderable node carries no material. Aborts the customization pass.
    #[error("renderable node '{0}' has no material")]
    MaterialMissing(String),

    /// A load completed after a newer asset was selected and was discarded.
    #[error("load of {0} was superseded by a newer selection")]
    LoadSuperseded(String),

    #[error("invalid customization request: {0}")]
    InvalidRequest(String),

    #[error("invalid color '{0}', expected #rrggbb or #rgb")]
    InvalidColor(String),

    /// No model is loaded, or a load is still in flight.
    #[error("no model is ready for customization")]
    NotReady,

    #[error("anonymous users cannot save configurations")]
    AnonymousUser,

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure reported by an external collaborator (configuration store, identity provider).
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error should be shown to the user. Superseded loads are dropped silently.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Error::LoadSuperseded(_))
    }
}
