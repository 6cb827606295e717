//! car-customizer
//!
//! The scene side of a 3D car configurator: loads a car model (glTF) into a
//! scene graph, classifies its parts into wheels and body, and applies the
//! user's color, finish and wheel size choices to it. Builds natively and for
//! WASM; rendering the graph is left to the embedding viewer.
//!
//! High-level modules
//! - `color`: 8-bit RGB colors and hex parsing
//! - `config`: TOML runtime configuration
//! - `customize`: part classification and the customization pass
//! - `data_structures`: scene graph, transforms and materials
//! - `error`: the crate-wide error type
//! - `resources`: asset stores and the glTF scene loader
//! - `session`: the per-model customization state machine
//! - `store`: saved configurations and the user identity contract
//!

pub mod color;
pub mod config;
pub mod customize;
pub mod data_structures;
pub mod error;
pub mod resources;
pub mod session;
pub mod store;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use color::Rgb;
pub use customize::{CustomizationRequest, Finish, PartKind, classify};
pub use error::{Error, Result};
pub use session::{CustomizationSession, SessionState};

/// Installs the platform logger: `env_logger` natively (honouring `RUST_LOG`), the browser console on the web.
pub fn init_logger() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }
}
