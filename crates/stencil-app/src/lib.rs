//! Stencil Application
//!
//! The application shell: window or browser canvas host, the palette and
//! toolbar UI, and platform file and asset I/O.

mod app;
mod platform;
mod ui;

pub use app::{AppConfig, StencilApp};
pub use platform::AssetError;
pub use ui::{UiAction, UiState};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
