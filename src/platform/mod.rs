//! Browser bindings
//!
//! Everything here is `wasm32`-only and thin: the views own DOM handles,
//! forward events into the pure state machines in the crate root and apply
//! the commands those machines queue.

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod cards;
#[cfg(target_arch = "wasm32")]
pub mod covers;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod host;
#[cfg(target_arch = "wasm32")]
pub mod lightbox;
#[cfg(target_arch = "wasm32")]
pub mod music;
#[cfg(target_arch = "wasm32")]
pub mod preview;
#[cfg(target_arch = "wasm32")]
pub mod search_view;
#[cfg(target_arch = "wasm32")]
pub mod stars;
#[cfg(target_arch = "wasm32")]
pub mod store;
