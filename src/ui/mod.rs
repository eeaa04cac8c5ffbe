//! UI module - reusable widgets and overlays
//!
//! Standalone pieces that do not need the `App` state live here; the
//! panels that do are under `app/`.

pub mod components;
pub mod toast;
