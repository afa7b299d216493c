//! Client for a lip-sync video generation service.
//!
//! [`app::App`] owns the view state and turns events into effects;
//! [`runtime::Runtime`] runs those effects on tokio. The backend is only ever
//! reached through [`gateway::Gateway`].

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod notifications;
pub mod orchestrator;
pub mod pipeline;
pub mod router;
pub mod runtime;
pub mod sequence;
pub mod state;
pub mod ui;
