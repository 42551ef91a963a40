//! Dashboard backend integration.
//!
//! This module provides the [`Backend`] seam resources call through, a
//! reqwest-based implementation, explicit session credentials, and the
//! conversion between wire payloads and UI models.

mod client;
mod converter;
pub mod payloads;
mod session;

pub use client::{ApiClient, ApiClientBuilder, ApiRequest, Backend};
pub use converter::DataConverter;
pub use session::{Credential, Session};

#[cfg(test)]
pub use client::MockBackend;
