//! # API Module
//!
//! Endpoints of the short-lived local server that receives the Spotify OAuth
//! redirect.
//!
//! - [`callback`] completes the PKCE flow by exchanging the authorization
//!   code for an access token
//! - [`health`] reports status and version
//!
//! The server only runs while `streamdash spotify auth` waits for the
//! browser; see [`crate::server`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
