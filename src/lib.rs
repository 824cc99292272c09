//! Razblok — landing page backend: chat simulator, lead capture, testimonials.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod lead;
pub mod server;
pub mod terminal;
pub mod testimonials;
