//! Lead capture — name validation, phone masking and the submission gate.

pub mod client;
pub mod form;
pub mod routes;
pub mod validator;

pub use client::{HttpLeadSink, Lead, LeadSink};
pub use form::{LeadForm, Submitted};
pub use routes::{LeadRouteState, lead_routes};
pub use validator::{format_phone_number, validate_full_name};
