//! Chat simulator — a scripted conversation about blocked bank accounts.
//!
//! The visitor picks one of the options under the last bot message; the bot
//! echoes the choice, "types" for a moment and answers with the next set of
//! options. The script is a fixed graph of [`NodeId`]s.

pub mod engine;
pub mod model;
pub mod routes;
pub mod script;
pub mod sessions;
pub mod state;

pub use engine::DialogueEngine;
pub use model::{Author, DialogueEvent, Message, Selection, Snapshot};
pub use routes::{ChatRouteState, chat_routes};
pub use script::{EXTERNAL_LABEL, NodeId, RESTART_LABEL};
pub use sessions::{ChatSessions, spawn_prune_task};
pub use state::TypingPhase;
