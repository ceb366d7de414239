//! # Music Organizer Core Library
//!
//! Keeps a music collection laid out as `<root>/<artist>[/<album>]/[<NN>.]<title>.<ext>`
//! using names derived from each file's tags, and cleans up the tags themselves.
//! The binary wires these pieces to the `organize` and `fix-tags` commands.

pub mod audio;
pub mod config;
pub mod directory;
pub mod error;
pub mod metadata;
pub mod progress;
pub mod slug;
pub mod tagging;
pub mod utils;
pub mod walker;

pub use config::{OrganizeConfig, TagFixConfig};
pub use directory::{Outcome, Relocator};
pub use error::{OrganizeError, Result};
pub use tagging::ContainerRegistry;
pub use walker::{Confirm, WalkSummary, Walker};
