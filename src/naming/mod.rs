//! Naming module
//!
//! Everything that decides what an entry should be called: the
//! case-insensitive namespace model, the conflict resolver that assigns
//! collision-free names, and the user-configurable cleaning rules.
//!
//! # Submodules
//!
//! - `namespace` - Occupied-name tracking with case-insensitive comparison
//! - `resolver` - Batch conflict resolution with numbered disambiguators
//! - `rules` - Folder-name cleaning rules and JSON presets

pub mod namespace;
pub mod resolver;
pub mod rules;

pub use namespace::Namespace;
pub use resolver::{
    claim_name, resolve, resolve_batch, EntryKind, RenameRequest, ResolvedRename,
};
pub use rules::RenameRules;
