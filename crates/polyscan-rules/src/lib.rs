//! # polyscan-rules
//!
//! Built-in model rules for polyscan.
//!
//! Rules run against the frozen [`SemanticModel`] after composition and
//! flag constructs that make the emitted declarations incomplete.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | PSL001 | `no-unresolved-composition` | Unresolved extends, mixin or behavior references |
//! | PSL002 | `require-member-types` | Public members without declared types |
//! | PSL003 | `no-unplaced-entity` | Entities whose namespace placement is unknown |
//!
//! ## Usage
//!
//! ```ignore
//! use polyscan::Pipeline;
//! use polyscan_rules::{NoUnresolvedComposition, RequireMemberTypes};
//!
//! let pipeline = Pipeline::builder()
//!     .rule(NoUnresolvedComposition::new().ignore(["Polymer.Element"]))
//!     .rule(RequireMemberTypes::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod no_unplaced_entity;
pub mod no_unresolved_composition;
mod presets;
pub mod require_member_types;

pub use no_unplaced_entity::NoUnplacedEntity;
pub use no_unresolved_composition::NoUnresolvedComposition;
pub use presets::{all_rules, recommended_rules, Preset};
pub use require_member_types::RequireMemberTypes;

/// Re-export core types for convenience.
pub use polyscan_core::{ModelRule, SemanticModel, Severity};
