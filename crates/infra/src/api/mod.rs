//! Typed backend API
//!
//! Thin facades over [`RequestExecutor`](crate::http::RequestExecutor), one
//! per backend area. Public listings go through the public cache and every
//! mutation of a public resource invalidates its listing.

pub mod auth;
pub mod contact;
pub mod experiences;
mod listing;
pub mod ops;
pub mod skills;
pub mod tools;

pub use auth::AuthApi;
pub use contact::ContactApi;
pub use experiences::ExperiencesApi;
pub use ops::OpsApi;
pub use skills::SkillsApi;
pub use tools::ToolsApi;
