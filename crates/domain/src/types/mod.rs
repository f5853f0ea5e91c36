//! Wire types for the backend API

pub mod auth;
pub mod contact;
pub mod content;
pub mod ops;
pub mod tools;

pub use auth::{AuthSuccess, Credentials, Profile, RefreshResponse, UserId};
pub use contact::{ContactRequest, ContactResponse};
pub use content::{DeleteResult, Experience, ExperiencePayload, Items, Skill, SkillPayload, Visibility};
pub use ops::{
    AlertLevel, AlertThresholds, EvaluationScope, OpsAlerts, OpsHealth, OpsHistory,
    OpsHistoryItem, OpsMetrics, OpsSummary, OpsWindow,
};
pub use tools::{
    Base64Decoded, Base64Encoded, SelfSignedCert, SelfSignedCertRequest, ToolInput, UuidResponse,
};
