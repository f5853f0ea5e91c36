//! Application constants
//!
//! Endpoint paths, storage keys and timing defaults shared by the client
//! crates.

// Backend
pub const DEFAULT_API_URL: &str = "http://localhost:3100";
pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const DEFAULT_ERROR_MESSAGE: &str = "Could not process the request";
pub const AUTH_INCOMPLETE_MESSAGE: &str = "Could not complete authentication";

// Public endpoints
pub const API_LOGIN: &str = "/api/login";
pub const API_REGISTER: &str = "/api/register";
pub const API_CONTACT: &str = "/api/contact";
pub const API_EXPERIENCES: &str = "/api/experiences";
pub const API_SKILLS: &str = "/api/skills";

// Private endpoints (bearer token required)
pub const API_PRIVATE_ME: &str = "/api/private/me";
pub const API_PRIVATE_REFRESH: &str = "/api/private/refresh";
pub const API_PRIVATE_EXPERIENCES: &str = "/api/private/experiences";
pub const API_PRIVATE_SKILLS: &str = "/api/private/skills";
pub const API_PRIVATE_OPS_METRICS: &str = "/api/private/ops/metrics";
pub const API_PRIVATE_OPS_ALERTS: &str = "/api/private/ops/alerts";
pub const API_PRIVATE_OPS_HEALTH: &str = "/api/private/ops/health";
pub const API_PRIVATE_OPS_HISTORY: &str = "/api/private/ops/history";
pub const API_PRIVATE_OPS_SUMMARY: &str = "/api/private/ops/summary";

// Tools endpoints
pub const API_TOOLS_BASE64_ENCODE: &str = "/api/tools/base64/encode";
pub const API_TOOLS_BASE64_DECODE: &str = "/api/tools/base64/decode";
pub const API_TOOLS_UUID_V4: &str = "/api/tools/uuid/v4";
pub const API_TOOLS_CERTS_SELF_SIGNED: &str = "/api/tools/certs/self-signed";

// Public cache
pub const CACHE_STORAGE_PREFIX: &str = "public-cache:";
pub const DEFAULT_CACHE_TTL_MS: u64 = 60_000;
pub const PUBLIC_SKILLS_CACHE_KEY: &str = "public-skills";
pub const PUBLIC_EXPERIENCES_CACHE_KEY: &str = "public-experiences";

// Session
pub const TOKEN_STORAGE_KEY: &str = "portfolio_auth_token";
pub const SESSION_CHECK_INTERVAL_SECS: u64 = 60;
pub const SESSION_REFRESH_THRESHOLD_SECS: u64 = 30 * 60;
