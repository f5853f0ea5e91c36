//! Portfolio skills
//!
//! Listings are decoded leniently: an `imageUrls` value that is not an array
//! reads as an empty list.

use portico_common::{Clock, SystemClock};
use portico_core::PublicCache;
use portico_domain::constants::{API_SKILLS, API_PRIVATE_SKILLS, PUBLIC_SKILLS_CACHE_KEY};
use portico_domain::{DeleteResult, Skill, SkillPayload, Result};

use super::listing::{PublicListing, Resource};
use crate::http::RequestExecutor;

const SKILLS: Resource = Resource {
    public_path: API_SKILLS,
    private_path: API_PRIVATE_SKILLS,
    cache_key: PUBLIC_SKILLS_CACHE_KEY,
};

#[derive(Debug, Clone)]
pub struct SkillsApi<C: Clock = SystemClock> {
    listing: PublicListing<C>,
}

impl<C: Clock> SkillsApi<C> {
    pub fn new(executor: RequestExecutor, cache: PublicCache<C>) -> Self {
        Self { listing: PublicListing::new(executor, cache, SKILLS) }
    }

    /// Public listing, served from the public cache for the configured TTL.
    pub async fn list_public(&self) -> Result<Vec<Skill>> {
        self.listing.list_public().await
    }

    pub async fn list_private(&self, token: &str) -> Result<Vec<Skill>> {
        self.listing.list_private(token).await
    }

    pub async fn create(&self, token: &str, payload: &SkillPayload) -> Result<Skill> {
        self.listing.create(token, payload).await
    }

    pub async fn update(&self, token: &str, id: &str, payload: &SkillPayload) -> Result<Skill> {
        self.listing.update(token, id, payload).await
    }

    pub async fn delete(&self, token: &str, id: &str) -> Result<DeleteResult> {
        self.listing.delete(token, id).await
    }

    pub async fn clear_public_cache(&self) {
        self.listing.invalidate().await;
    }
}
