// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image presence checks and conditional pulls.
//!
//! Absence is not an error: [`ImageResolver::resolve`] reports it and
//! [`ImageResolver::ensure`] reacts to it with exactly one pull.

use crate::error::LifecycleError;
use tether_adapters::RuntimeClient;
use tether_core::{ImageRef, MatchPolicy, Phase};

/// Result of checking the local image set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub present: bool,
    /// The local `repository:tag` that satisfied the reference
    pub matched_tag: Option<String>,
}

/// How an image became available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provision {
    AlreadyPresent,
    Pulled,
}

tether_core::simple_display! {
    Provision {
        AlreadyPresent => "already present",
        Pulled => "pulled",
    }
}

/// Determines whether an image is available locally.
#[derive(Clone)]
pub struct ImageResolver<C> {
    client: C,
    policy: MatchPolicy,
}

impl<C: RuntimeClient> ImageResolver<C> {
    pub fn new(client: C, policy: MatchPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Check whether `image` is among the runtime's local images.
    pub async fn resolve(&self, image: &ImageRef) -> Result<Resolution, LifecycleError> {
        let images = self.client.list_images().await.map_err(|e| {
            LifecycleError::runtime(Phase::Resolve, e, |source| LifecycleError::QueryFailed {
                source,
            })
        })?;

        let matched_tag = images
            .iter()
            .flat_map(|img| img.repo_tags.iter())
            .find(|tag| image.matches(tag, self.policy))
            .cloned();

        match &matched_tag {
            Some(tag) => tracing::debug!(%image, %tag, policy = %self.policy, "image present"),
            None => tracing::debug!(%image, policy = %self.policy, "image not present"),
        }
        Ok(Resolution {
            present: matched_tag.is_some(),
            matched_tag,
        })
    }

    /// Pull `image`. No retries.
    pub async fn pull(&self, image: &ImageRef) -> Result<(), LifecycleError> {
        let start = std::time::Instant::now();
        self.client.pull_image(image).await.map_err(|e| {
            LifecycleError::runtime(Phase::Pull, e, |source| LifecycleError::PullFailed {
                image: image.clone(),
                source,
            })
        })?;
        tracing::info!(%image, elapsed_ms = start.elapsed().as_millis() as u64, "image pulled");
        Ok(())
    }

    /// Resolve `image`, pulling it when it is not present.
    pub async fn ensure(&self, image: &ImageRef) -> Result<Provision, LifecycleError> {
        if self.resolve(image).await?.present {
            return Ok(Provision::AlreadyPresent);
        }
        tracing::info!(%image, "image not found locally, pulling");
        self.pull(image).await?;
        Ok(Provision::Pulled)
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
