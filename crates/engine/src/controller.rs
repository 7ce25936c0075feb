// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container creation and start.

use crate::error::LifecycleError;
use tether_adapters::RuntimeClient;
use tether_core::{ContainerId, ImageRef, Phase};

/// Creates and starts the single container of a lifecycle.
///
/// The handle is recorded as soon as create succeeds, so a failed start
/// still leaves it available for cleanup.
pub struct ContainerController<C> {
    client: C,
    handle: Option<ContainerId>,
}

impl<C: RuntimeClient> ContainerController<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            handle: None,
        }
    }

    /// The container created by this controller, if any.
    pub fn handle(&self) -> Option<&ContainerId> {
        self.handle.as_ref()
    }

    pub async fn create_and_start(
        &mut self,
        image: &ImageRef,
        command: &[String],
    ) -> Result<ContainerId, LifecycleError> {
        if let Some(existing) = &self.handle {
            return Err(LifecycleError::ContainerExists(existing.clone()));
        }

        let id = self.client.create_container(image, command).await.map_err(|e| {
            LifecycleError::runtime(Phase::Create, e, |source| LifecycleError::CreateFailed {
                image: image.clone(),
                source,
            })
        })?;
        tracing::info!(container_id = %id.short(12), %image, ?command, "container created");
        self.handle = Some(id.clone());

        self.client.start_container(&id).await.map_err(|e| {
            LifecycleError::runtime(Phase::Start, e, |source| LifecycleError::StartFailed {
                id: id.clone(),
                source,
            })
        })?;
        tracing::info!(container_id = %id.short(12), "container started");
        Ok(id)
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
