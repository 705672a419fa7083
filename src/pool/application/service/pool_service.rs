//! Create/read/update/delete handlers of the `proxmox_pool` resource.
//!
//! Each handler wraps only its HTTP exchange in an admission permit; the
//! read that follows a create or update takes its own permit.

use crate::{
    core::{
        domain::{
            error::{ProxmoxResult, ValidationError},
            model::pool::PoolState,
            value_object::validate_pool_id,
        },
        infrastructure::{admission_limiter::AdmissionLimiter, api_client::ApiClient},
    },
    pool::application::{
        request::pool_request::{CreatePoolRequest, UpdatePoolRequest},
        response::pool_response::PoolResponse,
    },
};
use reqwest::Method;

/// Marker the cluster puts in an error body when a pool is gone.
const POOL_MISSING_MARKER: &str = "does not exist";

pub struct PoolService<'a> {
    api_client: &'a ApiClient,
    limiter: &'a AdmissionLimiter,
}

impl<'a> PoolService<'a> {
    pub fn new(api_client: &'a ApiClient, limiter: &'a AdmissionLimiter) -> Self {
        Self {
            api_client,
            limiter,
        }
    }

    /// Creates the pool, records its identity and reads it back.
    pub async fn create(&self, state: &mut PoolState) -> ProxmoxResult<()> {
        validate_pool_id(&state.poolid)?;

        {
            let _permit = self.limiter.acquire().await;
            let request = CreatePoolRequest {
                poolid: &state.poolid,
                comment: &state.comment,
            };
            self.api_client.post_form(&["pools"], &request).await?;
        }

        tracing::info!(poolid = %state.poolid, "created pool");
        state.id = Some(state.poolid.clone());
        self.read(state).await
    }

    /// Refreshes the state from the cluster. A pool deleted outside of
    /// Terraform is not an error: its identity is cleared instead.
    pub async fn read(&self, state: &mut PoolState) -> ProxmoxResult<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };

        let response = {
            let _permit = self.limiter.acquire().await;
            let request = self
                .api_client
                .new_authenticated_request(Method::GET, &["pools", id.as_str()]);
            self.api_client.send(request).await?
        };

        if !response.status.is_success() && response.body.contains(POOL_MISSING_MARKER) {
            tracing::info!(poolid = %id, "pool no longer exists, dropping from state");
            state.clear_id();
            return Ok(());
        }

        let pool: PoolResponse = response.into_data()?;
        state.comment = pool.comment.unwrap_or_default();
        state.poolid = id;
        Ok(())
    }

    /// Applies a changed comment, then reads the pool back. No request is
    /// sent when the comment is unchanged.
    ///
    /// # Errors
    /// Updating a pool that is not tracked is a validation error.
    pub async fn update(&self, state: &mut PoolState, planned_comment: &str) -> ProxmoxResult<()> {
        let Some(id) = state.id.clone() else {
            return Err(ValidationError::Field {
                field: "id".to_string(),
                message: format!("pool '{}' is not tracked", state.poolid),
            }
            .into());
        };

        if state.comment != planned_comment {
            {
                let _permit = self.limiter.acquire().await;
                let request = UpdatePoolRequest {
                    comment: planned_comment,
                };
                self.api_client
                    .put_form(&["pools", id.as_str()], &request)
                    .await?;
            }
            tracing::info!(poolid = %id, "updated pool comment");
            state.comment = planned_comment.to_string();
        }

        self.read(state).await
    }

    /// Deletes the pool. The identity is cleared whatever the cluster
    /// answers; a failed remote delete is only logged.
    pub async fn delete(&self, state: &mut PoolState) -> ProxmoxResult<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };

        let result = {
            let _permit = self.limiter.acquire().await;
            self.api_client.delete(&["pools", id.as_str()]).await
        };

        match result {
            Ok(()) => tracing::info!(poolid = %id, "deleted pool"),
            Err(e) => tracing::warn!(poolid = %id, error = %e, "pool delete failed remotely"),
        }

        state.clear_id();
        Ok(())
    }
}
