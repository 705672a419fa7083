//! Session-wide allocation of fresh VM identifiers.

use crate::core::domain::error::{ProxmoxError, ProxmoxResult};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Something that can answer "which VM id is free, searching from `start`?".
///
/// `start` is `None` when nothing has been allocated yet in this session,
/// letting the cluster pick its own lowest free id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NextIdSource: Send + Sync {
    async fn next_free_id(&self, start: Option<u32>) -> ProxmoxResult<u32>;
}

/// Hands out strictly increasing VM ids for the lifetime of a session.
///
/// The lock is held across the remote query, serializing allocations so two
/// concurrent creates never observe the same id.
#[derive(Debug, Default)]
pub struct VmIdAllocator {
    last_allocated: Mutex<Option<u32>>,
}

impl VmIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries `source` for the next free id above the last one handed out.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Allocation` if the query fails or the cluster
    /// answers with an id that does not advance the sequence. The stored
    /// maximum is left untouched on failure.
    pub async fn next_id(&self, source: &dyn NextIdSource) -> ProxmoxResult<u32> {
        let mut last_allocated = self.last_allocated.lock().await;

        let start = match *last_allocated {
            Some(last) => Some(last.checked_add(1).ok_or_else(|| {
                ProxmoxError::Allocation("VM id space exhausted".to_string())
            })?),
            None => None,
        };

        let id = source.next_free_id(start).await.map_err(|e| match e {
            ProxmoxError::Allocation(_) => e,
            other => ProxmoxError::Allocation(format!("next free id query failed: {}", other)),
        })?;

        if let Some(last) = *last_allocated {
            if id <= last {
                return Err(ProxmoxError::Allocation(format!(
                    "cluster returned VM id {} which is not above the last allocated id {}",
                    id, last
                )));
            }
        }

        *last_allocated = Some(id);
        tracing::info!(vmid = id, "allocated VM id");
        Ok(id)
    }

    /// The highest id handed out so far, if any.
    pub async fn last_allocated(&self) -> Option<u32> {
        *self.last_allocated.lock().await
    }
}
