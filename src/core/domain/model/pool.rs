//! Local model of a `proxmox_pool` resource.

/// State of a managed resource pool as tracked by Terraform.
///
/// `id` is the resource identity; `None` means the pool is not (or no
/// longer) tracked. Pools are addressed directly by their pool id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolState {
    pub id: Option<String>,
    pub poolid: String,
    pub comment: String,
}

impl PoolState {
    /// A pool as declared in configuration, before it has been created.
    pub fn planned(poolid: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            id: None,
            poolid: poolid.into(),
            comment: comment.into(),
        }
    }

    /// A pool known only by its identity, as after an import.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            poolid: id.clone(),
            id: Some(id),
            comment: String::new(),
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }
}

