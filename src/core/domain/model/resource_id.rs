//! Composite identity of a managed resource.
//!
//! Terraform stores a single string per resource; for resources living on a
//! node this string is `<node>/<type>/<vmid>`, e.g. `pve1/qemu/100`.

use crate::core::domain::error::{ProxmoxResult, ValidationError};
use std::fmt;
use std::str::FromStr;

/// The `(node, type, vmid)` triple identifying a resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    node: String,
    resource_type: String,
    vm_id: u32,
}

impl ResourceId {
    /// Builds an identity, rejecting node or type values that could not be
    /// parsed back (empty, or containing `/`).
    pub fn new(
        node: impl Into<String>,
        resource_type: impl Into<String>,
        vm_id: u32,
    ) -> Result<Self, ValidationError> {
        let node = node.into();
        let resource_type = resource_type.into();
        validate_segment("node", &node)?;
        validate_segment("type", &resource_type)?;
        Ok(Self {
            node,
            resource_type,
            vm_id,
        })
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn vm_id(&self) -> u32 {
        self.vm_id
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.node, self.resource_type, self.vm_id)
    }
}

impl FromStr for ResourceId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ValidationError::Format(format!(
                "Invalid resource format: {}. Must be node/type/vmId",
                s
            ))
        };

        let mut parts = s.split('/');
        let (Some(node), Some(resource_type), Some(id), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if node.is_empty() || resource_type.is_empty() {
            return Err(invalid());
        }
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let vm_id = id.parse::<u32>().map_err(|_| {
            ValidationError::Format(format!("VM id '{}' in '{}' is out of range", id, s))
        })?;

        Ok(Self {
            node: node.to_string(),
            resource_type: resource_type.to_string(),
            vm_id,
        })
    }
}

/// Formats a resource identity as `<node>/<type>/<vmid>`.
#[must_use]
pub fn encode_resource_id(node: &str, resource_type: &str, vm_id: u32) -> String {
    format!("{}/{}/{}", node, resource_type, vm_id)
}

/// Parses a `<node>/<type>/<vmid>` identity string.
pub fn decode_resource_id(id: &str) -> ProxmoxResult<ResourceId> {
    Ok(id.parse::<ResourceId>()?)
}

fn validate_segment(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.contains('/') {
        return Err(ValidationError::Field {
            field: field.to_string(),
            message: "must be non-empty and must not contain '/'".to_string(),
        });
    }
    Ok(())
}
