pub mod pool;
pub mod provider_config;
pub mod proxmox_auth;
pub mod proxmox_connection;
pub mod resource_id;
