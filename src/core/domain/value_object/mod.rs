mod pool_id;
mod proxmox_csrf_token;
mod proxmox_otp;
mod proxmox_password;
mod proxmox_ticket;
mod proxmox_uri;
mod proxmox_username;

pub use proxmox_csrf_token::ProxmoxCSRFToken;
pub use proxmox_otp::ProxmoxOtp;
pub use proxmox_password::ProxmoxPassword;
pub use proxmox_ticket::ProxmoxTicket;
pub use proxmox_uri::ProxmoxUrl;
pub use proxmox_username::ProxmoxUsername;

// Re-export validation functions for internal use
pub(crate) use pool_id::validate_pool_id;
