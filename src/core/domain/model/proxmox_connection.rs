use crate::core::domain::value_object::{
    ProxmoxOtp, ProxmoxPassword, ProxmoxUrl, ProxmoxUsername,
};

/// Everything needed to reach and log into a cluster.
#[derive(Debug, Clone)]
pub struct ProxmoxConnection {
    proxmox_url: ProxmoxUrl,
    proxmox_username: ProxmoxUsername,
    proxmox_password: ProxmoxPassword,
    proxmox_otp: Option<ProxmoxOtp>,
    tls_insecure: bool,
}

impl ProxmoxConnection {
    pub fn new(
        proxmox_url: ProxmoxUrl,
        proxmox_username: ProxmoxUsername,
        proxmox_password: ProxmoxPassword,
        proxmox_otp: Option<ProxmoxOtp>,
        tls_insecure: bool,
    ) -> Self {
        Self {
            proxmox_url,
            proxmox_username,
            proxmox_password,
            proxmox_otp,
            tls_insecure,
        }
    }

    pub fn proxmox_url(&self) -> &ProxmoxUrl {
        &self.proxmox_url
    }

    pub fn proxmox_username(&self) -> &ProxmoxUsername {
        &self.proxmox_username
    }

    pub fn proxmox_password(&self) -> &ProxmoxPassword {
        &self.proxmox_password
    }

    pub fn proxmox_otp(&self) -> Option<&ProxmoxOtp> {
        self.proxmox_otp.as_ref()
    }

    /// Whether certificate verification is disabled for every request.
    pub fn tls_insecure(&self) -> bool {
        self.tls_insecure
    }
}
