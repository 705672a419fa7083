use serde::Deserialize;

/// Body of `POST /access/ticket`. Every member is optional so that a
/// response without a ticket is reported as an authentication failure
/// rather than a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub data: Option<LoginResponseData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginResponseData {
    #[serde(default)]
    pub ticket: Option<String>,
    #[serde(default, rename = "CSRFPreventionToken")]
    pub csrf_token: Option<String>,
}
