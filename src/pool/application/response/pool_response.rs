use serde::Deserialize;

/// `data` of `GET /pools/{poolid}`. Members are omitted by the cluster when
/// unset.
#[derive(Debug, Default, Deserialize)]
pub struct PoolResponse {
    #[serde(default)]
    pub comment: Option<String>,
}
