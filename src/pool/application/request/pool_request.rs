use serde::Serialize;

/// Form body of `POST /pools`.
#[derive(Serialize)]
pub struct CreatePoolRequest<'a> {
    pub poolid: &'a str,
    pub comment: &'a str,
}

/// Form body of `PUT /pools/{poolid}`.
#[derive(Serialize)]
pub struct UpdatePoolRequest<'a> {
    pub comment: &'a str,
}
