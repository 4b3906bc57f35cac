use anyhow::{Context, Result};
use bytes::Bytes;
use derive_setters::Setters;
use serde::de;

/// Response of the remote record and curriculum stores.
#[derive(Clone, Debug, Default, Setters)]
pub struct Response<Body: Default + Clone> {
    pub status: reqwest::StatusCode,
    pub headers: reqwest::header::HeaderMap,
    pub body: Body,
}

impl Response<Bytes> {
    pub async fn from_reqwest(resp: reqwest::Response) -> Result<Self> {
        let status = resp.status();
        let headers = resp.headers().to_owned();
        let body = resp.bytes().await?;
        Ok(Response {
            status,
            headers,
            body,
        })
    }

    pub fn to_json<T: de::DeserializeOwned + Clone + Default>(self) -> Result<Response<T>> {
        let body = serde_json::from_slice::<T>(&self.body)
            .with_context(|| format!("Unexpected body from remote store ({})", self.status))?;
        Ok(Response {
            status: self.status,
            headers: self.headers,
            body,
        })
    }
}
