use campus_core::http::response::Response;
use campus_core::HttpIO;
use hyper::body::Bytes;
use reqwest::{Client, Request};

#[derive(Default, Clone)]
pub struct NativeHttp {
    client: Client,
}

#[async_trait::async_trait]
impl HttpIO for NativeHttp {
    async fn execute(&self, request: Request) -> anyhow::Result<Response<Bytes>> {
        log::info!("{} {}", request.method(), request.url());
        log::debug!("request: {:?}", request);
        let response = self.client.execute(request).await?;
        log::debug!("response: {:?}", response);

        Response::from_reqwest(response).await
    }
}
