use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use campus_core::app_ctx::AppContext;
use campus_core::blueprint::Blueprint;
use campus_core::store::RecordStore;

use crate::cli::rt;

pub struct ServerConfig {
    pub app_ctx: Arc<AppContext>,
    pub store: Arc<RecordStore>,
}

impl ServerConfig {
    pub async fn new(blueprint: Blueprint) -> Result<Self> {
        let app_ctx = AppContext {
            runtime: rt::init(),
            blueprint,
        };
        let app_ctx = Arc::new(app_ctx);
        let store = Arc::new(RecordStore::init(app_ctx.clone()).await?);

        Ok(Self { app_ctx, store })
    }

    pub fn addr(&self) -> SocketAddr {
        (
            self.app_ctx.blueprint.server.hostname,
            self.app_ctx.blueprint.server.port,
        )
            .into()
    }
}
