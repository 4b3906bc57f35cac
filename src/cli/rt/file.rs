use anyhow::Context;
use campus_core::FileIO;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[derive(Default, Clone)]
pub struct NativeFileIO {}

#[async_trait::async_trait]
impl FileIO for NativeFileIO {
    async fn write<'a>(&'a self, path: &'a str, content: &'a [u8]) -> anyhow::Result<()> {
        let mut file = tokio::fs::File::create(path)
            .await
            .with_context(|| format!("Unable to create {}", path))?;
        file.write_all(content).await?;
        file.flush().await?;
        log::debug!("Wrote {} bytes to {}", content.len(), path);
        Ok(())
    }

    async fn read<'a>(&'a self, path: &'a str) -> anyhow::Result<String> {
        let mut file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Unable to open {}", path))?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).await?;
        Ok(String::from_utf8(buffer)?)
    }

    async fn create_dirs<'a>(&'a self, path: &'a str) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Unable to create directory {}", path))
    }
}
