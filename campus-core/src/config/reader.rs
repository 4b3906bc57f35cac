use crate::config::config_module::ConfigModule;
use crate::config::Config;
use crate::runtime::TargetRuntime;
use reqwest::Url;
use std::path::Path;

/// Reads the configuration from a file or from an HTTP URL and resolves all
/// linked resources to create a ConfigModule.
pub struct ConfigReader {
    runtime: TargetRuntime,
}

/// Response of a file read operation
#[derive(Debug)]
struct FileRead {
    content: String,
    path: String,
}

impl ConfigReader {
    pub fn init(runtime: TargetRuntime) -> Self {
        Self { runtime }
    }

    /// Reads the config file and returns serialized config
    pub async fn read<T: AsRef<str>>(&self, file: T) -> anyhow::Result<ConfigModule> {
        let file = self.read_file(file).await?;
        let config = Config::from_json(&file.content)?;
        let parent = if file.path.starts_with("http") {
            None
        } else {
            Path::new(&file.path).parent()
        };
        let config_module = ConfigModule::from(config)
            .resolve(&self.runtime, parent)
            .await?;

        Ok(config_module)
    }

    /// Reads a file from the filesystem or from an HTTP URL
    async fn read_file<T: AsRef<str>>(&self, file: T) -> anyhow::Result<FileRead> {
        let content = match Url::parse(file.as_ref()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let response = self
                    .runtime
                    .http
                    .execute(reqwest::Request::new(reqwest::Method::GET, url))
                    .await?;

                String::from_utf8(response.body.to_vec())?
            }
            _ => self.runtime.file.read(file.as_ref()).await?,
        };

        Ok(FileRead {
            content,
            path: file.as_ref().to_string(),
        })
    }
}
