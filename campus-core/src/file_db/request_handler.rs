use std::path::PathBuf;

use anyhow::{anyhow, Context};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::runtime::TargetRuntime;
use crate::uid_gen::UidGenerator;

use super::file_config::{FileHolder, LocalFileConfig, Metadata, RemoteFileConfig};

const MAX_FILE_SIZE: usize = 1024 * 1024 * 10; // 10MB
const METADATA_FILE: &str = "config.json";

/// Stores curriculum files either in a local directory or in a remote
/// store reached over http.
pub struct FileRequestHandler {
    target_runtime: TargetRuntime,
    db_dir: String,
    is_url: bool,
}

impl FileRequestHandler {
    pub fn new(target_runtime: TargetRuntime, file_db_path: String) -> Self {
        Self {
            target_runtime,
            is_url: file_db_path.starts_with("http"), // validated during config -> blueprint conversion
            db_dir: file_db_path,
        }
    }

    pub async fn insert(&self, title: String, file: FileHolder) -> anyhow::Result<String> {
        let uid = UidGenerator::default().generate(
            self.target_runtime
                .instance
                .now()
                .map_err(|_| anyhow!("Unable to generate UID"))?,
        );
        self.insert_inner(title, file, uid).await
    }

    async fn insert_inner(
        &self,
        title: String,
        file: FileHolder,
        uid: String,
    ) -> anyhow::Result<String> {
        let bytes = validate_file(&file)?;
        let metadata = Metadata {
            title: if title.trim().is_empty() {
                file.name.clone()
            } else {
                title.trim().to_string()
            },
            file_name: file.name.clone(),
            timestamp: self.target_runtime.instance.now()?,
            size: bytes.len(),
            sha256: hex::encode(Sha256::digest(&bytes)),
        };

        if self.is_url {
            let url = self.remote_url(&uid)?;
            let mut req = reqwest::Request::new(reqwest::Method::POST, url);
            let file_config = serde_json::to_string(&RemoteFileConfig { file, metadata })
                .map_err(|e| {
                    anyhow!(
                        "Unable to generate body for further request with err: {}",
                        e
                    )
                })?;
            *req.body_mut() = Some(reqwest::Body::from(file_config));

            let response = self
                .target_runtime
                .http
                .execute(req)
                .await
                .map_err(|e| anyhow!("Failed to insert into remote server with err: {}", e))?;

            if !response.status.is_success() {
                return Err(anyhow!("Failed to insert into remote server"));
            }
        } else {
            let dir = self.local_dir(&uid);
            let dir_path = dir.to_str().context("Unable to generate path")?;
            self.target_runtime
                .file
                .create_dirs(dir_path)
                .await
                .map_err(|e| anyhow!("Unable to create dir for uid: {} with err: {}", uid, e))?;

            let file_path = dir.join(&file.name);
            let file_path = file_path.to_str().context("Unable to generate path")?;
            self.target_runtime
                .file
                .write(file_path, file.content.as_bytes())
                .await?;

            let local_config = serde_json::to_string(&LocalFileConfig {
                file: file.name,
                metadata,
            })?;
            let config_path = dir.join(METADATA_FILE);
            let config_path = config_path.to_str().context("Unable to generate path")?;
            self.target_runtime
                .file
                .write(config_path, local_config.as_bytes())
                .await?;
        }
        log::info!("Stored curriculum file {}", uid);
        Ok(uid)
    }

    pub async fn get_metadata(&self, uid: &str) -> anyhow::Result<Metadata> {
        validate_uid(uid)?;
        if self.is_url {
            let req = reqwest::Request::new(reqwest::Method::GET, self.remote_url(uid)?);
            let response = self.target_runtime.http.execute(req).await.map_err(|e| {
                anyhow!("Failed to get metadata from remote server with err: {}", e)
            })?;

            if !response.status.is_success() {
                return Err(anyhow!("Failed to get metadata from remote server"));
            }

            Ok(response.to_json::<Metadata>()?.body)
        } else {
            Ok(self.local_config(uid).await?.metadata)
        }
    }

    pub async fn get(&self, uid: &str) -> anyhow::Result<FileHolder> {
        validate_uid(uid)?;
        if self.is_url {
            let url = self.remote_url(&format!("{}/content", uid))?;
            let req = reqwest::Request::new(reqwest::Method::GET, url);
            let response = self
                .target_runtime
                .http
                .execute(req)
                .await
                .map_err(|e| anyhow!("Failed to get from remote server with err: {}", e))?;

            if !response.status.is_success() {
                return Err(anyhow!("Failed to get from remote server"));
            }

            Ok(response.to_json::<FileHolder>()?.body)
        } else {
            let config = self.local_config(uid).await?;
            let path = self.local_dir(uid).join(&config.file);
            let path = path.to_str().context("Unable to generate path")?;
            let content = self.target_runtime.file.read(path).await?;
            Ok(FileHolder {
                name: config.file,
                content,
            })
        }
    }

    fn local_dir(&self, uid: &str) -> PathBuf {
        PathBuf::from(&self.db_dir).join(uid)
    }

    async fn local_config(&self, uid: &str) -> anyhow::Result<LocalFileConfig> {
        let path = self.local_dir(uid).join(METADATA_FILE);
        let path = path.to_str().context("Unable to generate path")?;
        let content = self.target_runtime.file.read(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    fn remote_url(&self, path: &str) -> anyhow::Result<url::Url> {
        Ok(url::Url::parse(&format!(
            "{}/{}",
            self.db_dir.trim_end_matches('/'),
            path
        ))?)
    }
}

/// Checks the name and size and returns the decoded content.
fn validate_file(file: &FileHolder) -> anyhow::Result<Vec<u8>> {
    let name = file.name.as_str();
    if name.trim().is_empty()
        || name == METADATA_FILE
        || name.contains(['/', '\\'])
        || name.starts_with('.')
    {
        return Err(anyhow!("Invalid file name: {:?}", name));
    }
    let bytes = BASE64_STANDARD
        .decode(file.content.as_bytes())
        .map_err(|_| anyhow!("File {} is not valid base64", name))?;
    if bytes.len() > MAX_FILE_SIZE {
        return Err(anyhow!("File {} exceeds size limit", name));
    }
    Ok(bytes)
}

fn validate_uid(uid: &str) -> anyhow::Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    if uid.is_empty() || !uid.chars().all(allowed) {
        return Err(anyhow!("Invalid content id: {}", uid));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_mock_server() -> httpmock::MockServer {
        httpmock::MockServer::start()
    }

    fn holder(name: &str, raw: &[u8]) -> FileHolder {
        FileHolder {
            name: name.to_string(),
            content: BASE64_STANDARD.encode(raw),
        }
    }

    #[test]
    fn test_validate_file_exceeds_size() {
        let file = holder("large_file.txt", &vec![b'0'; MAX_FILE_SIZE + 1]);
        assert!(validate_file(&file).is_err());
    }

    #[test]
    fn test_validate_file_within_limit() {
        let file = holder("valid_size_file.txt", &vec![b'0'; MAX_FILE_SIZE]);
        assert_eq!(validate_file(&file).unwrap().len(), MAX_FILE_SIZE);
    }

    #[test]
    fn test_validate_file_names() {
        for name in ["", "../etc/passwd", "a/b", ".hidden", "config.json"] {
            assert!(validate_file(&holder(name, b"x")).is_err(), "{}", name);
        }
        let not_base64 = FileHolder {
            name: "plan.txt".to_string(),
            content: "%%%".to_string(),
        };
        assert!(validate_file(&not_base64).is_err());
    }

    #[tokio::test]
    async fn test_round_local() {
        let tmpdir = tempfile::tempdir().unwrap();
        let name = tmpdir.path().to_str().unwrap();
        let rt = crate::runtime::tests::init();

        let handler = FileRequestHandler::new(rt, name.to_string());
        let file = holder("syllabus.md", b"hello world");
        let uid = handler
            .insert("Syllabus".to_string(), file.clone())
            .await
            .unwrap();

        let md = handler.get_metadata(&uid).await.unwrap();
        assert_eq!(md.title, "Syllabus");
        assert_eq!(md.file_name, "syllabus.md");
        assert_eq!(md.size, 11);
        assert_eq!(
            md.sha256,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );

        let stored = handler.get(&uid).await.unwrap();
        assert_eq!(stored, file);
    }

    #[tokio::test]
    async fn test_untitled_upload_uses_file_name() {
        let handler = FileRequestHandler::new(crate::runtime::tests::init(), "files".to_string());
        let uid = handler
            .insert(" ".to_string(), holder("plan.txt", b"week 1"))
            .await
            .unwrap();
        assert_eq!(handler.get_metadata(&uid).await.unwrap().title, "plan.txt");
    }

    #[tokio::test]
    async fn test_insert_into_remote() {
        let rt = crate::runtime::tests::init();
        let server = start_mock_server();
        let mock = server.mock(|w, t| {
            w.path("/store/sample").method(httpmock::Method::POST);
            t.status(200).body("ok");
        });

        let handler = FileRequestHandler::new(rt, format!("{}/store/", server.base_url()));
        let result = handler
            .insert_inner(
                "".to_string(),
                holder("test.txt", b"AQBF"),
                "sample".to_string(),
            )
            .await;
        assert_eq!(result.unwrap(), "sample");
        mock.assert();
    }

    #[tokio::test]
    async fn test_insert_fail_remote() {
        let server = start_mock_server();
        server.mock(|w, t| {
            w.method(httpmock::Method::POST);
            t.status(500);
        });
        let handler = FileRequestHandler::new(crate::runtime::tests::init(), server.base_url());
        let result = handler
            .insert("".to_string(), holder("test.txt", b"AQBF"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_metadata_remote() {
        let server = start_mock_server();
        let handler = FileRequestHandler::new(crate::runtime::tests::init(), server.base_url());

        let sample_metadata = Metadata {
            title: "title".to_string(),
            file_name: "foo.txt".to_string(),
            timestamp: 1,
            size: 3,
            sha256: "abc".to_string(),
        };

        server.mock(|w, t| {
            w.method(httpmock::Method::GET).path("/sample");
            t.status(200)
                .body(serde_json::to_string(&sample_metadata).unwrap());
        });

        let md = handler.get_metadata("sample").await.unwrap();
        assert_eq!(sample_metadata, md);
    }

    #[tokio::test]
    async fn test_get_remote_content() {
        let server = start_mock_server();
        let handler = FileRequestHandler::new(crate::runtime::tests::init(), server.base_url());
        server.mock(|w, t| {
            w.method(httpmock::Method::GET).path("/sample/content");
            t.status(200)
                .body(r#"{"name":"foo.txt","content":"AQBF"}"#);
        });

        let file = handler.get("sample").await.unwrap();
        assert_eq!(file.name, "foo.txt");
        assert_eq!(file.content, "AQBF");
    }

    #[tokio::test]
    async fn test_invalid_uid() {
        let handler = FileRequestHandler::new(crate::runtime::tests::init(), "files".to_string());
        assert!(handler.get_metadata("../secrets").await.is_err());
        assert!(handler.get("missing").await.is_err());
    }
}
