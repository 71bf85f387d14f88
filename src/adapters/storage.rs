use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::Path;

/// Report artefacts on the local filesystem, relative to `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());

        storage.write_file("reports/a.csv", b"band,count\n").await.unwrap();
        storage.write_file("reports/a.csv", b"band,count\n<30,1\n").await.unwrap();

        let data = tokio::fs::read(dir.path().join("reports/a.csv")).await.unwrap();
        assert_eq!(data, b"band,count\n<30,1\n");
    }
}
