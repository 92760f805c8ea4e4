use crate::{
    config::Config,
    error::{AppError, Result},
    utils::image::ImageFormat,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 上传配置，启动时由 [`Config`] 构建后传入 [`MediaService`]
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// 文件落盘目录
    pub dir: PathBuf,
    /// 存入数据库的引用前缀，同时是静态文件的挂载路径
    pub public_prefix: String,
    pub max_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl UploadConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dir: config.upload_path(),
            public_prefix: "uploads".to_string(),
            max_bytes: config.max_upload_size,
            allowed_types: config
                .allowed_image_types
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

/// multipart 中的单个文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct MediaService {
    upload: UploadConfig,
}

impl MediaService {
    pub async fn new(upload: UploadConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&upload.dir).await?;
        info!("Upload directory ready at {}", upload.dir.display());
        Ok(Self { upload })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload.dir
    }

    /// 校验并保存图片，返回形如 `uploads/<file>` 的引用
    pub async fn save_image(&self, file: &UploadedFile) -> Result<String> {
        if file.data.is_empty() {
            return Err(AppError::FileUpload("Uploaded file is empty".to_string()));
        }

        if file.data.len() as u64 > self.upload.max_bytes {
            return Err(AppError::FileUpload(format!(
                "File size too large. Maximum size is {}MB.",
                self.upload.max_bytes / (1024 * 1024)
            )));
        }

        let format = ImageFormat::detect(&file.data)
            .filter(|f| f.is_allowed(&self.upload.allowed_types))
            .ok_or_else(|| {
                AppError::FileUpload("Only image files (jpeg, png, gif, webp) are allowed".to_string())
            })?;

        let short_id = uuid::Uuid::new_v4().simple().to_string();
        let file_name = format!(
            "{}-{}-{}.{}",
            file.field_name,
            chrono::Utc::now().timestamp_millis(),
            &short_id[..8],
            format.to_extension()
        );

        let path = self.upload.dir.join(&file_name);
        tokio::fs::write(&path, &file.data).await?;

        debug!(
            "Stored {} ({} bytes, {}) as {}",
            file.file_name.as_deref().unwrap_or("unnamed"),
            file.data.len(),
            format.to_mime_type(),
            path.display()
        );

        Ok(format!("{}/{}", self.upload.public_prefix, file_name))
    }

    /// 删除之前保存的文件；文件不存在或引用不属于上传目录时忽略
    pub async fn remove(&self, reference: &str) {
        let Some(path) = self.resolve(reference) else {
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(_) => debug!("Removed upload {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove upload {}: {}", path.display(), e),
        }
    }

    /// `uploads/<file>` -> 磁盘路径，拒绝目录穿越
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let prefix = format!("{}/", self.upload.public_prefix);
        let name = reference.strip_prefix(&prefix).unwrap_or(reference);

        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return None;
        }
        Some(self.upload.dir.join(name))
    }
}
