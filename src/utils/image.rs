use serde::{Deserialize, Serialize};

/// 可接受的上传图片格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageFormat {
    /// 通过文件头检测格式，不依赖客户端声明的 Content-Type
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        match &data[0..4] {
            [0xFF, 0xD8, 0xFF, _] => Some(Self::Jpeg),
            [0x89, 0x50, 0x4E, 0x47] => Some(Self::Png),
            [0x47, 0x49, 0x46, _] => Some(Self::Gif),
            _ if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" => {
                Some(Self::Webp)
            }
            _ => None,
        }
    }

    /// 获取MIME类型
    pub fn to_mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// 获取文件扩展名
    pub fn to_extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    /// 是否在允许列表中（列表里的 "jpeg" 和 "jpg" 等价）
    pub fn is_allowed(&self, allowed: &[String]) -> bool {
        allowed.iter().any(|t| {
            let t = t.trim().to_lowercase();
            match self {
                Self::Jpeg => t == "jpg" || t == "jpeg",
                other => t == other.to_extension(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        let png_header = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ImageFormat::detect(&png_header), Some(ImageFormat::Png));

        let jpeg_header = vec![0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(ImageFormat::detect(&jpeg_header), Some(ImageFormat::Jpeg));

        let gif_header = vec![0x47, 0x49, 0x46, 0x38];
        assert_eq!(ImageFormat::detect(&gif_header), Some(ImageFormat::Gif));

        let mut webp = b"RIFF".to_vec();
        webp.extend_from_slice(&[0, 0, 0, 0]);
        webp.extend_from_slice(b"WEBP");
        assert_eq!(ImageFormat::detect(&webp), Some(ImageFormat::Webp));
    }

    #[test]
    fn test_rejects_non_images() {
        assert_eq!(ImageFormat::detect(b"hello world"), None);
        assert_eq!(ImageFormat::detect(&[0xFF]), None);
    }

    #[test]
    fn test_allowed_types() {
        let allowed = vec!["jpeg".to_string(), "png".to_string()];
        assert!(ImageFormat::Jpeg.is_allowed(&allowed));
        assert!(ImageFormat::Png.is_allowed(&allowed));
        assert!(!ImageFormat::Gif.is_allowed(&allowed));
    }
}
