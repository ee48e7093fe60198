//! Inline image payloads: data URIs, base64 and MIME detection.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use image::ImageFormat;
use thiserror::Error;

pub const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("not a base64 data URI")]
    NotDataUri,
    #[error("invalid base64 payload: {0}")]
    Base64(String),
}

/// Raw image bytes plus their MIME type, as attached to or returned from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Bytes,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { mime_type: mime_type.into(), data: data.into() }
    }

    /// Detects the type from magic bytes, falling back to PNG.
    pub fn sniffed(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let mime_type = image::guess_format(&data)
            .map(|f| f.to_mime_type())
            .unwrap_or(DEFAULT_MIME_TYPE);
        Self { mime_type: mime_type.to_string(), data }
    }

    pub fn from_base64(mime_type: impl Into<String>, payload: &str) -> Result<Self, MediaError> {
        let data = STANDARD.decode(payload.trim()).map_err(|e| MediaError::Base64(e.to_string()))?;
        Ok(Self::new(mime_type, data))
    }

    /// Parses `data:<mime>;base64,<payload>`. A header without a usable type
    /// (e.g. `data:;base64,`) falls back to sniffing the decoded bytes.
    pub fn from_data_uri(uri: &str) -> Result<Self, MediaError> {
        let rest = uri.trim().strip_prefix("data:").ok_or(MediaError::NotDataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(MediaError::NotDataUri)?;
        let declared = header.split(';').next().unwrap_or_default();
        let data = STANDARD.decode(payload.trim()).map_err(|e| MediaError::Base64(e.to_string()))?;
        if is_mime_type(declared) {
            Ok(Self::new(declared, data))
        } else {
            Ok(Self::sniffed(data))
        }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// File extension for exports; unknown types are saved as png.
    pub fn file_extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.mime_type)
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("png")
    }
}

fn is_mime_type(s: &str) -> bool {
    let Some((kind, sub)) = s.split_once('/') else { return false };
    let kind_ok = !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphanumeric());
    let sub_ok = !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'));
    kind_ok && sub_ok
}
