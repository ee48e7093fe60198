use serde::{Serialize, Deserialize};
use serde_with::{serde_as, base64::Base64};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::media::{InlineImage, MediaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")] Square,
    #[serde(rename = "4:3")] Classic,
    #[serde(rename = "3:4")] ClassicPortrait,
    #[default]
    #[serde(rename = "16:9")] Landscape,
    #[serde(rename = "9:16")] Portrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [Self::Square, Self::Landscape, Self::Portrait, Self::Classic, Self::ClassicPortrait];

    /// Directive value understood by the image model.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Classic => "4:3",
            Self::ClassicPortrait => "3:4",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    #[default]
    Standard,
    High,
    Ultra,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Self::Standard, Self::High, Self::Ultra];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StylePreset {
    #[default]
    None,
    Cyberpunk,
    Minimalist,
    Luxe,
    Retro,
    Industrial,
}

impl StylePreset {
    pub const ALL: [StylePreset; 6] = [Self::None, Self::Cyberpunk, Self::Minimalist, Self::Luxe, Self::Retro, Self::Industrial];
}

/// How many A/B variants one cycle renders. Serialized as the bare integer 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VariationCount {
    #[default]
    One,
    Two,
    Three,
}

impl VariationCount {
    pub fn get(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    pub fn is_multi(self) -> bool { self != Self::One }
}

impl TryFrom<u8> for VariationCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("variation count must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<VariationCount> for u8 {
    fn from(value: VariationCount) -> Self { value.get() as u8 }
}

/// Logo as it arrives over the wire: either a full data URI or a base64 payload with an optional declared type.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LogoUpload {
    DataUri(String),
    Encoded {
        #[serde(default)]
        mime_type: Option<String>,
        #[serde_as(as = "Base64")]
        data: Vec<u8>,
    },
}

impl LogoUpload {
    pub fn into_inline_image(self) -> Result<InlineImage, MediaError> {
        match self {
            Self::DataUri(uri) => InlineImage::from_data_uri(&uri),
            Self::Encoded { mime_type: Some(mime), data } if !mime.trim().is_empty() => Ok(InlineImage::new(mime.trim(), data)),
            Self::Encoded { data, .. } => Ok(InlineImage::sniffed(data)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateBody {
    pub description: String,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub style: StylePreset,
    #[serde(default)]
    pub transparent_background: bool,
    #[serde(default)]
    pub variation_count: VariationCount,
    #[serde(default)]
    pub logo: Option<LogoUpload>,
    #[serde(default)]
    pub auto_enhance: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("PRODUCT DESCRIPTION IS REQUIRED")]
    EmptyDescription,
    #[error("URL CANNOT CONTAIN SPACES")]
    UrlContainsSpaces,
    #[error("URL MUST START WITH HTTP:// OR HTTPS://")]
    UrlMissingScheme,
    #[error("INVALID URL FORMAT")]
    InvalidUrl,
    #[error("INVALID LOGO IMAGE: {0}")]
    InvalidLogo(#[from] MediaError),
}

/// Checks a product URL the same way the form does. Empty input is accepted.
pub fn validate_product_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() { return Ok(()); }
    if url.contains(' ') { return Err(ValidationError::UrlContainsSpaces); }
    let lower = url.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(ValidationError::UrlMissingScheme);
    }
    reqwest::Url::parse(url).map(|_| ()).map_err(|_| ValidationError::InvalidUrl)
}

/// A validated, immutable request for one generation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub description: String,
    pub product_url: String,
    pub aspect_ratio: AspectRatio,
    pub quality: Quality,
    pub style: StylePreset,
    pub transparent_background: bool,
    pub variation_count: VariationCount,
    pub logo: Option<InlineImage>,
    pub auto_enhance: bool,
}

impl GenerationRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            product_url: String::new(),
            aspect_ratio: AspectRatio::default(),
            quality: Quality::default(),
            style: StylePreset::default(),
            transparent_background: false,
            variation_count: VariationCount::default(),
            logo: None,
            auto_enhance: false,
        }
    }
}

impl TryFrom<GenerateBody> for GenerationRequest {
    type Error = ValidationError;

    fn try_from(body: GenerateBody) -> Result<Self, Self::Error> {
        if body.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let product_url = body.product_url.unwrap_or_default().trim().to_string();
        validate_product_url(&product_url)?;
        let logo = body.logo.map(LogoUpload::into_inline_image).transpose()?;
        Ok(Self {
            product_url,
            aspect_ratio: body.aspect_ratio,
            quality: body.quality,
            style: body.style,
            transparent_background: body.transparent_background,
            variation_count: body.variation_count,
            logo,
            auto_enhance: body.auto_enhance,
            ..Self::new(body.description)
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedImage {
    pub id: Uuid,
    pub url: String, // data URI, ready to embed or export
    pub aspect_ratio: AspectRatio,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceBody {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub prompt: String,
}
