//! Composite prompt assembly for banner requests.

use crate::media::InlineImage;
use crate::models::{AspectRatio, GenerationRequest, Quality, StylePreset};

/// Provider-agnostic image request: text, at most one inline attachment, and an aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct BannerRequest {
    pub text: String,
    pub attachment: Option<InlineImage>,
    pub aspect_ratio: AspectRatio,
}

/// Everything a variant shares with its siblings. Each variant still gets its own `BannerRequest`.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub product_url: &'a str,
    pub aspect_ratio: AspectRatio,
    pub quality: Quality,
    pub style: StylePreset,
    pub transparent_background: bool,
    pub logo: Option<&'a InlineImage>,
}

impl<'a> From<&'a GenerationRequest> for RenderContext<'a> {
    fn from(req: &'a GenerationRequest) -> Self {
        Self {
            product_url: &req.product_url,
            aspect_ratio: req.aspect_ratio,
            quality: req.quality,
            style: req.style,
            transparent_background: req.transparent_background,
            logo: req.logo.as_ref(),
        }
    }
}

impl RenderContext<'_> {
    pub fn build(&self, prompt: &str) -> BannerRequest {
        build_banner_request(prompt, self.product_url, self.aspect_ratio, self.quality, self.style, self.transparent_background, self.logo)
    }
}

impl Quality {
    pub fn clause(self) -> &'static str {
        match self {
            Quality::Standard => "The image should be photorealistic, with perfect lighting and composition suitable for a digital marketing campaign.",
            Quality::High => "The image should be highly detailed with sharp focus, professional color grading, and studio lighting.",
            Quality::Ultra => "The image should be an ultra-realistic 8k masterpiece, with intricate textures, cinematic lighting, hyper-realistic composition, and zero artifacts.",
        }
    }
}

impl StylePreset {
    pub fn clause(self) -> Option<&'static str> {
        match self {
            StylePreset::None => None,
            StylePreset::Cyberpunk => Some("Aesthetic: Cyberpunk, neon lights, high contrast, futuristic, dark atmosphere with vibrant accents."),
            StylePreset::Minimalist => Some("Aesthetic: Minimalist, clean lines, plenty of negative space, soft lighting, pastel or monochrome palette."),
            StylePreset::Luxe => Some("Aesthetic: Luxury, elegant, gold and marble textures, sophisticated lighting, high-end editorial look."),
            StylePreset::Retro => Some("Aesthetic: Retro 80s/90s, grain, vintage color processing, synthwave vibe, nostalgic."),
            StylePreset::Industrial => Some("Aesthetic: Industrial, raw concrete, steel, dramatic shadows, brutalist architecture, cold lighting."),
        }
    }
}

pub const TRANSPARENT_CLAUSE: &str = "The image must be generated with a transparent background, isolating the subject completely.";
pub const LOGO_CLAUSE: &str = "Incorporate the provided brand logo into the design naturally and professionally. Ensure the logo is visible but does not overpower the main product.";

pub fn build_banner_request(
    prompt: &str,
    product_url: &str,
    aspect_ratio: AspectRatio,
    quality: Quality,
    style: StylePreset,
    transparent_background: bool,
    logo: Option<&InlineImage>,
) -> BannerRequest {
    let mut text = format!(
        "Generate a professional advertising banner image for the following product description: \"{prompt}\". {}",
        quality.clause()
    );
    if let Some(style) = style.clause() {
        text.push(' ');
        text.push_str(style);
    }
    if transparent_background {
        text.push(' ');
        text.push_str(TRANSPARENT_CLAUSE);
    }
    let product_url = product_url.trim();
    if !product_url.is_empty() {
        text.push_str(&format!("\n\nThe product is associated with this URL: {product_url}."));
    }
    if logo.is_some() {
        text.push_str("\n\n");
        text.push_str(LOGO_CLAUSE);
    }

    BannerRequest { text, attachment: logo.cloned(), aspect_ratio }
}
