use serde::Serialize;

use crate::models::{AspectRatio, Quality, StylePreset};

#[derive(Debug, Serialize)]
pub struct OptionEntry<T> {
    pub value: T,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Options {
    pub aspect_ratios: Vec<OptionEntry<AspectRatio>>,
    pub qualities: Vec<OptionEntry<Quality>>,
    pub styles: Vec<OptionEntry<StylePreset>>,
    pub variation_counts: [u8; 3],
}

#[derive(Debug, Serialize, Clone, Copy)]
pub struct SamplePrompt {
    pub description: &'static str,
    pub url: &'static str,
}

impl AspectRatio {
    pub fn label(self) -> &'static str {
        match self {
            Self::Square => "Square (1:1)",
            Self::Landscape => "Landscape (16:9)",
            Self::Portrait => "Portrait (9:16)",
            Self::Classic => "Classic TV (4:3)",
            Self::ClassicPortrait => "Classic Portrait (3:4)",
        }
    }
}

impl StylePreset {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Raw",
            Self::Minimalist => "Minimal",
            Self::Cyberpunk => "Cyberpunk",
            Self::Luxe => "Luxe",
            Self::Retro => "Retro",
            Self::Industrial => "Industrial",
        }
    }
}

pub fn options() -> Options {
    Options {
        aspect_ratios: AspectRatio::ALL.iter().map(|&value| OptionEntry { value, label: value.label() }).collect(),
        qualities: Quality::ALL
            .iter()
            .map(|&value| OptionEntry {
                value,
                label: match value {
                    Quality::Standard => "Standard",
                    Quality::High => "High",
                    Quality::Ultra => "Ultra",
                },
            })
            .collect(),
        styles: StylePreset::ALL.iter().map(|&value| OptionEntry { value, label: value.label() }).collect(),
        variation_counts: [1, 2, 3],
    }
}

pub const SAMPLE_PROMPTS: &[SamplePrompt] = &[
    SamplePrompt { description: "A sleek, carbon-fiber racing bicycle on a mountain pass at sunset", url: "https://example.com/bike" },
    SamplePrompt { description: "Organic artisan coffee beans spilling out of a burlap sack, rustic vibe", url: "https://example.com/coffee" },
    SamplePrompt { description: "Futuristic noise-canceling headphones with neon lighting accents", url: "https://example.com/headphones" },
    SamplePrompt { description: "A luxurious anti-aging serum bottle with gold accents on a marble vanity, soft floral background", url: "https://example.com/skincare" },
    SamplePrompt { description: "A rugged, waterproof hiking boot splashing through a muddy trail, dynamic action shot", url: "https://example.com/boots" },
    SamplePrompt { description: "A smart home thermostat with a glass interface, mounted on a modern textured wall, warm ambient lighting", url: "https://example.com/thermostat" },
    SamplePrompt { description: "A vintage leather camera bag sitting on a rustic wooden table, map and compass nearby, travel aesthetic", url: "https://example.com/camerabag" },
    SamplePrompt { description: "High-performance RGB mechanical gaming keyboard glowing in a dark room, cyberpunk atmosphere", url: "https://example.com/keyboard" },
    SamplePrompt { description: "A minimalist mid-century modern velvet armchair in mustard yellow, placed in a sunlit corner with plants", url: "https://example.com/armchair" },
    SamplePrompt { description: "Professional grade Japanese Damascus steel chef knife slicing through a fresh bell pepper, high shutter speed, dramatic lighting", url: "https://example.com/knife" },
    SamplePrompt { description: "Hand-forged copper cookware set hanging in a sun-drenched Tuscan kitchen, steam rising from a pot", url: "https://example.com/cookware" },
];
