//! Theme palettes used by local renderers.
//!
//! The theme table is closed. Unknown names fall back to [`Theme::Default`]
//! instead of failing.

use serde::{Deserialize, Serialize};

/// Mermaid theme identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Mermaid's default light theme.
    #[default]
    Default,
    /// Dark background theme.
    Dark,
    /// Green "forest" theme.
    Forest,
    /// Greyscale theme.
    Neutral,
}

/// The four colour roles a local renderer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    /// Node fill colour.
    pub node_fill: &'static str,
    /// Node border colour.
    pub node_stroke: &'static str,
    /// Edge/arrow colour.
    pub edge: &'static str,
    /// Label text colour.
    pub text: &'static str,
}

const DEFAULT_PALETTE: ThemePalette = ThemePalette {
    node_fill: "#ECECFF",
    node_stroke: "#9370DB",
    edge: "#333333",
    text: "#333333",
};

const DARK_PALETTE: ThemePalette = ThemePalette {
    node_fill: "#1F2020",
    node_stroke: "#81B1DB",
    edge: "#D3D3D3",
    text: "#E0E0E0",
};

const FOREST_PALETTE: ThemePalette = ThemePalette {
    node_fill: "#CDE498",
    node_stroke: "#13540C",
    edge: "#008000",
    text: "#000000",
};

const NEUTRAL_PALETTE: ThemePalette = ThemePalette {
    node_fill: "#EEEEEE",
    node_stroke: "#999999",
    edge: "#666666",
    text: "#333333",
};

impl Theme {
    /// All known themes.
    pub const ALL: [Theme; 4] = [Theme::Default, Theme::Dark, Theme::Forest, Theme::Neutral];

    /// Resolve a theme by name, falling back to [`Theme::Default`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::Dark,
            "forest" => Self::Forest,
            "neutral" => Self::Neutral,
            "default" => Self::Default,
            other => {
                tracing::debug!("Unknown theme {other:?}, using default palette");
                Self::Default
            }
        }
    }

    /// The Mermaid name of this theme.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Forest => "forest",
            Self::Neutral => "neutral",
        }
    }

    /// Colour palette for this theme.
    #[must_use]
    pub const fn palette(self) -> &'static ThemePalette {
        match self {
            Self::Default => &DEFAULT_PALETTE,
            Self::Dark => &DARK_PALETTE,
            Self::Forest => &FOREST_PALETTE,
            Self::Neutral => &NEUTRAL_PALETTE,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
