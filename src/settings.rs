/// Overlay settings stored under `bubble_settings`
use serde::{Deserialize, Serialize};

/// Corner of the viewport the bubble is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    BottomLeft,
    #[default]
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Settings singleton shared by the background, the overlay and the popup.
///
/// Every field falls back to its default when missing, so a partial object
/// read from storage merges over the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled: bool,
    pub position: Position,
    pub size: Size,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enabled: true,
            position: Position::default(),
            size: Size::default(),
            theme: Theme::default(),
        }
    }
}

impl Position {
    pub const ALL: [Position; 2] = [Position::BottomLeft, Position::BottomRight];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::BottomLeft => "Bottom left",
            Position::BottomRight => "Bottom right",
        }
    }
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Medium, Size::Large];

    pub fn as_str(self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        }
    }
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

impl Settings {
    /// CSS classes for the overlay container, e.g. `bubble-container bottom-right light medium`
    pub fn container_class(&self) -> String {
        format!(
            "bubble-container {} {} {}",
            self.position.as_str(),
            self.theme.as_str(),
            self.size.as_str()
        )
    }
}
