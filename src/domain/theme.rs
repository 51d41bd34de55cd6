//! Appearance settings and the CSS palette they resolve to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Clair,
    Sombre,
    Automatique,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Clair => "Clair",
            Theme::Sombre => "Sombre",
            Theme::Automatique => "Automatique",
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Clair" => Ok(Theme::Clair),
            "Sombre" => Ok(Theme::Sombre),
            "Automatique" => Ok(Theme::Automatique),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryColor {
    #[default]
    Blue,
    Green,
    Purple,
    Red,
}

impl PrimaryColor {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimaryColor::Blue => "blue",
            PrimaryColor::Green => "green",
            PrimaryColor::Purple => "purple",
            PrimaryColor::Red => "red",
        }
    }

    /// `(primary, primary-dark)` CSS colors.
    fn css(self) -> (&'static str, &'static str) {
        match self {
            PrimaryColor::Blue => ("#3b82f6", "#2563eb"),
            PrimaryColor::Green => ("#10b981", "#059669"),
            PrimaryColor::Purple => ("#8b5cf6", "#7c3aed"),
            PrimaryColor::Red => ("#ef4444", "#dc2626"),
        }
    }
}

impl FromStr for PrimaryColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blue" => Ok(PrimaryColor::Blue),
            "green" => Ok(PrimaryColor::Green),
            "purple" => Ok(PrimaryColor::Purple),
            "red" => Ok(PrimaryColor::Red),
            _ => Err(()),
        }
    }
}

/// Values a client applies as `--color-primary` / `--color-primary-dark`
/// plus the `dark` class toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub primary: &'static str,
    pub primary_dark: &'static str,
    pub dark: bool,
}

impl Palette {
    pub fn new(theme: Theme, color: PrimaryColor) -> Self {
        let (primary, primary_dark) = color.css();
        Palette {
            primary,
            primary_dark,
            // "Automatique" is left to the client's media query
            dark: theme == Theme::Sombre,
        }
    }

    /// Resolves stored column values; unknown ones fall back to the defaults.
    pub fn from_stored(theme: &str, color: &str) -> Self {
        Palette::new(
            theme.parse().unwrap_or_default(),
            color.parse().unwrap_or_default(),
        )
    }
}
