//! crates/lovecraft_core/src/theme.rs
//!
//! The closed catalog of visual themes a surprise can use.

/// Presentation bundle associated with a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeStyle {
    pub name: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub primary_color: &'static str,
    pub background: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    Romantique,
    Geek,
    Fun,
    #[default]
    Classique,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Romantique, Theme::Geek, Theme::Fun, Theme::Classique];

    /// Maps a stored theme name onto the catalog. Unknown or empty names get the default theme.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "romantique" => Theme::Romantique,
            "geek" => Theme::Geek,
            "fun" => Theme::Fun,
            _ => Theme::Classique,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.style().name
    }

    pub fn style(self) -> ThemeStyle {
        match self {
            Theme::Romantique => ThemeStyle {
                name: "romantique",
                label: "Romantic",
                emoji: "💕",
                primary_color: "#e11d48",
                background: "linear-gradient(135deg, #ffe4e6 0%, #fecdd3 100%)",
            },
            Theme::Geek => ThemeStyle {
                name: "geek",
                label: "Geek",
                emoji: "🤓",
                primary_color: "#22c55e",
                background: "linear-gradient(135deg, #0f172a 0%, #1e293b 100%)",
            },
            Theme::Fun => ThemeStyle {
                name: "fun",
                label: "Fun",
                emoji: "🎉",
                primary_color: "#f59e0b",
                background: "linear-gradient(135deg, #fef3c7 0%, #fde68a 100%)",
            },
            Theme::Classique => ThemeStyle {
                name: "classique",
                label: "Classic",
                emoji: "💌",
                primary_color: "#7c3aed",
                background: "linear-gradient(135deg, #f5f3ff 0%, #ede9fe 100%)",
            },
        }
    }
}
