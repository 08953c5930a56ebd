//! Built-in course themes.
//!
//! A theme is a preference profile: the keywords a venue's category or tags
//! must mention, and how long a hop between stops may take.

use pipeline::filters::ThemeFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Stable identifier, also used in course ids and tags
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    /// Default travel budget between consecutive stops
    pub max_travel_minutes: u32,
}

impl Theme {
    /// Filter that keeps venues fitting this theme
    pub fn filter(&self) -> ThemeFilter {
        ThemeFilter::new(self.keywords)
    }
}

pub const ROMANTIC: Theme = Theme {
    name: "romantic",
    display_name: "Romantic",
    description: "Candlelit dinners, quiet cafes and a view to end the night",
    keywords: &[
        "restaurant", "wine", "bar", "cafe", "dessert", "rooftop", "view", "romantic",
    ],
    max_travel_minutes: 20,
};

pub const CULTURE: Theme = Theme {
    name: "culture",
    display_name: "Culture",
    description: "Exhibitions, films and bookshops with time to talk about them",
    keywords: &[
        "museum", "gallery", "exhibition", "theater", "cinema", "bookstore", "art", "concert",
    ],
    max_travel_minutes: 25,
};

pub const ACTIVITY: Theme = Theme {
    name: "activity",
    display_name: "Activity",
    description: "Hands-on workshops and games for an active day out",
    keywords: &[
        "activity", "workshop", "sports", "game", "escape", "bowling", "karaoke", "class",
    ],
    max_travel_minutes: 30,
};

pub const FOODIE: Theme = Theme {
    name: "foodie",
    display_name: "Foodie",
    description: "A tasting tour from bakery to dinner table",
    keywords: &[
        "restaurant", "cafe", "bakery", "dessert", "market", "food", "pub",
    ],
    max_travel_minutes: 20,
};

pub const HEALING: Theme = Theme {
    name: "healing",
    display_name: "Healing",
    description: "Slow walks, green spaces and somewhere to unwind",
    keywords: &[
        "park", "nature", "garden", "trail", "walk", "spa", "forest", "river",
    ],
    max_travel_minutes: 30,
};

/// Themes every request tries, in order
pub const PRIMARY_THEMES: [Theme; 3] = [ROMANTIC, CULTURE, ACTIVITY];

/// Themes tried only when the primaries produce too few courses
pub const FALLBACK_THEMES: [Theme; 2] = [FOODIE, HEALING];

/// Look up a theme by name, case-insensitively. `"nature"` names the
/// healing theme.
pub fn find_theme(name: &str) -> Option<Theme> {
    let name = name.trim().to_lowercase();
    let name = if name == "nature" { "healing" } else { name.as_str() };

    PRIMARY_THEMES
        .iter()
        .chain(FALLBACK_THEMES.iter())
        .find(|theme| theme.name == name)
        .copied()
}
