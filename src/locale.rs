//! Fixed Spanish display tables for type and stat slugs.

use ratatui::style::Color;

/// Locale slug requested from the API for descriptions.
pub const DEFAULT_LOCALE: &str = "es";

/// Shown for an ability whose description is missing or failed to load.
pub const ABILITY_PLACEHOLDER: &str = "Descripción no disponible";

/// Every filterable type slug, in cycle order.
pub const TYPE_FILTERS: [&str; 18] = [
    "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison", "ground",
    "flying", "psychic", "bug", "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

/// Spanish label for a type slug. Unknown slugs pass through unchanged.
pub fn type_label(slug: &str) -> &str {
    match slug {
        "normal" => "Normal",
        "fire" => "Fuego",
        "water" => "Agua",
        "electric" => "Eléctrico",
        "grass" => "Planta",
        "ice" => "Hielo",
        "fighting" => "Lucha",
        "poison" => "Veneno",
        "ground" => "Tierra",
        "flying" => "Volador",
        "psychic" => "Psíquico",
        "bug" => "Bicho",
        "rock" => "Roca",
        "ghost" => "Fantasma",
        "dragon" => "Dragón",
        "dark" => "Siniestro",
        "steel" => "Acero",
        "fairy" => "Hada",
        _ => slug,
    }
}

/// Spanish label for a base-stat slug. Unknown slugs pass through unchanged.
pub fn stat_label(slug: &str) -> &str {
    match slug {
        "hp" => "PS",
        "attack" => "Ataque",
        "defense" => "Defensa",
        "special-attack" => "Ataque Esp.",
        "special-defense" => "Defensa Esp.",
        "speed" => "Velocidad",
        _ => slug,
    }
}

/// Badge color for a type slug, classic game palette.
pub fn type_color(slug: &str) -> Color {
    match slug {
        "normal" => Color::Rgb(168, 168, 120),
        "fire" => Color::Rgb(240, 128, 48),
        "water" => Color::Rgb(104, 144, 240),
        "electric" => Color::Rgb(248, 208, 48),
        "grass" => Color::Rgb(120, 200, 80),
        "ice" => Color::Rgb(152, 216, 216),
        "fighting" => Color::Rgb(192, 48, 40),
        "poison" => Color::Rgb(160, 64, 160),
        "ground" => Color::Rgb(224, 192, 104),
        "flying" => Color::Rgb(168, 144, 240),
        "psychic" => Color::Rgb(248, 88, 136),
        "bug" => Color::Rgb(168, 184, 32),
        "rock" => Color::Rgb(184, 160, 56),
        "ghost" => Color::Rgb(112, 88, 152),
        "dragon" => Color::Rgb(112, 56, 248),
        "dark" => Color::Rgb(112, 88, 72),
        "steel" => Color::Rgb(184, 184, 208),
        "fairy" => Color::Rgb(238, 153, 172),
        _ => Color::Rgb(176, 195, 207),
    }
}
