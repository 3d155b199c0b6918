// SPDX-License-Identifier: GPL-3.0-only

use cosmic::iced::Color;

/// Represents one of the Pokémon types and the colour its badge is painted with
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub struct PokemonType {
    pub name: &'static str,
    rgb: (u8, u8, u8),
}

const FALLBACK_RGB: (u8, u8, u8) = (0x68, 0xA0, 0x90);

const ALL_TYPES: [PokemonType; 18] = [
    PokemonType::new("normal", (0xA8, 0xA8, 0x78)),
    PokemonType::new("fire", (0xF0, 0x80, 0x30)),
    PokemonType::new("water", (0x68, 0x90, 0xF0)),
    PokemonType::new("electric", (0xF8, 0xD0, 0x30)),
    PokemonType::new("grass", (0x78, 0xC8, 0x50)),
    PokemonType::new("ice", (0x98, 0xD8, 0xD8)),
    PokemonType::new("fighting", (0xC0, 0x30, 0x28)),
    PokemonType::new("poison", (0xA0, 0x40, 0xA0)),
    PokemonType::new("ground", (0xE0, 0xC0, 0x68)),
    PokemonType::new("flying", (0xA8, 0x90, 0xF0)),
    PokemonType::new("psychic", (0xF8, 0x58, 0x88)),
    PokemonType::new("bug", (0xA8, 0xB8, 0x20)),
    PokemonType::new("rock", (0xB8, 0xA0, 0x38)),
    PokemonType::new("ghost", (0x70, 0x58, 0x98)),
    PokemonType::new("dragon", (0x70, 0x38, 0xF8)),
    PokemonType::new("dark", (0x70, 0x58, 0x48)),
    PokemonType::new("steel", (0xB8, 0xB8, 0xD0)),
    PokemonType::new("fairy", (0xEE, 0x99, 0xAC)),
];

impl PokemonType {
    const fn new(name: &'static str, rgb: (u8, u8, u8)) -> Self {
        Self { name, rgb }
    }

    pub fn get_all() -> &'static [PokemonType] {
        &ALL_TYPES
    }

    /// Looks a type up by its PokéAPI name
    pub fn from_name(name: &str) -> Option<PokemonType> {
        ALL_TYPES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .copied()
    }

    pub fn color(&self) -> Color {
        let (r, g, b) = self.rgb;
        Color::from_rgb8(r, g, b)
    }

    /// Badge colour for a type name, unknown types get a neutral fallback
    pub fn color_for(name: &str) -> Color {
        Self::from_name(name)
            .map(|t| t.color())
            .unwrap_or_else(Self::fallback_color)
    }

    pub fn fallback_color() -> Color {
        let (r, g, b) = FALLBACK_RGB;
        Color::from_rgb8(r, g, b)
    }
}
