// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Debug;

use super::PokemonDetail;

/// Simple owned data structure, for displaying the Pokémon in the grid (main page)
#[derive(Clone, PartialEq, Eq)]
pub struct PokemonInfo {
    pub id: i64,
    pub name: String,
    pub sprite_url: Option<String>,
    /// Detail URL of the summary reference this entry was built from
    pub url: String,
}

impl PokemonInfo {
    /// Projects a detail record into a grid entry
    pub fn from_detail(detail: &PokemonDetail, url: impl Into<String>) -> Self {
        Self {
            id: detail.id,
            name: detail.name.clone(),
            sprite_url: detail.sprites.front_default.clone(),
            url: url.into(),
        }
    }
}

impl Debug for PokemonInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokemonInfo").field("id", &self.id).finish()
    }
}
