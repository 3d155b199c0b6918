// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Debug;

use serde::Deserialize;

use super::NamedResource;

/// Full record served by `/pokemon/{id}/`, only the fields we display are kept
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct PokemonDetail {
    pub id: i64,
    pub name: String,
    /// Decimetres
    pub height: i64,
    /// Hectograms
    pub weight: i64,
    #[serde(default)]
    pub sprites: PokemonSprites,
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    pub abilities: Vec<PokemonAbility>,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
}

impl Debug for PokemonDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokemonDetail")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PokemonSprites {
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PokemonTypeSlot {
    #[serde(default)]
    pub slot: i64,
    #[serde(rename = "type")]
    pub type_: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PokemonAbility {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub slot: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PokemonStat {
    pub base_stat: i64,
    #[serde(default)]
    pub effort: i64,
    pub stat: NamedResource,
}
