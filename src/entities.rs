// SPDX-License-Identifier: GPL-3.0-only

mod pokemon_detail;
mod pokemon_info;
mod pokemon_page;
mod pokemon_type;

pub use pokemon_detail::{PokemonDetail, PokemonSprites};
pub use pokemon_info::PokemonInfo;
pub use pokemon_page::{NamedResource, PokemonPage};
pub use pokemon_type::PokemonType;
