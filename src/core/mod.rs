// SPDX-License-Identifier: GPL-3.0-only

pub mod api;
pub mod pokedex;
pub mod settings;
