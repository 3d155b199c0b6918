// SPDX-License-Identifier: GPL-3.0-only

use cosmic::{
    cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry},
    theme,
};
use serde::{Deserialize, Serialize};

use crate::{app::AppModel, core::pokedex::DEFAULT_PAGE_SIZE};

pub const CONFIG_VERSION: u64 = 1;

#[derive(Debug, Clone, CosmicConfigEntry, Eq, PartialEq)]
#[version = 1]
pub struct DexConfig {
    pub app_theme: AppTheme,
    pub pokemon_per_row: usize,
    /// References requested per page
    pub page_size: u32,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            app_theme: Default::default(),
            pokemon_per_row: 2,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DexConfig {
    pub fn config_handler() -> Option<cosmic_config::Config> {
        use cosmic::Application;

        match cosmic_config::Config::new(AppModel::APP_ID, CONFIG_VERSION) {
            Ok(handler) => Some(handler),
            Err(err) => {
                tracing::error!("failed to open the config: {err}");
                None
            }
        }
    }

    pub fn config() -> DexConfig {
        match Self::config_handler() {
            Some(handler) => DexConfig::get_entry(&handler).unwrap_or_else(|(errs, config)| {
                for err in errs {
                    tracing::warn!("failed to read config entry: {err}");
                }
                config
            }),
            None => DexConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum AppTheme {
    Dark,
    Light,
    #[default]
    System,
}

impl AppTheme {
    pub fn theme(&self) -> theme::Theme {
        match self {
            Self::Dark => theme::Theme::dark(),
            Self::Light => theme::Theme::light(),
            Self::System => theme::system_preference(),
        }
    }

    /// Position in the settings dropdown
    pub fn index(&self) -> usize {
        match self {
            Self::System => 0,
            Self::Dark => 1,
            Self::Light => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Dark,
            2 => Self::Light,
            _ => Self::System,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_to_two_columns_of_twenty() {
        let config = DexConfig::default();
        assert_eq!(config.pokemon_per_row, 2);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.app_theme, AppTheme::System);
    }

    #[test]
    fn theme_index_round_trips() {
        for theme in [AppTheme::System, AppTheme::Dark, AppTheme::Light] {
            assert_eq!(AppTheme::from_index(theme.index()), theme);
        }
        assert_eq!(AppTheme::from_index(42), AppTheme::System);
    }
}
