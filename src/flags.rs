// SPDX-License-Identifier: GPL-3.0-only

use cosmic::cosmic_config;

use crate::config::DexConfig;

/// Flags given to our COSMIC application to use in it's "init" function.
#[derive(Clone, Debug)]
pub struct Flags {
    pub config_handler: Option<cosmic_config::Config>,
    pub config: DexConfig,
}

pub fn flags() -> Flags {
    let (config_handler, config) = (DexConfig::config_handler(), DexConfig::config());

    Flags {
        config_handler,
        config,
    }
}
