// SPDX-License-Identifier: GPL-3.0-only

use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod core;
mod entities;
mod flags;
mod i18n;

fn main() -> cosmic::iced::Result {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dexgrid=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    // Settings for configuring the application window and iced runtime.
    let settings = core::settings::get_app_settings();

    // Starts the application's event loop with the loaded configuration as flags.
    cosmic::app::run::<app::AppModel>(settings, flags::flags())
}
