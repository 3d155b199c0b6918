// SPDX-License-Identifier: GPL-3.0-only

use cosmic::{
    app::Settings,
    iced::{Limits, Size},
};

/// Window settings the application is started with
pub fn get_app_settings() -> Settings {
    Settings::default()
        .size_limits(Limits::NONE.min_width(420.0).min_height(360.0))
        .size(Size::new(720.0, 860.0))
        .debug(false)
}
