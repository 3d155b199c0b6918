// SPDX-License-Identifier: GPL-3.0-only

//! Turns PokéAPI values into the strings and proportions the views paint.

/// Highest base stat a Pokémon can have, a full stat bar
pub const MAX_BASE_STAT: i64 = 255;

/// Transforms a kebab-case string into a space-separated string where each word starts with an uppercase letter.
pub fn capitalize_string(input: &str) -> String {
    input
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first_char) => first_char.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Upper-cased label with dashes turned into spaces, as used for stats and abilities
pub fn shout_label(input: &str) -> String {
    input.replace('-', " ").to_uppercase()
}

/// `25` -> `025`
pub fn dex_number(id: i64) -> String {
    format!("{id:03}")
}

/// PokéAPI heights and weights come in tenths (decimetres, hectograms)
pub fn scale_numbers(num: i64) -> f64 {
    (num as f64) / 10.0
}

/// One decimal place, `69` -> `6.9`
pub fn format_tenths(num: i64) -> String {
    format!("{:.1}", scale_numbers(num))
}

/// Share of the stat bar a base stat fills, between `0.0` and `1.0`
pub fn stat_bar_fraction(base_stat: i64) -> f32 {
    (base_stat as f32 / MAX_BASE_STAT as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn capitalizes_kebab_case() {
        assert_eq!(capitalize_string("pikachu"), "Pikachu");
        assert_eq!(capitalize_string("mr-mime"), "Mr Mime");
        assert_eq!(capitalize_string(""), "");
    }

    #[test]
    fn shouts_stat_names() {
        assert_eq!(shout_label("special-attack"), "SPECIAL ATTACK");
        assert_eq!(shout_label("hp"), "HP");
    }

    #[test]
    fn pads_dex_numbers() {
        assert_eq!(dex_number(1), "001");
        assert_eq!(dex_number(25), "025");
        assert_eq!(dex_number(1025), "1025");
    }

    #[test]
    fn scales_tenths() {
        assert_eq!(format_tenths(4), "0.4");
        assert_eq!(format_tenths(60), "6.0");
        assert_eq!(format_tenths(9999), "999.9");
    }

    #[test]
    fn stat_bar_is_clamped() {
        assert_eq!(stat_bar_fraction(255), 1.0);
        assert_eq!(stat_bar_fraction(0), 0.0);
        assert_eq!(stat_bar_fraction(300), 1.0);
        assert_eq!(stat_bar_fraction(-5), 0.0);
        assert!((stat_bar_fraction(51) - 0.2).abs() < f32::EPSILON);
    }
}
