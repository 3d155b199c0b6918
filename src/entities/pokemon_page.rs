// SPDX-License-Identifier: GPL-3.0-only

use serde::Deserialize;

/// A `{ name, url }` pointer as returned by the PokéAPI list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One page of the `/pokemon/` listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PokemonPage {
    #[serde(default)]
    pub count: i64,
    /// Cursor to the following page, `None` on the last one
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_listing_body() {
        let body = r#"{
            "count": 1302,
            "next": "https://pokeapi.co/api/v2/pokemon/?offset=2&limit=2",
            "previous": null,
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
            ]
        }"#;

        let page: PokemonPage = serde_json::from_str(body).unwrap();

        assert_eq!(page.count, 1302);
        assert_eq!(
            page.next.as_deref(),
            Some("https://pokeapi.co/api/v2/pokemon/?offset=2&limit=2")
        );
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[1].name, "ivysaur");
    }

    #[test]
    fn last_page_has_no_cursor() {
        let body = r#"{"count": 1, "next": null, "previous": "x", "results": []}"#;
        let page: PokemonPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.next, None);
    }
}
