// SPDX-License-Identifier: GPL-3.0-only

use std::ops::Range;

use crate::{
    core::api::{NetworkError, PokemonRef, PokemonSource},
    entities::{PokemonDetail, PokemonInfo},
};

/// Identifies one in-flight request, results carrying an outdated id are dropped
pub type RequestId = u64;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// State of one loading channel (initial page, next page or detail)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading(RequestId),
    Loaded,
    Failed(NetworkError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading(_))
    }

    fn is_current(&self, request: RequestId) -> bool {
        *self == LoadState::Loading(request)
    }
}

/// Where a page load starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    First { offset: u32, limit: u32 },
    Next(String),
}

/// Handed out when a page load is allowed to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub id: RequestId,
    pub request: PageRequest,
}

/// Handed out when a detail load starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    pub id: RequestId,
    pub pokemon_id: i64,
}

/// A fully enriched page, ready to be merged into the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    pub items: Vec<PokemonInfo>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was merged, `added` are the indexes of the new entries
    Applied { added: Range<usize> },
    Failed(NetworkError),
    /// The request was superseded before it resolved
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Opened,
    Failed(NetworkError),
    Stale,
}

/// Fetches one page of references and the detail record behind every one of them.
///
/// The detail fetches run concurrently and the page only succeeds if all of them do,
/// a single failure discards the whole page. Items keep the order the server listed them in.
pub async fn fetch_page<S: PokemonSource>(
    source: &S,
    request: &PageRequest,
) -> Result<LoadedPage, NetworkError> {
    let page = match request {
        PageRequest::First { offset, limit } => source.list_page(*offset, *limit).await?,
        PageRequest::Next(cursor) => source.follow_page(cursor).await?,
    };

    let items = futures::future::try_join_all(page.results.iter().map(|entry| async move {
        let detail = source
            .fetch_detail(&PokemonRef::Url(entry.url.clone()))
            .await?;
        Ok::<_, NetworkError>(PokemonInfo::from_detail(&detail, entry.url.as_str()))
    }))
    .await?;

    Ok(LoadedPage {
        items,
        next: page.next,
    })
}

/// Fetches the full record shown in the details drawer
pub async fn fetch_detail<S: PokemonSource>(
    source: &S,
    ticket: DetailTicket,
) -> Result<PokemonDetail, NetworkError> {
    source
        .fetch_detail(&PokemonRef::Id(ticket.pokemon_id))
        .await
}

/// Accumulated list, pagination cursor and the three loading channels of a session
#[derive(Debug, Default)]
pub struct Pokedex {
    pokemon: Vec<PokemonInfo>,
    cursor: Option<String>,
    page_size: u32,
    initial: LoadState,
    more: LoadState,
    detail: LoadState,
    selected: Option<PokemonDetail>,
    /// Set once a first page has been applied, survives failed reloads
    page_loaded: bool,
    last_request: RequestId,
}

impl Pokedex {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Default::default()
        }
    }

    fn next_request_id(&mut self) -> RequestId {
        self.last_request += 1;
        self.last_request
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
    }

    /// Starts (or restarts) the session from the first page.
    /// Refused while a first page is already on its way; any load-more in flight is abandoned.
    pub fn begin_initial_load(&mut self) -> Option<PageTicket> {
        if self.initial.is_loading() {
            return None;
        }

        let id = self.next_request_id();
        self.initial = LoadState::Loading(id);
        self.more = LoadState::Idle;

        Some(PageTicket {
            id,
            request: PageRequest::First {
                offset: 0,
                limit: self.page_size,
            },
        })
    }

    /// Starts loading the page behind the cursor, if there is one and nothing else is loading it
    pub fn begin_load_more(&mut self) -> Option<PageTicket> {
        if !self.can_load_more() {
            return None;
        }

        let cursor = self.cursor.clone()?;
        let id = self.next_request_id();
        self.more = LoadState::Loading(id);

        Some(PageTicket {
            id,
            request: PageRequest::Next(cursor),
        })
    }

    /// Merges the result of a page load. Failures leave the list and cursor untouched.
    pub fn finish_page(
        &mut self,
        request: RequestId,
        result: Result<LoadedPage, NetworkError>,
    ) -> PageOutcome {
        let replace = if self.initial.is_current(request) {
            true
        } else if self.more.is_current(request) {
            false
        } else {
            tracing::debug!(request, "dropping superseded page result");
            return PageOutcome::Stale;
        };

        let channel = if replace {
            &mut self.initial
        } else {
            &mut self.more
        };

        match result {
            Ok(page) => {
                *channel = LoadState::Loaded;

                if replace {
                    self.pokemon.clear();
                    self.page_loaded = true;
                }
                let start = self.pokemon.len();
                self.pokemon.extend(page.items);
                self.cursor = page.next;

                tracing::info!(
                    request,
                    added = self.pokemon.len() - start,
                    total = self.pokemon.len(),
                    "page applied"
                );

                PageOutcome::Applied {
                    added: start..self.pokemon.len(),
                }
            }
            Err(err) => {
                tracing::warn!(request, "page load failed: {err}");
                *channel = LoadState::Failed(err.clone());
                PageOutcome::Failed(err)
            }
        }
    }

    /// Starts loading the full record of `pokemon_id`, superseding any earlier selection
    pub fn select(&mut self, pokemon_id: i64) -> DetailTicket {
        let id = self.next_request_id();
        self.detail = LoadState::Loading(id);

        DetailTicket { id, pokemon_id }
    }

    pub fn finish_detail(
        &mut self,
        request: RequestId,
        result: Result<PokemonDetail, NetworkError>,
    ) -> DetailOutcome {
        if !self.detail.is_current(request) {
            tracing::debug!(request, "dropping superseded detail result");
            return DetailOutcome::Stale;
        }

        match result {
            Ok(detail) => {
                self.detail = LoadState::Loaded;
                self.selected = Some(detail);
                DetailOutcome::Opened
            }
            Err(err) => {
                self.detail = LoadState::Failed(err.clone());
                DetailOutcome::Failed(err)
            }
        }
    }

    /// Closes the details and forgets the record. A detail request still in flight is cancelled.
    pub fn close_detail(&mut self) {
        self.selected = None;
        self.detail = LoadState::Idle;
    }

    pub fn pokemon(&self) -> &[PokemonInfo] {
        &self.pokemon
    }

    pub fn len(&self) -> usize {
        self.pokemon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pokemon.is_empty()
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// A page has been loaded and the server pointed at another one
    pub fn has_more(&self) -> bool {
        self.page_loaded && self.cursor.is_some()
    }

    /// There is a next page and no page load of any kind is running
    pub fn can_load_more(&self) -> bool {
        self.has_more() && !self.more.is_loading() && !self.initial.is_loading()
    }

    /// A page has been loaded and it was the last one
    pub fn is_end_of_list(&self) -> bool {
        self.page_loaded && self.cursor.is_none()
    }

    pub fn initial_state(&self) -> &LoadState {
        &self.initial
    }

    pub fn is_loading_initial(&self) -> bool {
        self.initial.is_loading()
    }

    pub fn is_loading_more(&self) -> bool {
        self.more.is_loading()
    }

    pub fn is_loading_detail(&self) -> bool {
        self.detail.is_loading()
    }

    pub fn selected(&self) -> Option<&PokemonDetail> {
        self.selected.as_ref()
    }

    pub fn is_detail_open(&self) -> bool {
        self.selected.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashMap, HashSet},
        sync::{Arc, Mutex},
    };

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::entities::{NamedResource, PokemonPage, PokemonSprites};

    const BASE: &str = "https://pokeapi.test/api/v2";

    fn detail_url(id: i64) -> String {
        format!("{BASE}/pokemon/{id}/")
    }

    fn detail(id: i64) -> PokemonDetail {
        PokemonDetail {
            id,
            name: format!("pokemon-{id}"),
            height: 7,
            weight: 69,
            sprites: PokemonSprites {
                front_default: Some(format!("https://sprites.test/{id}.png")),
            },
            types: Vec::new(),
            abilities: Vec::new(),
            stats: Vec::new(),
        }
    }

    fn page(ids: Range<i64>, next: Option<&str>) -> PokemonPage {
        PokemonPage {
            count: 1302,
            next: next.map(str::to_string),
            previous: None,
            results: ids
                .map(|id| NamedResource {
                    name: format!("pokemon-{id}"),
                    url: detail_url(id),
                })
                .collect(),
        }
    }

    #[derive(Clone, Default)]
    struct FakeSource {
        first: Option<PokemonPage>,
        pages: HashMap<String, PokemonPage>,
        failing: HashSet<String>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl FakeSource {
        fn record(&self, url: &str) {
            self.requested.lock().unwrap().push(url.to_string());
        }

        fn failure(url: &str) -> NetworkError {
            NetworkError::Status {
                url: url.to_string(),
                status: 500,
            }
        }
    }

    impl PokemonSource for FakeSource {
        async fn list_page(&self, offset: u32, limit: u32) -> Result<PokemonPage, NetworkError> {
            let url = format!("{BASE}/pokemon/?offset={offset}&limit={limit}");
            self.record(&url);
            self.first.clone().ok_or_else(|| Self::failure(&url))
        }

        async fn follow_page(&self, cursor: &str) -> Result<PokemonPage, NetworkError> {
            self.record(cursor);
            self.pages
                .get(cursor)
                .cloned()
                .ok_or_else(|| Self::failure(cursor))
        }

        async fn fetch_detail(
            &self,
            reference: &PokemonRef,
        ) -> Result<PokemonDetail, NetworkError> {
            let url = match reference {
                PokemonRef::Id(id) => detail_url(*id),
                PokemonRef::Url(url) => url.clone(),
            };
            self.record(&url);

            if self.failing.contains(&url) {
                return Err(Self::failure(&url));
            }

            let id = url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .and_then(|id| id.parse().ok())
                .ok_or_else(|| Self::failure(&url))?;
            Ok(detail(id))
        }
    }

    fn loaded(ids: Range<i64>, next: Option<&str>) -> LoadedPage {
        LoadedPage {
            items: ids
                .map(|id| PokemonInfo::from_detail(&detail(id), detail_url(id)))
                .collect(),
            next: next.map(str::to_string),
        }
    }

    /// A pokedex with a first page of `ids` applied
    fn pokedex_with(ids: Range<i64>, next: Option<&str>) -> Pokedex {
        let mut pokedex = Pokedex::new(DEFAULT_PAGE_SIZE);
        let ticket = pokedex.begin_initial_load().unwrap();
        pokedex.finish_page(ticket.id, Ok(loaded(ids, next)));
        pokedex
    }

    #[tokio::test]
    async fn first_page_is_enriched_in_server_order() {
        let source = FakeSource {
            first: Some(page(1..21, Some("cursor-2"))),
            ..Default::default()
        };
        let mut pokedex = Pokedex::new(DEFAULT_PAGE_SIZE);

        let ticket = pokedex.begin_initial_load().unwrap();
        assert_eq!(
            ticket.request,
            PageRequest::First {
                offset: 0,
                limit: 20
            }
        );
        assert!(pokedex.is_loading_initial());

        let result = fetch_page(&source, &ticket.request).await;
        let outcome = pokedex.finish_page(ticket.id, result);

        assert_eq!(outcome, PageOutcome::Applied { added: 0..20 });
        assert_eq!(pokedex.len(), 20);
        assert_eq!(
            pokedex.pokemon().iter().map(|p| p.id).collect::<Vec<_>>(),
            (1..21).collect::<Vec<_>>()
        );
        assert_eq!(pokedex.pokemon()[0].url, detail_url(1));
        assert_eq!(
            pokedex.pokemon()[0].sprite_url.as_deref(),
            Some("https://sprites.test/1.png")
        );
        assert_eq!(pokedex.cursor(), Some("cursor-2"));
        assert!(pokedex.has_more());
        assert!(!pokedex.is_loading_initial());
        // one listing request and twenty detail requests
        assert_eq!(source.requested.lock().unwrap().len(), 21);
    }

    #[tokio::test]
    async fn load_more_appends_the_next_page() {
        let source = FakeSource {
            pages: HashMap::from([("cursor-2".to_string(), page(21..41, Some("cursor-3")))]),
            ..Default::default()
        };
        let mut pokedex = pokedex_with(1..21, Some("cursor-2"));

        let ticket = pokedex.begin_load_more().unwrap();
        assert_eq!(ticket.request, PageRequest::Next("cursor-2".to_string()));
        assert!(pokedex.is_loading_more());

        let result = fetch_page(&source, &ticket.request).await;
        let outcome = pokedex.finish_page(ticket.id, result);

        assert_eq!(outcome, PageOutcome::Applied { added: 20..40 });
        assert_eq!(pokedex.len(), 40);
        assert_eq!(pokedex.pokemon()[20].id, 21);
        assert_eq!(pokedex.cursor(), Some("cursor-3"));
        assert!(!pokedex.is_loading_more());
    }

    #[tokio::test]
    async fn one_failing_detail_fails_the_whole_page() {
        let mut failing = HashSet::new();
        failing.insert(detail_url(33));
        let source = FakeSource {
            pages: HashMap::from([("cursor-2".to_string(), page(21..41, None))]),
            failing,
            ..Default::default()
        };
        let mut pokedex = pokedex_with(1..21, Some("cursor-2"));

        let ticket = pokedex.begin_load_more().unwrap();
        let result = fetch_page(&source, &ticket.request).await;
        assert!(result.is_err());

        let outcome = pokedex.finish_page(ticket.id, result);

        assert!(matches!(outcome, PageOutcome::Failed(_)));
        assert_eq!(pokedex.len(), 20);
        assert_eq!(pokedex.cursor(), Some("cursor-2"));
        assert!(!pokedex.is_loading_more());
        // the cursor is still there, the user can try again
        assert!(pokedex.begin_load_more().is_some());
    }

    #[tokio::test]
    async fn failing_listing_leaves_an_empty_session() {
        let source = FakeSource::default();
        let mut pokedex = Pokedex::new(DEFAULT_PAGE_SIZE);

        let ticket = pokedex.begin_initial_load().unwrap();
        let result = fetch_page(&source, &ticket.request).await;
        let outcome = pokedex.finish_page(ticket.id, result);

        assert!(matches!(outcome, PageOutcome::Failed(_)));
        assert!(pokedex.is_empty());
        assert!(matches!(pokedex.initial_state(), LoadState::Failed(_)));
        assert!(!pokedex.has_more());
        assert!(!pokedex.is_end_of_list());
        assert!(pokedex.begin_load_more().is_none());
        // retrying is allowed
        assert!(pokedex.begin_initial_load().is_some());
    }

    #[test]
    fn list_length_never_decreases_across_loads() {
        let mut pokedex = pokedex_with(1..21, Some("c2"));
        let mut previous = pokedex.len();

        for (n, next) in [(2, Some("c3")), (3, Some("c4")), (4, None)] {
            let ticket = pokedex.begin_load_more().unwrap();
            let start = (n - 1) * 20 + 1;
            pokedex.finish_page(ticket.id, Ok(loaded(start..start + 20, next)));

            assert_eq!(pokedex.len(), previous + 20);
            previous = pokedex.len();
        }

        assert_eq!(pokedex.len(), 80);
    }

    #[test]
    fn null_cursor_ends_the_list() {
        let mut pokedex = pokedex_with(1..11, None);

        assert!(pokedex.is_end_of_list());
        assert!(!pokedex.has_more());
        assert_eq!(pokedex.begin_load_more(), None);
        assert!(!pokedex.is_loading_more());
        assert_eq!(pokedex.len(), 10);
    }

    #[test]
    fn load_more_is_not_started_twice() {
        let mut pokedex = pokedex_with(1..21, Some("c2"));

        let first = pokedex.begin_load_more();
        let second = pokedex.begin_load_more();

        assert!(first.is_some());
        assert_eq!(second, None);
    }

    #[test]
    fn load_more_waits_for_the_first_page() {
        let mut pokedex = Pokedex::new(DEFAULT_PAGE_SIZE);
        assert_eq!(pokedex.begin_load_more(), None);

        pokedex.begin_initial_load().unwrap();
        assert_eq!(pokedex.begin_initial_load(), None);
        assert_eq!(pokedex.begin_load_more(), None);
    }

    #[test]
    fn duplicate_ids_across_pages_are_kept() {
        let mut pokedex = pokedex_with(1..21, Some("c2"));

        let ticket = pokedex.begin_load_more().unwrap();
        pokedex.finish_page(ticket.id, Ok(loaded(15..35, None)));

        assert_eq!(pokedex.len(), 40);
        assert_eq!(pokedex.pokemon().iter().filter(|p| p.id == 15).count(), 2);
    }

    #[test]
    fn reload_replaces_the_list_and_drops_pending_load_more() {
        let mut pokedex = pokedex_with(1..21, Some("c2"));
        let more = pokedex.begin_load_more().unwrap();

        let reload = pokedex.begin_initial_load().unwrap();
        assert!(!pokedex.is_loading_more());

        assert_eq!(
            pokedex.finish_page(more.id, Ok(loaded(21..41, Some("c3")))),
            PageOutcome::Stale
        );
        assert_eq!(
            pokedex.finish_page(reload.id, Ok(loaded(1..6, Some("c2")))),
            PageOutcome::Applied { added: 0..5 }
        );
        assert_eq!(pokedex.len(), 5);
    }

    #[test]
    fn load_more_is_unavailable_while_reloading() {
        let mut pokedex = pokedex_with(1..21, Some("c2"));
        assert!(pokedex.can_load_more());

        let reload = pokedex.begin_initial_load().unwrap();

        assert!(pokedex.has_more());
        assert!(!pokedex.is_loading_more());
        assert!(!pokedex.can_load_more());
        assert_eq!(pokedex.begin_load_more(), None);

        pokedex.finish_page(reload.id, Ok(loaded(1..21, Some("c2"))));
        assert!(pokedex.can_load_more());
    }

    #[tokio::test]
    async fn selecting_fetches_canonical_detail_and_opens_it() {
        let source = FakeSource::default();
        let mut pokedex = pokedex_with(1..21, None);

        let ticket = pokedex.select(25);
        assert!(pokedex.is_loading_detail());
        assert!(!pokedex.is_detail_open());

        let result = fetch_detail(&source, ticket).await;
        let outcome = pokedex.finish_detail(ticket.id, result);

        assert_eq!(outcome, DetailOutcome::Opened);
        assert_eq!(
            source.requested.lock().unwrap().as_slice(),
            &[detail_url(25)]
        );
        assert!(pokedex.is_detail_open());
        assert_eq!(pokedex.selected().map(|d| d.id), Some(25));
        assert!(!pokedex.is_loading_detail());
    }

    #[tokio::test]
    async fn failed_detail_keeps_the_drawer_closed() {
        let mut failing = HashSet::new();
        failing.insert(detail_url(25));
        let source = FakeSource {
            failing,
            ..Default::default()
        };
        let mut pokedex = pokedex_with(1..21, None);

        let ticket = pokedex.select(25);
        let result = fetch_detail(&source, ticket).await;
        let outcome = pokedex.finish_detail(ticket.id, result);

        assert!(matches!(outcome, DetailOutcome::Failed(_)));
        assert!(!pokedex.is_detail_open());
        assert!(!pokedex.is_loading_detail());
        assert_eq!(pokedex.len(), 20);
    }

    #[test]
    fn closing_cancels_a_pending_detail() {
        let mut pokedex = pokedex_with(1..21, None);
        let ticket = pokedex.select(4);

        pokedex.close_detail();
        let outcome = pokedex.finish_detail(ticket.id, Ok(detail(4)));

        assert_eq!(outcome, DetailOutcome::Stale);
        assert!(!pokedex.is_detail_open());
        assert_eq!(pokedex.selected(), None);
    }

    #[test]
    fn newer_selection_wins() {
        let mut pokedex = pokedex_with(1..21, None);
        let older = pokedex.select(1);
        let newer = pokedex.select(2);

        assert_eq!(
            pokedex.finish_detail(newer.id, Ok(detail(2))),
            DetailOutcome::Opened
        );
        assert_eq!(
            pokedex.finish_detail(older.id, Ok(detail(1))),
            DetailOutcome::Stale
        );
        assert_eq!(pokedex.selected().map(|d| d.id), Some(2));
    }

    #[test]
    fn closing_forgets_the_record() {
        let mut pokedex = pokedex_with(1..21, None);
        let ticket = pokedex.select(7);
        pokedex.finish_detail(ticket.id, Ok(detail(7)));

        pokedex.close_detail();

        assert!(!pokedex.is_detail_open());
        assert_eq!(pokedex.selected(), None);
        // the list entry is untouched by the detail fetch
        assert_eq!(pokedex.pokemon()[6], PokemonInfo::from_detail(&detail(7), detail_url(7)));
    }
}
