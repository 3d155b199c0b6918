// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;

use cosmic::app::context_drawer;
use cosmic::iced::alignment::{Horizontal, Vertical};
use cosmic::iced::widget::container;
use cosmic::iced::{Alignment, Background, Border, Color, Length, Subscription, Task};
use cosmic::widget::{self, about::About, menu};
use cosmic::{Application, Apply, Element, cosmic_config, cosmic_theme, theme};

use crate::app::app_menu::MenuAction;
use crate::app::context_page::ContextPage;
use crate::app::utils::presentation::{
    capitalize_string, dex_number, format_tenths, shout_label, stat_bar_fraction,
};
use crate::config::{AppTheme, DexConfig};
use crate::core::api::{NetworkError, PokeApi};
use crate::core::pokedex::{
    self, DetailOutcome, LoadState, LoadedPage, PageOutcome, PageTicket, Pokedex, RequestId,
};
use crate::entities::{PokemonDetail, PokemonInfo, PokemonType};
use crate::fl;
use crate::flags::Flags;

mod app_menu;
mod context_page;
mod utils;

const REPOSITORY: &str = "https://github.com/mariinkys/dexgrid";
const COLUMN_CHOICES: [usize; 4] = [2, 3, 4, 5];
const CARD_SPRITE_SIZE: f32 = 96.0;
const DETAIL_SPRITE_SIZE: f32 = 192.0;

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    context_page: ContextPage,
    /// The about page for this app.
    about: About,
    /// Key bindings for the application's menu bar.
    key_binds: HashMap<menu::KeyBind, MenuAction>,
    /// Configuration data that persists between application runs.
    config: DexConfig,
    /// Handler to write configuration changes
    config_handler: Option<cosmic_config::Config>,
    /// Labels of the theme dropdown
    theme_labels: Vec<String>,
    /// Labels of the Pokémon per row dropdown
    column_labels: Vec<String>,
    /// PokéAPI client
    api: PokeApi,
    /// Accumulated list, cursor and loading states
    pokedex: Pokedex,
    /// Downloaded sprites, by Pokémon id
    sprites: HashMap<i64, widget::image::Handle>,
    /// Error shown in a dialog, if any
    notice: Option<Notice>,
}

/// A failure the user has to acknowledge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The first page could not be loaded, it can be retried
    FirstPageFailed,
    /// A following page could not be loaded
    NextPageFailed,
    /// The details of a Pokémon could not be loaded
    DetailsFailed,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    LaunchUrl(String),
    ToggleContextPage(ContextPage),
    MenuAction(MenuAction),
    UpdateConfig(DexConfig),
    UpdateTheme(usize),
    UpdatePokemonPerRow(usize),

    Reload,
    LoadMore,
    PageLoaded(RequestId, Result<LoadedPage, NetworkError>),
    SpriteLoaded(i64, Result<Vec<u8>, NetworkError>),

    SelectPokemon(i64),
    DetailsLoaded(RequestId, Result<PokemonDetail, NetworkError>),
    CloseDetails,

    DismissNotice,
}

/// Create a COSMIC application from the app model
impl Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = Flags;

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "dev.mariinkys.DexGrid";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(core: cosmic::Core, flags: Self::Flags) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_name(Self::APP_ID).handle())
            .version(env!("CARGO_PKG_VERSION"))
            .links([(fl!("repository"), REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        let mut app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            key_binds: HashMap::new(),
            pokedex: Pokedex::new(flags.config.page_size),
            config: flags.config,
            config_handler: flags.config_handler,
            theme_labels: vec![fl!("match-desktop"), fl!("dark"), fl!("light")],
            column_labels: COLUMN_CHOICES.iter().map(ToString::to_string).collect(),
            api: PokeApi::default(),
            sprites: HashMap::new(),
            notice: None,
        };

        let tasks = vec![
            cosmic::command::set_theme(app.config.app_theme.theme()),
            app.load_first_page(),
        ];

        (app, Task::batch(tasks))
    }

    /// Elements to pack at the start of the header bar.
    fn header_start(&self) -> Vec<Element<'_, Self::Message>> {
        let menu_bar = menu::bar(vec![menu::Tree::with_children(
            menu::root(fl!("view")).apply(Element::from),
            menu::items(
                &self.key_binds,
                vec![
                    menu::Item::Button(fl!("reload"), None, MenuAction::Reload),
                    menu::Item::Divider,
                    menu::Item::Button(fl!("settings"), None, MenuAction::Settings),
                    menu::Item::Button(fl!("about"), None, MenuAction::About),
                ],
            ),
        )]);

        vec![menu_bar.into()]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        self.context_page.display(self)
    }

    /// Blocking dialogs: errors first, then the details lookup in progress.
    fn dialog(&self) -> Option<Element<'_, Self::Message>> {
        if let Some(notice) = self.notice {
            return Some(self.notice_dialog(notice));
        }

        if self.pokedex.is_loading_detail() {
            let dialog = widget::dialog()
                .title(fl!("pokemon-page"))
                .body(fl!("consulting-pokedex"));
            return Some(dialog.into());
        }

        None
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        let spacing = theme::active().cosmic().spacing;

        if self.pokedex.is_empty() && self.pokedex.is_loading_initial() {
            return widget::text::title3(fl!("loading-pokemon"))
                .apply(widget::container)
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(Horizontal::Center)
                .align_y(Vertical::Center)
                .into();
        }

        let header = widget::text::title4(fl!("pokemon-found", count = self.pokedex.len()))
            .apply(widget::container)
            .width(Length::Fill)
            .align_x(Horizontal::Center)
            .padding(spacing.space_s);

        let content = widget::column()
            .push(self.pokemon_grid(&spacing))
            .push(self.footer())
            .align_x(Alignment::Center)
            .spacing(spacing.space_m)
            .padding([spacing.space_none, spacing.space_m])
            .width(Length::Fill);

        widget::column()
            .push(header)
            .push(widget::scrollable(content).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        self.core()
            .watch_config::<DexConfig>(Self::APP_ID)
            .map(|update| {
                for err in update.errors {
                    tracing::warn!("error while watching the config: {err}");
                }
                Message::UpdateConfig(update.config)
            })
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        match message {
            Message::LaunchUrl(url) => {
                if let Err(err) = open::that_detached(&url) {
                    tracing::error!("failed to open {url}: {err}");
                }
            }
            Message::ToggleContextPage(context_page) => {
                if self.context_page == context_page {
                    // Close the context drawer if the toggled context page is the same.
                    self.core.window.show_context = !self.core.window.show_context;
                } else {
                    // Open the context drawer to display the requested context page.
                    self.context_page = context_page;
                    self.core.window.show_context = true;
                }

                if self.context_page != ContextPage::PokemonDetails || !self.core.window.show_context
                {
                    self.pokedex.close_detail();
                }
            }
            Message::MenuAction(action) => match action {
                MenuAction::About => {
                    return self.update(Message::ToggleContextPage(ContextPage::About));
                }
                MenuAction::Settings => {
                    return self.update(Message::ToggleContextPage(ContextPage::Settings));
                }
                MenuAction::Reload => return self.update(Message::Reload),
            },
            Message::UpdateConfig(config) => {
                let theme_changed = config.app_theme != self.config.app_theme;
                self.pokedex.set_page_size(config.page_size);
                self.config = config;

                if theme_changed {
                    return cosmic::command::set_theme(self.config.app_theme.theme());
                }
            }
            Message::UpdateTheme(index) => {
                let app_theme = AppTheme::from_index(index);
                match &self.config_handler {
                    Some(handler) => {
                        if let Err(err) = self.config.set_app_theme(handler, app_theme) {
                            tracing::error!("failed to save the theme: {err}");
                        }
                    }
                    None => self.config.app_theme = app_theme,
                }

                return cosmic::command::set_theme(self.config.app_theme.theme());
            }
            Message::UpdatePokemonPerRow(index) => {
                let per_row = COLUMN_CHOICES
                    .get(index)
                    .copied()
                    .unwrap_or(COLUMN_CHOICES[0]);
                match &self.config_handler {
                    Some(handler) => {
                        if let Err(err) = self.config.set_pokemon_per_row(handler, per_row) {
                            tracing::error!("failed to save the Pokémon per row: {err}");
                        }
                    }
                    None => self.config.pokemon_per_row = per_row,
                }
            }

            Message::Reload => {
                self.notice = None;
                return self.load_first_page();
            }
            Message::LoadMore => {
                if let Some(ticket) = self.pokedex.begin_load_more() {
                    return self.spawn_page_load(ticket);
                }
            }
            Message::PageLoaded(request, result) => {
                let was_first_page = self.pokedex.initial_state() == &LoadState::Loading(request);

                match self.pokedex.finish_page(request, result) {
                    PageOutcome::Applied { added } => {
                        return self.spawn_sprite_loads(&self.pokedex.pokemon()[added]);
                    }
                    PageOutcome::Failed(_) => {
                        self.notice = Some(if was_first_page {
                            Notice::FirstPageFailed
                        } else {
                            Notice::NextPageFailed
                        });
                    }
                    PageOutcome::Stale => {}
                }
            }
            Message::SpriteLoaded(pokemon_id, result) => match result {
                Ok(bytes) => {
                    self.sprites
                        .insert(pokemon_id, widget::image::Handle::from_bytes(bytes));
                }
                Err(err) => tracing::warn!(pokemon_id, "sprite unavailable: {err}"),
            },

            Message::SelectPokemon(pokemon_id) => {
                let ticket = self.pokedex.select(pokemon_id);
                let api = self.api.clone();

                return Task::perform(
                    async move { pokedex::fetch_detail(&api, ticket).await },
                    move |result| cosmic::Action::App(Message::DetailsLoaded(ticket.id, result)),
                );
            }
            Message::DetailsLoaded(request, result) => {
                match self.pokedex.finish_detail(request, result) {
                    DetailOutcome::Opened => {
                        self.context_page = ContextPage::PokemonDetails;
                        self.core.window.show_context = true;
                    }
                    DetailOutcome::Failed(err) => {
                        tracing::warn!(request, "details unavailable: {err}");
                        self.notice = Some(Notice::DetailsFailed);
                    }
                    DetailOutcome::Stale => {}
                }
            }
            Message::CloseDetails => {
                self.pokedex.close_detail();
                if self.context_page == ContextPage::PokemonDetails {
                    self.core.window.show_context = false;
                }
            }

            Message::DismissNotice => self.notice = None,
        }

        Task::none()
    }
}

impl AppModel {
    fn load_first_page(&mut self) -> Task<cosmic::Action<Message>> {
        match self.pokedex.begin_initial_load() {
            Some(ticket) => self.spawn_page_load(ticket),
            None => Task::none(),
        }
    }

    fn spawn_page_load(&self, ticket: PageTicket) -> Task<cosmic::Action<Message>> {
        let api = self.api.clone();
        let PageTicket { id, request } = ticket;

        Task::perform(
            async move { pokedex::fetch_page(&api, &request).await },
            move |result| cosmic::Action::App(Message::PageLoaded(id, result)),
        )
    }

    /// Downloads the sprites of freshly listed Pokémon that are not on screen yet
    fn spawn_sprite_loads(&self, pokemon: &[PokemonInfo]) -> Task<cosmic::Action<Message>> {
        let tasks = pokemon
            .iter()
            .filter(|p| !self.sprites.contains_key(&p.id))
            .filter_map(|p| Some((p.id, p.sprite_url.clone()?)))
            .map(|(pokemon_id, url)| {
                let api = self.api.clone();
                Task::perform(
                    async move { api.fetch_sprite(&url).await },
                    move |result| cosmic::Action::App(Message::SpriteLoaded(pokemon_id, result)),
                )
            });

        Task::batch(tasks)
    }

    pub fn settings(&self) -> Element<'_, Message> {
        let theme_dropdown = widget::dropdown(
            &self.theme_labels,
            Some(self.config.app_theme.index()),
            Message::UpdateTheme,
        );

        let columns_dropdown = widget::dropdown(
            &self.column_labels,
            COLUMN_CHOICES
                .iter()
                .position(|choice| *choice == self.config.pokemon_per_row),
            Message::UpdatePokemonPerRow,
        );

        widget::settings::view_column(vec![
            widget::settings::section()
                .title(fl!("appearance"))
                .add(widget::settings::item::builder(fl!("theme")).control(theme_dropdown))
                .add(
                    widget::settings::item::builder(fl!("pokemon-per-row"))
                        .control(columns_dropdown),
                )
                .into(),
        ])
        .into()
    }

    fn notice_dialog(&self, notice: Notice) -> Element<'_, Message> {
        let body = match notice {
            Notice::FirstPageFailed | Notice::NextPageFailed => fl!("list-error"),
            Notice::DetailsFailed => fl!("details-error"),
        };

        let mut dialog = widget::dialog()
            .title(fl!("error-title"))
            .body(body)
            .icon(widget::icon::from_name("dialog-error-symbolic").size(64).icon())
            .primary_action(
                widget::button::standard(fl!("close")).on_press(Message::DismissNotice),
            );

        if notice == Notice::FirstPageFailed {
            dialog = dialog
                .secondary_action(widget::button::suggested(fl!("retry")).on_press(Message::Reload));
        }

        dialog.into()
    }

    /// Rows of `pokemon_per_row` cards
    fn pokemon_grid(&self, spacing: &cosmic_theme::Spacing) -> Element<'_, Message> {
        let per_row = self.config.pokemon_per_row.max(1);

        let rows: Vec<Element<'_, Message>> = self
            .pokedex
            .pokemon()
            .chunks(per_row)
            .map(|chunk| {
                let mut row = widget::row::with_capacity(per_row)
                    .spacing(spacing.space_s)
                    .width(Length::Fill);

                for pokemon in chunk {
                    row = row.push(self.pokemon_card(pokemon, spacing));
                }
                // keep the last row's cards as wide as the others
                for _ in chunk.len()..per_row {
                    row = row.push(widget::horizontal_space());
                }

                row.into()
            })
            .collect();

        widget::column::with_children(rows)
            .spacing(spacing.space_s)
            .width(Length::Fill)
            .into()
    }

    fn pokemon_card<'a>(
        &'a self,
        pokemon: &'a PokemonInfo,
        spacing: &cosmic_theme::Spacing,
    ) -> Element<'a, Message> {
        let content = widget::column()
            .push(widget::text::caption(format!("#{}", dex_number(pokemon.id))))
            .push(self.sprite(pokemon.id, CARD_SPRITE_SIZE))
            .push(widget::text::heading(capitalize_string(&pokemon.name)))
            .align_x(Alignment::Center)
            .spacing(spacing.space_xxs)
            .padding(spacing.space_xs)
            .width(Length::Fill)
            .apply(widget::container)
            .class(theme::Container::Card);

        widget::button::custom(content)
            .on_press(Message::SelectPokemon(pokemon.id))
            .class(theme::Button::Image)
            .width(Length::Fill)
            .into()
    }

    /// "Load more" while the server has more pages, an end of list message after the last one
    fn footer(&self) -> Element<'_, Message> {
        if self.pokedex.has_more() {
            if self.pokedex.can_load_more() {
                widget::button::suggested(fl!("load-more"))
                    .on_press(Message::LoadMore)
                    .into()
            } else {
                widget::button::suggested(fl!("loading")).into()
            }
        } else if self.pokedex.is_end_of_list() {
            widget::text::body(fl!("end-of-list")).into()
        } else {
            widget::horizontal_space().into()
        }
    }

    fn sprite(&self, pokemon_id: i64, size: f32) -> Element<'_, Message> {
        match self.sprites.get(&pokemon_id) {
            Some(handle) => widget::image(handle.clone())
                .width(Length::Fixed(size))
                .height(Length::Fixed(size))
                .into(),
            None => widget::icon::from_name("image-missing-symbolic")
                .size(size as u16)
                .icon()
                .into(),
        }
    }
}

/// Contents of the details drawer
pub fn pokemon_details<'a>(
    app: &'a AppModel,
    pokemon: &'a PokemonDetail,
    spacing: &cosmic_theme::Spacing,
) -> Element<'a, Message> {
    let title = widget::column()
        .push(app.sprite(pokemon.id, DETAIL_SPRITE_SIZE))
        .push(widget::text::title1(capitalize_string(&pokemon.name)))
        .push(widget::text::body(format!("Nº {}", dex_number(pokemon.id))))
        .align_x(Alignment::Center)
        .width(Length::Fill);

    let measures = widget::row()
        .push(measure(fl!("height"), format!("{} m", format_tenths(pokemon.height))))
        .push(measure(fl!("weight"), format!("{} kg", format_tenths(pokemon.weight))))
        .spacing(spacing.space_s);

    let types = pokemon
        .types
        .iter()
        .fold(widget::row().spacing(spacing.space_xs), |row, slot| {
            row.push(type_badge(&slot.type_.name, spacing))
        });

    let abilities = pokemon.abilities.iter().fold(widget::column(), |column, entry| {
        let mut label = shout_label(&entry.ability.name);
        if entry.is_hidden {
            label.push_str(&format!(" ({})", fl!("hidden")));
        }
        column.push(widget::text::body(label))
    });

    let stats = pokemon
        .stats
        .iter()
        .fold(widget::column().spacing(spacing.space_xxs), |column, entry| {
            let row = widget::row()
                .push(widget::text::caption(shout_label(&entry.stat.name)).width(Length::Fixed(120.0)))
                .push(stat_bar(stat_bar_fraction(entry.base_stat)))
                .push(
                    widget::text::body(entry.base_stat.to_string())
                        .width(Length::Fixed(36.0))
                        .align_x(Horizontal::Right),
                )
                .align_y(Alignment::Center)
                .spacing(spacing.space_xs);
            column.push(row)
        });

    widget::column()
        .push(title)
        .push(section(fl!("info"), measures))
        .push(section(fl!("types"), types))
        .push(section(fl!("abilities"), abilities))
        .push(section(fl!("stats"), stats))
        .spacing(spacing.space_m)
        .width(Length::Fill)
        .into()
}

fn section<'a>(title: String, content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    widget::column()
        .push(widget::text::heading(title))
        .push(content)
        .spacing(8.0)
        .width(Length::Fill)
        .into()
}

fn measure<'a>(label: String, value: String) -> Element<'a, Message> {
    widget::column()
        .push(widget::text::caption(label))
        .push(widget::text::title4(value))
        .align_x(Alignment::Center)
        .width(Length::Fill)
        .apply(widget::container)
        .class(theme::Container::Card)
        .padding(8.0)
        .into()
}

fn type_badge<'a>(type_name: &str, spacing: &cosmic_theme::Spacing) -> Element<'a, Message> {
    let color = PokemonType::color_for(type_name);

    widget::text::body(type_name.to_uppercase())
        .apply(widget::container)
        .padding([spacing.space_xxxs, spacing.space_s])
        .class(theme::Container::custom(move |_theme| container::Style {
            text_color: Some(Color::WHITE),
            background: Some(Background::Color(color)),
            border: Border {
                radius: 12.0.into(),
                ..Default::default()
            },
            ..Default::default()
        }))
        .into()
}

/// Horizontal bar filled to `fraction` of its width
fn stat_bar<'a>(fraction: f32) -> Element<'a, Message> {
    const RESOLUTION: u16 = 1000;
    let filled = (fraction * f32::from(RESOLUTION)).round() as u16;

    let mut bar = widget::row().width(Length::Fill).height(Length::Fixed(8.0));
    if filled > 0 {
        bar = bar.push(bar_segment(Length::FillPortion(filled), true));
    }
    if filled < RESOLUTION {
        bar = bar.push(bar_segment(Length::FillPortion(RESOLUTION - filled), false));
    }

    bar.into()
}

fn bar_segment<'a>(width: Length, filled: bool) -> Element<'a, Message> {
    widget::horizontal_space()
        .apply(widget::container)
        .width(width)
        .height(Length::Fill)
        .class(theme::Container::custom(move |theme| {
            let cosmic = theme.cosmic();
            let color: Color = if filled {
                cosmic.accent_color().into()
            } else {
                cosmic.bg_component_color().into()
            };
            container::Style {
                background: Some(Background::Color(color)),
                border: Border {
                    radius: 4.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }
        }))
        .into()
}
