//! Pokedex gallery TUI backed by PokeAPI.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pokegallery::action::Action;
use pokegallery::api;
use pokegallery::components::{
    handle_search_keys, Component, DetailOverlay, DetailOverlayProps, GalleryView,
    GalleryViewProps,
};
use pokegallery::effect::Effect;
use pokegallery::locale::DEFAULT_LOCALE;
use pokegallery::reducer::reducer;
use pokegallery::state::{AppState, LOADING_ANIM_TICK_MS};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

/// Pokedex gallery TUI
#[derive(Parser, Debug)]
#[command(name = "pokegallery")]
#[command(about = "Browse the PokeAPI catalog as a filterable gallery")]
struct Args {
    /// Locale slug used for descriptions (a PokeAPI language name)
    #[arg(long, short, default_value = DEFAULT_LOCALE)]
    locale: String,

    /// Entries fetched per page (minimum 1)
    #[arg(long, short, default_value = "20", value_parser = clap::value_parser!(u64).range(1..))]
    page_size: u64,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum GalleryComponentId {
    Gallery,
    Search,
    Detail,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum GalleryContext {
    Main,
    Search,
    Detail,
}

impl EventRoutingState<GalleryComponentId, GalleryContext> for AppState {
    fn focused(&self) -> Option<GalleryComponentId> {
        if self.search.active {
            Some(GalleryComponentId::Search)
        } else if self.detail_index.is_some() {
            Some(GalleryComponentId::Detail)
        } else {
            Some(GalleryComponentId::Gallery)
        }
    }

    fn modal(&self) -> Option<GalleryComponentId> {
        if self.search.active {
            Some(GalleryComponentId::Search)
        } else if self.detail_index.is_some() {
            Some(GalleryComponentId::Detail)
        } else {
            None
        }
    }

    fn binding_context(&self, id: GalleryComponentId) -> GalleryContext {
        match id {
            GalleryComponentId::Gallery => GalleryContext::Main,
            GalleryComponentId::Search => GalleryContext::Search,
            GalleryComponentId::Detail => GalleryContext::Detail,
        }
    }

    fn default_context(&self) -> GalleryContext {
        GalleryContext::Main
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        locale,
        page_size,
        debug: debug_args,
    } = Args::parse();

    let debug = DebugSession::new(debug_args);

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(locale, page_size as usize))
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

struct GalleryUi {
    gallery: GalleryView,
    detail: DetailOverlay,
}

impl GalleryUi {
    fn new() -> Self {
        Self {
            gallery: GalleryView::new(),
            detail: DetailOverlay::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<GalleryComponentId>,
    ) {
        event_ctx.set_component_area(GalleryComponentId::Gallery, area);

        let props = GalleryViewProps {
            state,
            is_focused: render_ctx.is_focused()
                && !state.search.active
                && state.detail_index.is_none(),
        };
        self.gallery.render(frame, area, props);

        if state.search.active {
            event_ctx.set_component_area(GalleryComponentId::Search, area);
        } else {
            event_ctx
                .component_areas
                .remove(&GalleryComponentId::Search);
        }

        if state.detail_index.is_some() {
            event_ctx.set_component_area(GalleryComponentId::Detail, area);
            let props = DetailOverlayProps {
                record: state.detail_record(),
                ability_texts: &state.ability_texts,
                is_focused: render_ctx.is_focused(),
            };
            self.detail.render(frame, area, props);
        } else {
            event_ctx
                .component_areas
                .remove(&GalleryComponentId::Detail);
        }
    }

    fn handle_gallery_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = GalleryViewProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self
            .gallery
            .handle_event(event, props)
            .into_iter()
            .collect();
        handler_response(actions)
    }

    fn handle_search_event(
        &mut self,
        event: &EventKind,
        _state: &AppState,
    ) -> HandlerResponse<Action> {
        // The search prompt swallows everything so gallery shortcuts
        // cannot fire while typing.
        HandlerResponse {
            actions: handle_search_keys(event),
            consumed: true,
            needs_render: false,
        }
    }

    fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = DetailOverlayProps {
            record: state.detail_record(),
            ability_texts: &state.ability_texts,
            is_focused: true,
        };
        let actions: Vec<_> = self.detail.handle_event(event, props).into_iter().collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(GalleryUi::new()));
    let mut bus: EventBus<AppState, Action, GalleryComponentId, GalleryContext> = EventBus::new();
    let keybindings: Keybindings<GalleryContext> = Keybindings::new();

    let ui_gallery = Rc::clone(&ui);
    bus.register(GalleryComponentId::Gallery, move |event, state| {
        ui_gallery
            .borrow_mut()
            .handle_gallery_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(GalleryComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(GalleryComponentId::Detail, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    // Track terminal size for page-wise cursor movement
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(LOADING_ANIM_TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

/// Handle effects by spawning tasks
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::LoadPage {
            offset,
            limit,
            locale,
        } => {
            ctx.tasks().spawn("page", async move {
                match api::fetch_page(offset, limit, &locale).await {
                    Ok(page) => Action::PageDidLoad {
                        records: page.records,
                        has_more: page.has_more,
                        failures: page.failures,
                    },
                    Err(e) => Action::PageDidError(e),
                }
            });
        }
        Effect::LoadAbilityTexts {
            name,
            abilities,
            locale,
        } => {
            ctx.tasks().spawn("abilities", async move {
                let texts = api::fetch_ability_texts(&abilities, &locale).await;
                Action::AbilityTextsDidLoad { name, texts }
            });
        }
    }
}
