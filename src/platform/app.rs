//! Page bootstrap: detects the page kind and wires the components together

use std::rc::Rc;

use super::cards::{self, GAME_LIST_ID};
use super::covers::CoversView;
use super::dom;
use super::host::WebAssetHost;
use super::lightbox::LightboxView;
use super::music::MusicDriver;
use super::search_view::SearchView;
use super::store::WebStore;
use super::{preview, stars};
use crate::bgm::PlaybackScope;
use crate::catalog::{Catalog, MANIFEST_PATH};
use crate::error::Result;
use crate::events::{EventBus, ShowcaseEvent};
use crate::prefs::Preferences;
use crate::probe::AssetHost;
use crate::storage::KeyValueStore;
use crate::tuning::Tuning;

/// Shared handles every component is mounted with
struct Context {
    host: WebAssetHost,
    bus: EventBus,
    tuning: Rc<Tuning>,
    prefs: Preferences,
    local: Rc<dyn KeyValueStore>,
    session: Rc<dyn KeyValueStore>,
    mobile: bool,
}

pub async fn run() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logger init failed: {}", e).into());
    }

    let local: Rc<dyn KeyValueStore> = Rc::new(WebStore::local());
    let session: Rc<dyn KeyValueStore> = Rc::new(WebStore::session());
    let tuning = Rc::new(Tuning::load(local.as_ref()));
    let prefs = Preferences::load(local.as_ref(), session.as_ref());
    let mobile = dom::is_mobile_like(&tuning);

    let bus = EventBus::new();
    bus.subscribe(dom::dispatch);

    stars::mount(&tuning);

    let ctx = Context {
        host: WebAssetHost,
        bus,
        tuning,
        prefs,
        local,
        session,
        mobile,
    };

    let page = dom::document()
        .and_then(|d| d.document_element())
        .and_then(|root| dom::data(&root, "page"));
    log::info!("Showcase starting on {:?} page (mobile: {})", page, ctx.mobile);

    match page.as_deref() {
        Some("game") => run_game_page(ctx).await,
        _ => run_index_page(ctx).await,
    }
}

async fn load_catalog(host: &WebAssetHost) -> Result<Catalog> {
    let fetched = host.fetch(MANIFEST_PATH).await?;
    Catalog::from_json(&fetched.body)
}

async fn run_index_page(ctx: Context) {
    mount_music(&ctx, PlaybackScope::Index);
    mount_galleries(&ctx);

    let Some(list) = dom::by_id(GAME_LIST_ID) else {
        log::warn!("No #{} on the index page", GAME_LIST_ID);
        return;
    };
    let catalog = match load_catalog(&ctx.host).await {
        Ok(catalog) => Rc::new(catalog),
        Err(e) => {
            log::error!("Failed to load game list: {}", e);
            cards::render_error(&list, "Could not load the game list.");
            return;
        }
    };

    let rendered = cards::render_catalog(&list, &catalog);
    ctx.bus.emit(ShowcaseEvent::GamesRendered {
        count: rendered.len(),
    });

    SearchView::mount(
        list,
        catalog,
        rendered.clone(),
        ctx.session.clone(),
        ctx.bus.clone(),
    );
    CoversView::mount(
        rendered,
        ctx.host,
        ctx.bus.clone(),
        ctx.tuning.clone(),
        ctx.prefs.clone(),
        ctx.local.clone(),
        ctx.session.clone(),
        ctx.mobile,
    );
}

async fn run_game_page(ctx: Context) {
    let slug = url::form_urlencoded::parse(dom::query_string().as_bytes())
        .find(|(k, _)| k == "g")
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            dom::query_document(".gallery")
                .first()
                .and_then(|g| dom::data(g, "game"))
        });

    if let Some(slug) = &slug {
        match load_catalog(&ctx.host).await {
            Ok(catalog) => match catalog.get(slug) {
                Some(game) => fill_game_details(game),
                None => log::warn!("Unknown game {:?}", slug),
            },
            Err(e) => log::warn!("Game list unavailable: {}", e),
        }
        for gallery in dom::query_document(".gallery") {
            if dom::data(&gallery, "game").is_none() {
                let _ = gallery.set_attribute("data-game", slug);
            }
        }
    }

    mount_galleries(&ctx);
    let scope = slug.map(PlaybackScope::Game).unwrap_or(PlaybackScope::Index);
    mount_music(&ctx, scope);
}

fn fill_game_details(game: &crate::catalog::GameEntry) {
    if let Some(title) = dom::by_id("game-title") {
        title.set_text_content(Some(&game.name));
    }
    if let Some(document) = dom::document() {
        document.set_title(&game.name);
    }
    if let (Some(el), Some(description)) = (dom::by_id("game-description"), &game.description) {
        el.set_text_content(Some(description));
    }
    for section in dom::query_document(".game") {
        if dom::data(&section, "folder").is_none() {
            let _ = section.set_attribute("data-folder", &game.media_folder());
        }
    }
}

fn mount_galleries(ctx: &Context) {
    if dom::query_document(".gallery").is_empty() {
        return;
    }
    match LightboxView::mount(ctx.bus.clone(), &ctx.tuning) {
        Some(lightbox) => preview::mount_all(ctx.host, lightbox, ctx.tuning.clone(), ctx.mobile),
        None => log::warn!("Lightbox could not be created"),
    }
}

fn mount_music(ctx: &Context, scope: PlaybackScope) {
    let driver = MusicDriver::mount(
        ctx.host,
        &ctx.bus,
        ctx.tuning.clone(),
        ctx.prefs.clone(),
        ctx.local.clone(),
        ctx.session.clone(),
        scope,
        ctx.mobile,
    );
    if driver.is_none() {
        log::warn!("Background music unavailable");
    }
}
