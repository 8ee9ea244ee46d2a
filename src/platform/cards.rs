//! Game card rendering for the index page

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlImageElement};

use super::dom;
use crate::catalog::{Catalog, GameEntry};

/// Card list container
pub const GAME_LIST_ID: &str = "game-list";

/// Handles to the parts of a card the views update
#[derive(Clone)]
pub struct CardElements {
    pub slug: String,
    pub game: GameEntry,
    pub root: Element,
    pub cover: Element,
    pub media: Element,
    pub progress: Element,
    pub prev: Element,
    pub next: Element,
    pub mute: Element,
    pub logo: HtmlImageElement,
}

pub fn game_url(slug: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("g", slug)
        .finish();
    format!("game.html?{}", query)
}

fn render_card(game: &GameEntry) -> Option<CardElements> {
    let root = dom::create("article", "game")?;
    root.set_id(&format!("game-{}", game.slug));
    let _ = root.set_attribute("data-game", &game.slug);
    let _ = root.set_attribute("data-title", &game.name);
    let _ = root.set_attribute("data-folder", &game.media_folder());
    let _ = root.set_attribute("data-tags", &game.tags.join(","));
    if let Some(date) = &game.release_date {
        let _ = root.set_attribute("data-date", date);
    }

    let cover = dom::create("div", "cover")?;
    let _ = cover.set_attribute("data-game", &game.slug);
    let media = dom::create("div", "cover-media")?;
    let logo: HtmlImageElement = dom::create_as("img", "cover-logo")?;
    logo.set_alt(&game.name);
    dom::set_style(&logo, "display", "none");
    let prev = dom::create("button", "cover-prev")?;
    prev.set_text_content(Some("❮"));
    let _ = prev.set_attribute("aria-label", "Previous cover");
    let next = dom::create("button", "cover-next")?;
    next.set_text_content(Some("❯"));
    let _ = next.set_attribute("aria-label", "Next cover");
    let mute = dom::create("button", "cover-mute")?;
    mute.set_text_content(Some("🔇"));
    let _ = mute.set_attribute("aria-label", "Unmute video");
    dom::set_style(&mute, "display", "none");
    let progress = dom::create("div", "cover-progress")?;
    let bar = dom::create("span", "")?;
    let _ = progress.append_child(&bar);
    dom::set_style(&progress, "visibility", "hidden");

    for child in [&media, logo.unchecked_ref::<Element>(), &prev, &next, &mute, &progress] {
        let _ = cover.append_child(child);
    }
    let _ = root.append_child(&cover);

    let heading = dom::create("h2", "")?;
    let link = dom::create("a", "")?;
    let _ = link.set_attribute("href", &game_url(&game.slug));
    link.set_text_content(Some(&game.name));
    let _ = heading.append_child(&link);
    let _ = root.append_child(&heading);

    if let Some(description) = &game.description {
        let p = dom::create("p", "description")?;
        p.set_text_content(Some(description));
        let _ = root.append_child(&p);
    }

    if !game.tags.is_empty() {
        let list = dom::create("ul", "tags")?;
        for tag in &game.tags {
            let item = dom::create("li", "tag")?;
            item.set_text_content(Some(tag));
            let _ = list.append_child(&item);
        }
        let _ = root.append_child(&list);
    }

    Some(CardElements {
        slug: game.slug.clone(),
        game: game.clone(),
        root,
        cover,
        media,
        progress,
        prev,
        next,
        mute,
        logo,
    })
}

/// Replace the list's contents with one card per game, in manifest order
pub fn render_catalog(list: &Element, catalog: &Catalog) -> Vec<CardElements> {
    list.set_inner_html("");
    let cards: Vec<CardElements> = catalog.games.iter().filter_map(render_card).collect();
    for card in &cards {
        let _ = list.append_child(&card.root);
    }
    log::info!("Rendered {} game card(s)", cards.len());
    cards
}

/// Inline error in place of the list
pub fn render_error(list: &Element, message: &str) {
    list.set_inner_html("");
    if let Some(p) = dom::create("p", "error") {
        p.set_text_content(Some(message));
        let _ = list.append_child(&p);
    }
}

/// Show the first cover logo that exists
pub fn show_logo(card: &CardElements, url: &str) {
    card.logo.set_src(url);
    dom::set_style(&card.logo, "display", "block");
}
