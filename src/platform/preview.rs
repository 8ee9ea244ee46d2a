//! Inline gallery preview strips on game pages

use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlImageElement};

use super::dom;
use super::host::WebAssetHost;
use super::lightbox::LightboxView;
use crate::gallery::{INDEX_ATTR, OpenTarget, POSTER_ATTR, PreviewLayout, PreviewSlot, thumbnail_source};
use crate::media::{EMPTY_GALLERY_TEXT, is_video};
use crate::probe::{FallbackChain, MediaTarget};
use crate::tuning::Tuning;

/// Discover and render every `.gallery` on the page
pub fn mount_all(host: WebAssetHost, lightbox: Rc<LightboxView>, tuning: Rc<Tuning>, mobile: bool) {
    for gallery in dom::query_document(".gallery") {
        mount(gallery, host, lightbox.clone(), tuning.clone(), mobile);
    }
}

fn mount(gallery: Element, host: WebAssetHost, lightbox: Rc<LightboxView>, tuning: Rc<Tuning>, mobile: bool) {
    let section = gallery.closest(".game").ok().flatten();
    let folder = section.as_ref().and_then(|s| dom::data(s, "folder"));
    let key = dom::data(&gallery, "game");
    let target = MediaTarget::new(folder.as_deref(), key.as_deref(), mobile).with_default_folder();
    if let (Some(section), None, Some(default)) = (&section, &folder, &target.folder) {
        let _ = section.set_attribute("data-folder", default);
    }

    // Wheel and touch scrolling are swallowed over the strip
    for name in ["wheel", "touchmove"] {
        dom::listen_active(&gallery, name, |event: Event| {
            event.prevent_default();
            event.stop_propagation();
        });
    }

    // Hand-authored images win over discovery
    let inline: Vec<String> = dom::query_all(&gallery, "img")
        .iter()
        .filter_map(|img| img.get_attribute("src"))
        .collect();
    if !inline.is_empty() {
        install(&gallery, inline, &lightbox, &tuning);
        return;
    }

    render(&gallery, &[], &tuning);
    wasm_bindgen_futures::spawn_local(async move {
        let items = FallbackChain::for_gallery(&target)
            .run(&host, &target, &tuning)
            .await;
        if items.is_empty() {
            log::info!("No media for gallery {:?}", target.key);
        }
        install(&gallery, items, &lightbox, &tuning);
    });
}

/// Render now and again on every resize. Clicks are delegated to the strip
/// so re-rendered tiles carry no listeners of their own.
fn install(gallery: &Element, items: Vec<String>, lightbox: &Rc<LightboxView>, tuning: &Rc<Tuning>) {
    let items = Rc::new(items);
    render(gallery, &items, tuning);
    dom::fallback_posters(gallery);
    {
        let items = items.clone();
        let lightbox = lightbox.clone();
        dom::listen(gallery, "click", move |event: Event| {
            if let Some(index) = dom::target_index(&event) {
                event.prevent_default();
                lightbox.open(items.to_vec(), OpenTarget::Index(index));
            }
        });
    }
    if let Some(window) = dom::window() {
        let gallery = gallery.clone();
        let tuning = tuning.clone();
        dom::listen(&window, "resize", move |_event: Event| {
            render(&gallery, &items, &tuning);
        });
    }
}

fn render(gallery: &Element, items: &[String], tuning: &Tuning) {
    gallery.set_inner_html("");
    if items.is_empty() {
        if let Some(empty) = dom::create("div", "gallery-empty") {
            empty.set_text_content(Some(EMPTY_GALLERY_TEXT));
            let _ = gallery.append_child(&empty);
        }
        return;
    }

    let mut width = gallery.client_width() as f64;
    if width <= 0.0 {
        width = gallery
            .parent_element()
            .map(|p| p.client_width() as f64)
            .unwrap_or(0.0);
    }
    let layout = PreviewLayout::compute(width, items.len(), tuning.thumb_base_px, tuning.thumb_gap_px);
    match layout.thumb_size {
        Some(size) => dom::set_style(gallery, "--thumb-size", &format!("{}px", size)),
        None => dom::clear_style(gallery, "--thumb-size"),
    }

    let name = dom::data(gallery, "game");
    for slot in layout.slots {
        let tile = match slot {
            PreviewSlot::Thumb { index } => {
                let Some(img) = dom::create_as::<HtmlImageElement>("img", "") else {
                    continue;
                };
                let src = &items[index];
                img.set_src(&thumbnail_source(src));
                if is_video(src) {
                    let _ = img.set_attribute(POSTER_ATTR, "");
                }
                let _ = img.set_attribute("loading", "lazy");
                let _ = img.set_attribute("decoding", "async");
                img.set_alt(&match &name {
                    Some(game) => format!("{} screenshot {}", game, index + 1),
                    None => format!("screenshot {}", index + 1),
                });
                img.unchecked_into::<Element>()
            }
            PreviewSlot::More { hidden, total } => {
                let Some(more) = dom::create("div", "thumb-more") else {
                    continue;
                };
                more.set_text_content(Some(&format!("+{}", hidden)));
                let _ = more.set_attribute("title", &format!("View all {} items", total));
                more
            }
        };
        let _ = tile.set_attribute(INDEX_ATTR, &slot.open_index().to_string());
        let _ = gallery.append_child(&tile);
    }
}
