//! Search box, tag chips and sort selector over the rendered card list

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlInputElement, HtmlSelectElement, KeyboardEvent};

use super::cards::CardElements;
use super::dom;
use crate::catalog::Catalog;
use crate::events::{EventBus, ShowcaseEvent};
use crate::search::{NO_RESULTS_TEXT, SearchState, SortMode};
use crate::storage::KeyValueStore;

pub const SEARCH_BOX_ID: &str = "search-box";
pub const SEARCH_BUTTON_ID: &str = "search-button";
pub const SORT_SELECT_ID: &str = "sort-select";
pub const TAG_FILTERS_ID: &str = "tag-filters";

pub struct SearchView {
    state: RefCell<SearchState>,
    catalog: Rc<Catalog>,
    cards: Vec<CardElements>,
    list: Element,
    empty: Option<Element>,
    input: Option<HtmlInputElement>,
    chips: Vec<(String, Element)>,
    session: Rc<dyn KeyValueStore>,
    bus: EventBus,
}

impl SearchView {
    pub fn mount(
        list: Element,
        catalog: Rc<Catalog>,
        cards: Vec<CardElements>,
        session: Rc<dyn KeyValueStore>,
        bus: EventBus,
    ) -> Rc<Self> {
        let universe = catalog.tag_universe();
        let state = SearchState::restore(&dom::query_string(), session.as_ref(), &universe);

        let input = dom::by_id(SEARCH_BOX_ID).and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        if let Some(input) = &input {
            input.set_value(&state.query);
        }
        let sort = dom::by_id(SORT_SELECT_ID).and_then(|el| el.dyn_into::<HtmlSelectElement>().ok());
        if let Some(sort) = &sort {
            sort.set_value(state.sort.as_str());
        }

        let mut chips = Vec::new();
        if let Some(container) = dom::by_id(TAG_FILTERS_ID) {
            container.set_inner_html("");
            for tag in &universe {
                if let Some(chip) = dom::create("button", "tag-chip") {
                    let _ = chip.set_attribute("type", "button");
                    let _ = chip.set_attribute("data-tag", tag);
                    chip.set_text_content(Some(tag));
                    let _ = container.append_child(&chip);
                    chips.push((tag.clone(), chip));
                }
            }
        }

        let empty = dom::create("p", "no-results");
        if let Some(empty) = &empty {
            empty.set_text_content(Some(NO_RESULTS_TEXT));
            dom::set_style(empty, "display", "none");
            let _ = list.append_child(empty);
        }

        let view = Rc::new(Self {
            state: RefCell::new(state),
            catalog,
            cards,
            list,
            empty,
            input,
            chips,
            session,
            bus,
        });
        view.wire(sort);
        view.apply();
        view
    }

    fn wire(self: &Rc<Self>, sort: Option<HtmlSelectElement>) {
        if let Some(input) = &self.input {
            let view = self.clone();
            dom::listen(input, "input", move |_event: Event| view.run_query());
            let view = self.clone();
            dom::listen(input, "keypress", move |event: Event| {
                if event.dyn_ref::<KeyboardEvent>().is_some_and(|k| k.key() == "Enter") {
                    view.run_query();
                }
            });
        }
        if let Some(button) = dom::by_id(SEARCH_BUTTON_ID) {
            let view = self.clone();
            dom::listen(&button, "click", move |event: Event| {
                event.prevent_default();
                view.run_query();
            });
        }
        if let Some(sort) = sort {
            let view = self.clone();
            let select = sort.clone();
            dom::listen(&sort, "change", move |_event: Event| {
                let mode = SortMode::parse(&select.value()).unwrap_or_default();
                view.state.borrow_mut().sort = mode;
                view.apply();
            });
        }
        for (tag, chip) in &self.chips {
            let view = self.clone();
            let tag = tag.clone();
            dom::listen(chip, "click", move |_event: Event| {
                view.state.borrow_mut().toggle_tag(&tag);
                view.apply();
            });
        }
    }

    fn run_query(&self) {
        let query = self.input.as_ref().map(|i| i.value()).unwrap_or_default();
        self.state.borrow_mut().query = query;
        self.apply();
    }

    /// Reorder matching cards in place and hide the rest
    pub fn apply(&self) {
        let state = self.state.borrow();
        let hits = state.run(&self.catalog);

        for card in &self.cards {
            dom::set_style(&card.root, "display", "none");
        }
        for hit in &hits {
            if let Some(card) = self.cards.iter().find(|c| c.slug == hit.slug) {
                dom::clear_style(&card.root, "display");
                // Appending an attached node moves it
                let _ = self.list.append_child(&card.root);
            }
        }
        if let Some(empty) = &self.empty {
            if hits.is_empty() {
                dom::clear_style(empty, "display");
                let _ = self.list.append_child(empty);
            } else {
                dom::set_style(empty, "display", "none");
            }
        }
        for (tag, chip) in &self.chips {
            dom::set_class(chip, "active", state.tags.contains(tag));
            let _ = chip.set_attribute("aria-pressed", if state.tags.contains(tag) { "true" } else { "false" });
        }

        dom::replace_query(&state.apply_to_query(&dom::query_string()));
        state.save_session(self.session.as_ref());
        log::debug!("Search {:?} -> {} result(s)", state.query, hits.len());
        drop(state);

        self.bus.emit(ShowcaseEvent::SearchChanged { visible: hits.len() });
    }
}
