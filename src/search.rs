//! Search, tag filtering and sorting for the game list
//!
//! Scoring is deliberately simple: each field is checked against the whole
//! query as exact > prefix > substring, weighted by field. Active tag filters
//! use AND semantics and add a flat bonus per tag.
//!
//! State round-trips through the URL query (`q`, `tags`, `sort`) and session
//! storage so reloads and back/forward keep the same view.

use std::collections::BTreeSet;
use std::cmp::Ordering;

use crate::catalog::{Catalog, GameEntry};
use crate::storage::KeyValueStore;

pub const TITLE_WEIGHT: u32 = 3;
pub const DESCRIPTION_WEIGHT: u32 = 2;
pub const TAG_WEIGHT: u32 = 1;
/// Added per active tag filter the game satisfies
pub const TAG_FILTER_BONUS: u32 = 2;

/// Text shown when nothing matches
pub const NO_RESULTS_TEXT: &str = "No games found.";

/// How well a field matched the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchLevel {
    None = 0,
    Substring = 1,
    Prefix = 2,
    Exact = 3,
}

impl MatchLevel {
    /// Compare a field against an already-normalized query
    pub fn of(field: &str, query: &str) -> Self {
        if query.is_empty() {
            return MatchLevel::None;
        }
        let field = normalize(field);
        if field == query {
            MatchLevel::Exact
        } else if field.starts_with(query) {
            MatchLevel::Prefix
        } else if field.contains(query) {
            MatchLevel::Substring
        } else {
            MatchLevel::None
        }
    }

    pub fn points(self) -> u32 {
        self as u32
    }
}

/// Lower-case, trim and collapse internal whitespace
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Sort order selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Relevance,
    Asc,
    Desc,
    DateNew,
    DateOld,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::Asc => "asc",
            SortMode::Desc => "desc",
            SortMode::DateNew => "date-new",
            SortMode::DateOld => "date-old",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "relevance" => Some(SortMode::Relevance),
            "asc" => Some(SortMode::Asc),
            "desc" => Some(SortMode::Desc),
            "date-new" => Some(SortMode::DateNew),
            "date-old" => Some(SortMode::DateOld),
            _ => None,
        }
    }
}

/// Score a game; `None` means it is filtered out
pub fn score(game: &GameEntry, query: &str, active_tags: &BTreeSet<String>) -> Option<u32> {
    if !active_tags.iter().all(|tag| game.has_tag(tag)) {
        return None;
    }

    let query = normalize(query);
    let title = MatchLevel::of(&game.name, &query).points() * TITLE_WEIGHT;
    let description = game
        .description
        .as_deref()
        .map(|d| MatchLevel::of(d, &query).points())
        .unwrap_or(0)
        * DESCRIPTION_WEIGHT;
    let tags = game
        .tags
        .iter()
        .map(|t| MatchLevel::of(t, &query))
        .max()
        .unwrap_or(MatchLevel::None)
        .points()
        * TAG_WEIGHT;

    let text_score = title + description + tags;
    if text_score == 0 && !query.is_empty() {
        return None;
    }
    Some(text_score + active_tags.len() as u32 * TAG_FILTER_BONUS)
}

/// One visible game after search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Position in manifest order
    pub index: usize,
    pub slug: String,
    pub score: u32,
}

/// Current query, tag filters and sort mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub tags: BTreeSet<String>,
    pub sort: SortMode,
}

impl SearchState {
    pub const QUERY_KEY: &'static str = "ogv:search:q";
    pub const TAGS_KEY: &'static str = "ogv:search:tags";
    pub const SORT_KEY: &'static str = "ogv:search:sort";

    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Default::default()
        }
    }

    /// Add the tag if absent, remove it if present; returns whether it is now active
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return false;
        }
        if self.tags.remove(&tag) {
            false
        } else {
            self.tags.insert(tag);
            true
        }
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    /// Drop tags no game carries
    pub fn sanitize(&mut self, universe: &BTreeSet<String>) {
        self.tags.retain(|t| universe.contains(t));
    }

    pub fn is_default(&self) -> bool {
        self.query.trim().is_empty() && self.tags.is_empty() && self.sort == SortMode::Relevance
    }

    /// Filter and order the catalog
    pub fn run(&self, catalog: &Catalog) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = catalog
            .games
            .iter()
            .enumerate()
            .filter_map(|(index, game)| {
                score(game, &self.query, &self.tags).map(|score| SearchHit {
                    index,
                    slug: game.slug.clone(),
                    score,
                })
            })
            .collect();

        let games = &catalog.games;
        let by_title = |a: &SearchHit, b: &SearchHit| {
            games[a.index]
                .name
                .to_lowercase()
                .cmp(&games[b.index].name.to_lowercase())
        };

        match self.sort {
            SortMode::Relevance => {
                hits.sort_by(|a, b| b.score.cmp(&a.score).then(a.index.cmp(&b.index)))
            }
            SortMode::Asc => hits.sort_by(|a, b| by_title(a, b).then(a.index.cmp(&b.index))),
            SortMode::Desc => hits.sort_by(|a, b| by_title(b, a).then(a.index.cmp(&b.index))),
            SortMode::DateNew | SortMode::DateOld => {
                let newest_first = self.sort == SortMode::DateNew;
                hits.sort_by(|a, b| {
                    let da = games[a.index].release();
                    let db = games[b.index].release();
                    let dates = match (da, db) {
                        (Some(x), Some(y)) if newest_first => y.cmp(&x),
                        (Some(x), Some(y)) => x.cmp(&y),
                        // Undated entries always sink
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        (None, None) => Ordering::Equal,
                    };
                    dates.then(by_title(a, b)).then(a.index.cmp(&b.index))
                });
            }
        }

        hits
    }

    /// Encode as `q=..&tags=a,b&sort=..`, omitting defaults
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let query = self.query.trim();
        if !query.is_empty() {
            pairs.push(("q", query.to_string()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.iter().cloned().collect::<Vec<_>>().join(",")));
        }
        if self.sort != SortMode::Relevance {
            pairs.push(("sort", self.sort.as_str().to_string()));
        }
        pairs
    }

    /// Rewrite a query string (`?a=b&q=..`), keeping unrelated parameters such as `g`
    pub fn apply_to_query(&self, existing: &str) -> String {
        let existing = existing.trim_start_matches('?');
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in url::form_urlencoded::parse(existing.as_bytes()) {
            if k != "q" && k != "tags" && k != "sort" {
                ser.append_pair(&k, &v);
            }
        }
        for (k, v) in self.to_query_pairs() {
            ser.append_pair(k, &v);
        }
        ser.finish()
    }

    /// Parse state from a query string; `None` if it carries no search parameters
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.trim_start_matches('?');
        let mut state = SearchState::default();
        let mut seen = false;
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            match k.as_ref() {
                "q" => {
                    state.query = v.into_owned();
                    seen = true;
                }
                "tags" => {
                    state.tags = split_tags(&v);
                    seen = true;
                }
                "sort" => {
                    state.sort = SortMode::parse(&v).unwrap_or_default();
                    seen = true;
                }
                _ => {}
            }
        }
        seen.then_some(state)
    }

    pub fn save_session(&self, session: &dyn KeyValueStore) {
        session.set(Self::QUERY_KEY, self.query.trim());
        session.set(
            Self::TAGS_KEY,
            &self.tags.iter().cloned().collect::<Vec<_>>().join(","),
        );
        session.set(Self::SORT_KEY, self.sort.as_str());
    }

    pub fn load_session(session: &dyn KeyValueStore) -> Option<Self> {
        let query = session.get(Self::QUERY_KEY);
        let tags = session.get(Self::TAGS_KEY);
        let sort = session.get(Self::SORT_KEY);
        if query.is_none() && tags.is_none() && sort.is_none() {
            return None;
        }
        Some(Self {
            query: query.unwrap_or_default(),
            tags: tags.map(|t| split_tags(&t)).unwrap_or_default(),
            sort: sort
                .and_then(|s| SortMode::parse(&s))
                .unwrap_or_default(),
        })
    }

    /// URL parameters win; otherwise the tab's session copy; tags sanitized either way
    pub fn restore(url_query: &str, session: &dyn KeyValueStore, universe: &BTreeSet<String>) -> Self {
        let mut state = Self::from_query(url_query)
            .or_else(|| Self::load_session(session))
            .unwrap_or_default();
        state.sanitize(universe);
        state
    }
}

fn split_tags(s: &str) -> BTreeSet<String> {
    s.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            GameEntry::new("alpha", "Alpha", &["coop", "retro", "indie"])
                .with_date("2020-05-01")
                .with_description("A cooperative puzzle game"),
            GameEntry::new("beta", "beta", &["coop"]).with_date("2022-01-10"),
            GameEntry::new("gamma", "Gamma", &["retro"]),
            GameEntry::new("star-alpha", "Star Alpha Wars", &["space"]).with_date("2018"),
        ])
    }

    fn slugs(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.slug.as_str()).collect()
    }

    #[test]
    fn test_match_levels() {
        assert_eq!(MatchLevel::of("Alpha", "alpha"), MatchLevel::Exact);
        assert_eq!(MatchLevel::of("Alpha Quest", "alpha"), MatchLevel::Prefix);
        assert_eq!(MatchLevel::of("Star Alpha", "alpha"), MatchLevel::Substring);
        assert_eq!(MatchLevel::of("Gamma", "alpha"), MatchLevel::None);
        assert_eq!(MatchLevel::of("Gamma", ""), MatchLevel::None);
    }

    #[test]
    fn test_exact_title_ranks_first() {
        let hits = SearchState::new("alpha").run(&catalog());
        assert_eq!(slugs(&hits), vec!["alpha", "star-alpha"]);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_zero_score_excluded() {
        let hits = SearchState::new("zzz").run(&catalog());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_description_and_tag_fields_score() {
        let hits = SearchState::new("puzzle").run(&catalog());
        assert_eq!(slugs(&hits), vec!["alpha"]);
        assert_eq!(hits[0].score, MatchLevel::Substring.points() * DESCRIPTION_WEIGHT);

        let hits = SearchState::new("space").run(&catalog());
        assert_eq!(hits[0].score, MatchLevel::Exact.points() * TAG_WEIGHT);
    }

    #[test]
    fn test_tag_filter_and_semantics() {
        let mut state = SearchState::default();
        state.toggle_tag("coop");
        state.toggle_tag("retro");
        let hits = state.run(&catalog());
        // alpha has coop+retro+indie, beta only coop
        assert_eq!(slugs(&hits), vec!["alpha"]);
        assert_eq!(hits[0].score, 2 * TAG_FILTER_BONUS);
    }

    #[test]
    fn test_tag_only_filter_with_empty_query_includes_matches() {
        let mut state = SearchState::default();
        state.toggle_tag("retro");
        assert_eq!(slugs(&state.run(&catalog())), vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_sort_desc_case_insensitive() {
        let catalog = Catalog::new(vec![
            GameEntry::new("a", "Alpha", &[]),
            GameEntry::new("b", "beta", &[]),
            GameEntry::new("g", "Gamma", &[]),
        ]);
        let state = SearchState {
            sort: SortMode::Desc,
            ..Default::default()
        };
        let names: Vec<_> = state
            .run(&catalog)
            .iter()
            .map(|h| catalog.games[h.index].name.clone())
            .collect();
        assert_eq!(names, vec!["Gamma", "beta", "Alpha"]);
    }

    #[test]
    fn test_sort_by_date() {
        let mut state = SearchState {
            sort: SortMode::DateNew,
            ..Default::default()
        };
        assert_eq!(
            slugs(&state.run(&catalog())),
            vec!["beta", "alpha", "star-alpha", "gamma"]
        );
        state.sort = SortMode::DateOld;
        assert_eq!(
            slugs(&state.run(&catalog())),
            vec!["star-alpha", "alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn test_query_roundtrip_keeps_other_params() {
        let mut state = SearchState::new("star wars");
        state.toggle_tag("space");
        state.sort = SortMode::DateOld;
        let qs = state.apply_to_query("?g=alpha&q=old");
        assert_eq!(qs, "g=alpha&q=star+wars&tags=space&sort=date-old");
        assert_eq!(SearchState::from_query(&qs), Some(state));
    }

    #[test]
    fn test_from_query_without_search_params() {
        assert_eq!(SearchState::from_query("?g=alpha"), None);
        assert_eq!(SearchState::from_query(""), None);
    }

    #[test]
    fn test_restore_prefers_url_and_sanitizes() {
        let session = MemoryStore::new();
        SearchState::new("from-session").save_session(&session);
        let universe = catalog().tag_universe();

        let state = SearchState::restore("?q=alpha&tags=coop,bogus", &session, &universe);
        assert_eq!(state.query, "alpha");
        assert_eq!(state.tags.iter().collect::<Vec<_>>(), vec!["coop"]);

        let state = SearchState::restore("", &session, &universe);
        assert_eq!(state.query, "from-session");
    }

    proptest! {
        #[test]
        fn prop_toggle_twice_restores_results(tag_idx in 0usize..5, query in "[a-z ]{0,6}") {
            let catalog = catalog();
            let tags = ["coop", "retro", "indie", "space", "none"];
            let state = SearchState::new(&query);
            let before = state.run(&catalog);

            let mut toggled = state.clone();
            toggled.toggle_tag(tags[tag_idx]);
            toggled.toggle_tag(tags[tag_idx]);
            prop_assert_eq!(&toggled, &state);
            prop_assert_eq!(toggled.run(&catalog), before);
        }

        #[test]
        fn prop_exact_title_outranks_substring_only(
            title in "[a-z]{3,8}",
            prefix in "[0-9]{1,4}",
            tag_count in 0usize..6,
        ) {
            let tags: Vec<String> = (0..tag_count).map(|i| format!("x{}{}y", title, i)).collect();
            let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
            let substring_name = format!("{} {} {}", prefix, title, prefix);
            let catalog = Catalog::new(vec![
                GameEntry::new("sub", &substring_name, &tag_refs)
                    .with_description(&format!("the {} saga", title)),
                GameEntry::new("exact", &title, &[]),
            ]);
            let hits = SearchState::new(&title).run(&catalog);
            prop_assert_eq!(hits[0].slug.as_str(), "exact");
        }
    }
}
