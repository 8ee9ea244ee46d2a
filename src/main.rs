//! Showcase entry point
//!
//! On the web this boots the page components. Natively it runs the search
//! engine over a manifest file, which is handy when tuning weights.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    showcase::platform::app::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
const USAGE: &str = "usage: showcase <games.json> [query] [--tags a,b] [--sort relevance|asc|desc|date-new|date-old]";

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(message) = native::run(&args) {
        eprintln!("{}", message);
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use showcase::{Catalog, SearchState, SortMode};

    struct Args {
        manifest: String,
        state: SearchState,
    }

    fn parse(args: &[String]) -> Result<Args, String> {
        let mut manifest = None;
        let mut query = Vec::new();
        let mut state = SearchState::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--tags" => {
                    let value = iter.next().ok_or("--tags needs a value")?;
                    for tag in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                        state.tags.insert(tag.to_lowercase());
                    }
                }
                "--sort" => {
                    let value = iter.next().ok_or("--sort needs a value")?;
                    state.sort =
                        SortMode::parse(value).ok_or_else(|| format!("unknown sort mode {:?}", value))?;
                }
                _ if manifest.is_none() => manifest = Some(arg.clone()),
                _ => query.push(arg.as_str()),
            }
        }
        state.query = query.join(" ");
        let manifest = manifest.ok_or("missing manifest path")?;
        Ok(Args { manifest, state })
    }

    pub fn run(args: &[String]) -> Result<(), String> {
        let Args { manifest, mut state } = parse(args)?;
        let json = std::fs::read_to_string(&manifest)
            .map_err(|e| format!("cannot read {}: {}", manifest, e))?;
        let catalog = Catalog::from_json(&json).map_err(|e| e.to_string())?;
        log::info!("Loaded {} game(s) from {}", catalog.len(), manifest);

        state.sanitize(&catalog.tag_universe());
        let hits = state.run(&catalog);
        if hits.is_empty() {
            println!("{}", showcase::search::NO_RESULTS_TEXT);
            return Ok(());
        }
        for hit in hits {
            let game = &catalog.games[hit.index];
            println!(
                "{:>4}  {:<24} {:<10} [{}]",
                hit.score,
                game.name,
                game.release_date.as_deref().unwrap_or("-"),
                game.tags.join(", ")
            );
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn args(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        #[test]
        fn test_parse_query_tags_and_sort() {
            let parsed = parse(&args(&["games.json", "space", "race", "--tags", "Arcade, puzzle", "--sort", "asc"]))
                .unwrap();
            assert_eq!(parsed.manifest, "games.json");
            assert_eq!(parsed.state.query, "space race");
            assert!(parsed.state.tags.contains("arcade"));
            assert!(parsed.state.tags.contains("puzzle"));
            assert_eq!(parsed.state.sort, SortMode::Asc);
        }

        #[test]
        fn test_parse_errors() {
            assert!(parse(&args(&[])).is_err());
            assert!(parse(&args(&["games.json", "--sort", "sideways"])).is_err());
            assert!(parse(&args(&["games.json", "--tags"])).is_err());
        }
    }
}
