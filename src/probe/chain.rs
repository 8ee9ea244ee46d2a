//! Ordered fallback chain of discovery strategies

use futures::future::LocalBoxFuture;

use super::{AssetHost, MediaTarget};
use crate::tuning::Tuning;

/// One way of finding a game's media
pub trait DiscoveryStrategy {
    fn name(&self) -> &'static str;

    /// `None` (or an empty list) hands over to the next strategy
    fn discover<'a>(
        &'a self,
        host: &'a dyn AssetHost,
        target: &'a MediaTarget,
        tuning: &'a Tuning,
    ) -> LocalBoxFuture<'a, Option<Vec<String>>>;
}

/// Runs strategies in order until one yields media
#[derive(Default)]
pub struct FallbackChain {
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, strategy: impl DiscoveryStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Standard cascade for a gallery
    ///
    /// With a folder: manifest, listing, numbered, then the root pattern
    /// when a key is known. With only a key: root pattern. With neither
    /// there is nothing to probe.
    pub fn for_gallery(target: &MediaTarget) -> Self {
        use super::strategies::*;
        match (&target.folder, &target.key) {
            (Some(_), key) => {
                let chain = Self::new()
                    .then(ManifestStrategy)
                    .then(DirListingStrategy)
                    .then(NumberedStrategy);
                if key.is_some() {
                    chain.then(RootPatternStrategy)
                } else {
                    chain
                }
            }
            (None, Some(_)) => Self::new().then(RootPatternStrategy),
            (None, None) => Self::new(),
        }
    }

    /// First non-empty result, or an empty list
    pub async fn run(
        &self,
        host: &dyn AssetHost,
        target: &MediaTarget,
        tuning: &Tuning,
    ) -> Vec<String> {
        for strategy in &self.strategies {
            match strategy.discover(host, target, tuning).await {
                Some(found) if !found.is_empty() => {
                    log::info!(
                        "{} found {} item(s) for {:?}",
                        strategy.name(),
                        found.len(),
                        target.folder.as_deref().or(target.key.as_deref())
                    );
                    return found;
                }
                _ => log::debug!("{} found nothing", strategy.name()),
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fake::FakeHost;
    use futures::FutureExt;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Fixed {
        name: &'static str,
        result: Option<Vec<String>>,
        calls: Rc<Cell<u32>>,
    }

    impl DiscoveryStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn discover<'a>(
            &'a self,
            _host: &'a dyn AssetHost,
            _target: &'a MediaTarget,
            _tuning: &'a Tuning,
        ) -> LocalBoxFuture<'a, Option<Vec<String>>> {
            self.calls.set(self.calls.get() + 1);
            let result = self.result.clone();
            async move { result }.boxed_local()
        }
    }

    #[test]
    fn test_first_non_empty_wins() {
        let calls = Rc::new(Cell::new(0));
        let chain = FallbackChain::new()
            .then(Fixed { name: "none", result: None, calls: calls.clone() })
            .then(Fixed { name: "empty", result: Some(vec![]), calls: calls.clone() })
            .then(Fixed { name: "hit", result: Some(vec!["a.png".into()]), calls: calls.clone() })
            .then(Fixed { name: "never", result: Some(vec!["b.png".into()]), calls: calls.clone() });

        let host = FakeHost::default();
        let found = block_on(chain.run(&host, &MediaTarget::default(), &Tuning::default()));
        assert_eq!(found, vec!["a.png"]);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_for_gallery_shapes() {
        let with_folder = MediaTarget::new(Some("f"), Some("k"), false);
        assert_eq!(
            FallbackChain::for_gallery(&with_folder).names(),
            vec!["manifest", "dir-listing", "numbered", "root-pattern"]
        );
        let folder_only = MediaTarget::new(Some("f"), None, false);
        assert_eq!(
            FallbackChain::for_gallery(&folder_only).names(),
            vec!["manifest", "dir-listing", "numbered"]
        );
        let key_only = MediaTarget::new(None, Some("k"), false);
        assert_eq!(FallbackChain::for_gallery(&key_only).names(), vec!["root-pattern"]);
        assert!(FallbackChain::for_gallery(&MediaTarget::default()).is_empty());
    }

    #[test]
    fn test_all_fail_yields_empty() {
        let host = FakeHost::default();
        let target = MediaTarget::new(Some("assets/none"), None, true);
        let found = block_on(FallbackChain::for_gallery(&target).run(&host, &target, &Tuning::default()));
        assert!(found.is_empty());
    }
}
