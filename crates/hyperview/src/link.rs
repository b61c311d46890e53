//! Link activation.
//!
//! Turns an activated link into either in-app navigation (links to stories
//! and polls on the content site) or an external open. Classification needs
//! a minimal item lookup; every failure path falls back to opening the URL
//! externally, so a link never appears broken.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::{HyperviewError, Result};

/// Kind of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
    Job,
    Poll,
    #[serde(other)]
    Other,
}

/// Item id and kind, enough to classify a link
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MinimalItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

impl MinimalItem {
    /// Parse an item payload from the content API; extra fields are ignored
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Source of minimal items. Implementations apply their own short timeout.
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn fetch_minimal_item(&self, id: u64) -> Result<MinimalItem>;
}

/// Visited-link state. Both calls must return without blocking.
pub trait VisitedLinks: Send + Sync {
    fn is_visited(&self, url: &str) -> bool;
    fn mark_visited(&self, url: &str);
}

/// Screen an internal link opens on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Story,
    Comments,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Story => "story",
            Tab::Comments => "comments",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteParams {
    pub id: u64,
    pub tab: Tab,
}

/// Targets that activations are delegated to
pub trait Navigator: Send + Sync {
    fn navigate(&self, route_name: &str, params: &RouteParams);
    fn open_external(&self, url: &str);
    fn share(&self, url: &str);
}

/// Outcome of activating a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    NavigateInternal { item_id: u64, tab: Tab },
    OpenExternal(String),
    Share(String),
}

/// Link resolver settings
#[derive(Debug, Clone)]
pub struct LinkResolverConfig {
    /// Client-side bound on the item lookup
    pub timeout: Duration,

    /// Host whose `/item?id=N` URLs are opened in-app
    pub item_host: String,

    /// Route used for internal navigation
    pub route_name: String,
}

impl Default for LinkResolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            item_host: "news.ycombinator.com".to_string(),
            route_name: "StoryModal".to_string(),
        }
    }
}

/// Resolves link activations
pub struct LinkResolver {
    config: LinkResolverConfig,
    items: Arc<dyn ItemSource>,
    visited: Arc<dyn VisitedLinks>,
    item_url: Option<Regex>,
    loading: Mutex<HashSet<String>>,
}

impl LinkResolver {
    pub fn new(items: Arc<dyn ItemSource>, visited: Arc<dyn VisitedLinks>) -> Self {
        Self::with_config(LinkResolverConfig::default(), items, visited)
    }

    pub fn with_config(
        config: LinkResolverConfig,
        items: Arc<dyn ItemSource>,
        visited: Arc<dyn VisitedLinks>,
    ) -> Self {
        let item_url = Regex::new(&format!(
            r"(?i)^https?://(?:www\.)?{}/item\?id=(\d+)(?:[&#].*)?$",
            regex::escape(&config.item_host)
        ))
        .ok();

        Self {
            config,
            items,
            visited,
            item_url,
            loading: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &LinkResolverConfig {
        &self.config
    }

    /// Extract the item id of an internal item URL
    pub fn item_id(&self, url: &str) -> Option<u64> {
        self.item_url.as_ref()?.captures(url)?.get(1)?.as_str().parse().ok()
    }

    /// Whether a lookup for this URL is in flight
    pub fn is_loading(&self, url: &str) -> bool {
        lock(&self.loading).contains(url)
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.is_visited(url)
    }

    /// Classify an activated link.
    ///
    /// Returns `None` when a lookup for the same URL is already in flight.
    /// Dropping the returned future abandons the lookup: the loading state
    /// is cleared and nothing is recorded.
    pub async fn resolve_activation(&self, url: &str) -> Option<Activation> {
        let activation = match self.item_id(url) {
            None => Activation::OpenExternal(url.to_string()),
            Some(item_id) => {
                let Some(_guard) = LoadingGuard::acquire(&self.loading, url) else {
                    tracing::debug!(url, "lookup already in flight, ignoring activation");
                    return None;
                };
                self.classify(url, item_id).await
            }
        };

        self.visited.mark_visited(url);
        Some(activation)
    }

    async fn classify(&self, url: &str, item_id: u64) -> Activation {
        match self.lookup(item_id).await {
            Ok(item) => match item.kind {
                ItemKind::Story | ItemKind::Poll => Activation::NavigateInternal {
                    item_id,
                    tab: Tab::Comments,
                },
                // Comments open externally until in-app threads support them
                kind => {
                    tracing::debug!(item_id, ?kind, "item kind not opened in-app");
                    Activation::OpenExternal(url.to_string())
                }
            },
            Err(error) => {
                tracing::debug!(item_id, %error, "falling back to external open");
                Activation::OpenExternal(url.to_string())
            }
        }
    }

    async fn lookup(&self, item_id: u64) -> Result<MinimalItem> {
        tracing::debug!(item_id, "looking up item kind");
        tokio::time::timeout(self.config.timeout, self.items.fetch_minimal_item(item_id))
            .await
            .map_err(|_| HyperviewError::Timeout(self.config.timeout))?
    }

    /// Resolve an activation and hand it to the navigator
    pub async fn activate(&self, url: &str, navigator: &dyn Navigator) -> Option<Activation> {
        let activation = self.resolve_activation(url).await?;
        self.dispatch(&activation, navigator);
        Some(activation)
    }

    /// Long-press: always share, never looks anything up
    pub fn secondary_activation(&self, url: &str) -> Activation {
        Activation::Share(url.to_string())
    }

    pub fn share(&self, url: &str, navigator: &dyn Navigator) -> Activation {
        let activation = self.secondary_activation(url);
        self.dispatch(&activation, navigator);
        activation
    }

    fn dispatch(&self, activation: &Activation, navigator: &dyn Navigator) {
        match activation {
            Activation::NavigateInternal { item_id, tab } => navigator.navigate(
                &self.config.route_name,
                &RouteParams {
                    id: *item_id,
                    tab: *tab,
                },
            ),
            Activation::OpenExternal(url) => navigator.open_external(url),
            Activation::Share(url) => navigator.share(url),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Marks a URL as loading for as long as it lives
struct LoadingGuard<'a> {
    loading: &'a Mutex<HashSet<String>>,
    url: String,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(loading: &'a Mutex<HashSet<String>>, url: &str) -> Option<Self> {
        if !lock(loading).insert(url.to_string()) {
            return None;
        }
        Some(Self {
            loading,
            url: url.to_string(),
        })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        lock(self.loading).remove(&self.url);
    }
}

/// Memoizes successful lookups of another item source
pub struct CachedItemSource<S> {
    inner: S,
    cache: Mutex<HashMap<u64, MinimalItem>>,
}

impl<S: ItemSource> CachedItemSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached(&self, id: u64) -> Option<MinimalItem> {
        lock(&self.cache).get(&id).cloned()
    }
}

#[async_trait]
impl<S: ItemSource> ItemSource for CachedItemSource<S> {
    async fn fetch_minimal_item(&self, id: u64) -> Result<MinimalItem> {
        if let Some(item) = self.cached(id) {
            return Ok(item);
        }
        let item = self.inner.fetch_minimal_item(id).await?;
        lock(&self.cache).insert(id, item.clone());
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visited::RecentLinks;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const STORY_URL: &str = "https://news.ycombinator.com/item?id=8863";

    struct StaticItems {
        kinds: HashMap<u64, ItemKind>,
        calls: AtomicUsize,
    }

    impl StaticItems {
        fn new(items: &[(u64, ItemKind)]) -> Self {
            Self {
                kinds: items.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ItemSource for StaticItems {
        async fn fetch_minimal_item(&self, id: u64) -> Result<MinimalItem> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.kinds
                .get(&id)
                .map(|kind| MinimalItem { id, kind: *kind })
                .ok_or_else(|| HyperviewError::Lookup(format!("no item {}", id)))
        }
    }

    #[async_trait]
    impl ItemSource for Arc<StaticItems> {
        async fn fetch_minimal_item(&self, id: u64) -> Result<MinimalItem> {
            self.as_ref().fetch_minimal_item(id).await
        }
    }

    struct SlowItems(Duration);

    #[async_trait]
    impl ItemSource for SlowItems {
        async fn fetch_minimal_item(&self, id: u64) -> Result<MinimalItem> {
            tokio::time::sleep(self.0).await;
            Ok(MinimalItem {
                id,
                kind: ItemKind::Story,
            })
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        calls: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route_name: &str, params: &RouteParams) {
            lock(&self.calls).push(format!("navigate {} {} {}", route_name, params.id, params.tab.as_str()));
        }
        fn open_external(&self, url: &str) {
            lock(&self.calls).push(format!("open {}", url));
        }
        fn share(&self, url: &str) {
            lock(&self.calls).push(format!("share {}", url));
        }
    }

    fn resolver(items: impl ItemSource + 'static) -> (LinkResolver, Arc<RecentLinks>) {
        let visited = Arc::new(RecentLinks::new());
        (LinkResolver::new(Arc::new(items), visited.clone()), visited)
    }

    #[test]
    fn test_item_id() {
        let (resolver, _) = resolver(StaticItems::new(&[]));
        assert_eq!(resolver.item_id(STORY_URL), Some(8863));
        assert_eq!(resolver.item_id("http://news.ycombinator.com/item?id=1&p=2"), Some(1));
        assert_eq!(resolver.item_id("https://www.news.ycombinator.com/item?id=7"), Some(7));
        assert_eq!(resolver.item_id("https://news.ycombinator.com/user?id=pg"), None);
        assert_eq!(resolver.item_id("https://example.com/item?id=1"), None);
    }

    #[test]
    fn test_minimal_item_from_json() {
        let item = MinimalItem::from_json(r#"{"id": 1, "type": "poll", "by": "pg", "kids": [2]}"#).unwrap();
        assert_eq!(item, MinimalItem { id: 1, kind: ItemKind::Poll });

        let item = MinimalItem::from_json(r#"{"id": 2, "type": "pollopt"}"#).unwrap();
        assert_eq!(item.kind, ItemKind::Other);

        assert!(matches!(
            MinimalItem::from_json("{}"),
            Err(HyperviewError::Payload(_))
        ));
    }

    #[tokio::test]
    async fn test_story_navigates_internally() {
        let (resolver, visited) = resolver(StaticItems::new(&[(8863, ItemKind::Story)]));
        let activation = resolver.resolve_activation(STORY_URL).await;
        assert_eq!(
            activation,
            Some(Activation::NavigateInternal {
                item_id: 8863,
                tab: Tab::Comments
            })
        );
        assert!(visited.is_visited(STORY_URL));
        assert!(!resolver.is_loading(STORY_URL));
    }

    #[tokio::test]
    async fn test_poll_navigates_internally() {
        let (resolver, _) = resolver(StaticItems::new(&[(8863, ItemKind::Poll)]));
        assert!(matches!(
            resolver.resolve_activation(STORY_URL).await,
            Some(Activation::NavigateInternal { item_id: 8863, .. })
        ));
    }

    #[tokio::test]
    async fn test_comment_opens_externally() {
        let (resolver, _) = resolver(StaticItems::new(&[(8863, ItemKind::Comment)]));
        assert_eq!(
            resolver.resolve_activation(STORY_URL).await,
            Some(Activation::OpenExternal(STORY_URL.to_string()))
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_opens_externally() {
        let (resolver, visited) = resolver(StaticItems::new(&[]));
        assert_eq!(
            resolver.resolve_activation(STORY_URL).await,
            Some(Activation::OpenExternal(STORY_URL.to_string()))
        );
        assert!(visited.is_visited(STORY_URL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_timeout_opens_externally() {
        let (resolver, _) = resolver(SlowItems(Duration::from_secs(5)));
        assert_eq!(
            resolver.resolve_activation(STORY_URL).await,
            Some(Activation::OpenExternal(STORY_URL.to_string()))
        );
    }

    #[tokio::test]
    async fn test_external_url_skips_lookup() {
        let items = Arc::new(StaticItems::new(&[]));
        let (resolver, visited) = resolver(items.clone());
        let url = "https://example.com/article";
        assert_eq!(
            resolver.resolve_activation(url).await,
            Some(Activation::OpenExternal(url.to_string()))
        );
        assert_eq!(items.calls.load(Ordering::SeqCst), 0);
        assert!(visited.is_visited(url));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reactivation_while_loading_is_ignored() {
        let (resolver, _) = resolver(SlowItems(Duration::from_millis(500)));
        let resolver = Arc::new(resolver);

        let first = tokio::spawn({
            let resolver = resolver.clone();
            async move { resolver.resolve_activation(STORY_URL).await }
        });
        while !resolver.is_loading(STORY_URL) {
            tokio::task::yield_now().await;
        }

        assert_eq!(resolver.resolve_activation(STORY_URL).await, None);
        assert!(matches!(
            first.await.unwrap(),
            Some(Activation::NavigateInternal { .. })
        ));
        assert!(!resolver.is_loading(STORY_URL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_lookup_clears_loading() {
        let (resolver, visited) = resolver(SlowItems(Duration::from_millis(500)));
        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), resolver.resolve_activation(STORY_URL)).await;
        assert!(abandoned.is_err());
        assert!(!resolver.is_loading(STORY_URL));
        assert!(!visited.is_visited(STORY_URL));
    }

    #[tokio::test]
    async fn test_activate_dispatches() {
        let (resolver, _) = resolver(StaticItems::new(&[(8863, ItemKind::Story)]));
        let navigator = RecordingNavigator::default();

        resolver.activate(STORY_URL, &navigator).await;
        resolver.activate("https://example.com", &navigator).await;
        resolver.share(STORY_URL, &navigator);

        assert_eq!(
            *lock(&navigator.calls),
            vec![
                "navigate StoryModal 8863 comments".to_string(),
                "open https://example.com".to_string(),
                format!("share {}", STORY_URL),
            ]
        );
    }

    #[test]
    fn test_secondary_activation_always_shares() {
        let (resolver, visited) = resolver(StaticItems::new(&[(8863, ItemKind::Story)]));
        assert_eq!(
            resolver.secondary_activation(STORY_URL),
            Activation::Share(STORY_URL.to_string())
        );
        assert!(!visited.is_visited(STORY_URL));
    }

    #[tokio::test]
    async fn test_cached_item_source() {
        let items = Arc::new(StaticItems::new(&[(1, ItemKind::Story)]));
        let cached = CachedItemSource::new(items.clone());

        assert_eq!(cached.fetch_minimal_item(1).await.unwrap().kind, ItemKind::Story);
        assert_eq!(cached.fetch_minimal_item(1).await.unwrap().kind, ItemKind::Story);
        assert_eq!(items.calls.load(Ordering::SeqCst), 1);

        assert!(cached.fetch_minimal_item(2).await.is_err());
        assert!(cached.fetch_minimal_item(2).await.is_err());
        assert_eq!(items.calls.load(Ordering::SeqCst), 3);
        assert_eq!(cached.cached(2), None);
    }
}
