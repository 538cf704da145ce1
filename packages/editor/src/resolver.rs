//! # Background Resolver
//!
//! Turns a [`Background`] into a decoded image plus a fetch status.
//!
//! ```text
//!            resolve(blank | imageData)
//!   ┌──────────────────────────────────────────┐
//!   ↓                                          │
//! Idle / Resolved ──resolve(url)──→ Fetching(url) ──ok──→ Resolved
//!                                        │
//!                                        └──err──→ Failed(url)
//! ```
//!
//! URL fetches run as tokio tasks. Their results come back through a channel
//! and are only applied by the owner via [`BackgroundResolver::apply`], on
//! the owner's context. Every `resolve` issues a new [`ResolveToken`] and
//! aborts the previous task; a completion carrying any other token is
//! discarded, so a slow response for an old URL can never overwrite a newer
//! result.

use crate::fetcher::ImageFetcher;
use crate::model::Background;
use image::DynamicImage;
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Decoded background, shared cheaply with observers
pub type BackgroundImage = Arc<DynamicImage>;

/// Progress indicator published alongside the document. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Fetching,
    Failed(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    /// Nothing to show, or inline data that did not decode
    Idle,
    Fetching(Url),
    /// An image is available
    Resolved,
    Failed(Url),
}

impl ResolverState {
    pub fn fetch_status(&self) -> FetchStatus {
        match self {
            ResolverState::Idle | ResolverState::Resolved => FetchStatus::Idle,
            ResolverState::Fetching(_) => FetchStatus::Fetching,
            ResolverState::Failed(url) => FetchStatus::Failed(url.clone()),
        }
    }
}

/// Identifies one `resolve` call. Strictly increasing per resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolveToken(u64);

/// Result of a finished fetch task, waiting to be applied
#[derive(Debug)]
pub struct Completion {
    token: ResolveToken,
    url: Url,
    image: Option<DynamicImage>,
}

impl Completion {
    pub fn token(&self) -> ResolveToken {
        self.token
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

pub struct BackgroundResolver {
    fetcher: Arc<dyn ImageFetcher>,
    state: ResolverState,
    image: Option<BackgroundImage>,
    latest: ResolveToken,
    in_flight: Option<JoinHandle<()>>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl BackgroundResolver {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            state: ResolverState::Idle,
            image: None,
            latest: ResolveToken(0),
            in_flight: None,
            completions_tx,
            completions_rx,
        }
    }

    /// Start resolving `background`, superseding any earlier request.
    ///
    /// Blank and inline backgrounds settle synchronously. URL backgrounds
    /// enter `Fetching` and spawn a task on the current tokio runtime; without
    /// a runtime the fetch fails immediately.
    pub fn resolve(&mut self, background: &Background) -> ResolveToken {
        self.cancel_in_flight();
        self.latest = ResolveToken(self.latest.0 + 1);
        let token = self.latest;

        match background {
            Background::Blank => {
                debug!(token = token.0, "Background cleared");
                self.image = None;
                self.state = ResolverState::Idle;
            }
            Background::ImageData(bytes) => match image::load_from_memory(bytes) {
                Ok(image) => {
                    debug!(
                        token = token.0,
                        width = image.width(),
                        height = image.height(),
                        "Decoded inline background"
                    );
                    self.image = Some(Arc::new(image));
                    self.state = ResolverState::Resolved;
                }
                Err(e) => {
                    // Not surfaced as a failure: the document just has no image
                    debug!(token = token.0, error = %e, "Inline background did not decode");
                    self.image = None;
                    self.state = ResolverState::Idle;
                }
            },
            Background::Url(url) => {
                self.image = None;
                self.state = ResolverState::Fetching(url.clone());
                self.spawn_fetch(token, url.clone());
            }
        }

        token
    }

    fn spawn_fetch(&mut self, token: ResolveToken, url: Url) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(%url, "No async runtime available, cannot fetch background");
                self.state = ResolverState::Failed(url);
                return;
            }
        };

        info!(%url, token = token.0, "Fetching background");

        let fetcher = Arc::clone(&self.fetcher);
        let reply = CompletionSender {
            token,
            url: Some(url.clone()),
            completions: self.completions_tx.clone(),
        };
        self.in_flight = Some(runtime.spawn(async move {
            let image = fetch_and_decode(fetcher.as_ref(), &url).await;
            reply.send(image);
        }));
    }

    fn cancel_in_flight(&mut self) {
        if let Some(task) = self.in_flight.take() {
            if !task.is_finished() {
                debug!(token = self.latest.0, "Cancelling superseded background fetch");
            }
            task.abort();
        }
    }

    /// Apply a finished fetch. Returns `false`, leaving state untouched, when
    /// the completion belongs to a superseded request.
    pub fn apply(&mut self, completion: Completion) -> bool {
        let awaiting = matches!(self.state, ResolverState::Fetching(_));
        if completion.token != self.latest || !awaiting {
            debug!(
                token = completion.token.0,
                latest = self.latest.0,
                url = %completion.url,
                "Discarding stale background fetch"
            );
            return false;
        }

        self.in_flight = None;
        match completion.image {
            Some(image) => {
                info!(
                    url = %completion.url,
                    width = image.width(),
                    height = image.height(),
                    "Background resolved"
                );
                self.image = Some(Arc::new(image));
                self.state = ResolverState::Resolved;
            }
            None => {
                self.image = None;
                self.state = ResolverState::Failed(completion.url);
            }
        }
        true
    }

    /// A completion that has already arrived, if any
    pub fn try_next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.try_recv().ok()
    }

    /// Wait for the next completion, stale or not
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.state, ResolverState::Fetching(_))
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    pub fn status(&self) -> FetchStatus {
        self.state.fetch_status()
    }

    pub fn image(&self) -> Option<&BackgroundImage> {
        self.image.as_ref()
    }

    pub fn latest_token(&self) -> ResolveToken {
        self.latest
    }
}

impl Drop for BackgroundResolver {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

/// Delivers exactly one completion per fetch task. A task that ends without
/// sending (a panicking fetcher, an abort) reports a failure on drop, so the
/// resolver never waits on a fetch that no longer exists.
struct CompletionSender {
    token: ResolveToken,
    url: Option<Url>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl CompletionSender {
    fn send(mut self, image: Option<DynamicImage>) {
        self.deliver(image);
    }

    fn deliver(&mut self, image: Option<DynamicImage>) {
        if let Some(url) = self.url.take() {
            // Send only fails once the resolver is gone
            let _ = self.completions.send(Completion {
                token: self.token,
                url,
                image,
            });
        }
    }
}

impl Drop for CompletionSender {
    fn drop(&mut self) {
        self.deliver(None);
    }
}

async fn fetch_and_decode(fetcher: &dyn ImageFetcher, url: &Url) -> Option<DynamicImage> {
    let bytes = match fetcher.fetch(url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(%url, error = %e, "Background fetch failed");
            return None;
        }
    };

    match tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await {
        Ok(Ok(image)) => Some(image),
        Ok(Err(e)) => {
            warn!(%url, error = %e, "Fetched background is not a decodable image");
            None
        }
        Err(e) => {
            warn!(%url, error = %e, "Background decode task failed");
            None
        }
    }
}
