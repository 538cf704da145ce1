//! Shared fixtures for editor integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use emoji_art_editor::{DynamicImage, FetchError, ImageFetcher, Url};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub type Response = Result<Vec<u8>, FetchError>;

/// Fetcher whose responses are released by the test, one gate per URL.
/// Unscripted URLs fail with a transport error.
#[derive(Default)]
pub struct GatedFetcher {
    gates: Mutex<HashMap<String, oneshot::Receiver<Response>>>,
    calls: Mutex<Vec<Url>>,
}

impl GatedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script the next fetch of `url`; the returned sender releases it
    pub fn gate(&self, url: &Url) -> oneshot::Sender<Response> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(url.to_string(), rx);
        tx
    }

    /// URLs fetched so far, in order
    pub fn calls(&self) -> Vec<Url> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for GatedFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(url.clone());
        let gate = self.gates.lock().unwrap().remove(url.as_str());
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Transport("gate dropped".to_string()))),
            None => Err(FetchError::Transport("no response scripted".to_string())),
        }
    }
}

pub fn url(name: &str) -> Url {
    Url::parse(&format!("https://images.example.com/{}", name)).unwrap()
}

/// PNG bytes of a blank image
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::new_rgba8(width, height)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Let spawned tasks on the current-thread runtime make progress
pub async fn run_pending() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
