//! # Debounced Autosave
//!
//! Writes the document to a fixed location once edits pause for the
//! coalescing interval. Each change re-arms the timer, so a burst of edits
//! produces one write containing the final state. Write failures are logged
//! and otherwise ignored; nothing is retried.

use crate::codec;
use crate::config::EditorConfig;
use crate::controller::{DocumentController, DocumentEvent, Subscription};
use crate::fetcher::ImageFetcher;
use crate::model::EmojiArt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct Autosaver {
    path: PathBuf,
    interval: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Autosaver {
    pub fn new(path: PathBuf, interval: Duration) -> Self {
        Self {
            path,
            interval,
            pending: None,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.autosave_path(), config.autosave_interval())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// (Re)start the timer with `model` as the state to write
    pub fn schedule(&mut self, model: &EmojiArt) {
        self.cancel();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No async runtime available, autosave skipped");
                return;
            }
        };

        let snapshot = model.clone();
        let path = self.path.clone();
        let interval = self.interval;
        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(interval).await;
            write_autosave(&snapshot, &path);
        }));
    }

    /// True while a write is scheduled but has not happened yet
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Drop the scheduled write, if any
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            if !task.is_finished() {
                debug!("Autosave rescheduled");
            }
            task.abort();
        }
    }

    /// Schedule a save on every model change of `controller`
    pub fn attach(mut self, controller: &mut DocumentController) -> Subscription {
        controller.subscribe(move |event| {
            if let DocumentEvent::ModelChanged { model, .. } = event {
                self.schedule(model);
            }
        })
    }
}

fn write_autosave(model: &EmojiArt, path: &Path) {
    match codec::encode_to_file(model, path) {
        Ok(bytes) => info!(path = %path.display(), bytes, "Autosaved document"),
        Err(e) => warn!(path = %path.display(), error = %e, "Autosave failed"),
    }
}

/// Single-document setup: restore from the autosave location and keep it
/// updated from then on.
pub fn open_autosaving(fetcher: Arc<dyn ImageFetcher>, config: &EditorConfig) -> DocumentController {
    let mut controller = DocumentController::restore_autosaved(fetcher, config);
    Autosaver::from_config(config).attach(&mut controller);
    controller
}
