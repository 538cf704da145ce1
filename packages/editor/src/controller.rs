//! # Document Controller
//!
//! Owns one [`EmojiArt`] model together with its derived background image
//! and fetch status, and is the only way to edit them.
//!
//! Every edit goes through the same procedure:
//!
//! ```text
//! snapshot current → compute next → install next → record inverse
//!                                        ↓
//!                             notify observers (sync)
//!                                        ↓
//!                        background changed? → resolver.resolve()
//! ```
//!
//! Undo and redo run that same procedure with "restore snapshot" as the
//! edit, which is why undoing an undo is a redo.
//!
//! The controller is single-owner state: intents and resolver completions are
//! applied on whichever context holds `&mut DocumentController`. Fetches run
//! in the background, but their results only land through [`pump`] or
//! [`settle`].
//!
//! [`pump`]: DocumentController::pump
//! [`settle`]: DocumentController::settle

use crate::codec;
use crate::config::EditorConfig;
use crate::errors::CodecError;
use crate::fetcher::ImageFetcher;
use crate::intent::{Applied, Intent, IntentError};
use crate::model::{Background, Emoji, EmojiArt};
use crate::resolver::{BackgroundImage, BackgroundResolver, Completion, FetchStatus, ResolverState};
use crate::undo_stack::{UndoEntry, UndoStack};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// State change published to observers
#[derive(Debug)]
pub enum DocumentEvent<'a> {
    ModelChanged {
        model: &'a EmojiArt,
        operation: &'a str,
    },
    BackgroundImageChanged(Option<&'a BackgroundImage>),
    FetchStatusChanged(&'a FetchStatus),
}

pub type Observer = Box<dyn FnMut(&DocumentEvent<'_>) + Send>;

/// Handle returned by [`DocumentController::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Where the inverse of the edit being installed goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Registration {
    Edit,
    Undo,
    Redo,
}

pub struct DocumentController {
    model: EmojiArt,
    resolver: BackgroundResolver,
    undo: UndoStack,
    registration: Registration,
    observers: Vec<(Subscription, Observer)>,
    next_subscription: u64,
}

impl DocumentController {
    /// Blank document with default settings
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self::with_config(fetcher, &EditorConfig::default())
    }

    pub fn with_config(fetcher: Arc<dyn ImageFetcher>, config: &EditorConfig) -> Self {
        Self {
            model: EmojiArt::new(),
            resolver: BackgroundResolver::new(fetcher),
            undo: UndoStack::with_max_levels(config.undo_levels),
            registration: Registration::Edit,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Controller for a loaded model. No undo history; the background starts
    /// resolving immediately.
    pub fn from_model(
        model: EmojiArt,
        fetcher: Arc<dyn ImageFetcher>,
        config: &EditorConfig,
    ) -> Self {
        let mut controller = Self::with_config(fetcher, config);
        controller.model = model;
        controller.resolver.resolve(controller.model.background());
        controller
    }

    /// Controller for the document at the autosave location, or a blank one
    /// if there is nothing usable there.
    pub fn restore_autosaved(fetcher: Arc<dyn ImageFetcher>, config: &EditorConfig) -> Self {
        let path = config.autosave_path();
        match codec::decode_file(&path) {
            Ok(model) => {
                info!(
                    path = %path.display(),
                    emojis = model.emojis().len(),
                    background = model.background().kind(),
                    "Restored autosaved document"
                );
                Self::from_model(model, fetcher, config)
            }
            Err(CodecError::NotFound(_)) => {
                debug!(path = %path.display(), "No autosaved document");
                Self::with_config(fetcher, config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable autosave");
                Self::with_config(fetcher, config)
            }
        }
    }

    // --- Read accessors

    pub fn model(&self) -> &EmojiArt {
        &self.model
    }

    pub fn emojis(&self) -> &[Emoji] {
        self.model.emojis()
    }

    pub fn background(&self) -> &Background {
        self.model.background()
    }

    pub fn background_image(&self) -> Option<&BackgroundImage> {
        self.resolver.image()
    }

    pub fn background_fetch_status(&self) -> FetchStatus {
        self.resolver.status()
    }

    pub fn resolver_state(&self) -> &ResolverState {
        self.resolver.state()
    }

    // --- Intents

    pub fn set_background(&mut self, background: Background) {
        self.edit("Set Background", |doc| doc.set_background(background));
    }

    pub fn add_emoji(&mut self, text: impl Into<String>, at: (i32, i32), size: i32) -> Emoji {
        let text = text.into();
        self.edit("Add Emoji", |doc| doc.add_emoji(text, at, size))
    }

    /// Offset `emoji` by `by`. Returns `false`, recording nothing, if the
    /// emoji is no longer in the document.
    pub fn move_emoji(&mut self, emoji: &Emoji, by: (i32, i32)) -> bool {
        self.apply_or_skip(Intent::MoveEmoji {
            id: emoji.id,
            dx: by.0,
            dy: by.1,
        })
    }

    /// Rescale `emoji` by `factor`. Returns `false`, recording nothing, if
    /// the emoji is no longer in the document.
    pub fn scale_emoji(&mut self, emoji: &Emoji, factor: f64) -> bool {
        self.apply_or_skip(Intent::ScaleEmoji { id: emoji.id, factor })
    }

    /// Apply any intent. A failed intent leaves the document and the undo
    /// history untouched.
    pub fn apply(&mut self, intent: Intent) -> Result<Applied, IntentError> {
        let mut next = self.model.clone();
        let applied = intent.apply(&mut next)?;
        debug!(intent = intent.name(), "Applying intent");
        self.install(next, intent.name());
        Ok(applied)
    }

    fn apply_or_skip(&mut self, intent: Intent) -> bool {
        match self.apply(intent) {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Intent skipped");
                false
            }
        }
    }

    fn edit<R>(&mut self, operation: &str, f: impl FnOnce(&mut EmojiArt) -> R) -> R {
        let mut next = self.model.clone();
        let result = f(&mut next);
        debug!(intent = operation, "Applying intent");
        self.install(next, operation);
        result
    }

    fn install(&mut self, next: EmojiArt, operation: &str) {
        let previous = std::mem::replace(&mut self.model, next);
        let background_changed = previous.background() != self.model.background();

        let entry = UndoEntry::new(operation, previous);
        match self.registration {
            Registration::Edit => self.undo.record(entry),
            Registration::Undo => self.undo.push_redo(entry),
            Registration::Redo => self.undo.push_undo(entry),
        }

        notify(
            &mut self.observers,
            &DocumentEvent::ModelChanged {
                model: &self.model,
                operation,
            },
        );

        if background_changed {
            debug!(background = self.model.background().kind(), "Background changed");
            let status_before = self.resolver.status();
            let image_before = self.resolver.image().cloned();
            self.resolver.resolve(self.model.background());
            self.publish_resolution(status_before, image_before);
        }
    }

    fn publish_resolution(&mut self, status_before: FetchStatus, image_before: Option<BackgroundImage>) {
        let image_changed = match (image_before.as_ref(), self.resolver.image()) {
            (None, None) => false,
            (Some(before), Some(after)) => !Arc::ptr_eq(before, after),
            _ => true,
        };
        if image_changed {
            notify(
                &mut self.observers,
                &DocumentEvent::BackgroundImageChanged(self.resolver.image()),
            );
        }

        let status = self.resolver.status();
        if status != status_before {
            notify(&mut self.observers, &DocumentEvent::FetchStatusChanged(&status));
        }
    }

    // --- Undo / redo

    /// Revert the most recent edit. Returns `false` if there is none.
    pub fn undo(&mut self) -> bool {
        self.undo.close_group();
        let Some(entry) = self.undo.pop_undo() else {
            return false;
        };

        debug!(operation = %entry.name, "Undo");
        self.registration = Registration::Undo;
        self.install(entry.snapshot, &entry.name);
        self.registration = Registration::Edit;
        true
    }

    /// Reapply the most recently undone edit. Returns `false` if there is none.
    pub fn redo(&mut self) -> bool {
        self.undo.close_group();
        let Some(entry) = self.undo.pop_redo() else {
            return false;
        };

        debug!(operation = %entry.name, "Redo");
        self.registration = Registration::Redo;
        self.install(entry.snapshot, &entry.name);
        self.registration = Registration::Edit;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo_name(&self) -> Option<&str> {
        self.undo.undo_name()
    }

    pub fn redo_name(&self) -> Option<&str> {
        self.undo.redo_name()
    }

    /// Treat the following edits as one undo step named `name`, until
    /// [`end_group`](Self::end_group).
    pub fn begin_group(&mut self, name: impl Into<String>) {
        self.undo.begin_group(name);
    }

    pub fn end_group(&mut self) {
        self.undo.end_group();
    }

    // --- Observers

    /// Register an observer, called synchronously after every state change
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&DocumentEvent<'_>) + Send + 'static,
    ) -> Subscription {
        self.next_subscription += 1;
        let subscription = Subscription(self.next_subscription);
        self.observers.push((subscription, Box::new(observer)));
        subscription
    }

    /// Returns `false` if the subscription was already removed
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _)| *id != subscription);
        self.observers.len() != before
    }

    // --- Background completions

    /// Apply fetch results that have already arrived, without waiting.
    /// Returns how many changed the document's derived state.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.resolver.try_next_completion() {
            if self.apply_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait until the current background has finished resolving
    pub async fn settle(&mut self) {
        while self.resolver.is_fetching() {
            match self.resolver.next_completion().await {
                Some(completion) => {
                    self.apply_completion(completion);
                }
                None => break,
            }
        }
    }

    fn apply_completion(&mut self, completion: Completion) -> bool {
        let status_before = self.resolver.status();
        let image_before = self.resolver.image().cloned();
        if !self.resolver.apply(completion) {
            return false;
        }
        self.publish_resolution(status_before, image_before);
        true
    }
}

fn notify(observers: &mut [(Subscription, Observer)], event: &DocumentEvent<'_>) {
    for (_, observer) in observers.iter_mut() {
        observer(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use async_trait::async_trait;
    use reqwest::Url;
    use std::sync::Mutex;

    struct OfflineFetcher;

    #[async_trait]
    impl ImageFetcher for OfflineFetcher {
        async fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Transport("offline".to_string()))
        }
    }

    struct PanickingFetcher;

    #[async_trait]
    impl ImageFetcher for PanickingFetcher {
        async fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
            panic!("fetcher blew up");
        }
    }

    fn controller() -> DocumentController {
        DocumentController::new(Arc::new(OfflineFetcher))
    }

    fn recorded(controller: &mut DocumentController) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        controller.subscribe(move |event| {
            let line = match event {
                DocumentEvent::ModelChanged { operation, .. } => format!("model:{}", operation),
                DocumentEvent::BackgroundImageChanged(image) => format!("image:{}", image.is_some()),
                DocumentEvent::FetchStatusChanged(status) => format!("status:{:?}", status),
            };
            sink.lock().unwrap().push(line);
        });
        log
    }

    #[test]
    fn test_intents_record_named_undo_entries() {
        let mut controller = controller();
        let emoji = controller.add_emoji("😀", (0, 0), 40);
        assert_eq!(controller.undo_name(), Some("Add Emoji"));

        controller.move_emoji(&emoji, (1, 1));
        assert_eq!(controller.undo_name(), Some("Move Emoji"));

        controller.scale_emoji(&emoji, 2.0);
        assert_eq!(controller.undo_name(), Some("Scale Emoji"));
    }

    #[test]
    fn test_missing_emoji_is_a_no_op() {
        let mut controller = controller();
        let emoji = controller.add_emoji("😀", (0, 0), 40);
        controller.undo();
        assert!(controller.emojis().is_empty());

        let redo_before = controller.can_redo();
        assert!(!controller.move_emoji(&emoji, (5, 5)));
        assert!(!controller.scale_emoji(&emoji, 3.0));
        assert!(!controller.can_undo());
        assert_eq!(controller.can_redo(), redo_before);
    }

    #[test]
    fn test_undo_of_undo_is_redo() {
        let mut controller = controller();
        let emoji = controller.add_emoji("🎯", (10, 10), 40);
        controller.move_emoji(&emoji, (5, 0));
        let after_move = controller.model().clone();

        assert!(controller.undo());
        assert_eq!(controller.redo_name(), Some("Move Emoji"));
        assert!(controller.redo());
        assert_eq!(controller.model(), &after_move);
        assert_eq!(controller.undo_name(), Some("Move Emoji"));
    }

    #[test]
    fn test_new_edit_after_undo_clears_redo() {
        let mut controller = controller();
        let emoji = controller.add_emoji("🎯", (10, 10), 40);
        controller.move_emoji(&emoji, (5, 0));
        controller.undo();
        assert!(controller.can_redo());

        controller.scale_emoji(&emoji, 1.5);
        assert!(!controller.can_redo());
    }

    #[test]
    fn test_identical_edit_still_records_undo() {
        let mut controller = controller();
        let emoji = controller.add_emoji("🎯", (10, 10), 40);
        let before = controller.model().clone();

        assert!(controller.scale_emoji(&emoji, 1.0));
        assert_eq!(controller.model(), &before);
        assert_eq!(controller.undo_name(), Some("Scale Emoji"));
    }

    #[test]
    fn test_grouped_gesture_undoes_in_one_step() {
        let mut controller = controller();
        let emoji = controller.add_emoji("🎯", (0, 0), 40);
        let before_drag = controller.model().clone();

        controller.begin_group("Drag Emoji");
        for _ in 0..4 {
            controller.move_emoji(&emoji, (2, 3));
        }
        controller.end_group();

        assert_eq!(controller.emojis()[0].x, 8);
        assert_eq!(controller.undo_name(), Some("Drag Emoji"));
        controller.undo();
        assert_eq!(controller.model(), &before_drag);
    }

    #[test]
    fn test_edit_inside_group_drops_redo_immediately() {
        let mut controller = controller();
        let emoji = controller.add_emoji("🎯", (0, 0), 40);
        controller.scale_emoji(&emoji, 2.0);
        controller.undo();
        assert_eq!(controller.redo_name(), Some("Scale Emoji"));

        controller.begin_group("Drag Emoji");
        controller.move_emoji(&emoji, (1, 1));
        assert!(!controller.can_redo());
        assert_eq!(controller.redo_name(), None);
        controller.end_group();

        assert_eq!(controller.undo_name(), Some("Drag Emoji"));
    }

    #[test]
    fn test_observers_notified_synchronously() {
        let mut controller = controller();
        let log = recorded(&mut controller);

        controller.add_emoji("🙂", (0, 0), 40);
        controller.undo();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["model:Add Emoji".to_string(), "model:Add Emoji".to_string()]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut controller = controller();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let subscription = controller.subscribe(move |_| *counter.lock().unwrap() += 1);

        controller.add_emoji("🙂", (0, 0), 40);
        assert!(controller.unsubscribe(subscription));
        assert!(!controller.unsubscribe(subscription));
        controller.add_emoji("🙂", (0, 0), 40);

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_emoji_edits_do_not_touch_background_state() {
        let mut controller = controller();
        let log = recorded(&mut controller);
        let emoji = controller.add_emoji("🙂", (0, 0), 40);
        controller.move_emoji(&emoji, (1, 1));

        let log = log.lock().unwrap();
        assert!(log.iter().all(|line| line.starts_with("model:")));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_published() {
        let mut controller = controller();
        let log = recorded(&mut controller);
        let url = Url::parse("https://example.com/bg.png").unwrap();

        controller.set_background(Background::Url(url.clone()));
        assert_eq!(controller.background_fetch_status(), FetchStatus::Fetching);

        controller.settle().await;
        assert_eq!(controller.background_fetch_status(), FetchStatus::Failed(url.clone()));
        assert!(controller.background_image().is_none());

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "model:Set Background".to_string(),
                "status:Fetching".to_string(),
                format!("status:{:?}", FetchStatus::Failed(url)),
            ]
        );
    }

    #[tokio::test]
    async fn test_settle_returns_when_fetch_task_panics() {
        let mut controller = DocumentController::new(Arc::new(PanickingFetcher));
        let log = recorded(&mut controller);
        let url = Url::parse("https://example.com/boom.png").unwrap();

        controller.set_background(Background::Url(url.clone()));
        controller.settle().await;

        assert_eq!(controller.background_fetch_status(), FetchStatus::Failed(url.clone()));
        assert_eq!(
            log.lock().unwrap().last().cloned(),
            Some(format!("status:{:?}", FetchStatus::Failed(url)))
        );
    }
}
