//! Background resolution as seen through the document controller: status
//! transitions, supersession of in-flight fetches, and re-resolution on undo.

mod common;

use common::{png, run_pending, url, GatedFetcher};
use emoji_art_editor::{
    Background, DocumentController, DocumentEvent, FetchError, FetchStatus, ResolverState,
};
use std::sync::{Arc, Mutex};

fn status_log(doc: &mut DocumentController) -> Arc<Mutex<Vec<FetchStatus>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    doc.subscribe(move |event| {
        if let DocumentEvent::FetchStatusChanged(status) = event {
            sink.lock().unwrap().push((*status).clone());
        }
    });
    log
}

fn image_size(doc: &DocumentController) -> Option<(u32, u32)> {
    doc.background_image().map(|image| (image.width(), image.height()))
}

#[tokio::test]
async fn test_url_background_resolves_to_image() {
    let fetcher = GatedFetcher::new();
    let sky = url("sky.png");
    let release = fetcher.gate(&sky);
    let mut doc = DocumentController::new(fetcher.clone());
    let statuses = status_log(&mut doc);

    doc.set_background(Background::Url(sky.clone()));
    assert_eq!(doc.background_fetch_status(), FetchStatus::Fetching);
    assert!(doc.background_image().is_none());

    release.send(Ok(png(32, 24))).unwrap();
    doc.settle().await;

    assert_eq!(image_size(&doc), Some((32, 24)));
    assert_eq!(doc.resolver_state(), &ResolverState::Resolved);
    assert_eq!(*statuses.lock().unwrap(), vec![FetchStatus::Fetching, FetchStatus::Idle]);
}

#[tokio::test]
async fn test_later_request_wins_when_it_finishes_first() {
    let fetcher = GatedFetcher::new();
    let (a, b) = (url("a.png"), url("b.png"));
    let release_a = fetcher.gate(&a);
    let release_b = fetcher.gate(&b);
    let mut doc = DocumentController::new(fetcher.clone());

    doc.set_background(Background::Url(a.clone()));
    doc.set_background(Background::Url(b.clone()));

    release_b.send(Ok(png(8, 8))).unwrap();
    doc.settle().await;
    assert_eq!(image_size(&doc), Some((8, 8)));

    // A's fetch was cancelled; even if its response shows up it is ignored
    let _ = release_a.send(Ok(png(2, 2)));
    run_pending().await;
    assert_eq!(doc.pump(), 0);
    assert_eq!(image_size(&doc), Some((8, 8)));
    assert_eq!(doc.background_fetch_status(), FetchStatus::Idle);
}

#[tokio::test]
async fn test_already_delivered_stale_result_is_discarded() {
    let fetcher = GatedFetcher::new();
    let (a, b) = (url("a.png"), url("b.png"));
    let release_a = fetcher.gate(&a);
    let release_b = fetcher.gate(&b);
    let mut doc = DocumentController::new(fetcher.clone());
    let statuses = status_log(&mut doc);

    doc.set_background(Background::Url(a.clone()));
    release_a
        .send(Err(FetchError::Transport("connection reset".to_string())))
        .unwrap();
    // A finishes and queues its failure before B is requested
    run_pending().await;

    doc.set_background(Background::Url(b.clone()));
    assert_eq!(doc.pump(), 0);
    assert_eq!(doc.background_fetch_status(), FetchStatus::Fetching);

    release_b.send(Ok(png(5, 5))).unwrap();
    doc.settle().await;

    assert_eq!(image_size(&doc), Some((5, 5)));
    assert!(statuses
        .lock()
        .unwrap()
        .iter()
        .all(|status| *status != FetchStatus::Failed(a.clone())));
}

#[tokio::test]
async fn test_clearing_background_supersedes_fetch() {
    let fetcher = GatedFetcher::new();
    let a = url("a.png");
    let release_a = fetcher.gate(&a);
    let mut doc = DocumentController::new(fetcher.clone());

    doc.set_background(Background::Url(a));
    run_pending().await;
    doc.set_background(Background::Blank);
    assert_eq!(doc.background_fetch_status(), FetchStatus::Idle);

    let _ = release_a.send(Ok(png(2, 2)));
    run_pending().await;
    doc.pump();
    assert!(doc.background_image().is_none());
    assert_eq!(doc.resolver_state(), &ResolverState::Idle);
}

#[tokio::test]
async fn test_same_url_twice_fetches_once() {
    let fetcher = GatedFetcher::new();
    let sky = url("sky.png");
    let release = fetcher.gate(&sky);
    let mut doc = DocumentController::new(fetcher.clone());
    let statuses = status_log(&mut doc);

    doc.set_background(Background::Url(sky.clone()));
    run_pending().await;
    doc.set_background(Background::Url(sky.clone()));
    assert_eq!(doc.undo_name(), Some("Set Background"));

    release.send(Ok(png(3, 3))).unwrap();
    doc.settle().await;

    assert_eq!(fetcher.calls(), vec![sky]);
    assert_eq!(*statuses.lock().unwrap(), vec![FetchStatus::Fetching, FetchStatus::Idle]);
    assert_eq!(image_size(&doc), Some((3, 3)));
}

#[tokio::test]
async fn test_fetch_failures_mark_background_failed() {
    let fetcher = GatedFetcher::new();
    let missing = url("missing.png");
    let release = fetcher.gate(&missing);
    let mut doc = DocumentController::new(fetcher.clone());

    doc.set_background(Background::Url(missing.clone()));
    release.send(Err(FetchError::Status(404))).unwrap();
    doc.settle().await;

    assert_eq!(doc.background_fetch_status(), FetchStatus::Failed(missing.clone()));
    assert!(doc.background_image().is_none());
    // The document itself is unaffected and stays editable
    assert_eq!(doc.background(), &Background::Url(missing));
    doc.add_emoji("🙈", (0, 0), 40);
    assert_eq!(doc.emojis().len(), 1);
}

#[tokio::test]
async fn test_undecodable_download_marks_background_failed() {
    let fetcher = GatedFetcher::new();
    let page = url("not-an-image.html");
    let release = fetcher.gate(&page);
    let mut doc = DocumentController::new(fetcher.clone());

    doc.set_background(Background::Url(page.clone()));
    release.send(Ok(b"<html>nope</html>".to_vec())).unwrap();
    doc.settle().await;

    assert_eq!(doc.background_fetch_status(), FetchStatus::Failed(page));
    assert!(doc.background_image().is_none());
}

#[test]
fn test_inline_image_data_resolves_synchronously() {
    let mut doc = DocumentController::new(GatedFetcher::new());

    doc.set_background(Background::ImageData(png(6, 7)));
    assert_eq!(image_size(&doc), Some((6, 7)));
    assert_eq!(doc.background_fetch_status(), FetchStatus::Idle);

    // Bad inline data just means no image, not a failure
    doc.set_background(Background::ImageData(vec![0, 1, 2, 3]));
    assert!(doc.background_image().is_none());
    assert_eq!(doc.background_fetch_status(), FetchStatus::Idle);
}

#[tokio::test]
async fn test_undo_and_redo_re_resolve_background() {
    let fetcher = GatedFetcher::new();
    let sky = url("sky.png");
    let mut doc = DocumentController::new(fetcher.clone());

    fetcher.gate(&sky).send(Ok(png(4, 4))).unwrap();
    doc.set_background(Background::Url(sky.clone()));
    doc.settle().await;
    assert_eq!(image_size(&doc), Some((4, 4)));

    doc.undo();
    assert_eq!(doc.background(), &Background::Blank);
    assert!(doc.background_image().is_none());
    assert_eq!(doc.background_fetch_status(), FetchStatus::Idle);

    let release = fetcher.gate(&sky);
    doc.redo();
    assert_eq!(doc.background_fetch_status(), FetchStatus::Fetching);
    release.send(Ok(png(9, 9))).unwrap();
    doc.settle().await;

    assert_eq!(image_size(&doc), Some((9, 9)));
    assert_eq!(fetcher.calls(), vec![sky.clone(), sky]);
}

#[tokio::test]
async fn test_dropping_controller_cancels_fetch() {
    let fetcher = GatedFetcher::new();
    let sky = url("sky.png");
    let release = fetcher.gate(&sky);
    let mut doc = DocumentController::new(fetcher.clone());

    doc.set_background(Background::Url(sky.clone()));
    run_pending().await;
    assert_eq!(fetcher.calls(), vec![sky]);

    drop(doc);
    run_pending().await;
    assert!(release.send(Ok(png(1, 1))).is_err());
}
