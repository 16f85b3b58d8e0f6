use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use serde_json::json;

use crate::backend::fake::{FakeLoader, pattern_pixel};
use crate::backend::{DocumentLoader, DocumentSource};
use crate::capture::{AnalysisClient, AnalysisResponse, CategoryLabel, EncodedImage};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::geometry::{LogicalRect, Point};
use crate::gesture::{GestureOutcome, PointerEvent, PointerPhase, TrackedRegion};

use super::{LoadStatus, ViewerSession};

#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<(EncodedImage, String)>>,
}

impl RecordingClient {
    fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

impl AnalysisClient for RecordingClient {
    fn analyze<'a>(
        &'a self,
        image: EncodedImage,
        label: &'a str,
    ) -> BoxFuture<'a, AppResult<AnalysisResponse>> {
        Box::pin(async move {
            self.calls
                .lock()
                .expect("calls lock")
                .push((image, label.to_string()));
            Ok(AnalysisResponse::ok(json!({ "label": label })))
        })
    }
}

fn two_page_session(loader: FakeLoader) -> (ViewerSession, Arc<RecordingClient>) {
    let client = Arc::new(RecordingClient::default());
    let mut session = ViewerSession::new(
        &Config::default(),
        Arc::new(loader),
        client.clone(),
        TrackedRegion::unbounded(),
    )
    .expect("default config builds a session");
    session
        .load(&DocumentSource::path("exam.pdf"))
        .expect("fake source loads");
    session.render_all(|_| {});
    (session, client)
}

fn drag(session: &mut ViewerSession, from: (f64, f64), to: (f64, f64)) -> GestureOutcome {
    session.handle_pointer(PointerEvent::mouse(PointerPhase::Start, from.0, from.1));
    session.handle_pointer(PointerEvent::mouse(PointerPhase::Move, to.0, to.1));
    session.handle_pointer(PointerEvent::mouse(PointerPhase::End, to.0, to.1))
}

#[test]
fn selection_spanning_two_pages_captures_across_the_gap() {
    let (mut session, _client) = two_page_session(FakeLoader::new(&[(600.0, 800.0); 2]));
    assert_eq!(session.page_count(), 2);
    assert_eq!(session.rendered_pages(), 2);
    assert!(session.toggle_selection_mode());

    let outcome = drag(&mut session, (50.0, 750.0), (550.0, 850.0));
    assert_eq!(
        outcome,
        GestureOutcome::Finished(LogicalRect::from_origin_size(
            Point::new(50.0, 750.0),
            500.0,
            100.0
        ))
    );
    assert!(session.can_capture());

    let bitmap = session
        .capture()
        .expect("capture succeeds")
        .expect("selection is valid");
    assert_eq!((bitmap.width(), bitmap.height()), (500, 100));

    // Page 1 starts at 816 with the default 16 px gap.
    assert_eq!(bitmap.pixel(0, 0), Some(pattern_pixel(0, 50, 750)));
    assert_eq!(bitmap.pixel(499, 49), Some(pattern_pixel(0, 549, 799)));
    assert_eq!(bitmap.pixel(10, 55), Some([255, 255, 255, 255]));
    assert_eq!(bitmap.pixel(0, 66), Some(pattern_pixel(1, 50, 0)));
    assert_eq!(bitmap.pixel(499, 99), Some(pattern_pixel(1, 549, 33)));
}

#[tokio::test]
async fn tiny_selection_disables_capture_and_skips_collaborator() {
    let (mut session, client) = two_page_session(FakeLoader::new(&[(600.0, 800.0)]));
    session.set_selection_mode(true);

    drag(&mut session, (100.0, 100.0), (110.0, 110.0));
    assert!(session.selection().is_some());
    assert!(!session.can_capture());
    assert!(session.capture().expect("capture never errors here").is_none());

    let label = session.default_label().clone();
    let submission = session.submit(&label).await.expect("submit is a no-op");
    assert!(submission.is_none());
    assert_eq!(client.call_count(), 0);
}

#[test]
fn leaving_selection_mode_mid_drag_discards_the_rectangle() {
    let (mut session, _client) = two_page_session(FakeLoader::new(&[(600.0, 800.0)]));
    session.set_selection_mode(true);

    session.handle_pointer(PointerEvent::mouse(PointerPhase::Start, 10.0, 10.0));
    session.handle_pointer(PointerEvent::mouse(PointerPhase::Move, 300.0, 300.0));
    assert!(session.is_dragging());
    assert!(session.live_selection().is_some());
    assert!(!session.can_capture());

    assert!(!session.toggle_selection_mode());
    assert!(!session.is_dragging());
    assert_eq!(session.live_selection(), None);
    assert_eq!(
        session.handle_pointer(PointerEvent::mouse(PointerPhase::End, 300.0, 300.0)),
        GestureOutcome::Ignored
    );
    assert!(!session.can_capture());
}

#[test]
fn pointer_events_outside_selection_mode_are_ignored() {
    let (mut session, _client) = two_page_session(FakeLoader::new(&[(600.0, 800.0)]));
    assert!(!session.selection_mode());
    assert_eq!(
        drag(&mut session, (10.0, 10.0), (300.0, 300.0)),
        GestureOutcome::Ignored
    );
    assert_eq!(session.selection(), None);
}

#[tokio::test]
async fn submit_sends_one_request_with_label() {
    let (mut session, client) = two_page_session(FakeLoader::new(&[(600.0, 800.0)]));
    session.set_selection_mode(true);
    drag(&mut session, (100.0, 200.0), (300.0, 260.0));

    let label = CategoryLabel::new("math").expect("label is valid");
    let submission = session
        .submit(&label)
        .await
        .expect("capture succeeds")
        .expect("selection is valid");
    assert!(session.is_current(&submission));
    assert!(submission.result.expect("collaborator replied").success);

    let calls = client.calls.lock().expect("calls lock");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "math");
    assert_eq!((calls[0].0.width, calls[0].0.height), (200, 60));
}

#[test]
fn zoom_change_rerenders_and_clears_selection() {
    let (mut session, _client) = two_page_session(FakeLoader::new(&[(200.0, 400.0)]));
    session.set_selection_mode(true);
    drag(&mut session, (10.0, 10.0), (100.0, 100.0));
    let generation = session.surfaces().generation();

    assert!(session.zoom_in());
    assert!(session.zoom() > 1.0);
    assert_eq!(session.selection(), None);
    assert_eq!(session.rendered_pages(), 0);
    assert!(session.surfaces().generation() > generation);
    assert!(session.selection_mode());

    session.render_all(|_| {});
    let surface = session.surfaces().surface(0).expect("page rendered");
    assert_eq!(
        surface.frame.width,
        (200.0 * session.zoom()).round() as u32
    );

    assert!(!session.set_zoom(session.zoom()));
    assert!(session.set_zoom(100.0));
    assert_eq!(session.zoom(), 4.0);
}

#[test]
fn stale_load_is_superseded() {
    let loader = Arc::new(FakeLoader::new(&[(100.0, 100.0); 3]));
    let client = Arc::new(RecordingClient::default());
    let mut session = ViewerSession::new(
        &Config::default(),
        loader.clone(),
        client,
        TrackedRegion::unbounded(),
    )
    .expect("default config builds a session");

    let first = session.begin_load();
    let second = session.begin_load();
    let first_doc = loader.open(&DocumentSource::path("old.pdf"));
    let second_doc = loader.open(&DocumentSource::path("new.pdf"));

    assert_eq!(
        session
            .complete_load(first, first_doc)
            .expect("stale result is dropped"),
        LoadStatus::Superseded
    );
    assert_eq!(session.page_count(), 0);
    assert_eq!(
        session
            .complete_load(second, second_doc)
            .expect("latest result installs"),
        LoadStatus::Loaded { page_count: 3 }
    );
    assert_eq!(session.page_count(), 3);
}

#[test]
fn failed_load_keeps_previous_document() {
    let mut loader = FakeLoader::new(&[(100.0, 100.0), (100.0, 100.0)]);
    loader.broken_sources.insert("missing.pdf".to_string());
    let (mut session, _client) = two_page_session(loader);

    let err = session
        .load(&DocumentSource::path("missing.pdf"))
        .expect_err("broken source fails");
    assert!(matches!(err, AppError::DocumentLoad { .. }));
    assert_eq!(session.page_count(), 2);
    assert_eq!(session.rendered_pages(), 2);
}

#[tokio::test]
async fn background_load_installs_document() {
    let loader = Arc::new(FakeLoader::new(&[(100.0, 100.0); 4]));
    let client = Arc::new(RecordingClient::default());
    let mut session = ViewerSession::new(
        &Config::default(),
        loader.clone(),
        client,
        TrackedRegion::unbounded(),
    )
    .expect("default config builds a session");

    let status = session
        .load_in_background(DocumentSource::path("exam.pdf"))
        .await
        .expect("background load succeeds");
    assert_eq!(status, LoadStatus::Loaded { page_count: 4 });
    assert_eq!(loader.opens.load(Ordering::SeqCst), 1);
    assert_eq!(session.render_all(|_| {}), 4);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.capture.default_label = "  ".to_string();
    let built = ViewerSession::new(
        &config,
        Arc::new(FakeLoader::default()),
        Arc::new(RecordingClient::default()),
        TrackedRegion::unbounded(),
    );
    assert!(matches!(built, Err(AppError::InvalidArgument(_))));
}

#[test]
fn dispose_releases_loader_and_client() {
    let loader = Arc::new(FakeLoader::new(&[(100.0, 100.0)]));
    let client = Arc::new(RecordingClient::default());
    let mut session = ViewerSession::new(
        &Config::default(),
        loader.clone(),
        client.clone(),
        TrackedRegion::unbounded(),
    )
    .expect("default config builds a session");
    session
        .load(&DocumentSource::path("exam.pdf"))
        .expect("fake source loads");
    session.render_all(|_| {});
    assert!(Arc::strong_count(&loader) > 1);
    assert!(Arc::strong_count(&client) > 1);

    session.dispose();
    assert_eq!(Arc::strong_count(&loader), 1);
    assert_eq!(Arc::strong_count(&client), 1);
}

#[tokio::test]
async fn oversized_drag_fails_instead_of_allocating() {
    let (mut session, client) = two_page_session(FakeLoader::new(&[(600.0, 800.0)]));
    session.set_selection_mode(true);
    drag(&mut session, (0.0, 0.0), (1.0e10, 1.0e10));
    assert!(session.can_capture());

    assert!(matches!(session.capture(), Err(AppError::InvalidArgument(_))));
    let label = session.default_label().clone();
    assert!(matches!(
        session.submit(&label).await,
        Err(AppError::InvalidArgument(_))
    ));
    assert_eq!(client.call_count(), 0);
}

#[test]
fn pixel_ratio_change_rerenders_and_scales_captures() {
    let (mut session, _client) = two_page_session(FakeLoader::new(&[(200.0, 300.0)]));
    session.set_selection_mode(true);
    drag(&mut session, (10.0, 10.0), (110.0, 60.0));
    let generation = session.surfaces().generation();

    assert!(!session.set_pixel_ratio(1.0));
    assert!(!session.set_pixel_ratio(0.0));
    assert!(session.set_pixel_ratio(2.0));
    assert_eq!(session.pixel_ratio(), 2.0);
    assert_eq!(session.selection(), None);
    assert_eq!(session.rendered_pages(), 0);
    assert!(session.surfaces().generation() > generation);

    session.render_all(|_| {});
    let surface = session.surfaces().surface(0).expect("page rendered");
    assert_eq!((surface.frame.width, surface.frame.height), (400, 600));
    assert_eq!(surface.bounds.width(), 200.0);

    drag(&mut session, (10.0, 10.0), (110.0, 60.0));
    let bitmap = session
        .capture()
        .expect("capture succeeds")
        .expect("selection is valid");
    assert_eq!((bitmap.width(), bitmap.height()), (200, 100));
    assert_eq!(bitmap.pixel(0, 0), Some(pattern_pixel(0, 20, 20)));
}
