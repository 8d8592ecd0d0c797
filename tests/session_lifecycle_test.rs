use ar_placement::{
    HitOutcome, ReferenceSpaceType, Viewport,
    render::{PixelRect, RenderView},
};

use crate::common::test_utils::{CountingLoader, ScriptedSession, controller, pose, start_with_source};

mod common;

#[test]
fn hit_test_source_is_none_before_first_frame() {
    let mut controller = controller(CountingLoader::new());
    assert!(controller.hit_test_source().is_none());

    let session = ScriptedSession::new();
    controller.start_session(session.clone());
    assert!(controller.is_active());
    assert!(controller.hit_test_source().is_none());
    assert!(session.0.borrow().space_requests.is_empty());

    controller.on_frame(&vec![]);
    assert_eq!(controller.hit_test_source(), Some(&1));
    assert_eq!(
        session.0.borrow().space_requests,
        vec![ReferenceSpaceType::Viewer]
    );
}

#[test]
fn hit_test_source_is_none_after_session_end() {
    let mut controller = controller(CountingLoader::new());
    start_with_source(&mut controller, ScriptedSession::new());

    assert!(controller.end_session());
    assert!(!controller.is_active());
    assert!(controller.hit_test_source().is_none());
    assert!(controller.scene().is_none());
    assert!(!controller.end_session());
}

#[test]
fn frames_without_session_do_nothing() {
    let mut controller = controller(CountingLoader::new());
    assert!(controller.on_frame(&vec![pose(0.0, 0.0, -1.0)]).is_none());
    assert!(!controller.on_select());
}

#[test]
fn reticle_visible_iff_last_query_had_results() {
    let mut controller = controller(CountingLoader::new());
    start_with_source(&mut controller, ScriptedSession::new());

    let script = [
        vec![],
        vec![pose(0.0, -1.0, -1.0)],
        vec![pose(0.0, -1.0, -1.5), pose(0.0, -1.0, -4.0)],
        vec![],
        vec![],
        vec![pose(1.0, -1.0, -2.0)],
    ];
    for frame in script.iter() {
        let outcome = controller.on_frame(frame);
        let reticle = controller.scene().unwrap().reticle();
        assert_eq!(reticle.visible, !frame.is_empty());
        match outcome {
            Some(HitOutcome::Hit(p)) => assert_eq!(p, frame[0]),
            Some(HitOutcome::Miss) => assert!(frame.is_empty()),
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}

#[test]
fn reticle_pose_follows_nearest_hit() {
    let mut controller = controller(CountingLoader::new());
    start_with_source(&mut controller, ScriptedSession::new());

    let nearest = pose(0.2, -1.1, -0.8);
    controller.on_frame(&vec![nearest, pose(0.0, -1.0, -3.0)]);
    let reticle = controller.scene().unwrap().reticle();
    assert!(reticle.visible);
    assert_eq!(reticle.pose(), nearest);

    let draws = controller.draw_list();
    assert_eq!(draws.reticle().map(|d| d.world), Some(nearest));
}

#[test]
fn reticle_untouched_until_source_arrives() {
    let (session, open_gate) = ScriptedSession::gated();
    let mut controller = controller(CountingLoader::new());
    controller.start_session(session.clone());

    assert_eq!(
        controller.on_frame(&vec![pose(0.0, 0.0, -1.0)]),
        Some(HitOutcome::NoSource)
    );
    assert!(!controller.scene().unwrap().reticle().visible);
    assert_eq!(session.source_requests(), 0);

    open_gate.send(()).unwrap();
    assert_eq!(
        controller.on_frame(&vec![pose(0.0, 0.0, -1.0)]),
        Some(HitOutcome::Hit(pose(0.0, 0.0, -1.0)))
    );
    assert_eq!(session.source_requests(), 1);
}

#[test]
fn failed_source_request_keeps_session_alive() {
    let session = ScriptedSession::failing();
    let mut controller = controller(CountingLoader::new());
    controller.start_session(session.clone());

    for _ in 0..3 {
        assert_eq!(
            controller.on_frame(&vec![pose(0.0, 0.0, -1.0)]),
            Some(HitOutcome::NoSource)
        );
    }
    assert!(controller.is_active());
    assert!(controller.hit_test_source().is_none());
    assert_eq!(session.0.borrow().space_requests.len(), 1);
}

#[test]
fn ending_session_cancels_pending_source_request() {
    let (session, open_gate) = ScriptedSession::gated();
    let mut controller = controller(CountingLoader::new());
    controller.start_session(session.clone());
    controller.on_frame(&vec![]);
    controller.end_session();

    // the receiver went away with the cancelled request
    assert!(open_gate.send(()).is_err());
    assert_eq!(session.source_requests(), 0);
}

#[test]
fn restarted_session_requests_a_new_source() {
    let session = ScriptedSession::new();
    let mut controller = controller(CountingLoader::new());
    start_with_source(&mut controller, session.clone());
    controller.on_frame(&vec![pose(0.0, 0.0, -1.0)]);
    controller.end_session();

    start_with_source(&mut controller, session.clone());
    assert_eq!(controller.hit_test_source(), Some(&2));
    assert_eq!(session.source_requests(), 2);
    assert!(!controller.scene().unwrap().reticle().visible);
}

#[test]
fn camera_aspect_tracks_viewport() {
    let mut controller = controller(CountingLoader::new());
    assert!((controller.camera().aspect - 800.0 / 600.0).abs() < f32::EPSILON);

    for (w, h) in [(1080, 2340), (2340, 1080), (333, 777)] {
        assert!(controller.on_resize(Viewport::new(w, h).with_pixel_ratio(2.5)));
        assert!((controller.camera().aspect - w as f32 / h as f32).abs() < f32::EPSILON);
        assert_eq!(controller.viewport().width, w);
    }

    assert!(!controller.on_resize(Viewport::new(0, 0)));
    assert!((controller.camera().aspect - 333.0 / 777.0).abs() < f32::EPSILON);
}

#[test]
fn session_init_requires_hit_test() {
    let controller = controller(CountingLoader::new());
    let init = controller.session_init();
    assert_eq!(init.mode, "immersive-ar");
    assert_eq!(init.required_features, vec!["hit-test".to_string()]);
}

#[test]
fn draw_list_uses_viewer_views_once_reported() {
    let mut controller = controller(CountingLoader::new());
    let session = ScriptedSession::new();
    start_with_source(&mut controller, session.clone());

    let camera = RenderView::from_camera(controller.camera());
    assert_eq!(controller.draw_list().views, vec![camera]);

    let eye = RenderView {
        projection: pose(0.0, 0.0, 0.0),
        view: pose(0.0, -1.6, 0.0),
        viewport: Some(PixelRect {
            x: 0,
            y: 0,
            width: 1080,
            height: 2340,
        }),
    };
    session.set_views(vec![eye]);
    controller.on_frame(&vec![]);
    assert_eq!(controller.draw_list().views, vec![eye]);

    // pose lost again: back to the camera
    session.set_views(vec![]);
    controller.on_frame(&vec![]);
    assert_eq!(controller.draw_list().views, vec![camera]);
}
