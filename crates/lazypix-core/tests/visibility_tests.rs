use lazypix_core::{MarginLength, RootMargin};
use lazypix_testing::prelude::*;

#[test]
fn observer_uses_configured_margin_and_threshold() {
    let host = TestHost::new();
    host.add_image(ImageMarkup::lazy().data_src("a.jpg"));
    let _loader = host.install(LoaderSettings::default());

    let observers = host.observers();
    assert_eq!(observers.len(), 1);
    let criteria = observers[0].criteria();
    assert_eq!(
        criteria.root_margin,
        RootMargin::symmetric(MarginLength::Px(200.0), MarginLength::Px(0.0))
    );
    assert_eq!(criteria.threshold, 0.01);
}

#[test]
fn margin_pre_triggers_images_just_below_viewport() {
    let host = TestHost::new().with_viewport(800.0, 600.0);
    let near = host.add_image(ImageMarkup::lazy().data_src("near.jpg").at(600.0 + 150.0));
    let far = host.add_image(ImageMarkup::lazy().data_src("far.jpg").at(600.0 + 250.0));
    let loader = host.install(LoaderSettings::default());

    host.deliver_visibility();

    assert_eq!(host.pending_probes().len(), 1);
    assert_eq!(host.pending_probes()[0].src, "near.jpg");
    assert_eq!(near.attribute("data-lazy-processed").as_deref(), Some("1"));
    assert_eq!(far.attribute("data-lazy-processed"), None);
    assert_eq!(loader.watched_count(), 1);

    // Scrolling 100px brings the far image inside the margin as well.
    host.scroll_to(100.0);
    host.deliver_visibility();

    assert_eq!(host.probe_history().len(), 2);
    assert_eq!(host.probe_history()[1].src, "far.jpg");
    assert_eq!(loader.watched_count(), 0);
}

#[test]
fn images_trigger_once_while_scrolling_back_and_forth() {
    let host = TestHost::new();
    let image = host.add_image(ImageMarkup::lazy().data_src("a.jpg").at(1_500.0));
    let loader = host.install(LoaderSettings::default());

    assert_eq!(host.deliver_visibility(), 1, "initial non-intersecting report");
    assert!(host.probe_history().is_empty());

    for _ in 0..3 {
        host.scroll_to(1_200.0);
        host.deliver_visibility();
        host.scroll_to(0.0);
        host.deliver_visibility();
    }

    assert_eq!(host.probe_history().len(), 1);
    assert!(host.observers()[0].observed().is_empty());
    assert_eq!(loader.stats().committed, 1);
    assert_eq!(loader.stats().duplicates_skipped, 0);
    assert!(image.classes().contains(&"lazy".to_string()));
}

#[test]
fn non_intersecting_entries_are_ignored() {
    let host = TestHost::new();
    let image = host.add_image(ImageMarkup::lazy().data_src("a.jpg"));
    let loader = host.install(LoaderSettings::default());

    host.deliver_entries(vec![VisibilityEntry {
        target: image.clone(),
        is_intersecting: false,
    }]);

    assert!(host.probe_history().is_empty());
    assert_eq!(loader.watched_count(), 1);
    assert_eq!(host.observers()[0].observed(), vec![image]);
}

#[test]
fn custom_threshold_waits_for_more_area() {
    let host = TestHost::new();
    // 50px of a 200px image inside the expanded root: 25% visible.
    host.add_image(ImageMarkup::lazy().data_src("a.jpg").at(600.0 + 150.0));
    let settings = LoaderSettings::default().with_threshold(0.5).unwrap();
    let _loader = host.install(settings);

    host.deliver_visibility();
    assert!(host.probe_history().is_empty());

    host.scroll_to(100.0);
    host.deliver_visibility();
    assert_eq!(host.probe_history().len(), 1);
}
