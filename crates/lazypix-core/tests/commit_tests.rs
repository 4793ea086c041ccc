use lazypix_testing::prelude::*;

/// Installs a default loader over `host` and delivers the first batch.
fn install_and_reveal(host: &TestHost) -> std::rc::Rc<LazyImageLoader<TestHost>> {
    let loader = host.install(LoaderSettings::default());
    assert_eq!(loader.mode(), Some(LoadMode::Observed));
    host.deliver_visibility();
    loader
}

#[test]
fn successful_probe_commits_resource() {
    let host = TestHost::new();
    let image = host.add_image(
        ImageMarkup::lazy()
            .data_src("full.jpg")
            .data_srcset("full.jpg 1x, full@2x.jpg 2x")
            .src("blur.jpg")
            .at(100.0),
    );

    let loader = install_and_reveal(&host);

    assert_eq!(
        host.pending_probes(),
        vec![ProbeRequest {
            src: "full.jpg".into(),
            srcset: Some("full.jpg 1x, full@2x.jpg 2x".into()),
        }]
    );
    // Nothing is committed while the probe is in flight.
    assert!(image.has_class("lazy"));
    assert_eq!(image.src().as_deref(), Some("blur.jpg"));
    assert_eq!(image.attribute("data-lazy-processed").as_deref(), Some("1"));

    assert!(host.succeed_probe("full.jpg"));

    assert!(image.has_class("lazy-loaded"));
    assert!(!image.has_class("lazy"));
    assert_eq!(image.src().as_deref(), Some("full.jpg"));
    assert_eq!(image.srcset().as_deref(), Some("full.jpg 1x, full@2x.jpg 2x"));
    assert_eq!(image.attribute("data-src"), None);
    assert_eq!(image.attribute("data-srcset"), None);
    assert_eq!(image.attribute("data-lazy-processed").as_deref(), Some("1"));

    let stats = loader.stats();
    assert_eq!(stats.observed, 1);
    assert_eq!(stats.committed, 1);
    assert_eq!(stats.loaded, 1);
    assert_eq!(stats.in_flight, 0);
    assert_eq!(loader.watched_count(), 0);
}

#[test]
fn successful_probe_without_variant_set_leaves_srcset_untouched() {
    let host = TestHost::new();
    let image = host.add_image(ImageMarkup::lazy().data_src("a.jpg").at(0.0));

    install_and_reveal(&host);
    host.succeed_probe("a.jpg");

    assert_eq!(image.src().as_deref(), Some("a.jpg"));
    assert_eq!(image.srcset(), None);
}

#[test]
fn failed_probe_only_drops_pending_class() {
    let host = TestHost::new();
    let image = host.add_image(
        ImageMarkup::lazy()
            .data_src("missing.jpg")
            .data_srcset("missing@2x.jpg 2x")
            .src("blur.jpg")
            .at(0.0),
    );

    let loader = install_and_reveal(&host);
    assert!(host.fail_probe("missing.jpg"));

    assert!(!image.has_class("lazy"));
    assert!(!image.has_class("lazy-loaded"));
    assert_eq!(image.attribute("data-src").as_deref(), Some("missing.jpg"));
    assert_eq!(image.attribute("data-srcset").as_deref(), Some("missing@2x.jpg 2x"));
    assert_eq!(image.src().as_deref(), Some("blur.jpg"));
    assert_eq!(image.srcset(), None);
    assert_eq!(image.attribute("data-lazy-processed").as_deref(), Some("1"));
    assert_eq!(loader.stats().failed, 1);
    assert_eq!(loader.stats().loaded, 0);
}

#[test]
fn image_without_primary_locator_is_marked_loaded() {
    let host = TestHost::new();
    let image = host.add_image(ImageMarkup::lazy().data_srcset("only@2x.jpg 2x").at(0.0));

    let loader = install_and_reveal(&host);

    assert!(host.probe_history().is_empty());
    assert!(image.has_class("lazy-loaded"));
    assert!(!image.has_class("lazy"));
    assert_eq!(image.src_assignments(), 0);
    assert_eq!(loader.stats().loaded, 1);
}

#[test]
fn empty_primary_locator_counts_as_absent() {
    let host = TestHost::new();
    let image = host.add_image(ImageMarkup::lazy().data_src("").at(0.0));

    install_and_reveal(&host);

    assert!(host.probe_history().is_empty());
    assert!(image.has_class("lazy-loaded"));
}

#[test]
fn duplicate_delivery_fetches_once() {
    let host = TestHost::new();
    let image = host.add_image(ImageMarkup::lazy().data_src("a.jpg").at(0.0));
    let loader = host.install(LoaderSettings::default());

    let entry = VisibilityEntry {
        target: image.clone(),
        is_intersecting: true,
    };
    host.deliver_entries(vec![entry.clone(), entry.clone()]);
    host.deliver_entries(vec![entry]);

    assert_eq!(host.probe_history().len(), 1);
    assert_eq!(loader.stats().committed, 1);
    assert_eq!(loader.stats().duplicates_skipped, 2);

    host.succeed_probe("a.jpg");
    assert_eq!(image.src_assignments(), 1);
}

#[test]
fn direct_commit_is_guarded_by_processed_flag() {
    let host = TestHost::new();
    let image = host.add_image(ImageMarkup::lazy().data_src("a.jpg"));
    let loader = host.install(LoaderSettings::default());

    loader.commit(&image);
    loader.commit(&image);

    assert_eq!(host.pending_probes().len(), 1);
    assert_eq!(loader.stats().duplicates_skipped, 1);
}

#[test]
fn preprocessed_image_is_skipped() {
    let host = TestHost::new();
    let image = host.add_image(
        ImageMarkup::lazy()
            .data_src("a.jpg")
            .attribute("data-lazy-processed", "1")
            .at(0.0),
    );

    let loader = install_and_reveal(&host);

    assert!(host.probe_history().is_empty());
    assert!(image.has_class("lazy"));
    assert_eq!(loader.stats().duplicates_skipped, 1);
}

#[test]
fn attribute_removal_failure_is_ignored() {
    let host = TestHost::new();
    let image = host.add_image(ImageMarkup::lazy().data_src("a.jpg").at(0.0));
    image.lock_attributes();

    install_and_reveal(&host);
    host.succeed_probe("a.jpg");

    assert!(image.has_class("lazy-loaded"));
    assert!(!image.has_class("lazy"));
    assert_eq!(image.src().as_deref(), Some("a.jpg"));
    assert_eq!(image.attribute("data-src").as_deref(), Some("a.jpg"));
}

#[test]
fn probes_complete_in_any_order() {
    let host = TestHost::new();
    let first = host.add_image(ImageMarkup::lazy().data_src("first.jpg").at(0.0));
    let second = host.add_image(ImageMarkup::lazy().data_src("second.jpg").at(300.0));

    let loader = install_and_reveal(&host);
    assert_eq!(loader.stats().in_flight, 2);

    host.succeed_probe("second.jpg");
    assert!(second.has_class("lazy-loaded"));
    assert!(first.has_class("lazy"));

    host.fail_probe("first.jpg");
    assert!(!first.has_class("lazy"));
    assert!(!first.has_class("lazy-loaded"));

    let stats = loader.stats();
    assert_eq!((stats.loaded, stats.failed, stats.in_flight), (1, 1, 0));
}

#[test]
fn stalled_probe_leaves_image_pending() {
    let host = TestHost::new();
    let image = host.add_image(ImageMarkup::lazy().data_src("slow.jpg").at(0.0));

    let loader = install_and_reveal(&host);
    // Visibility keeps changing but the probe never reports back.
    host.scroll_to(5_000.0);
    host.deliver_visibility();
    host.scroll_to(0.0);
    host.deliver_visibility();

    assert!(image.has_class("lazy"));
    assert_eq!(image.attribute("data-lazy-processed").as_deref(), Some("1"));
    assert_eq!(host.probe_history().len(), 1);
    assert_eq!(loader.stats().in_flight, 1);
}

#[test]
fn custom_settings_drive_classes_and_attributes() {
    let host = TestHost::new();
    let image = host.add_image(
        ImageMarkup::plain()
            .class("deferred")
            .attribute("data-full", "hd.jpg")
            .at(0.0),
    );
    let settings = LoaderSettings::default()
        .with_selector("img.deferred")
        .and_then(|settings| settings.with_classes("deferred", "ready"))
        .and_then(|settings| settings.with_attributes("data-full", "data-full-set", "data-seen"))
        .unwrap();

    let _loader = host.install(settings);
    host.deliver_visibility();
    host.succeed_probe("hd.jpg");

    assert_eq!(image.classes(), vec!["ready".to_string()]);
    assert_eq!(image.src().as_deref(), Some("hd.jpg"));
    assert_eq!(image.attribute("data-full"), None);
    assert_eq!(image.attribute("data-seen").as_deref(), Some("1"));
}
