#[test]
fn tracing_feature_gating_compiles() {
    #[cfg(feature = "tracing")]
    {
        tracing::event!(
            tracing::Level::DEBUG,
            event = "tubing.test.feature_gating",
            "tubing.test.feature_gating"
        );
    }

    #[cfg(not(feature = "tracing"))]
    {
        let marker = "tracing-disabled";
        assert_eq!(marker, "tracing-disabled");
    }
}

#[cfg(feature = "http")]
#[test]
fn ureq_transport_is_a_transport() {
    fn assert_transport<T: tubing::http::Transport>(_: &T) {}
    assert_transport(&tubing::http::UreqTransport::new());
}
