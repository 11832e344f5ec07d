//! Snapshot tests
//!
//! Loads each *.config file in /tests/ individually and compares if the
//! generated swift source for scheme `prod` changes.

#[test]
fn snapshots() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CONFGEN_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let registry = confgen::template::TemplateRegistry::default();

    insta::glob!("*.config", |path| {
        let mut sources = confgen::sources::ConfigSources::default();
        sources.load_file(path).expect("must be a valid configuration document");
        let source = sources.into_iter().next().expect("one source loaded");

        let generation = registry
            .generate(&source.config, &source.name, "prod")
            .expect("must generate");

        insta::assert_snapshot!(generation.text);
    });
}
