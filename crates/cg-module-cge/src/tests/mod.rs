//! Crate-level integration and BDD tests.

use cg_module::Version;

use crate::fetch::{DefaultFetcher, Locator};
use crate::parser::{ParseOptions, ParserRegistry};
use crate::resolver::SchemaResolver;


#[test]
fn local_document_without_parsers_is_unsupported() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("chess.cge");
    std::fs::write(&path, "name chess\ncge v0.5\n\nevent move {}\n").expect("write document");
    let resolver = SchemaResolver::new(
        DefaultFetcher::new(std::time::Duration::from_secs(1)),
        ParserRegistry::new(),
        ParseOptions::default(),
    );

    let locator = path.to_str().expect("utf8 path");
    assert_eq!(
        Locator::parse(locator).expect("locator"),
        Locator::File(path.clone())
    );
    let error = resolver.resolve(locator).expect_err("no parsers installed");

    assert_eq!(
        error.to_string(),
        format!("unsupported CGE version '{}'", Version::new(0, 5, 0))
    );
}
