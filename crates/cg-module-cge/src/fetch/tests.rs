//! Unit tests for locator parsing and document retrieval.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use rstest::rstest;
use tempfile::TempDir;

use super::*;

/// Serves a single canned HTTP response and reports the request line.
fn serve_once(response: &'static str) -> (u16, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("read request line");
        let mut header = String::new();
        while reader.read_line(&mut header).expect("read header") > 2 {
            header.clear();
        }
        sender.send(request_line.trim_end().to_owned()).ok();
        stream.write_all(response.as_bytes()).expect("write response");
    });
    (port, receiver)
}

fn fetcher() -> DefaultFetcher {
    DefaultFetcher::new(Duration::from_secs(5))
}

fn http(url: &str) -> Locator {
    Locator::Http(Url::parse(url).expect("valid url"))
}

#[rstest]
#[case::bare_host("games.example.com", "http://games.example.com/api/cge")]
#[case::host_and_port("localhost:8080", "http://localhost:8080/api/cge")]
#[case::http_root("http://games.example.com/", "http://games.example.com/api/cge")]
#[case::game_path("games.example.com/tictactoe", "http://games.example.com/tictactoe/api/cge")]
#[case::game_path_trailing_slash(
    "http://games.example.com/tictactoe/",
    "http://games.example.com/tictactoe/api/cge"
)]
#[case::explicit_endpoint("http://games.example.com/api/cge", "http://games.example.com/api/cge")]
#[case::https("https://games.example.com", "https://games.example.com/api/cge")]
#[case::https_with_query(
    "https://games.example.com:8443/chess?v=2#top",
    "https://games.example.com:8443/chess/api/cge?v=2"
)]
fn http_locators_target_the_cge_endpoint(#[case] input: &str, #[case] expected: &str) {
    let locator = Locator::parse(input).expect("locator parses");
    assert_eq!(locator, http(expected));
    assert_eq!(locator.to_string(), expected);
}

#[rstest]
#[case::ftp("ftp://games.example.com/game.cge", "unsupported locator scheme 'ftp'")]
#[case::ws("ws://games.example.com", "unsupported locator scheme 'ws'")]
fn unsupported_schemes_are_rejected(#[case] input: &str, #[case] expected: &str) {
    let error = Locator::parse(input).expect_err("scheme should be rejected");
    assert!(matches!(error, SchemaError::Fetch { .. }));
    assert!(error.to_string().contains(expected), "got: {error}");
}

#[rstest]
#[case::dotted("./schemas/game.cge")]
#[case::bare_file("game.cge")]
#[case::nested_schema("schemas/chess.cge")]
#[case::nested_json("schemas/chess.cge.json")]
#[case::uppercase_suffix("schemas/CHESS.CGE")]
#[case::absolute("/srv/games/chess.cge")]
fn schema_file_names_are_files(#[case] input: &str) {
    assert_eq!(
        Locator::parse(input).expect("locator"),
        Locator::File(PathBuf::from(input))
    );
}

#[test]
fn reads_files_by_path_and_url() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("game.cge");
    std::fs::write(&path, "name demo\ncge v0.5\n").expect("write document");

    let by_path = Locator::parse(path.to_str().expect("utf8 path")).expect("path locator");
    let by_url = Locator::parse(
        Url::from_file_path(&path)
            .expect("file url")
            .as_str(),
    )
    .expect("url locator");

    assert_eq!(by_path, by_url);
    assert_eq!(
        fetcher().fetch(&by_path).expect("fetch"),
        "name demo\ncge v0.5\n"
    );
}

#[test]
fn missing_file_is_a_fetch_error() {
    let dir = TempDir::new().expect("temp dir");
    let locator = Locator::File(dir.path().join("absent.cge"));
    let error = fetcher().fetch(&locator).expect_err("missing file");
    assert!(matches!(error, SchemaError::FetchIo { .. }));
}

#[test]
fn http_fetch_requests_cge_endpoint_below_game_path() {
    let (port, requests) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 19\r\nConnection: close\r\n\r\nname demo\ncge v0.5\n",
    );
    let locator = Locator::parse(&format!("127.0.0.1:{port}/tictactoe")).expect("locator");

    let document = fetcher().fetch(&locator).expect("fetch succeeds");

    assert_eq!(document, "name demo\ncge v0.5\n");
    assert_eq!(
        requests.recv().expect("request line"),
        "GET /tictactoe/api/cge HTTP/1.1"
    );
}

#[test]
fn http_body_keeps_multibyte_text() {
    let (port, _requests) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: 29\r\nConnection: close\r\n\r\nname échecs\ncge v0.5\n// ♞\n",
    );
    let locator = Locator::parse(&format!("http://127.0.0.1:{port}")).expect("locator");

    let document = fetcher().fetch(&locator).expect("fetch succeeds");

    assert_eq!(document, "name échecs\ncge v0.5\n// ♞\n");
}

#[test]
fn http_error_status_is_reported() {
    let (port, _requests) = serve_once(
        "HTTP/1.1 404 Not Found\r\nContent-Length: 12\r\nConnection: close\r\n\r\nno such game",
    );
    let locator = Locator::parse(&format!("http://127.0.0.1:{port}/")).expect("locator");

    let error = fetcher().fetch(&locator).expect_err("404 should fail");

    assert!(
        matches!(error, SchemaError::HttpStatus { status: 404, .. }),
        "got: {error}"
    );
}

#[test]
fn malformed_response_is_reported() {
    let (port, _requests) = serve_once("garbage");
    let locator = Locator::parse(&format!("http://127.0.0.1:{port}")).expect("locator");

    let error = fetcher().fetch(&locator).expect_err("garbage should fail");

    assert!(matches!(error, SchemaError::Fetch { .. }), "got: {error}");
}

#[test]
fn unreachable_https_server_is_a_fetch_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    let locator = Locator::parse(&format!("https://127.0.0.1:{port}")).expect("locator");

    let error = fetcher().fetch(&locator).expect_err("nothing listening");

    assert!(matches!(error, SchemaError::Fetch { .. }), "got: {error}");
}
