use std::time::Duration;

use article_service_cli::{
    ArticleScraper, FetchError, FetchSettings, PageFetcher, ScrapeError, UNTITLED,
};
use futures::future::join_all;
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, header_exists, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PARAGRAPH: &str = "Paragraph one long enough to pass the forty character threshold.";

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

fn scraper() -> ArticleScraper {
    ArticleScraper::new(FetchSettings::default()).expect("client builds")
}

#[tokio::test]
async fn served_article_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(html(&format!(
            "<html><head><title>T</title></head><body><article><p>{PARAGRAPH}</p></article></body></html>"
        )))
        .mount(&server)
        .await;

    let url = format!("{}/story", server.uri());
    let article = scraper().scrape(&url).await.expect("scrape ok");

    assert_eq!(article.title, "T");
    assert_eq!(article.paragraphs, vec![PARAGRAPH.to_string()]);
    assert_eq!(article.url, url);
    assert_eq!(article.content(), PARAGRAPH);
}

#[tokio::test]
async fn request_carries_browser_headers_and_referer() {
    let server = MockServer::start().await;
    let url = format!("{}/headers", server.uri());
    Mock::given(method("GET"))
        .and(path("/headers"))
        .and(header("referer", url.as_str()))
        .and(headers("accept-language", vec!["id-ID", "id;q=0.9"]))
        .and(header_exists("user-agent"))
        .respond_with(html("<p>ok</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(FetchSettings::default()).unwrap();
    let page = fetcher.fetch(&url).await.expect("headers matched");
    assert_eq!(page.status, 200);
    assert_eq!(page.encoding, "utf-8");
}

#[tokio::test]
async fn client_error_bodies_are_still_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_raw(format!("<main><p>{PARAGRAPH}</p></main>"), "text/html"),
        )
        .mount(&server)
        .await;

    let article = scraper()
        .scrape(&format!("{}/blocked", server.uri()))
        .await
        .expect("4xx body accepted");
    assert_eq!(article.title, UNTITLED);
    assert_eq!(article.paragraphs.len(), 1);
}

#[tokio::test]
async fn server_errors_fail_the_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503).set_body_string(PARAGRAPH))
        .mount(&server)
        .await;

    let err = scraper()
        .scrape(&format!("{}/down", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::Fetch(FetchError::Status { status: 503, .. })
    ));
    assert!(err.to_string().starts_with("failed to extract article: "));
}

#[tokio::test]
async fn page_without_article_text_is_an_extraction_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/thin"))
        .respond_with(html("<html><body><p>Too short.</p></body></html>"))
        .mount(&server)
        .await;

    let err = scraper()
        .scrape(&format!("{}/thin", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Extract(_)));
    assert_eq!(
        err.to_string(),
        "failed to extract article: failed to extract article content"
    );
}

#[tokio::test]
async fn redirects_beyond_the_limit_fail() {
    let server = MockServer::start().await;
    for hop in 0..7 {
        Mock::given(method("GET"))
            .and(path(format!("/hop/{hop}")))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("/hop/{}", hop + 1)),
            )
            .mount(&server)
            .await;
    }

    let err = scraper()
        .scrape(&format!("{}/hop/0", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Fetch(FetchError::Request(_))));
}

#[tokio::test]
async fn slow_pages_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            html(&format!("<article><p>{PARAGRAPH}</p></article>"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(FetchSettings {
        timeout: Duration::from_millis(200),
        ..FetchSettings::default()
    })
    .unwrap();
    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    match err {
        FetchError::Request(source) => assert!(source.is_timeout()),
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scrapes_keep_their_own_results() {
    let server = MockServer::start().await;
    for i in 0..8 {
        Mock::given(method("GET"))
            .and(path(format!("/article/{i}")))
            .respond_with(html(&format!(
                "<html><head><title>Story {i}</title></head><body><article>\
                 <p>Story number {i} has a body that is definitely long enough.</p>\
                 </article></body></html>"
            )))
            .mount(&server)
            .await;
    }

    let scraper = scraper();
    let urls: Vec<String> = (0..8)
        .map(|i| format!("{}/article/{i}", server.uri()))
        .collect();
    let results = join_all(urls.iter().map(|url| {
        let scraper = scraper.clone();
        async move { scraper.scrape(url).await }
    }))
    .await;

    for (i, (url, result)) in urls.iter().zip(results).enumerate() {
        let article = result.expect("each scrape succeeds");
        assert_eq!(&article.url, url);
        assert_eq!(article.title, format!("Story {i}"));
        assert_eq!(
            article.paragraphs,
            vec![format!("Story number {i} has a body that is definitely long enough.")]
        );
    }
}
