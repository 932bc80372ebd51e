//! Unit tests for the page fetcher

use super::*;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn config(base: &str, max_retries: u32) -> ScraperConfig {
    ScraperConfig {
        base_url: Url::parse(base).unwrap(),
        request_delay: Duration::from_millis(1),
        max_retries,
        backoff_factor: 2.0,
    }
}

fn fetcher(server: &MockServer, max_retries: u32) -> PageFetcher {
    PageFetcher::new(&config(&server.uri(), max_retries)).unwrap()
}

#[cfg(test)]
mod fetch_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_success_first_try() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/international/years/"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table></table>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher(&server, 3);
        let url = fetcher.season_index_url().unwrap();
        let body = fetcher.fetch(url.as_str()).await.unwrap();
        assert_eq!(body, "<table></table>");
    }

    #[tokio::test]
    async fn test_fetch_retries_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page.html"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher(&server, 3).fetch("/page.html").await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_fetch_retries_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page.html"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher(&server, 3).fetch("/page.html").await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_fetch_exhausts_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page.html"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let err = fetcher(&server, 3)
            .fetch("/page.html")
            .await
            .unwrap_err();
        match &err {
            FetchError::Exhausted { attempts, .. } => assert_eq!(*attempts, 3),
            other => panic!("Expected Exhausted, got {:?}", other),
        }
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_fetch_not_found_fails_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.html"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher(&server, 3)
            .fetch("/missing.html")
            .await
            .unwrap_err();
        match err {
            FetchError::Status { status, url } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/missing.html"));
            }
            other => panic!("Expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_transport_error_exhausts() {
        // Nothing listens on port 1.
        let fetcher = PageFetcher::new(&config("http://127.0.0.1:1", 2)).unwrap();
        let err = fetcher.fetch("/page.html").await.unwrap_err();
        match err {
            FetchError::Exhausted { attempts, last, .. } => {
                assert_eq!(attempts, 2);
                assert!(last.is_some());
            }
            other => panic!("Expected Exhausted, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod url_tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let fetcher = PageFetcher::new(&config("https://www.basketball-reference.com", 3)).unwrap();
        assert_eq!(
            fetcher.resolve("/international/boxscores/1.html").unwrap().as_str(),
            "https://www.basketball-reference.com/international/boxscores/1.html"
        );
        assert_eq!(
            fetcher.resolve("http://localhost:8080/x.html").unwrap().as_str(),
            "http://localhost:8080/x.html"
        );
        assert_eq!(
            fetcher.season_index_url().unwrap().as_str(),
            "https://www.basketball-reference.com/international/years/"
        );
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let mut cfg = config("https://example.com", 3);
        cfg.request_delay = Duration::from_millis(100);
        let fetcher = PageFetcher::new(&cfg).unwrap();
        assert_eq!(fetcher.backoff(1), Duration::from_millis(100));
        assert_eq!(fetcher.backoff(2), Duration::from_millis(200));
        assert_eq!(fetcher.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
        assert!(!is_retryable(StatusCode::FORBIDDEN));
    }
}
