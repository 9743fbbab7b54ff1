//! Streaming HTTP content fetcher.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use futures::StreamExt;
use reqwest::header::COOKIE;
use std::time::Duration;
use url::Url;

use super::ContentStream;

/// Fetches artifact content over HTTP(S)
///
/// Redirects are followed. The configured cookie header is attached only when
/// the request host matches one of the configured cookie domains.
///
/// `timeout` bounds the wait for response headers; the body is only bounded
/// by `read_timeout` between consecutive chunks.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    read_timeout: Duration,
    cookie_header: Option<String>,
    cookie_domains: Vec<String>,
}

impl HttpFetcher {
    /// Build a fetcher from HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout: config.timeout,
            read_timeout: config.read_timeout,
            cookie_header: config.cookie_header.clone(),
            cookie_domains: config.cookie_domains.clone(),
        })
    }

    /// Whether credentials may be sent to `host`
    pub fn is_cookie_host(&self, host: &str) -> bool {
        is_allowed_host(host, &self.cookie_domains)
    }

    /// Start a download and return its body as a chunk stream
    pub async fn fetch(&self, url: &str) -> Result<ContentStream> {
        let parsed = Url::parse(url)
            .map_err(|e| Error::Transport(format!("Invalid content URL '{}': {}", url, e)))?;

        let mut request = self.client.get(parsed.clone());
        if let Some(cookie) = &self.cookie_header {
            match parsed.host_str() {
                Some(host) if self.is_cookie_host(host) => {
                    request = request.header(COOKIE, cookie.as_str());
                }
                _ => {
                    tracing::debug!(url = %url, "Not sending cookies to host outside cookie domains");
                }
            }
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| {
                Error::Transport(format!("Timeout fetching content from '{}'", url))
            })?
            .map_err(|e| describe_send_error(&e, url))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "HTTP error fetching content: {} {}",
                response.status(),
                url
            )));
        }

        let url_owned = url.to_string();
        let read_timeout = self.read_timeout;
        let body = Box::pin(response.bytes_stream());
        let stream = futures::stream::unfold(Some(body), move |state| {
            let url = url_owned.clone();
            async move {
                let mut body = state?;
                match tokio::time::timeout(read_timeout, body.next()).await {
                    Ok(Some(Ok(bytes))) => Some((Ok(bytes.to_vec()), Some(body))),
                    Ok(Some(Err(e))) => Some((
                        Err(Error::Transport(format!(
                            "Failed to read content from '{}': {}",
                            url, e
                        ))),
                        None,
                    )),
                    Ok(None) => None,
                    Err(_) => Some((
                        Err(Error::Transport(format!(
                            "Timeout reading content from '{}': no data for {}s",
                            url,
                            read_timeout.as_secs_f32()
                        ))),
                        None,
                    )),
                }
            }
        });
        Ok(stream.boxed())
    }
}

fn describe_send_error(e: &reqwest::Error, url: &str) -> Error {
    let message = if e.is_timeout() {
        format!("Timeout fetching content from '{}'", url)
    } else if e.is_connect() {
        format!("Connection failed for '{}': {}", url, e)
    } else {
        format!("Failed to fetch content from '{}': {}", url, e)
    };
    Error::Transport(message)
}

/// Suffix match with a dot boundary: `.google.com` admits `google.com` and
/// `lh3.google.com` but not `evil-google.com`.
fn is_allowed_host(host: &str, domains: &[String]) -> bool {
    let host = host.to_ascii_lowercase();
    domains.iter().any(|domain| {
        let domain = domain.to_ascii_lowercase();
        let bare = domain.trim_start_matches('.');
        host == bare || host.ends_with(&format!(".{}", bare))
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn fetcher(cookie: Option<&str>, domains: &[&str]) -> HttpFetcher {
        let config = HttpConfig {
            cookie_header: cookie.map(str::to_string),
            cookie_domains: domains.iter().map(|d| d.to_string()).collect(),
            timeout: Duration::from_secs(5),
            ..HttpConfig::default()
        };
        HttpFetcher::new(&config).unwrap()
    }

    async fn collect(stream: ContentStream) -> Result<Vec<u8>> {
        let chunks: Vec<Vec<u8>> = stream.try_collect().await?;
        Ok(chunks.concat())
    }

    #[test]
    fn cookie_domains_use_dot_boundary() {
        let domains = vec![".google.com".to_string(), ".googleusercontent.com".to_string()];
        assert!(is_allowed_host("google.com", &domains));
        assert!(is_allowed_host("lh3.google.com", &domains));
        assert!(is_allowed_host("LH3.GoogleUserContent.com", &domains));
        assert!(!is_allowed_host("evil-google.com", &domains));
        assert!(!is_allowed_host("google.com.evil.net", &domains));
        assert!(!is_allowed_host("127.0.0.1", &domains));
    }

    #[tokio::test]
    async fn fetch_streams_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/a.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3-audio".to_vec()))
            .mount(&server)
            .await;

        let stream = fetcher(None, &[])
            .fetch(&format!("{}/media/a.mp3", server.uri()))
            .await
            .unwrap();
        assert_eq!(collect(stream).await.unwrap(), b"ID3-audio");
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = match fetcher(None, &[]).fetch(&format!("{}/x", server.uri())).await {
            Err(e) => e,
            Ok(_) => panic!("expected an error for 403"),
        };
        assert!(matches!(err, Error::Transport(ref m) if m.contains("403")));
    }

    #[tokio::test]
    async fn cookie_sent_to_allowed_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("cookie", "SID=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        // The mock server listens on 127.0.0.1, so allow exactly that host
        let stream = fetcher(Some("SID=secret"), &["127.0.0.1"])
            .fetch(&format!("{}/c", server.uri()))
            .await
            .unwrap();
        assert_eq!(collect(stream).await.unwrap(), b"ok");
    }

    #[tokio::test]
    async fn cookie_withheld_from_other_hosts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(|req: &Request| {
                if req.headers.contains_key("cookie") {
                    ResponseTemplate::new(400)
                } else {
                    ResponseTemplate::new(200).set_body_bytes(b"anonymous".to_vec())
                }
            })
            .mount(&server)
            .await;

        let stream = fetcher(Some("SID=secret"), &[".google.com"])
            .fetch(&format!("{}/c", server.uri()))
            .await
            .unwrap();
        assert_eq!(collect(stream).await.unwrap(), b"anonymous");
    }

    #[tokio::test]
    async fn invalid_url_is_transport_error() {
        let err = match fetcher(None, &[]).fetch("not a url").await {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn timeout_is_reported_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let config = HttpConfig {
            timeout: Duration::from_millis(200),
            ..HttpConfig::default()
        };
        let err = match HttpFetcher::new(&config)
            .unwrap()
            .fetch(&format!("{}/slow", server.uri()))
            .await
        {
            Err(e) => e,
            Ok(_) => panic!("expected a timeout"),
        };
        assert!(err.to_string().contains("Timeout"), "{err}");
    }

    /// Serve one response whose body arrives in `chunks`, `gap` apart
    async fn trickle_server(chunks: &'static [&'static [u8]], gap: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut request).await;
            let total: usize = chunks.iter().map(|c| c.len()).sum();
            let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {total}\r\n\r\n");
            socket.write_all(head.as_bytes()).await.unwrap();
            for chunk in chunks {
                tokio::time::sleep(gap).await;
                if socket.write_all(chunk).await.is_err() {
                    return;
                }
                let _ = socket.flush().await;
            }
        });
        format!("http://{addr}/body")
    }

    #[tokio::test]
    async fn slow_body_outlasting_header_timeout_completes() {
        let url = trickle_server(&[b"aa", b"bb", b"cc", b"dd", b"ee"], Duration::from_millis(100)).await;
        let config = HttpConfig {
            timeout: Duration::from_millis(300),
            read_timeout: Duration::from_secs(2),
            ..HttpConfig::default()
        };

        let stream = HttpFetcher::new(&config).unwrap().fetch(&url).await.unwrap();
        assert_eq!(collect(stream).await.unwrap(), b"aabbccddee");
    }

    #[tokio::test]
    async fn stalled_body_hits_read_timeout() {
        let url = trickle_server(&[b"partial", b"never-on-time"], Duration::from_secs(5)).await;
        let config = HttpConfig {
            timeout: Duration::from_secs(10),
            read_timeout: Duration::from_millis(200),
            ..HttpConfig::default()
        };

        let stream = HttpFetcher::new(&config).unwrap().fetch(&url).await.unwrap();
        let err = collect(stream).await.unwrap_err();
        assert!(err.to_string().contains("Timeout reading content"), "{err}");
    }
}
