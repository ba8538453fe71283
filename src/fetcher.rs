//! Page fetching with a single cooldown retry.
//!
//! The design mirrors a decorator stack:
//! - [`Transport`]: performs one GET and returns the body text
//! - [`HttpTransport`]: the `reqwest` implementation with a fixed `User-Agent`
//! - [`Fetcher`]: wraps any transport, retries once after a cooldown and
//!   parses the body into a [`Document`]
//!
//! Nothing is cached; every call goes to the network.

use crate::error::{CrawlError, TransportFailure};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Performs a single HTTP GET.
///
/// Any failure returned here is treated as a transport failure: connection
/// errors, timeouts and DNS failures are not distinguished.
pub trait Transport {
    async fn get(&self, url: &str) -> Result<String, TransportFailure>;
}

/// `reqwest`-backed transport.
///
/// The response status is not inspected: error pages are parsed like any
/// other page and rejected later by content.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, CrawlError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, TransportFailure> {
        let body = self.client.get(url).send().await?.text().await?;
        Ok(body)
    }
}

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Concatenated text of every node in the page.
    pub fn text(&self) -> String {
        self.html.root_element().text().collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    pub fn select_one(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn select_all<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }
}

/// Text content of an element, joined without separators.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Fetches pages through a [`Transport`], retrying once after `cooldown`.
#[derive(Debug)]
pub struct Fetcher<T> {
    transport: T,
    cooldown: Duration,
}

impl<T> Fetcher<T>
where
    T: Transport,
{
    pub fn new(transport: T, cooldown: Duration) -> Self {
        Self { transport, cooldown }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `url` and parse it.
    ///
    /// A first transport failure is followed by the cooldown and exactly one
    /// more attempt; a second failure is returned as [`CrawlError::Transport`].
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Document, CrawlError> {
        let t0 = Instant::now();
        let body = match self.transport.get(url).await {
            Ok(body) => body,
            Err(first) => {
                warn!(
                    %url,
                    error = %first,
                    cooldown = ?self.cooldown,
                    "Request failed; retrying once after cooldown"
                );
                sleep(self.cooldown).await;
                self.transport.get(url).await.map_err(|source| {
                    error!(%url, error = %source, "Retry failed");
                    CrawlError::Transport {
                        url: url.to_string(),
                        source,
                    }
                })?
            }
        };
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(Document::parse(&body))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport used by the tests of every crawl module.

    use super::Transport;
    use crate::error::TransportFailure;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Answers from per-url scripts first, then from substring routes.
    #[derive(Default)]
    pub struct ScriptedTransport {
        scripts: Mutex<HashMap<String, VecDeque<Result<String, String>>>>,
        routes: Vec<(String, String)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `body` for any url containing `pattern`; earlier routes win.
        pub fn route(mut self, pattern: &str, body: &str) -> Self {
            self.routes.push((pattern.to_string(), body.to_string()));
            self
        }

        /// Serve `responses` in order for exactly `url`; `Err` simulates a
        /// transport failure.
        pub fn script(self, url: &str, responses: Vec<Result<&str, &str>>) -> Self {
            let queue = responses
                .into_iter()
                .map(|r| r.map(str::to_string).map_err(str::to_string))
                .collect();
            self.scripts
                .lock()
                .unwrap()
                .insert(url.to_string(), queue);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_matching(&self, pattern: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.contains(pattern))
                .count()
        }
    }

    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<String, TransportFailure> {
            self.calls.lock().unwrap().push(url.to_string());
            if let Some(queue) = self.scripts.lock().unwrap().get_mut(url) {
                if let Some(response) = queue.pop_front() {
                    return response.map_err(|e| std::io::Error::other(e).into());
                }
            }
            self.routes
                .iter()
                .find(|(pattern, _)| url.contains(pattern.as_str()))
                .map(|(_, body)| body.clone())
                .ok_or_else(|| std::io::Error::other(format!("no route for {url}")).into())
        }
    }
}
