use super::BacklogService;
use crate::error::{CardsError, Result};
use crate::model::{Filter, LabelSet, Project, Story, StoryKind};
use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://www.pivotaltracker.com/services/v5";

const TOKEN_HEADER: &str = "X-TrackerToken";
const TOTAL_HEADER: &str = "X-Tracker-Pagination-Total";
const PAGE_SIZE: usize = 100;
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct WireLabel {
    name: String,
}

#[derive(Debug, Serialize)]
struct WireLabelName<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct LabelsUpdate<'a> {
    labels: Vec<WireLabelName<'a>>,
}

#[derive(Debug, Deserialize)]
struct WireStory {
    id: u64,
    project_id: u64,
    #[serde(default)]
    name: String,
    story_type: StoryKind,
    #[serde(default)]
    estimate: Option<i64>,
    #[serde(default)]
    current_state: Option<String>,
    #[serde(default)]
    labels: Vec<WireLabel>,
}

impl From<WireStory> for Story {
    fn from(w: WireStory) -> Self {
        let mut story = Story::new(w.id, w.name, w.story_type)
            .with_project(w.project_id)
            .with_labels(w.labels.iter().map(|l| l.name.as_str()).collect());
        if let Some(estimate) = w.estimate {
            story = story.with_estimate(estimate);
        }
        if let Some(state) = w.current_state {
            story = story.with_state(state);
        }
        story
    }
}

#[derive(Debug, Deserialize)]
struct WireMe {
    #[serde(default)]
    username: Option<String>,
}

/// Blocking client for the Pivotal Tracker v5 REST API.
pub struct TrackerClient {
    http: Client,
    base: Url,
}

impl TrackerClient {
    /// Build a client for `api_url` and check that `api_key` is accepted.
    pub fn authenticate(api_url: &str, api_key: &str) -> Result<Self> {
        let client = Self::new(api_url, api_key)?;
        client.whoami()?;
        Ok(client)
    }

    pub fn new(api_url: &str, api_key: &str) -> Result<Self> {
        Self::with_http(api_url, http_builder(api_key)?.build()?)
    }

    fn with_http(api_url: &str, http: Client) -> Result<Self> {
        Ok(Self {
            http,
            base: parse_base(api_url)?,
        })
    }

    fn whoami(&self) -> Result<()> {
        let me: WireMe = self.get(&["me"], &[])?.json()?;
        tracing::info!(user = me.username.as_deref().unwrap_or("?"), "Authenticated");
        Ok(())
    }

    fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Response> {
        let url = endpoint(&self.base, segments, query)?;
        tracing::debug!(url = %url, "GET");
        Ok(self.http.get(url).send()?.error_for_status()?)
    }
}

fn http_builder(api_key: &str) -> Result<ClientBuilder> {
    // Several callers may build clients; only the first install wins.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let mut token = HeaderValue::from_str(api_key)
        .map_err(|_| CardsError::Config("API key contains invalid characters".to_string()))?;
    token.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(TOKEN_HEADER, token);

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))))
}

fn parse_base(api_url: &str) -> Result<Url> {
    let mut base = Url::parse(api_url)
        .map_err(|e| CardsError::Config(format!("Invalid API URL {}: {}", api_url, e)))?;
    if base.cannot_be_a_base() {
        return Err(CardsError::Config(format!("Invalid API URL {}", api_url)));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn endpoint(base: &Url, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CardsError::Config(format!("Invalid API URL {}", base)))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Server-side narrowing for the filter dimensions the API accepts as a
/// single value. The full filter is still applied to the results.
fn filter_hints(filter: &Filter) -> Vec<(&'static str, String)> {
    let mut hints = Vec::new();
    if let Some(label) = Filter::single(&filter.labels) {
        hints.push(("with_label", label.to_string()));
    }
    if let Some(kind) = Filter::single(&filter.kinds) {
        hints.push(("with_story_type", kind.to_string()));
    }
    if let Some(state) = Filter::single(&filter.states) {
        hints.push(("with_state", state.to_string()));
    }
    hints
}

fn pagination_total(response: &Response) -> Option<usize> {
    response
        .headers()
        .get(TOTAL_HEADER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

impl BacklogService for TrackerClient {
    fn project(&self, project_id: &str) -> Result<Project> {
        let project: Project = self.get(&["projects", project_id], &[])?.json()?;
        Ok(project)
    }

    fn list_stories(&self, project_id: &str, filter: &Filter) -> Result<Vec<Story>> {
        let hints = filter_hints(filter);
        let mut stories = Vec::new();
        let mut offset = 0;

        loop {
            let mut query = hints.clone();
            query.push(("limit", PAGE_SIZE.to_string()));
            query.push(("offset", offset.to_string()));

            let response = self.get(&["projects", project_id, "stories"], &query)?;
            let total = pagination_total(&response);
            let page: Vec<WireStory> = response.json()?;
            let fetched = page.len();
            offset += fetched;

            stories.extend(page.into_iter().map(Story::from).filter(|s| filter.matches(s)));

            let done = match total {
                Some(total) => offset >= total,
                None => fetched < PAGE_SIZE,
            };
            if done || fetched == 0 {
                break;
            }
        }

        tracing::info!(project = project_id, count = stories.len(), "Fetched stories");
        Ok(stories)
    }

    fn update_labels(&self, story: &Story, labels: &LabelSet) -> Result<()> {
        let url = endpoint(
            &self.base,
            &[
                "projects",
                &story.project_id.to_string(),
                "stories",
                &story.id.to_string(),
            ],
            &[],
        )?;
        let body = LabelsUpdate {
            labels: labels.iter().map(|name| WireLabelName { name }).collect(),
        };
        tracing::debug!(story = story.id, labels = %labels, "PUT labels");
        self.http.put(url).json(&body).send()?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc::{self, Receiver};
    use std::thread;

    #[test]
    fn test_endpoint_joins_segments() {
        let base = parse_base(DEFAULT_API_URL).unwrap();
        let url = endpoint(&base, &["projects", "123", "stories"], &[("limit", "100".into())]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.pivotaltracker.com/services/v5/projects/123/stories?limit=100"
        );
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let base = parse_base("http://localhost:8080/api/").unwrap();
        let url = endpoint(&base, &["projects", "a b"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/projects/a%20b");
    }

    #[test]
    fn test_invalid_base_is_config_error() {
        let err = parse_base("not a url").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_filter_hints_only_for_single_values() {
        let filter = Filter {
            labels: Some(vec!["to-print".into()]),
            kinds: Some(vec!["feature".into(), "bug".into()]),
            states: Some(vec!["started".into()]),
            ids: Some(vec!["1".into()]),
        };
        assert_eq!(
            filter_hints(&filter),
            vec![
                ("with_label", "to-print".to_string()),
                ("with_state", "started".to_string())
            ]
        );
    }

    #[test]
    fn test_wire_story_conversion() {
        let json = r#"{
            "kind": "story",
            "id": 42,
            "project_id": 99,
            "name": "Login flow",
            "story_type": "feature",
            "current_state": "unstarted",
            "estimate": 3,
            "labels": [
                {"id": 1, "kind": "label", "name": "to-print"},
                {"id": 2, "kind": "label", "name": "ux"}
            ]
        }"#;
        let story: Story = serde_json::from_str::<WireStory>(json).unwrap().into();
        assert_eq!(story.id, 42);
        assert_eq!(story.project_id, 99);
        assert_eq!(story.kind, StoryKind::Feature);
        assert_eq!(story.points(), Some(3));
        assert_eq!(story.state.as_deref(), Some("unstarted"));
        assert_eq!(story.labels.to_delimited(), "to-print,ux");
    }

    #[test]
    fn test_wire_story_without_estimate_or_labels() {
        let json = r#"{"id": 7, "project_id": 1, "name": "Crash", "story_type": "spike"}"#;
        let story: Story = serde_json::from_str::<WireStory>(json).unwrap().into();
        assert_eq!(story.kind, StoryKind::Other("spike".into()));
        assert_eq!(story.estimate, None);
        assert!(story.labels.is_empty());
    }

    #[test]
    fn test_labels_update_body() {
        let labels = LabelSet::from_delimited("ux,p");
        let body = LabelsUpdate {
            labels: labels.iter().map(|name| WireLabelName { name }).collect(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"labels": [{"name": "ux"}, {"name": "p"}]})
        );
    }

    /// One HTTP request as seen by [`serve`].
    #[derive(Debug)]
    struct Request {
        method: String,
        target: String,
        token: Option<String>,
        body: String,
    }

    struct Reply {
        status: u16,
        total: Option<usize>,
        body: String,
    }

    impl Reply {
        fn json(body: serde_json::Value) -> Self {
            Self {
                status: 200,
                total: None,
                body: body.to_string(),
            }
        }

        fn with_total(mut self, total: usize) -> Self {
            self.total = Some(total);
            self
        }
    }

    fn read_request(stream: &TcpStream) -> std::io::Result<Request> {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let mut parts = line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let target = parts.next().unwrap_or_default().to_string();

        let mut token = None;
        let mut length = 0;
        loop {
            line.clear();
            reader.read_line(&mut line)?;
            let header = line.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                let value = value.trim();
                if name.eq_ignore_ascii_case(TOKEN_HEADER) {
                    token = Some(value.to_string());
                } else if name.eq_ignore_ascii_case("content-length") {
                    length = value.parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0; length];
        reader.read_exact(&mut body)?;
        Ok(Request {
            method,
            target,
            token,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Serve on a loopback port, answering each request with `route` and
    /// reporting it on the returned channel. Returns a client for the server.
    fn serve<F>(route: F) -> (TrackerClient, Receiver<Request>)
    where
        F: Fn(&Request) -> Reply + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let api_url = format!("http://{}/services/v5", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let Ok(request) = read_request(&stream) else { continue };
                let reply = route(&request);
                let mut head = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                    reply.status,
                    reply.body.len()
                );
                if let Some(total) = reply.total {
                    head.push_str(&format!("{}: {}\r\n", TOTAL_HEADER, total));
                }
                head.push_str("\r\n");
                if tx.send(request).is_err() {
                    break;
                }
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(reply.body.as_bytes());
            }
        });

        let http = http_builder("secret").unwrap().no_proxy().build().unwrap();
        (TrackerClient::with_http(&api_url, http).unwrap(), rx)
    }

    fn wire_story(id: u64, labels: &[&str]) -> serde_json::Value {
        let labels: Vec<_> = labels.iter().map(|name| serde_json::json!({ "name": name })).collect();
        serde_json::json!({
            "id": id,
            "project_id": 99,
            "name": format!("Story {}", id),
            "story_type": "feature",
            "current_state": "unstarted",
            "labels": labels,
        })
    }

    #[test]
    fn test_whoami_sends_token() {
        let (client, requests) = serve(|_| Reply::json(serde_json::json!({ "username": "ada" })));

        client.whoami().unwrap();

        let request = requests.recv().unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.target, "/services/v5/me");
        assert_eq!(request.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_rejected_token_is_remote_error() {
        let (client, _requests) = serve(|_| Reply {
            status: 403,
            total: None,
            body: r#"{"error":"invalid_authentication"}"#.to_string(),
        });

        let err = client.whoami().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Remote);
    }

    #[test]
    fn test_project_lookup() {
        let (client, requests) =
            serve(|_| Reply::json(serde_json::json!({ "id": 99, "name": "Web site", "kind": "project" })));

        let project = client.project("99").unwrap();

        assert_eq!(project, Project { id: 99, name: "Web site".to_string() });
        assert_eq!(requests.recv().unwrap().target, "/services/v5/projects/99");
    }

    #[test]
    fn test_list_stories_follows_pagination_total() {
        let (client, requests) = serve(|request| {
            if request.target.contains("offset=0") {
                Reply::json(serde_json::json!([
                    wire_story(1, &["to-print"]),
                    wire_story(2, &["backend"]),
                ]))
                .with_total(3)
            } else {
                Reply::json(serde_json::json!([wire_story(3, &["to-print", "ux"])])).with_total(3)
            }
        });

        let stories = client.list_stories("99", &Filter::to_print()).unwrap();

        let ids: Vec<u64> = stories.iter().map(|s| s.id).collect();
        assert_eq!(ids, [1, 3]);

        let targets: Vec<String> = requests.try_iter().map(|r| r.target).collect();
        assert_eq!(
            targets,
            [
                "/services/v5/projects/99/stories?with_label=to-print&limit=100&offset=0",
                "/services/v5/projects/99/stories?with_label=to-print&limit=100&offset=2",
            ]
        );
    }

    #[test]
    fn test_list_stories_stops_on_short_page() {
        let (client, requests) = serve(|_| Reply::json(serde_json::json!([wire_story(5, &["to-print"])])));

        let filter = Filter {
            labels: Some(vec!["to-print".into(), "reprint".into()]),
            ..Filter::default()
        };
        let stories = client.list_stories("99", &filter).unwrap();

        assert_eq!(stories.len(), 1);
        let targets: Vec<String> = requests.try_iter().map(|r| r.target).collect();
        assert_eq!(targets, ["/services/v5/projects/99/stories?limit=100&offset=0"]);
    }

    #[test]
    fn test_update_labels_puts_label_names() {
        let (client, requests) = serve(|_| Reply::json(wire_story(42, &["ux", "p"])));
        let story = Story::new(42, "Login flow", StoryKind::Feature).with_project(99);

        client
            .update_labels(&story, &LabelSet::from_delimited("ux,p"))
            .unwrap();

        let request = requests.recv().unwrap();
        assert_eq!(request.method, "PUT");
        assert_eq!(request.target, "/services/v5/projects/99/stories/42");
        assert_eq!(request.token.as_deref(), Some("secret"));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&request.body).unwrap(),
            serde_json::json!({"labels": [{"name": "ux"}, {"name": "p"}]})
        );
    }

    #[test]
    fn test_failed_update_is_remote_error() {
        let (client, _requests) = serve(|_| Reply {
            status: 500,
            total: None,
            body: "{}".to_string(),
        });
        let story = Story::new(42, "Login flow", StoryKind::Feature).with_project(99);

        let err = client.update_labels(&story, &LabelSet::from_delimited("p")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Remote);
    }
}
