use std::time::{Duration, Instant};

use reqwest::{redirect, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, info, warn};

use crate::api::types::GitInfo;
use crate::error::{AppError, Result};
use crate::notes::file::{FileId, NoteFile};
use crate::notes::tree::FolderNode;

/// Thin async client over the backend's REST endpoints.
///
/// Cloning is cheap and clones share the session cookie, so background
/// tasks each take their own copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Build a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::InvalidUrl(base_url.to_string()));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()?;

        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        self.base
            .join(&format!("api/1/{}", name))
            .map_err(|e| AppError::InvalidUrl(e.to_string()))
    }

    /// Send a request and map the status to the crate's error model.
    async fn send(&self, name: &'static str, request: RequestBuilder) -> Result<Response> {
        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!(
            endpoint = name,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request finished"
        );

        if status.is_redirection() || status == StatusCode::UNAUTHORIZED {
            warn!(endpoint = name, "session missing or expired");
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }
        Ok(response)
    }

    /// Decode a JSON body. The backend does not always set a JSON content
    /// type, so the body is read as text first.
    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Log in with a username and password. The session cookie is kept for
    /// every later call made through this client or its clones.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let url = self.endpoint("login")?;
        let response = self
            .http
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        // Success is a 303 back to the root page.
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            info!(username, "logged in");
            Ok(())
        } else {
            warn!(username, status = status.as_u16(), "login rejected");
            Err(api_error(response).await)
        }
    }

    /// Fetch the full folder tree.
    pub async fn list(&self) -> Result<Vec<FolderNode>> {
        let url = self.endpoint("list")?;
        let response = self.send("list", self.http.get(url)).await?;
        Self::json(response).await
    }

    /// Search note contents. A blank query is answered locally with no
    /// results because the backend rejects it.
    pub async fn search(&self, query: &str) -> Result<Vec<FolderNode>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint("search")?;
        let response = self
            .send("search", self.http.post(url).form(&[("query", query)]))
            .await?;
        Self::json(response).await
    }

    pub async fn pull(&self) -> Result<()> {
        let url = self.endpoint("pull")?;
        self.send("pull", self.http.get(url)).await?;
        info!("pulled");
        Ok(())
    }

    pub async fn push(&self) -> Result<()> {
        let url = self.endpoint("push")?;
        self.send("push", self.http.get(url)).await?;
        info!("pushed");
        Ok(())
    }

    /// Create a new note and commit it. A filename without a directory is
    /// filed by the backend under `unfiled/`.
    pub async fn commit(&self, filename: &str, content: &str) -> Result<()> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(AppError::InvalidInput("filename is empty".into()));
        }
        let url = self.endpoint("commit")?;
        self.send(
            "commit",
            self.http
                .post(url)
                .form(&[("filename", filename), ("content", content)]),
        )
        .await?;
        info!(filename, "committed new note");
        Ok(())
    }

    /// Replace an existing file's content and commit it.
    pub async fn edit(&self, id: FileId, content: &str) -> Result<()> {
        let url = self.endpoint("edit")?;
        let id = id.to_string();
        self.send(
            "edit",
            self.http
                .post(url)
                .form(&[("fileID", id.as_str()), ("fileContent", content)]),
        )
        .await?;
        info!(file_id = %id, "committed edit");
        Ok(())
    }

    /// Load a file's name and content by id.
    pub async fn load(&self, id: FileId) -> Result<NoteFile> {
        let url = self.endpoint("load")?;
        let id = id.to_string();
        let response = self
            .send("load", self.http.post(url).form(&[("fileID", id.as_str())]))
            .await?;
        Self::json(response).await
    }

    pub async fn git_info(&self) -> Result<GitInfo> {
        let url = self.endpoint("git/info")?;
        let response = self.send("git/info", self.http.get(url)).await?;
        Self::json(response).await
    }
}

async fn api_error(response: Response) -> AppError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .map(|body| body.trim().to_string())
        .unwrap_or_default();
    AppError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::http::{header, HeaderMap, StatusCode as AxumStatus};
    use axum::response::{IntoResponse, Response as AxumResponse};
    use axum::routing::{get, post};
    use axum::{Form, Router};

    use crate::notes::tree::NodeState;

    const FILE_ID: &str = "430bf597-74ac-40ad-9453-edcc353bc026";

    const LIST_JSON: &str = r#"[
        {"name":"journal","state":"collapsed","id":"00000000-0000-0000-0000-000000000000","contents":[
            {"name":"monday.md","state":"collapsed","id":"430bf597-74ac-40ad-9453-edcc353bc026","contents":null}
        ]}
    ]"#;

    fn has_session(headers: &HeaderMap) -> bool {
        headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|c| c.contains("session=abc"))
    }

    fn to_login() -> AxumResponse {
        (AxumStatus::FOUND, [(header::LOCATION, "/login.html")]).into_response()
    }

    async fn login(Form(form): Form<HashMap<String, String>>) -> AxumResponse {
        let ok = form.get("username").map(String::as_str) == Some("ada")
            && form.get("password").map(String::as_str) == Some("secret");
        if ok {
            (
                AxumStatus::SEE_OTHER,
                [
                    (header::SET_COOKIE, "session=abc; Path=/"),
                    (header::LOCATION, "/"),
                ],
            )
                .into_response()
        } else {
            (AxumStatus::UNAUTHORIZED, "Failed to login.\n").into_response()
        }
    }

    async fn list(headers: HeaderMap) -> AxumResponse {
        if has_session(&headers) {
            LIST_JSON.into_response()
        } else {
            to_login()
        }
    }

    async fn search(Form(form): Form<HashMap<String, String>>) -> AxumResponse {
        match form.get("query") {
            Some(q) if !q.is_empty() => format!(
                r#"[{{"name":"{}.md","state":"file","id":"{}","contents":null}}]"#,
                q, FILE_ID
            )
            .into_response(),
            _ => (AxumStatus::BAD_REQUEST, "Invalid search query").into_response(),
        }
    }

    async fn edit(Form(form): Form<HashMap<String, String>>) -> AxumResponse {
        let id_ok = form.get("fileID").map(String::as_str) == Some(FILE_ID);
        let content_ok = form.get("fileContent").map(String::as_str) == Some("new body");
        if id_ok && content_ok {
            "{success: true}".into_response()
        } else {
            (AxumStatus::BAD_REQUEST, "unable to parse fileid").into_response()
        }
    }

    async fn commit(Form(form): Form<HashMap<String, String>>) -> AxumResponse {
        match (form.get("filename"), form.get("content")) {
            (Some(name), Some(_)) if !name.is_empty() => "{success: true}".into_response(),
            _ => (AxumStatus::BAD_REQUEST, "Invalid filename").into_response(),
        }
    }

    async fn load(Form(form): Form<HashMap<String, String>>) -> AxumResponse {
        match form.get("fileID") {
            Some(id) if id == FILE_ID => format!(
                r#"{{"id":"{}","name":"monday.md","content":"groceries"}}"#,
                FILE_ID
            )
            .into_response(),
            _ => (AxumStatus::NOT_FOUND, "no such file").into_response(),
        }
    }

    fn backend() -> Router {
        Router::new()
            .route("/api/1/login", post(login))
            .route("/api/1/list", get(list))
            .route("/api/1/search", post(search))
            .route("/api/1/pull", get(|| async { "{success: true}" }))
            .route(
                "/api/1/push",
                get(|| async {
                    (AxumStatus::INTERNAL_SERVER_ERROR, "exit status 128\n").into_response()
                }),
            )
            .route("/api/1/commit", post(commit))
            .route("/api/1/edit", post(edit))
            .route("/api/1/load", post(load))
            .route(
                "/api/1/git/info",
                get(|| async {
                    r#"{"lastCommit":"Last Commit: 1m0s ago.","lastPull":"Last Pull: 2h0m0s ago.","remoteAheadBy":"Remote ahead by: 0","localAheadBy":"Local ahead by: 1"}"#
                }),
            )
    }

    async fn spawn_router(router: Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ApiClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap()
    }

    async fn spawn_backend() -> ApiClient {
        spawn_router(backend()).await
    }

    /// A backend whose session has expired.
    fn expired_backend() -> Router {
        Router::new()
            .route("/api/1/edit", post(|| async { to_login() }))
            .route(
                "/api/1/commit",
                post(|| async { (AxumStatus::UNAUTHORIZED, "").into_response() }),
            )
    }

    fn file_id() -> FileId {
        FileId(uuid::Uuid::parse_str(FILE_ID).unwrap())
    }

    #[test]
    fn new_rejects_bad_urls() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(AppError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("ftp://example.com", Duration::from_secs(1)),
            Err(AppError::InvalidUrl(_))
        ));
    }

    #[test]
    fn endpoints_keep_base_path() {
        let client = ApiClient::new("http://example.com/notes", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("git/info").unwrap().as_str(),
            "http://example.com/notes/api/1/git/info"
        );
    }

    #[tokio::test]
    async fn list_without_session_is_unauthorized() {
        let client = spawn_backend().await;
        let err = client.list().await.unwrap_err();
        assert!(err.needs_login());
    }

    #[tokio::test]
    async fn posts_without_session_are_unauthorized() {
        let client = spawn_router(expired_backend()).await;
        let err = client.edit(file_id(), "new body").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        let err = client.commit("ideas.md", "body").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn login_keeps_session_cookie() {
        let client = spawn_backend().await;
        client.login("ada", "secret").await.unwrap();

        let nodes = client.clone().list().await.unwrap();
        assert_eq!(nodes[0].name, "journal");
        assert_eq!(nodes[0].contents[0].state, NodeState::File);
        assert_eq!(nodes[0].contents[0].id, Some(file_id()));
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let client = spawn_backend().await;
        let err = client.login("ada", "wrong").await.unwrap_err();
        assert!(
            matches!(err, AppError::Api { status: 401, ref message } if message == "Failed to login.")
        );
    }

    #[tokio::test]
    async fn search_returns_file_nodes() {
        let client = spawn_backend().await;
        let results = client.search("milk").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "milk.md");
        assert_eq!(results[0].state, NodeState::File);
    }

    #[tokio::test]
    async fn blank_search_is_not_sent() {
        let client = spawn_backend().await;
        assert!(client.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pull_accepts_non_json_success_body() {
        let client = spawn_backend().await;
        client.pull().await.unwrap();
    }

    #[tokio::test]
    async fn push_failure_carries_server_message() {
        let client = spawn_backend().await;
        let err = client.push().await.unwrap_err();
        assert!(
            matches!(err, AppError::Api { status: 500, ref message } if message == "exit status 128")
        );
    }

    #[tokio::test]
    async fn edit_sends_id_and_content() {
        let client = spawn_backend().await;
        client.edit(file_id(), "new body").await.unwrap();
    }

    #[tokio::test]
    async fn commit_rejects_empty_filename_locally() {
        let client = spawn_backend().await;
        let err = client.commit("  ", "body").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        client.commit("ideas.md", "body").await.unwrap();
    }

    #[tokio::test]
    async fn load_returns_note() {
        let client = spawn_backend().await;
        let note = client.load(file_id()).await.unwrap();
        assert_eq!(note.name, "monday.md");
        assert_eq!(note.content, "groceries");
    }

    #[tokio::test]
    async fn git_info_decodes() {
        let client = spawn_backend().await;
        let info = client.git_info().await.unwrap();
        assert_eq!(info.local_ahead_by, "Local ahead by: 1");
    }
}
