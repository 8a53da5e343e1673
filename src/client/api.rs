use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::auth::dto::TokenResponse;
use crate::messages::{Message, NewMessageRequest};
use crate::things::Thing;
use crate::users::{Skill, User};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("server answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),

    #[error("base url cannot carry a path: {0}")]
    BaseUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::Url(_) | ClientError::BaseUrl(_) => None,
        }
    }
}

/// Thin typed wrapper over the JSON API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(base_url.into()));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Appends each segment to the base path, percent-encoding it.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    async fn check(res: Response) -> Result<Response, ClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }

    async fn json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ClientError> {
        let res = Self::check(req.send().await?).await?;
        Ok(res.json().await?)
    }

    pub async fn login_local(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let req = self
            .http
            .post(self.url(&["auth", "local"]))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let res: TokenResponse = Self::json(req).await?;
        Ok(res.token)
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        Self::json(self.authed(self.http.get(self.url(&["api", "users", "me"])))).await
    }

    pub async fn get_profile(&self, github_username: &str) -> Result<User, ClientError> {
        let url = self.url(&["api", "users", "profiles", github_username]);
        Self::json(self.authed(self.http.get(url))).await
    }

    pub async fn add_skill(&self, github_username: &str, skill: &Skill) -> Result<User, ClientError> {
        let url = self.url(&["api", "users", "profiles", github_username]);
        Self::json(self.authed(self.http.post(url).json(skill))).await
    }

    pub async fn send_message(&self, message: &NewMessageRequest) -> Result<Message, ClientError> {
        let req = self.http.post(self.url(&["api", "messages"])).json(message);
        Self::json(self.authed(req)).await
    }

    pub async fn list_things(&self) -> Result<Vec<Thing>, ClientError> {
        Self::json(self.authed(self.http.get(self.url(&["api", "things"])))).await
    }

    pub async fn create_thing(&self, name: &str) -> Result<Thing, ClientError> {
        let req = self
            .http
            .post(self.url(&["api", "things"]))
            .json(&serde_json::json!({ "name": name }));
        Self::json(self.authed(req)).await
    }

    pub async fn delete_thing(&self, id: Uuid) -> Result<(), ClientError> {
        let req = self.http.delete(self.url(&["api", "things", &id.to_string()]));
        Self::check(self.authed(req).send().await?).await?;
        Ok(())
    }
}
