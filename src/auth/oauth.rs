use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::GithubConfig;

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";

/// Identity returned by an OAuth provider after a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub login: String,
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn name(&self) -> &'static str;
    /// Where to send the browser to start the flow.
    fn authorize_url(&self, state: &str) -> anyhow::Result<String>;
    /// Trades an authorization code for the signed-in identity.
    async fn fetch_identity(&self, code: &str) -> anyhow::Result<ProviderIdentity>;
}

/// Registered providers, keyed by the name used in `/auth/:provider`.
#[derive(Default)]
pub struct Providers {
    by_name: HashMap<&'static str, Arc<dyn OAuthProvider>>,
}

impl Providers {
    pub fn with(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.by_name.insert(provider.name(), provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OAuthProvider>> {
        self.by_name.get(name).cloned()
    }
}

pub struct GithubProvider {
    http: Client,
    config: GithubConfig,
}

#[derive(Debug, Deserialize)]
struct GithubTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
    id: i64,
    name: Option<String>,
    email: Option<String>,
}

impl GithubProvider {
    pub fn new(config: GithubConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("tikr/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build github http client")?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl OAuthProvider for GithubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn authorize_url(&self, state: &str) -> anyhow::Result<String> {
        let url = Url::parse_with_params(
            GITHUB_AUTHORIZE_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("scope", "user:email"),
                ("state", state),
            ],
        )
        .context("build github authorize url")?;
        Ok(url.to_string())
    }

    #[instrument(skip(self, code))]
    async fn fetch_identity(&self, code: &str) -> anyhow::Result<ProviderIdentity> {
        let token: GithubTokenResponse = self
            .http
            .post(GITHUB_TOKEN_URL)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.callback_url.as_str()),
            ])
            .send()
            .await
            .context("github token request")?
            .error_for_status()
            .context("github token status")?
            .json()
            .await
            .context("github token body")?;

        let access_token = match token.access_token {
            Some(t) => t,
            None => anyhow::bail!(
                "github refused code: {} {}",
                token.error.unwrap_or_default(),
                token.error_description.unwrap_or_default()
            ),
        };

        let user: GithubUser = self
            .http
            .get(GITHUB_USER_URL)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .context("github user request")?
            .error_for_status()
            .context("github user status")?
            .json()
            .await
            .context("github user body")?;

        debug!(login = %user.login, github_id = user.id, "github identity fetched");
        Ok(ProviderIdentity {
            login: user.login,
            id: user.id,
            name: user.name,
            email: user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github() -> GithubProvider {
        GithubProvider::new(GithubConfig {
            client_id: "client-123".into(),
            client_secret: "shh".into(),
            callback_url: "http://localhost:8080/auth/github/callback".into(),
        })
        .expect("client builds")
    }

    #[test]
    fn authorize_url_carries_client_and_state() {
        let url = github().authorize_url("abc.def").unwrap();
        assert!(url.starts_with(GITHUB_AUTHORIZE_URL));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=abc.def"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fgithub%2Fcallback"));
        assert!(!url.contains("shh"));
    }

    #[test]
    fn providers_lookup_by_name() {
        let providers = Providers::default().with(Arc::new(github()));
        assert!(providers.get("github").is_some());
        assert!(providers.get("twitter").is_none());
    }
}
