//! In-memory repositories and request helpers for tests.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::oauth::{OAuthProvider, ProviderIdentity};
use crate::messages::{Message, MessageRepo, NewMessage};
use crate::state::AppState;
use crate::things::{NewThing, Thing, ThingRepo, ThingUpdate};
use crate::users::{
    GithubIdentity, NewUser, Provider, RepoError, Role, Skill, User, UserRepo, UserSearch,
};

fn search_matches(filter: &UserSearch, user: &User) -> bool {
    let github_login = user.github.as_ref().map(|g| g.login.as_str());
    filter.name.as_deref().map_or(true, |n| n == user.name)
        && filter
            .email
            .as_deref()
            .map_or(true, |e| Some(e) == user.email.as_deref())
        && filter.role.map_or(true, |r| r == user.role)
        && filter.provider.map_or(true, |p| p == user.provider)
        && filter
            .github_login
            .as_deref()
            .map_or(true, |l| Some(l) == github_login)
}

fn apply_update(update: ThingUpdate, thing: &mut Thing) {
    if let Some(name) = update.name {
        thing.name = name;
    }
    if let Some(info) = update.info {
        thing.info = info;
    }
    if let Some(active) = update.active {
        thing.active = active;
    }
}

#[derive(Default)]
pub struct MemoryUserRepo {
    users: RwLock<Vec<User>>,
}

/// Enforces the same unique columns as the `users` table.
fn insert_user(users: &mut Vec<User>, new_user: NewUser) -> Result<User, RepoError> {
    if new_user.email.is_some() && users.iter().any(|u| u.email == new_user.email) {
        return Err(RepoError::DuplicateEmail);
    }
    if let Some(g) = &new_user.github {
        if users
            .iter()
            .any(|u| u.github.as_ref().is_some_and(|h| h.id == g.id || h.login == g.login))
        {
            return Err(RepoError::DuplicateGithub);
        }
    }
    let user = User {
        id: Uuid::new_v4(),
        name: new_user.name,
        email: new_user.email,
        role: new_user.role,
        provider: new_user.provider,
        password_hash: new_user.password_hash,
        github: new_user.github,
        skills: Vec::new(),
        created_at: OffsetDateTime::now_utc(),
    };
    users.push(user.clone());
    Ok(user)
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn search(&self, filter: &UserSearch) -> anyhow::Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| search_matches(filter, u)).cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_github_login(&self, login: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.github.as_ref().is_some_and(|g| g.login == login))
            .cloned())
    }

    async fn find_by_github_id(&self, github_id: i64) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.github.as_ref().is_some_and(|g| g.id == github_id))
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        insert_user(&mut users, new_user)
    }

    async fn create_or_get_github(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        let github_id = new_user
            .github
            .as_ref()
            .map(|g| g.id)
            .ok_or_else(|| anyhow::anyhow!("github identity required"))?;
        if let Some(existing) = users
            .iter()
            .find(|u| u.github.as_ref().is_some_and(|g| g.id == github_id))
        {
            return Ok(existing.clone());
        }
        insert_user(&mut users, new_user)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        let mut users = self.users.write().await;
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.password_hash = Some(password_hash.to_string());
        }
        Ok(())
    }

    async fn push_skill(&self, github_login: &str, skill: Skill) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.github.as_ref().is_some_and(|g| g.login == github_login));
        Ok(user.map(|u| {
            u.skills.push(skill);
            u.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryThingRepo {
    things: RwLock<Vec<Thing>>,
}

#[async_trait]
impl ThingRepo for MemoryThingRepo {
    async fn list(&self) -> anyhow::Result<Vec<Thing>> {
        Ok(self.things.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Thing>> {
        Ok(self.things.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, new_thing: NewThing) -> anyhow::Result<Thing> {
        let thing = Thing {
            id: Uuid::new_v4(),
            name: new_thing.name,
            info: new_thing.info,
            active: new_thing.active,
        };
        self.things.write().await.push(thing.clone());
        Ok(thing)
    }

    async fn update(&self, id: Uuid, update: ThingUpdate) -> anyhow::Result<Option<Thing>> {
        let mut things = self.things.write().await;
        Ok(things.iter_mut().find(|t| t.id == id).map(|t| {
            apply_update(update, t);
            t.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut things = self.things.write().await;
        let before = things.len();
        things.retain(|t| t.id != id);
        Ok(things.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryMessageRepo {
    messages: RwLock<Vec<Message>>,
}

#[async_trait]
impl MessageRepo for MemoryMessageRepo {
    async fn create(&self, message: NewMessage) -> anyhow::Result<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: Some(message.sender_id),
            recipient_github_id: message.recipient_github_id,
            title: message.title,
            body: message.body,
            created_at: OffsetDateTime::now_utc(),
        };
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn list_for_recipient(&self, github_id: i64) -> anyhow::Result<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .rev()
            .filter(|m| m.recipient_github_id == github_id)
            .cloned()
            .collect())
    }
}

/// GitHub stand-in: accepts only the code `good-code`, which signs in as
/// `octocat`.
pub struct FakeGithub;

#[async_trait]
impl OAuthProvider for FakeGithub {
    fn name(&self) -> &'static str {
        "github"
    }

    fn authorize_url(&self, state: &str) -> anyhow::Result<String> {
        Ok(format!("https://fake.github/authorize?state={state}"))
    }

    async fn fetch_identity(&self, code: &str) -> anyhow::Result<ProviderIdentity> {
        if code != "good-code" {
            anyhow::bail!("bad verification code");
        }
        Ok(ProviderIdentity {
            login: "octocat".into(),
            id: 583231,
            name: Some("The Octocat".into()),
            email: Some("octocat@github.com".into()),
        })
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers a local user through the API and returns the session token.
pub async fn register(app: &Router, email: &str, password: &str) -> String {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({"name": "Someone", "email": email, "password": password}),
        ))
        .await
        .unwrap();
    assert!(res.status().is_success(), "register failed: {}", res.status());
    body_json(res).await["token"].as_str().unwrap().to_string()
}

pub async fn seed_github_user(state: &AppState, login: &str, github_id: i64) -> User {
    state
        .users
        .create(NewUser {
            name: login.to_uppercase(),
            email: None,
            role: Role::User,
            provider: Provider::Github,
            password_hash: None,
            github: Some(GithubIdentity {
                login: login.into(),
                id: github_id,
                name: None,
            }),
        })
        .await
        .unwrap()
}

pub async fn seed_admin(state: &AppState) -> User {
    state
        .users
        .create(NewUser {
            name: "Admin".into(),
            email: Some("admin@admin.com".into()),
            role: Role::Admin,
            provider: Provider::Local,
            password_hash: None,
            github: None,
        })
        .await
        .unwrap()
}

pub fn session_for(state: &AppState, user: &User) -> String {
    JwtKeys::from(&state.config.jwt).sign_session(user.id).unwrap()
}

/// Serves the app on an ephemeral port and returns its base url.
pub async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, crate::app::build_app(state))
            .await
            .unwrap();
    });
    format!("http://{addr}")
}
