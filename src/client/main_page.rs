use tracing::{info, warn};

use super::api::ApiClient;
use crate::things::Thing;

/// Landing page: the demo things list plus the OAuth login buttons.
pub struct MainController {
    api: ApiClient,
    pub awesome_things: Vec<Thing>,
    pub new_thing: String,
}

impl MainController {
    /// Builds the controller and loads the current things.
    pub async fn new(api: ApiClient) -> Self {
        let mut ctrl = Self {
            api,
            awesome_things: Vec::new(),
            new_thing: String::new(),
        };
        match ctrl.api.list_things().await {
            Ok(things) => ctrl.awesome_things = things,
            Err(e) => warn!(error = %e, "loading things failed"),
        }
        ctrl
    }

    /// Posts `new_thing` unless it is empty, then clears the field.
    pub async fn add_thing(&mut self) {
        if self.new_thing.is_empty() {
            return;
        }
        let name = std::mem::take(&mut self.new_thing);
        match self.api.create_thing(&name).await {
            Ok(thing) => self.awesome_things.push(thing),
            Err(e) => warn!(error = %e, "adding thing failed"),
        }
    }

    pub async fn delete_thing(&mut self, thing: &Thing) {
        match self.api.delete_thing(thing.id).await {
            Ok(()) => self.awesome_things.retain(|t| t.id != thing.id),
            Err(e) => warn!(error = %e, thing_id = %thing.id, "deleting thing failed"),
        }
    }

    /// Where the browser should go to sign in with `provider`.
    pub fn login_oauth(&self, provider: &str) -> String {
        let location = self.api.url(&["auth", provider]).to_string();
        info!(%location, "oauth login");
        location
    }
}
