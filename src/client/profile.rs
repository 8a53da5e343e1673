use reqwest::StatusCode;
use tracing::{info, warn};

use super::api::ApiClient;
use crate::messages::{Message, NewMessageRequest};
use crate::users::{Skill, User};

pub const NOT_FOUND_PATH: &str = "/pagenotfound";

/// Profile page for `/profile/:username`.
pub struct ProfileController {
    api: ApiClient,
    /// Signed-in user, if any.
    current_user: Option<User>,
    pub current_username: String,
    pub user_profile: Option<User>,
    pub show_form_to_add_skills: bool,
    pub skill_name: String,
    pub github_link: String,
    /// Set when the page navigates away.
    pub location: Option<String>,
}

impl ProfileController {
    /// Builds the controller, resolves the signed-in user from the client's
    /// token and loads the profile.
    pub async fn new(api: ApiClient, username: impl Into<String>) -> Self {
        let current_user = if api.has_token() {
            match api.me().await {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "could not load the signed-in user");
                    None
                }
            }
        } else {
            None
        };
        let mut ctrl = Self {
            api,
            current_user,
            current_username: username.into(),
            user_profile: None,
            show_form_to_add_skills: false,
            skill_name: String::new(),
            github_link: String::new(),
            location: None,
        };
        ctrl.get_user_profile().await;
        ctrl
    }

    /// Fetches the profile; a 404 navigates to the not-found page.
    pub async fn get_user_profile(&mut self) {
        match self.api.get_profile(&self.current_username).await {
            Ok(profile) => self.user_profile = Some(profile),
            Err(e) => {
                warn!(error = %e, "There has been an error");
                if e.status() == Some(StatusCode::NOT_FOUND) {
                    self.location = Some(NOT_FOUND_PATH.to_string());
                }
            }
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_logged_in_as_current_user(&self) -> bool {
        self.current_user
            .as_ref()
            .and_then(|u| u.github.as_ref())
            .is_some_and(|g| g.login == self.current_username)
    }

    pub fn show_add_skills_form(&mut self) {
        self.show_form_to_add_skills = true;
    }

    /// Hides the form and, when it validated, posts the skill.
    pub async fn add_a_skill(&mut self, form_valid: bool) {
        self.show_form_to_add_skills = false;
        if !form_valid {
            return;
        }
        let skill = Skill {
            name: self.skill_name.clone(),
            link: self.github_link.clone(),
        };
        match self.api.add_skill(&self.current_username, &skill).await {
            Ok(profile) => self.user_profile = Some(profile),
            Err(e) => warn!(error = %e, "Error adding skill"),
        }
    }

    /// Sends a message; the outcome is only logged.
    pub async fn send_message(&self, title: &str, text: &str, user_github_id: i64) -> Option<Message> {
        let message = NewMessageRequest {
            user_github_id,
            title: title.to_string(),
            message: text.to_string(),
        };
        match self.api.send_message(&message).await {
            Ok(sent) => {
                info!("sent message");
                Some(sent)
            }
            Err(e) => {
                warn!(error = %e, "failed to send message");
                None
            }
        }
    }

    /// Opens the compose dialog for `user`. Users without a GitHub identity
    /// cannot receive messages.
    pub fn send_message_modal(&self, user: &User) -> Option<MessageModal> {
        let github = user.github.as_ref()?;
        Some(MessageModal {
            title: format!("Sending Message to: {}", user.name),
            dismissable: true,
            buttons: [
                ModalButton {
                    classes: "btn-danger",
                    text: "Send",
                    action: ModalAction::Send,
                },
                ModalButton {
                    classes: "btn-default",
                    text: "Cancel",
                    action: ModalAction::Cancel,
                },
            ],
            message_title: String::new(),
            message_text: String::new(),
            recipient_github_id: github.id,
            outcome: None,
        })
    }

    pub fn has_skills(&self) -> bool {
        self.user_profile
            .as_ref()
            .is_some_and(|p| !p.skills.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Send,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct ModalButton {
    pub classes: &'static str,
    pub text: &'static str,
    pub action: ModalAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalOutcome {
    Closed,
    Dismissed,
}

/// Compose dialog bound to a recipient.
#[derive(Debug, Clone)]
pub struct MessageModal {
    pub title: String,
    pub dismissable: bool,
    pub buttons: [ModalButton; 2],
    pub message_title: String,
    pub message_text: String,
    recipient_github_id: i64,
    outcome: Option<ModalOutcome>,
}

impl MessageModal {
    pub fn outcome(&self) -> Option<ModalOutcome> {
        self.outcome
    }

    /// Runs a button's action. Send closes the dialog whether or not the
    /// message went through.
    pub async fn click(&mut self, action: ModalAction, ctrl: &ProfileController) {
        match action {
            ModalAction::Send => {
                ctrl.send_message(&self.message_title, &self.message_text, self.recipient_github_id)
                    .await;
                self.outcome = Some(ModalOutcome::Closed);
            }
            ModalAction::Cancel => self.outcome = Some(ModalOutcome::Dismissed),
        }
    }
}
