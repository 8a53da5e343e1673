use tracing::info;

use crate::auth::password::hash_password;
use crate::state::AppState;
use crate::things::NewThing;
use crate::users::{NewUser, Provider, Role};

const DEMO_THINGS: &[(&str, &str)] = &[
    ("Development Tools", "Cargo, clippy and rustfmt for a tidy workflow."),
    ("Server and Client integration", "axum serves the JSON API the client binds to."),
    ("Smart Build System", "Migrations are embedded and run at startup."),
    ("Modular Structure", "Each resource owns its routes, repository and types."),
];

/// Inserts demo things plus a `test` user and an `admin`, skipping whatever
/// already exists.
pub async fn seed(state: &AppState) -> anyhow::Result<()> {
    if state.things.list().await?.is_empty() {
        for (name, info) in DEMO_THINGS {
            state
                .things
                .create(NewThing {
                    name: (*name).to_string(),
                    info: (*info).to_string(),
                    active: true,
                })
                .await?;
        }
        info!(count = DEMO_THINGS.len(), "seeded things");
    }

    for (name, email, password, role) in [
        ("Test User", "test@test.com", "test", Role::User),
        ("Admin", "admin@admin.com", "admin", Role::Admin),
    ] {
        if state.users.find_by_email(email).await?.is_some() {
            continue;
        }
        state
            .users
            .create(NewUser {
                name: name.into(),
                email: Some(email.into()),
                role,
                provider: Provider::Local,
                password_hash: Some(hash_password(password)?),
                github: None,
            })
            .await?;
        info!(email, "seeded user");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let state = AppState::fake();
        seed(&state).await.unwrap();
        seed(&state).await.unwrap();

        assert_eq!(state.things.list().await.unwrap().len(), DEMO_THINGS.len());
        let users = state.users.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.is_admin()));
    }
}
