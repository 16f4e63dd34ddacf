use axum::Router;
use chrono::Duration;
use std::sync::Arc;

use rsvp_server::{
    config::AppConfig,
    create_router,
    group::{
        models::{InvitationGroupModel, NewInvitationGroup},
        repository::{GroupRepository, InMemoryGroupRepository},
    },
    rsvp::repository::InMemoryRsvpRepository,
    session::{
        generate_session_token, hash_session_token,
        models::{SessionModel, UserModel},
        repository::{InMemorySessionRepository, SessionRepository},
    },
    track::repository::InMemoryTrackRepository,
    AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    pub session_repository: Arc<InMemorySessionRepository>,
    pub group_repository: Arc<InMemoryGroupRepository>,
    pub rsvp_repository: Arc<InMemoryRsvpRepository>,
    pub track_repository: Arc<InMemoryTrackRepository>,
    pub user: UserModel,
}

pub struct TestSetupBuilder {
    config: AppConfig,
    groups: Vec<(String, i32)>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig {
                cookie_secure: false,
                base_origin: "https://boda.example.com".to_string(),
                ..AppConfig::default()
            },
            groups: vec![],
        }
    }

    /// Seeds an invitation group with a fixed token and guest quota
    pub fn with_group(mut self, token: &str, suggested_guests: i32) -> Self {
        self.groups.push((token.to_string(), suggested_guests));
        self
    }

    pub async fn build(self) -> TestSetup {
        let user = UserModel::new("marta".to_string());
        let session_repository = Arc::new(InMemorySessionRepository::with_users(vec![user.clone()]));
        let group_repository = Arc::new(InMemoryGroupRepository::new());
        let rsvp_repository = Arc::new(InMemoryRsvpRepository::new());
        let track_repository = Arc::new(InMemoryTrackRepository::new());

        for (token, suggested_guests) in self.groups {
            group_repository
                .create_group(&NewInvitationGroup {
                    token: token.clone(),
                    group_name: format!("Grupo {token}"),
                    group_type: "family".to_string(),
                    suggested_guests,
                    contact_person: None,
                    notes: None,
                })
                .await
                .unwrap();
        }

        let state = AppState::new(
            self.config,
            session_repository.clone(),
            group_repository.clone(),
            rsvp_repository.clone(),
            track_repository.clone(),
        );

        TestSetup {
            app: create_router(state.clone()),
            state,
            session_repository,
            group_repository,
            rsvp_repository,
            track_repository,
            user,
        }
    }
}

impl TestSetup {
    /// Issues a session for the seeded user and returns the raw token
    pub async fn login(&self) -> String {
        let token = generate_session_token();
        self.state
            .session_service
            .create_session(&token, self.user.id)
            .await
            .unwrap();
        token
    }

    /// Stores a session whose expiry is `expires_in` from now, bypassing the
    /// service so tests can place it anywhere in its lifetime
    pub async fn insert_session_expiring_in(&self, expires_in: Duration) -> String {
        let token = generate_session_token();
        let session = SessionModel::new(&token, self.user.id, expires_in);
        self.session_repository
            .create_session(&session)
            .await
            .unwrap();
        token
    }

    pub async fn stored_session(&self, token: &str) -> Option<SessionModel> {
        self.session_repository
            .get_session(&hash_session_token(token))
            .await
    }

    pub async fn group(&self, token: &str) -> InvitationGroupModel {
        self.group_repository
            .find_by_token(token)
            .await
            .unwrap()
            .unwrap()
    }
}
