use common_types::{SessionUser, SessionView};

use super::IdentityProfile;
use crate::session::SessionToken;

/// Hook points the engine calls while issuing and exposing sessions
pub trait SessionCallbacks: Send + Sync {
    /// Called when a session token is issued or refreshed. `profile` is only
    /// present right after a provider callback.
    fn on_issue(&self, token: SessionToken, profile: Option<&IdentityProfile>) -> SessionToken;

    /// Called when the session view is built from a verified token
    fn on_expose(&self, session: SessionView, token: &SessionToken) -> SessionView;
}

/// Copies World ID claims into the token and out to the session view
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldIdCallbacks;

impl SessionCallbacks for WorldIdCallbacks {
    fn on_issue(&self, mut token: SessionToken, profile: Option<&IdentityProfile>) -> SessionToken {
        if let Some(profile) = profile {
            token.worldcoin_id = Some(profile.sub.clone());
            token.verification_type.clone_from(&profile.verification_level);
        }
        token
    }

    fn on_expose(&self, mut session: SessionView, token: &SessionToken) -> SessionView {
        if let Some(worldcoin_id) = &token.worldcoin_id {
            let user = session.user.get_or_insert_with(SessionUser::default);
            user.worldcoin_id = Some(worldcoin_id.clone());
            user.verification_type.clone_from(&token.verification_type);
        }
        session
    }
}
