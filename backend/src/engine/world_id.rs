use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use common_types::{CsrfResponse, RedirectResponse, SessionUser, SessionView};
use http::StatusCode;
use serde_json::json;
use url::Url;

use super::{
    challenge::{Challenge, CHALLENGE_MAX_AGE},
    csrf,
    error::EngineError,
    provider::WorldIdProvider,
    request::{AuthAction, EngineRequest, EngineResponse},
    AuthEngine,
};
use crate::{
    identity::{IdentityProfile, SessionCallbacks},
    session::{SessionCodec, SessionToken},
    types::AuthConfig,
};

/// Provider id used in the sign-in and callback paths
pub const PROVIDER_ID: &str = "worldcoin";
pub const PROVIDER_NAME: &str = "World ID";

/// Auth engine binding World ID to signed-cookie sessions
pub struct WorldIdEngine {
    config: Arc<AuthConfig>,
    codec: SessionCodec,
    provider: WorldIdProvider,
    callbacks: Arc<dyn SessionCallbacks>,
}

impl WorldIdEngine {
    /// # Errors
    ///
    /// Returns `EngineError::ProviderNetwork` if the provider HTTP client cannot be built
    pub fn new(
        config: Arc<AuthConfig>,
        callbacks: Arc<dyn SessionCallbacks>,
    ) -> Result<Self, EngineError> {
        let codec = SessionCodec::from_config(&config);
        let provider = WorldIdProvider::new(config.provider.clone())?;

        Ok(Self {
            config,
            codec,
            provider,
            callbacks,
        })
    }

    fn redirect_uri(&self) -> String {
        self.config.action_url(&format!("callback/{PROVIDER_ID}"))
    }

    /// Keeps redirects on the site's origin; anything else falls back to the site URL
    fn safe_callback_url(&self, candidate: Option<&str>) -> String {
        let site_url = &self.config.site_url;
        match candidate {
            Some(path) if path.starts_with('/') && !path.starts_with("//") => {
                format!("{}{path}", self.config.site_origin)
            }
            Some(candidate) => match Url::parse(candidate) {
                Ok(url) if url.origin() == site_url.origin() => url.to_string(),
                _ => {
                    tracing::warn!(%candidate, "Ignoring off-site callback URL");
                    site_url.to_string()
                }
            },
            None => site_url.to_string(),
        }
    }

    fn providers(&self) -> Result<EngineResponse, EngineError> {
        EngineResponse::json(
            StatusCode::OK,
            &json!({
                PROVIDER_ID: {
                    "id": PROVIDER_ID,
                    "name": PROVIDER_NAME,
                    "type": "oauth",
                    "signinUrl": self.config.action_url(&format!("signin/{PROVIDER_ID}")),
                    "callbackUrl": self.redirect_uri(),
                }
            }),
        )
    }

    fn csrf(&self, request: &EngineRequest) -> Result<EngineResponse, EngineError> {
        let cookies = &self.config.cookies;
        let csrf = csrf::resolve(
            request.cookie(&cookies.csrf_token),
            self.config.session_secret(),
        );

        let mut response = EngineResponse::json(
            StatusCode::OK,
            &CsrfResponse {
                csrf_token: csrf.token,
            },
        )?;
        if let Some(value) = csrf.new_cookie {
            response = response.with_cookie(&cookies.csrf_cookie(value));
        }
        Ok(response)
    }

    fn session(&self, request: &EngineRequest) -> Result<EngineResponse, EngineError> {
        let cookies = &self.config.cookies;
        let Some(raw) = request.cookie(&cookies.session_token) else {
            return EngineResponse::json(StatusCode::OK, &SessionView::default());
        };

        let token = match self.codec.decode::<SessionToken>(raw) {
            Ok(token) => token,
            Err(err) => {
                tracing::debug!("Discarding session cookie: {err}");
                return Ok(
                    EngineResponse::json(StatusCode::OK, &SessionView::default())?
                        .with_cookie(&cookies.removal(&cookies.session_token)),
                );
            }
        };

        let token = self.codec.refresh(self.callbacks.on_issue(token, None));
        let encoded = self.codec.encode(&token)?;
        let view = self.callbacks.on_expose(base_view(&token), &token);

        Ok(EngineResponse::json(StatusCode::OK, &view)?
            .with_cookie(&cookies.session_cookie(encoded, self.codec.max_age())))
    }

    fn sign_in(&self, request: &EngineRequest, provider: &str) -> Result<EngineResponse, EngineError> {
        if provider != PROVIDER_ID {
            return Ok(EngineResponse::client_error(
                StatusCode::BAD_REQUEST,
                "UnsupportedProvider",
            ));
        }

        let cookies = &self.config.cookies;
        let form = request.form();
        if !csrf::verify(
            request.cookie(&cookies.csrf_token),
            form.csrf_token.as_deref(),
            self.config.session_secret(),
        ) {
            return Ok(EngineResponse::client_error(
                StatusCode::FORBIDDEN,
                "MissingCSRF",
            ));
        }

        let challenge = Challenge::generate();
        let url = self
            .provider
            .authorization_url(&self.redirect_uri(), &challenge)?;
        let callback_url = self.safe_callback_url(form.callback_url.as_deref());

        tracing::debug!(%callback_url, "Starting World ID sign-in");

        Ok(EngineResponse::json(
            StatusCode::OK,
            &RedirectResponse {
                url: url.to_string(),
            },
        )?
        .with_cookie(&cookies.challenge_cookie(self.codec.encode(&challenge)?, CHALLENGE_MAX_AGE))
        .with_cookie(&cookies.callback_url_cookie(callback_url)))
    }

    async fn callback(
        &self,
        request: &EngineRequest,
        provider: &str,
    ) -> Result<EngineResponse, EngineError> {
        if provider != PROVIDER_ID {
            return Ok(EngineResponse::client_error(
                StatusCode::BAD_REQUEST,
                "UnsupportedProvider",
            ));
        }

        match self.complete_sign_in(request).await {
            Err(err) => match err.callback_error_code() {
                Some(code) => {
                    tracing::warn!("OAuth callback rejected: {err}");
                    let cookies = &self.config.cookies;
                    Ok(EngineResponse::redirect(
                        &self.config.action_url(&format!("error?error={code}")),
                    )
                    .with_cookie(&cookies.removal(&cookies.challenge)))
                }
                None => Err(err),
            },
            response => response,
        }
    }

    /// Callback steps whose failures the browser is redirected away from
    async fn complete_sign_in(&self, request: &EngineRequest) -> Result<EngineResponse, EngineError> {
        if let Some(error) = request.query_param("error") {
            return Err(EngineError::ProviderDenied(error.to_string()));
        }

        let cookies = &self.config.cookies;
        let challenge: Challenge = self.codec.decode(
            request
                .cookie(&cookies.challenge)
                .ok_or(EngineError::MissingChallenge)?,
        )?;
        if request.query_param("state") != Some(challenge.state.as_str()) {
            return Err(EngineError::StateMismatch);
        }
        let code = request.query_param("code").ok_or(EngineError::MissingCode)?;

        let tokens = self
            .provider
            .exchange_code(code, &self.redirect_uri(), &challenge.code_verifier)
            .await?;
        let claims = self.provider.userinfo(&tokens.access_token).await?;
        let profile = IdentityProfile::from_userinfo(claims)?;

        let mut token = self.codec.new_session();
        token.sub = Some(profile.sub.clone());
        token.name = Some(profile.name.clone().unwrap_or_else(|| profile.sub.clone()));
        token.email.clone_from(&profile.email);
        token.picture.clone_from(&profile.picture);
        let token = self.callbacks.on_issue(token, Some(&profile));

        let destination = self.safe_callback_url(request.cookie(&cookies.callback_url));
        tracing::info!(verification_level = ?profile.verification_level, "World ID sign-in completed");

        Ok(EngineResponse::redirect(&destination)
            .with_cookie(&cookies.session_cookie(self.codec.encode(&token)?, self.codec.max_age()))
            .with_cookie(&cookies.removal(&cookies.challenge)))
    }

    fn sign_out(&self, request: &EngineRequest) -> Result<EngineResponse, EngineError> {
        let cookies = &self.config.cookies;
        let form = request.form();
        if !csrf::verify(
            request.cookie(&cookies.csrf_token),
            form.csrf_token.as_deref(),
            self.config.session_secret(),
        ) {
            return Ok(EngineResponse::client_error(
                StatusCode::FORBIDDEN,
                "MissingCSRF",
            ));
        }

        let url = self.safe_callback_url(form.callback_url.as_deref());
        Ok(EngineResponse::json(StatusCode::OK, &RedirectResponse { url })?
            .with_cookie(&cookies.removal(&cookies.session_token)))
    }

    fn error(request: &EngineRequest) -> Result<EngineResponse, EngineError> {
        let error = request.query_param("error").unwrap_or("Default");
        EngineResponse::json(StatusCode::OK, &json!({ "error": error }))
    }
}

/// Session view the engine builds before the expose hook runs
fn base_view(token: &SessionToken) -> SessionView {
    let has_profile = token.name.is_some() || token.email.is_some() || token.picture.is_some();
    let user = has_profile.then(|| SessionUser {
        name: token.name.clone(),
        email: token.email.clone(),
        image: token.picture.clone(),
        ..SessionUser::default()
    });

    SessionView {
        user,
        expires: DateTime::<Utc>::from_timestamp(token.expires_at, 0)
            .map(|expires| expires.to_rfc3339_opts(SecondsFormat::Secs, true)),
    }
}

#[async_trait::async_trait]
impl AuthEngine for WorldIdEngine {
    async fn handle(&self, request: EngineRequest) -> Result<EngineResponse, EngineError> {
        let action = AuthAction::resolve(&request.method, &request.action);
        tracing::debug!(?action, method = %request.method, "Handling auth request");

        match action {
            AuthAction::Providers => self.providers(),
            AuthAction::Csrf => self.csrf(&request),
            AuthAction::Session => self.session(&request),
            AuthAction::SignIn(provider) => self.sign_in(&request, &provider),
            AuthAction::Callback(provider) => self.callback(&request, &provider).await,
            AuthAction::SignOut => self.sign_out(&request),
            AuthAction::Error => Self::error(&request),
            AuthAction::Unknown => Ok(EngineResponse::client_error(
                StatusCode::NOT_FOUND,
                "UnknownAction",
            )),
        }
    }
}
