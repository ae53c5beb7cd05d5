//! The token server: grant dispatch and finalization.
//!
//! [`TokenServer`] owns the configured grant pipeline. Processing is split
//! in two phases with the embedding application's authorization decision in
//! between:
//!
//! ```ignore
//! let mut reply = TokenReply::new();
//! if let Some(mut ar) = server.handle_access_request(&mut reply, &request).await {
//!     ar.authorized = verify_owner(&ar);
//!     server.finish_access_request(&mut reply, &ar).await;
//! }
//! // render `reply`
//! ```
//!
//! Every failure path records a typed OAuth error on the reply and yields no
//! request; the finalizer is a no-op once the reply is in error.

use std::sync::Arc;

use http::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ServerConfig;
use crate::error::AuthError;
use crate::oauth::access_request::{AccessRequest, GrantType};
use crate::oauth::client_auth;
use crate::oauth::pkce;
use crate::oauth::redirect;
use crate::oauth::reply::TokenReply;
use crate::oauth::request::TokenEndpointRequest;
use crate::oauth::scope;
use crate::storage::{AccessStorage, AuthorizationStorage, ClientStorage};
use crate::token::AccessTokenGenerator;
use crate::types::{AccessData, Client};
use crate::AuthResult;

/// The access-token grant server.
pub struct TokenServer {
    config: ServerConfig,
    clients: Arc<dyn ClientStorage>,
    authorizations: Arc<dyn AuthorizationStorage>,
    access: Arc<dyn AccessStorage>,
    token_generator: Arc<dyn AccessTokenGenerator>,
    clock: Arc<dyn Clock>,
}

impl TokenServer {
    /// Creates a new token server.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        clients: Arc<dyn ClientStorage>,
        authorizations: Arc<dyn AuthorizationStorage>,
        access: Arc<dyn AccessStorage>,
        token_generator: Arc<dyn AccessTokenGenerator>,
    ) -> Self {
        Self {
            config,
            clients,
            authorizations,
            access,
            token_generator,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source. Expiry checks and `created_at` stamps all
    /// route through it.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Phase one: validates the request and builds an [`AccessRequest`].
    ///
    /// On any failure the reply carries the OAuth error and `None` is
    /// returned. On success the caller must decide authorization and invoke
    /// [`finish_access_request`](Self::finish_access_request).
    pub async fn handle_access_request(
        &self,
        reply: &mut TokenReply,
        request: &TokenEndpointRequest,
    ) -> Option<AccessRequest> {
        if request.method == Method::GET {
            if !self.config.allow_get_access_request {
                reply.fail(AuthError::invalid_request("access request must use POST"));
                return None;
            }
        } else if request.method != Method::POST {
            reply.fail(AuthError::invalid_request("access request must use POST"));
            return None;
        }

        let grant_type = request.form("grant_type");
        let Some(grant) = GrantType::parse(grant_type)
            .filter(|grant| self.config.allowed_access_types.contains(grant))
        else {
            reply.fail(AuthError::unsupported_grant_type(grant_type));
            return None;
        };

        debug!(grant_type = %grant, "processing access token request");

        let result = match grant {
            GrantType::AuthorizationCode => self.authorization_code_request(request).await,
            GrantType::RefreshToken => self.refresh_token_request(request).await,
            GrantType::Password => self.password_request(request).await,
            GrantType::ClientCredentials => self.client_credentials_request(request).await,
            GrantType::Assertion => self.assertion_request(request).await,
            GrantType::Anonymous => self.anonymous_request(request).await,
            GrantType::Device => self.device_request(request).await,
            GrantType::Platform => self.platform_request(request).await,
        };

        match result {
            Ok(access_request) => Some(access_request),
            Err(error) => {
                warn!(grant_type = %grant, %error, "access token request rejected");
                reply.fail(error);
                None
            }
        }
    }

    /// Phase two: mints and persists the grant, invalidates predecessors,
    /// and populates the reply.
    ///
    /// Returns immediately when the reply is already in error. When the
    /// request was not authorized, records `access_denied`.
    pub async fn finish_access_request(&self, reply: &mut TokenReply, ar: &AccessRequest) {
        if reply.is_error() {
            return;
        }

        // The URI recorded by the handler wins over the raw form value, so
        // refresh/device/etc. cannot be steered by an arbitrary parameter.
        let mut redirect_uri = ar.request.form("redirect_uri").to_string();
        if !ar.redirect_uri.is_empty() {
            redirect_uri = ar.redirect_uri.clone();
        }

        if !ar.authorized {
            reply.fail(AuthError::access_denied("access request was not authorized"));
            return;
        }

        let access_data = match &ar.force_access_data {
            Some(forced) => forced.clone(),
            None => {
                let mut data = AccessData {
                    client: ar.client.clone(),
                    authorize_code: ar.authorize_data.as_ref().map(|a| a.code.clone()),
                    prior_access_token: ar.access_data.as_ref().map(|a| a.access_token.clone()),
                    access_token: String::new(),
                    refresh_token: None,
                    expires_in: ar.expiration,
                    refresh_expires_in: ar.refresh_expiration,
                    scope: ar.scope.clone(),
                    redirect_uri,
                    created_at: self.clock.now(),
                    user_data: ar.user_data.clone(),
                };

                match self.token_generator.generate(&data, ar.generate_refresh).await {
                    Ok(pair) => {
                        data.access_token = pair.access_token;
                        data.refresh_token = pair.refresh_token;
                    }
                    Err(error) => {
                        reply.fail(AuthError::token_generation(format!(
                            "failed to generate access token: {error}"
                        )));
                        return;
                    }
                }
                data
            }
        };

        if let Err(error) = self.access.save(&access_data).await {
            reply.fail(AuthError::storage(format!(
                "failed to persist access data: {error}"
            )));
            return;
        }

        // Invalidation happens strictly after the save above: a crash
        // between the steps leaves a stale record, never zero records.
        if let Some(code) = &access_data.authorize_code {
            if let Err(error) = self.authorizations.remove_by_code(code).await {
                warn!(
                    client_id = %ar.client.client_id,
                    %error,
                    "failed to remove redeemed authorization code; code is left dangling"
                );
            }
        }
        if !self.config.retain_token_after_refresh {
            if let Some(prior) = &access_data.prior_access_token {
                if let Err(error) = self.access.remove_by_access_token(prior).await {
                    warn!(
                        client_id = %ar.client.client_id,
                        %error,
                        "failed to remove refreshed access token"
                    );
                }
            }
        }

        reply.set_output("access_token", access_data.access_token.clone());
        reply.set_output("token_type", self.config.token_type.clone());
        reply.set_output("expires_in", access_data.expires_in);
        if let Some(refresh_token) = access_data
            .refresh_token
            .as_deref()
            .filter(|token| !token.is_empty())
        {
            reply.set_output("refresh_token", refresh_token);
            reply.set_output("refresh_expires_in", access_data.refresh_expires_in);
            if !ar.skip_set_cookie
                && let Some(cookie) = self.config.cookie.build_cookie(
                    "refresh_token",
                    refresh_token,
                    access_data.refresh_expires_in,
                )
            {
                reply.add_set_cookie(cookie);
            }
        }
        if !access_data.scope.is_empty() {
            reply.set_output("scope", access_data.scope.clone());
        }
        if !ar.skip_set_cookie
            && let Some(cookie) = self.config.cookie.build_cookie(
                "access_token",
                &access_data.access_token,
                access_data.expires_in,
            )
        {
            reply.add_set_cookie(cookie);
        }

        info!(
            client_id = %ar.client.client_id,
            grant_type = %ar.grant_type,
            "access token issued"
        );
    }

    /// Resolves the client for the dual-auth grants: with the secret when a
    /// Basic header is present, by bare `client_id` otherwise.
    async fn resolve_dual_auth_client(&self, r: &TokenEndpointRequest) -> AuthResult<Client> {
        match r.basic_auth()? {
            Some(credentials) => {
                client_auth::authenticate_client(self.clients.as_ref(), &credentials).await
            }
            None => {
                let client_id = r.form("client_id");
                if client_id.is_empty() {
                    return Err(AuthError::unauthorized_client(
                        "client_id missing from request body",
                    ));
                }
                client_auth::resolve_client_without_secret(self.clients.as_ref(), client_id).await
            }
        }
    }

    async fn authorization_code_request(
        &self,
        r: &TokenEndpointRequest,
    ) -> AuthResult<AccessRequest> {
        let client = self.resolve_dual_auth_client(r).await?;

        let code = r.form("code");
        if code.is_empty() {
            return Err(AuthError::invalid_grant("authorization code is empty"));
        }

        let authorize_data = self
            .authorizations
            .find_by_code(code)
            .await
            .map_err(|error| {
                warn!(%error, "authorization code lookup failed");
                AuthError::invalid_grant("failed to load authorization code")
            })?
            .ok_or_else(|| AuthError::unauthorized_client("authorization code not found"))?;

        if !authorize_data.client.has_redirect_uri() {
            return Err(AuthError::unauthorized_client(
                "authorizing client has no registered redirect uri",
            ));
        }
        if authorize_data.is_expired_at(self.clock.now()) {
            return Err(AuthError::invalid_grant("authorization code is expired"));
        }

        // The code must have been issued to the authenticated client.
        if authorize_data.client.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "authorization code was issued to another client",
            ));
        }

        let mut redirect_uri = r.form("redirect_uri").to_string();
        if redirect_uri.is_empty() {
            redirect_uri =
                redirect::first_uri(&client.redirect_uri, &self.config.redirect_uri_separator);
        }
        redirect::validate_uri_list(
            &client.redirect_uri,
            &redirect_uri,
            &self.config.redirect_uri_separator,
        )?;
        if authorize_data.redirect_uri != redirect_uri {
            return Err(AuthError::invalid_request(
                "redirect_uri does not match the authorization request",
            ));
        }

        // https://tools.ietf.org/html/rfc7636#section-4.6
        if authorize_data.has_code_challenge() {
            let challenge = authorize_data.code_challenge.as_deref().unwrap_or_default();
            let method = authorize_data
                .code_challenge_method
                .as_deref()
                .unwrap_or_default();
            pkce::verify_challenge(challenge, method, r.form("code_verifier"))?;
        }

        let mut ar = self.seed_request(GrantType::AuthorizationCode, client, r);
        ar.code = code.to_string();
        ar.code_verifier = r.form("code_verifier").to_string();
        ar.redirect_uri = redirect_uri;
        ar.scope = authorize_data.scope.clone();
        ar.user_data = authorize_data.user_data.clone();
        ar.authorize_data = Some(authorize_data);
        Ok(ar)
    }

    async fn refresh_token_request(&self, r: &TokenEndpointRequest) -> AuthResult<AccessRequest> {
        let credentials = r.client_credentials(self.config.allow_client_secret_in_params)?;

        let mut refresh_token = r.form("refresh_token").to_string();
        if refresh_token.is_empty() {
            refresh_token = r.cookie("refresh_token").unwrap_or_default().to_string();
        }
        if refresh_token.is_empty() {
            return Err(AuthError::invalid_grant("refresh_token is empty"));
        }

        let client = client_auth::authenticate_client(self.clients.as_ref(), &credentials).await?;

        let access_data = self
            .access
            .find_by_refresh_token(&refresh_token)
            .await
            .map_err(|error| AuthError::storage(format!("failed to load refresh token: {error}")))?
            .ok_or_else(|| AuthError::invalid_grant("refresh token is invalid"))?;

        if !access_data.client.has_redirect_uri() {
            return Err(AuthError::invalid_grant(
                "access data client has no registered redirect uri",
            ));
        }

        // The refresh token must stay with the client it was issued to.
        if access_data.client.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "client id must match the client that obtained the refresh token",
            ));
        }

        let mut ar = self.seed_request(GrantType::RefreshToken, client, r);
        ar.code = refresh_token;
        ar.redirect_uri = access_data.redirect_uri.clone();
        ar.user_data = access_data.user_data.clone();
        ar.scope = r.form("scope").to_string();
        if ar.scope.is_empty() {
            ar.scope = access_data.scope.clone();
        }

        if scope::requests_extra_scope(&access_data.scope, &ar.scope) {
            return Err(AuthError::access_denied(
                "the requested scope must not include any scope not originally granted by the resource owner",
            ));
        }

        ar.access_data = Some(access_data);
        Ok(ar)
    }

    async fn password_request(&self, r: &TokenEndpointRequest) -> AuthResult<AccessRequest> {
        let credentials = r.client_credentials(self.config.allow_client_secret_in_params)?;

        let username = r.form("username");
        let password = r.form("password");
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::invalid_grant("username and password are required"));
        }

        let client = client_auth::authenticate_client(self.clients.as_ref(), &credentials).await?;

        let mut ar = self.seed_request(GrantType::Password, client, r);
        ar.username = username.to_string();
        ar.password = password.to_string();
        ar.scope = r.form("scope").to_string();
        ar.redirect_uri =
            redirect::first_uri(&ar.client.redirect_uri, &self.config.redirect_uri_separator);
        Ok(ar)
    }

    async fn client_credentials_request(
        &self,
        r: &TokenEndpointRequest,
    ) -> AuthResult<AccessRequest> {
        let credentials = r.client_credentials(self.config.allow_client_secret_in_params)?;
        if credentials.password.is_empty() {
            return Err(AuthError::invalid_grant("client secret is empty"));
        }

        let client = client_auth::authenticate_client(self.clients.as_ref(), &credentials).await?;

        let mut ar = self.seed_request(GrantType::ClientCredentials, client, r);
        ar.generate_refresh = false;
        ar.skip_set_cookie = true;
        ar.scope = r.form("scope").to_string();
        ar.redirect_uri =
            redirect::first_uri(&ar.client.redirect_uri, &self.config.redirect_uri_separator);
        Ok(ar)
    }

    async fn assertion_request(&self, r: &TokenEndpointRequest) -> AuthResult<AccessRequest> {
        let credentials = r.client_credentials(self.config.allow_client_secret_in_params)?;

        let assertion_type = r.form("assertion_type");
        let assertion = r.form("assertion");
        if assertion_type.is_empty() || assertion.is_empty() {
            return Err(AuthError::invalid_grant(
                "assertion_type and assertion are required",
            ));
        }

        let client = client_auth::authenticate_client(self.clients.as_ref(), &credentials).await?;

        let mut ar = self.seed_request(GrantType::Assertion, client, r);
        // Assertion grants must not produce a refresh token (RFC 6749).
        ar.generate_refresh = false;
        ar.assertion_type = assertion_type.to_string();
        ar.assertion = assertion.to_string();
        ar.scope = r.form("scope").to_string();
        ar.redirect_uri =
            redirect::first_uri(&ar.client.redirect_uri, &self.config.redirect_uri_separator);
        Ok(ar)
    }

    async fn anonymous_request(&self, r: &TokenEndpointRequest) -> AuthResult<AccessRequest> {
        let credentials = r.client_credentials(self.config.allow_client_secret_in_params)?;
        let client = client_auth::authenticate_client(self.clients.as_ref(), &credentials).await?;

        let mut ar = self.seed_request(GrantType::Anonymous, client, r);
        ar.username = r.form("user_id").to_string();
        ar.scope = r.form("scope").to_string();
        ar.redirect_uri =
            redirect::first_uri(&ar.client.redirect_uri, &self.config.redirect_uri_separator);
        Ok(ar)
    }

    async fn device_request(&self, r: &TokenEndpointRequest) -> AuthResult<AccessRequest> {
        let credentials = r.client_credentials(self.config.allow_client_secret_in_params)?;
        let client = client_auth::authenticate_client(self.clients.as_ref(), &credentials).await?;

        let mut ar = self.seed_request(GrantType::Device, client, r);
        // The device id rides in the password field for the
        // authorized-decision callback.
        ar.password = r.form("device_id").to_string();
        ar.scope = r.form("scope").to_string();
        ar.redirect_uri =
            redirect::first_uri(&ar.client.redirect_uri, &self.config.redirect_uri_separator);
        Ok(ar)
    }

    async fn platform_request(&self, r: &TokenEndpointRequest) -> AuthResult<AccessRequest> {
        let client = self.resolve_dual_auth_client(r).await?;

        let mut ar = self.seed_request(GrantType::Platform, client, r);
        // The platform token rides in the password field, like the device id.
        ar.password = r.form("platform_token").to_string();
        ar.scope = r.form("scope").to_string();
        ar.redirect_uri =
            redirect::first_uri(&ar.client.redirect_uri, &self.config.redirect_uri_separator);
        Ok(ar)
    }

    fn seed_request(
        &self,
        grant_type: GrantType,
        client: Client,
        request: &TokenEndpointRequest,
    ) -> AccessRequest {
        AccessRequest {
            grant_type,
            code: String::new(),
            client,
            authorize_data: None,
            access_data: None,
            force_access_data: None,
            redirect_uri: String::new(),
            scope: String::new(),
            username: String::new(),
            password: String::new(),
            assertion_type: String::new(),
            assertion: String::new(),
            code_verifier: String::new(),
            authorized: false,
            expiration: self.config.access_expiration_secs(),
            refresh_expiration: self.config.refresh_expiration_secs(),
            generate_refresh: true,
            user_data: Value::Null,
            skip_set_cookie: false,
            request: request.clone(),
        }
    }
}
