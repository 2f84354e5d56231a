//! Auth Service
//!
//! Login, registration and user lookup. Login and registration are public
//! calls; they never go through the refresh gate.

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use super::client::ApiClient;
use super::transport::ApiRequest;
use crate::domain::{DomainError, DomainResult, LoginData, RegisterData, TokenPair, User};

pub struct AuthApi {
    client: Arc<ApiClient>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UsersPayload {
    Many(Vec<User>),
    One(User),
}

const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

fn user_query(email_or_username: &str) -> String {
    format!(
        "/user?emailOrUsername={}",
        utf8_percent_encode(email_or_username, QUERY_VALUE)
    )
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn login(&self, data: &LoginData) -> DomainResult<TokenPair> {
        self.client.send_public(ApiRequest::post("/login", data)?).await?.json()
    }

    pub async fn register(&self, data: &RegisterData) -> DomainResult<TokenPair> {
        self.client.send_public(ApiRequest::post("/user", data)?).await?.json()
    }

    /// Look users up by email or username with the session's credentials
    pub async fn find_users(&self, email_or_username: &str) -> DomainResult<Vec<User>> {
        let payload: UsersPayload = self.client.execute_json(ApiRequest::get(user_query(email_or_username))).await?;
        Ok(payload.into_vec())
    }

    /// Look users up with a token that is not (yet) the session's
    pub async fn find_users_with_token(&self, email_or_username: &str, token: &str) -> DomainResult<Vec<User>> {
        let payload: UsersPayload = self
            .client
            .send_with_token(ApiRequest::get(user_query(email_or_username)), token)
            .await?
            .json()?;
        Ok(payload.into_vec())
    }

    /// Log in and establish the session
    pub async fn sign_in(&self, data: &LoginData) -> DomainResult<User> {
        let tokens = self.login(data).await?;
        self.establish(tokens, &data.email).await
    }

    /// Register and establish the session
    pub async fn sign_up(&self, data: &RegisterData) -> DomainResult<User> {
        let tokens = self.register(data).await?;
        self.establish(tokens, &data.email).await
    }

    pub async fn sign_out(&self) {
        self.client.session().clear().await;
    }

    async fn establish(&self, tokens: TokenPair, email: &str) -> DomainResult<User> {
        let user = self
            .find_users_with_token(email, &tokens.token)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::NotFound(format!("user {}", email)))?;
        self.client.session().establish(&tokens, user.clone()).await?;
        Ok(user)
    }
}

impl UsersPayload {
    fn into_vec(self) -> Vec<User> {
        match self {
            UsersPayload::Many(users) => users,
            UsersPayload::One(user) => vec![user],
        }
    }
}
