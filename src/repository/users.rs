//! Member and profile endpoints: `/users`, `/users/me`, `/auth/login`

use serde::{Deserialize, Serialize};

use crate::{
    api::{ApiClient, Method, Page, RequestContext, ResourceQuery},
    error::AppResult,
    models::user::{ChangePassword, CreateMember, Member, UpdateMember, UpdateProfile},
};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Answer of the sign-in endpoint
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Clone)]
pub struct UsersRepository {
    client: ApiClient,
}

impl UsersRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn list_query(&self) -> ResourceQuery<Member> {
        ResourceQuery::new(self.client.clone(), "/users")
    }

    /// List members
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Page<Member>> {
        self.list_query().fetch(ctx).await
    }

    /// Get member by ID
    pub async fn get_by_id(&self, ctx: &RequestContext, id: i64) -> AppResult<Member> {
        self.client.fetch_one(ctx, &format!("/users/{}", id)).await
    }

    pub async fn create(&self, ctx: &RequestContext, member: &CreateMember) -> AppResult<Option<Member>> {
        self.client.send_json(ctx, Method::Post, "/users", member).await
    }

    pub async fn update(&self, ctx: &RequestContext, id: i64, update: &UpdateMember) -> AppResult<Option<Member>> {
        self.client
            .send_json(ctx, Method::Put, &format!("/users/{}", id), update)
            .await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        self.client.delete(ctx, &format!("/users/{}", id)).await
    }

    /// Profile of the signed-in member
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<Member> {
        self.client.fetch_one(ctx, "/users/me").await
    }

    pub async fn update_me(&self, ctx: &RequestContext, profile: &UpdateProfile) -> AppResult<Option<Member>> {
        self.client
            .send_json(ctx, Method::Put, "/users/me", profile)
            .await
    }

    pub async fn change_password(&self, ctx: &RequestContext, request: &ChangePassword) -> AppResult<()> {
        self.client
            .send_unit(ctx, Method::Put, "/users/me/password", Some(request))
            .await
    }

    /// Exchange credentials for a bearer token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        self.client
            .post_anonymous("/auth/login", &LoginRequest { username, password })
            .await
    }
}
