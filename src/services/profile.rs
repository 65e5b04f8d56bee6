//! Own profile screen

use std::sync::{Arc, RwLock};

use validator::Validate;

use crate::{
    api::RequestContext,
    error::AppResult,
    models::user::{ChangePassword, Member, UpdateProfile},
    repository::Repository,
};

#[derive(Clone)]
pub struct ProfileScreen {
    repository: Repository,
    profile: Arc<RwLock<Option<Member>>>,
}

impl ProfileScreen {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            profile: Arc::new(RwLock::new(None)),
        }
    }

    pub fn profile(&self) -> Option<Member> {
        self.profile.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn store(&self, member: Member) {
        *self.profile.write().unwrap_or_else(|e| e.into_inner()) = Some(member);
    }

    pub async fn load(&self, ctx: &RequestContext) -> AppResult<Member> {
        let member = self.repository.users.me(ctx).await?;
        self.store(member.clone());
        Ok(member)
    }

    /// Save profile changes; the screen keeps the previous profile on failure.
    /// Without a record in the answer the profile is loaded again.
    pub async fn update(&self, ctx: &RequestContext, update: &UpdateProfile) -> AppResult<Member> {
        update.validate()?;
        match self.repository.users.update_me(ctx, update).await? {
            Some(member) => {
                self.store(member.clone());
                Ok(member)
            }
            None => self.load(ctx).await,
        }
    }

    /// New and confirmation passwords must match before anything is sent.
    pub async fn change_password(&self, ctx: &RequestContext, request: &ChangePassword) -> AppResult<()> {
        request.validate()?;
        self.repository.users.change_password(ctx, request).await?;
        tracing::info!("Password changed");
        Ok(())
    }
}
