//! Member management screen (admin)

use crate::{
    api::RequestContext,
    error::{AppError, AppResult},
    models::{
        user::{CreateMember, Member, UpdateMember},
        Role,
    },
    repository::Repository,
};

use super::{precheck, Mutation, ViewModel};

pub struct MembersScreen {
    repository: Repository,
    pub members: ViewModel<Member>,
}

impl MembersScreen {
    pub fn new(repository: Repository, page_size: usize) -> Self {
        let members = ViewModel::new(repository.users.list_query(), page_size);
        Self { repository, members }
    }

    pub async fn mount(&self, ctx: &RequestContext) -> AppResult<()> {
        self.members.refresh(ctx).await.map(|_| ())
    }

    pub fn unmount(&self) {
        self.members.unmount();
    }

    fn require_listed(&self, id: i64) -> AppResult<Member> {
        match self.members.items().iter().find(|m| m.id == id) {
            Some(member) => Ok(member.clone()),
            None => {
                let err = AppError::ValidationFailed(format!("Member {} is not in the list", id));
                self.members.report(&err);
                Err(err)
            }
        }
    }

    pub async fn create_member(&self, ctx: &RequestContext, member: &CreateMember) -> AppResult<Mutation<Option<Member>>> {
        precheck(&self.members, member)?;

        self.members
            .mutate(
                ctx,
                |_| {},
                self.repository.users.create(ctx, member),
                |members, created| {
                    if let Some(created) = created {
                        members.push(created.clone());
                    }
                },
            )
            .await
    }

    pub async fn update_member(
        &self,
        ctx: &RequestContext,
        id: i64,
        update: &UpdateMember,
    ) -> AppResult<Mutation<Option<Member>>> {
        precheck(&self.members, update)?;
        self.require_listed(id)?;

        self.members
            .mutate(
                ctx,
                |members| {
                    if let Some(m) = members.iter_mut().find(|m| m.id == id) {
                        if let Some(username) = &update.username {
                            m.username = username.clone();
                        }
                        if let Some(email) = &update.email {
                            m.email = email.clone();
                        }
                        if let Some(role) = update.role {
                            m.role = role;
                        }
                    }
                },
                self.repository.users.update(ctx, id, update),
                |members, updated| {
                    let found = members.iter_mut().find(|m| m.id == id);
                    if let (Some(m), Some(updated)) = (found, updated) {
                        *m = updated.clone();
                    }
                },
            )
            .await
    }

    /// Promote or demote a member
    pub async fn change_role(&self, ctx: &RequestContext, id: i64, role: Role) -> AppResult<Mutation<Option<Member>>> {
        let update = UpdateMember {
            role: Some(role),
            ..UpdateMember::default()
        };
        self.update_member(ctx, id, &update).await
    }

    /// Delete a member after the user confirms.
    pub async fn delete_member(
        &self,
        ctx: &RequestContext,
        id: i64,
        confirm: impl FnOnce(&str) -> bool,
    ) -> AppResult<Option<Mutation<()>>> {
        let member = self.require_listed(id)?;
        if !confirm(&format!("Delete member \"{}\"?", member.username)) {
            return Ok(None);
        }

        self.members
            .mutate(
                ctx,
                |members| members.retain(|m| m.id != id),
                self.repository.users.delete(ctx, id),
                |_, _| {},
            )
            .await
            .map(Some)
    }
}
