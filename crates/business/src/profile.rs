//! Profile viewing
//!
//! Every profile read goes through the user guard, then the privacy
//! filter. The recent-tasks block is only loaded when the filter lets the
//! activity section through.

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use crate::guard::Guard;
use crate::session::Session;
use careswap_core::{render_profile, HelpRequest, ProfileView, UserId};
use careswap_persistence::RequestFilter;
use tracing::debug;

pub struct ProfileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProfileService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The caller's own profile
    pub async fn my_profile(&self, session: &mut Session) -> ServiceResult<ProfileView> {
        self.view_profile(session, None).await
    }

    /// View `target`'s profile, or the caller's own when `target` is None
    pub async fn view_profile(
        &self,
        session: &mut Session,
        target: Option<UserId>,
    ) -> ServiceResult<ProfileView> {
        Guard::new(self.ctx)
            .with_user(session, |viewer| async move {
                let target = match target {
                    None => viewer.clone(),
                    Some(id) if id == viewer.id => viewer.clone(),
                    Some(id) => self
                        .ctx
                        .store()
                        .get_user(id)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("User", id))?,
                };

                let mut view = render_profile(Some(&viewer), &target).map_err(|e| {
                    debug!(viewer = %viewer.id, target = %target.id, "Profile hidden");
                    ServiceError::from(e)
                })?;

                if let Some(activity) = view.activity.as_mut() {
                    activity.recent_tasks = self.recent_tasks(target.id).await?;
                }
                Ok(view)
            })
            .await
    }

    /// Latest requests the user posted or accepted, newest first
    async fn recent_tasks(&self, user: UserId) -> ServiceResult<Vec<HelpRequest>> {
        let mut tasks = self.ctx.store().list_requests(RequestFilter::All).await?;
        tasks.retain(|r| r.involves(user));
        tasks.reverse();
        tasks.truncate(self.ctx.config().recent_task_window);
        Ok(tasks)
    }
}
