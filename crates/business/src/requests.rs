//! Help request operations - post, accept, complete, dashboards
//!
//! Acceptance and the point award happen in one store operation, so two
//! members racing for the same request can never both be credited.

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use crate::guard::Guard;
use crate::session::Session;
use careswap_core::{Cohort, HelpRequest, NewHelpRequest, RequestId, RequestStatus, User};
use careswap_persistence::{AcceptOutcome, RequestFilter};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Result of an accept call
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptResult {
    /// The caller took the request and earned `points`
    Accepted {
        request: HelpRequest,
        points: u32,
        balance: u32,
    },
    /// The request was no longer open; nothing changed
    NotOpen(HelpRequest),
}

impl AcceptResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AcceptResult::Accepted { .. })
    }
}

impl From<AcceptOutcome> for AcceptResult {
    fn from(outcome: AcceptOutcome) -> Self {
        match outcome {
            AcceptOutcome::Accepted {
                request,
                points,
                balance,
            } => AcceptResult::Accepted {
                request,
                points,
                balance,
            },
            AcceptOutcome::Unchanged(request) => AcceptResult::NotOpen(request),
        }
    }
}

/// What a member sees on their home screen
#[derive(Debug, Clone, PartialEq)]
pub enum Dashboard {
    Senior {
        user: User,
        posted: Vec<HelpRequest>,
    },
    Youth {
        user: User,
        open: Vec<HelpRequest>,
        accepted: Vec<HelpRequest>,
    },
}

/// Landing page numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformStats {
    pub users: usize,
    pub completed_tasks: usize,
    pub open_requests: usize,
}

/// Request Service - handles the help request lifecycle
pub struct RequestService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RequestService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post a new Open request owned by the caller
    pub async fn create_request(
        &self,
        session: &mut Session,
        input: NewHelpRequest,
    ) -> ServiceResult<HelpRequest> {
        Guard::new(self.ctx)
            .with_user(session, |user| async move {
                let store = self.ctx.store();
                let id = store.next_request_id().await?;
                let request = HelpRequest::create(id, user.id, input, Utc::now())?;
                store.insert_request(&request).await?;

                info!(
                    user_id = %user.id,
                    request_id = %request.id,
                    points = request.aura_points,
                    "Request posted"
                );
                Ok(request)
            })
            .await
    }

    /// Accept an Open request and collect its points.
    ///
    /// A request that is no longer Open yields [`AcceptResult::NotOpen`].
    /// Members cannot accept their own requests.
    pub async fn accept_request(&self, session: &mut Session, id: RequestId) -> ServiceResult<AcceptResult> {
        Guard::new(self.ctx)
            .with_user(session, |user| async move {
                let store = self.ctx.store();
                let request = store
                    .get_request(id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Request", id))?;

                if request.posted_by == user.id {
                    warn!(user_id = %user.id, request_id = %id, "Self-acceptance refused");
                    return Err(ServiceError::validation("You cannot accept your own request."));
                }

                let result = AcceptResult::from(store.accept_request(id, user.id).await?);
                match &result {
                    AcceptResult::Accepted { points, balance, .. } => {
                        info!(user_id = %user.id, request_id = %id, points, balance, "Request accepted");
                    }
                    AcceptResult::NotOpen(current) => {
                        debug!(user_id = %user.id, request_id = %id, status = %current.status, "Request not open");
                    }
                }
                Ok(result)
            })
            .await
    }

    /// Mark an In Progress request Completed.
    ///
    /// Only the poster or the acceptor may do this.
    pub async fn complete_request(&self, session: &mut Session, id: RequestId) -> ServiceResult<HelpRequest> {
        Guard::new(self.ctx)
            .with_user(session, |user| async move {
                let store = self.ctx.store();
                let mut request = store
                    .get_request(id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Request", id))?;

                if !request.involves(user.id) {
                    warn!(user_id = %user.id, request_id = %id, "Completion by outsider refused");
                    return Err(ServiceError::access_denied(
                        "Only the poster or the helper can complete this request.",
                    ));
                }

                let from = request.status;
                request.complete()?;
                if !store.transition_request(id, from, RequestStatus::Completed).await? {
                    // Lost a race with another completion
                    let current = store
                        .get_request(id)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Request", id))?;
                    return Err(ServiceError::InvalidTransition {
                        id,
                        from: current.status,
                        to: RequestStatus::Completed,
                    });
                }

                info!(user_id = %user.id, request_id = %id, "Request completed");
                Ok(request)
            })
            .await
    }

    pub async fn get_request(&self, session: &mut Session, id: RequestId) -> ServiceResult<HelpRequest> {
        Guard::new(self.ctx)
            .with_user(session, |_| async move {
                self.ctx
                    .store()
                    .get_request(id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Request", id))
            })
            .await
    }

    /// Requests the caller posted
    pub async fn my_requests(&self, session: &mut Session) -> ServiceResult<Vec<HelpRequest>> {
        Guard::new(self.ctx)
            .with_user(session, |user| async move {
                Ok(self.ctx.store().list_requests(RequestFilter::PostedBy(user.id)).await?)
            })
            .await
    }

    pub async fn open_requests(&self, session: &mut Session) -> ServiceResult<Vec<HelpRequest>> {
        Guard::new(self.ctx)
            .with_user(session, |_| async move {
                Ok(self
                    .ctx
                    .store()
                    .list_requests(RequestFilter::Status(RequestStatus::Open))
                    .await?)
            })
            .await
    }

    /// Requests the caller accepted
    pub async fn my_tasks(&self, session: &mut Session) -> ServiceResult<Vec<HelpRequest>> {
        Guard::new(self.ctx)
            .with_user(session, |user| async move {
                Ok(self.ctx.store().list_requests(RequestFilter::AcceptedBy(user.id)).await?)
            })
            .await
    }

    /// Cohort-specific home screen
    pub async fn dashboard(&self, session: &mut Session) -> ServiceResult<Dashboard> {
        Guard::new(self.ctx)
            .with_user(session, |user| async move {
                let store = self.ctx.store();
                let dashboard = match user.cohort {
                    Cohort::Senior => Dashboard::Senior {
                        posted: store.list_requests(RequestFilter::PostedBy(user.id)).await?,
                        user,
                    },
                    Cohort::Youth => Dashboard::Youth {
                        open: store
                            .list_requests(RequestFilter::Status(RequestStatus::Open))
                            .await?,
                        accepted: store.list_requests(RequestFilter::AcceptedBy(user.id)).await?,
                        user,
                    },
                };
                Ok(dashboard)
            })
            .await
    }

    /// Public counters; no login needed
    pub async fn platform_stats(&self) -> ServiceResult<PlatformStats> {
        let store = self.ctx.store();
        let users = store.list_users().await?.len();
        let requests = store.list_requests(RequestFilter::All).await?;

        Ok(PlatformStats {
            users,
            completed_tasks: requests
                .iter()
                .filter(|r| r.status == RequestStatus::Completed)
                .count(),
            open_requests: requests.iter().filter(|r| r.is_open()).count(),
        })
    }
}
