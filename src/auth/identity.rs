use actix_session::Session;
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use std::pin::Pin;

use crate::auth::session::get_user_id_from_session;
use crate::services::UsersService;

/// Who is asking: an anonymous visitor or an authenticated account.
///
/// Anonymous visitors carry no durable server-side identifier; their question
/// counter lives in the client and arrives with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Account { id: i32, paid: bool },
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}

/// Fail-open identity resolver.
///
/// Resolves the session cookie to an `Identity` and never rejects the
/// request: a missing session, an unknown user, or a session/database
/// failure all degrade to `Anonymous`, so a backend outage can never block
/// the chat feature. Availability is deliberately favored over strict quota
/// accuracy here.
pub struct ResolvedIdentity(pub Identity);

impl FromRequest for ResolvedIdentity {
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let session = match Session::extract(&req).await {
                Ok(session) => session,
                Err(e) => {
                    log::error!("Identity resolution: session error: {} (treating as anonymous)", e);
                    return Ok(ResolvedIdentity(Identity::Anonymous));
                }
            };

            let user_id = match get_user_id_from_session(&session) {
                Some(id) => id,
                None => return Ok(ResolvedIdentity(Identity::Anonymous)),
            };

            let pool = match req.app_data::<web::Data<sqlx::PgPool>>() {
                Some(pool) => pool,
                None => {
                    log::error!("Identity resolution: database pool not configured (treating as anonymous)");
                    return Ok(ResolvedIdentity(Identity::Anonymous));
                }
            };

            match UsersService::get_by_id(pool.get_ref(), user_id).await {
                Ok(Some(user)) if user.is_active => Ok(ResolvedIdentity(Identity::Account {
                    id: user.id,
                    paid: user.is_paid_user,
                })),
                Ok(_) => Ok(ResolvedIdentity(Identity::Anonymous)),
                Err(e) => {
                    log::error!("Identity resolution: user lookup failed: {} (treating as anonymous)", e);
                    Ok(ResolvedIdentity(Identity::Anonymous))
                }
            }
        })
    }
}
