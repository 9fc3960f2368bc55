//! Fixed-window limiter for login attempts.
//!
//! Every `POST /api/login` counts against the caller's peer address. Once
//! the window holds [`LoginRateLimit::max_attempts`] requests, further
//! attempts receive `429 Too Many Requests` until the window expires.

use std::collections::HashMap;
use std::net::IpAddr;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::{Error, ResponseError};
use chrono::{DateTime, TimeDelta, Utc};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use mockable::{Clock, DefaultClock};
use tracing::warn;

use crate::domain::Error as ApiError;

/// Path guarded by the limiter.
pub const LOGIN_PATH: &str = "/api/login";
/// Attempts allowed per window.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Window length in minutes.
pub const DEFAULT_WINDOW_MINUTES: i64 = 10;
/// Tracked clients above which expired windows are swept.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: DateTime<Utc>,
    attempts: u32,
}

/// Attempt counters keyed by client address; shared between workers.
#[derive(Debug, Default)]
struct Attempts {
    windows: Mutex<HashMap<Option<IpAddr>, Window>>,
}

impl Attempts {
    /// Record one attempt, returning `false` once the budget is spent.
    fn admit(&self, key: Option<IpAddr>, now: DateTime<Utc>, max: u32, window: TimeDelta) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, entry| now - entry.started < window);
        }
        let entry = windows.entry(key).or_insert(Window {
            started: now,
            attempts: 0,
        });
        if now - entry.started >= window {
            *entry = Window {
                started: now,
                attempts: 0,
            };
        }
        entry.attempts = entry.attempts.saturating_add(1);
        entry.attempts <= max
    }
}

/// Middleware limiting login attempts per client address.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use orderdesk::middleware::LoginRateLimit;
///
/// let app = App::new().wrap(LoginRateLimit::default());
/// ```
#[derive(Clone)]
pub struct LoginRateLimit {
    attempts: Arc<Attempts>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
    window: TimeDelta,
}

impl LoginRateLimit {
    /// Build a limiter with an explicit budget and clock.
    pub fn new(clock: Arc<dyn Clock>, max_attempts: u32, window: TimeDelta) -> Self {
        Self {
            attempts: Arc::new(Attempts::default()),
            clock,
            max_attempts,
            window,
        }
    }

    /// Attempts allowed per window.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for LoginRateLimit {
    fn default() -> Self {
        Self::new(
            Arc::new(DefaultClock),
            DEFAULT_MAX_ATTEMPTS,
            TimeDelta::minutes(DEFAULT_WINDOW_MINUTES),
        )
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoginRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = LoginRateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoginRateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

/// Service wrapper produced by [`LoginRateLimit`].
pub struct LoginRateLimitMiddleware<S> {
    service: Rc<S>,
    limit: LoginRateLimit,
}

impl<S, B> Service<ServiceRequest> for LoginRateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let guarded = *req.method() == Method::POST && req.path() == LOGIN_PATH;
        if guarded {
            let peer = req.peer_addr().map(|addr| addr.ip());
            let admitted = self.limit.attempts.admit(
                peer,
                self.limit.clock.utc(),
                self.limit.max_attempts,
                self.limit.window,
            );
            if !admitted {
                warn!(peer = ?peer, "login rate limit exceeded");
                let response = ApiError::too_many_requests(
                    "too many login attempts, please try again later",
                )
                .error_response();
                return Box::pin(async move {
                    Ok(req.into_response(response).map_into_right_body())
                });
            }
        }
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::test_support::FixedClock;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::default())
    }

    fn login_from(peer: &str) -> actix_http::Request {
        let addr: SocketAddr = peer.parse().expect("socket address");
        actix_test::TestRequest::post()
            .uri(LOGIN_PATH)
            .peer_addr(addr)
            .to_request()
    }

    macro_rules! limited_app {
        ($clock:expr) => {
            actix_test::init_service(
                App::new()
                    .wrap(LoginRateLimit::new(
                        $clock,
                        DEFAULT_MAX_ATTEMPTS,
                        TimeDelta::minutes(DEFAULT_WINDOW_MINUTES),
                    ))
                    .route(LOGIN_PATH, web::post().to(|| async { HttpResponse::Ok().finish() }))
                    .route("/api/bookings", web::post().to(|| async { HttpResponse::Ok().finish() })),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn sixth_attempt_in_window_is_rejected(clock: Arc<FixedClock>) {
        let app = limited_app!(clock);
        for _ in 0..DEFAULT_MAX_ATTEMPTS {
            let res = actix_test::call_service(&app, login_from("10.0.0.1:4000")).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
        let res = actix_test::call_service(&app, login_from("10.0.0.1:4000")).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "too_many_requests");
    }

    #[rstest]
    #[actix_web::test]
    async fn other_clients_keep_their_own_budget(clock: Arc<FixedClock>) {
        let app = limited_app!(clock);
        for _ in 0..=DEFAULT_MAX_ATTEMPTS {
            actix_test::call_service(&app, login_from("10.0.0.1:4000")).await;
        }
        let res = actix_test::call_service(&app, login_from("10.0.0.2:4000")).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn budget_resets_after_the_window(clock: Arc<FixedClock>) {
        let app = limited_app!(clock.clone());
        for _ in 0..=DEFAULT_MAX_ATTEMPTS {
            actix_test::call_service(&app, login_from("10.0.0.1:4000")).await;
        }
        clock.advance(TimeDelta::minutes(DEFAULT_WINDOW_MINUTES));
        let res = actix_test::call_service(&app, login_from("10.0.0.1:4000")).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn other_routes_are_not_counted(clock: Arc<FixedClock>) {
        let app = limited_app!(clock);
        for _ in 0..10 {
            let req = actix_test::TestRequest::post()
                .uri("/api/bookings")
                .peer_addr("10.0.0.1:4000".parse().expect("socket address"))
                .to_request();
            let res = actix_test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
        let res = actix_test::call_service(&app, login_from("10.0.0.1:4000")).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    fn admit_counts_up_to_the_budget() {
        let attempts = Attempts::default();
        let now = Utc::now();
        let window = TimeDelta::minutes(1);
        assert!(attempts.admit(None, now, 2, window));
        assert!(attempts.admit(None, now, 2, window));
        assert!(!attempts.admit(None, now, 2, window));
    }
}
