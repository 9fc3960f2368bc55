//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers that need an identity take [`AuthenticatedAccount`] as an
//! argument. Extraction fails with `401` when the header is missing or the
//! token does not resolve to a live account; role checks then yield `403`.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Account, Error, Role, require_role};

use super::state::HttpState;

/// The account behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(pub Account);

impl AuthenticatedAccount {
    /// Borrow the resolved account.
    pub fn account(&self) -> &Account {
        &self.0
    }

    /// Require at least `role`, returning `403 Forbidden` otherwise.
    pub fn require(&self, role: Role) -> Result<&Account, Error> {
        require_role(Some(self.0.role), role)?;
        Ok(&self.0)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("authentication required"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim().to_owned())
        }
        _ => Err(Error::unauthorized("bearer token required")),
    }
}

impl FromRequest for AuthenticatedAccount {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let account = state.accounts.authenticate(&token).await?;
            Ok(Self(account))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::inbound::http::test_utils::{TestBackend, backend};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer   "))]
    fn malformed_headers_are_unauthorised(#[case] header: Option<&str>) {
        let mut request = actix_test::TestRequest::default();
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let err = bearer_token(&request.to_http_request()).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn scheme_is_case_insensitive() {
        let req = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "bearer abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req).expect("token"), "abc");
    }

    #[rstest]
    #[actix_web::test]
    async fn resolves_the_account_behind_the_token(backend: TestBackend) {
        let admin = backend.admin_token().await;
        let app = actix_test::init_service(App::new().app_data(backend.data()).route(
            "/me",
            web::get().to(|auth: AuthenticatedAccount| async move {
                auth.require(Role::Admin)?;
                Ok::<_, Error>(HttpResponse::Ok().body(auth.account().username.clone()))
            }),
        ))
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/me")
            .insert_header((AUTHORIZATION, format!("Bearer {admin}")))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(res).await, "staff");
    }

    #[rstest]
    #[actix_web::test]
    async fn customer_is_forbidden_from_admin_routes(backend: TestBackend) {
        let customer = backend.customer_token().await;
        let app = actix_test::init_service(App::new().app_data(backend.data()).route(
            "/admin",
            web::get().to(|auth: AuthenticatedAccount| async move {
                auth.require(Role::Admin)?;
                Ok::<_, Error>(HttpResponse::Ok().finish())
            }),
        ))
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/admin")
            .insert_header((AUTHORIZATION, format!("Bearer {customer}")))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_token_is_unauthorised(backend: TestBackend) {
        let app = actix_test::init_service(App::new().app_data(backend.data()).route(
            "/me",
            web::get().to(|_auth: AuthenticatedAccount| async { HttpResponse::Ok().finish() }),
        ))
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/me")
            .insert_header((AUTHORIZATION, "Bearer nonsense"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
