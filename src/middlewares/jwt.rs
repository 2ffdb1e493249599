use std::future::{ready, Future, Ready};
use std::pin::Pin;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error as ActixError, HttpMessage,
};
use serde::{Deserialize, Serialize};

use crate::context::{AdminInfo, JudgeInfo, UserInfo};
use crate::core::tokener::{Payload, Role, Tokener};
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;

#[derive(Debug, Deserialize, Serialize)]
pub struct Claim {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

impl Claim {
    pub fn new(sub: impl Into<String>, role: Role, ttl_hours: i64) -> Self {
        Self {
            sub: sub.into(),
            role,
            exp: (chrono::Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp(),
        }
    }
}

impl Payload for Claim {
    fn subject(&self) -> &str {
        &self.sub
    }

    fn role(&self) -> Role {
        self.role
    }
}

/// Requires a bearer token issued for `role` and exposes the caller to
/// handlers through the request extensions.
pub struct JWTMiddleware {
    secret: Vec<u8>,
    role: Role,
}

impl JWTMiddleware {
    pub fn new(secret: Vec<u8>, role: Role) -> Self {
        Self { secret, role }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JWTMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
{
    type Error = ActixError;
    type Response = ServiceResponse<B>;
    type Transform = JWTService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JWTService {
            tokener: JWT::new(self.secret.clone()),
            role: self.role,
            next_service: service,
        }))
    }
}

pub struct JWTService<S> {
    tokener: JWT,
    role: Role,
    next_service: S,
}

impl<S> JWTService<S> {
    fn authenticate(&self, req: &ServiceRequest) -> Result<(), Error> {
        let header = req.headers().get(AUTHORIZATION).ok_or(Error::Unauthorized)?;
        let header = header.to_str().map_err(|_| Error::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        let claim: Claim = self.tokener.verify_token(token)?;
        if claim.role() != self.role {
            return Err(Error::Forbidden(format!("{:?} token cannot access this resource", claim.role())));
        }
        let mut extensions = req.extensions_mut();
        match claim.role() {
            Role::Participant => {
                let id = claim.subject().parse::<i32>().map_err(|_| Error::Unauthorized)?;
                extensions.insert(UserInfo { id });
            }
            Role::Judge => {
                extensions.insert(JudgeInfo { name: claim.sub });
            }
            Role::Admin => {
                extensions.insert(AdminInfo);
            }
        }
        Ok(())
    }
}

impl<S, B> Service<ServiceRequest> for JWTService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, ctx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Err(e) = self.authenticate(&req) {
            return Box::pin(async move { Err(e.into()) });
        }
        let res_fut = self.next_service.call(req);
        Box::pin(async move { res_fut.await })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    const SECRET: &[u8] = b"middleware-secret";

    async fn whoami(user: UserInfo) -> HttpResponse {
        HttpResponse::Ok().body(user.id.to_string())
    }

    fn bearer(claim: &Claim) -> (actix_web::http::header::HeaderName, String) {
        let token = JWT::new(SECRET.to_vec()).gen_token(claim).unwrap();
        (AUTHORIZATION, format!("Bearer {}", token))
    }

    #[actix_web::test]
    async fn test_participant_token_reaches_handler() {
        let app = test::init_service(App::new().service(web::scope("").wrap(JWTMiddleware::new(SECRET.to_vec(), Role::Participant)).route("/me", web::get().to(whoami)))).await;
        let req = test::TestRequest::get().uri("/me").insert_header(bearer(&Claim::new("42", Role::Participant, 1))).to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"42"));
    }

    #[actix_web::test]
    async fn test_missing_or_wrong_role_token_rejected() {
        let app = test::init_service(App::new().service(web::scope("").wrap(JWTMiddleware::new(SECRET.to_vec(), Role::Participant)).route("/me", web::get().to(whoami)))).await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get().uri("/me").insert_header(bearer(&Claim::new("ada", Role::Judge, 1))).to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
    }
}
