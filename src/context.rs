use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct UserInfo {
    pub id: i32,
}

#[derive(Debug, Clone)]
pub struct JudgeInfo {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AdminInfo;

fn from_extensions<T: Clone + 'static>(req: &HttpRequest) -> Ready<Result<T, Error>> {
    match req.extensions().get::<T>() {
        Some(info) => ready(Ok(info.clone())),
        None => ready(Err(Error::Unauthorized)),
    }
}

impl FromRequest for UserInfo {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        from_extensions(req)
    }
}

impl FromRequest for JudgeInfo {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        from_extensions(req)
    }
}

impl FromRequest for AdminInfo {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        from_extensions(req)
    }
}
