//! Bearer token 认证
//!
//! 中间件只负责解析 token：没有 `Authorization` 头的请求照常放行（匿名），
//! token 无效或过期返回 401。处理器通过 [`OptionalUser`] / [`RequiredUser`]
//! 读取解析结果。

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::header::AUTHORIZATION,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, trace};

use crate::api::jwt::JwtService;
use crate::api::services::helpers::{ApiError, error_from_toolbelt};
use crate::errors::ToolbeltError;

/// 已认证的调用方，由 [`BearerAuth`] 写入 request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Bearer token authentication middleware
#[derive(Clone)]
pub struct BearerAuth {
    jwt: Arc<JwtService>,
}

impl BearerAuth {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddleware {
            service: Rc::new(service),
            jwt: self.jwt.clone(),
        }))
    }
}

pub struct BearerAuthMiddleware<S> {
    service: Rc<S>,
    jwt: Arc<JwtService>,
}

/// 从 Authorization header 提取 Bearer token
///
/// 没有该头返回 `Ok(None)`；有头但格式不对返回错误
fn extract_bearer_token(req: &ServiceRequest) -> Result<Option<String>, ToolbeltError> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| Some(s.to_string()))
        .ok_or_else(|| ToolbeltError::unauthorized("Malformed Authorization header"))
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        let resolved = extract_bearer_token(&req).and_then(|token| match token {
            Some(token) => self.jwt.user_id_from_token(&token).map(Some),
            None => Ok(None),
        });

        Box::pin(async move {
            match resolved {
                Ok(Some(user_id)) => {
                    trace!("Bearer token accepted for user {}", user_id);
                    req.extensions_mut().insert(AuthUser { user_id });
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("Bearer authentication failed: {}", e);
                    let err = ToolbeltError::unauthorized("Invalid or expired token");
                    let response = error_from_toolbelt(&err).map_into_right_body();
                    return Ok(req.into_response(response));
                }
            }

            srv.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// 可选的调用方身份（匿名请求为 `None`）
#[derive(Debug, Clone, Copy)]
pub struct OptionalUser(pub Option<i64>);

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthUser>().map(|u| u.user_id);
        ready(Ok(OptionalUser(user)))
    }
}

/// 必须登录；否则 401
#[derive(Debug, Clone, Copy)]
pub struct RequiredUser(pub i64);

impl FromRequest for RequiredUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthUser>()
            .map(|u| RequiredUser(u.user_id))
            .ok_or_else(|| ApiError(ToolbeltError::unauthorized("Authentication required")));
        ready(result)
    }
}
