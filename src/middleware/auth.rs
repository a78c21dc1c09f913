use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use sqlx::PgPool;

use crate::auth::decode_token;
use crate::config::jwt::JwtSettings;
use crate::db::users;
use crate::errors::ApiError;
use crate::models::user::{Claims, CurrentUser};

/// Read and verify the bearer token of a request.
pub fn claims_from_request(req: &ServiceRequest) -> Result<Claims, ApiError> {
    let jwt_settings = req
        .app_data::<web::Data<JwtSettings>>()
        .ok_or_else(|| ApiError::Internal("JWT settings not registered".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Token no proporcionado"))?;

    decode_token(token, jwt_settings).map_err(|e| {
        tracing::warn!("Rejected token: {:?}", e);
        ApiError::unauthorized("Token inválido o expirado")
    })
}

/// Resolve the claims to a live account. Deleted and deactivated users are refused.
pub async fn load_current_user(pool: &PgPool, claims: &Claims) -> Result<CurrentUser, ApiError> {
    let id_usuario = claims
        .user_id()
        .ok_or_else(|| ApiError::unauthorized("Token inválido o expirado"))?;

    match users::find_current_user(pool, id_usuario).await? {
        Some(user) if user.activo => Ok(user),
        _ => {
            tracing::warn!("Token for missing or inactive user {}", claims.username);
            Err(ApiError::forbidden("Usuario no encontrado o inactivo"))
        }
    }
}

/// Shared by [`AuthMiddleware`] and the admin middleware.
pub(crate) async fn authenticate(req: &ServiceRequest) -> Result<CurrentUser, ApiError> {
    let claims = claims_from_request(req)?;
    let pool = req
        .app_data::<web::Data<PgPool>>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("Database pool not registered".into()))?;

    load_current_user(&pool, &claims).await
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let user = authenticate(&req).await?;
            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}

/// Handlers behind [`AuthMiddleware`] take the caller as an argument.
impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| ApiError::unauthorized("Token no proporcionado").into()),
        )
    }
}
