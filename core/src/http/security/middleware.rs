//! Gateway middleware for Actix Web.
//!
//! Wraps an application, routes every request through the [`Gateway`] and
//! either forwards it with the established principal in the request
//! extensions or answers `401 Unauthorized` itself.

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::{ok, LocalBoxFuture, Ready};

use crate::http::error::AuthError;
use crate::http::security::realm::RealmRequest;
use crate::http::security::Gateway;

/// Middleware factory.
///
/// `SessionMiddleware` must wrap outside of this transform so the session
/// is available when the gateway reads it.
///
/// # Example
/// ```ignore
/// let gateway = Arc::new(GatewayAssembler::new(config, collaborators).assemble()?);
///
/// App::new()
///     .wrap(GatewayTransform::new(gateway.clone()))
///     .wrap(SessionMiddleware::new(CookieSessionStore::default(), key.clone()))
/// ```
#[derive(Clone)]
pub struct GatewayTransform {
    gateway: Arc<Gateway>,
}

impl GatewayTransform {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        GatewayTransform { gateway }
    }
}

impl<S, B> Transform<S, ServiceRequest> for GatewayTransform
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = GatewayService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(GatewayService {
            gateway: Arc::clone(&self.gateway),
            service: Rc::new(service),
        })
    }
}

/// Middleware service created by [`GatewayTransform`].
pub struct GatewayService<S> {
    gateway: Arc<Gateway>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for GatewayService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gateway = Arc::clone(&self.gateway);
        let request = RealmRequest::from_service_request(&req, gateway.session_config());

        Box::pin(async move {
            match gateway.authorize(&request).await {
                Ok(principal) => {
                    // handlers read it through AuthenticatedUser / OptionalUser
                    if let Some(user) = principal {
                        req.extensions_mut().insert(user);
                    }
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(failure) => {
                    log::debug!("denied {} {}: {}", req.method(), req.path(), failure);
                    let response = AuthError::Unauthorized.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
