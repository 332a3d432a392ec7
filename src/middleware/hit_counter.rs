use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use futures::future::LocalBoxFuture;
use log::debug;
use std::rc::Rc;

use crate::metrics::HitCounter;

/// Counts every request passing through the wrapped service.
pub struct HitCounterMiddleware {
    counter: web::Data<HitCounter>,
}

impl HitCounterMiddleware {
    pub fn new(counter: web::Data<HitCounter>) -> Self {
        Self { counter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HitCounterMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HitCounterMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(HitCounterMiddlewareService {
            service: Rc::new(service),
            counter: self.counter.clone(),
        }))
    }
}

pub struct HitCounterMiddlewareService<S> {
    service: Rc<S>,
    counter: web::Data<HitCounter>,
}

impl<S, B> Service<ServiceRequest> for HitCounterMiddlewareService<S>
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
        let hits = self.counter.increment();
        debug!("Fileserver hit #{}: {}", hits, req.path());

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
