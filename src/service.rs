//! Boxed, clonable request handlers used for recipes and factory methods.

use alloc::boxed::Box;

use crate::utils::thread_safety::{SendSafety, SyncSafety};

pub(crate) trait Service<Request> {
    type Response;
    type Error;

    fn call(&mut self, request: Request) -> Result<Self::Response, Self::Error>;
}

#[derive(Clone)]
pub(crate) struct ServiceFn<F>(F);

#[inline]
#[must_use]
pub(crate) const fn service_fn<F>(f: F) -> ServiceFn<F> {
    ServiceFn(f)
}

impl<F, Request, Response, Error> Service<Request> for ServiceFn<F>
where
    F: FnMut(Request) -> Result<Response, Error>,
{
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&mut self, request: Request) -> Result<Response, Error> {
        (self.0)(request)
    }
}

#[cfg(feature = "thread_safe")]
type DynService<Request, Response, Error> = dyn CloneService<Request, Response = Response, Error = Error> + Send + Sync;
#[cfg(not(feature = "thread_safe"))]
type DynService<Request, Response, Error> = dyn CloneService<Request, Response = Response, Error = Error>;

trait CloneService<Request>: Service<Request> {
    fn clone_box(&self) -> Box<DynService<Request, Self::Response, Self::Error>>;
}

impl<Request, S> CloneService<Request> for S
where
    S: Service<Request> + Clone + SendSafety + SyncSafety + 'static,
{
    fn clone_box(&self) -> Box<DynService<Request, S::Response, S::Error>> {
        Box::new(self.clone())
    }
}

/// Type-erased service, each clone carrying its own copy of the captured state.
pub(crate) struct BoxCloneService<Request, Response, Error> {
    inner: Box<DynService<Request, Response, Error>>,
}

impl<Request, Response, Error> BoxCloneService<Request, Response, Error> {
    #[inline]
    #[must_use]
    pub(crate) fn new<S>(service: S) -> Self
    where
        S: Service<Request, Response = Response, Error = Error> + Clone + SendSafety + SyncSafety + 'static,
    {
        Self { inner: Box::new(service) }
    }
}

impl<Request, Response, Error> Clone for BoxCloneService<Request, Response, Error> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
        }
    }
}

impl<Request, Response, Error> Service<Request> for BoxCloneService<Request, Response, Error> {
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&mut self, request: Request) -> Result<Response, Error> {
        self.inner.call(request)
    }
}
