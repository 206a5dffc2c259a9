use tracing::{debug, info_span};

use super::{Flow, Middleware, Next};
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Opens a `request` span around the rest of the chain
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn handle(
        &self,
        req: &HandlerRequest,
        res: &mut HandlerResponse,
        next: Option<Next<'_>>,
    ) -> Flow {
        let span = info_span!(
            "request",
            method = %req.method,
            path = %req.path,
            status = tracing::field::Empty
        );
        let _guard = span.enter();

        if let Some(next) = next {
            next(req, res);
        }
        span.record("status", res.status);
        debug!(status = res.status, finished = res.is_finished(), "request complete");
        Flow::Continue
    }
}
