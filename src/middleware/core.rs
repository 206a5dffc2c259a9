use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Continuation to the rest of the chain
pub type Next<'a> = &'a mut dyn FnMut(&HandlerRequest, &mut HandlerResponse);

/// Which way a middleware sent the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Flow {
    /// Control was handed to the next stage (or would have been, had one been given)
    Continue,
    /// The middleware terminated the response itself
    Handled,
}

pub trait Middleware: Send + Sync {
    /// Process `req`, writing into `res`
    ///
    /// Either ends the response or calls `next` (at most once), never both.
    fn handle(&self, req: &HandlerRequest, res: &mut HandlerResponse, next: Option<Next<'_>>)
        -> Flow;
}
