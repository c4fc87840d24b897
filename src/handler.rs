//! The handler capability routes are bound to.

use crate::context::RequestContext;
use crate::response::ResponseWriter;

/// A resource handler: reads the call context and writes a response.
///
/// Handlers are invoked synchronously, exactly once per dispatched call, on the
/// caller's thread. Returning `Err` does not produce a response by itself;
/// the error travels up to the transport boundary (see
/// [`crate::adapter::PluginAdapter`]) which decides how to report it.
pub trait ResourceHandler: Send + Sync {
    fn handle(&self, ctx: &RequestContext, writer: &mut dyn ResponseWriter) -> anyhow::Result<()>;
}

impl<F> ResourceHandler for F
where
    F: Fn(&RequestContext, &mut dyn ResponseWriter) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, ctx: &RequestContext, writer: &mut dyn ResponseWriter) -> anyhow::Result<()> {
        self(ctx, writer)
    }
}

/// Pin a closure to the handler signature so argument types are inferred.
pub fn handler_fn<F>(f: F) -> F
where
    F: Fn(&RequestContext, &mut dyn ResponseWriter) -> anyhow::Result<()> + Send + Sync,
{
    f
}
