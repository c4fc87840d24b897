use serde_json::json;

use crate::context::RequestContext;
use crate::response::ResponseWriter;

/// Debug handler: echoes the call back as JSON.
pub fn echo_handler(ctx: &RequestContext, w: &mut dyn ResponseWriter) -> anyhow::Result<()> {
    let params: serde_json::Map<String, serde_json::Value> = ctx
        .path_params
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    let body = match std::str::from_utf8(&ctx.body) {
        Ok(s) if !s.is_empty() => json!(s),
        Ok(_) => serde_json::Value::Null,
        Err(_) => json!({ "bytes": ctx.body.len() }),
    };

    w.write_json(
        200,
        &json!({
            "resource": ctx.resource_name,
            "method": ctx.raw_method,
            "path": ctx.path,
            "params": params,
            "query": ctx.query_params,
            "body": body,
        }),
    )?;
    Ok(())
}
