use crate::context::RequestContext;
use serde_json::{json, Value};

/// Echo handler: answers with a JSON description of the request
///
/// The body is echoed as JSON when it parses, otherwise as a string.
pub fn echo_handler(ctx: &mut RequestContext) {
    let body = if ctx.body().is_empty() {
        Value::Null
    } else {
        ctx.json_body::<Value>()
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(ctx.body()).into_owned()))
    };

    let payload = json!({
        "request_id": ctx.request_id().to_string(),
        "method": ctx.method(),
        "path": ctx.path(),
        "params": ctx.params_map(),
        "query": ctx.query_map(),
        "body": body,
    });
    ctx.json(200, &payload);
}
