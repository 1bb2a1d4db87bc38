//! Continuation fetcher for paginated list properties.
//!
//! Follows the `continue` block of each response until the API stops
//! returning one. See <https://www.mediawiki.org/wiki/API:Continue>.

use crate::api::{check_response, QueryParams, WikiRequest};
use crate::error::Result;
use crate::language::Language;
use serde_json::{Map, Value};
use tracing::debug;

/// Drain a paginated query into one ordered sequence
///
/// Every request sends `base` merged with the previous response's
/// continuation token. `extract` receives each response's `query` object.
/// A response without `query` ends the drain without error.
pub async fn drain<T, F>(
    request: &WikiRequest,
    language: &Language,
    base: QueryParams,
    context: &str,
    mut extract: F,
) -> Result<Vec<T>>
where
    F: FnMut(&Map<String, Value>) -> Result<Vec<T>>,
{
    let mut items = Vec::new();
    let mut last_continue = QueryParams::new();
    let mut requests = 0usize;

    loop {
        let params = base.clone().merge(&last_continue);
        let response = request.send(language, params).await?;
        requests += 1;

        check_response(&response, context)?;

        let Some(query) = response.get("query").and_then(Value::as_object) else {
            break;
        };

        items.extend(extract(query)?);

        match response.get("continue").and_then(Value::as_object) {
            Some(token) => last_continue = continuation_params(token),
            None => break,
        }
    }

    debug!(
        context = context,
        requests = requests,
        items = items.len(),
        "Continuation drained"
    );

    Ok(items)
}

/// Turn a `continue` object into request parameters
fn continuation_params(token: &Map<String, Value>) -> QueryParams {
    token
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}
