//! Runner that replies with what it was given.
//!
//! Lets the binary serve traffic without any business actions wired in.

use async_trait::async_trait;
use serde_json::json;

use super::{ActionError, ActionRef, DispatchOutcome, RunContext, Runner};
use crate::http::request::NormalizedRequest;

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoRunner;

#[async_trait]
impl Runner for EchoRunner {
    async fn run(
        &self,
        ctx: RunContext,
        action: &ActionRef,
        input: NormalizedRequest,
    ) -> Result<DispatchOutcome, ActionError> {
        tracing::debug!(
            action = %action,
            correlation_id = %ctx.correlation_id,
            "Echoing action input"
        );
        let input = serde_json::to_value(&input).map_err(|e| ActionError::new(e.to_string()))?;
        Ok(DispatchOutcome::new(
            200,
            json!({
                "action": action.as_str(),
                "correlationId": ctx.correlation_id.to_string(),
                "input": input,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_echo_returns_input() {
        let mut path_params = BTreeMap::new();
        path_params.insert("id".to_string(), "7".to_string());
        let input = NormalizedRequest::new(path_params, BTreeMap::new(), None);

        let ctx = RunContext {
            trigger_id: Arc::from("rest"),
            correlation_id: Uuid::new_v4(),
            request_id: None,
            method: "GET".into(),
            route: "/things/:id".into(),
        };

        let outcome = EchoRunner
            .run(ctx, &ActionRef::new("show"), input)
            .await
            .unwrap();

        assert_eq!(outcome.status_code, Some(200));
        let body = outcome.body.unwrap();
        assert_eq!(body["action"], "show");
        assert_eq!(body["input"]["pathParams"]["id"], "7");
        assert_eq!(body["input"]["params"]["id"], "7");
    }
}
