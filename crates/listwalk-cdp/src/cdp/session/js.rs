//! JavaScript execution operations for CDP page session.

use serde_json::{json, Value};
use tracing::trace;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{PropertyDescriptor, RemoteObject};

use super::core::PageSession;

impl PageSession {
    /// Evaluate JavaScript expression.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        Self::check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Evaluate JavaScript and return remote object.
    pub async fn evaluate_handle(&self, expression: &str) -> Result<RemoteObject, CdpError> {
        self.evaluate_handle_in(expression, None).await
    }

    /// Evaluate JavaScript and return a remote object owned by `object_group`.
    pub async fn evaluate_handle_in(
        &self,
        expression: &str,
        object_group: Option<&str>,
    ) -> Result<RemoteObject, CdpError> {
        let mut params = json!({
            "expression": expression,
            "returnByValue": false,
        });
        if let Some(group) = object_group {
            params["objectGroup"] = json!(group);
        }

        let result = self.call("Runtime.evaluate", Some(params)).await?;

        Self::check_exception(&result)?;
        let remote_obj: RemoteObject = serde_json::from_value(result["result"].clone())?;
        Ok(remote_obj)
    }

    /// Call function on remote object, returning the result by value.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: &[Value],
    ) -> Result<Value, CdpError> {
        let mut params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "returnByValue": true,
            "awaitPromise": true,
        });
        if !args.is_empty() {
            params["arguments"] = Self::call_arguments(args);
        }

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;

        Self::check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Own properties of a remote object.
    pub async fn get_properties(
        &self,
        object_id: &str,
    ) -> Result<Vec<PropertyDescriptor>, CdpError> {
        let result = self
            .call(
                "Runtime.getProperties",
                Some(json!({
                    "objectId": object_id,
                    "ownProperties": true,
                })),
            )
            .await?;

        let props: Vec<PropertyDescriptor> = serde_json::from_value(result["result"].clone())?;
        Ok(props)
    }

    /// Release a remote object. Failures are ignored; the object may already be gone.
    pub async fn release_object(&self, object_id: &str) {
        if let Err(e) = self
            .call("Runtime.releaseObject", Some(json!({"objectId": object_id})))
            .await
        {
            trace!("releaseObject {} failed: {}", object_id, e);
        }
    }

    /// Release every object in `object_group`.
    pub async fn release_object_group(&self, object_group: &str) {
        if let Err(e) = self
            .call(
                "Runtime.releaseObjectGroup",
                Some(json!({"objectGroup": object_group})),
            )
            .await
        {
            trace!("releaseObjectGroup {} failed: {}", object_group, e);
        }
    }

    /// Object ids of every element matching `selector`, in document order.
    /// Element objects inherit `object_group` from the query.
    pub async fn query_all_handles(
        &self,
        selector: &str,
        object_group: Option<&str>,
    ) -> Result<Vec<String>, CdpError> {
        let expression = format!(
            "Array.from(document.querySelectorAll({}))",
            serde_json::to_string(selector)?
        );
        let array = self.evaluate_handle_in(&expression, object_group).await?;
        self.array_elements(array).await
    }

    /// Split a remote array into the object ids of its elements, then
    /// release the array itself.
    async fn array_elements(&self, array: RemoteObject) -> Result<Vec<String>, CdpError> {
        let Some(array_id) = array.node_id().map(str::to_string) else {
            return Ok(Vec::new());
        };

        let props = self.get_properties(&array_id).await;
        self.release_object(&array_id).await;

        Ok(Self::indexed_object_ids(props?))
    }

    /// Object ids of the numerically-named properties, ordered by index.
    pub(super) fn indexed_object_ids(props: Vec<PropertyDescriptor>) -> Vec<String> {
        let mut indexed: Vec<(usize, String)> = props
            .into_iter()
            .filter_map(|p| {
                let index = p.name.parse::<usize>().ok()?;
                let id = p.value?.node_id()?.to_string();
                Some((index, id))
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, id)| id).collect()
    }

    /// CDP `arguments` array for `Runtime.callFunctionOn`.
    pub(super) fn call_arguments(args: &[Value]) -> Value {
        json!(args.iter().map(|v| json!({"value": v})).collect::<Vec<_>>())
    }

    /// Turn `exceptionDetails` into a `JavaScript` error.
    pub(super) fn check_exception(result: &Value) -> Result<(), CdpError> {
        let Some(exception) = result.get("exceptionDetails") else {
            return Ok(());
        };
        let text = exception["exception"]["description"]
            .as_str()
            .or_else(|| exception["text"].as_str())
            .unwrap_or("Unknown error");
        Err(CdpError::JavaScript(text.to_string()))
    }
}
