use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 7,
        method: "Runtime.callFunctionOn".to_string(),
        params: Some(serde_json::json!({"objectId": "obj-1"})),
        session_id: Some("sess".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Runtime.callFunctionOn"));
    assert!(json.contains("\"sessionId\":\"sess\""));
}

#[test]
fn test_cdp_request_omits_empty_fields() {
    let req = CdpRequest {
        id: 1,
        method: "Page.enable".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("params"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_reply_into_result() {
    let json = r#"{"id": 1, "result": {"frameId": "abc"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert_eq!(resp.into_result().unwrap()["frameId"], "abc");
}

#[test]
fn test_empty_reply_is_null() {
    let resp: CdpResponse = serde_json::from_str(r#"{"id": 2}"#).unwrap();
    assert!(resp.into_result().unwrap().is_null());
}

#[test]
fn test_error_reply_into_protocol_error() {
    let json = r#"{"id": 3, "error": {"code": -32000, "message": "Could not find object with given id", "data": "x"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    let err = resp.into_result().unwrap_err();
    assert!(matches!(err, CdpError::Protocol { code: -32000, .. }));
    assert!(err.is_stale_object());
}

#[test]
fn test_event_has_no_id() {
    let json = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}, "sessionId": "s1"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert!(resp.id.is_none());
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Inbox",
        "url": "https://chat.example.com/inbox",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert_eq!(info.page_type, "page");
}

#[test]
fn test_remote_object_node_id() {
    let node: RemoteObject = serde_json::from_str(
        r#"{"type": "object", "subtype": "node", "className": "HTMLDivElement", "objectId": "n1"}"#,
    )
    .unwrap();
    assert_eq!(node.node_id(), Some("n1"));

    let null: RemoteObject =
        serde_json::from_str(r#"{"type": "object", "subtype": "null", "value": null}"#).unwrap();
    assert_eq!(null.node_id(), None);

    let undefined: RemoteObject = serde_json::from_str(r#"{"type": "undefined"}"#).unwrap();
    assert_eq!(undefined.node_id(), None);
}

#[test]
fn test_mouse_event_type_serialize() {
    let json = serde_json::to_string(&MouseEventType::MouseWheel).unwrap();
    assert_eq!(json, "\"mouseWheel\"");
}
