use super::*;

#[test]
fn parse_recognizes_exact_sync_trigger() {
    assert_eq!(Signal::parse("sync glb"), Signal::Sync);
    assert!(Signal::parse(SYNC_TRIGGER).is_sync());
}

#[test]
fn parse_is_exact_about_the_trigger() {
    assert_eq!(Signal::parse("sync glb "), Signal::Text("sync glb ".to_owned()));
    assert_eq!(Signal::parse("SYNC GLB"), Signal::Text("SYNC GLB".to_owned()));
    assert_eq!(Signal::parse(""), Signal::Text(String::new()));
}

#[test]
fn parse_strips_echo_prefix() {
    assert_eq!(Signal::parse("Echo: sync glb"), Signal::Echo("sync glb".to_owned()));
    assert!(!Signal::parse("Echo: sync glb").is_sync());
}

#[test]
fn echo_of_renders_with_prefix() {
    assert_eq!(Signal::echo_of("hello").to_string(), "Echo: hello");
    assert_eq!(Signal::echo_of("sync glb").to_string(), "Echo: sync glb");
}

#[test]
fn display_renders_sync_and_text_verbatim() {
    assert_eq!(Signal::Sync.to_string(), "sync glb");
    assert_eq!(Signal::Text("anything".to_owned()).to_string(), "anything");
}

#[test]
fn display_then_parse_preserves_echo() {
    let echoed = Signal::echo_of("ping").to_string();
    assert_eq!(Signal::parse(&echoed), Signal::Echo("ping".to_owned()));
}

#[test]
fn default_urls_use_default_ports() {
    assert_eq!(default_socket_url(), "ws://localhost:8000");
    assert_eq!(default_scene_url(), "http://localhost:8001/scene.glb");
}

#[test]
fn signal_serializes_with_kind_tag() {
    let json = serde_json::to_value(Signal::Sync).expect("serialize");
    assert_eq!(json, serde_json::json!({"kind": "sync"}));

    let json = serde_json::to_value(Signal::Echo("x".to_owned())).expect("serialize");
    assert_eq!(json, serde_json::json!({"kind": "echo", "text": "x"}));
}
