/// Integration tests for the wire protocol messages
///
/// Validates the JSON shapes exchanged with the captioning service.
use livecap::captions::Caption;
use livecap::network::{CaptionUpdate, ClientMessage, ServerMessage};

#[test]
fn test_outbound_protocol_shapes() {
    println!("\n=== Outbound Protocol Test ===");

    let start = serde_json::to_value(ClientMessage::start_stream("en-IN", "hi", true)).unwrap();
    assert_eq!(start["type"], "start_stream");
    assert_eq!(start["source_language"], "en-IN");
    assert_eq!(start["target_language"], "hi");
    assert_eq!(start["simplify"], true);

    let chunk = serde_json::to_value(ClientMessage::audio_chunk("s-1", "AAAA")).unwrap();
    assert_eq!(chunk["type"], "audio_chunk");
    assert_eq!(chunk["session_id"], "s-1");
    assert_eq!(chunk["audio"], "AAAA");

    let stop = serde_json::to_value(ClientMessage::stop_stream("s-1")).unwrap();
    assert_eq!(stop["type"], "stop_stream");
    assert_eq!(stop["session_id"], "s-1");

    println!("✓ start_stream / audio_chunk / stop_stream");
}

#[test]
fn test_inbound_protocol_shapes() {
    println!("\n=== Inbound Protocol Test ===");

    let msg: ServerMessage =
        serde_json::from_str(r#"{"type":"stream_started","session_id":"abc"}"#).unwrap();
    assert_eq!(msg.session_id(), Some("abc"));

    let msg: ServerMessage = serde_json::from_str(
        r#"{"type":"caption_result","id":"1","original":"hello","confidence":0.8}"#,
    )
    .unwrap();
    let ServerMessage::CaptionResult(caption) = msg else {
        panic!("Expected CaptionResult");
    };
    assert_eq!(caption, {
        let mut expected = Caption::new("1", "hello");
        expected.confidence = Some(0.8);
        expected
    });

    let msg: ServerMessage =
        serde_json::from_str(r#"{"type":"caption_update","id":"1","simplified":"hi"}"#).unwrap();
    let ServerMessage::CaptionUpdate(update) = msg else {
        panic!("Expected CaptionUpdate");
    };
    assert_eq!(update.id, "1");
    assert_eq!(update.simplified.as_deref(), Some("hi"));

    let msg: ServerMessage =
        serde_json::from_str(r#"{"type":"error","message":"quota exceeded"}"#).unwrap();
    assert_eq!(msg.error_message(), Some("quota exceeded"));

    println!("✓ stream_started / caption_result / caption_update / error");
}

#[test]
fn test_unknown_fields_tolerated() {
    println!("\n=== Unknown Fields Test ===");

    // Services add fields over time; parsing must not break
    let msg: ServerMessage = serde_json::from_str(
        r#"{
            "type": "caption_result",
            "id": "7",
            "original": "text",
            "timestamp": 1712000000.25,
            "confidence": 0.5,
            "speaker": "A"
        }"#,
    )
    .unwrap();

    let ServerMessage::CaptionResult(caption) = msg else {
        panic!("Expected CaptionResult");
    };
    assert_eq!(caption.id, "7");
    assert_eq!(caption.timestamp, Some(1712000000.25));

    println!("✓ Extra fields ignored");
}

#[test]
fn test_audio_chunk_carries_payload_atomically() {
    println!("\n=== Chunk Atomicity Test ===");

    // A frame's transport payload is embedded whole in a single message
    let payload = "A".repeat(4096);
    let msg = ClientMessage::audio_chunk("s", payload.clone());

    let json = serde_json::to_string(&msg).unwrap();
    let back: ClientMessage = serde_json::from_str(&json).unwrap();

    let ClientMessage::AudioChunk { audio, .. } = back else {
        panic!("Expected AudioChunk");
    };
    assert_eq!(audio, payload);

    println!("✓ {} byte payload intact in one message", payload.len());
}

#[test]
fn test_caption_update_merge_semantics() {
    println!("\n=== Update Merge Test ===");

    let mut caption = Caption::new("1", "hello");
    caption.confidence = Some(0.9);

    caption.apply_update(&CaptionUpdate::new("1").with_translated("नमस्ते"));
    assert_eq!(caption.original, "hello");
    assert_eq!(caption.translated.as_deref(), Some("नमस्ते"));
    assert_eq!(caption.confidence, Some(0.9));

    caption.apply_update(&CaptionUpdate::new("1").with_simplified("hi"));
    assert_eq!(caption.translated.as_deref(), Some("नमस्ते"));
    assert_eq!(caption.simplified.as_deref(), Some("hi"));

    println!("✓ Present fields override, absent fields preserved");
}
