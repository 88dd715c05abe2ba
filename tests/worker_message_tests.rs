// Wire-format tests for the worker message protocol
//
// The worker is an external collaborator; these tests pin the JSON field
// names and tags both directions.

use murmur::worker::messages::{WorkerEvent, WorkerRequest};
use murmur::{ModelConfig, Subtask};

#[test]
fn test_load_model_serialization() {
    let request = WorkerRequest::LoadModel(ModelConfig::default());

    let json = serde_json::to_string(&request).unwrap();
    assert!(json.contains("\"op\":\"load_model\""));
    assert!(json.contains("\"model_id\":\"Xenova/whisper-tiny\""));
    assert!(json.contains("\"multilingual\":false"));
    assert!(json.contains("\"quantized\":false"));
    assert!(json.contains("\"subtask\":\"transcribe\""));
    assert!(json.contains("\"language\":\"english\""));
}

#[test]
fn test_transcribe_serialization_flattens_model_fields() {
    let request = WorkerRequest::Transcribe {
        config: ModelConfig {
            model_id: "Xenova/whisper-small".to_string(),
            multilingual: true,
            quantized: true,
            subtask: Subtask::Translate,
            language: "french".to_string(),
        },
        audio: vec![0.0, 0.5, -0.5],
    };

    let json = serde_json::to_string(&request).unwrap();
    assert!(json.contains("\"op\":\"transcribe\""));
    assert!(json.contains("\"model_id\":\"Xenova/whisper-small\""));
    assert!(json.contains("\"subtask\":\"translate\""));
    assert!(json.contains("\"audio\":[0.0,0.5,-0.5]"));

    let deserialized: WorkerRequest = serde_json::from_str(&json).unwrap();
    match deserialized {
        WorkerRequest::Transcribe { config, audio } => {
            assert_eq!(config.language, "french");
            assert_eq!(audio, vec![0.0, 0.5, -0.5]);
        }
        other => panic!("expected transcribe request, got {other:?}"),
    }
}

#[test]
fn test_progress_event_deserialization() {
    let json = r#"{"kind":"progress","fraction":0.4}"#;
    let event: WorkerEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event, WorkerEvent::Progress { fraction: 0.4 });
}

#[test]
fn test_ready_event_deserialization() {
    let json = r#"{"kind":"ready"}"#;
    let event: WorkerEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event, WorkerEvent::Ready);
}

#[test]
fn test_result_event_deserialization() {
    let json = r#"{"kind":"result","text":"hello world"}"#;
    let event: WorkerEvent = serde_json::from_str(json).unwrap();
    assert_eq!(
        event,
        WorkerEvent::Result {
            text: "hello world".to_string()
        }
    );
}

#[test]
fn test_error_event_deserialization() {
    let json = r#"{"kind":"error","message":"model blew up"}"#;
    let event: WorkerEvent = serde_json::from_str(json).unwrap();
    assert_eq!(
        event,
        WorkerEvent::Error {
            message: "model blew up".to_string()
        }
    );
}

#[test]
fn test_unknown_event_kind_is_a_parse_error() {
    let json = r#"{"kind":"telemetry","payload":123}"#;
    let result = serde_json::from_str::<WorkerEvent>(json);
    assert!(result.is_err());
}

#[test]
fn test_event_round_trip() {
    let events = vec![
        WorkerEvent::Progress { fraction: 0.25 },
        WorkerEvent::Ready,
        WorkerEvent::Result {
            text: "round trip".to_string(),
        },
        WorkerEvent::Error {
            message: "nope".to_string(),
        },
    ];

    for event in events {
        let json = serde_json::to_string(&event).unwrap();
        let back: WorkerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
