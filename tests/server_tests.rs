use serde_json::{json, Value};
use shader_debugger::server::{read_message, serve};
use shader_debugger::Instrumenter;
use std::io::Cursor;

fn frame(value: &Value) -> String {
    let body = value.to_string();
    format!("Content-Length: {}\r\n\r\n{}", body.len(), body)
}

fn run(requests: &[Value]) -> Vec<Value> {
    run_raw(requests.iter().map(frame).collect())
}

fn run_raw(input: String) -> Vec<Value> {
    let mut output = Vec::new();
    serve(Instrumenter::default(), Cursor::new(input), &mut output).expect("serve failed");

    let mut reader = Cursor::new(output);
    let mut responses = Vec::new();
    while let Some(msg) = read_message(&mut reader).expect("bad frame") {
        responses.push(serde_json::to_value(msg).unwrap());
    }
    responses
}

const SHADER: &str = "void mainImage(out vec4 fragColor, in vec2 fragCoord) {\n    vec2 uv = fragCoord / iResolution.xy;\n    fragColor = vec4(0.0);\n}\n";

#[test]
fn test_instrument_request_returns_source() {
    let responses = run(&[json!({
        "seq": 1,
        "type": "request",
        "command": "instrument",
        "arguments": {"source": SHADER, "targetLine": 1, "targetLineText": "vec2 uv = fragCoord / iResolution.xy;"}
    })]);

    assert_eq!(responses.len(), 1);
    let response = &responses[0];
    assert_eq!(response["type"], "response");
    assert_eq!(response["request_seq"], 1);
    assert_eq!(response["success"], true);
    let source = response["body"]["source"].as_str().unwrap();
    assert!(source.contains("    fragColor = vec4(uv, 0.0, 1.0);\n    return;\n"));
}

#[test]
fn test_failed_instrument_carries_message() {
    let responses = run(&[json!({
        "seq": 4,
        "command": "instrument",
        "arguments": {"source": SHADER, "targetLine": 40}
    })]);

    assert_eq!(responses[0]["success"], false);
    assert!(responses[0]["message"].as_str().unwrap().contains("out of range"));
    assert!(responses[0].get("body").is_none());
}

#[test]
fn test_loop_caps_and_snippet_requests() {
    let looped = "void mainImage(out vec4 fragColor, in vec2 fragCoord) {\n    float s = 0.0;\n    for (int i = 0; i < 9; i++) {\n        s += 0.1;\n    }\n    fragColor = vec4(s);\n}\n";
    let responses = run(&[
        json!({
            "seq": 1,
            "command": "instrument",
            "arguments": {"source": looped, "targetLine": 1, "loopCaps": {"0": 2}}
        }),
        json!({
            "seq": 2,
            "command": "snippet",
            "arguments": {"lineText": "col = vec3(1.0);", "type": "vec3"}
        }),
    ]);

    assert_eq!(responses.len(), 2);
    let capped = responses[0]["body"]["source"].as_str().unwrap();
    assert!(capped.contains("if (++_dbg_loop0_iter > 2) break;"));
    let snippet = responses[1]["body"]["source"].as_str().unwrap();
    assert!(snippet.contains("fragColor = vec4(col, 1.0);"));
}

#[test]
fn test_disconnect_stops_serving() {
    let responses = run(&[
        json!({"seq": 1, "command": "disconnect"}),
        json!({"seq": 2, "command": "instrument", "arguments": {"source": SHADER, "targetLine": 1}}),
    ]);

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["command"], "disconnect");
    assert_eq!(responses[0]["success"], true);
}

#[test]
fn test_unknown_command_and_bad_arguments() {
    let responses = run(&[
        json!({"seq": 1, "command": "launch"}),
        json!({"seq": 2, "command": "instrument", "arguments": {"targetLine": 1}}),
    ]);

    assert_eq!(responses[0]["success"], false);
    assert!(responses[0]["message"].as_str().unwrap().contains("launch"));
    assert_eq!(responses[1]["success"], false);
    assert!(responses[1]["message"].as_str().unwrap().starts_with("invalid arguments"));
}

#[test]
fn test_response_sequence_numbers_increase() {
    let responses = run(&[
        json!({"seq": 10, "command": "snippet", "arguments": {"lineText": "float d = 1.0;"}}),
        json!({"seq": 11, "command": "snippet", "arguments": {"lineText": "float e = 2.0;"}}),
    ]);
    let seqs: Vec<u64> = responses.iter().map(|r| r["seq"].as_u64().unwrap()).collect();
    assert_eq!(seqs, vec![1, 2]);
    assert!(responses.iter().all(|r| r["type"] == "response"));
}

#[test]
fn test_malformed_frame_does_not_stop_serving() {
    let garbage = "{not json";
    let mut input = format!("Content-Length: {}\r\n\r\n{}", garbage.len(), garbage);
    input.push_str(&frame(&json!({"seq": 3, "command": "snippet", "arguments": {"lineText": "float d = 1.0;"}})));
    let responses = run_raw(input);

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["success"], false);
    assert_eq!(responses[0]["request_seq"], 0);
    assert!(responses[0]["message"].as_str().unwrap().starts_with("invalid message"));
    assert_eq!(responses[1]["request_seq"], 3);
    assert_eq!(responses[1]["success"], true);
}
