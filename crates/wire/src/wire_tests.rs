// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: field names, framing, and decode failures.

use super::*;
use relay_core::{JobState, RunIf};

#[test]
fn encode_uses_agent_field_names() {
    let tree = BuildCommand::compose([BuildCommand::echo(&["hi"])])
        .run_if(RunIf::Any)
        .with_on_cancel(BuildCommand::fail("x"))
        .with_working_directory("sub");
    let json: serde_json::Value = serde_json::from_str(&encode(&tree).unwrap()).unwrap();

    assert_eq!(json["name"], "compose");
    assert_eq!(json["runIfConfig"], "any");
    assert_eq!(json["workingDirectory"], "sub");
    assert_eq!(json["onCancel"]["name"], "fail");
    assert_eq!(json["subCommands"][0]["args"]["line"], r#"["hi"]"#);
}

#[test]
fn args_stay_a_flat_string_map() {
    let node = BuildCommand::export("k", "v", true);
    let json: serde_json::Value = serde_json::from_str(&encode(&node).unwrap()).unwrap();
    assert_eq!(json["args"]["secure"], "true");
}

#[test]
fn decode_defaults_omitted_fields() {
    let node = decode(r#"{"name":"echo"}"#).unwrap();
    assert_eq!(node, BuildCommand::new("echo"));
    assert_eq!(node.run_condition(), RunIf::Passed);
}

#[test]
fn decode_keeps_nested_test_and_on_cancel() {
    let tree = BuildCommand::compose([
        BuildCommand::mkdirs("out").with_test(BuildCommand::test("-nd", "out")),
        BuildCommand::report_current_status(JobState::Building)
            .with_on_cancel(BuildCommand::echo(&["cancelled", "bye"])),
    ]);
    let back = decode(&encode(&tree).unwrap()).unwrap();
    assert_eq!(back, tree);
    assert_eq!(back.dump(), tree.dump());
}

#[yare::parameterized(
    not_json      = { "compose" },
    missing_name  = { r#"{"args":{}}"# },
    bad_run_if    = { r#"{"name":"x","runIfConfig":"sometimes"}"# },
    args_not_strs = { r#"{"name":"x","args":{"a":1}}"# },
    truncated     = { r#"{"name":"x","subCommands":[{"name":"#  },
)]
fn decode_rejects_malformed_tree(input: &str) {
    let err = decode(input).unwrap_err();
    assert!(matches!(err, WireError::MalformedTree(_)), "got {err:?}");
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.unwrap();
    assert_eq!(buffer.len(), 4 + original.len());
    assert_eq!(&buffer[..4], &(original.len() as u32).to_be_bytes());

    let mut cursor = std::io::Cursor::new(buffer);
    assert_eq!(read_message(&mut cursor).await.unwrap(), original);
}

#[tokio::test]
async fn read_message_rejects_oversized_prefix() {
    let prefix = ((MAX_MESSAGE_LEN as u32) + 1).to_be_bytes();
    let mut cursor = std::io::Cursor::new(prefix.to_vec());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, WireError::MessageTooLarge(_)));
}

#[tokio::test]
async fn command_survives_framed_stream() {
    let tree = BuildCommand::compose([
        BuildCommand::exec("echo", &["one", "two"]),
        BuildCommand::upload_artifact("target/*.jar", "pkg").run_if(RunIf::Passed),
    ]);
    let mut buffer = Vec::new();
    write_command(&mut buffer, &tree).await.unwrap();
    write_command(&mut buffer, &BuildCommand::new("second")).await.unwrap();

    let mut cursor = std::io::Cursor::new(buffer);
    assert_eq!(read_command(&mut cursor).await.unwrap(), tree);
    assert_eq!(read_command(&mut cursor).await.unwrap(), BuildCommand::new("second"));
}

#[tokio::test]
async fn truncated_frame_is_io_error() {
    let mut cursor = std::io::Cursor::new(vec![0u8, 0, 0, 10, b'{']);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, WireError::Io(_)));
}
