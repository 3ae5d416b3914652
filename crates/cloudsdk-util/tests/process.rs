use std::collections::BTreeMap;

use cloudsdk_util::process::{CommandBuilder, CommandExecutor, MessageListener, ProcessExecutor};

#[derive(Default)]
struct Collect(Vec<String>);

impl MessageListener for Collect {
    fn message(&mut self, raw: &str) {
        self.0.push(raw.to_string());
    }
}

#[test]
fn test_builder_simple_command() {
    let output = CommandBuilder::new("echo").arg("hello").exec().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "hello");
}

#[test]
fn test_builder_nonexistent_program() {
    let result = CommandBuilder::new("nonexistent_program_xyz_123").exec();
    assert!(result.is_err());
}

#[cfg(unix)]
#[test]
fn test_stream_forwards_stdout_and_stderr() {
    let mut lines = Collect::default();
    let code = CommandBuilder::new("sh")
        .arg("-c")
        .arg("echo out; echo err 1>&2")
        .stream(&mut lines)
        .unwrap();
    assert_eq!(code, 0);
    let mut got = lines.0.clone();
    got.sort();
    assert_eq!(got, vec!["err".to_string(), "out".to_string()]);
}

#[cfg(unix)]
#[test]
fn test_executor_reports_exit_code_env_and_cwd() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(tmp.path().join("marker.txt"), "ok").unwrap();
    let mut env = BTreeMap::new();
    env.insert("CLOUDSDK_TEST_VAR".to_string(), "value".to_string());

    let mut lines = Collect::default();
    let code = ProcessExecutor
        .run(
            &[
                "sh".to_string(),
                "-c".to_string(),
                "ls marker.txt; echo $CLOUDSDK_TEST_VAR; exit 7".to_string(),
            ],
            Some(tmp.path()),
            &env,
            &mut lines,
        )
        .unwrap();
    assert_eq!(code, 7);
    assert_eq!(lines.0, vec!["marker.txt".to_string(), "value".to_string()]);
}

#[cfg(unix)]
#[test]
fn test_stream_survives_invalid_utf8_output() {
    let mut lines = Collect::default();
    let code = ProcessExecutor
        .run(
            &[
                "sh".to_string(),
                "-c".to_string(),
                "echo before; printf 'bad \\377 byte\\n'; echo after; exit 0".to_string(),
            ],
            None,
            &BTreeMap::new(),
            &mut lines,
        )
        .unwrap();
    assert_eq!(code, 0);
    assert_eq!(
        lines.0,
        vec![
            "before".to_string(),
            "bad \u{FFFD} byte".to_string(),
            "after".to_string(),
        ]
    );
}

#[test]
fn test_executor_rejects_empty_command() {
    let mut lines = Collect::default();
    let result = ProcessExecutor.run(&[], None, &BTreeMap::new(), &mut lines);
    assert!(result.is_err());
}
