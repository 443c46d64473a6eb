use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

fn toolbox() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_toolbox"));
    command
        .env_remove("TOOLBOX_TOKEN")
        .env_remove("TOOLBOX_CONFIG_FILE")
        .env_remove("RUST_LOG")
        .env("COLUMNS", "80")
        .stdin(Stdio::null());
    command
}

fn run(args: &[&str]) -> Output {
    toolbox().args(args).output().expect("failed to run toolbox")
}

/// Runs toolbox with `input` piped to stdin.
fn run_with_input(command: &mut Command, input: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn toolbox");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for toolbox")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Blocks until the child's stderr contains `needle`.
fn wait_for_stderr(child: &mut Child, needle: &str, timeout: Duration) {
    let mut stderr = child.stderr.take().expect("stderr is piped");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = [0u8; 256];
        while let Ok(n) = stderr.read(&mut buf) {
            if n == 0 || tx.send(buf[..n].to_vec()).is_err() {
                break;
            }
        }
    });

    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();
    while !String::from_utf8_lossy(&seen).contains(needle) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(chunk) => seen.extend(chunk),
            Err(_) => {
                let _ = child.kill();
                panic!("timed out waiting for {needle:?}; stderr so far: {}", String::from_utf8_lossy(&seen));
            }
        }
    }
}

/// Polls until the child exits, killing it after `timeout`.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::process::ExitStatus {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().expect("failed to poll toolbox") {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("toolbox still running {timeout:?} after interrupt");
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn write_config(dir: &Path, yaml: &str) -> std::path::PathBuf {
    let path = dir.join("toolbox.yaml");
    fs::write(&path, yaml).expect("failed to write config");
    path
}

#[test]
fn test_greet_with_default() {
    let output = run(&["greet", "World"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Hello, World!\n");
}

#[test]
fn test_greet_with_override() {
    let output = run(&["greet", "World", "--greeting", "Hi"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Hi, World!\n");
}

#[test]
fn test_missing_positional_exits_1() {
    let output = run(&["greet"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_unknown_subcommand_exits_1() {
    let output = run(&["nosuchcommand"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nosuchcommand"), "stderr: {}", stderr(&output));
}

#[test]
fn test_no_arguments_exits_1() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_invalid_choice_exits_1() {
    let output = run(&["deploy", "web01", "--env", "qa"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("qa"), "stderr: {err}");
    assert!(!err.contains("Value for"), "should fail before prompting: {err}");
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_deploy_reads_token_from_environment() {
    let output = toolbox()
        .args(["deploy", "web01"])
        .env("TOOLBOX_TOKEN", "s3cret")
        .output()
        .expect("failed to run toolbox");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("deploying web01 to dev"), "stdout: {out}");
    assert!(out.contains("6 characters"), "stdout: {out}");
    assert!(!out.contains("s3cret"));
    assert!(!stderr(&output).contains("Value for"));
}

#[test]
fn test_deploy_prompts_for_token_when_unset() {
    let output = run_with_input(toolbox().args(["deploy", "web01", "--env", "prod"]), "hunter2\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Value for token: "));

    let out = stdout(&output);
    assert!(out.contains("deploying web01 to prod"), "stdout: {out}");
    assert!(out.contains("7 characters"), "stdout: {out}");
    assert!(!out.contains("hunter2"));
}

#[test]
fn test_deploy_help_masks_secret() {
    let output = toolbox()
        .args(["deploy", "--help"])
        .env("TOOLBOX_TOKEN", "s3cret")
        .output()
        .expect("failed to run toolbox");
    assert!(output.status.success());

    let help = stdout(&output);
    assert!(help.contains("Deploys a target to an environment."), "help: {help}");
    assert!(help.contains("$TOOLBOX_TOKEN"), "help: {help}");
    assert!(help.contains("**********"), "help: {help}");
    assert!(help.contains("<Choice: dev, staging, prod>"), "help: {help}");
    assert!(!help.contains("s3cret"));
}

#[test]
fn test_login_prompts_for_user() {
    let output = run_with_input(toolbox().arg("login"), "alice\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Value for user: "));
    assert_eq!(stdout(&output), "logged in as alice\n");
}

#[test]
fn test_login_override_skips_prompt() {
    let output = run(&["login", "--user", "bob"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stderr(&output).contains("Value for"));
    assert_eq!(stdout(&output), "logged in as bob\n");
}

#[test]
fn test_closed_input_aborts_cleanly() {
    let output = run(&["login"]);
    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("ctrl+c by user."), "stdout: {out}");
    assert!(!out.contains("logged in"));
}

#[cfg(unix)]
#[test]
fn test_interrupt_during_prompt_exits_without_running() {
    let mut child = toolbox()
        .arg("login")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn toolbox");
    let mut stdin = child.stdin.take().expect("stdin is piped");

    wait_for_stderr(&mut child, "Value for user: ", Duration::from_secs(10));
    let killed = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("failed to run kill");
    assert!(killed.success());

    let status = wait_with_timeout(&mut child, Duration::from_secs(5));
    // Input arriving after the interrupt must not reach the operation.
    let _ = stdin.write_all(b"alice\n");
    drop(stdin);

    let mut out = String::new();
    child
        .stdout
        .take()
        .expect("stdout is piped")
        .read_to_string(&mut out)
        .expect("failed to read stdout");
    assert_eq!(status.code(), Some(0));
    assert!(out.contains("ctrl+c by user."), "stdout: {out}");
    assert!(!out.contains("logged in"), "stdout: {out}");
}

#[test]
fn test_divide() {
    let output = run(&["divide", "7", "2"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "3\n");
}

#[test]
fn test_divide_by_zero_exits_1() {
    let output = run(&["divide", "1", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error: division by zero"), "stderr: {}", stderr(&output));
}

#[test]
fn test_divide_rejects_non_integer() {
    let output = run(&["divide", "x", "2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid value 'x' for a"), "stderr: {}", stderr(&output));
}

#[test]
fn test_list_prints_sorted_names() {
    let output = run(&["list"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "deploy\ndivide\ngreet\nlogin\n");
}

#[test]
fn test_complete_prints_bash_script() {
    let output = run(&["complete"]);
    assert!(output.status.success());

    let script = stdout(&output);
    assert!(script.contains("complete -F _fncli_toolbox_complete toolbox"), "{script}");
    assert!(script.contains("compgen -W 'deploy divide greet login'"), "{script}");
    assert!(script.contains("compgen -W 'dev staging prod'"), "{script}");
    assert!(script.contains("compgen -W '--env --token'"), "{script}");
}

#[test]
fn test_top_level_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("Sample operations built on fncli"), "help: {help}");
    for name in ["complete", "deploy", "divide", "greet", "list", "login"] {
        assert!(help.contains(name), "missing {name} in help: {help}");
    }
}

#[test]
fn test_config_file_overrides_presentation() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_config(dir.path(), "description: Custom toolbox\nbuiltins: [list]\n");

    let help = toolbox()
        .arg("--help")
        .env("TOOLBOX_CONFIG_FILE", &path)
        .output()
        .expect("failed to run toolbox");
    assert!(help.status.success());
    assert!(stdout(&help).contains("Custom toolbox"));

    let complete = toolbox()
        .arg("complete")
        .env("TOOLBOX_CONFIG_FILE", &path)
        .output()
        .expect("failed to run toolbox");
    assert_eq!(complete.status.code(), Some(1));
}

#[test]
fn test_config_program_name_changes_env_prefix() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_config(dir.path(), "program_name: kit\n");

    let output = toolbox()
        .args(["deploy", "web01"])
        .env("TOOLBOX_CONFIG_FILE", &path)
        .env("KIT_TOKEN", "abcd")
        .output()
        .expect("failed to run toolbox");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("4 characters"));
}

#[test]
fn test_missing_config_file_exits_1() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = toolbox()
        .arg("list")
        .env("TOOLBOX_CONFIG_FILE", dir.path().join("absent.yaml"))
        .output()
        .expect("failed to run toolbox");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to load config"), "stderr: {}", stderr(&output));
}
