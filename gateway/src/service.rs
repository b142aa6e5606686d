//! Command dispatch and device-state reporting.
//!
//! Every handler is a plain function of `&DeviceContext` and its parsed
//! input. None of them awaits, so a request is computed in one go on the
//! event loop and nothing can interleave with it.

use mesh_gateway_common::{
    CommandRequest, EchoRequest, StatusReport, DEVICE_HOSTNAME, SERVICE_NAME, UNKNOWN_COMMAND,
};
use serde_json::{json, Map, Value};

use crate::context::DeviceContext;
use crate::netif::best_effort_ip;

/// Version reported by `/health`, fixed at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A parsed request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Health,
    Echo { message: Value },
    Control { cmd: Option<Value>, args: Value },
}

impl From<EchoRequest> for Command {
    fn from(req: EchoRequest) -> Self {
        Command::Echo {
            message: req.message.unwrap_or_else(|| json!("")),
        }
    }
}

impl From<CommandRequest> for Command {
    fn from(req: CommandRequest) -> Self {
        Command::Control {
            cmd: req.cmd,
            args: req.args,
        }
    }
}

/// Outcome of a command, rendered as the response body.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// `{ok: true, ..payload}`
    Success(Map<String, Value>),
    /// `{ok: false, error, ..detail}`. Still an HTTP 200.
    Failure {
        error: String,
        detail: Map<String, Value>,
    },
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandResult::Success(_))
    }

    pub fn into_json(self) -> Value {
        let mut body = Map::new();
        match self {
            CommandResult::Success(payload) => {
                body.insert("ok".to_string(), Value::Bool(true));
                body.extend(payload);
            }
            CommandResult::Failure { error, detail } => {
                body.insert("ok".to_string(), Value::Bool(false));
                body.insert("error".to_string(), Value::String(error));
                body.extend(detail);
            }
        }
        Value::Object(body)
    }
}

fn fields<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub fn health() -> CommandResult {
    CommandResult::Success(fields([
        ("service", json!(SERVICE_NAME)),
        ("version", json!(VERSION)),
    ]))
}

pub fn echo(message: &Value) -> CommandResult {
    CommandResult::Success(fields([("echo", message.clone())]))
}

/// Current device state. Cannot fail: IP lookup errors fall back to a fixed address.
pub fn status(ctx: &DeviceContext) -> StatusReport {
    StatusReport {
        uptime_ms: ctx.clock.uptime_ms(),
        ip: best_effort_ip(&ctx.netif),
        hostname: DEVICE_HOSTNAME.to_string(),
    }
}

/// Route a `/command` request on its `cmd` field.
///
/// A `cmd` that is not a string is unknown and reported back as sent.
/// `args` is only read by `echo`; anything but an object counts as no arguments.
pub fn command(ctx: &DeviceContext, cmd: Option<&Value>, args: &Value) -> CommandResult {
    match cmd.and_then(Value::as_str) {
        Some("status") => {
            let report = status(ctx);
            CommandResult::Success(fields([(
                "result",
                json!({
                    "uptime_ms": report.uptime_ms,
                    "ip": report.ip,
                    "hostname": report.hostname,
                }),
            )]))
        }
        Some("echo") => {
            // Any JSON value is echoed as-is; missing means "".
            let message = args
                .as_object()
                .and_then(|args| args.get("message"))
                .cloned()
                .unwrap_or_else(|| json!(""));
            CommandResult::Success(fields([("result", json!({ "echo": message }))]))
        }
        _ => {
            let cmd = cmd.cloned().unwrap_or(Value::Null);
            tracing::debug!("Unknown command: {}", cmd);
            CommandResult::Failure {
                error: UNKNOWN_COMMAND.to_string(),
                detail: fields([("cmd", cmd)]),
            }
        }
    }
}

pub fn dispatch(ctx: &DeviceContext, request: &Command) -> CommandResult {
    match request {
        Command::Health => health(),
        Command::Echo { message } => echo(message),
        Command::Control { cmd, args } => command(ctx, cmd.as_ref(), args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::clock::DeviceClock;
    use crate::netif::InterfaceState;
    use crate::test_util::ManualTicks;

    fn context_at(start: u32) -> (DeviceContext, Arc<ManualTicks>) {
        let ticks = Arc::new(ManualTicks::new(start));
        let ctx = DeviceContext::new(DeviceClock::start(ticks.clone()), InterfaceState::Absent);
        (ctx, ticks)
    }

    #[test]
    fn test_health_payload() {
        let body = health().into_json();
        assert_eq!(
            body,
            json!({"ok": true, "service": "mesh-gateway", "version": VERSION})
        );
    }

    #[test]
    fn test_echo_returns_message_unchanged() {
        for message in ["", "hello", "héllo wörld ✓", "line\nbreak", "  padded  "] {
            assert_eq!(echo(&json!(message)).into_json(), json!({"ok": true, "echo": message}));
        }
    }

    #[test]
    fn test_echo_returns_non_string_message_as_sent() {
        for message in [json!(42), json!(null), json!([1, "two"]), json!({"nested": true})] {
            assert_eq!(echo(&message).into_json(), json!({"ok": true, "echo": message}));
        }
    }

    #[test]
    fn test_echo_request_without_message_is_empty() {
        let request = Command::from(EchoRequest::default());
        assert_eq!(request, Command::Echo { message: json!("") });

        let (ctx, _) = context_at(0);
        assert_eq!(dispatch(&ctx, &request).into_json(), json!({"ok": true, "echo": ""}));
    }

    #[test]
    fn test_status_right_after_start() {
        let (ctx, _) = context_at(123);
        let body = command(&ctx, Some(&json!("status")), &json!({})).into_json();

        assert_eq!(body["ok"], true);
        assert_eq!(body["result"]["uptime_ms"], 0);
        assert_eq!(body["result"]["ip"], "0.0.0.0");
        assert_eq!(body["result"]["hostname"], "mesh-gateway.local");
    }

    #[test]
    fn test_status_uptime_across_wraparound() {
        let (ctx, ticks) = context_at(u32::MAX - 4);
        ticks.advance(1_005);

        let report = status(&ctx);
        assert_eq!(report.uptime_ms, 1_005);
    }

    #[test]
    fn test_command_echo_uses_args_message() {
        let (ctx, _) = context_at(0);
        let echo_cmd = json!("echo");

        let body = command(&ctx, Some(&echo_cmd), &json!({"message": "hi"})).into_json();
        assert_eq!(body, json!({"ok": true, "result": {"echo": "hi"}}));

        let body = command(&ctx, Some(&echo_cmd), &json!({})).into_json();
        assert_eq!(body, json!({"ok": true, "result": {"echo": ""}}));
    }

    #[test]
    fn test_command_echo_ignores_non_object_args() {
        let (ctx, _) = context_at(0);
        for args in [json!(null), json!([1, 2]), json!("message"), json!(7)] {
            let body = command(&ctx, Some(&json!("echo")), &args).into_json();
            assert_eq!(body, json!({"ok": true, "result": {"echo": ""}}), "args {}", args);
        }
    }

    #[test]
    fn test_status_ignores_args() {
        let (ctx, _) = context_at(0);
        for args in [json!(null), json!([1]), json!("x")] {
            let body = command(&ctx, Some(&json!("status")), &args).into_json();
            assert_eq!(body["ok"], true);
            assert_eq!(body["result"]["hostname"], "mesh-gateway.local");
        }
    }

    #[test]
    fn test_unknown_command_is_in_band_failure() {
        let (ctx, _) = context_at(0);
        for cmd in ["reboot", "STATUS", "", "echo "] {
            let result = command(&ctx, Some(&json!(cmd)), &json!({}));
            assert!(!result.is_ok());
            assert_eq!(
                result.into_json(),
                json!({"ok": false, "error": "unknown_command", "cmd": cmd})
            );
        }
    }

    #[test]
    fn test_non_string_cmd_is_unknown_and_echoed_raw() {
        let (ctx, _) = context_at(0);
        for cmd in [json!(42), json!(true), json!(["status"]), json!({"name": "status"})] {
            let result = command(&ctx, Some(&cmd), &json!(null));
            assert!(!result.is_ok());
            assert_eq!(
                result.into_json(),
                json!({"ok": false, "error": "unknown_command", "cmd": cmd})
            );
        }
    }

    #[test]
    fn test_missing_cmd_reports_null() {
        let (ctx, _) = context_at(0);
        let request = Command::from(CommandRequest::default());
        assert_eq!(
            dispatch(&ctx, &request).into_json(),
            json!({"ok": false, "error": "unknown_command", "cmd": null})
        );
    }
}
