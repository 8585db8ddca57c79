//! Human-readable error descriptions and structured JSON error formatting.

use boardweigh_core::error::{BuildError, WeighError};

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSource => {
                "What happened: No board source was provided to the weighing session.\nLikely causes: The board backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure the board opens successfully and is passed via with_source(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    if let Some(we) = err.downcast_ref::<WeighError>() {
        return match we {
            WeighError::Timeout => {
                "What happened: The board stopped delivering frames.\nLikely causes: Board powered off, bluetooth link dropped, or timeout too low.\nHow to fix: Check the board's batteries and connection, and consider raising timeouts.sample_ms in the config.".to_string()
            }
            WeighError::Cancelled => {
                "What happened: The measurement was cancelled.\nLikely causes: Ctrl-c was pressed during calibration or weighing.\nHow to fix: Re-run when ready.".to_string()
            }
            WeighError::InsufficientSamples { got, need } => format!(
                "What happened: Calibration ended early ({got} of {need} frames).\nLikely causes: The board disconnected or stalled during zero-load calibration.\nHow to fix: Verify the connection and re-run; keep the board unloaded until calibration finishes."
            ),
            WeighError::Config(msg) => format!(
                "What happened: Invalid runtime state ({msg}).\nLikely causes: Calibration was skipped without persisted offsets.\nHow to fix: Run calibration, or supply offsets via --offsets / [offsets] in the config."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("offsets csv must have headers") {
        return "Invalid headers in offsets CSV. Expected 'corner,offset'.".to_string();
    }

    if lower.contains("no balance board found") {
        return "What happened: No balance board input device was found.\nLikely causes: The board is not paired/connected, or the hid-wiimote driver is not loaded.\nHow to fix: Pair the board, confirm a /dev/input/event* node appears, or set board.device in the config.".to_string();
    }

    if lower.contains("invalid configuration") {
        return "What happened: Configuration is invalid or incomplete.\nLikely causes: Out-of-range values under [convergence], [calibration], or [timeouts].\nHow to fix: Edit the TOML config and try again.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map WeighError (if present) to stable exit codes; other errors return 1.
/// Exit 3 is reserved for a measurement that gave up before settling.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(we) = err.downcast_ref::<WeighError>() {
        return match we {
            WeighError::Cancelled => 4,
            WeighError::Timeout => 5,
            WeighError::InsufficientSamples { .. } => 6,
            _ => 1,
        };
    }
    1
}

fn error_reason(err: &eyre::Report) -> &'static str {
    if let Some(we) = err.downcast_ref::<WeighError>() {
        return match we {
            WeighError::Source(_) => "Source",
            WeighError::SourceFault(_) => "SourceFault",
            WeighError::Timeout => "Timeout",
            WeighError::InsufficientSamples { .. } => "InsufficientSamples",
            WeighError::Cancelled => "Cancelled",
            WeighError::Config(_) => "Config",
        };
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = error_reason(err);
    let msg = humanize(err);

    if let Some(WeighError::InsufficientSamples { got, need }) = err.downcast_ref::<WeighError>() {
        return json!({
            "reason": reason,
            "details": { "got": got, "need": need },
            "message": msg,
        })
        .to_string();
    }
    json!({ "reason": reason, "message": msg }).to_string()
}
