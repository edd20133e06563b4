use chrono_tz::Tz;
use clap::ValueEnum;
use korekenke_core::{AppError, ErrorMetadata, LogLevel, Reservation};
use std::fmt::Write;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render reservations as a fixed-width table, with creation times in `tz`.
pub fn reservations_table(rows: &[Reservation], tz: Tz) -> String {
    let mut out = String::new();

    if rows.is_empty() {
        out.push_str("No reservations found.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<36} {:<12} {:<30} {:<12} {:>20}",
        "ID", "Code", "Client", "Status", "Created At"
    );
    let _ = writeln!(out, "{}", "-".repeat(114));

    for row in rows {
        let _ = writeln!(
            out,
            "{:<36} {:<12} {:<30} {:<12} {:>20}",
            row.id,
            truncate_string(row.code.as_deref().unwrap_or("-"), 12),
            truncate_string(row.client_name.as_deref().unwrap_or("-"), 30),
            truncate_string(&row.status, 12),
            row.created_at.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S")
        );
    }

    let _ = writeln!(out, "\n{} reservation(s)", rows.len());
    out
}

/// Process exit status for an error, keyed on its error code.
pub fn exit_code(err: &AppError) -> u8 {
    match err.error_code() {
        "INVALID_INPUT" => 2,
        "NOT_FOUND" => 3,
        "UPLOAD_FAILED" => 4,
        "STORAGE_ERROR" => 5,
        "DATABASE_ERROR" => 6,
        _ => 1,
    }
}

/// Log `err` at its own level and return the line to print for the user.
///
/// Production runs show the client message only; elsewhere the full source
/// chain is printed.
pub fn report_error(err: &AppError, production: bool) -> String {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(error = %err, code, "Command failed"),
        LogLevel::Warn => tracing::warn!(error = %err, code, "Command failed"),
        LogLevel::Error => tracing::error!(error = %err, code, "Command failed"),
    }

    let message = if production {
        err.client_message()
    } else {
        err.detailed_message()
    };
    let mut line = format!("error [{}]: {}", code, message);
    if err.is_recoverable() {
        line.push_str("\n(temporary failure; retrying may succeed)");
    }
    line
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
