use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::api::Envelope;
use crate::cli::OutputFormat;
use crate::notice::{Notice, Notifier};

/// Prints notices to stderr so they never mix with JSON output
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!("Notice: {}", notice.message);
        eprintln!("! {}", notice.message);
    }
}

/// Unwrap a successful envelope, turning `success: false` into an error
pub fn expect_data<T>(envelope: Envelope<T>) -> anyhow::Result<T> {
    Ok(envelope.into_result()?)
}

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            match data {
                Some(Value::Object(fields)) => {
                    if let Some(object) = response.as_object_mut() {
                        object.extend(fields);
                    }
                }
                Some(other) => response["data"] = other,
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// JSON dumps the value as-is; text hands it to `render`
pub fn output_data<T: Serialize>(
    output_format: &OutputFormat,
    value: &T,
    render: impl FnOnce(&T),
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => render(value),
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Use the provided secret or read one line from stdin
pub fn resolve_secret(provided: Option<String>, prompt: &str) -> anyhow::Result<String> {
    if let Some(secret) = provided {
        return Ok(secret);
    }

    eprint!("{}: ", prompt);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let secret = line.trim_end_matches(['\r', '\n']).to_string();
    if secret.is_empty() {
        anyhow::bail!("{} is required", prompt);
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiOutcome;

    #[test]
    fn test_expect_data_surfaces_rejection() {
        let envelope: Envelope<Value> = Envelope::from_slice(br#"{"success":false,"message":"Plan limit"}"#).unwrap();
        assert!(!envelope.is_success());
        let err = expect_data(envelope).unwrap_err();
        assert!(err.to_string().contains("Plan limit"));

        let envelope: Envelope<Value> = Envelope::from_slice(br#"{"success":true,"data":{"id":1}}"#).unwrap();
        assert!(matches!(envelope.outcome, ApiOutcome::Ok(_)));
        assert_eq!(expect_data(envelope).unwrap()["id"], 1);
    }

    #[test]
    fn test_provided_secret_skips_prompt() {
        assert_eq!(resolve_secret(Some("pw".to_string()), "Password").unwrap(), "pw");
    }
}
