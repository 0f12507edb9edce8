use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::guard::GuardDecision;
use crate::resolver::ResolutionState;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
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
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
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

/// Output a resolution state in the appropriate format
pub fn output_state(output_format: &OutputFormat, state: &ResolutionState) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "tenancy": state }))?);
        }
        OutputFormat::Text => {
            match &state.organization {
                Some(org) => println!("Organization: {} ({})", org.name, org.id),
                None => println!("Organization: none"),
            }
            match &state.subscription {
                Some(sub) => println!("Subscription: {} [{:?}]", sub.plan, sub.status),
                None => println!("Subscription: none"),
            }
            if state.loading {
                println!("Status: loading");
            }
            if let Some(message) = state.error_message() {
                println!("Error: {}", message);
            }
        }
    }
    Ok(())
}

/// Output a guard decision in the appropriate format
pub fn output_decision(output_format: &OutputFormat, path: &str, decision: &GuardDecision) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "path": path, "guard": decision }))?
            );
        }
        OutputFormat::Text => match decision {
            GuardDecision::Loading => println!("{}: loading", path),
            GuardDecision::Render => println!("{}: render", path),
            GuardDecision::Redirect(target) => println!("{}: redirect to {}", path, target),
            GuardDecision::AwaitingOrganization(target) => {
                println!("{}: awaiting organization ({})", path, target)
            }
        },
    }
    Ok(())
}
