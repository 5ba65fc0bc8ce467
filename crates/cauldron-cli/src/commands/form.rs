//! `cauldron form`: open a plugin form, fill it and optionally submit it

use crate::host::cli_host;
use crate::CliError;
use cauldron_config::Config;
use cauldron_form::{FormError, FormSession, NormalizedValues, OptionSet};
use cauldron_logger as logger;
use cauldron_schema::{load_plugin, FieldKind, FieldSpec, FieldValue};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Plugin folder containing plugin.yaml
    pub plugin_dir: PathBuf,

    /// Populate the form from the plugin's example before applying --set
    #[arg(long)]
    pub example: bool,

    /// Set a field, e.g. --set alpha=0.05 or --set columns=S1,S2
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Hand the normalized values to the dry-run executor
    #[arg(long)]
    pub submit: bool,

    /// Example asset root (defaults to the configured examples-path)
    #[arg(long)]
    pub examples_dir: Option<PathBuf>,
}

/// Form state printed after all values are applied
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormState<'a> {
    plugin_id: &'a str,
    visible_fields: Vec<&'a str>,
    options: BTreeMap<&'a str, OptionSet>,
    values: NormalizedValues,
    errors: Vec<&'a str>,
}

/// Split `name=value` at the first `=`
pub fn parse_assignment(raw: &str) -> Result<(&str, &str), CliError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(CliError::InvalidAssignment(raw.to_string())),
    }
}

/// Interpret a command-line string according to the field's kind
pub fn parse_field_value(field: &FieldSpec, raw: &str) -> Result<FieldValue, CliError> {
    let invalid = || CliError::InvalidValue {
        field: field.name.clone(),
        value: raw.to_string(),
        kind: field.kind,
    };

    if field.is_multi_valued() {
        let items: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        return Ok(FieldValue::List(items));
    }

    match field.kind {
        FieldKind::Number => {
            if raw.trim().is_empty() {
                return Ok(FieldValue::Empty);
            }
            raw.trim().parse::<f64>().map(FieldValue::Number).map_err(|_| invalid())
        }
        FieldKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(FieldValue::Bool(true)),
            "false" | "no" | "0" | "off" => Ok(FieldValue::Bool(false)),
            _ => Err(invalid()),
        },
        _ => Ok(FieldValue::text(raw)),
    }
}

pub fn run_form(args: FormArgs) -> Result<(), CliError> {
    let plugin = load_plugin(&args.plugin_dir)?;
    let examples_root = match args.examples_dir.clone() {
        Some(dir) => dir,
        None => Config::load()?.examples_dir()?,
    };
    logger::info(&format!(
        "Opening form for {} with examples from {}",
        plugin.id(),
        examples_root.display()
    ));

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    runtime.block_on(async move {
        let mut session = FormSession::open(plugin, cli_host(examples_root)).await;

        if args.example {
            logger::spinner_start("Loading example data");
            let outcome = session.load_example().await;
            if outcome.skipped.is_empty() {
                logger::spinner_stop();
            } else {
                logger::spinner_error(&format!("Example loaded with {} skipped entries", outcome.skipped.len()));
            }
            for skipped in &outcome.skipped {
                logger::step(&format!("Skipped example entry {}: {}", skipped.key, skipped.reason));
            }
        }

        for raw in &args.set {
            let (name, value) = parse_assignment(raw)?;
            let field = session
                .definition()
                .input(name)
                .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
            let value = parse_field_value(field, value)?;
            session.on_field_change(name, value).await?;
        }

        let report = session.validate().clone();
        print_state(&session, report.iter().collect())?;

        if !report.is_empty() {
            for message in report.iter() {
                logger::error(message);
            }
            return Err(CliError::ValidationFailed(report.len()));
        }

        if args.submit {
            let job = session.submit().await?;
            logger::success(&format!("Job id: {}", job));
        }
        Ok::<(), CliError>(())
    })
}

fn print_state(session: &FormSession, errors: Vec<&str>) -> Result<(), CliError> {
    let visible: Vec<&FieldSpec> = session.visible_fields().collect();
    let options = visible
        .iter()
        .map(|field| (field.name.as_str(), session.options(&field.name)))
        .filter(|(_, options)| !options.is_empty())
        .collect();

    let state = FormState {
        plugin_id: session.plugin().id(),
        visible_fields: visible.iter().map(|field| field.name.as_str()).collect(),
        options,
        values: session.normalized_values(),
        errors,
    };
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert!(parse_assignment("alpha=0.05").is_ok_and(|(n, v)| n == "alpha" && v == "0.05"));
        assert!(parse_assignment("expr=a=b").is_ok_and(|(n, v)| n == "expr" && v == "a=b"));
        assert!(parse_assignment("cleared=").is_ok_and(|(_, v)| v.is_empty()));
        assert!(matches!(parse_assignment("novalue"), Err(CliError::InvalidAssignment(_))));
        assert!(matches!(parse_assignment("=x"), Err(CliError::InvalidAssignment(_))));
    }

    #[test]
    fn test_parse_field_value_by_kind() {
        let number = FieldSpec::new("alpha", FieldKind::Number);
        assert!(parse_field_value(&number, "0.05").is_ok_and(|v| v == FieldValue::Number(0.05)));
        assert!(matches!(parse_field_value(&number, "high"), Err(CliError::InvalidValue { .. })));

        let flag = FieldSpec::new("log2", FieldKind::Boolean);
        assert!(parse_field_value(&flag, "Yes").is_ok_and(|v| v == FieldValue::Bool(true)));
        assert!(parse_field_value(&flag, "maybe").is_err());

        let mut columns = FieldSpec::new("columns", FieldKind::ColumnSelector);
        columns.multiple = true;
        assert!(parse_field_value(&columns, "S1, S2,,S3").is_ok_and(|v| v == FieldValue::list(["S1", "S2", "S3"])));

        let text = FieldSpec::new("title", FieldKind::Text);
        assert!(parse_field_value(&text, "a, b").is_ok_and(|v| v == FieldValue::text("a, b")));
    }
}
