//! Command dispatch and handlers

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::rc::Rc;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::registry::PathRegistry;
use crate::scope::ReactiveScope;
use crate::template::Template;
use crate::value::Value;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Render {
            template,
            data,
            set,
            base_key,
        }) => _render(template, data.as_deref(), set, base_key.as_deref()),
        Some(Commands::Paths {
            template,
            base_key,
            tree,
        }) => _paths(template, base_key.as_deref(), *tree),
        Some(Commands::Config { command }) => _config(command),
        Some(Commands::Completion { shell }) => {
            _completion(*shell);
            Ok(())
        }
        None => Ok(()),
    }
}

#[instrument]
fn _render(
    template_path: &Path,
    data_path: Option<&Path>,
    assignments: &[String],
    base_key: Option<&str>,
) -> CliResult<()> {
    let settings = Settings::load()?;
    let base_key = base_key.unwrap_or(settings.base_key.as_str());
    let text = read_file(template_path)?;

    // Discovery first: every referenced path must be registered before the
    // scope is constructed, otherwise nothing gets instrumented.
    let registry = Rc::new(PathRegistry::new());
    let template = Template::parse(&registry, base_key, &text, &settings.placeholder)?;
    debug!(references = template.reference_count(), "scanned");

    let data = match data_path {
        Some(path) => load_data(path)?,
        None => BTreeMap::new(),
    };
    let scope = ReactiveScope::new(Rc::clone(&registry), data, base_key)?;
    output::info(&template.render());

    if !assignments.is_empty() {
        for assignment in assignments {
            let (path, value) = parse_assignment(assignment)?;
            apply_assignment(&scope, &path, value)?;
            debug!(%assignment, "applied");
        }
        output::header("after assignments:");
        output::info(&template.render());
    }
    Ok(())
}

#[instrument]
fn _paths(template_path: &Path, base_key: Option<&str>, tree: bool) -> CliResult<()> {
    let settings = Settings::load()?;
    let base_key = base_key.unwrap_or(settings.base_key.as_str());
    let text = read_file(template_path)?;

    let registry = Rc::new(PathRegistry::new());
    let template = Template::parse(&registry, base_key, &text, &settings.placeholder)?;

    if tree {
        for root in registry.display_forest() {
            print!("{}", root);
        }
    } else {
        for path in template.paths() {
            output::info(&path);
        }
    }
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::detail("no config directory available"),
        },
        ConfigCommands::Init => {
            output::info(&Settings::template());
        }
    }
    Ok(())
}

fn _completion(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn read_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a TOML data file into a bindable property map.
fn load_data(path: &Path) -> CliResult<BTreeMap<String, Value>> {
    let text = read_file(path)?;
    let parsed: toml::Value = toml::from_str(&text).map_err(|e| CliError::DataFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let value = Value::from_toml(parsed, "").map_err(|e| CliError::DataFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::DataFormat {
            path: path.to_path_buf(),
            message: "top level must be a table".to_string(),
        }),
    }
}

/// Split `path=value`, parsing the value as bool, integer, float, or string.
/// The path must satisfy the key grammar; a malformed one fails here, at the
/// point it was supplied.
fn parse_assignment(assignment: &str) -> CliResult<(String, Value)> {
    let (path, raw) = assignment.split_once('=').ok_or_else(|| {
        CliError::InvalidArgs(format!("expected PATH=VALUE, got {assignment:?}"))
    })?;
    crate::key::validate(path)?;
    Ok((path.to_string(), parse_scalar(raw)))
}

fn parse_scalar(raw: &str) -> Value {
    if let Ok(b) = raw.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(x) = raw.parse::<f64>() {
        return Value::Float(x);
    }
    Value::from(raw)
}

/// Walk `a.b.c` relative to `scope` and assign the final segment through the
/// nested scope accessors.
fn apply_assignment(scope: &Rc<ReactiveScope>, path: &str, value: Value) -> CliResult<()> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments
        .pop()
        .expect("validated path has at least one segment");

    let mut current = Rc::clone(scope);
    for segment in segments {
        current = current.child(segment).ok_or_else(|| {
            CliError::InvalidArgs(format!(
                "{path}: {segment:?} is not a bound nested object"
            ))
        })?;
    }
    current.set(last, value);
    Ok(())
}
