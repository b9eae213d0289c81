mod prompt;

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use form_schema_core::{FormSchema, FormValues, validate_schema};
use form_schema_registry::{
    BASE_URL_ENV, ClientConfig, FormCatalog, FormRecord, NewForm, RegistryClient, TOKEN_ENV,
    read_form_file,
};
use form_schema_render::{FormSession, RequiredPolicy, render_html};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::prompt::{FieldPrompter, TerminalPrompter, fill_all, fill_labels};

/// CLI-specific required-field policy with clap argument parsing support.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum CliPolicy {
    /// Empty text, unchecked boxes and absent values count as missing.
    #[default]
    Falsy,
    /// Only values that cannot satisfy the field's kind count as missing.
    TypeAware,
}

impl From<CliPolicy> for RequiredPolicy {
    fn from(policy: CliPolicy) -> Self {
        match policy {
            CliPolicy::Falsy => Self::Falsy,
            CliPolicy::TypeAware => Self::TypeAware,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "formctl")]
#[command(about = "Validate, render, fill and exchange dynamic form schemas")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Form registry base URL.
    #[arg(long, global = true, env = BASE_URL_ENV)]
    registry_url: Option<String>,
    /// Bearer token for the form registry.
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,
    /// Registry client configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one or more form files.
    Validate(ValidateArgs),
    /// Render a form as HTML.
    Render(RenderArgs),
    /// Fill a form interactively in the terminal.
    Fill(FillArgs),
    /// Fetch a form from the registry.
    Fetch(FetchArgs),
    /// List forms stored in the registry.
    List(ListArgs),
    /// Store a form in the registry, or replace an existing one.
    Publish(PublishArgs),
    /// Deactivate a form in the registry.
    Delete(DeleteArgs),
    /// Check values against a registry form and submit them.
    Submit(SubmitArgs),
    /// List submissions received for a form.
    Submissions(SubmissionsArgs),
}

/// Where a form comes from: a file, a local catalog, or the registry.
#[derive(Debug, Args)]
struct FormSourceArgs {
    /// Form file: a bare schema or a registry record.
    #[arg(required_unless_present_any = ["catalog", "form_id", "context"])]
    form: Option<PathBuf>,
    /// Directory of form files, or a bundle file, to look the form up in.
    #[arg(long, requires = "context", conflicts_with = "form")]
    catalog: Option<PathBuf>,
    /// Context of the form in the catalog or registry.
    #[arg(long)]
    context: Option<String>,
    /// Registry id of the form.
    #[arg(long, conflicts_with_all = ["form", "catalog"])]
    form_id: Option<i64>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Form files and/or directories containing form JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    source: FormSourceArgs,
    /// Values JSON file to prefill the form with.
    #[arg(long)]
    values: Option<PathBuf>,
    /// Caption of the submit control.
    #[arg(long)]
    submit_label: Option<String>,
    /// Output HTML path (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FillArgs {
    #[command(flatten)]
    source: FormSourceArgs,
    /// How required fields are judged missing.
    #[arg(long, value_enum, default_value_t)]
    policy: CliPolicy,
    /// Post the values to the registry after filling.
    #[arg(long)]
    submit: bool,
    /// Write the submitted values JSON here (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FetchArgs {
    /// Registry id of the form.
    #[arg(long, required_unless_present = "context", conflicts_with = "context")]
    id: Option<i64>,
    /// Context the form is registered for.
    #[arg(long)]
    context: Option<String>,
    /// Print the full registry record instead of the decoded schema.
    #[arg(long)]
    record: bool,
    /// Output JSON path (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Only list forms registered for this context.
    #[arg(long)]
    context: Option<String>,
}

#[derive(Debug, Args)]
struct PublishArgs {
    /// Form file: a bare schema or a registry record.
    form: PathBuf,
    /// Context to register the form for.
    #[arg(long)]
    context: Option<String>,
    /// Replace the form with this id instead of creating a new one.
    #[arg(long)]
    id: Option<i64>,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Registry id of the form.
    #[arg(long)]
    form_id: i64,
}

#[derive(Debug, Args)]
struct SubmitArgs {
    /// Registry id of the form.
    #[arg(long)]
    form_id: i64,
    /// Values JSON file.
    #[arg(long)]
    values: PathBuf,
    /// How required fields are judged missing.
    #[arg(long, value_enum, default_value_t)]
    policy: CliPolicy,
}

#[derive(Debug, Args)]
struct SubmissionsArgs {
    /// Registry id of the form.
    #[arg(long)]
    form_id: i64,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = &cli.global;
    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Render(args) => run_render(args, global),
        Command::Fill(args) => run_fill(args, global),
        Command::Fetch(args) => run_fetch(args, global),
        Command::List(args) => run_list(args, global),
        Command::Publish(args) => run_publish(args, global),
        Command::Delete(args) => run_delete(args, global),
        Command::Submit(args) => run_submit(args, global),
        Command::Submissions(args) => run_submissions(args, global),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let paths = collect_form_paths(&args.inputs)?;
    if paths.is_empty() {
        return Err("No form JSON files found in the given inputs".to_string());
    }

    let mut failed = 0usize;
    for path in &paths {
        match load_schema_file(path) {
            Ok(schema) => {
                let errors = validate_schema(&schema);
                if errors.is_empty() {
                    println!("ok: {} ({} field(s))", path.display(), schema.fields.len());
                } else {
                    failed += 1;
                    for err in errors {
                        eprintln!("{}: {err}", path.display());
                    }
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("{err}");
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{failed} of {} form file(s) failed validation",
            paths.len()
        ));
    }
    println!("Validated {} form file(s).", paths.len());
    Ok(())
}

fn run_render(args: RenderArgs, global: &GlobalArgs) -> Result<(), String> {
    let record = load_form(&args.source, global)?;
    let mut session = checked_session(&record)?;
    if let Some(label) = args.submit_label {
        session = session.with_submit_label(label);
    }
    if let Some(path) = &args.values {
        prefill(&mut session, &read_values(path)?)?;
    }

    let html = render_html(&session);
    write_output(args.output.as_deref(), &html)
}

fn run_fill(args: FillArgs, global: &GlobalArgs) -> Result<(), String> {
    let record = load_form(&args.source, global)?;
    let target = match (args.submit, record.id) {
        (true, Some(id)) => Some((registry_client(global)?, id)),
        (true, None) => {
            return Err("--submit needs a form stored in the registry (use --form-id)".to_string());
        }
        (false, _) => None,
    };

    let mut session = checked_session(&record)?.with_policy(args.policy.into());
    let mut prompter = TerminalPrompter::new();
    println!("{}", record.display_title());
    fill_all(&mut session, &mut prompter)?;
    let values = submit_interactively(&mut session, &mut prompter)?;

    if let Some((client, id)) = target {
        let stored = block_on(client.submit(id, &values))?.map_err(|err| err.to_string())?;
        println!(
            "Submitted {} value(s) to form {id} (submission {}).",
            values.len(),
            stored.id.map_or_else(|| "?".to_string(), |id| id.to_string())
        );
    }

    let json = serde_json::to_string_pretty(&values)
        .map_err(|err| format!("Failed to serialize values: {err}"))?;
    write_output(args.output.as_deref(), &json)
}

/// Submits the session, asking again for missing required fields until the
/// user fills them or gives up.
fn submit_interactively<P: FieldPrompter>(
    session: &mut FormSession,
    prompter: &mut P,
) -> Result<FormValues, String> {
    loop {
        let mut submitted = None;
        match session.submit(|values| submitted = Some(values)) {
            Ok(()) => return submitted.ok_or_else(|| "Form produced no values".to_string()),
            Err(missing) => {
                prompter.warn(&missing.to_string());
                let retry = prompter
                    .confirm("Fill in the missing fields now?", true)
                    .map_err(|err| format!("Prompt failed: {err}"))?;
                if !retry {
                    return Err(missing.to_string());
                }
                fill_labels(session, &missing.labels, prompter)?;
            }
        }
    }
}

fn run_fetch(args: FetchArgs, global: &GlobalArgs) -> Result<(), String> {
    let client = registry_client(global)?;
    let record = match (args.id, args.context.as_deref()) {
        (Some(id), _) => block_on(client.get_form(id))?.map_err(|err| err.to_string())?,
        (None, Some(context)) => block_on(client.get_form_by_context(context))?
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("No form registered for context '{context}'"))?,
        (None, None) => return Err("Specify --id or --context".to_string()),
    };

    let json = if args.record {
        serde_json::to_string_pretty(&record)
    } else {
        let schema = record
            .schema()
            .map_err(|err| format!("Form {:?} has an invalid schema: {err}", record.id))?;
        serde_json::to_string_pretty(&schema)
    }
    .map_err(|err| format!("Failed to serialize form: {err}"))?;
    write_output(args.output.as_deref(), &json)
}

fn run_list(args: ListArgs, global: &GlobalArgs) -> Result<(), String> {
    let client = registry_client(global)?;
    let forms = block_on(client.list_forms(args.context.as_deref()))?
        .map_err(|err| err.to_string())?;

    if forms.is_empty() {
        println!("No forms found.");
        return Ok(());
    }
    println!("{:>6}  {:<20}  TITLE", "ID", "CONTEXT");
    for form in &forms {
        println!(
            "{:>6}  {:<20}  {}",
            form.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            form.context.as_deref().unwrap_or("-"),
            form.display_title()
        );
    }
    Ok(())
}

fn run_publish(args: PublishArgs, global: &GlobalArgs) -> Result<(), String> {
    let record = read_form_file(&args.form)
        .map_err(|err| format!("Failed to read '{}': {err}", args.form.display()))?;
    let schema = checked_session(&record)?.schema().clone();
    let context = args.context.as_deref().or(record.context.as_deref());
    let body = NewForm::from_schema(&schema, context)
        .map_err(|err| format!("Failed to encode schema: {err}"))?;

    let client = registry_client(global)?;
    let stored = match args.id {
        Some(id) => block_on(client.update_form(id, &body))?,
        None => block_on(client.create_form(&body))?,
    }
    .map_err(|err| err.to_string())?;

    println!(
        "Published '{}' as form {}.",
        stored.display_title(),
        stored.id.map_or_else(|| "?".to_string(), |id| id.to_string())
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalArgs) -> Result<(), String> {
    let client = registry_client(global)?;
    block_on(client.delete_form(args.form_id))?.map_err(|err| err.to_string())?;
    println!("Deactivated form {}.", args.form_id);
    Ok(())
}

fn run_submit(args: SubmitArgs, global: &GlobalArgs) -> Result<(), String> {
    let client = registry_client(global)?;
    let values = read_values(&args.values)?;
    let record = block_on(client.get_form(args.form_id))?.map_err(|err| err.to_string())?;

    let mut session = checked_session(&record)?.with_policy(args.policy.into());
    prefill(&mut session, &values)?;
    let mut submitted = None;
    session
        .submit(|values| submitted = Some(values))
        .map_err(|missing| missing.to_string())?;
    let values = submitted.ok_or_else(|| "Form produced no values".to_string())?;

    let stored = block_on(client.submit(args.form_id, &values))?.map_err(|err| err.to_string())?;
    println!(
        "Submitted {} value(s) to form {} (submission {}).",
        values.len(),
        args.form_id,
        stored.id.map_or_else(|| "?".to_string(), |id| id.to_string())
    );
    Ok(())
}

fn run_submissions(args: SubmissionsArgs, global: &GlobalArgs) -> Result<(), String> {
    let client = registry_client(global)?;
    let submissions =
        block_on(client.list_submissions(args.form_id))?.map_err(|err| err.to_string())?;

    if submissions.is_empty() {
        println!("No submissions for form {}.", args.form_id);
        return Ok(());
    }
    for submission in &submissions {
        let when = submission
            .submitted_at
            .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
        let data = match submission.values() {
            Ok(values) => values.to_json_string().unwrap_or_else(|_| submission.submission_data.clone()),
            Err(err) => {
                debug!(id = ?submission.id, %err, "submission data is not a values object");
                submission.submission_data.clone()
            }
        };
        println!(
            "{:>6}  {when}  {data}",
            submission.id.map_or_else(|| "-".to_string(), |id| id.to_string())
        );
    }
    Ok(())
}

/// Resolves a form from a file, a local catalog or the registry.
fn load_form(source: &FormSourceArgs, global: &GlobalArgs) -> Result<FormRecord, String> {
    if let Some(path) = &source.form {
        return read_form_file(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()));
    }

    if let Some(dir) = &source.catalog {
        let context = source
            .context
            .as_deref()
            .ok_or_else(|| "--catalog needs --context".to_string())?;
        let catalog = if dir.is_dir() {
            FormCatalog::from_dir(dir)
        } else {
            FormCatalog::from_bundle(dir)
        }
        .map_err(|err| format!("Failed to load catalog '{}': {err}", dir.display()))?;
        info!(forms = catalog.len(), "catalog loaded");
        return catalog
            .by_context(context)
            .cloned()
            .ok_or_else(|| format!("No form for context '{context}' in '{}'", dir.display()));
    }

    let client = registry_client(global)?;
    match (source.form_id, source.context.as_deref()) {
        (Some(id), _) => block_on(client.get_form(id))?.map_err(|err| err.to_string()),
        (None, Some(context)) => block_on(client.get_form_by_context(context))?
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("No form registered for context '{context}'")),
        (None, None) => Err("Specify a form file, --catalog with --context, or --form-id".to_string()),
    }
}

/// Decodes the record's schema and rejects structurally invalid schemas.
fn checked_session(record: &FormRecord) -> Result<FormSession, String> {
    let schema = record
        .schema()
        .map_err(|err| format!("Invalid schema JSON: {err}"))?;
    FormSession::checked(schema).map_err(|errors| {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        format!("Invalid schema:\n  {}", lines.join("\n  "))
    })
}

fn prefill(session: &mut FormSession, values: &FormValues) -> Result<(), String> {
    for (id, value) in values.iter() {
        session
            .set_value(id, value.clone())
            .map_err(|err| format!("Invalid value for '{id}': {err}"))?;
    }
    Ok(())
}

fn read_values(path: &Path) -> Result<FormValues, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    FormValues::from_json(&text)
        .map_err(|err| format!("Failed to parse values '{}': {err}", path.display()))
}

fn load_schema_file(path: &Path) -> Result<FormSchema, String> {
    let record = read_form_file(path)
        .map_err(|err| format!("{}: failed to read form: {err}", path.display()))?;
    record
        .schema()
        .map_err(|err| format!("{}: invalid schema JSON: {err}", path.display()))
}

fn collect_form_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input)
                .map_err(|err| format!("Failed to read directory '{}': {err}", input.display()))?;
            let mut found: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn registry_client(global: &GlobalArgs) -> Result<RegistryClient, String> {
    let config = match &global.config {
        Some(path) => ClientConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ClientConfig::default(),
    };
    let config = config.with_overrides(global.registry_url.clone(), global.token.clone());
    debug!(base_url = %config.base_url, "registry client configured");
    RegistryClient::new(&config).map_err(|err| err.to_string())
}

fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to start async runtime: {err}"))?;
    Ok(runtime.block_on(future))
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), String> {
    match path {
        Some(path) => fs::write(path, format!("{content}\n"))
            .map_err(|err| format!("Failed to write '{}': {err}", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
