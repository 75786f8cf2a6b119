//! Formexport CLI - edit and export form export definitions
//!
//! ```bash
//! formexport serve --seed seed.json          # In-memory dev REST server (port 3000)
//! formexport show --definition <id>          # Print an editor state
//! formexport apply --script edits.json       # Apply editor commands, then save
//! formexport export --definition def.json --records rows.json
//! ```
//!
//! Endpoints come from `FORMEXPORT_*` environment variables (a `.env` file is
//! read when present) or `--base-url`.

use clap::{Parser, Subcommand};
use formexport::server::{start_server, DevStore};
use formexport::{
    export_to_path, export_to_string, EditorCommand, EditorConfig, EditorMode, EditorSession,
    EditorState, ExportDefinitionPayload, ExportDefinitionResource, HttpDefinitionSync,
    DEFAULT_EXPORTER,
};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "formexport")]
#[command(
    about = "Edit export definitions mapping form fields to export columns",
    long_about = None
)]
struct Cli {
    /// Backend base URL (overrides FORMEXPORT_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the in-memory dev REST server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// JSON file with initial forms and definitions
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Load a definition and print the editor state
    Show {
        /// Definition identifier (omit for a new definition)
        #[arg(short, long)]
        definition: Option<String>,
    },

    /// Apply a script of editor commands and save the result
    Apply {
        /// Definition identifier (omit to create a new definition)
        #[arg(short, long)]
        definition: Option<String>,

        /// JSON array of editor commands
        #[arg(short, long)]
        script: PathBuf,

        /// Print the result without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Export submission records to CSV through a stored definition
    Export {
        /// Definition JSON file (as returned by the backend)
        #[arg(short, long)]
        definition: PathBuf,

        /// JSON array of submission records
        #[arg(short, long)]
        records: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, seed } => cmd_serve(port, seed.as_deref()).await,

        Commands::Show { definition } => cmd_show(cli.base_url.as_deref(), definition).await,

        Commands::Apply {
            definition,
            script,
            dry_run,
        } => cmd_apply(cli.base_url.as_deref(), definition, &script, dry_run).await,

        Commands::Export {
            definition,
            records,
            output,
        } => cmd_export(&definition, &records, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: u16, seed: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let store = match seed {
        Some(path) => DevStore::load(path)?,
        None => DevStore::default(),
    };
    start_server(port, store).await
}

async fn open_session(
    base_url: Option<&str>,
    definition: Option<String>,
) -> Result<EditorSession<HttpDefinitionSync>, Box<dyn std::error::Error>> {
    let config = EditorConfig::from_env_with_base(base_url)?;
    let sync = HttpDefinitionSync::new(config);
    let mut session = EditorSession::new(sync, EditorMode::from_identifier(definition));
    session.load().await?;
    Ok(session)
}

async fn cmd_show(
    base_url: Option<&str>,
    definition: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(base_url, definition).await?;
    if let Some(state) = session.state() {
        println!("{}", serde_json::to_string_pretty(&state_summary(state))?);
    }
    Ok(())
}

async fn cmd_apply(
    base_url: Option<&str>,
    definition: Option<String>,
    script: &Path,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(script)?;
    let commands: Vec<EditorCommand> = serde_json::from_str(&content)?;

    let mut session = open_session(base_url, definition).await?;
    eprintln!("📝 Applying {} command(s)", commands.len());
    for command in commands {
        session.dispatch(command)?;
    }

    if dry_run {
        if let Some(state) = session.state() {
            println!("{}", serde_json::to_string_pretty(&state_summary(state))?);
        }
        return Ok(());
    }

    session.save().await?;
    if let Some(state) = session.state() {
        println!("{}", serde_json::to_string_pretty(&state_summary(state))?);
    }
    Ok(())
}

fn cmd_export(
    definition: &Path,
    records: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let resource: ExportDefinitionResource =
        serde_json::from_str(&fs::read_to_string(definition)?)?;
    let records: Vec<Value> = serde_json::from_str(&fs::read_to_string(records)?)?;

    let payload = ExportDefinitionPayload {
        label: resource.label,
        exporter: resource
            .exporter
            .unwrap_or_else(|| DEFAULT_EXPORTER.to_string()),
        definition: resource.definition,
    };

    match output {
        Some(path) => {
            let rows = export_to_path(path, &payload, &records)?;
            eprintln!("💾 {} row(s) written to: {}", rows, path.display());
        }
        None => print!("{}", export_to_string(&payload, &records)?),
    }
    Ok(())
}

fn state_summary(state: &EditorState) -> Value {
    json!({
        "draft": state.draft(),
        "exporterTypes": state.exporter_types(),
        "selectedForm": state.selected_form(),
        "compatibleForms": state.compatible_forms(),
        "availableFields": state.available_fields(),
        "hint": state.form_selection_hint(),
    })
}
