use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use studentdb::{JsonFileStore, RecordService};

/// studentdb CLI: manage a student document from the command line
#[derive(Parser)]
#[command(name = "studentdb", version, about)]
struct Cli {
    /// Path to the student document
    #[arg(long, env = "STUDENTDB_DATA_FILE", default_value = "students.json")]
    data_file: PathBuf,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty document if none exists
    Init,

    /// List all students
    List,

    /// Get a single student by ID
    Get {
        /// Student ID
        id: String,
    },

    /// Add a new student
    Add {
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Replace an existing student
    Update {
        /// Student ID
        id: String,
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a student
    Delete {
        /// Student ID
        id: String,
    },

    /// List students ordered by a field
    Sort {
        /// name, age or department
        #[arg(long = "by")]
        sort_by: String,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        order: String,
    },

    /// Check every stored student against the current rules
    Validate,
}

#[derive(clap::Args)]
struct PayloadArgs {
    /// Student as a JSON object
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,
    /// Read the student JSON object from a file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Field values (e.g. --field name="Alice Chen" --field age=20)
    #[arg(long = "field", value_parser = parse_key_value)]
    fields: Vec<(String, String)>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("Invalid key=value pair: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    log::debug!("Using student document {}", cli.data_file.display());
    let service = RecordService::new(JsonFileStore::new(&cli.data_file));

    match cli.command {
        Command::Init => {
            let created = JsonFileStore::new(&cli.data_file).create_if_missing()?;
            print_output(
                &serde_json::json!({
                    "created": created,
                    "path": cli.data_file.display().to_string(),
                }),
                &cli.format,
            )?;
        }

        Command::List => {
            print_output(&serde_json::to_value(service.list()?)?, &cli.format)?;
        }

        Command::Get { id } => {
            print_output(&serde_json::to_value(service.get(&id)?)?, &cli.format)?;
        }

        Command::Add { payload } => {
            let body = build_payload(&payload)?;
            service.create(&body)?;
            let id = body.get("id").cloned().unwrap_or_default();
            print_output(&serde_json::json!({ "ok": true, "id": id }), &cli.format)?;
        }

        Command::Update { id, payload } => {
            let body = build_payload(&payload)?;
            service.update(&id, &body)?;
            print_output(&serde_json::json!({ "ok": true, "id": id }), &cli.format)?;
        }

        Command::Delete { id } => {
            service.delete(&id)?;
            print_output(&serde_json::json!({ "ok": true, "deleted": id }), &cli.format)?;
        }

        Command::Sort { sort_by, order } => {
            let sorted = service.sort(&sort_by, &order)?;
            print_output(&serde_json::to_value(sorted)?, &cli.format)?;
        }

        Command::Validate => {
            let issues = service.validate_all()?;
            print_output(
                &serde_json::json!({ "total": service.count()?, "issues": issues }),
                &cli.format,
            )?;
        }
    }

    Ok(())
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

/// `--field` values for these keys are parsed as JSON numbers
const NUMERIC_FIELDS: &[&str] = &["age", "height", "weight"];

/// Merge `--json`/`--file` with `--field` overrides into one payload object.
fn build_payload(args: &PayloadArgs) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let base = match (&args.json, &args.file) {
        (Some(raw), _) => serde_json::from_str(raw)?,
        (None, Some(path)) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read payload file '{}': {e}", path.display()))?;
            serde_json::from_str(&raw)?
        }
        (None, None) => serde_json::Value::Object(serde_json::Map::new()),
    };

    let mut map = match base {
        serde_json::Value::Object(map) => map,
        _ => return Err("Payload must be a JSON object".into()),
    };
    for (key, val) in &args.fields {
        let json_val = if NUMERIC_FIELDS.contains(&key.as_str()) {
            serde_json::from_str(val).unwrap_or_else(|_| serde_json::Value::String(val.clone()))
        } else {
            serde_json::Value::String(val.clone())
        };
        map.insert(key.clone(), json_val);
    }
    Ok(serde_json::Value::Object(map))
}
