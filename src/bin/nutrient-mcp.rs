//! CLI binary for the Nutrient MCP server.
//!
//! Usage: nutrient-mcp serve

#[cfg(feature = "cli")]
mod cli {
    use clap::{Parser, Subcommand};
    use nutrient_mcp::aliases::{
        normalize_tool_key, normalize_toolbar_item, TOOLBAR_ALIASES, TOOL_KEY_ALIASES,
    };
    use nutrient_mcp::channel::tool_output_channel;
    use nutrient_mcp::intent::{emit_select_tool_intent, emit_toolbar_intent};
    use nutrient_mcp::viewer::mode_binding;
    use nutrient_mcp::{Config, InMemoryViewer, ToolbarAction, Viewer, ViewerError, WidgetSession, WidgetSet};
    use serde_json::{json, Value};
    use std::io::{BufRead, BufReader};
    use std::path::PathBuf;
    use tracing_subscriber::EnvFilter;

    #[derive(Parser)]
    #[command(name = "nutrient-mcp", about = "MCP server for the Nutrient web viewer", version)]
    struct Cli {
        /// App origin (overrides NUTRIENT_MCP_BASE_URL)
        #[arg(long, global = true)]
        base_url: Option<String>,

        /// Output format
        #[arg(long, global = true, default_value = "table")]
        output: OutputFormat,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Clone, Copy, clap::ValueEnum)]
    enum OutputFormat {
        Table,
        Json,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Start MCP server (stdio)
        Serve,
        /// List the alias tables
        Aliases {
            /// Show interaction-mode aliases instead of toolbar item aliases
            #[arg(long)]
            modes: bool,
        },
        /// Normalize free-form tool names
        Normalize {
            /// Names to normalize
            names: Vec<String>,
            /// Use the interaction-mode vocabulary
            #[arg(long)]
            modes: bool,
        },
        /// Print the toolbar intent a customize_toolbar call would emit
        Toolbar {
            /// remove, keep_only, add, reset or get
            action: String,
            /// Tool names or aliases
            tools: Vec<String>,
        },
        /// Print the intent a select_tool call would emit
        Select {
            /// Tool name or alias
            tool: String,
            /// Deactivate the tool after one use
            #[arg(long)]
            no_keep: bool,
        },
        /// Replay tool outputs (one JSON object per line) against an in-memory viewer
        Simulate {
            /// Input file (defaults to stdin)
            #[arg(short, long)]
            file: Option<PathBuf>,
            /// Emulate a build without add-on license components
            #[arg(long)]
            unlicensed: bool,
        },
    }

    fn init_logging() {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("nutrient_mcp=info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    fn make_config(base_url: Option<String>) -> nutrient_mcp::error::Result<Config> {
        let config = Config::from_env()?;
        match base_url {
            Some(url) => config.with_base_url(url),
            None => Ok(config),
        }
    }

    fn print_pairs_table(header: [&str; 2], rows: &[(String, String)]) {
        use comfy_table::{ContentArrangement, Table};

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(header.to_vec());
        for (left, right) in rows {
            table.add_row(vec![left, right]);
        }
        println!("{table}");
    }

    fn print_value(value: &Value) -> nutrient_mcp::error::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// The tool output a line stands for: `structuredContent` of a full tool
    /// result, or the line itself.
    fn tool_output_of(line: Value) -> Value {
        match line.get("structuredContent") {
            Some(sc) => sc.clone(),
            None => line,
        }
    }

    fn simulate(
        reader: Box<dyn BufRead>,
        unlicensed: bool,
        output: OutputFormat,
    ) -> nutrient_mcp::error::Result<()> {
        let (host, widget) = tool_output_channel();
        let mut session = WidgetSession::new(widget);
        let viewer = if unlicensed {
            InMemoryViewer::new().without_licensed_modes()
        } else {
            InMemoryViewer::new()
        };
        session.load_document("simulated.pdf", || Ok(viewer))?;

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line)?;
            host.publish(tool_output_of(value));
            session.poll_toolbar();
            session.poll_select_tool();
        }

        let viewer = session
            .viewer()
            .ok_or_else(|| ViewerError::NotReady("No document loaded".into()))?;
        let mode = viewer.interaction_mode().map(|m| m.sdk_name().to_string());

        match output {
            OutputFormat::Json => print_value(&json!({
                "toolbar": viewer.toolbar_items(),
                "interactionMode": mode,
                "keepSelectedTool": viewer.keep_selected_tool(),
            }))?,
            OutputFormat::Table => {
                let rows: Vec<(String, String)> = viewer
                    .toolbar_items()
                    .into_iter()
                    .map(|i| (i.item_type, if i.selected { "yes".into() } else { String::new() }))
                    .collect();
                print_pairs_table(["Toolbar item", "Selected"], &rows);
                println!("Interaction mode: {}", mode.as_deref().unwrap_or("(none)"));
                println!("Keep selected tool: {}", viewer.keep_selected_tool());
            }
        }
        Ok(())
    }

    pub async fn run() -> nutrient_mcp::error::Result<()> {
        let cli = Cli::parse();
        init_logging();

        match cli.command {
            Commands::Serve => {
                let config = make_config(cli.base_url)?;
                let widgets = WidgetSet::load(&config).await;
                nutrient_mcp::mcp::run_server(widgets).await?;
            }

            Commands::Aliases { modes } => {
                let table = if modes { TOOL_KEY_ALIASES } else { TOOLBAR_ALIASES };
                match cli.output {
                    OutputFormat::Json => {
                        let map: serde_json::Map<String, Value> = table
                            .iter()
                            .map(|(alias, canonical)| (alias.to_string(), json!(canonical)))
                            .collect();
                        print_value(&Value::Object(map))?;
                    }
                    OutputFormat::Table => {
                        let rows: Vec<(String, String)> = table
                            .iter()
                            .map(|(alias, canonical)| {
                                let target = match mode_binding(canonical) {
                                    Some(b) if modes => format!("{} ({})", canonical, b.mode),
                                    _ => canonical.to_string(),
                                };
                                (alias.to_string(), target)
                            })
                            .collect();
                        print_pairs_table(["Alias", "Canonical"], &rows);
                    }
                }
            }

            Commands::Normalize { names, modes } => {
                let rows: Vec<(String, String)> = names
                    .iter()
                    .map(|n| {
                        let canonical = if modes {
                            normalize_tool_key(n)
                        } else {
                            normalize_toolbar_item(n)
                        };
                        (n.clone(), canonical)
                    })
                    .collect();
                match cli.output {
                    OutputFormat::Json => print_value(&json!(rows
                        .iter()
                        .map(|(raw, canonical)| json!({ "input": raw, "canonical": canonical }))
                        .collect::<Vec<_>>()))?,
                    OutputFormat::Table => print_pairs_table(["Input", "Canonical"], &rows),
                }
            }

            Commands::Toolbar { action, tools } => {
                let action = ToolbarAction::from_str_loose(&action).ok_or_else(|| {
                    ViewerError::InvalidArguments(format!("unknown toolbar action: {}", action))
                })?;
                let intent = emit_toolbar_intent(action, &tools);
                print_value(&json!({ "toolbar": intent }))?;
            }

            Commands::Select { tool, no_keep } => {
                let intent = emit_select_tool_intent(&tool, Some(!no_keep));
                print_value(&json!({ "selectTool": intent }))?;
            }

            Commands::Simulate { file, unlicensed } => {
                let reader: Box<dyn BufRead> = match file {
                    Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
                    None => Box::new(BufReader::new(std::io::stdin())),
                };
                simulate(reader, unlicensed, cli.output)?;
            }
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary requires the 'cli' feature. Build with: cargo build --features cli");
    std::process::exit(1);
}
