// Command-line interface for panedit
//
// This binary drives the panedit document model from the shell: it reads a document through
// pandoc (or straight from Pandoc JSON), maps it onto the editable tree, and writes it back.
// It is mostly a development and verification tool for the round trip: whatever the editor
// would load and save, this binary loads and saves the same way.
//
// Usage:
//  panedit convert <input> [--from <format>] [--to <format>] [-o <file>] [--normalize]
//  panedit inspect <input> [<transform>] [--from <format>]   - Show a view (defaults to "doc-treeviz")
//  panedit commands                                          - List editor commands and key bindings
//  panedit --list-transforms                                 - List available inspect transforms
//
// Formats are pandoc format names. "json" means Pandoc JSON and never invokes pandoc. The source
// format is detected from the file extension when --from is not given, falling back to the
// configured default.
//
// Configuration is layered: built-in defaults, then panedit.toml in the working directory if
// present, then the file passed with --config. Logs go to stderr and are filtered with RUST_LOG.

mod transforms;

use clap::{Arg, ArgAction, Command, ValueHint};
use panedit_config::{Loader, PaneditConfig};
use panedit_core::pandoc::{from_json, to_json};
use panedit_core::{
    read_document, ConstructRegistry, ConversionService, Converter, Editor, FormatOptions, Node,
    PandocAst, PandocProcess, WriterOptions,
};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

const JSON_FORMAT: &str = "json";

fn build_cli() -> Command {
    Command::new("panedit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Round-trip Pandoc documents through the panedit document model")
        .long_about(
            "panedit loads documents the way the editor does and writes them back.\n\n\
            Commands:\n  \
            - convert:  Read a document and write it in another (or the same) format\n  \
            - inspect:  View the document or interchange tree\n  \
            - commands: List the editor commands and their key bindings\n\n\
            Examples:\n  \
            panedit convert notes.md --to json          # Pandoc JSON on stdout\n  \
            panedit convert notes.json --to markdown    # Render through pandoc\n  \
            panedit inspect notes.md                    # Document tree visualization",
        )
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a panedit.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available inspect transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Read a document and write it back")
                .long_about(
                    "Read a document into the editable tree and write it back out.\n\n\
                    Without --normalize the tree is written exactly as read, so converting\n\
                    Pandoc JSON to JSON reproduces the input. With --normalize the editor's\n\
                    maintenance pass runs first (footnote numbering, example list numbering,\n\
                    trailing paragraphs).\n\n\
                    Examples:\n  \
                    panedit convert in.md --to json -o out.json\n  \
                    panedit convert in.json --to gfm --normalize",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (detected from the file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (defaults to the configured format)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("normalize")
                        .long("normalize")
                        .help("Run the editor's maintenance pass before writing")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect the document or interchange tree")
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("View to print. Defaults to 'doc-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (detected from the file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(Command::new("commands").about("List editor commands and key bindings"))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn main() {
    init_tracing();
    let matches = build_cli().get_matches();

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let registry = Arc::new(ConstructRegistry::with_defaults().unwrap_or_else(|e| fail(e)));

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let from = source_format(input, sub_matches.get_one::<String>("from"), &config);
            let to = sub_matches
                .get_one::<String>("to")
                .cloned()
                .unwrap_or_else(|| config.conversion.format.clone());
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            let normalize = sub_matches.get_flag("normalize");
            handle_convert_command(&registry, &config, input, &from, &to, output, normalize);
        }
        Some(("inspect", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let from = source_format(input, sub_matches.get_one::<String>("from"), &config);
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            handle_inspect_command(&registry, &config, input, &from, transform);
        }
        Some(("commands", _)) => handle_commands_command(&registry),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> PaneditConfig {
    let loader = Loader::new().with_optional_file("panedit.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// `--from`, else the format implied by the extension, else the configured default.
fn source_format(input: &str, explicit: Option<&String>, config: &PaneditConfig) -> String {
    if let Some(format) = explicit {
        return format.clone();
    }
    match Path::new(input).extension().and_then(|e| e.to_str()) {
        Some("json") => JSON_FORMAT.to_string(),
        Some("md") | Some("markdown") => "markdown".to_string(),
        _ => config.conversion.format.clone(),
    }
}

fn pandoc(config: &PaneditConfig) -> PandocProcess {
    match config.conversion.pandoc_path() {
        Some(path) => PandocProcess::new(path),
        // A missing pandoc only matters once a non-JSON format needs it.
        None => PandocProcess::locate().unwrap_or_else(|_| PandocProcess::new("pandoc")),
    }
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| fail(format!("failed to start the async runtime: {e}")))
}

/// Load the interchange tree for `input`, going through pandoc unless it is JSON.
fn load_interchange(
    runtime: &Runtime,
    service: &PandocProcess,
    config: &PaneditConfig,
    input: &str,
    from: &str,
) -> PandocAst {
    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });
    if from == JSON_FORMAT {
        return from_json(&source).unwrap_or_else(|e| fail(e));
    }
    let options = FormatOptions {
        format: from.to_string(),
        ..FormatOptions::from(&config.conversion)
    };
    tracing::debug!(format = from, input, "reading through pandoc");
    runtime
        .block_on(service.interchange_from_text(&source, &options))
        .unwrap_or_else(|e| fail(e))
}

fn handle_convert_command(
    registry: &Arc<ConstructRegistry>,
    config: &PaneditConfig,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    normalize: bool,
) {
    let runtime = runtime();
    let service = pandoc(config);
    let ast = load_interchange(&runtime, &service, config, input, from);

    let converter = Converter::new(service, registry.clone())
        .with_format(FormatOptions {
            format: to.to_string(),
            ..FormatOptions::from(&config.conversion)
        })
        .with_writer_options(WriterOptions::from(&config.writer));
    let doc = converter.read_interchange(&ast).unwrap_or_else(|e| fail(e));
    let doc = if normalize {
        normalized(registry, doc, &ast)
    } else {
        doc
    };

    let text = if to == JSON_FORMAT {
        let written = converter.write_interchange(&doc).unwrap_or_else(|e| fail(e));
        let json = to_json(&written).unwrap_or_else(|e| fail(e));
        format!("{json}\n")
    } else {
        runtime
            .block_on(converter.write(&doc))
            .unwrap_or_else(|e| fail(e))
            .unwrap_or_else(|| fail("the write was superseded"))
    };

    match output {
        Some(path) => fs::write(path, text).unwrap_or_else(|e| {
            eprintln!("Error writing file '{path}': {e}");
            std::process::exit(1);
        }),
        None => print!("{text}"),
    }
}

/// Run the editor's load-time maintenance over `doc`.
fn normalized(registry: &Arc<ConstructRegistry>, doc: Node, ast: &PandocAst) -> Node {
    Editor::new(registry.clone(), doc, ast.api_version.clone())
        .unwrap_or_else(|e| fail(e))
        .doc()
}

fn handle_inspect_command(
    registry: &Arc<ConstructRegistry>,
    config: &PaneditConfig,
    input: &str,
    from: &str,
    transform: &str,
) {
    let runtime = runtime();
    let ast = load_interchange(&runtime, &pandoc(config), config, input, from);
    let doc = read_document(registry, &ast).unwrap_or_else(|e| fail(e));
    let output = transforms::execute_transform(&ast, &doc, transform).unwrap_or_else(|e| {
        eprintln!("Execution error: {e}");
        std::process::exit(1);
    });
    print!("{output}");
}

fn handle_commands_command(registry: &ConstructRegistry) {
    for command in registry.commands() {
        let kind = format!("{:?}", command.kind()).to_lowercase();
        println!("{:<20} {:<8} {}", command.name(), kind, command.keys().join(" "));
    }
}

fn handle_list_transforms_command() {
    println!("Available transforms:\n");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }
}
