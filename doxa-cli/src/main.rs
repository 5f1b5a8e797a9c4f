// Command-line interface for doxa
//
// This binary converts documents between the markup formats of doxa-babel and lets
// you look at the event stream a parser produces.
//
// Converting:
//
// The conversion needs a to and from pair. The from is detected from the file
// extension, and can be overridden with an explicit --from flag.
// Usage:
//  doxa <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  doxa convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  doxa inspect <path> [<transform>]      - Execute a transform (defaults to "tag")
//  doxa --list-transforms                 - List available transforms and formats
//
// Configuration:
//
// Settings come from the built-in defaults, then ./doxa.toml when present, then the
// file named by --config. Explicit --extra-* parameters win over all of them.
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters both to the
// parser and to the serializer.
// Example:
//  doxa guide.apt --to fo --extra-page-size letter --extra-macros false

use doxa_cli::transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use doxa_babel::format::options;
use doxa_babel::{Format, FormatRegistry, SerializedDocument};
use doxa_config::{DoxaConfig, Loader};
use log::LevelFilter;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Configuration file picked up from the working directory.
const LOCAL_CONFIG: &str = "doxa.toml";

const SUBCOMMANDS: &[&str] = &["inspect", "convert", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));

        if let Some(key) = key_opt {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("doxa")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting and inspecting markup documents")
        .long_about(
            "doxa converts documents between markup formats through a common event stream.\n\n\
            Commands:\n  \
            - convert: Transform between document formats (apt, xdoc, fml, html, fo, pdf, tag)\n  \
            - inspect: View the event stream a parser produces\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            doxa guide.apt --to html                      # Convert to HTML (outputs to stdout)\n  \
            doxa guide.apt --to pdf -o guide.pdf          # Render a PDF through an FO processor\n  \
            doxa inspect guide.apt toc                    # Section outline with anchor ids\n  \
            doxa guide.apt --to html --extra-generate-anchors",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms and formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a doxa.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output and report every parser warning")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect the event stream of a document")
                .long_about(
                    "Parse a document and print one view of its event stream.\n\n\
                    Transforms:\n  \
                    - tag:          Events as an XML-like tag tree (default)\n  \
                    - event-names:  One event name per line, indented by nesting\n  \
                    - events-json:  Events with all payloads and attributes as JSON\n  \
                    - toc:          Section outline with generated anchor ids\n\n\
                    Examples:\n  \
                    doxa inspect guide.apt                                   # Tag tree\n  \
                    doxa inspect guide.apt event-names                       # Event names\n  \
                    doxa inspect site.fml tag --extra-show-attributes false  # Tags only",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the document")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'tag'")
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
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - apt:   Almost Plain Text (.apt), read and write\n  \
                    - xdoc:  XML document (.xml), read only\n  \
                    - fml:   FAQ markup (.fml), read only\n  \
                    - html:  XHTML (.html), write only\n  \
                    - fo:    XSL-FO (.fo), write only\n  \
                    - pdf:   PDF via an external FO processor, write only\n  \
                    - tag:   XML-like event dump, write only\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\
                    PDF output always needs -o.\n\n\
                    Examples:\n  \
                    doxa convert guide.apt --to html -o guide.html\n  \
                    doxa convert site.xml --to apt\n  \
                    doxa guide.apt --to pdf -o guide.pdf --extra-processor /opt/fop/fop",
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
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading file argument means the convert subcommand was left out.
            let first = cleaned_args.get(1).map(String::as_str);
            match first {
                Some(arg) if !arg.starts_with('-') && !SUBCOMMANDS.contains(&arg) => {
                    let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                    new_args.extend_from_slice(&cleaned_args[1..]);
                    match cli.try_get_matches_from(&new_args) {
                        Ok(m) => m,
                        Err(e2) => e2.exit(),
                    }
                }
                _ => e.exit(),
            }
        }
    };

    let verbose = matches.get_flag("verbose");
    init_logging(verbose);

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(String::as_str));

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let path = required(sub_matches, "path");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(String::as_str)
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            let from = source_format(sub_matches, path);
            let params = parse_params(&config, path, verbose, &extra_params);
            handle_inspect_command(path, &from, transform, &params);
        }
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let from = source_format(sub_matches, input);
            let output = sub_matches.get_one::<String>("output").map(String::as_str);
            let parse_options = parse_params(&config, input, verbose, &extra_params);
            let serialize_options = serialize_params(&config, to, &extra_params);
            handle_convert_command(input, &from, to, output, &parse_options, &serialize_options);
        }
        _ => fail("Unknown subcommand. Use --help for usage information."),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    // A logger installed by the embedding process stays in place.
    let _ = env_logger::builder()
        .filter_level(level)
        .format_timestamp(None)
        .try_init();
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value.as_str(),
        None => fail(&format!("Error: missing argument <{name}>")),
    }
}

/// The explicit `--from`, or the format registered for the file's extension.
fn source_format(matches: &ArgMatches, input: &str) -> String {
    if let Some(from) = matches.get_one::<String>("from") {
        return from.clone();
    }
    let registry = FormatRegistry::default();
    match registry.detect_format_from_filename(input) {
        Some(detected) => {
            log::debug!("detected format '{detected}' for {input}");
            detected
        }
        None => fail(&format!(
            "Error: Could not detect format from filename '{input}'\nPlease specify --from explicitly"
        )),
    }
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    from: &str,
    transform: &str,
    params: &HashMap<String, String>,
) {
    let source = read_source(path);

    let output = transforms::execute_transform(&source, from, transform, params)
        .unwrap_or_else(|e| fail(&format!("Execution error: {e}")));

    print!("{output}");
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    parse_options: &HashMap<String, String>,
    serialize_options: &HashMap<String, String>,
) {
    let registry = FormatRegistry::default();

    for format in [from, to] {
        if let Err(e) = registry.get(format) {
            fail(&format!("Error: {e}"));
        }
    }

    let source = read_source(input);

    let result = registry
        .convert(&source, from, to, parse_options, serialize_options)
        .unwrap_or_else(|e| fail(&format!("Error: {e}")));

    match (output, result) {
        (Some(path), data) => {
            fs::write(path, data.into_bytes())
                .unwrap_or_else(|e| fail(&format!("Error writing file '{path}': {e}")));
            log::info!("wrote {path}");
        }
        (None, SerializedDocument::Text(text)) => {
            print!("{text}");
        }
        (None, SerializedDocument::Binary(_)) => {
            fail("Binary formats (like PDF) require an output file. Use -o <path>.");
        }
    }
}

/// Handle the list-transforms command
fn handle_list_transforms_command() {
    println!("Available transforms:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }

    println!("\nConversion formats:");
    let registry = FormatRegistry::default();
    for format_name in registry.list_formats() {
        let Ok(format) = registry.get(&format_name) else {
            continue;
        };
        let mode = match (format.supports_parsing(), format.supports_serialization()) {
            (true, true) => "read/write",
            (true, false) => "read",
            (false, true) => "write",
            (false, false) => "-",
        };
        println!("  {format_name:<6} {mode:<10} {}", format.description());
    }
}

fn read_source(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("Error reading file '{path}': {e}")))
}

fn load_cli_config(explicit_path: Option<&str>) -> DoxaConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    let loader = match explicit_path {
        Some(path) => loader.with_file(path),
        None => loader,
    };

    loader
        .build()
        .unwrap_or_else(|err| fail(&format!("Failed to load configuration: {err}")))
}

/// Parser options: configuration, then the document's location, then the extras.
fn parse_params(
    config: &DoxaConfig,
    input: &str,
    verbose: bool,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut params = config.parse.to_options();
    if verbose {
        params.insert(options::VERBOSE.to_string(), "true".to_string());
    }

    let path = Path::new(input);
    if let Some(name) = path.file_name() {
        params.insert(options::FILE.to_string(), name.to_string_lossy().into_owned());
    }
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        params.insert(options::BASE_DIR.to_string(), dir.display().to_string());
    }

    for (key, value) in overrides {
        params.insert(key.clone(), value.clone());
    }
    params
}

/// Serializer options: the configured section for `to`, then the extras.
fn serialize_params(
    config: &DoxaConfig,
    to: &str,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut params = config.convert.options_for(to);
    for (key, value) in overrides {
        params.insert(key.clone(), value.clone());
    }
    params
}
