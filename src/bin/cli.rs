use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::str::FromStr;

use gantt_tool::{ChartConfig, Pipeline, Scale, logging};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputFormat {
    #[default]
    Notation,
    Json,
    Yaml,
}

#[derive(Debug, Default)]
struct Options {
    format: InputFormat,
    config: Option<String>,
    scale: Option<Scale>,
    output: Option<String>,
    input: Option<String>,
}

fn print_help() {
    println!(
        "Usage: cli [options] [<input>|-]\n\nRender a schedule as an SVG Gantt chart. Reads stdin when no input file is given.\n\nOptions:\n  --json                    Input is a JSON schedule document instead of notation\n  --yaml                    Input is a YAML schedule document instead of notation\n  --config <path>           JSON chart configuration file\n  --scale <daily|weekly>    Override the scale set in the schedule\n  -o, --output <path>       Write the SVG to a file instead of stdout\n  -h, --help                Show this help"
    );
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--json" => options.format = InputFormat::Json,
            "--yaml" => options.format = InputFormat::Yaml,
            "--config" => {
                options.config = Some(args.next().ok_or("--config needs a path")?);
            }
            "--scale" => {
                let value = args.next().ok_or("--scale needs daily or weekly")?;
                options.scale = Some(Scale::from_str(&value)?);
            }
            "-o" | "--output" => {
                options.output = Some(args.next().ok_or("--output needs a path")?);
            }
            "-" => options.input = None,
            other if other.starts_with('-') => return Err(format!("unknown option '{other}'")),
            other => {
                if options.input.is_some() {
                    return Err(format!("unexpected extra argument '{other}'"));
                }
                options.input = Some(other.to_string());
            }
        }
    }
    Ok(Some(options))
}

fn read_input(path: Option<&str>) -> Result<String, String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|err| format!("cannot read {path}: {err}")),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("cannot read stdin: {err}"))?;
            Ok(buffer)
        }
    }
}

fn load_config(path: Option<&str>) -> Result<ChartConfig, String> {
    let Some(path) = path else {
        return Ok(ChartConfig::default());
    };
    let raw = fs::read_to_string(path).map_err(|err| format!("cannot read {path}: {err}"))?;
    ChartConfig::from_json_str(&raw).map_err(|err| format!("invalid config {path}: {err}"))
}

fn run(options: Options) -> Result<(), String> {
    let config = load_config(options.config.as_deref())?;
    let input = read_input(options.input.as_deref())?;

    let pipeline = Pipeline::new(&config).with_scale(options.scale);
    let doc = match options.format {
        InputFormat::Notation => pipeline.render_notation(&input),
        InputFormat::Json => pipeline.render_json(&input),
        InputFormat::Yaml => pipeline.render_yaml(&input),
    }
    .map_err(|err| err.to_string())?;

    let svg = doc.to_svg();
    match options.output.as_deref() {
        Some(path) => {
            fs::write(path, &svg).map_err(|err| format!("cannot write {path}: {err}"))?;
            info!(path, width = doc.width, height = doc.height, "wrote chart");
        }
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(svg.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .map_err(|err| format!("cannot write stdout: {err}"))?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init() {
        eprintln!("{err}");
    }

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}");
            print_help();
            return ExitCode::from(2);
        }
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
