use sightread::{
    generate_or_fallback, inject_metronome_with_settings, plan_metronome, FallbackSource,
    RecordedResponse, Settings, SightreadError,
};
use std::fs;
use std::io;
use thiserror::Error;

pub const USAGE: &str = "Usage: sightread [--settings <file.yaml>] [--response <reply.json>] \
[--metronome|--no-metronome] [--key-index N] [--plan] [input.abc|-] [output.abc]";

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("Error reading '{path}': {source}")]
    Read { path: String, source: io::Error },

    #[error("Error writing to '{path}': {source}")]
    Write { path: String, source: io::Error },

    #[error(transparent)]
    Sightread(#[from] SightreadError),

    #[error("Could not encode plan: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub settings_path: Option<String>,
    pub response_path: Option<String>,
    pub metronome: Option<bool>,
    pub key_index: usize,
    pub plan: bool,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
}

pub fn parse_args(args: &[String]) -> Result<Options, CliError> {
    let mut options = Options::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" => options.settings_path = Some(flag_value(&mut iter, arg)?),
            "--response" => options.response_path = Some(flag_value(&mut iter, arg)?),
            "--key-index" => {
                let value = flag_value(&mut iter, arg)?;
                options.key_index = value
                    .parse()
                    .map_err(|_| CliError::Usage(format!("Invalid key index: {}", value)))?;
            }
            "--metronome" => options.metronome = Some(true),
            "--no-metronome" => options.metronome = Some(false),
            "--plan" => options.plan = true,
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("Unknown option: {}", flag)));
            }
            _ => positional.push(arg.clone()),
        }
    }

    if positional.len() > 2 {
        return Err(CliError::Usage("Too many arguments".to_string()));
    }
    let mut positional = positional.into_iter();
    options.input_path = positional.next();
    options.output_path = positional.next();

    Ok(options)
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String, CliError> {
    iter.next()
        .cloned()
        .ok_or_else(|| CliError::Usage(format!("{} requires a value", flag)))
}

fn read_file(path: &str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })
}

fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        return io::read_to_string(io::stdin()).map_err(|source| CliError::Read {
            path: "<stdin>".to_string(),
            source,
        });
    }
    read_file(path)
}

/// Produce the text to write: notation with the metronome voice, or the
/// metronome plan as JSON when `--plan` is given.
pub fn render(options: &Options, settings: &Settings, notation: &str) -> Result<String, CliError> {
    if options.plan {
        let plan = plan_metronome(notation, settings.measures as usize, settings.requested_meter());
        let mut json = serde_json::to_string_pretty(&plan)?;
        json.push('\n');
        return Ok(json);
    }
    Ok(inject_metronome_with_settings(notation, settings))
}

pub fn run(options: &Options) -> Result<(), CliError> {
    let mut settings = match &options.settings_path {
        Some(path) => Settings::from_yaml(&read_file(path)?)?,
        None => Settings::default(),
    };
    if let Some(metronome_on) = options.metronome {
        settings.metronome_on = metronome_on;
    }

    let fallback = FallbackSource::new(options.key_index);
    let notation = match (&options.input_path, &options.response_path) {
        (Some(path), _) => read_input(path)?,
        (None, Some(path)) => {
            let reply = RecordedResponse::new(read_file(path)?);
            generate_or_fallback(&reply, &fallback, &settings)
        }
        (None, None) => fallback.notation(&settings),
    };

    let output = render(options, &settings, &notation)?;

    match &options.output_path {
        Some(path) => {
            fs::write(path, &output).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            log::info!("Wrote {}", path);
        }
        None => print!("{}", output),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_arguments() {
        assert_eq!(parse_args(&[]).unwrap(), Options::default());
    }

    #[test]
    fn test_all_options() {
        let options = parse_args(&args(&[
            "--settings",
            "s.yaml",
            "--no-metronome",
            "--key-index",
            "3",
            "--plan",
            "in.abc",
            "out.abc",
        ]))
        .unwrap();
        assert_eq!(options.settings_path.as_deref(), Some("s.yaml"));
        assert_eq!(options.metronome, Some(false));
        assert_eq!(options.key_index, 3);
        assert!(options.plan);
        assert_eq!(options.input_path.as_deref(), Some("in.abc"));
        assert_eq!(options.output_path.as_deref(), Some("out.abc"));
    }

    #[test]
    fn test_stdin_input() {
        let options = parse_args(&args(&["--metronome", "-"])).unwrap();
        assert_eq!(options.input_path.as_deref(), Some("-"));
        assert_eq!(options.metronome, Some(true));
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(parse_args(&args(&["--settings"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args(&["--key-index", "x"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args(&["--tempo", "90"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args(&["a", "b", "c"])), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_render_injects_when_enabled() {
        let settings = Settings {
            metronome_on: true,
            ..Settings::default()
        };
        let abc = "X:1\nM:2/4\nL:1/4\nK:C\n| C D |\n";
        let output = render(&Options::default(), &settings, abc).unwrap();
        assert!(output.starts_with(abc));
        assert!(output.contains("| !f!e !p!f |"));
    }

    #[test]
    fn test_render_plan_json() {
        let options = Options {
            plan: true,
            ..Options::default()
        };
        let output = render(&options, &Settings::default(), "M:6/8\nK:C\n| C |").unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["clicks"]["clicksPerMeasure"], 2);
    }
}
