use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rekon_core::headers::{ensure_header_defaults, HeaderList};
use rekon_core::{CompareMetadata, OperationPayloadConfig, Resource};
use tracing::info;

mod load;

#[derive(Parser, Debug)]
#[command(name = "rekonctl", version, about = "Rekon CLI: normalize, shape and diff declared resources")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Args, Debug, Default)]
struct RuleArgs {
    /// YAML/JSON rules file (ignoreAttributes, suppressAttributes, filterAttributes, jqExpression)
    #[arg(long = "rules")]
    rules: Option<String>,
    /// Dotted attribute path never compared (repeatable)
    #[arg(long = "ignore")]
    ignore: Vec<String>,
    /// Dotted attribute path expected to differ (repeatable)
    #[arg(long = "suppress")]
    suppress: Vec<String>,
    /// Dotted attribute path to keep; everything else is dropped (repeatable)
    #[arg(long = "filter")]
    filter: Vec<String>,
    /// JQ projection evaluated after the attribute rules
    #[arg(long = "jq")]
    jq: Option<String>,
}

impl RuleArgs {
    /// Rules file first, flags layered on top. `None` when nothing was given.
    fn resolve(&self) -> Result<Option<CompareMetadata>> {
        let base = match &self.rules {
            Some(path) => Some(load::load_rules(path)?),
            None => None,
        };
        let non_empty = |v: &Vec<String>| if v.is_empty() { None } else { Some(v.clone()) };
        let flags = CompareMetadata {
            ignore_attributes: non_empty(&self.ignore),
            suppress_attributes: non_empty(&self.suppress),
            filter_attributes: non_empty(&self.filter),
            jq_expression: self.jq.clone().unwrap_or_default(),
        };
        if flags == CompareMetadata::default() {
            return Ok(base);
        }
        Ok(CompareMetadata::merge(base.as_ref(), Some(&flags)))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the canonical form of a JSON/YAML document ("-" reads stdin)
    Normalize {
        file: String,
    },
    /// Apply comparison rules to a document and print the shaped value
    Shape {
        file: String,
        #[command(flatten)]
        rules: RuleArgs,
        /// Treat the rules as an outgoing payload config (ignore lists are rejected)
        #[arg(long = "outgoing", action = ArgAction::SetTrue)]
        outgoing: bool,
    },
    /// Diff a local declared document against a remote observed one
    Diff {
        local: String,
        remote: String,
        #[command(flatten)]
        rules: RuleArgs,
        /// Logical path used to label diff entries
        #[arg(long = "resource-path", default_value = "/")]
        resource_path: String,
        /// Exit with status 2 when drift is found
        #[arg(long = "exit-code", action = ArgAction::SetTrue)]
        exit_code: bool,
    },
    /// Logical path operations
    Path {
        #[command(subcommand)]
        op: PathOp,
    },
    /// Print request headers with Accept/Content-Type defaults applied
    Headers {
        method: String,
        /// Header lines, e.g. "X-Token: abc"
        lines: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum PathOp {
    /// Validate and canonicalize a path
    Normalize { path: String },
    /// Join a segment onto a collection path
    Join { collection: String, segment: String },
    /// List the segments of a path
    Split { path: String },
    /// Print the child segment if CANDIDATE is an immediate child of PARENT
    Child { parent: String, candidate: String },
}

fn init_tracing() {
    let env = std::env::var("REKON_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

/// Validated logical path used to label diff entries.
fn resource_label(raw: &str) -> Result<String> {
    rekon_core::normalize_logical_path(raw).with_context(|| format!("invalid --resource-path {:?}", raw))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { file } => {
            info!(file = %file, "normalize invoked");
            let value = load::load_value(&file)?;
            print_json(&value)?;
        }
        Commands::Shape { file, rules, outgoing } => {
            info!(file = %file, outgoing, "shape invoked");
            let value = load::load_value(&file)?;
            let rules = rules.resolve()?;
            let shaped = if outgoing {
                let config = match rules {
                    Some(r) if !r.ignore().is_empty() => anyhow::bail!("--outgoing does not accept ignore rules"),
                    Some(r) => Some(OperationPayloadConfig {
                        suppress_attributes: r.suppress_attributes,
                        filter_attributes: r.filter_attributes,
                        jq_expression: r.jq_expression,
                    }),
                    None => None,
                };
                rekon_compare::apply_payload_config(value, config.as_ref())?
            } else {
                rekon_compare::shape_value(value, rules.as_ref())?
            };
            print_json(&shaped)?;
        }
        Commands::Diff { local, remote, rules, resource_path, exit_code } => {
            info!(local = %local, remote = %remote, "diff invoked");
            let resource_path = resource_label(&resource_path)?;
            let rules = rules.resolve()?;
            let local_res = Resource::new(resource_path.clone(), load::load_decoded(&local)?);
            let remote_res = Resource::new(resource_path, load::load_decoded(&remote)?);
            let diff = rekon_apply::compare_resources(&local_res, &remote_res, rules.as_ref())
                .context("comparing resources")?;
            match cli.output {
                Output::Human => {
                    for op in &diff.patch {
                        match &op.value {
                            Some(v) => println!("{:<7} {} {}", op.op, op.path, v),
                            None => println!("{:<7} {}", op.op, op.path),
                        }
                    }
                    let s = &diff.summary;
                    println!("adds={} updates={} removes={}", s.adds, s.updates, s.removes);
                }
                Output::Json => print_json(&diff)?,
            }
            if exit_code && diff.has_drift() {
                std::process::exit(2);
            }
        }
        Commands::Path { op } => match op {
            PathOp::Normalize { path } => println!("{}", rekon_core::normalize_logical_path(&path)?),
            PathOp::Join { collection, segment } => println!("{}", rekon_core::join_logical_path(&collection, &segment)?),
            PathOp::Split { path } => {
                let segments = rekon_core::split_logical_path_segments(&path);
                match cli.output {
                    Output::Human => for s in segments { println!("{}", s); },
                    Output::Json => print_json(&segments)?,
                }
            }
            PathOp::Child { parent, candidate } => match rekon_core::child_segment(&parent, &candidate) {
                Some(segment) => println!("{}", segment),
                None => {
                    eprintln!("{} is not an immediate child of {}", candidate, parent);
                    std::process::exit(1);
                }
            },
        },
        Commands::Headers { method, lines } => {
            let headers = ensure_header_defaults(&HeaderList(lines), &method);
            match cli.output {
                Output::Human => for line in &headers.0 { println!("{}", line); },
                Output::Json => print_json(&headers)?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_layer_over_nothing() {
        let args = RuleArgs { ignore: vec!["status".into()], jq: Some(".id".into()), ..Default::default() };
        let rules = args.resolve().unwrap().unwrap();
        assert_eq!(rules.ignore(), ["status".to_string()]);
        assert!(rules.suppress_attributes.is_none());
        assert_eq!(rules.jq(), Some(".id"));
        assert!(RuleArgs::default().resolve().unwrap().is_none());
    }

    #[test]
    fn resource_path_is_validated() {
        assert_eq!(resource_label("/customers//acme/").unwrap(), "/customers/acme");
        assert_eq!(resource_label("/").unwrap(), "/");
        let e = format!("{:#}", resource_label("/customers/../admin").unwrap_err());
        assert!(e.contains("invalid --resource-path"), "e={}", e);
    }

    #[test]
    fn parses_diff_invocation() {
        let cli = Cli::try_parse_from([
            "rekonctl", "-o", "json", "diff", "a.json", "b.yaml", "--ignore", "status", "--ignore", "meta.etag",
            "--exit-code",
        ])
        .unwrap();
        assert_eq!(cli.output, Output::Json);
        match cli.command {
            Commands::Diff { rules, exit_code, resource_path, .. } => {
                assert_eq!(rules.ignore, vec!["status", "meta.etag"]);
                assert!(exit_code);
                assert_eq!(resource_path, "/");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
