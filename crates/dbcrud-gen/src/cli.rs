use std::path::PathBuf;

use dbcrud::qb::Dialect;

#[derive(Debug, Clone)]
pub enum Command {
    Help,
    Generate(GenerateArgs),
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub config: Option<PathBuf>,
    pub src: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub context: bool,
    pub dialect: Option<Dialect>,
    pub dry_run: bool,
    pub check: bool,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(|s| s.as_str());
    let mut out = GenerateArgs::default();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                out.config = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--config=") => {
                out.config = Some(PathBuf::from(token.trim_start_matches("--config=")));
            }
            "--src" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--src requires a value");
                };
                out.src = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--src=") => {
                out.src = Some(PathBuf::from(token.trim_start_matches("--src=")));
            }
            "-o" | "--out" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("{token} requires a value");
                };
                out.out = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--out=") => {
                out.out = Some(PathBuf::from(token.trim_start_matches("--out=")));
            }
            "--dialect" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--dialect requires a value");
                };
                out.dialect = Some(parse_dialect(v)?);
            }
            _ if token.starts_with("--dialect=") => {
                out.dialect = Some(parse_dialect(token.trim_start_matches("--dialect="))?);
            }
            "--context" => out.context = true,
            "--dry-run" => out.dry_run = true,
            "--check" => out.check = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Generate(out))
}

fn parse_dialect(v: &str) -> anyhow::Result<Dialect> {
    v.parse().map_err(|e: String| anyhow::anyhow!("--dialect: {e}"))
}

pub fn print_help() {
    println!(
        "\
dbcrud-gen - compile Rust entity structs into SQL schemas and CRUD code

USAGE:
  dbcrud-gen [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: dbcrud.toml, if present)
  --src <DIR>           Source directory to scan (overrides input.src)
  -o, --out <DIR>       Output directory (overrides output.out)
  --context             Generate functions that take a DbContext
  --dialect <NAME>      postgres | mysql (overrides output.dialect)
  --dry-run             Print files to create, update or remove
  --check               Exit non-zero if output would change
  -h, --help            Print help

Set RUST_LOG=debug to trace each compiled entity."
    );
}
