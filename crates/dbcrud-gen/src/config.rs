use serde::Deserialize;
use std::path::{Path, PathBuf};

use dbcrud::qb::Dialect;

use crate::emit::{ConnectionMode, EmitOptions};

pub const DEFAULT_CONFIG_FILE: &str = "dbcrud.toml";

/// Client types a test-database context can hand out.
const TEST_CONTEXT_CLIENTS: &[&str] = &[
    "dbcrud::tokio_postgres::Client",
    "tokio_postgres::Client",
    "tokio_postgres::client::Client",
];

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: Option<PathBuf>,
    pub config_dir: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let config_dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let mut file: ConfigFile = toml::from_str(&raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to parse config file {}: {e}",
                config_path.display()
            )
        })?;

        file.expand_env()?;
        file.validate()?;

        Ok(Self {
            config_path: Some(config_path),
            config_dir,
            file,
        })
    }

    /// Load `path` if given, else `dbcrud.toml` in the working directory if
    /// present, else the defaults.
    pub fn discover(path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            return Self::load(default);
        }
        Ok(Self {
            config_path: None,
            config_dir: PathBuf::new(),
            file: ConfigFile::default(),
        })
    }

    pub fn resolve_path(&self, p: impl AsRef<Path>) -> PathBuf {
        let p = p.as_ref();
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.config_dir.join(p)
        }
    }

    pub fn src_dir(&self) -> PathBuf {
        self.resolve_path(&self.file.input.src)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.resolve_path(&self.file.output.out)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub version: String,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub crud: CrudConfig,
    pub timestamps: TimestampsConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            crud: CrudConfig::default(),
            timestamps: TimestampsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub src: String,
    /// Struct names compiled even without `#[derive(Entity)]`.
    pub entities: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            src: "src".to_string(),
            entities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub out: String,
    pub dialect: String,
    pub schema: bool,
    pub crud: bool,
    pub tests: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out: "src/db".to_string(),
            dialect: "postgres".to_string(),
            schema: true,
            crud: true,
            tests: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connection {
    #[default]
    Explicit,
    Context,
}

/// The identity column is not configurable here: it is the field marked
/// `#[dbcrud(id)]`, else `id`, the same rule `#[derive(Entity)]` applies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrudConfig {
    pub connection: Connection,
    pub context_client: String,
    pub max_select_rows: usize,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            connection: Connection::Explicit,
            context_client: "dbcrud::tokio_postgres::Client".to_string(),
            max_select_rows: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimestampsConfig {
    /// Column stamped on insert; empty disables it.
    pub inserted: String,
    pub updated: String,
}

impl Default for TimestampsConfig {
    fn default() -> Self {
        Self {
            inserted: "inserted_at".to_string(),
            updated: "updated_at".to_string(),
        }
    }
}

impl ConfigFile {
    fn expand_env(&mut self) -> anyhow::Result<()> {
        self.input.src = expand_env_vars(&self.input.src)?;
        for e in &mut self.input.entities {
            *e = expand_env_vars(e)?;
        }
        self.output.out = expand_env_vars(&self.output.out)?;
        self.output.dialect = expand_env_vars(&self.output.dialect)?;
        self.crud.context_client = expand_env_vars(&self.crud.context_client)?;
        self.timestamps.inserted = expand_env_vars(&self.timestamps.inserted)?;
        self.timestamps.updated = expand_env_vars(&self.timestamps.updated)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }

        if self.input.src.trim().is_empty() {
            anyhow::bail!("input.src must not be empty");
        }
        if self.input.entities.iter().any(|e| e.trim().is_empty()) {
            anyhow::bail!("input.entities must not contain empty names");
        }
        if self.output.out.trim().is_empty() {
            anyhow::bail!("output.out must not be empty");
        }
        if self.crud.max_select_rows == 0 {
            anyhow::bail!("crud.max_select_rows must be greater than zero");
        }

        let dialect = self.dialect()?;
        let out = &self.output;
        if dialect == Dialect::MySql && (out.crud || out.tests) {
            anyhow::bail!(
                "output.dialect = \"mysql\" only supports schema output; set output.crud and output.tests to false"
            );
        }
        if out.tests && !(out.crud && out.schema) {
            anyhow::bail!("output.tests requires output.crud and output.schema");
        }

        if self.crud.connection == Connection::Context {
            if self.crud.context_client.trim().is_empty() {
                anyhow::bail!("crud.context_client must not be empty");
            }
            if out.tests && !TEST_CONTEXT_CLIENTS.contains(&self.crud.context_client.as_str()) {
                anyhow::bail!(
                    "generated tests run against a tokio-postgres client, but crud.context_client is {}",
                    self.crud.context_client
                );
            }
        }

        Ok(())
    }

    pub fn dialect(&self) -> anyhow::Result<Dialect> {
        self.output
            .dialect
            .parse()
            .map_err(|e: String| anyhow::anyhow!("output.dialect: {e}"))
    }

    pub fn emit_options(&self) -> anyhow::Result<EmitOptions> {
        let auto_timestamps = [&self.timestamps.inserted, &self.timestamps.updated]
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();

        Ok(EmitOptions {
            dialect: self.dialect()?,
            connection: match self.crud.connection {
                Connection::Explicit => ConnectionMode::Explicit,
                Connection::Context => ConnectionMode::Context,
            },
            context_client: self.crud.context_client.clone(),
            max_rows: self.crud.max_select_rows,
            auto_timestamps,
            schema: self.output.schema,
            crud: self.output.crud,
            tests: self.output.tests,
        })
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}}}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
