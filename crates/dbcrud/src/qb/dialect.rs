use std::fmt;
use std::str::FromStr;

/// Target SQL dialect.
///
/// `MySql` renders the canonical `?`-placeholder grammar. `Postgres` renders
/// the form executed by the generated code against tokio-postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    MySql,
    #[default]
    Postgres,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
        }
    }

    /// A fresh placeholder sequence for one statement.
    pub fn placeholders(self) -> Placeholders {
        Placeholders {
            dialect: self,
            count: 0,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(format!(
                "unknown dialect: {other} (expected mysql or postgres)"
            )),
        }
    }
}

/// Hands out placeholders in statement order.
#[derive(Debug, Clone)]
pub struct Placeholders {
    dialect: Dialect,
    count: usize,
}

impl Placeholders {
    pub fn next(&mut self) -> String {
        self.count += 1;
        match self.dialect {
            Dialect::MySql => "?".to_string(),
            Dialect::Postgres => format!("${}", self.count),
        }
    }

    /// Number of placeholders handed out so far.
    pub fn count(&self) -> usize {
        self.count
    }
}
