use std::fmt;

use dbcrud::qb::Dialect;

use crate::decl::PrimitiveKind;

/// Default bound for variable-length text columns.
pub const DEFAULT_TEXT_BOUND: u32 = 255;

/// A column type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Bit,
    Integer,
    BigInt,
    Float,
    Double,
    VarChar(u32),
    DateTime,
    /// Raw bytes. Rendered as bounded text for MySQL.
    Binary,
    /// An override annotation, rendered verbatim.
    Explicit(ExplicitType),
}

/// A parsed `#[dbcrud(type = "...")]` override: `name [ "(" N ")" ]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitType {
    pub name: String,
    pub param: Option<u32>,
}

impl fmt::Display for ExplicitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param {
            Some(n) => write!(f, "{}({n})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl ColumnType {
    pub fn render(&self, dialect: Dialect) -> String {
        match (self, dialect) {
            (Self::Bit, Dialect::MySql) => "BIT".into(),
            (Self::Bit, Dialect::Postgres) => "BOOLEAN".into(),
            (Self::Integer, _) => "INTEGER".into(),
            (Self::BigInt, _) => "BIGINT".into(),
            (Self::Float, Dialect::MySql) => "FLOAT".into(),
            (Self::Float, Dialect::Postgres) => "REAL".into(),
            (Self::Double, Dialect::MySql) => "DOUBLE".into(),
            (Self::Double, Dialect::Postgres) => "DOUBLE PRECISION".into(),
            (Self::VarChar(n), _) => format!("VARCHAR({n})"),
            (Self::DateTime, Dialect::MySql) => "DATETIME".into(),
            (Self::DateTime, Dialect::Postgres) => "TIMESTAMP".into(),
            (Self::Binary, Dialect::MySql) => format!("VARCHAR({DEFAULT_TEXT_BOUND})"),
            (Self::Binary, Dialect::Postgres) => "BYTEA".into(),
            (Self::Explicit(e), _) => e.to_string(),
        }
    }

    /// Whether values come back blank-padded to the declared width.
    ///
    /// True for `char(n)` overrides under Postgres. MySQL strips trailing
    /// blanks from `CHAR` on retrieval.
    pub fn is_blank_padded(&self, dialect: Dialect) -> bool {
        let Self::Explicit(e) = self else {
            return false;
        };
        dialect == Dialect::Postgres
            && matches!(
                e.name.to_ascii_lowercase().as_str(),
                "char" | "character" | "bpchar" | "nchar" | "national character"
            )
    }
}

#[derive(Debug, Clone)]
pub struct SqlTypeMapper {
    text_bound: u32,
}

impl Default for SqlTypeMapper {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_BOUND)
    }
}

impl SqlTypeMapper {
    pub fn new(text_bound: u32) -> Self {
        Self { text_bound }
    }

    /// Map a resolved kind, letting an override annotation win.
    ///
    /// Errors carry the reason an override failed to parse.
    pub fn map(&self, kind: PrimitiveKind, type_override: Option<&str>) -> Result<ColumnType, String> {
        if let Some(text) = type_override {
            return parse_override(text).map(ColumnType::Explicit);
        }

        Ok(match kind {
            PrimitiveKind::Bool => ColumnType::Bit,
            PrimitiveKind::Int32 => ColumnType::Integer,
            PrimitiveKind::Int64 => ColumnType::BigInt,
            PrimitiveKind::Float32 => ColumnType::Float,
            PrimitiveKind::Float64 => ColumnType::Double,
            PrimitiveKind::Text => ColumnType::VarChar(self.text_bound),
            PrimitiveKind::Binary => ColumnType::Binary,
            PrimitiveKind::Timestamp => ColumnType::DateTime,
        })
    }
}

/// Parse an override annotation.
///
/// The name is one or more words of ASCII letters, digits and `_` (first
/// character a letter), separated by whitespace; an optional positive
/// parameter in parentheses may follow. Whitespace is normalized.
pub fn parse_override(text: &str) -> Result<ExplicitType, String> {
    let text = text.trim();
    let (name_part, param) = match text.find('(') {
        Some(open) => {
            let rest = &text[open + 1..];
            let close = rest
                .find(')')
                .ok_or_else(|| "missing closing parenthesis".to_string())?;
            if !rest[close + 1..].trim().is_empty() {
                return Err("unexpected text after parameter".into());
            }
            let digits = rest[..close].trim();
            let n: u32 = digits
                .parse()
                .map_err(|_| format!("parameter `{digits}` is not a positive integer"))?;
            if n == 0 {
                return Err("parameter must be positive".into());
            }
            (&text[..open], Some(n))
        }
        None => (text, None),
    };

    let words: Vec<&str> = name_part.split_whitespace().collect();
    if words.is_empty() {
        return Err("missing type name".into());
    }
    for word in &words {
        let mut chars = word.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(format!("`{word}` is not a valid type name"));
        }
    }

    Ok(ExplicitType {
        name: words.join(" "),
        param,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_table() {
        let m = SqlTypeMapper::default();
        let render = |kind| m.map(kind, None).unwrap().render(Dialect::MySql);

        assert_eq!(render(PrimitiveKind::Bool), "BIT");
        assert_eq!(render(PrimitiveKind::Int32), "INTEGER");
        assert_eq!(render(PrimitiveKind::Int64), "BIGINT");
        assert_eq!(render(PrimitiveKind::Float32), "FLOAT");
        assert_eq!(render(PrimitiveKind::Float64), "DOUBLE");
        assert_eq!(render(PrimitiveKind::Text), "VARCHAR(255)");
        assert_eq!(render(PrimitiveKind::Binary), "VARCHAR(255)");
        assert_eq!(render(PrimitiveKind::Timestamp), "DATETIME");
    }

    #[test]
    fn postgres_rendering() {
        let m = SqlTypeMapper::default();
        let render = |kind| m.map(kind, None).unwrap().render(Dialect::Postgres);

        assert_eq!(render(PrimitiveKind::Bool), "BOOLEAN");
        assert_eq!(render(PrimitiveKind::Float64), "DOUBLE PRECISION");
        assert_eq!(render(PrimitiveKind::Binary), "BYTEA");
        assert_eq!(render(PrimitiveKind::Timestamp), "TIMESTAMP");
    }

    #[test]
    fn override_wins() {
        let m = SqlTypeMapper::default();
        let ty = m.map(PrimitiveKind::Text, Some("char(255)")).unwrap();
        assert_eq!(
            ty,
            ColumnType::Explicit(ExplicitType {
                name: "char".into(),
                param: Some(255),
            })
        );
        assert_eq!(ty.render(Dialect::Postgres), "char(255)");
    }

    #[test]
    fn fixed_width_text_is_blank_padded_on_postgres() {
        let m = SqlTypeMapper::default();
        let ty = |o| m.map(PrimitiveKind::Text, Some(o)).unwrap();

        assert!(ty("char(255)").is_blank_padded(Dialect::Postgres));
        assert!(ty("CHARACTER(8)").is_blank_padded(Dialect::Postgres));
        assert!(ty("char").is_blank_padded(Dialect::Postgres));
        assert!(!ty("char(255)").is_blank_padded(Dialect::MySql));
        assert!(!ty("varchar(128)").is_blank_padded(Dialect::Postgres));
        assert!(!ty("character varying(16)").is_blank_padded(Dialect::Postgres));
        assert!(!m.map(PrimitiveKind::Text, None).unwrap().is_blank_padded(Dialect::Postgres));
    }

    #[test]
    fn override_grammar() {
        assert_eq!(
            parse_override("  double   precision ").unwrap().to_string(),
            "double precision"
        );
        assert_eq!(parse_override("varchar( 128 )").unwrap().param, Some(128));

        assert!(parse_override("").is_err());
        assert!(parse_override("varchar(").is_err());
        assert!(parse_override("varchar(x)").is_err());
        assert!(parse_override("varchar(0)").is_err());
        assert!(parse_override("varchar(10) not null").is_err());
        assert!(parse_override("text; drop table t").is_err());
    }
}
