//! Structured description of an emitted Rust file.
//!
//! Emitters build these values; [`crate::emit::printer`] turns them into
//! text. Expressions stay strings, but every item, signature and nested
//! block is explicit.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vis {
    Private,
    Pub,
}

impl Vis {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Private => "",
            Self::Pub => "pub ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RustFile {
    pub items: Vec<Item>,
}

impl RustFile {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: impl Into<Item>) -> &mut Self {
        self.items.push(item.into());
        self
    }
}

impl Default for RustFile {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A group of `use` paths, printed together.
    Uses(Vec<String>),
    Const(ConstDecl),
    Struct(StructDecl),
    Fn(FnDecl),
    /// `mod name;` with optional outer attributes.
    Mod {
        attrs: Vec<String>,
        vis: Vis,
        name: String,
    },
    /// `pub use path;`
    Reexport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDecl {
    pub doc: Vec<String>,
    pub vis: Vis,
    pub name: String,
    pub ty: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub derives: Vec<String>,
    pub vis: Vis,
    pub name: String,
    /// (name, type)
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
    pub ty: String,
}

impl Arg {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnDecl {
    pub doc: Vec<String>,
    pub attrs: Vec<String>,
    pub vis: Vis,
    pub is_async: bool,
    pub name: String,
    pub args: Vec<Arg>,
    pub ret: Option<String>,
    pub body: Vec<Stmt>,
}

impl FnDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            doc: Vec::new(),
            attrs: Vec::new(),
            vis: Vis::Private,
            is_async: false,
            name: name.into(),
            args: Vec::new(),
            ret: None,
            body: Vec::new(),
        }
    }

    pub fn public(mut self) -> Self {
        self.vis = Vis::Pub;
        self
    }

    pub fn asyncness(mut self) -> Self {
        self.is_async = true;
        self
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attrs.push(attr.into());
        self
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.ret = Some(ty.into());
        self
    }

    pub fn body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }
}

impl From<FnDecl> for Item {
    fn from(f: FnDecl) -> Self {
        Item::Fn(f)
    }
}

impl From<ConstDecl> for Item {
    fn from(c: ConstDecl) -> Self {
        Item::Const(c)
    }
}

impl From<StructDecl> for Item {
    fn from(s: StructDecl) -> Self {
        Item::Struct(s)
    }
}

/// One statement or expression line inside a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Line(String),
    Blank,
    /// `open` line, indented `body`, then `close` (skipped when empty).
    Block {
        open: String,
        body: Vec<Stmt>,
        close: String,
    },
}

impl Stmt {
    pub fn line(s: impl Into<String>) -> Self {
        Self::Line(s.into())
    }

    /// `head {` ... `}`
    pub fn braced(head: impl AsRef<str>, body: Vec<Stmt>) -> Self {
        Self::Block {
            open: format!("{} {{", head.as_ref()),
            body,
            close: "}".into(),
        }
    }

    pub fn block(open: impl Into<String>, body: Vec<Stmt>, close: impl Into<String>) -> Self {
        Self::Block {
            open: open.into(),
            body,
            close: close.into(),
        }
    }
}
