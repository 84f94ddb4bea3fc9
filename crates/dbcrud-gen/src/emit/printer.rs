//! Renders [`RustFile`] values as source text.

use crate::emit::ir::{ConstDecl, FnDecl, Item, RustFile, Stmt, StructDecl};

const INDENT: &str = "    ";
const MAX_SIGNATURE_WIDTH: usize = 100;

/// Print `file` below `header` (one comment line per entry).
pub fn print_file(header: &str, file: &RustFile) -> String {
    let mut out = String::new();
    out.push_str(header);
    out.push('\n');

    for item in &file.items {
        out.push('\n');
        print_item(&mut out, item);
    }
    out
}

fn print_item(out: &mut String, item: &Item) {
    match item {
        Item::Uses(paths) => {
            for p in paths {
                out.push_str(&format!("use {p};\n"));
            }
        }
        Item::Const(c) => print_const(out, c),
        Item::Struct(s) => print_struct(out, s),
        Item::Fn(f) => print_fn(out, f),
        Item::Mod { attrs, vis, name } => {
            for a in attrs {
                out.push_str(&format!("#[{a}]\n"));
            }
            out.push_str(&format!("{}mod {name};\n", vis.prefix()));
        }
        Item::Reexport(path) => out.push_str(&format!("pub use {path};\n")),
    }
}

fn print_doc(out: &mut String, doc: &[String], indent: usize) {
    for line in doc {
        push_indent(out, indent);
        if line.is_empty() {
            out.push_str("///\n");
        } else {
            out.push_str(&format!("/// {line}\n"));
        }
    }
}

fn print_const(out: &mut String, c: &ConstDecl) {
    print_doc(out, &c.doc, 0);
    out.push_str(&format!(
        "{}const {}: {} = {};\n",
        c.vis.prefix(),
        c.name,
        c.ty,
        c.value
    ));
}

fn print_struct(out: &mut String, s: &StructDecl) {
    if !s.derives.is_empty() {
        out.push_str(&format!("#[derive({})]\n", s.derives.join(", ")));
    }
    out.push_str(&format!("{}struct {} {{\n", s.vis.prefix(), s.name));
    for (name, ty) in &s.fields {
        out.push_str(&format!("{INDENT}{name}: {ty},\n"));
    }
    out.push_str("}\n");
}

fn print_fn(out: &mut String, f: &FnDecl) {
    print_doc(out, &f.doc, 0);
    for a in &f.attrs {
        out.push_str(&format!("#[{a}]\n"));
    }

    let head = format!(
        "{}{}fn {}",
        f.vis.prefix(),
        if f.is_async { "async " } else { "" },
        f.name
    );
    let ret = f
        .ret
        .as_ref()
        .map(|r| format!(" -> {r}"))
        .unwrap_or_default();
    let args: Vec<String> = f.args.iter().map(|a| format!("{}: {}", a.name, a.ty)).collect();

    let single = format!("{head}({}){ret} {{", args.join(", "));
    if single.len() <= MAX_SIGNATURE_WIDTH {
        out.push_str(&single);
        out.push('\n');
    } else {
        out.push_str(&format!("{head}(\n"));
        for a in &args {
            out.push_str(&format!("{INDENT}{a},\n"));
        }
        out.push_str(&format!("){ret} {{\n"));
    }

    print_stmts(out, &f.body, 1);
    out.push_str("}\n");
}

fn print_stmts(out: &mut String, stmts: &[Stmt], indent: usize) {
    for stmt in stmts {
        match stmt {
            Stmt::Blank => out.push('\n'),
            Stmt::Line(text) => {
                for line in text.lines() {
                    push_indent(out, indent);
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Stmt::Block { open, body, close } => {
                push_indent(out, indent);
                out.push_str(open);
                out.push('\n');
                print_stmts(out, body, indent + 1);
                if !close.is_empty() {
                    push_indent(out, indent);
                    out.push_str(close);
                    out.push('\n');
                }
            }
        }
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::ir::{Arg, Vis};
    use pretty_assertions::assert_eq;

    #[test]
    fn prints_items_and_nested_blocks() {
        let mut file = RustFile::new();
        file.push(Item::Uses(vec!["a::B".into(), "c::D".into()]));
        file.push(ConstDecl {
            doc: vec![],
            vis: Vis::Pub,
            name: "X".into(),
            ty: "usize".into(),
            value: "1".into(),
        });
        file.push(
            FnDecl::new("f")
                .doc("Does f.")
                .arg(Arg::new("n", "i64"))
                .returns("bool")
                .body(vec![
                    Stmt::braced(
                        "if n > 0",
                        vec![Stmt::line("return true;")],
                    ),
                    Stmt::line("false"),
                ]),
        );

        assert_eq!(
            print_file("// header", &file),
            "// header

use a::B;
use c::D;

pub const X: usize = 1;

/// Does f.
fn f(n: i64) -> bool {
    if n > 0 {
        return true;
    }
    false
}
"
        );
    }

    #[test]
    fn wraps_long_signatures() {
        let f = FnDecl::new("update_something_with_a_long_name")
            .public()
            .asyncness()
            .arg(Arg::new("db", "&impl GenericClient"))
            .arg(Arg::new("updates", "&Fields"))
            .arg(Arg::new("query", "&Fields"))
            .returns("CrudResult<u64>");
        let mut out = String::new();
        print_fn(&mut out, &f);
        assert_eq!(
            out,
            "pub async fn update_something_with_a_long_name(
    db: &impl GenericClient,
    updates: &Fields,
    query: &Fields,
) -> CrudResult<u64> {
}
"
        );
    }

    #[test]
    fn block_without_close() {
        let mut out = String::new();
        print_stmts(
            &mut out,
            &[Stmt::block("Fields::new()", vec![Stmt::line(".with(\"a\", 1i64)")], "")],
            1,
        );
        assert_eq!(out, "    Fields::new()\n        .with(\"a\", 1i64)\n");
    }
}
