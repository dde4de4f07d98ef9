use std::fmt::{Debug, Write as _};

use crate::ast::{Block, Body, Expr, File, Stmt};
use crate::ident::is_valid_identifier;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unresolved placeholder {0}")]
    UnresolvedPlaceholder(String),
    #[error("invalid block name {0:?}")]
    InvalidBlockName(String),
}

impl<P: Debug> File<P> {
    /// Renders the file as formatted Alloy source.
    pub fn render(&self) -> Result<String, RenderError> {
        let mut gen = Generator::new();
        gen.writer().body(self.body())?;
        Ok(gen.buf)
    }
}

impl<P: Debug> Block<P> {
    /// Renders a single block, e.g. for use in messages.
    pub fn render(&self) -> Result<String, RenderError> {
        let mut gen = Generator::new();
        gen.writer().block(self)?;
        gen.buf.push('\n');
        Ok(gen.buf)
    }
}

struct Generator {
    buf: String,
    at_linestart: bool,
}

impl Generator {
    fn new() -> Self {
        Self {
            buf: "".into(),
            at_linestart: true,
        }
    }

    fn writer(&mut self) -> Writer {
        Writer {
            buf: &mut self.buf,
            at_linestart: &mut self.at_linestart,
            indent: 0,
        }
    }
}

struct Writer<'a> {
    buf: &'a mut String,
    at_linestart: &'a mut bool,
    indent: i32,
}

impl<'a> Writer<'a> {
    fn indent(&mut self) -> Writer {
        Writer {
            buf: &mut self.buf,
            at_linestart: &mut self.at_linestart,
            indent: self.indent + 1,
        }
    }

    fn newline(&mut self) {
        self.buf.push('\n');
        *self.at_linestart = true;
    }

    fn write(&mut self, str: &str) {
        if *self.at_linestart {
            for _i in 0..self.indent {
                self.buf.push('\t');
            }
        }
        self.buf.push_str(str);

        *self.at_linestart = str.ends_with('\n');
    }

    fn body<P: Debug>(&mut self, body: &Body<P>) -> Result<(), RenderError> {
        let stmts = body.stmts();
        let widths = attr_widths(stmts);

        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                let prev_is_block = matches!(stmts[i - 1], Stmt::Block(_));
                if prev_is_block || matches!(stmt, Stmt::Block(_)) {
                    self.newline();
                }
            }

            match stmt {
                Stmt::Attribute(attr) => {
                    self.write(&format!("{:width$} = ", attr.name, width = widths[i]));
                    self.expr(&attr.value)?;
                }
                Stmt::Block(block) => self.block(block)?,
            }
            self.newline();
        }
        Ok(())
    }

    fn block<P: Debug>(&mut self, block: &Block<P>) -> Result<(), RenderError> {
        if block.name.is_empty() || !block.name.iter().all(|n| is_valid_identifier(n)) {
            return Err(RenderError::InvalidBlockName(block.name_path()));
        }

        self.write(&block.name_path());
        if let Some(label) = &block.label {
            self.write(" ");
            self.write(&quote(label));
        }

        if block.body().is_empty() {
            self.write(" { }");
            return Ok(());
        }

        self.write(" {");
        self.newline();
        self.indent().body(block.body())?;
        self.write("}");
        Ok(())
    }

    fn expr<P: Debug>(&mut self, expr: &Expr<P>) -> Result<(), RenderError> {
        match expr {
            Expr::String(s) => self.write(&quote(s)),
            Expr::Int(i) => self.write(&i.to_string()),
            Expr::Float(f) => self.write(&f.to_string()),
            Expr::Bool(b) => self.write(if *b { "true" } else { "false" }),
            Expr::Null => self.write("null"),
            Expr::Raw(raw) => self.write(raw),
            Expr::Placeholder(p) => {
                return Err(RenderError::UnresolvedPlaceholder(format!("{:?}", p)))
            }
            Expr::Array(items) => {
                self.write("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.expr(item)?;
                }
                self.write("]");
            }
            Expr::Object(fields) if fields.is_empty() => self.write("{}"),
            Expr::Object(fields) => {
                let keys: Vec<String> = fields.iter().map(|(k, _)| object_key(k)).collect();
                let width = keys.iter().map(|k| k.len()).max().unwrap_or(0);

                self.write("{");
                self.newline();
                {
                    let mut w = self.indent();
                    for (key, (_, value)) in keys.iter().zip(fields) {
                        w.write(&format!("{:width$} = ", key, width = width));
                        w.expr(value)?;
                        w.write(",");
                        w.newline();
                    }
                }
                self.write("}");
            }
        }
        Ok(())
    }
}

/// Computes the padded name width for every statement. Consecutive
/// attributes share the width of their longest name; blocks get zero.
fn attr_widths<P>(stmts: &[Stmt<P>]) -> Vec<usize> {
    let mut widths = vec![0; stmts.len()];
    let mut run_start = 0;
    for i in 0..=stmts.len() {
        let is_attr = matches!(stmts.get(i), Some(Stmt::Attribute(_)));
        if is_attr {
            continue;
        }
        let width = stmts[run_start..i]
            .iter()
            .map(|s| match s {
                Stmt::Attribute(a) => a.name.len(),
                Stmt::Block(_) => 0,
            })
            .max()
            .unwrap_or(0);
        for w in &mut widths[run_start..i] {
            *w = width;
        }
        run_start = i + 1;
    }
    widths
}

fn object_key(key: &str) -> String {
    if is_valid_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Quotes `s` as an Alloy string literal.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;
    use crate::ast::Block;

    fn otlp_receiver() -> Block {
        let mut block = Block::new(["otelcol", "receiver", "otlp"], "default");
        let mut grpc = Block::unlabeled(["grpc"]);
        grpc.body_mut().append_attr("endpoint", "0.0.0.0:4317");
        block.body_mut().append_block(grpc);

        let mut output = Block::unlabeled(["output"]);
        let next = Expr::Array(vec![Expr::raw("otelcol.processor.batch.default.input")]);
        output.body_mut().append_attr("metrics", next.clone());
        output.body_mut().append_attr("traces", next);
        block.body_mut().append_block(output);
        block
    }

    #[test]
    fn test_render_file() {
        let mut file: File = File::new();
        file.body_mut().append_block(otlp_receiver());
        file.body_mut()
            .append_block(Block::new(["otelcol", "processor", "batch"], "default"));

        let want = r#"otelcol.receiver.otlp "default" {
	grpc {
		endpoint = "0.0.0.0:4317"
	}

	output {
		metrics = [otelcol.processor.batch.default.input]
		traces  = [otelcol.processor.batch.default.input]
	}
}

otelcol.processor.batch "default" { }
"#;
        assert_eq!(file.render().unwrap(), want);
    }

    #[test]
    fn test_render_attributes_and_objects() {
        let mut block: Block = Block::unlabeled(["client"]);
        block.body_mut().append_attr("endpoint", "db:4317");
        block.body_mut().append_attr(
            "headers",
            Expr::Object(vec![
                ("X-Scope-OrgID".to_string(), Expr::string("tenant")),
                ("team".to_string(), Expr::string("a\"b")),
            ]),
        );
        let mut tls = Block::unlabeled(["tls"]);
        tls.body_mut().append_attr("insecure", true);
        block.body_mut().append_block(tls);
        block.body_mut().append_attr("compression", "gzip");

        let want = r#"client {
	endpoint = "db:4317"
	headers  = {
		"X-Scope-OrgID" = "tenant",
		team            = "a\"b",
	}

	tls {
		insecure = true
	}

	compression = "gzip"
}
"#;
        assert_eq!(block.render().unwrap(), want);
    }

    #[test]
    fn test_render_unresolved_placeholder() {
        let mut file: File<&str> = File::new();
        let mut block = Block::new(["otelcol", "exporter", "otlp"], "default");
        block.body_mut().append_attr("auth", Expr::Placeholder("basicauth"));
        file.body_mut().append_block(block);

        assert_eq!(
            file.render(),
            Err(RenderError::UnresolvedPlaceholder("\"basicauth\"".to_string()))
        );
    }

    #[test]
    fn test_render_invalid_block_name() {
        let mut file: File = File::new();
        file.body_mut()
            .append_block(Block::new(["otelcol", "receiver", "my-receiver"], "default"));
        assert_eq!(
            file.render(),
            Err(RenderError::InvalidBlockName(
                "otelcol.receiver.my-receiver".to_string()
            ))
        );
    }

    #[test]
    fn test_quote() {
        let tests = vec![
            ("plain", "\"plain\""),
            ("${env:FOO}", "\"${env:FOO}\""),
            ("a\\b", "\"a\\\\b\""),
            ("line\nbreak", "\"line\\nbreak\""),
        ];
        for (input, want) in tests {
            assert_eq!(quote(input), want, "input {:?}", input);
        }
    }
}
