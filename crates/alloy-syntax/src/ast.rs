use std::convert::Infallible;

/// An Alloy expression.
///
/// `P` is the placeholder type. Trees without placeholders use the default,
/// [`Infallible`], which makes [`Expr::Placeholder`] unconstructible.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<P = Infallible> {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Array(Vec<Expr<P>>),
    /// Object literal. Keys keep insertion order.
    Object(Vec<(String, Expr<P>)>),
    /// An expression printed verbatim, such as a traversal
    /// (`otelcol.receiver.otlp.default.output`) or a function call.
    Raw(String),
    /// A value which is not known yet; see [`Body::resolve_placeholders`].
    Placeholder(P),
}

impl<P> Expr<P> {
    pub fn string(s: impl Into<String>) -> Self {
        Expr::String(s.into())
    }

    pub fn raw(s: impl Into<String>) -> Self {
        Expr::Raw(s.into())
    }

    pub fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expr::Array(items.into_iter().map(|s| Expr::String(s.into())).collect())
    }

    fn resolve<F>(&mut self, f: &mut F)
    where
        F: FnMut(&P) -> Option<Expr<P>>,
    {
        match self {
            Expr::Array(items) => items.iter_mut().for_each(|e| e.resolve(f)),
            Expr::Object(fields) => fields.iter_mut().for_each(|(_, e)| e.resolve(f)),
            Expr::Placeholder(p) => {
                if let Some(resolved) = f(p) {
                    *self = resolved;
                }
            }
            _ => {}
        }
    }
}

impl<P> From<&str> for Expr<P> {
    fn from(s: &str) -> Self {
        Expr::String(s.to_string())
    }
}

impl<P> From<String> for Expr<P> {
    fn from(s: String) -> Self {
        Expr::String(s)
    }
}

impl<P> From<bool> for Expr<P> {
    fn from(b: bool) -> Self {
        Expr::Bool(b)
    }
}

impl<P> From<i64> for Expr<P> {
    fn from(i: i64) -> Self {
        Expr::Int(i)
    }
}

impl<P> From<u32> for Expr<P> {
    fn from(i: u32) -> Self {
        Expr::Int(i.into())
    }
}

impl<P> From<f64> for Expr<P> {
    fn from(f: f64) -> Self {
        Expr::Float(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<P = Infallible> {
    pub name: String,
    pub value: Expr<P>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block<P = Infallible> {
    /// The dotted block name, e.g. `["otelcol", "receiver", "otlp"]`.
    pub name: Vec<String>,
    pub label: Option<String>,
    body: Body<P>,
}

impl<P> Block<P> {
    pub fn new<I, S>(name: I, label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into_iter().map(Into::into).collect(),
            label: Some(label.into()),
            body: Body::default(),
        }
    }

    /// Creates a block without a label, as used for nested blocks
    /// (`output { ... }`).
    pub fn unlabeled<I, S>(name: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into_iter().map(Into::into).collect(),
            label: None,
            body: Body::default(),
        }
    }

    pub fn body(&self) -> &Body<P> {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body<P> {
        &mut self.body
    }

    /// The block name joined with dots.
    pub fn name_path(&self) -> String {
        self.name.join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<P = Infallible> {
    Attribute(Attribute<P>),
    Block(Block<P>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body<P = Infallible> {
    stmts: Vec<Stmt<P>>,
}

impl<P> Default for Body<P> {
    fn default() -> Self {
        Self { stmts: Vec::new() }
    }
}

impl<P> Body<P> {
    pub fn stmts(&self) -> &[Stmt<P>] {
        &self.stmts
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn append_attr(&mut self, name: impl Into<String>, value: impl Into<Expr<P>>) {
        self.stmts.push(Stmt::Attribute(Attribute {
            name: name.into(),
            value: value.into(),
        }));
    }

    /// Appends the attribute only when a value is present.
    pub fn append_opt_attr<V>(&mut self, name: impl Into<String>, value: Option<V>)
    where
        V: Into<Expr<P>>,
    {
        if let Some(value) = value {
            self.append_attr(name, value);
        }
    }

    pub fn append_block(&mut self, block: Block<P>) {
        self.stmts.push(Stmt::Block(block));
    }

    /// Moves all statements of `other` to the end of this body.
    pub fn append_body(&mut self, other: Body<P>) {
        self.stmts.extend(other.stmts);
    }

    /// Appends the block unless its body is empty.
    pub fn append_nonempty_block(&mut self, block: Block<P>) {
        if !block.body.is_empty() {
            self.append_block(block);
        }
    }

    /// Iterates over the blocks directly contained in this body.
    pub fn blocks(&self) -> impl Iterator<Item = &Block<P>> {
        self.stmts.iter().filter_map(|s| match s {
            Stmt::Block(b) => Some(b),
            Stmt::Attribute(_) => None,
        })
    }

    /// Replaces placeholders anywhere in this body, including nested blocks.
    ///
    /// `f` returns the replacement expression, or `None` to leave the
    /// placeholder in place.
    pub fn resolve_placeholders<F>(&mut self, mut f: F)
    where
        F: FnMut(&P) -> Option<Expr<P>>,
    {
        self.resolve_with(&mut f);
    }

    fn resolve_with<F>(&mut self, f: &mut F)
    where
        F: FnMut(&P) -> Option<Expr<P>>,
    {
        for stmt in &mut self.stmts {
            match stmt {
                Stmt::Attribute(attr) => attr.value.resolve(f),
                Stmt::Block(block) => block.body.resolve_with(f),
            }
        }
    }
}

/// A whole Alloy file.
#[derive(Debug, Clone, PartialEq)]
pub struct File<P = Infallible> {
    body: Body<P>,
}

impl<P> Default for File<P> {
    fn default() -> Self {
        Self {
            body: Body::default(),
        }
    }
}

impl<P> File<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> &Body<P> {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body<P> {
        &mut self.body
    }
}
