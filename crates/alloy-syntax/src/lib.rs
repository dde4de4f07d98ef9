//! Building and printing Alloy configuration source.
//!
//! Alloy configuration files are a sequence of blocks and attributes:
//!
//! ```text
//! otelcol.exporter.otlp "default" {
//!     client {
//!         endpoint = "database:4317"
//!     }
//! }
//! ```
//!
//! This crate provides a small AST for that shape ([`File`], [`Body`],
//! [`Block`], [`Attribute`] and [`Expr`]) and a formatter which renders it the
//! way `alloy fmt` does: tab indentation, `=` aligned across consecutive
//! attributes and blank lines around nested blocks.
//!
//! Expressions can carry a placeholder type `P`. Placeholders stand for values
//! that are only known after the whole tree has been built (for example a
//! reference to a block that is emitted later). They must be replaced with
//! [`Body::resolve_placeholders`] before rendering; printing a tree which
//! still contains one fails with [`RenderError::UnresolvedPlaceholder`].
//!
//! # Usage
//!
//! ```
//! use alloy_syntax::{Block, Expr, File};
//!
//! let mut file: File = File::new();
//! let mut block = Block::new(["otelcol", "processor", "batch"], "default");
//! block.body_mut().append_attr("timeout", Expr::string("1s"));
//! file.body_mut().append_block(block);
//!
//! assert_eq!(
//!     file.render().unwrap(),
//!     "otelcol.processor.batch \"default\" {\n\ttimeout = \"1s\"\n}\n"
//! );
//! ```

pub mod ast;
mod ident;
mod printer;

pub use ast::{Attribute, Block, Body, Expr, File, Stmt};
pub use ident::{is_valid_identifier, sanitize_identifier};
pub use printer::RenderError;
