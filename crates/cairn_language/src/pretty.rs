//! Pretty-printer for values and operations.
//!
//! This module renders values back to Cairn assembly source. Parsing the
//! output again yields an equal value, so the printer doubles as the
//! disassembler for binary images.
//!
//! # Example
//!
//! ```
//! use cairn_foundation::{Operation, Value};
//! use cairn_language::pretty::pretty_value;
//!
//! let block = Value::block(vec!["n".into()], vec![Operation::LoadSlot("n".into())]);
//! assert_eq!(pretty_value(&block), "block slots n { loadslot n }");
//! ```

use std::fmt::Write;

use cairn_foundation::{Block, Operation, PartialBind, Table, Tuple, Value};

/// Configuration for pretty-printing.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Number of spaces for each indentation level.
    pub indent_width: usize,
    /// Whether blocks put each operation on its own line.
    pub multi_line_blocks: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            multi_line_blocks: false,
        }
    }
}

impl PrettyConfig {
    /// Layout used for disassembly listings.
    #[must_use]
    pub fn listing() -> Self {
        Self {
            multi_line_blocks: true,
            ..Self::default()
        }
    }
}

/// Pretty-print a value payload to a string.
#[must_use]
pub fn pretty_value(value: &Value) -> String {
    pretty_value_with_config(value, PrettyConfig::default())
}

/// Pretty-print a value payload with custom configuration.
#[must_use]
pub fn pretty_value_with_config(value: &Value, config: PrettyConfig) -> String {
    let mut printer = PrettyPrinter::new(config);
    printer.value(value);
    printer.output
}

/// Pretty-print an operation to a string.
#[must_use]
pub fn pretty_operation(op: &Operation) -> String {
    let mut printer = PrettyPrinter::new(PrettyConfig::default());
    printer.operation(op);
    printer.output
}

/// Pretty-print named values as `value <name> <payload>` statements, one per
/// line.
#[must_use]
pub fn pretty_program<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a Value)>,
    config: &PrettyConfig,
) -> String {
    let mut printer = PrettyPrinter::new(config.clone());
    for (name, value) in entries {
        printer.push("value ");
        printer.push(name);
        printer.push(" ");
        printer.value(value);
        printer.push("\n");
    }
    printer.output
}

/// Pretty-printer state.
struct PrettyPrinter {
    config: PrettyConfig,
    output: String,
    indent_level: usize,
}

impl PrettyPrinter {
    fn new(config: PrettyConfig) -> Self {
        Self {
            config,
            output: String::new(),
            indent_level: 0,
        }
    }

    fn push(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn newline(&mut self) {
        self.output.push('\n');
        let width = self.indent_level * self.config.indent_width;
        self.output.extend(std::iter::repeat_n(' ', width));
    }

    fn value(&mut self, value: &Value) {
        match value {
            Value::Empty => self.push("empty"),
            Value::Number(n) => {
                let _ = write!(self.output, "number {n}");
            }
            Value::Boolean(b) => {
                let _ = write!(self.output, "boolean {b}");
            }
            Value::Character(code) => {
                self.push("character ");
                self.character(*code);
            }
            Value::String(s) => {
                self.push("string ");
                self.string(s);
            }
            Value::Atom(name) => {
                self.push("atom ");
                self.push(name);
            }
            Value::Error(code) => {
                let _ = write!(self.output, "error {code}");
            }
            Value::Type(t) => {
                let _ = write!(self.output, "type {t}");
            }
            Value::Tuple(t) => {
                self.push("tuple ");
                self.tuple_body(t);
            }
            Value::Table(t) => {
                self.push("table ");
                self.table_body(t);
            }
            Value::Set(s) => {
                self.push("set [");
                for (i, item) in s.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.value(item);
                }
                self.push("]");
            }
            Value::Operation(op) => self.callable(op),
        }
    }

    /// Writes a callable in value position.
    fn callable(&mut self, op: &Operation) {
        match op {
            Operation::Block(block) => self.block(block),
            Operation::PartialBind(bind) => {
                self.push("bind ");
                self.value(bind.value());
                self.push(" ");
                self.callable(bind.callable());
            }
            other => {
                self.push("operation ");
                self.operation(other);
            }
        }
    }

    fn operation(&mut self, op: &Operation) {
        let keyword = op.operation_type().keyword();
        match op {
            Operation::Push(value) => {
                self.push("push ");
                self.value(value);
            }
            Operation::IfTrue(inner) => {
                self.push("iftrue ");
                self.operation(inner);
            }
            Operation::Select { cases, otherwise } => {
                self.push("select ");
                self.table_body(cases);
                if let Some(otherwise) = otherwise {
                    self.push(" else ");
                    self.operation(otherwise);
                }
            }
            Operation::Load(name)
            | Operation::Store(name)
            | Operation::Clear(name)
            | Operation::LoadSlot(name)
            | Operation::StoreSlot(name) => {
                let _ = write!(self.output, "{keyword} {name}");
            }
            Operation::Call { target, args } => {
                let _ = write!(self.output, "call {target} ");
                self.tuple_body(args);
            }
            Operation::LoadNative(path) => {
                self.push("loadnative ");
                self.string(path);
            }
            Operation::Native { bucket, name } => {
                let _ = write!(self.output, "native {bucket} {name}");
            }
            Operation::Block(block) => self.block(block),
            Operation::PartialBind(bind) => self.partial(bind),
            _ => self.push(keyword),
        }
    }

    fn partial(&mut self, bind: &PartialBind) {
        self.push("partial ");
        self.value(bind.value());
        self.push(" ");
        self.operation(bind.callable());
    }

    fn block(&mut self, block: &Block) {
        self.push("block ");
        if !block.slots().is_empty() {
            self.push("slots ");
            self.push(&block.slots().join(", "));
            self.push(" ");
        }
        self.push("{");
        if block.is_empty() {
            self.push(" }");
            return;
        }
        if self.config.multi_line_blocks {
            self.indent_level += 1;
            for op in block.operations() {
                self.newline();
                self.operation(op);
            }
            self.indent_level -= 1;
            self.newline();
            self.push("}");
        } else {
            for (i, op) in block.operations().iter().enumerate() {
                self.push(if i == 0 { " " } else { "; " });
                self.operation(op);
            }
            self.push(" }");
        }
    }

    fn tuple_body(&mut self, tuple: &Tuple) {
        self.push("(");
        for (i, item) in tuple.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.value(item);
        }
        self.push(")");
    }

    fn table_body(&mut self, table: &Table) {
        self.push("[");
        for (i, (key, value)) in table.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.value(key);
            self.push(" -> ");
            self.value(value);
        }
        self.push("]");
    }

    fn character(&mut self, code: u32) {
        match char::from_u32(code) {
            Some(c) if c.is_ascii_graphic() && c != '\'' && c != '\\' => {
                let _ = write!(self.output, "'{c}'");
            }
            _ => {
                let _ = write!(self.output, "{code}");
            }
        }
    }

    fn string(&mut self, s: &str) {
        self.output.push('"');
        for c in s.chars() {
            match c {
                '"' => self.push("\\\""),
                '\\' => self.push("\\\\"),
                '\n' => self.push("\\n"),
                '\r' => self.push("\\r"),
                '\t' => self.push("\\t"),
                c if c.is_control() => {
                    // Always eight digits so a following hex digit is not absorbed.
                    let _ = write!(self.output, "\\u{:08X}", u32::from(c));
                }
                c => self.output.push(c),
            }
        }
        self.output.push('"');
    }
}
