//! Loader tables for values and operations.
//!
//! A [`Registry`] maps every wire marker, operation tag and grammar keyword to
//! a pair of constructor functions: one decoding the binary form from a
//! [`ByteStream`], one parsing the textual form from a [`Parser`]. Composite
//! loaders recurse through the registry for their children, so the registry
//! is the single place that knows every concrete grammar.
//!
//! Build one with [`Registry::standard`] and pass it to parsers and loaders;
//! there is no global instance.

use std::collections::HashMap;

use cairn_foundation::encode::{CHARACTER_WIDTH, NUMBER_WIDTH, TAG_WIDTH};
use cairn_foundation::{
    Block, ByteStream, Error, ErrorCode, ErrorContext, FORMAT_VERSION, MAX_NESTING, Operation, OperationType,
    PartialBind, Result, Set, Table, Tuple, Value, ValueType,
};

use crate::parser::Parser;
use crate::token::TokenKind;

/// Decodes a value whose marker has already been consumed.
pub type ValueDecodeFn = fn(&Registry, &mut ByteStream<'_>) -> Result<Value>;
/// Parses a value payload whose keyword has already been consumed.
pub type ValueParseFn = fn(&mut Parser<'_>) -> Option<Value>;
/// Decodes an operation whose tag has already been consumed.
pub type OperationDecodeFn = fn(&Registry, OperationType, &mut ByteStream<'_>) -> Result<Operation>;
/// Parses an operation whose keyword has already been consumed.
pub type OperationParseFn = fn(&mut Parser<'_>, OperationType) -> Option<Operation>;

/// Constructors for one value kind.
#[derive(Clone, Copy)]
pub struct ValueLoader {
    /// The kind this loader builds.
    pub value_type: ValueType,
    /// Binary constructor.
    pub decode: ValueDecodeFn,
    /// Textual constructor.
    pub parse: ValueParseFn,
}

/// Constructors for one operation.
#[derive(Clone, Copy)]
pub struct OperationLoader {
    /// The operation this loader builds.
    pub op_type: OperationType,
    /// Binary constructor.
    pub decode: OperationDecodeFn,
    /// Textual constructor.
    pub parse: OperationParseFn,
}

/// Loader tables keyed by marker, tag and keyword.
#[derive(Clone, Default)]
pub struct Registry {
    values_by_marker: HashMap<u8, ValueLoader>,
    values_by_keyword: HashMap<&'static str, ValueLoader>,
    operations_by_tag: HashMap<u32, OperationLoader>,
    operations_by_keyword: HashMap<&'static str, OperationLoader>,
}

impl Registry {
    /// Creates a registry with no loaders.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in value kind and operation.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for (value_type, decode, parse) in STANDARD_VALUES {
            registry.register_value(ValueLoader {
                value_type: *value_type,
                decode: *decode,
                parse: *parse,
            });
        }
        for op_type in OperationType::ALL {
            let (decode, parse) = standard_operation(*op_type);
            registry.register_operation(OperationLoader {
                op_type: *op_type,
                decode,
                parse,
            });
        }
        registry
    }

    /// Registers or replaces the loader for a value kind.
    pub fn register_value(&mut self, loader: ValueLoader) {
        if let Some(marker) = loader.value_type.marker() {
            self.values_by_marker.insert(marker, loader);
        }
        self.values_by_keyword
            .insert(loader.value_type.keyword(), loader);
    }

    /// Registers or replaces the loader for an operation.
    pub fn register_operation(&mut self, loader: OperationLoader) {
        self.operations_by_tag.insert(loader.op_type.tag(), loader);
        self.operations_by_keyword
            .insert(loader.op_type.keyword(), loader);
    }

    /// Looks up a value loader by wire marker.
    #[must_use]
    pub fn value_by_marker(&self, marker: u8) -> Option<&ValueLoader> {
        self.values_by_marker.get(&marker)
    }

    /// Looks up a value loader by grammar keyword.
    #[must_use]
    pub fn value_by_keyword(&self, keyword: &str) -> Option<&ValueLoader> {
        self.values_by_keyword.get(keyword)
    }

    /// Looks up an operation loader by numeric tag.
    #[must_use]
    pub fn operation_by_tag(&self, tag: u32) -> Option<&OperationLoader> {
        self.operations_by_tag.get(&tag)
    }

    /// Looks up an operation loader by grammar keyword.
    #[must_use]
    pub fn operation_by_keyword(&self, keyword: &str) -> Option<&OperationLoader> {
        self.operations_by_keyword.get(keyword)
    }

    // =========================================================================
    // Binary decoding
    // =========================================================================

    /// Reads and checks the image version byte.
    ///
    /// # Errors
    /// Returns a version mismatch or decode error.
    pub fn read_header(&self, stream: &mut ByteStream<'_>) -> Result<()> {
        let found = stream.next_byte()?;
        if found == FORMAT_VERSION {
            Ok(())
        } else {
            Err(Error::version_mismatch(FORMAT_VERSION, found))
        }
    }

    /// Reads one `'name'` + value pair.
    ///
    /// # Errors
    /// Returns a decode error on malformed input. Once the name is read, the
    /// error carries it as context.
    pub fn decode_entry(&self, stream: &mut ByteStream<'_>) -> Result<(String, Value)> {
        let name = stream.read_identifier()?;
        match self.decode_value(stream) {
            Ok(value) => Ok((name, value)),
            Err(err) => Err(err.with_context(ErrorContext::new().with_value(name))),
        }
    }

    /// Reads one marker-prefixed value.
    ///
    /// # Errors
    /// Returns a decode error on an unknown marker, a malformed payload, or
    /// nesting deeper than [`MAX_NESTING`].
    pub fn decode_value(&self, stream: &mut ByteStream<'_>) -> Result<Value> {
        stream.enter()?;
        let value = self.decode_value_inner(stream);
        stream.leave();
        value
    }

    fn decode_value_inner(&self, stream: &mut ByteStream<'_>) -> Result<Value> {
        let offset = stream.offset();
        let marker = stream.next_byte()?;
        let loader = self
            .value_by_marker(marker)
            .ok_or_else(|| Error::decode(offset, format!("unknown value marker {marker:#04x}")))?;
        (loader.decode)(self, stream)
    }

    /// Reads one tag-prefixed operation.
    ///
    /// # Errors
    /// Returns a decode error on an unknown tag, a malformed payload, or
    /// nesting deeper than [`MAX_NESTING`].
    pub fn decode_operation(&self, stream: &mut ByteStream<'_>) -> Result<Operation> {
        stream.enter()?;
        let operation = self.decode_operation_inner(stream);
        stream.leave();
        operation
    }

    fn decode_operation_inner(&self, stream: &mut ByteStream<'_>) -> Result<Operation> {
        let offset = stream.offset();
        let raw = stream.read_number(TAG_WIDTH)?;
        let loader = u32::try_from(raw)
            .ok()
            .and_then(|tag| self.operation_by_tag(tag))
            .ok_or_else(|| Error::decode(offset, format!("unknown operation tag {raw}")))?;
        (loader.decode)(self, loader.op_type, stream)
    }

    /// Reads a count followed by that many values.
    ///
    /// # Errors
    /// Returns a decode error on malformed input.
    pub fn decode_tuple_payload(&self, stream: &mut ByteStream<'_>) -> Result<Tuple> {
        let count = stream.read_length()?;
        let mut tuple = Tuple::new();
        for _ in 0..count {
            tuple.push(self.decode_value(stream)?);
        }
        Ok(tuple)
    }

    /// Reads a count followed by that many key/value pairs.
    ///
    /// # Errors
    /// Returns a decode error on malformed input.
    pub fn decode_table_payload(&self, stream: &mut ByteStream<'_>) -> Result<Table> {
        let count = stream.read_length()?;
        let mut table = Table::new();
        for _ in 0..count {
            let key = self.decode_value(stream)?;
            let value = self.decode_value(stream)?;
            table.insert(key, value);
        }
        Ok(table)
    }

    /// Reads a count followed by that many set members.
    ///
    /// # Errors
    /// Returns a decode error on malformed input.
    pub fn decode_set_payload(&self, stream: &mut ByteStream<'_>) -> Result<Set> {
        let count = stream.read_length()?;
        let mut set = Set::new();
        for _ in 0..count {
            set.insert(self.decode_value(stream)?);
        }
        Ok(set)
    }

    /// Reads a block body: slot names then operations.
    ///
    /// # Errors
    /// Returns a decode error on malformed input.
    pub fn decode_block(&self, stream: &mut ByteStream<'_>) -> Result<Block> {
        let slot_count = stream.read_length()?;
        let mut slots = Vec::new();
        for _ in 0..slot_count {
            slots.push(stream.read_identifier()?);
        }
        let op_count = stream.read_length()?;
        let mut ops = Vec::new();
        for _ in 0..op_count {
            ops.push(self.decode_operation(stream)?);
        }
        Ok(Block::with_slots(slots, ops))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("values", &self.values_by_keyword.len())
            .field("operations", &self.operations_by_keyword.len())
            .finish()
    }
}

// =============================================================================
// Value loaders
// =============================================================================

type StandardValue = (ValueType, ValueDecodeFn, ValueParseFn);

const STANDARD_VALUES: &[StandardValue] = &[
    (ValueType::Empty, decode_empty, parse_empty),
    (ValueType::Number, decode_number, parse_number),
    (ValueType::Boolean, decode_boolean, parse_boolean),
    (ValueType::Character, decode_character, parse_character),
    (ValueType::String, decode_string, parse_string),
    (ValueType::Atom, decode_atom, parse_atom),
    (ValueType::Error, decode_error, parse_error),
    (ValueType::Type, decode_type, parse_type),
    (ValueType::Tuple, decode_tuple, parse_tuple),
    (ValueType::Table, decode_table, parse_table),
    (ValueType::Set, decode_set, parse_set),
    (ValueType::Operation, decode_operation_value, parse_operation_value),
    (ValueType::Block, decode_operation_value, parse_block_value),
    (ValueType::Bind, decode_operation_value, parse_bind_value),
];

fn decode_empty(_: &Registry, _: &mut ByteStream<'_>) -> Result<Value> {
    Ok(Value::Empty)
}

fn parse_empty(_: &mut Parser<'_>) -> Option<Value> {
    Some(Value::Empty)
}

fn decode_number(_: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    Ok(Value::Number(stream.read_number(NUMBER_WIDTH)?))
}

fn parse_number(parser: &mut Parser<'_>) -> Option<Value> {
    parser.expect_integer().map(Value::Number)
}

fn decode_boolean(_: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    Ok(Value::Boolean(stream.read_boolean()?))
}

fn parse_boolean(parser: &mut Parser<'_>) -> Option<Value> {
    if parser.next_if_word("true") {
        Some(Value::Boolean(true))
    } else if parser.next_if_word("false") {
        Some(Value::Boolean(false))
    } else {
        parser.fail("expected 'true' or 'false'")
    }
}

fn decode_character(_: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    let code = stream.read_number(CHARACTER_WIDTH)?;
    // A 4-byte read always fits.
    Ok(Value::Character(u32::try_from(code).unwrap_or(u32::MAX)))
}

fn parse_character(parser: &mut Parser<'_>) -> Option<Value> {
    match *parser.peek() {
        TokenKind::Character(code) => {
            parser.advance();
            Some(Value::Character(code))
        }
        TokenKind::Integer(n) => {
            parser.advance();
            match u32::try_from(n) {
                Ok(code) => Some(Value::Character(code)),
                Err(_) => parser.fail(format!("character code {n} does not fit in 32 bits")),
            }
        }
        _ => parser.fail("expected character literal or code"),
    }
}

fn decode_string(_: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    Ok(Value::String(stream.read_data()?))
}

fn parse_string(parser: &mut Parser<'_>) -> Option<Value> {
    parser.expect_string().map(Value::String)
}

fn decode_atom(_: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    // The opening delimiter doubles as the marker.
    Ok(Value::Atom(stream.read_identifier_body()?))
}

fn parse_atom(parser: &mut Parser<'_>) -> Option<Value> {
    parser.expect_identifier("atom name").map(Value::Atom)
}

fn decode_error(_: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    let offset = stream.offset();
    let byte = stream.next_byte()?;
    ErrorCode::from_byte(byte)
        .map(Value::Error)
        .ok_or_else(|| Error::decode(offset, format!("unknown error code {byte}")))
}

fn parse_error(parser: &mut Parser<'_>) -> Option<Value> {
    let token = parser.expect_identifier("error code")?;
    match token.parse::<ErrorCode>() {
        Ok(code) => Some(Value::Error(code)),
        Err(err) => parser.fail(err.to_string()),
    }
}

fn decode_type(_: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    let offset = stream.offset();
    let byte = stream.next_byte()?;
    ValueType::from_code(byte)
        .map(Value::Type)
        .ok_or_else(|| Error::decode(offset, format!("unknown type code {byte}")))
}

fn parse_type(parser: &mut Parser<'_>) -> Option<Value> {
    let keyword = parser.expect_identifier("type name")?;
    match ValueType::from_keyword(&keyword) {
        Some(t) => Some(Value::Type(t)),
        None => parser.fail(format!("unknown type '{keyword}'")),
    }
}

fn decode_tuple(registry: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    registry.decode_tuple_payload(stream).map(Value::Tuple)
}

fn parse_tuple(parser: &mut Parser<'_>) -> Option<Value> {
    parse_tuple_body(parser).map(Value::Tuple)
}

fn decode_table(registry: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    registry.decode_table_payload(stream).map(Value::Table)
}

fn parse_table(parser: &mut Parser<'_>) -> Option<Value> {
    parse_table_body(parser).map(Value::Table)
}

fn decode_set(registry: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    registry.decode_set_payload(stream).map(Value::Set)
}

fn parse_set(parser: &mut Parser<'_>) -> Option<Value> {
    let items = parse_list(parser, TokenKind::LBracket, TokenKind::RBracket, |p| {
        p.parse_value_payload()
    })?;
    Some(Value::Set(items.into_iter().collect()))
}

fn decode_operation_value(registry: &Registry, stream: &mut ByteStream<'_>) -> Result<Value> {
    registry.decode_operation(stream).map(Value::from)
}

fn parse_operation_value(parser: &mut Parser<'_>) -> Option<Value> {
    parser.parse_operation().map(Value::from)
}

fn parse_block_value(parser: &mut Parser<'_>) -> Option<Value> {
    parse_block_body(parser).map(Value::operation)
}

fn parse_bind_value(parser: &mut Parser<'_>) -> Option<Value> {
    let value = parser.parse_value_payload()?;
    let target = parser.parse_value_payload()?;
    match target {
        Value::Operation(callable) => Some(Value::operation(PartialBind::new(value, *callable))),
        other => parser.fail(format!("cannot bind to a non-callable {}", other.value_type())),
    }
}

// =============================================================================
// Shared grammar pieces
// =============================================================================

/// Parses `open item, item, close` with an optional trailing comma.
fn parse_list<T>(
    parser: &mut Parser<'_>,
    open: TokenKind,
    close: TokenKind,
    mut item: impl FnMut(&mut Parser<'_>) -> Option<T>,
) -> Option<Vec<T>> {
    parser.expect(&open)?;
    let mut items = Vec::new();
    while !parser.next_if(&close) {
        items.push(item(parser)?);
        if !parser.next_if(&TokenKind::Comma) {
            parser.expect(&close)?;
            break;
        }
    }
    Some(items)
}

/// Parses `(v, v,)`.
fn parse_tuple_body(parser: &mut Parser<'_>) -> Option<Tuple> {
    parse_list(parser, TokenKind::LParen, TokenKind::RParen, |p| {
        p.parse_value_payload()
    })
    .map(Tuple::from)
}

/// Parses `[k -> v, k -> v,]`.
fn parse_table_body(parser: &mut Parser<'_>) -> Option<Table> {
    let pairs = parse_list(parser, TokenKind::LBracket, TokenKind::RBracket, |p| {
        let key = p.parse_value_payload()?;
        p.expect(&TokenKind::Arrow)?;
        let value = p.parse_value_payload()?;
        Some((key, value))
    })?;
    Some(pairs.into_iter().collect())
}

/// Parses `[slots a, b] { op; op, op }`.
fn parse_block_body(parser: &mut Parser<'_>) -> Option<Block> {
    let mut slots = Vec::new();
    if parser.next_if_word("slots") {
        loop {
            slots.push(parser.expect_identifier("slot name")?);
            if !parser.next_if(&TokenKind::Comma) {
                break;
            }
        }
    }
    parser.expect(&TokenKind::LBrace)?;
    let mut ops = Vec::new();
    loop {
        if parser.next_if(&TokenKind::RBrace) {
            break;
        }
        if parser.is_at_end() {
            return parser.fail("unterminated block");
        }
        ops.push(parser.parse_operation()?);
        if !parser.next_if(&TokenKind::Comma) {
            parser.next_if(&TokenKind::Semicolon);
        }
    }
    Some(Block::with_slots(slots, ops))
}

// =============================================================================
// Operation loaders
// =============================================================================

fn standard_operation(op_type: OperationType) -> (OperationDecodeFn, OperationParseFn) {
    match op_type {
        OperationType::Push => (decode_push, parse_push),
        OperationType::IfTrue => (decode_if_true, parse_if_true),
        OperationType::Select => (decode_select, parse_select),
        OperationType::Load
        | OperationType::Store
        | OperationType::Clear
        | OperationType::LoadSlot
        | OperationType::StoreSlot => (decode_named, parse_named),
        OperationType::Call => (decode_call, parse_call),
        OperationType::LoadNative => (decode_load_native, parse_load_native),
        OperationType::Native => (decode_native, parse_native),
        OperationType::Block => (decode_block, parse_block),
        OperationType::PartialBind => (decode_partial, parse_partial),
        _ => (decode_nullary, parse_nullary),
    }
}

fn decode_nullary(_: &Registry, op_type: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    Operation::nullary(op_type).ok_or_else(|| {
        Error::decode(stream.offset(), format!("operation {op_type} needs a payload"))
    })
}

fn parse_nullary(parser: &mut Parser<'_>, op_type: OperationType) -> Option<Operation> {
    match Operation::nullary(op_type) {
        Some(op) => Some(op),
        None => parser.fail(format!("operation {op_type} needs a payload")),
    }
}

fn decode_push(registry: &Registry, _: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    registry.decode_value(stream).map(Operation::Push)
}

fn parse_push(parser: &mut Parser<'_>, _: OperationType) -> Option<Operation> {
    parser.parse_value_payload().map(Operation::Push)
}

fn decode_if_true(registry: &Registry, _: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    let inner = registry.decode_operation(stream)?;
    Ok(Operation::IfTrue(Box::new(inner)))
}

fn parse_if_true(parser: &mut Parser<'_>, _: OperationType) -> Option<Operation> {
    let inner = parser.parse_operation()?;
    Some(Operation::IfTrue(Box::new(inner)))
}

fn decode_select(registry: &Registry, _: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    let cases = registry.decode_table_payload(stream)?;
    let otherwise = if stream.read_boolean()? {
        Some(Box::new(registry.decode_operation(stream)?))
    } else {
        None
    };
    Ok(Operation::Select { cases, otherwise })
}

fn parse_select(parser: &mut Parser<'_>, _: OperationType) -> Option<Operation> {
    let cases = parse_table_body(parser)?;
    let otherwise = if parser.next_if_word("else") {
        Some(Box::new(parser.parse_operation()?))
    } else {
        None
    };
    Some(Operation::Select { cases, otherwise })
}

fn named(op_type: OperationType, name: String) -> Option<Operation> {
    match op_type {
        OperationType::Load => Some(Operation::Load(name)),
        OperationType::Store => Some(Operation::Store(name)),
        OperationType::Clear => Some(Operation::Clear(name)),
        OperationType::LoadSlot => Some(Operation::LoadSlot(name)),
        OperationType::StoreSlot => Some(Operation::StoreSlot(name)),
        _ => None,
    }
}

fn decode_named(_: &Registry, op_type: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    let offset = stream.offset();
    let name = stream.read_identifier()?;
    named(op_type, name)
        .ok_or_else(|| Error::decode(offset, format!("operation {op_type} takes no name")))
}

fn parse_named(parser: &mut Parser<'_>, op_type: OperationType) -> Option<Operation> {
    let name = parser.expect_identifier("name")?;
    match named(op_type, name) {
        Some(op) => Some(op),
        None => parser.fail(format!("operation {op_type} takes no name")),
    }
}

fn decode_call(registry: &Registry, _: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    let target = stream.read_identifier()?;
    let args = registry.decode_tuple_payload(stream)?;
    Ok(Operation::Call { target, args })
}

fn parse_call(parser: &mut Parser<'_>, _: OperationType) -> Option<Operation> {
    let target = parser.expect_identifier("call target")?;
    let args = if matches!(parser.peek(), TokenKind::LParen) {
        parse_tuple_body(parser)?
    } else {
        Tuple::new()
    };
    Some(Operation::Call { target, args })
}

fn decode_load_native(_: &Registry, _: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    Ok(Operation::LoadNative(stream.read_data()?))
}

fn parse_load_native(parser: &mut Parser<'_>, _: OperationType) -> Option<Operation> {
    parser.expect_string().map(Operation::LoadNative)
}

fn decode_native(_: &Registry, _: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    let bucket = stream.read_identifier()?;
    let name = stream.read_identifier()?;
    Ok(Operation::Native { bucket, name })
}

fn parse_native(parser: &mut Parser<'_>, _: OperationType) -> Option<Operation> {
    let bucket = parser.expect_identifier("native bucket")?;
    let name = parser.expect_identifier("native operation")?;
    Some(Operation::Native { bucket, name })
}

fn decode_block(registry: &Registry, _: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    registry.decode_block(stream).map(Operation::Block)
}

fn parse_block(parser: &mut Parser<'_>, _: OperationType) -> Option<Operation> {
    parse_block_body(parser).map(Operation::Block)
}

fn decode_partial(registry: &Registry, _: OperationType, stream: &mut ByteStream<'_>) -> Result<Operation> {
    let value = registry.decode_value(stream)?;
    let callable = registry.decode_operation(stream)?;
    Ok(Operation::PartialBind(PartialBind::new(value, callable)))
}

fn parse_partial(parser: &mut Parser<'_>, _: OperationType) -> Option<Operation> {
    let value = parser.parse_value_payload()?;
    let callable = parser.parse_operation()?;
    Some(Operation::PartialBind(PartialBind::new(value, callable)))
}
