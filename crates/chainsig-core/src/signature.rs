//! Human-readable signature parsing and canonicalisation.
//!
//! Accepts the forms signature tables are usually written in:
//!
//! ```text
//! transfer(address,uint256)
//! transfer(address to, uint amount)
//! function transfer(address to, uint256 amount) external returns (bool)
//! event Transfer(address indexed from, address indexed to, uint256 value)
//! swap((address,uint24) memory params, bytes calldata data)
//! ```
//!
//! and reduces each to a canonical `name(type,type,...)` string: no
//! whitespace, no names, no modifiers, `uint` → `uint256`, `tuple(...)` → `(...)`.

use serde::Serialize;
use std::fmt;

use crate::error::SignatureError;
use crate::selector::Selector;
use crate::types::{Param, ParamType, SignatureKind};

/// Maximum nesting of tuples and array suffixes inside one parameter.
pub const MAX_TYPE_DEPTH: usize = 32;

/// A parsed, canonicalised function or event signature.
///
/// The selector is derived from `human_signature` on construction and the
/// fields are read-only afterwards, so two records with the same canonical
/// text always carry the same selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureRecord {
    kind: SignatureKind,
    /// Canonical `name(type,...)` text. Identity key for deduplication.
    human_signature: String,
    name: String,
    params: Vec<Param>,
    selector: Selector,
    /// Label of the source this signature was first seen in.
    source: String,
}

impl SignatureRecord {
    /// Build a record from already-parsed parts.
    pub fn new(kind: SignatureKind, name: impl Into<String>, params: Vec<Param>) -> Self {
        let name = name.into();
        let human_signature = canonical_text(&name, &params);
        let selector = Selector::compute(kind, &human_signature);
        Self {
            kind,
            human_signature,
            name,
            params,
            selector,
            source: String::new(),
        }
    }

    /// Parse raw signature text of the given kind.
    pub fn parse(kind: SignatureKind, raw: &str) -> Result<Self, SignatureError> {
        let (name, params) = Parser::new(raw, kind).signature()?;
        Ok(Self::new(kind, name, params))
    }

    /// Attach a source label.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn kind(&self) -> SignatureKind {
        self.kind
    }

    /// Canonical `name(type,...)` text.
    pub fn human_signature(&self) -> &str {
        &self.human_signature
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parameter types in declaration order.
    pub fn types(&self) -> Vec<ParamType> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// Number of `indexed` parameters (always 0 for functions).
    pub fn indexed_count(&self) -> usize {
        self.params.iter().filter(|p| p.indexed).count()
    }

    /// Name for the parameter at `idx`: the declared name or `arg{idx}`.
    pub fn param_name(&self, idx: usize) -> String {
        match self.params.get(idx).and_then(|p| p.name.as_deref()) {
            Some(n) => n.to_string(),
            None => format!("arg{idx}"),
        }
    }

    /// Signature text including names and `indexed` markers, for display.
    /// e.g. `Transfer(address indexed from, address indexed to, uint256 value)`
    pub fn display_signature(&self) -> String {
        let parts: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                let mut s = p.ty.to_string();
                if p.indexed {
                    s.push_str(" indexed");
                }
                if let Some(name) = &p.name {
                    s.push(' ');
                    s.push_str(name);
                }
                s
            })
            .collect();
        format!("{}({})", self.name, parts.join(", "))
    }
}

impl fmt::Display for SignatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.human_signature)
    }
}

fn canonical_text(name: &str, params: &[Param]) -> String {
    let types: Vec<String> = params.iter().map(|p| p.ty.to_string()).collect();
    format!("{name}({})", types.join(","))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Parse the digits after `uint` / `int`. `None` means "not a valid width".
fn int_width(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let bits: usize = digits.parse().ok()?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

fn bytes_width(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: usize = digits.parse().ok()?;
    (1..=32).contains(&n).then_some(n)
}

/// Map an elementary type word to its `ParamType`.
fn elementary(word: &str) -> Option<ParamType> {
    Some(match word {
        "address" => ParamType::Address,
        "bool" => ParamType::Bool,
        "string" => ParamType::String,
        "bytes" => ParamType::Bytes,
        "byte" => ParamType::FixedBytes(1),
        "uint" => ParamType::Uint(256),
        "int" => ParamType::Int(256),
        _ => {
            if let Some(d) = word.strip_prefix("uint") {
                ParamType::Uint(int_width(d)?)
            } else if let Some(d) = word.strip_prefix("int") {
                ParamType::Int(int_width(d)?)
            } else if let Some(d) = word.strip_prefix("bytes") {
                ParamType::FixedBytes(bytes_width(d)?)
            } else {
                return None;
            }
        }
    })
}

const FUNCTION_TRAILERS: &[&str] = &[
    "external",
    "public",
    "internal",
    "private",
    "view",
    "pure",
    "payable",
    "nonpayable",
    "virtual",
    "override",
];

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    kind: SignatureKind,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, kind: SignatureKind) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            kind,
        }
    }

    fn err(&self, reason: impl Into<String>) -> SignatureError {
        SignatureError::malformed(self.input, reason)
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, b: u8) -> Result<(), SignatureError> {
        match self.peek() {
            Some(c) if c == b => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.err(format!(
                "expected '{}' at position {}, found '{}'",
                b as char, self.pos, c as char
            ))),
            None => Err(self.err(format!("expected '{}', found end of input", b as char))),
        }
    }

    /// Next run of identifier characters, or `None` if the next byte is not one.
    fn word(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.bytes.len() && is_word_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let input = self.input;
        (self.pos > start).then(|| &input[start..self.pos])
    }

    fn signature(mut self) -> Result<(String, Vec<Param>), SignatureError> {
        if !self.input.is_ascii() {
            return Err(self.err("non-ASCII characters"));
        }
        let mut name = self.word().ok_or_else(|| self.err("missing name"))?;
        if name == "function" || name == "event" {
            let declared = if name == "function" {
                SignatureKind::Function
            } else {
                SignatureKind::Event
            };
            if declared != self.kind {
                return Err(self.err(format!("declared as {declared}, expected {}", self.kind)));
            }
            name = self.word().ok_or_else(|| self.err("missing name"))?;
        }
        if !is_identifier(name) {
            return Err(self.err(format!("invalid name '{name}'")));
        }
        self.expect(b'(')?;
        let params = self.param_list(0, true)?;
        self.trailer()?;
        let layout = ParamType::Tuple(params.iter().map(|p| p.ty.clone()).collect());
        if !layout.layout_fits() {
            return Err(self.err("fixed array lengths overflow the encoded size"));
        }
        Ok((name.to_string(), params))
    }

    /// Parse a comma-separated parameter list. The opening `(` has been
    /// consumed; the closing `)` is consumed here.
    fn param_list(&mut self, depth: usize, top_level: bool) -> Result<Vec<Param>, SignatureError> {
        let mut params = Vec::new();
        if self.peek() == Some(b')') {
            self.pos += 1;
            return Ok(params);
        }
        loop {
            params.push(self.param(depth, top_level)?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    return Ok(params);
                }
                Some(c) => {
                    return Err(self.err(format!(
                        "unexpected '{}' at position {}",
                        c as char, self.pos
                    )))
                }
                None => return Err(self.err("unbalanced parentheses")),
            }
        }
    }

    /// A type followed by optional modifiers and an optional name.
    fn param(&mut self, depth: usize, top_level: bool) -> Result<Param, SignatureError> {
        let ty = self.ty(depth)?;
        let mut param = Param::new(ty);
        while let Some(word) = self.word() {
            match word {
                "memory" | "calldata" | "storage" => {}
                "payable" if param.ty == ParamType::Address => {}
                "indexed" if top_level && self.kind == SignatureKind::Event => {
                    if param.indexed {
                        return Err(self.err("duplicate 'indexed'"));
                    }
                    param.indexed = true;
                }
                "indexed" => return Err(self.err("'indexed' is only valid on event parameters")),
                _ if param.name.is_none() && is_identifier(word) => {
                    param.name = Some(word.to_string());
                }
                _ => return Err(self.err(format!("unexpected token '{word}'"))),
            }
        }
        Ok(param)
    }

    fn ty(&mut self, depth: usize) -> Result<ParamType, SignatureError> {
        if depth >= MAX_TYPE_DEPTH {
            return Err(self.err(format!("type nesting deeper than {MAX_TYPE_DEPTH}")));
        }
        let mut ty = match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                self.tuple_members(depth)?
            }
            Some(_) => {
                let word = self.word().ok_or_else(|| self.err("expected a type"))?;
                if word == "tuple" {
                    self.expect(b'(')?;
                    self.tuple_members(depth)?
                } else {
                    elementary(word)
                        .ok_or_else(|| self.err(format!("unrecognized type '{word}'")))?
                }
            }
            None => return Err(self.err("expected a type, found end of input")),
        };

        let mut nesting = depth;
        while self.peek() == Some(b'[') {
            self.pos += 1;
            nesting += 1;
            if nesting >= MAX_TYPE_DEPTH {
                return Err(self.err(format!("type nesting deeper than {MAX_TYPE_DEPTH}")));
            }
            self.skip_ws();
            let start = self.pos;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            let input = self.input;
            let digits = &input[start..self.pos];
            self.expect(b']')?;
            ty = if digits.is_empty() {
                ParamType::Array(Box::new(ty))
            } else {
                let len: usize = digits
                    .parse()
                    .map_err(|_| self.err(format!("invalid array length '{digits}'")))?;
                if len == 0 {
                    return Err(self.err("zero-length fixed array"));
                }
                ParamType::FixedArray(Box::new(ty), len)
            };
        }
        Ok(ty)
    }

    fn tuple_members(&mut self, depth: usize) -> Result<ParamType, SignatureError> {
        let members = self.param_list(depth + 1, false)?;
        Ok(ParamType::Tuple(members.into_iter().map(|p| p.ty).collect()))
    }

    /// Everything after the closing parenthesis of the parameter list.
    fn trailer(&mut self) -> Result<(), SignatureError> {
        loop {
            if self.peek().is_none() {
                return Ok(());
            }
            let word = self
                .word()
                .ok_or_else(|| self.err(format!("unexpected character at position {}", self.pos)))?;
            match (self.kind, word) {
                (SignatureKind::Function, "returns") => {
                    self.expect(b'(')?;
                    self.param_list(0, false)?;
                }
                (SignatureKind::Function, w) if FUNCTION_TRAILERS.contains(&w) => {}
                (SignatureKind::Event, "anonymous") => {
                    return Err(self.err("anonymous events have no topic selector"))
                }
                _ => return Err(self.err(format!("unexpected trailing token '{word}'"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(s: &str) -> SignatureRecord {
        SignatureRecord::parse(SignatureKind::Function, s).unwrap()
    }

    fn event(s: &str) -> SignatureRecord {
        SignatureRecord::parse(SignatureKind::Event, s).unwrap()
    }

    fn rejects(kind: SignatureKind, s: &str) {
        assert!(
            SignatureRecord::parse(kind, s).is_err(),
            "expected '{s}' to be rejected"
        );
    }

    #[test]
    fn canonical_form_is_stable() {
        let r = func("transfer(address,uint256)");
        assert_eq!(r.human_signature(), "transfer(address,uint256)");
        assert_eq!(r.name(), "transfer");
        assert_eq!(r.selector().to_hex(), "0xa9059cbb");
        assert_eq!(r.params().len(), 2);
    }

    #[test]
    fn spelling_variants_collapse() {
        let a = func("transfer(address,uint256)");
        let b = func("  transfer ( address to , uint amount )  ");
        let c = func("function transfer(address payable to, uint256 amount) external returns (bool)");
        assert_eq!(a.human_signature(), b.human_signature());
        assert_eq!(a.human_signature(), c.human_signature());
        assert_eq!(a.selector(), c.selector());
        assert_eq!(b.params()[0].name.as_deref(), Some("to"));
    }

    #[test]
    fn tuples_and_arrays() {
        let r = func("swap(tuple(address token, uint24 fee)[] memory routes, bytes calldata data, uint8[3])");
        assert_eq!(r.human_signature(), "swap((address,uint24)[],bytes,uint8[3])");
        assert_eq!(r.params()[1].name.as_deref(), Some("data"));
        let nested = func("f(((uint),bool)[2][])");
        assert_eq!(nested.human_signature(), "f(((uint256),bool)[2][])");
        let empty = func("g(())");
        assert_eq!(empty.human_signature(), "g(())");
    }

    #[test]
    fn zero_params_and_byte_alias() {
        assert_eq!(func("pause()").human_signature(), "pause()");
        assert_eq!(func("f(byte,int)").human_signature(), "f(bytes1,int256)");
    }

    #[test]
    fn event_indexed_markers() {
        let r = event("event Transfer(address indexed from, address indexed to, uint256 value)");
        assert_eq!(r.human_signature(), "Transfer(address,address,uint256)");
        assert_eq!(r.indexed_count(), 2);
        assert!(!r.params()[2].indexed);
        assert_eq!(
            r.display_signature(),
            "Transfer(address indexed from, address indexed to, uint256 value)"
        );
        assert_eq!(
            r.selector().to_hex(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn rejects_malformed_text() {
        use SignatureKind::*;
        rejects(Function, "transfer");
        rejects(Function, "transfer(address,uint256");
        rejects(Function, "transfer(address,,uint256)");
        rejects(Function, "transfer(address,)");
        rejects(Function, "1transfer(address)");
        rejects(Function, "f(uint7)");
        rejects(Function, "f(uint0)");
        rejects(Function, "f(uint264)");
        rejects(Function, "f(uint08)");
        rejects(Function, "f(bytes33)");
        rejects(Function, "f(bytes0)");
        rejects(Function, "f(fixed128x18)");
        rejects(Function, "f(Foo)");
        rejects(Function, "f(uint256[0])");
        rejects(Function, "f(uint256[)");
        rejects(Function, "f(address indexed a)");
        rejects(Function, "f(uint256 a b)");
        rejects(Function, "f(uint256) whatever");
        rejects(Function, "event Transfer(address)");
        rejects(Event, "Anon(uint256) anonymous");
        rejects(Event, "E(uint256 indexed indexed)");
        rejects(Function, "f(uint256 ñ)");
    }

    #[test]
    fn rejects_excessive_nesting() {
        let deep = format!("f({}uint256{})", "(".repeat(40), ")".repeat(40));
        rejects(SignatureKind::Function, &deep);
        let arrays = format!("f(uint256{})", "[]".repeat(40));
        rejects(SignatureKind::Function, &arrays);
    }

    #[test]
    fn rejects_fixed_arrays_too_large_to_lay_out() {
        use SignatureKind::Function;
        rejects(Function, "f((uint256[18446744073709551615],uint256))");
        rejects(Function, "g(string[18446744073709551615][])");
        rejects(Function, "h(uint256[18446744073709551615],uint256[18446744073709551615])");
        rejects(Function, "k(uint256[99999999999999999999999])");
        // large but addressable
        let big = func("f(uint8[1000000])");
        assert_eq!(big.params()[0].ty.head_size(), 32_000_000);
    }

    #[test]
    fn error_reports_input() {
        let err = SignatureRecord::parse(SignatureKind::Function, "f(Foo)").unwrap_err();
        assert_eq!(err.input(), "f(Foo)");
        assert!(err.to_string().contains("unrecognized type 'Foo'"));
    }
}
