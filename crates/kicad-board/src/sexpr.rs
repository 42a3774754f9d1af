//! S-expression tree for KiCad board and footprint files.
//!
//! Grammar:
//!   sexpr  = '(' atom_or_sexpr* ')'
//!   atom   = string | number | symbol
//!   string = '"' [^"]* '"'  (with escape handling)
//!   number = '-'? [0-9]+ ('.' [0-9]+)?   (no leading zeros, no exponent)
//!   symbol = [^ \t\n\r()"]+
//!
//! Lists are reference-counted slices, so cloning a node is cheap and
//! rebuilding a parent reuses every child that was not replaced.
use crate::error::BoardError;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Symbol(String),
    Str(String),
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Atom(Atom),
    List(Rc<[Node]>),
}

impl Node {
    pub fn symbol(s: impl Into<String>) -> Self {
        Node::Atom(Atom::Symbol(s.into()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Node::Atom(Atom::Str(s.into()))
    }

    pub fn int(v: i64) -> Self {
        Node::Atom(Atom::Int(v))
    }

    /// Integral values become `Int` so they print and reparse identically.
    /// Non-finite values are clamped: NaN becomes 0 and infinities become
    /// `f64::MAX` with their sign.
    pub fn number(v: f64) -> Self {
        let v = clamp_finite(v);
        if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Node::Atom(Atom::Int(v as i64))
        } else {
            Node::Atom(Atom::Float(v))
        }
    }

    pub fn list(items: Vec<Node>) -> Self {
        Node::List(items.into())
    }

    /// Build `(tag args...)`.
    pub fn tagged(tag: &str, args: impl IntoIterator<Item = Node>) -> Self {
        let mut items = vec![Node::symbol(tag)];
        items.extend(args);
        Node::list(items)
    }

    /// Get the head symbol of a list (the "tag").
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::List(items) => match items.first() {
                Some(Node::Atom(Atom::Symbol(s))) => Some(s.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get list arguments (everything after the tag).
    pub fn args(&self) -> &[Node] {
        match self {
            Node::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    /// Get all items including tag.
    pub fn items(&self) -> &[Node] {
        match self {
            Node::List(items) => items,
            _ => &[],
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Node::List(_))
    }

    /// Find a child list with the given tag.
    pub fn find(&self, tag: &str) -> Option<&Node> {
        self.args().iter().find(|c| c.tag() == Some(tag))
    }

    /// Find all child lists with the given tag.
    pub fn find_all(&self, tag: &str) -> Vec<&Node> {
        self.args().iter().filter(|c| c.tag() == Some(tag)).collect()
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Node::Atom(a) => Some(a),
            _ => None,
        }
    }

    /// Text of a symbol or string atom.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Atom(Atom::Symbol(s)) | Node::Atom(Atom::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Atom(Atom::Int(v)) => Some(*v as f64),
            Node::Atom(Atom::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Atom(Atom::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Node::Atom(Atom::Int(_)) | Node::Atom(Atom::Float(_)))
    }

    /// Get the nth argument as text (0-indexed from args, i.e., after the tag).
    pub fn atom_at(&self, index: usize) -> Option<&str> {
        self.args().get(index).and_then(|v| v.as_str())
    }

    /// Get the nth argument as f64.
    pub fn f64_at(&self, index: usize) -> Option<f64> {
        self.args().get(index).and_then(|v| v.as_f64())
    }

    /// Get the first argument of a simple (tag value) child.
    pub fn value(&self, tag: &str) -> Option<&Node> {
        self.find(tag).and_then(|node| node.args().first())
    }

    /// Return a copy with the arguments replaced, keeping the head.
    pub fn with_args(&self, args: Vec<Node>) -> Node {
        let mut items = Vec::with_capacity(args.len() + 1);
        if let Some(head) = self.items().first() {
            items.push(head.clone());
        }
        items.extend(args);
        Node::list(items)
    }
}

fn clamp_finite(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(f64::MIN, f64::MAX)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Symbol(s) => f.write_str(s),
            Atom::Int(v) => write!(f, "{v}"),
            // Always a plain decimal with a fractional part, so the token
            // reparses as a float.
            Atom::Float(v) => {
                let text = clamp_finite(*v).to_string();
                if text.contains('.') {
                    f.write_str(&text)
                } else {
                    write!(f, "{text}.0")
                }
            }
            Atom::Str(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

impl Node {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Node::Atom(a) => write!(f, "{a}"),
            Node::List(items) => {
                f.write_str("(")?;
                let nested = items.iter().any(Node::is_list);
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        if nested && item.is_list() {
                            writeln!(f)?;
                            write!(f, "{:width$}", "", width = (depth + 1) * 2)?;
                        } else {
                            f.write_str(" ")?;
                        }
                    }
                    item.write_indented(f, depth + 1)?;
                }
                if nested {
                    writeln!(f)?;
                    write!(f, "{:width$}", "", width = depth * 2)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn error(&self, msg: &str) -> BoardError {
        BoardError::Parse(format!("{msg} at byte {}", self.pos))
    }

    fn parse_string(&mut self) -> Result<String, BoardError> {
        // Skip opening quote
        self.pos += 1;
        let mut bytes = Vec::new();
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b'"' => {
                    self.pos += 1;
                    return Ok(String::from_utf8_lossy(&bytes).into_owned());
                }
                b'\\' => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'n') => bytes.push(b'\n'),
                        Some(b) => bytes.push(b),
                        None => break,
                    }
                    self.pos += 1;
                }
                b => {
                    bytes.push(b);
                    self.pos += 1;
                }
            }
        }
        Err(self.error("unterminated string"))
    }

    fn parse_token(&mut self) -> Atom {
        let start = self.pos;
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' | b'(' | b')' | b'"' => break,
                _ => self.pos += 1,
            }
        }
        let token = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        classify_token(token)
    }

    fn parse_node(&mut self) -> Result<Node, BoardError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        Some(b')') => {
                            self.pos += 1;
                            break;
                        }
                        None => return Err(self.error("unbalanced '('")),
                        _ => items.push(self.parse_node()?),
                    }
                }
                Ok(Node::list(items))
            }
            Some(b'"') => Ok(Node::Atom(Atom::Str(self.parse_string()?))),
            Some(b')') => Err(self.error("unexpected ')'")),
            Some(_) => Ok(Node::Atom(self.parse_token())),
            None => Err(self.error("empty input")),
        }
    }
}

/// Canonical integer: optional `-`, no leading zeros, fits in `i64`.
fn int_lexeme(token: &str) -> Option<i64> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let v = token.parse::<i64>().ok()?;
    (v.to_string() == token).then_some(v)
}

/// Plain decimal `[-]digits.digits`, finite. Exponents are not numbers:
/// KiCad never writes them and hex stamps like `5E123456` would match.
fn float_lexeme(token: &str) -> Option<f64> {
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    let (whole, frac) = unsigned.split_once('.')?;
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(frac) || (whole.len() > 1 && whole.starts_with('0')) {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn classify_token(token: String) -> Atom {
    if let Some(v) = int_lexeme(&token) {
        return Atom::Int(v);
    }
    if let Some(v) = float_lexeme(&token) {
        return Atom::Float(v);
    }
    Atom::Symbol(token)
}

/// Parse a single S-expression document.
pub fn parse(input: &str) -> Result<Node, BoardError> {
    let mut parser = Parser::new(input.as_bytes());
    let node = parser.parse_node()?;
    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(parser.error("trailing content"));
    }
    Ok(node)
}
