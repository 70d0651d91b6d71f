//! Lexical goal probe for ECMAScript sources
//!
//! Not a full parser. It tokenises just enough of the language (comments,
//! strings, templates, regular expressions, brackets) to find the constructs
//! that only one goal accepts:
//!
//! | Construct | Script | Module |
//! |-----------|--------|--------|
//! | `import` / `export` declaration | error | ok |
//! | `import.meta` | error | ok |
//! | `await` / `for await` outside any function | error | ok |
//! | HTML-like comment (`<!--`, line-leading `-->`) | comment | error |
//! | `with` statement | ok | error |
//! | legacy octal literal or escape | ok | error |
//! | strict-mode reserved word (`package`, `private`, ...) as identifier | ok | error |
//!
//! Unbalanced brackets and unterminated literals fail every goal.

use super::{GrammarAttempt, ParseFailure, Position};
use crate::goal::Goal;

/// Keywords after which a `/` starts a regular expression
const REGEX_AFTER_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Keywords whose `(` opens a statement head rather than a call or parameters
const CONTROL_KEYWORDS: &[&str] = &["if", "while", "for", "with", "switch", "catch"];

/// Identifiers reserved only in strict (and therefore module) code
const STRICT_RESERVED: &[&str] = &[
    "implements",
    "interface",
    "package",
    "private",
    "protected",
    "public",
    "static",
];

/// Built-in goal probe used when no external parser is plugged in
#[derive(Debug, Clone, Copy, Default)]
pub struct EcmaProbe;

impl GrammarAttempt for EcmaProbe {
    fn attempt(&self, source: &[u8], goal: Goal) -> Result<(), ParseFailure> {
        let text = match std::str::from_utf8(source) {
            Ok(text) => text,
            Err(e) => {
                let valid = e.valid_up_to();
                let prefix = std::str::from_utf8(&source[..valid]).unwrap_or_default();
                return Err(ParseFailure::new(
                    position_at(prefix, valid),
                    "source is not valid UTF-8",
                ));
            }
        };

        let scan = Scanner::new(text).run();
        let goal_error = match goal {
            Goal::Script => scan.script_error,
            Goal::Module => scan.module_error,
        };

        match earliest(scan.error, goal_error) {
            Some(violation) => Err(violation.into_failure(text)),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "ecma-probe"
    }
}

/// Line/column of a byte offset in `text`
pub(crate) fn position_at(text: &str, offset: usize) -> Position {
    let offset = offset.min(text.len());
    let mut line = 1u32;
    let mut column = 1u32;
    for (i, c) in text.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Position::new(line, column, offset)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Violation {
    offset: usize,
    message: String,
}

impl Violation {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    fn into_failure(self, text: &str) -> ParseFailure {
        ParseFailure::new(position_at(text, self.offset), self.message)
    }
}

fn earliest(a: Option<Violation>, b: Option<Violation>) -> Option<Violation> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.offset < a.offset { b } else { a }),
        (a, b) => a.or(b),
    }
}

#[derive(Debug, Default)]
struct Scan {
    /// Fails every goal
    error: Option<Violation>,
    /// First construct the Script grammar rejects
    script_error: Option<Violation>,
    /// First construct the Module grammar rejects
    module_error: Option<Violation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Paren,
    /// `(` of a control statement head; a `/` after its `)` starts a regex
    ControlParen,
    Bracket,
    Brace,
    /// `{` of a function, method or arrow body
    FunctionBody,
    ClassBody,
    /// `${` inside a template; offset on the stack is the template start
    Substitution,
}

impl Open {
    fn opener(self) -> char {
        match self {
            Self::Paren | Self::ControlParen => '(',
            Self::Bracket => '[',
            Self::Brace | Self::FunctionBody | Self::ClassBody | Self::Substitution => '{',
        }
    }

    fn closer(self) -> u8 {
        match self {
            Self::Paren | Self::ControlParen => b')',
            Self::Bracket => b']',
            Self::Brace | Self::FunctionBody | Self::ClassBody | Self::Substitution => b'}',
        }
    }
}

/// Previous significant token, enough to tell regex from division
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev<'a> {
    Word(&'a str),
    Literal,
    Close(u8),
    /// `++` or `--`
    Update,
    /// `=>`
    Arrow,
    Punct(u8),
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    stack: Vec<(Open, usize)>,
    prev: Option<Prev<'a>>,
    newline_before: bool,
    line_start: bool,
    /// Previous token was a control keyword
    control_next: bool,
    /// Stack depth of a `class` keyword still waiting for its body
    class_at: Option<usize>,
    /// Stack depths of open expression-bodied arrow functions
    arrow_bodies: Vec<usize>,
    script_error: Option<Violation>,
    module_error: Option<Violation>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            stack: Vec::new(),
            prev: None,
            newline_before: false,
            line_start: true,
            control_next: false,
            class_at: None,
            arrow_bodies: Vec::new(),
            script_error: None,
            module_error: None,
        }
    }

    fn run(mut self) -> Scan {
        if self.bytes.starts_with(b"#!") {
            self.skip_line();
        }

        while self.pos < self.bytes.len() {
            if let Err(violation) = self.step() {
                return self.finish(Some(violation));
            }
        }

        let unclosed = self.stack.last().map(|(open, at)| match open {
            Open::Substitution => Violation::new(*at, "unterminated template literal"),
            _ => Violation::new(*at, format!("unclosed '{}'", open.opener())),
        });
        self.finish(unclosed)
    }

    fn finish(self, error: Option<Violation>) -> Scan {
        Scan {
            error,
            script_error: self.script_error,
            module_error: self.module_error,
        }
    }

    fn step(&mut self) -> Result<(), Violation> {
        let start = self.pos;
        let b = self.bytes[start];

        match b {
            b'\n' => {
                self.pos += 1;
                self.newline();
            }
            b' ' | b'\t' | b'\r' | 0x0b | 0x0c => self.pos += 1,
            b'/' if self.peek(1) == Some(b'/') => self.skip_line(),
            b'/' if self.peek(1) == Some(b'*') => self.block_comment(start)?,
            b'/' => {
                if self.regex_allowed() {
                    self.regex(start)?;
                    self.token(Prev::Literal);
                } else {
                    self.pos += 1;
                    if self.peek(0) == Some(b'=') {
                        self.pos += 1;
                    }
                    self.token(Prev::Punct(b'/'));
                }
            }
            b'<' if self.bytes[start..].starts_with(b"<!--") => self.html_comment(start),
            b'-' if self.line_start && self.bytes[start..].starts_with(b"-->") => {
                self.html_comment(start)
            }
            b'\'' | b'"' => {
                self.string(start, b)?;
                self.token(Prev::Literal);
            }
            b'`' => {
                self.pos += 1;
                self.template(start)?;
            }
            b'(' => self.open(Open::Paren, start),
            b'[' => self.open(Open::Bracket, start),
            b'{' => self.open(Open::Brace, start),
            b')' | b']' | b'}' => self.close(b, start)?,
            b'0'..=b'9' => self.number(start),
            b'.' if matches!(self.peek(1), Some(b'0'..=b'9')) => self.number(start),
            b'+' | b'-' if self.peek(1) == Some(b) => {
                self.pos += 2;
                self.token(Prev::Update);
            }
            b'=' if self.peek(1) == Some(b'>') => {
                self.pos += 2;
                if self.next_significant() != Some(b'{') {
                    self.arrow_bodies.push(self.stack.len());
                }
                self.token(Prev::Arrow);
            }
            _ if is_ident_start(b) => self.word(start),
            _ if b >= 0x80 => match self.char_at() {
                Some(c @ ('\u{2028}' | '\u{2029}')) => {
                    self.pos += c.len_utf8();
                    self.newline();
                }
                Some(c) if c.is_whitespace() || c == '\u{feff}' => self.pos += c.len_utf8(),
                Some(c) if c.is_alphabetic() => self.word(start),
                Some(c) => {
                    self.pos += c.len_utf8();
                    self.token(Prev::Punct(0));
                }
                None => self.pos += 1,
            },
            _ => {
                self.pos += 1;
                if b == b',' || b == b';' {
                    self.end_arrow_bodies(self.stack.len());
                }
                self.token(Prev::Punct(b));
            }
        }

        Ok(())
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn char_at(&self) -> Option<char> {
        self.src.get(self.pos..).and_then(|s| s.chars().next())
    }

    fn token(&mut self, prev: Prev<'a>) {
        self.prev = Some(prev);
        self.newline_before = false;
        self.line_start = false;
        self.control_next = false;
    }

    fn newline(&mut self) {
        self.newline_before = true;
        self.line_start = true;
    }

    fn regex_allowed(&self) -> bool {
        match self.prev {
            None => true,
            Some(Prev::Word(word)) => REGEX_AFTER_KEYWORDS.contains(&word),
            Some(Prev::Literal) | Some(Prev::Update) => false,
            Some(Prev::Close(c)) => c == b'}',
            Some(Prev::Punct(_)) | Some(Prev::Arrow) => true,
        }
    }

    fn in_function(&self) -> bool {
        !self.arrow_bodies.is_empty()
            || self
                .stack
                .iter()
                .any(|(open, _)| *open == Open::FunctionBody)
    }

    /// Close expression-bodied arrows started at `depth` or deeper
    fn end_arrow_bodies(&mut self, depth: usize) {
        self.arrow_bodies.retain(|d| *d < depth);
    }

    fn at_statement_start(&self) -> bool {
        if !self.stack.is_empty() {
            return false;
        }
        match self.prev {
            None | Some(Prev::Punct(b';')) | Some(Prev::Close(b'}')) => true,
            Some(_) => self.newline_before,
        }
    }

    fn record_script(&mut self, offset: usize, message: impl Into<String>) {
        if self.script_error.is_none() {
            self.script_error = Some(Violation::new(offset, message));
        }
    }

    fn record_module(&mut self, offset: usize, message: impl Into<String>) {
        if self.module_error.is_none() {
            self.module_error = Some(Violation::new(offset, message));
        }
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.peek(0) {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn block_comment(&mut self, start: usize) -> Result<(), Violation> {
        let bytes = self.bytes;
        let body = &bytes[start + 2..];
        let end = body
            .windows(2)
            .position(|w| w == b"*/")
            .ok_or_else(|| Violation::new(start, "unterminated comment"))?;

        if body[..end].contains(&b'\n') {
            self.newline();
        }
        self.pos = start + 2 + end + 2;
        Ok(())
    }

    fn html_comment(&mut self, start: usize) {
        self.record_module(start, "HTML-like comments are not allowed in module code");
        self.skip_line();
    }

    fn string(&mut self, start: usize, quote: u8) -> Result<(), Violation> {
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some(b'\n') | Some(b'\r') => {
                    return Err(Violation::new(start, "unterminated string literal"));
                }
                Some(b'\\') => {
                    match self.peek(1) {
                        Some(b'1'..=b'9') => self.record_module(
                            self.pos,
                            "octal escape sequences are not allowed in module code",
                        ),
                        Some(b'0') if matches!(self.peek(2), Some(b'0'..=b'9')) => self
                            .record_module(
                                self.pos,
                                "octal escape sequences are not allowed in module code",
                            ),
                        Some(b'\r') if self.peek(2) == Some(b'\n') => self.pos += 1,
                        _ => {}
                    }
                    self.pos += 2;
                }
                Some(q) if q == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Scan template characters up to the closing backtick or the next `${`
    fn template(&mut self, start: usize) -> Result<(), Violation> {
        loop {
            match self.peek(0) {
                None => return Err(Violation::new(start, "unterminated template literal")),
                Some(b'\\') => self.pos += 2,
                Some(b'`') => {
                    self.pos += 1;
                    self.token(Prev::Literal);
                    return Ok(());
                }
                Some(b'$') if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.stack.push((Open::Substitution, start));
                    self.token(Prev::Punct(b'{'));
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn regex(&mut self, start: usize) -> Result<(), Violation> {
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek(0) {
                None | Some(b'\n') | Some(b'\r') => {
                    return Err(Violation::new(
                        start,
                        "unterminated regular expression literal",
                    ));
                }
                Some(b'\\') => self.pos += 2,
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }

        // flags
        while matches!(self.peek(0), Some(c) if is_ident_part(c)) {
            self.pos += 1;
        }
        Ok(())
    }

    fn open(&mut self, open: Open, start: usize) {
        let open = match open {
            Open::Paren if self.control_next => Open::ControlParen,
            Open::Brace if self.class_at == Some(self.stack.len()) => {
                self.class_at = None;
                Open::ClassBody
            }
            Open::Brace if matches!(self.prev, Some(Prev::Close(b')')) | Some(Prev::Arrow)) => {
                Open::FunctionBody
            }
            other => other,
        };
        self.stack.push((open, start));
        self.pos += 1;
        self.token(Prev::Punct(self.bytes[start]));
    }

    fn close(&mut self, b: u8, start: usize) -> Result<(), Violation> {
        match self.stack.pop() {
            Some((Open::Substitution, template_start)) if b == b'}' => {
                self.pos += 1;
                self.end_arrow_bodies(self.stack.len() + 1);
                self.template(template_start)
            }
            Some((open, _)) if open.closer() == b => {
                self.pos += 1;
                self.end_arrow_bodies(self.stack.len() + 1);
                if open == Open::ControlParen {
                    self.token(Prev::Punct(b));
                } else {
                    self.token(Prev::Close(b));
                }
                Ok(())
            }
            Some((open, _)) => Err(Violation::new(
                start,
                format!(
                    "unexpected '{}', expected '{}'",
                    b as char,
                    open.closer() as char
                ),
            )),
            None => Err(Violation::new(start, format!("unexpected '{}'", b as char))),
        }
    }

    fn number(&mut self, start: usize) {
        let leading_zero = self.bytes[start] == b'0';
        let legacy = leading_zero && matches!(self.peek(1), Some(b'0'..=b'9'));
        let hex = leading_zero && matches!(self.peek(1), Some(b'x' | b'X'));

        self.pos += 1;
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' {
                self.pos += 1;
            } else if (c == b'+' || c == b'-')
                && !hex
                && matches!(self.bytes[self.pos - 1], b'e' | b'E')
            {
                self.pos += 1;
            } else {
                break;
            }
        }

        if legacy {
            self.record_module(
                start,
                "legacy octal and leading-zero literals are not allowed in module code",
            );
        }
        self.token(Prev::Literal);
    }

    fn word(&mut self, start: usize) {
        while let Some(c) = self.peek(0) {
            if is_ident_part(c) {
                self.pos += 1;
            } else if c >= 0x80 {
                match self.char_at() {
                    Some(ch) if ch.is_alphanumeric() => self.pos += ch.len_utf8(),
                    _ => break,
                }
            } else {
                break;
            }
        }

        let src = self.src;
        let word = &src[start..self.pos];
        let property = matches!(self.prev, Some(Prev::Punct(b'.')));
        if !property {
            self.keyword(word, start);
        }

        let control = !property
            && (CONTROL_KEYWORDS.contains(&word)
                || (word == "await" && self.prev == Some(Prev::Word("for"))));
        if !property && word == "class" {
            self.class_at = Some(self.stack.len());
        }
        self.token(Prev::Word(word));
        self.control_next = control;
    }

    fn keyword(&mut self, word: &str, start: usize) {
        match word {
            "import" => match self.next_significant() {
                Some(b'(') => {}
                Some(b'.') => {
                    self.record_script(start, "'import.meta' is only valid in module code")
                }
                _ if self.at_statement_start() => self.record_script(
                    start,
                    "import declarations may only appear in module code",
                ),
                _ => {}
            },
            "export" if self.at_statement_start() => self.record_script(
                start,
                "export declarations may only appear in module code",
            ),
            "with" if self.next_significant() == Some(b'(') => {
                self.record_module(start, "'with' statements are not allowed in module code")
            }
            "await" if !self.in_function() => {
                if self.prev == Some(Prev::Word("for")) {
                    self.record_script(
                        start,
                        "'for await' is only valid in async functions and module code",
                    )
                } else if self.operand_follows() {
                    self.record_script(
                        start,
                        "'await' is only valid in async functions and module code",
                    )
                }
            }
            "let" if matches!(self.prev, Some(Prev::Word("var" | "function"))) => {
                self.record_module(start, "'let' is a reserved word in module code")
            }
            word if STRICT_RESERVED.contains(&word) && self.reserved_as_identifier() => self
                .record_module(start, format!("'{word}' is a reserved word in module code")),
            _ => {}
        }
    }

    /// Whether an operand starts on the same line, making `await` an operator
    ///
    /// `await (x)`, `await [0]` and `await - 1` are valid script expressions
    /// with `await` as an identifier, so only unambiguous operand starts count.
    fn operand_follows(&self) -> bool {
        let b = self.bytes;
        let mut i = self.pos;
        while i < b.len() {
            match b[i] {
                b' ' | b'\t' => i += 1,
                b'/' if b.get(i + 1) == Some(&b'*') => {
                    let Some(end) = b[i + 2..].windows(2).position(|w| w == b"*/") else {
                        return false;
                    };
                    if b[i + 2..i + 2 + end].contains(&b'\n') {
                        return false;
                    }
                    i += 2 + end + 2;
                }
                c if is_ident_start(c) => {
                    let len = b[i..].iter().take_while(|c| is_ident_part(**c)).count();
                    return !matches!(&self.src[i..i + len], "in" | "instanceof" | "of");
                }
                b'0'..=b'9' | b'\'' | b'"' | b'!' | b'~' => return true,
                _ => return false,
            }
        }
        false
    }

    /// A strict-reserved word in a position where it names a binding
    fn reserved_as_identifier(&self) -> bool {
        let next = self.next_significant();
        if next == Some(b':') {
            return false;
        }
        match self.stack.last() {
            Some((Open::ClassBody, _)) => false,
            Some((Open::Brace, _)) => next != Some(b'('),
            _ => true,
        }
    }

    /// First byte after the cursor that is not whitespace or a comment
    fn next_significant(&self) -> Option<u8> {
        let b = self.bytes;
        let mut i = self.pos;
        while i < b.len() {
            match b[i] {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => i += 1,
                b'/' if b.get(i + 1) == Some(&b'/') => {
                    while i < b.len() && b[i] != b'\n' {
                        i += 1;
                    }
                }
                b'/' if b.get(i + 1) == Some(&b'*') => {
                    let end = b[i + 2..].windows(2).position(|w| w == b"*/")?;
                    i += 2 + end + 2;
                }
                c => return Some(c),
            }
        }
        None
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b == b'\\'
}

fn is_ident_part(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(src: &str) -> Result<(), ParseFailure> {
        EcmaProbe.attempt(src.as_bytes(), Goal::Script)
    }

    fn module(src: &str) -> Result<(), ParseFailure> {
        EcmaProbe.attempt(src.as_bytes(), Goal::Module)
    }

    #[test]
    fn plain_script_parses_under_both() {
        let src = "function foo(){} foo();";
        assert!(script(src).is_ok());
        assert!(module(src).is_ok());
    }

    #[test]
    fn export_fails_script() {
        let src = "function foo(){} foo(); export {};";
        let err = script(src).unwrap_err();
        assert_eq!(err.position, Position::new(1, 25, 24));
        assert!(err.message.contains("export"));
        assert!(module(src).is_ok());
    }

    #[test]
    fn import_declaration_fails_script() {
        let err = script("import x from \"y\";\nx();").unwrap_err();
        assert_eq!(err.position, Position::start());
        assert!(module("import x from \"y\";\nx();").is_ok());
    }

    #[test]
    fn export_after_newline_without_semicolon() {
        let err = script("foo()\nexport default 1").unwrap_err();
        assert_eq!(err.position.line, 2);
        assert_eq!(err.position.column, 1);
    }

    #[test]
    fn dynamic_import_allowed_in_both() {
        let src = "const m = import(\"./m.js\");\nimport(\"./n.js\");";
        assert!(script(src).is_ok());
        assert!(module(src).is_ok());
    }

    #[test]
    fn import_meta_is_module_only() {
        let src = "console.log(import.meta.url);";
        assert!(script(src).unwrap_err().message.contains("import.meta"));
        assert!(module(src).is_ok());
    }

    #[test]
    fn keywords_in_strings_comments_and_properties() {
        let src = r#"
            // export {}
            /* import x from "y" */
            var s = "export {}";
            var t = 'import x';
            obj.export = 1;
            obj.import();
            var o = { import: 1, export: 2 };
        "#;
        assert!(script(src).is_ok());
        assert!(module(src).is_ok());
    }

    #[test]
    fn with_statement_fails_module() {
        let src = "with (obj) { x = 1; }";
        assert!(script(src).is_ok());
        let err = module(src).unwrap_err();
        assert!(err.message.contains("with"));
        assert_eq!(err.position, Position::start());
    }

    #[test]
    fn legacy_octal_fails_module() {
        let src = "var mode = 0755;";
        assert!(script(src).is_ok());
        assert_eq!(module(src).unwrap_err().position.column, 12);

        assert!(module("var a = 0x1F, b = 0.5, c = 1e-3, d = 0o17;").is_ok());
    }

    #[test]
    fn octal_escape_fails_module() {
        let src = r#"var s = "\07";"#;
        assert!(script(src).is_ok());
        assert!(module(src).is_err());
        assert!(module(r#"var s = "\0";"#).is_ok());
    }

    #[test]
    fn html_comments_fail_module() {
        let src = "<!-- hide from old browsers\nfoo();\n--> done";
        assert!(script(src).is_ok());
        assert!(module(src).unwrap_err().message.contains("HTML-like"));

        // `x-->0` is a decrement and comparison, not a comment
        assert!(module("while (x-->0) {}").is_ok());
    }

    #[test]
    fn regex_literals_are_opaque() {
        let src = "var r = /[/]export {}/g; r.test(s);";
        assert!(script(src).is_ok());
        assert!(module(src).is_ok());
    }

    #[test]
    fn division_is_not_regex() {
        let src = "var x = a / b / c; y = (a) / 2; z = i++ / 2;";
        assert!(script(src).is_ok());
    }

    #[test]
    fn template_literals_nest() {
        let src = "var s = `a ${ `export ${x}` } b`; t = `${ {a: 1}.a }`;";
        assert!(script(src).is_ok());
        assert!(module(src).is_ok());
    }

    #[test]
    fn unbalanced_brackets_fail_both() {
        let err = script("foo(").unwrap_err();
        assert_eq!(err.position, Position::new(1, 4, 3));
        assert!(err.message.contains("unclosed '('"));
        assert!(module("foo(").is_err());

        let err = module("foo(]").unwrap_err();
        assert!(err.message.contains("unexpected ']'"));
    }

    #[test]
    fn unterminated_literals_fail_both() {
        assert!(script("let s = \"abc").is_err());
        assert!(module("let s = `abc").is_err());
        assert!(script("/* never closed").is_err());
        assert!(module("var r = /abc\n/;").is_err());
    }

    #[test]
    fn earliest_error_wins() {
        // the export at offset 0 precedes the unclosed paren
        let err = script("export {}; foo(").unwrap_err();
        assert!(err.message.contains("export"));
    }

    #[test]
    fn invalid_utf8_fails() {
        let err = EcmaProbe.attempt(&[b'f', 0xff, b'o'], Goal::Script).unwrap_err();
        assert_eq!(err.position, Position::new(1, 2, 1));
    }

    #[test]
    fn hashbang_is_skipped() {
        assert!(module("#!/usr/bin/env node\nexport {};").is_ok());
    }

    #[test]
    fn position_counts_chars() {
        let text = "é\nab";
        assert_eq!(position_at(text, 3), Position::new(2, 1, 3));
        assert_eq!(position_at(text, 5), Position::new(2, 3, 5));
    }

    #[test]
    fn top_level_await_is_module_only() {
        let src = "const r = await load();\nuse(r);";
        let err = script(src).unwrap_err();
        assert_eq!(err.position, Position::new(1, 11, 10));
        assert!(err.message.contains("'await'"));
        assert!(module(src).is_ok());

        let src = "if (ready) { await go(); }";
        assert!(script(src).is_err());
        assert!(module(src).is_ok());

        let src = "for await (const chunk of stream) {}";
        assert!(script(src).unwrap_err().message.contains("for await"));
        assert!(module(src).is_ok());
    }

    #[test]
    fn await_inside_functions_parses_under_both() {
        let src = r#"
            async function f() { await g(); }
            const h = async () => { await g(); };
            const k = async x => await g(x);
            xs.map(async (x) => await g(x));
            class A { async m() { await g(); } }
            var o = { async n() { await g(); } };
        "#;
        assert!(script(src).is_ok());
        assert!(module(src).is_ok());
    }

    #[test]
    fn await_as_script_identifier() {
        for src in [
            "var await = 1;",
            "await(x);",
            "await [0];",
            "x = await - 1;",
            "await\nfoo();",
            "obj.await = 1;",
        ] {
            assert!(script(src).is_ok(), "{src}");
        }
    }

    #[test]
    fn regex_after_control_paren() {
        let src = r#"if (ok) /["']/.test(s);"#;
        assert!(script(src).is_ok());
        assert!(module(src).is_ok());

        assert!(script("while (i < n) /[(]/g.exec(s);").is_ok());
        assert!(script("for (;;) /x/.test(s);").is_ok());
        // a call's `)` is still followed by division
        assert!(script("var y = f(a) / 2 / g(b);").is_ok());
    }

    #[test]
    fn strict_reserved_identifiers_fail_module() {
        let src = "var package = 1;";
        assert!(script(src).is_ok());
        let err = module(src).unwrap_err();
        assert_eq!(err.position.column, 5);
        assert!(err.message.contains("'package'"));

        assert!(module("function f(private) { return private; }").is_err());
        assert!(module("var let = 1;").is_err());
        assert!(script("var let = 1;").is_ok());
    }

    #[test]
    fn strict_reserved_property_names_are_allowed() {
        let src = r#"
            obj.private = 1;
            var o = { public: 1, package() {} };
            class A { static x = 1; private() {} static { init(); } }
        "#;
        assert!(script(src).is_ok());
        assert!(module(src).is_ok());
    }
}
