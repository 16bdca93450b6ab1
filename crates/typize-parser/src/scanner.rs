//! Tokenizer for the host language.
//!
//! The scanner turns source text into a flat token vector up front. Each
//! token records its full start (leading trivia included) as well as the
//! start of its significant text, so the parser can give every node both a
//! `pos` and a `start` without rescanning.

use typize_common::Diagnostic;
use typize_common::diagnostics::diagnostic_messages;
use typize_common::trivia::skip_trivia;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    EndOfFile,
    Unknown,

    // Literals and names
    Identifier,
    StringLiteral,
    NumericLiteral,
    CharLiteral,

    // Punctuation
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    LessThan,
    GreaterThan,
    LessThanEquals,
    /// Never produced by the scanner; the parser composes it from adjacent `>` `=`.
    GreaterThanEquals,
    Semicolon,
    Comma,
    Dot,
    Equals,
    EqualsEquals,
    ExclamationEquals,
    EqualsGreaterThan,
    Question,
    Colon,
    Exclamation,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    AmpersandAmpersand,
    BarBar,

    // Declaration keywords
    UsingKeyword,
    NamespaceKeyword,
    ClassKeyword,
    InterfaceKeyword,

    // Modifier keywords
    PublicKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    InternalKeyword,
    StaticKeyword,
    AsyncKeyword,
    VirtualKeyword,
    OverrideKeyword,
    AbstractKeyword,
    SealedKeyword,
    PartialKeyword,
    ReadonlyKeyword,

    // Statement and expression keywords
    ReturnKeyword,
    VarKeyword,
    NewKeyword,
    ThisKeyword,
    BaseKeyword,
    IfKeyword,
    ElseKeyword,
    AwaitKeyword,
    TrueKeyword,
    FalseKeyword,
    NullKeyword,
    WhereKeyword,

    // Predefined type keywords
    ObjectKeyword,
    DynamicKeyword,
    StringKeyword,
    BoolKeyword,
    ByteKeyword,
    CharKeyword,
    ShortKeyword,
    IntKeyword,
    UIntKeyword,
    LongKeyword,
    ULongKeyword,
    FloatKeyword,
    DoubleKeyword,
    DecimalKeyword,
    VoidKeyword,
}

impl SyntaxKind {
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        use SyntaxKind::*;
        Some(match text {
            "using" => UsingKeyword,
            "namespace" => NamespaceKeyword,
            "class" => ClassKeyword,
            "interface" => InterfaceKeyword,
            "public" => PublicKeyword,
            "private" => PrivateKeyword,
            "protected" => ProtectedKeyword,
            "internal" => InternalKeyword,
            "static" => StaticKeyword,
            "async" => AsyncKeyword,
            "virtual" => VirtualKeyword,
            "override" => OverrideKeyword,
            "abstract" => AbstractKeyword,
            "sealed" => SealedKeyword,
            "partial" => PartialKeyword,
            "readonly" => ReadonlyKeyword,
            "return" => ReturnKeyword,
            "var" => VarKeyword,
            "new" => NewKeyword,
            "this" => ThisKeyword,
            "base" => BaseKeyword,
            "if" => IfKeyword,
            "else" => ElseKeyword,
            "await" => AwaitKeyword,
            "true" => TrueKeyword,
            "false" => FalseKeyword,
            "null" => NullKeyword,
            "where" => WhereKeyword,
            "object" => ObjectKeyword,
            "dynamic" => DynamicKeyword,
            "string" => StringKeyword,
            "bool" => BoolKeyword,
            "byte" => ByteKeyword,
            "char" => CharKeyword,
            "short" => ShortKeyword,
            "int" => IntKeyword,
            "uint" => UIntKeyword,
            "long" => LongKeyword,
            "ulong" => ULongKeyword,
            "float" => FloatKeyword,
            "double" => DoubleKeyword,
            "decimal" => DecimalKeyword,
            "void" => VoidKeyword,
            _ => return None,
        })
    }

    pub fn is_modifier(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            PublicKeyword
                | PrivateKeyword
                | ProtectedKeyword
                | InternalKeyword
                | StaticKeyword
                | AsyncKeyword
                | VirtualKeyword
                | OverrideKeyword
                | AbstractKeyword
                | SealedKeyword
                | PartialKeyword
                | ReadonlyKeyword
        )
    }

    pub fn is_predefined_type(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            ObjectKeyword
                | DynamicKeyword
                | StringKeyword
                | BoolKeyword
                | ByteKeyword
                | CharKeyword
                | ShortKeyword
                | IntKeyword
                | UIntKeyword
                | LongKeyword
                | ULongKeyword
                | FloatKeyword
                | DoubleKeyword
                | DecimalKeyword
                | VoidKeyword
        )
    }

    /// Source spelling of a keyword or punctuation token.
    pub fn text(self) -> &'static str {
        use SyntaxKind::*;
        match self {
            EndOfFile => "end of file",
            Unknown => "unknown",
            Identifier => "identifier",
            StringLiteral => "string literal",
            NumericLiteral => "numeric literal",
            CharLiteral => "character literal",
            OpenBrace => "{",
            CloseBrace => "}",
            OpenParen => "(",
            CloseParen => ")",
            OpenBracket => "[",
            CloseBracket => "]",
            LessThan => "<",
            GreaterThan => ">",
            LessThanEquals => "<=",
            GreaterThanEquals => ">=",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            Equals => "=",
            EqualsEquals => "==",
            ExclamationEquals => "!=",
            EqualsGreaterThan => "=>",
            Question => "?",
            Colon => ":",
            Exclamation => "!",
            Plus => "+",
            Minus => "-",
            Asterisk => "*",
            Slash => "/",
            Percent => "%",
            AmpersandAmpersand => "&&",
            BarBar => "||",
            UsingKeyword => "using",
            NamespaceKeyword => "namespace",
            ClassKeyword => "class",
            InterfaceKeyword => "interface",
            PublicKeyword => "public",
            PrivateKeyword => "private",
            ProtectedKeyword => "protected",
            InternalKeyword => "internal",
            StaticKeyword => "static",
            AsyncKeyword => "async",
            VirtualKeyword => "virtual",
            OverrideKeyword => "override",
            AbstractKeyword => "abstract",
            SealedKeyword => "sealed",
            PartialKeyword => "partial",
            ReadonlyKeyword => "readonly",
            ReturnKeyword => "return",
            VarKeyword => "var",
            NewKeyword => "new",
            ThisKeyword => "this",
            BaseKeyword => "base",
            IfKeyword => "if",
            ElseKeyword => "else",
            AwaitKeyword => "await",
            TrueKeyword => "true",
            FalseKeyword => "false",
            NullKeyword => "null",
            WhereKeyword => "where",
            ObjectKeyword => "object",
            DynamicKeyword => "dynamic",
            StringKeyword => "string",
            BoolKeyword => "bool",
            ByteKeyword => "byte",
            CharKeyword => "char",
            ShortKeyword => "short",
            IntKeyword => "int",
            UIntKeyword => "uint",
            LongKeyword => "long",
            ULongKeyword => "ulong",
            FloatKeyword => "float",
            DoubleKeyword => "double",
            DecimalKeyword => "decimal",
            VoidKeyword => "void",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    /// Start of the leading trivia.
    pub full_start: u32,
    /// Start of the token text.
    pub start: u32,
    pub end: u32,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start as usize..self.end as usize).unwrap_or("")
    }
}

pub struct ScannerState<'a> {
    file_name: &'a str,
    source: &'a str,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ScannerState<'a> {
    pub fn new(file_name: &'a str, source: &'a str) -> Self {
        ScannerState {
            file_name,
            source,
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Scan the whole source. The last token is always `EndOfFile`.
    pub fn scan_all(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::with_capacity(self.source.len() / 4 + 1);
        loop {
            let token = self.scan();
            tokens.push(token);
            if token.kind == SyntaxKind::EndOfFile {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn scan(&mut self) -> Token {
        let full_start = self.pos as u32;
        self.check_unterminated_comment(full_start);
        let start = skip_trivia(self.source, full_start) as usize;
        self.pos = start;

        let bytes = self.source.as_bytes();
        let Some(&ch) = bytes.get(start) else {
            return Token {
                kind: SyntaxKind::EndOfFile,
                full_start,
                start: start as u32,
                end: start as u32,
            };
        };

        let kind = match ch {
            b'{' => self.single(SyntaxKind::OpenBrace),
            b'}' => self.single(SyntaxKind::CloseBrace),
            b'(' => self.single(SyntaxKind::OpenParen),
            b')' => self.single(SyntaxKind::CloseParen),
            b'[' => self.single(SyntaxKind::OpenBracket),
            b']' => self.single(SyntaxKind::CloseBracket),
            b';' => self.single(SyntaxKind::Semicolon),
            b',' => self.single(SyntaxKind::Comma),
            b'.' if !self.peek_is_digit(1) => self.single(SyntaxKind::Dot),
            b'?' => self.single(SyntaxKind::Question),
            b':' => self.single(SyntaxKind::Colon),
            b'+' => self.single(SyntaxKind::Plus),
            b'-' => self.single(SyntaxKind::Minus),
            b'*' => self.single(SyntaxKind::Asterisk),
            b'/' => self.single(SyntaxKind::Slash),
            b'%' => self.single(SyntaxKind::Percent),
            // '>' is never combined so that nested type argument lists close one at a time.
            b'>' => self.single(SyntaxKind::GreaterThan),
            b'<' => self.pair(b'=', SyntaxKind::LessThanEquals, SyntaxKind::LessThan),
            b'!' => self.pair(b'=', SyntaxKind::ExclamationEquals, SyntaxKind::Exclamation),
            b'=' => match bytes.get(start + 1) {
                Some(b'=') => self.advance_by(2, SyntaxKind::EqualsEquals),
                Some(b'>') => self.advance_by(2, SyntaxKind::EqualsGreaterThan),
                _ => self.single(SyntaxKind::Equals),
            },
            b'&' if bytes.get(start + 1) == Some(&b'&') => {
                self.advance_by(2, SyntaxKind::AmpersandAmpersand)
            }
            b'|' if bytes.get(start + 1) == Some(&b'|') => self.advance_by(2, SyntaxKind::BarBar),
            b'"' => self.scan_string(0),
            b'$' | b'@' if bytes.get(start + 1) == Some(&b'"') => self.scan_string(1),
            b'\'' => self.scan_char(),
            b'0'..=b'9' | b'.' => self.scan_number(),
            c if c == b'_' || c.is_ascii_alphabetic() || c >= 0x80 => self.scan_identifier(),
            _ => {
                self.error_here(start, 1, &diagnostic_messages::INVALID_CHARACTER, &[]);
                let width = self.source[start..].chars().next().map_or(1, char::len_utf8);
                self.advance_by(width, SyntaxKind::Unknown)
            }
        };

        Token {
            kind,
            full_start,
            start: start as u32,
            end: self.pos as u32,
        }
    }

    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.advance_by(1, kind)
    }

    fn pair(&mut self, second: u8, combined: SyntaxKind, alone: SyntaxKind) -> SyntaxKind {
        if self.source.as_bytes().get(self.pos + 1) == Some(&second) {
            self.advance_by(2, combined)
        } else {
            self.advance_by(1, alone)
        }
    }

    fn advance_by(&mut self, n: usize, kind: SyntaxKind) -> SyntaxKind {
        self.pos = (self.pos + n).min(self.source.len());
        kind
    }

    fn peek_is_digit(&self, offset: usize) -> bool {
        self.source
            .as_bytes()
            .get(self.pos + offset)
            .is_some_and(u8::is_ascii_digit)
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        let rest = &self.source[start..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !(c == '_' || c.is_alphanumeric()))
            .map_or(rest.len(), |(i, _)| i);
        self.pos = start + len;
        SyntaxKind::from_keyword(&self.source[start..self.pos]).unwrap_or(SyntaxKind::Identifier)
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let bytes = self.source.as_bytes();
        let mut i = self.pos;
        let mut seen_dot = false;
        while let Some(&b) = bytes.get(i) {
            if b.is_ascii_digit() || b == b'_' {
                i += 1;
            } else if b == b'.' && !seen_dot && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
                seen_dot = true;
                i += 1;
            } else {
                break;
            }
        }
        // Type suffixes: 10m, 1.5f, 3L, 2UL ...
        while let Some(&b) = bytes.get(i) {
            if matches!(b, b'm' | b'M' | b'f' | b'F' | b'd' | b'D' | b'l' | b'L' | b'u' | b'U') {
                i += 1;
            } else {
                break;
            }
        }
        self.pos = i;
        SyntaxKind::NumericLiteral
    }

    /// Scan `"..."`, `$"..."` or `@"..."`; `prefix` is the length of the sigil.
    fn scan_string(&mut self, prefix: usize) -> SyntaxKind {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        let verbatim = prefix == 1 && bytes[start] == b'@';
        let mut i = start + prefix + 1;
        loop {
            match bytes.get(i) {
                None => break,
                Some(b'\n') | Some(b'\r') if !verbatim => break,
                Some(b'\\') if !verbatim => i += 2,
                Some(b'"') if verbatim && bytes.get(i + 1) == Some(&b'"') => i += 2,
                Some(b'"') => {
                    self.pos = i + 1;
                    return SyntaxKind::StringLiteral;
                }
                Some(_) => i += 1,
            }
        }
        let end = i.min(bytes.len());
        self.error_here(
            start,
            end - start,
            &diagnostic_messages::UNTERMINATED_STRING_LITERAL,
            &[],
        );
        self.pos = end;
        SyntaxKind::StringLiteral
    }

    fn scan_char(&mut self) -> SyntaxKind {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        let mut i = start + 1;
        while let Some(&b) = bytes.get(i) {
            match b {
                b'\\' => i += 2,
                b'\'' => {
                    self.pos = i + 1;
                    return SyntaxKind::CharLiteral;
                }
                b'\n' | b'\r' => break,
                _ => i += 1,
            }
        }
        let end = i.min(bytes.len());
        self.error_here(
            start,
            end - start,
            &diagnostic_messages::UNTERMINATED_STRING_LITERAL,
            &[],
        );
        self.pos = end;
        SyntaxKind::CharLiteral
    }

    /// Report a block comment in the trivia run at `from` that never closes.
    fn check_unterminated_comment(&mut self, from: u32) {
        let rest = &self.source[from as usize..];
        let bytes = rest.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C => i += 1,
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => match rest[i + 2..].find("*/") {
                    Some(close) => i += close + 4,
                    None => {
                        let start = from as usize + i;
                        self.error_here(
                            start,
                            self.source.len() - start,
                            &diagnostic_messages::UNTERMINATED_COMMENT,
                            &[],
                        );
                        return;
                    }
                },
                _ => return,
            }
        }
    }

    fn error_here(
        &mut self,
        start: usize,
        length: usize,
        message: &typize_common::DiagnosticMessage,
        args: &[&str],
    ) {
        self.diagnostics.push(Diagnostic::from_message(
            self.file_name,
            start as u32,
            length as u32,
            message,
            args,
        ));
    }
}

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod tests;
