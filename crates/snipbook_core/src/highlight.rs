//! Regex-rule syntax highlighting for the supported snippet languages.
//!
//! Each [`Language`] owns a static [`LanguageRules`] table. Rules are applied
//! in table order and a later rule repaints bytes an earlier rule already
//! coloured, so strings and comments win over the operators inside them.

use crate::placeholder::PLACEHOLDER_PATTERN;
use regex::Regex;
use std::sync::OnceLock;

/// Languages with a highlighting rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    PlainText,
    Python,
    Cpp,
    Markdown,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::PlainText,
        Language::Python,
        Language::Cpp,
        Language::Markdown,
    ];

    /// Display name for the language.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::PlainText => "Plain text",
            Language::Python => "Python",
            Language::Cpp => "C++",
            Language::Markdown => "Markdown",
        }
    }

    /// Static rule table for this language.
    pub fn rules(self) -> &'static LanguageRules {
        match self {
            Language::PlainText => &PLAIN_TEXT_RULES,
            Language::Python => &PYTHON_RULES,
            Language::Cpp => &CPP_RULES,
            Language::Markdown => &MARKDOWN_RULES,
        }
    }
}

/// Token categories painted by the highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Keyword,
    Operator,
    Brace,
    Definition,
    String,
    Comment,
    SelfRef,
    Number,
    Placeholder,
    Heading,
    Emphasis,
    InlineCode,
    Link,
}

/// Foreground colour and font flags for a [`TokenClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStyle {
    pub rgb: [u8; 3],
    pub bold: bool,
    pub italic: bool,
}

const fn style(rgb: [u8; 3], bold: bool, italic: bool) -> TokenStyle {
    TokenStyle { rgb, bold, italic }
}

impl TokenClass {
    /// Stable lowercase name, e.g. for JSON output.
    pub fn name(self) -> &'static str {
        match self {
            TokenClass::Keyword => "keyword",
            TokenClass::Operator => "operator",
            TokenClass::Brace => "brace",
            TokenClass::Definition => "definition",
            TokenClass::String => "string",
            TokenClass::Comment => "comment",
            TokenClass::SelfRef => "self",
            TokenClass::Number => "number",
            TokenClass::Placeholder => "placeholder",
            TokenClass::Heading => "heading",
            TokenClass::Emphasis => "emphasis",
            TokenClass::InlineCode => "inline_code",
            TokenClass::Link => "link",
        }
    }

    pub fn style(self) -> TokenStyle {
        match self {
            TokenClass::Keyword => style([200, 120, 50], true, false),
            TokenClass::Operator => style([150, 150, 150], false, false),
            TokenClass::Brace => style([169, 169, 169], false, false),
            TokenClass::Definition => style([128, 0, 128], true, false),
            TokenClass::String => style([20, 110, 100], false, false),
            TokenClass::Comment => style([70, 70, 70], false, true),
            TokenClass::SelfRef => style([150, 85, 140], false, true),
            TokenClass::Number => style([100, 150, 190], false, false),
            TokenClass::Placeholder => style([255, 0, 255], true, false),
            TokenClass::Heading => style([200, 120, 50], true, false),
            TokenClass::Emphasis => style([150, 85, 140], false, true),
            TokenClass::InlineCode => style([20, 110, 100], false, false),
            TokenClass::Link => style([100, 150, 190], false, false),
        }
    }
}

/// A pattern with the capture group to paint.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub pattern: &'static str,
    pub group: usize,
    pub class: TokenClass,
}

const fn rule(pattern: &'static str, group: usize, class: TokenClass) -> PatternRule {
    PatternRule {
        pattern,
        group,
        class,
    }
}

/// Tokenizer description shared by every language.
#[derive(Debug)]
pub struct LanguageRules {
    /// Whole-word keywords.
    pub keywords: &'static [&'static str],
    /// Literal operator spellings.
    pub operators: &'static [&'static str],
    /// Literal bracket characters.
    pub braces: &'static [&'static str],
    /// Rules painted right after braces.
    pub leading: &'static [PatternRule],
    pub string_patterns: &'static [&'static str],
    pub comment_patterns: &'static [&'static str],
    /// Paint comments before strings so string literals win on overlap.
    pub comments_before_strings: bool,
    pub number_patterns: &'static [&'static str],
    /// Rules painted after placeholders, overriding everything else.
    pub trailing: &'static [PatternRule],
}

const OPERATORS: &[&str] = &[
    "=", "==", "!=", "<", "<=", ">", ">=", "+", "-", "*", "/", "//", "%", "**", "+=", "-=", "*=",
    "/=", "%=", "^", "|", "&", "~", ">>", "<<",
];

const PYTHON_OPERATORS: &[&str] = &[
    "=", "==", "!=", "<", "<=", ">", ">=", "+", "-", "*", "/", "//", "%", "**", "+=", "-=", "*=",
    "/=", "%=", "^", "|", "&", "~", ">>", "<<", "#",
];

const BRACES: &[&str] = &["{", "}", "(", ")", "[", "]"];

const QUOTED_STRINGS: &[&str] = &[r#""[^"\\]*(\\.[^"\\]*)*""#, r"'[^'\\]*(\\.[^'\\]*)*'"];

const NUMBERS: &[&str] = &[
    r"\b[+-]?[0-9]+[lL]?\b",
    r"\b[+-]?0[xX][0-9A-Fa-f]+[lL]?\b",
    r"\b[+-]?[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?\b",
];

static PLAIN_TEXT_RULES: LanguageRules = LanguageRules {
    keywords: &[],
    operators: &[],
    braces: &[],
    leading: &[],
    string_patterns: &[],
    comment_patterns: &[],
    comments_before_strings: false,
    number_patterns: &[],
    trailing: &[],
};

static PYTHON_RULES: LanguageRules = LanguageRules {
    keywords: &[
        "and", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
        "exec", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "not",
        "or", "pass", "print", "raise", "return", "try", "while", "yield", "None", "True",
        "False",
    ],
    operators: PYTHON_OPERATORS,
    braces: BRACES,
    leading: &[rule(r"\bself\b", 0, TokenClass::SelfRef)],
    string_patterns: QUOTED_STRINGS,
    comment_patterns: &[r"#[^\n]*"],
    comments_before_strings: false,
    number_patterns: NUMBERS,
    trailing: &[
        rule(r"\bdef\b\s*(\w+)", 1, TokenClass::Definition),
        rule(r"\bclass\b\s*(\w+)", 1, TokenClass::Definition),
    ],
};

static CPP_RULES: LanguageRules = LanguageRules {
    keywords: &[
        "alignas", "alignof", "and", "and_eq", "asm", "atomic_cancel", "atomic_commit",
        "atomic_noexcept", "auto", "bitand", "bitor", "bool", "break", "case", "catch", "char",
        "char8_t", "char16_t", "char32_t", "class", "compl", "concept", "const", "consteval",
        "constexpr", "constinit", "const_cast", "continue", "co_await", "co_return", "co_yield",
        "decltype", "default", "delete", "do", "double", "dynamic_cast", "else", "enum",
        "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if", "inline",
        "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq", "nullptr",
        "operator", "or", "or_eq", "private", "protected", "public", "reflexpr", "register",
        "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
        "static_assert", "static_cast", "struct", "switch", "synchronized", "template", "this",
        "thread_local", "throw", "true", "try", "typedef", "typeid", "typename", "union",
        "unsigned", "using", "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
        "include",
    ],
    operators: OPERATORS,
    braces: BRACES,
    leading: &[],
    string_patterns: QUOTED_STRINGS,
    comment_patterns: &[r"//[^\n]*", r"/\*.*?\*/"],
    comments_before_strings: true,
    number_patterns: NUMBERS,
    trailing: &[],
};

static MARKDOWN_RULES: LanguageRules = LanguageRules {
    keywords: &[],
    operators: &[],
    braces: &[],
    leading: &[
        rule(r"^#{1,6}\s.*", 0, TokenClass::Heading),
        rule(r"\*\*[^*]+\*\*|__[^_]+__", 0, TokenClass::Emphasis),
        rule(r"\*[^*\s][^*]*\*", 0, TokenClass::Emphasis),
        rule(r"\[[^\]]*\]\([^)]*\)", 0, TokenClass::Link),
        rule(r"`[^`]+`", 0, TokenClass::InlineCode),
    ],
    string_patterns: &[],
    comment_patterns: &[r"<!--.*?-->"],
    comments_before_strings: false,
    number_patterns: &[],
    trailing: &[],
};

/// A coloured byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub class: TokenClass,
}

#[derive(Debug)]
struct CompiledRule {
    regex: Regex,
    group: usize,
    class: TokenClass,
}

/// Compiled rule set for one language.
#[derive(Debug)]
pub struct Highlighter {
    language: Language,
    rules: Vec<CompiledRule>,
}

fn alternation(words: &[&str], whole_word: bool) -> Option<String> {
    if words.is_empty() {
        return None;
    }
    let mut escaped: Vec<String> = words.iter().map(|word| regex::escape(word)).collect();
    // Longest spelling first so `**` is not split into two `*`.
    escaped.sort_by_key(|word| std::cmp::Reverse(word.len()));
    let body = escaped.join("|");
    Some(if whole_word {
        format!(r"\b(?:{body})\b")
    } else {
        format!("(?:{body})")
    })
}

fn compile(pattern: &str, group: usize, class: TokenClass) -> CompiledRule {
    CompiledRule {
        regex: Regex::new(pattern).expect("static highlight pattern"),
        group,
        class,
    }
}

impl Highlighter {
    /// Compile the rule table of `language`.
    pub fn new(language: Language) -> Self {
        let table = language.rules();
        let mut rules = Vec::new();

        if let Some(pattern) = alternation(table.keywords, true) {
            rules.push(compile(&pattern, 0, TokenClass::Keyword));
        }
        if let Some(pattern) = alternation(table.operators, false) {
            rules.push(compile(&pattern, 0, TokenClass::Operator));
        }
        if let Some(pattern) = alternation(table.braces, false) {
            rules.push(compile(&pattern, 0, TokenClass::Brace));
        }
        for extra in table.leading {
            rules.push(compile(extra.pattern, extra.group, extra.class));
        }

        let strings = table
            .string_patterns
            .iter()
            .map(|pattern| compile(pattern, 0, TokenClass::String));
        let comments = table
            .comment_patterns
            .iter()
            .map(|pattern| compile(pattern, 0, TokenClass::Comment));
        if table.comments_before_strings {
            rules.extend(comments);
            rules.extend(strings);
        } else {
            rules.extend(strings);
            rules.extend(comments);
        }

        for pattern in table.number_patterns {
            rules.push(compile(pattern, 0, TokenClass::Number));
        }
        rules.push(compile(PLACEHOLDER_PATTERN, 0, TokenClass::Placeholder));
        for extra in table.trailing {
            rules.push(compile(extra.pattern, extra.group, extra.class));
        }

        Self { language, rules }
    }

    /// Shared, lazily compiled highlighter for `language`.
    pub fn shared(language: Language) -> &'static Highlighter {
        static CACHE: [OnceLock<Highlighter>; 4] = [
            OnceLock::new(),
            OnceLock::new(),
            OnceLock::new(),
            OnceLock::new(),
        ];
        let slot = match language {
            Language::PlainText => 0,
            Language::Python => 1,
            Language::Cpp => 2,
            Language::Markdown => 3,
        };
        CACHE[slot].get_or_init(|| Highlighter::new(language))
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Spans for a single line (no newline handling).
    pub fn highlight_line(&self, line: &str) -> Vec<HighlightSpan> {
        let mut paint: Vec<Option<TokenClass>> = vec![None; line.len()];
        for rule in &self.rules {
            for caps in rule.regex.captures_iter(line) {
                let Some(found) = caps.get(rule.group) else {
                    continue;
                };
                for slot in &mut paint[found.start()..found.end()] {
                    *slot = Some(rule.class);
                }
            }
        }
        collect_spans(&paint)
    }

    /// Spans for a whole document, highlighted line by line with absolute offsets.
    pub fn highlight(&self, text: &str) -> Vec<HighlightSpan> {
        let mut spans = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let body = line.strip_suffix('\n').unwrap_or(line);
            spans.extend(self.highlight_line(body).into_iter().map(|span| HighlightSpan {
                start: span.start + offset,
                end: span.end + offset,
                class: span.class,
            }));
            offset += line.len();
        }
        spans
    }
}

fn collect_spans(paint: &[Option<TokenClass>]) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    let mut current: Option<HighlightSpan> = None;
    for (idx, class) in paint.iter().enumerate() {
        if let (Some(span), Some(class)) = (current.as_mut(), class) {
            if span.class == *class {
                span.end = idx + 1;
                continue;
            }
        }
        if let Some(done) = current.take() {
            spans.push(done);
        }
        current = class.map(|class| HighlightSpan {
            start: idx,
            end: idx + 1,
            class,
        });
    }
    if let Some(done) = current {
        spans.push(done);
    }
    spans
}
