//! Text normalization for the TeX card templates.
//!
//! Page text goes through [`escape`] first: every character in it is literal,
//! so a backslash or brace from the page never becomes TeX syntax.
//! [`normalize`] then works on TeX built from escaped text, the break marker
//! and the emphasis commands. It collapses whitespace, keeps the sequences it
//! produces itself and escapes anything else, so applying it twice gives the
//! same text as applying it once.
//!
//! U+2013 is written as an en dash (`--`), not as a minus sign.

/// Whether paragraph structure survives normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Single-line values. [`BREAK`] markers become spaces.
    Inline,
    /// Multi-paragraph values. [`BREAK`] markers are kept.
    Block,
}

/// The break marker written between paragraphs and lines of block values.
pub const BREAK: &str = "\\\\";

/// Characters written as `\c`.
const ESCAPED: &[char] = &['{', '}', '%', '&', '#', '$', '_'];

/// Commands kept verbatim, together with the group that follows them.
const COMMANDS: &[&str] = &[
    "textbf",
    "textit",
    "textbackslash",
    "textasciitilde",
    "textasciicircum",
];

pub fn normalize(raw: &str, context: Context) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = Writer::new(context);

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => match chars.get(i + 1) {
                Some('\\') => {
                    out.line_break();
                    i += 2;
                }
                Some(&n) if ESCAPED.contains(&n) => {
                    out.escaped(n);
                    i += 2;
                }
                Some(n) if n.is_ascii_alphabetic() => {
                    let end = chars[i + 1..]
                        .iter()
                        .position(|c| !c.is_ascii_alphabetic())
                        .map_or(chars.len(), |p| i + 1 + p);
                    let name: String = chars[i + 1..end].iter().collect();
                    if COMMANDS.contains(&name.as_str()) {
                        out.push_str("\\");
                        out.push_str(&name);
                        i = end;
                        if chars.get(i) == Some(&'{') {
                            out.open_group();
                            i += 1;
                        }
                    } else {
                        out.push_str("\\textbackslash{}");
                        i += 1;
                    }
                }
                _ => {
                    out.push_str("\\textbackslash{}");
                    i += 1;
                }
            },
            '}' => {
                out.close_group_or_escape();
                i += 1;
            }
            c if ESCAPED.contains(&c) => {
                out.escaped(c);
                i += 1;
            }
            c if c.is_whitespace() => {
                out.space();
                i += 1;
            }
            c => {
                match spelled(c) {
                    Some(tex) => out.push_str(tex),
                    None => out.push_char(c),
                }
                i += 1;
            }
        }
    }

    out.finish()
}

/// Escapes text taken from a page. Whitespace runs become single spaces and
/// are kept at both ends, so escaped pieces can be joined as they are.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            c if ESCAPED.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => match spelled(c) {
                Some(tex) => out.push_str(tex),
                None => out.push(c),
            },
        }
    }
    out
}

/// The TeX spelling of characters that are not written as themselves.
fn spelled(c: char) -> Option<&'static str> {
    Some(match c {
        '~' => "\\textasciitilde{}",
        '^' => "\\textasciicircum{}",
        '\u{2013}' => "--",
        '\u{2014}' => "---",
        '\u{2018}' => "`",
        '\u{2019}' => "'",
        '\u{201c}' => "``",
        '\u{201d}' => "''",
        _ => return None,
    })
}

/// Collapses whitespace runs to single spaces and trims. No escaping.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    Space,
    Break,
}

struct Writer {
    out: String,
    pending: Pending,
    depth: usize,
    context: Context,
}

impl Writer {
    fn new(context: Context) -> Self {
        Writer {
            out: String::new(),
            pending: Pending::None,
            depth: 0,
            context,
        }
    }

    fn flush(&mut self) {
        if !self.out.is_empty() {
            match self.pending {
                Pending::Space => self.out.push(' '),
                Pending::Break => self.out.push_str(BREAK),
                Pending::None => {}
            }
        }
        self.pending = Pending::None;
    }

    fn push_str(&mut self, s: &str) {
        self.flush();
        self.out.push_str(s);
    }

    fn push_char(&mut self, c: char) {
        self.flush();
        self.out.push(c);
    }

    fn escaped(&mut self, c: char) {
        self.flush();
        self.out.push('\\');
        self.out.push(c);
    }

    fn space(&mut self) {
        if self.pending == Pending::None {
            self.pending = Pending::Space;
        }
    }

    fn line_break(&mut self) {
        match self.context {
            Context::Block => self.pending = Pending::Break,
            Context::Inline => self.space(),
        }
    }

    fn open_group(&mut self) {
        self.push_str("{");
        self.depth += 1;
    }

    fn close_group_or_escape(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
            self.push_str("}");
        } else {
            self.escaped('}');
        }
    }

    fn finish(mut self) -> String {
        for _ in 0..self.depth {
            self.out.push('}');
        }
        self.out
    }
}
