use proc_macro::TokenStream as TokenStream1;
use proc_macro2::{Delimiter, TokenStream, TokenTree, TokenTree::*};
use proc_macro_error::*;
use quote::{quote, ToTokens};

/// Generates static field tables for `spellcard_extractor::locate`.
///
/// See the documentation of `spellcard_extractor::field_table!` for the syntax.
#[proc_macro_error]
#[proc_macro]
pub fn field_table(input: TokenStream1) -> TokenStream1 {
    let mut input_iter: TokenStreamIter = TokenStream::from(input).into_iter().peekable();

    let mut tables = Vec::new();
    while !input_iter.is_finished() {
        tables.push(Table::parse(&mut input_iter));
    }

    quote!(#(#tables)*).into()
}

lazy_static::lazy_static! {
    static ref CRATE: String = proc_macro_crate::crate_name("spellcard-extractor").unwrap();
}

type TokenStreamIter = std::iter::Peekable<<TokenStream as IntoIterator>::IntoIter>;
trait TokenStreamIterExt {
    fn is_finished(&mut self) -> bool;
    fn peek_ex_str(&mut self, expected: &str) -> String;
    fn next_ex(&mut self, expected: &str) -> TokenTree;
    fn expect(&mut self, expect: &str);
    fn expect_or_none(&mut self, expect: &str);
    fn advance(&mut self, advance: usize);
}
impl TokenStreamIterExt for TokenStreamIter {
    fn is_finished(&mut self) -> bool {
        self.peek().is_none()
    }
    fn peek_ex_str(&mut self, expected: &str) -> String {
        self.peek()
            .unwrap_or_else(|| panic!("expected {}", expected))
            .to_string()
    }
    fn next_ex(&mut self, expected: &str) -> TokenTree {
        self.next()
            .unwrap_or_else(|| panic!("expected {}", expected))
    }
    fn expect(&mut self, expect: &str) {
        let next = self
            .next()
            .unwrap_or_else(|| panic!("expected `{}`", expect));
        if next.to_string() != expect {
            abort!(next, "expected `{}`, found `{}`", expect, next);
        }
    }
    fn expect_or_none(&mut self, expect: &str) {
        let next = match self.next() {
            Some(n) => n,
            None => return,
        };
        if next.to_string() != expect {
            abort!(next, "expected `{}`, found `{}`", expect, next);
        }
    }
    fn advance(&mut self, advance: usize) {
        for _ in 0..advance {
            self.next();
        }
    }
}

enum Visibility {
    Private,
    Public,
    PublicIn(TokenStream),
}
impl Visibility {
    fn parse(ts: &mut TokenStreamIter) -> Visibility {
        let iter_advance;
        let vis = match &*ts.peek_ex_str("`pub` or identifier") {
            "pub" => {
                ts.next();
                match ts.peek() {
                    Some(Group(g)) if g.delimiter() == Delimiter::Parenthesis => {
                        iter_advance = 1;
                        Visibility::PublicIn(g.stream())
                    }
                    _ => {
                        iter_advance = 0;
                        Visibility::Public
                    }
                }
            }
            _ => {
                iter_advance = 0;
                Visibility::Private
            }
        };
        ts.advance(iter_advance);
        vis
    }
}
impl ToTokens for Visibility {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Visibility::Private => quote!(),
            Visibility::Public => quote!(pub),
            Visibility::PublicIn(s) => quote!(pub (#s)),
        });
    }
}

struct Attributes {
    tokens: Vec<TokenTree>,
}
impl Attributes {
    fn parse(ts: &mut TokenStreamIter) -> Attributes {
        let mut tokens = Vec::new();
        while ts.peek_ex_str("attribute, visibility or identifier") == "#" {
            tokens.push(ts.next_ex("`#`"));
            tokens.push(ts.next_ex("`[..]`"));
        }
        Attributes { tokens }
    }
}
impl ToTokens for Attributes {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(self.tokens.clone());
    }
}

struct Table {
    attr: Attributes,
    vis: Visibility,
    name: TokenTree,
    fields: Vec<Field>,
}
impl Table {
    fn parse(ts: &mut TokenStreamIter) -> Table {
        let attr = Attributes::parse(ts);
        let vis = Visibility::parse(ts);
        let name = ts.next_ex("identifier");

        let mut fields: Vec<Field> = Vec::new();
        match ts.next_ex("{{..}}") {
            Group(g) if g.delimiter() == Delimiter::Brace => {
                let mut body_ts = g.stream().into_iter().peekable();
                while !body_ts.is_finished() {
                    let field = Field::parse(&mut body_ts);
                    if fields
                        .iter()
                        .any(|f| f.name.to_string() == field.name.to_string())
                    {
                        abort!(field.name, "field `{}` is defined twice", field.name);
                    }
                    fields.push(field);
                    body_ts.expect_or_none(",");
                }
            }
            tt => abort!(tt, "expected {{..}}, found `{}`", tt),
        }
        if fields.is_empty() {
            abort!(name, "table `{}` has no fields", name);
        }

        Table {
            attr,
            vis,
            name,
            fields,
        }
    }
}
impl ToTokens for Table {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let attr = &self.attr;
        let vis = &self.vis;
        let name = &self.name;

        let _crate = CRATE.parse::<TokenStream>().unwrap();
        let rules = self.fields.iter().map(|f| f.rule_tokens(&_crate));

        tokens.extend(quote!(
            #attr
            #vis static #name: &[#_crate::locate::FieldRule] = &[
                #(#rules,)*
            ];
        ));
    }
}

struct Field {
    name: TokenTree,
    strategies: Vec<Strategy>,
    capture: Option<TokenTree>,
    plain: bool,
}
impl Field {
    fn parse(ts: &mut TokenStreamIter) -> Field {
        let name = ts.next_ex("field name");
        if !matches!(name, Ident(_)) {
            abort!(name, "expected field name, found `{}`", name);
        }

        ts.expect("=");

        let rule_tt = ts.next_ex("`(..)`");
        let mut rule_ts: TokenStreamIter = match &rule_tt {
            Group(g) if g.delimiter() == Delimiter::Parenthesis => {
                g.stream().into_iter().peekable()
            }
            tt => abort!(tt, "expected `(..)`, found `{}`", tt),
        };
        if rule_ts.is_finished() {
            abort!(rule_tt, "field `{}` has no strategies", name);
        }

        let mut strategies = vec![Strategy::parse(&mut rule_ts)];
        let mut capture = None;
        let mut plain = false;
        while !rule_ts.is_finished() {
            let sep = rule_ts.next_ex("`|` or `,`");
            match &*sep.to_string() {
                "|" => strategies.push(Strategy::parse(&mut rule_ts)),
                "," => {
                    if rule_ts.is_finished() {
                        break;
                    }
                    let option = rule_ts.next_ex("`capture` or `plain`");
                    match &*option.to_string() {
                        "capture" => {
                            rule_ts.expect("with");
                            let regex = rule_ts.next_ex("literal string");
                            match regex::Regex::new(&get_literal_str_value(&regex)) {
                                Ok(r) if r.captures_len() == 2 => {}
                                Ok(_) => abort!(regex, "the capture regex must have exactly one group"),
                                Err(err) => abort!(regex, "cannot parse the regex: {:?}", err),
                            }
                            capture = Some(regex);
                        }
                        "plain" => plain = true,
                        _ => abort!(option, "expected `capture` or `plain`, found `{}`", option),
                    }
                }
                _ => abort!(sep, "expected `|` or `,`, found `{}`", sep),
            }
        }

        Field {
            name,
            strategies,
            capture,
            plain,
        }
    }

    fn is_block(&self) -> bool {
        self.strategies
            .iter()
            .any(|s| matches!(s, Strategy::SectionAfter(_)))
    }

    fn rule_tokens(&self, _crate: &TokenStream) -> TokenStream {
        let field = self.name.to_string();
        let context = if self.is_block() {
            quote!(#_crate::normalize::Context::Block)
        } else {
            quote!(#_crate::normalize::Context::Inline)
        };
        let strategies = self.strategies.iter().map(|s| s.to_tokens(_crate));
        let capture = match &self.capture {
            Some(regex) => quote! {
                ::std::option::Option::Some({
                    fn __capture() -> &'static #_crate::regex::Regex {
                        #_crate::lazy_static::lazy_static! {
                            static ref REGEX: #_crate::regex::Regex = #_crate::regex::Regex::new(#regex).unwrap();
                        }
                        &*REGEX
                    }
                    __capture as fn() -> &'static #_crate::regex::Regex
                })
            },
            None => quote!(::std::option::Option::None),
        };

        let plain = self.plain;

        quote! {
            #_crate::locate::FieldRule {
                field: #field,
                context: #context,
                strategies: &[#(#strategies,)*],
                capture: #capture,
                plain: #plain,
            }
        }
    }
}

enum Strategy {
    //0 = heading tag
    Heading(TokenTree),
    //0 = label
    TextAfter(TokenTree),
    //0 = start label, 1 = end label
    TextBetween(TokenTree, TokenTree),
    //0 = selector
    TextOf(TokenTree),
    //0 = heading label
    SectionAfter(TokenTree),
    //0 = fixed value
    Literal(TokenTree),
    //0 = part, 1 = label
    Craft(TokenTree, TokenTree),
}
impl Strategy {
    fn parse(ts: &mut TokenStreamIter) -> Strategy {
        let kind = ts.next_ex("`heading`, `text`, `section`, `literal` or `craft`");
        match &*kind.to_string() {
            "heading" => {
                let tag = ts.next_ex("literal string");
                match &*get_literal_str_value(&tag) {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {}
                    other => abort!(tag, "`{}` is not a heading tag", other),
                }
                Strategy::Heading(tag)
            }
            "text" => {
                let how = ts.next_ex("`after`, `between` or `of`");
                match &*how.to_string() {
                    "after" => Strategy::TextAfter(label(ts)),
                    "between" => {
                        let start = label(ts);
                        ts.expect("and");
                        Strategy::TextBetween(start, label(ts))
                    }
                    "of" => {
                        let selector = ts.next_ex("literal string");
                        if let Err(err) = scraper::Selector::parse(&get_literal_str_value(&selector)) {
                            abort!(selector, "cannot parse the selector: {:?}", err);
                        }
                        Strategy::TextOf(selector)
                    }
                    _ => abort!(how, "expected `after`, `between` or `of`, found `{}`", how),
                }
            }
            "section" => {
                ts.expect("after");
                Strategy::SectionAfter(label(ts))
            }
            "literal" => {
                let value = ts.next_ex("literal string");
                get_literal_str_value(&value);
                Strategy::Literal(value)
            }
            "craft" => {
                let part = ts.next_ex("`feat`, `spells` or `other`");
                match &*part.to_string() {
                    "feat" | "spells" | "other" => {}
                    _ => abort!(part, "expected `feat`, `spells` or `other`, found `{}`", part),
                }
                ts.expect("of");
                Strategy::Craft(part, label(ts))
            }
            _ => abort!(
                kind,
                "expected `heading`, `text`, `section`, `literal` or `craft`, found `{}`",
                kind
            ),
        }
    }

    fn name(&self) -> String {
        match self {
            Strategy::Heading(tag) => format!("heading {}", get_literal_str_value(tag)),
            Strategy::TextAfter(l) => format!("text after {:?}", get_literal_str_value(l)),
            Strategy::TextBetween(s, e) => format!(
                "text between {:?} and {:?}",
                get_literal_str_value(s),
                get_literal_str_value(e)
            ),
            Strategy::TextOf(s) => format!("text of {:?}", get_literal_str_value(s)),
            Strategy::SectionAfter(l) => format!("section after {:?}", get_literal_str_value(l)),
            Strategy::Literal(v) => format!("literal {:?}", get_literal_str_value(v)),
            Strategy::Craft(part, l) => format!("craft {} of {:?}", part, get_literal_str_value(l)),
        }
    }

    fn to_tokens(&self, _crate: &TokenStream) -> TokenStream {
        let name = self.name();
        let lookup = match self {
            Strategy::Heading(tag) => quote!(#_crate::locate::Lookup::Heading(#tag)),
            Strategy::TextAfter(l) => quote!(#_crate::locate::Lookup::TextAfter(#l)),
            Strategy::TextBetween(s, e) => quote!(#_crate::locate::Lookup::TextBetween(#s, #e)),
            Strategy::TextOf(s) => quote!(#_crate::locate::Lookup::TextOf(#s)),
            Strategy::SectionAfter(l) => quote!(#_crate::locate::Lookup::SectionAfter(#l)),
            Strategy::Literal(v) => quote!(#_crate::locate::Lookup::Literal(#v)),
            Strategy::Craft(part, l) => {
                let part = match &*part.to_string() {
                    "feat" => quote!(Feat),
                    "spells" => quote!(Spells),
                    _ => quote!(Other),
                };
                quote!(#_crate::locate::Lookup::Crafting(#l, #_crate::locate::CraftPart::#part))
            }
        };
        quote! {
            #_crate::locate::Strategy {
                name: #name,
                lookup: #lookup,
            }
        }
    }
}

fn label(ts: &mut TokenStreamIter) -> TokenTree {
    let label = ts.next_ex("literal string");
    if get_literal_str_value(&label).trim().is_empty() {
        abort!(label, "label must not be empty");
    }
    label
}

fn get_literal_str_value(tt: &TokenTree) -> String {
    let ts = quote!(#tt);
    let lit_str: syn::LitStr =
        syn::parse2(ts).unwrap_or_else(|_| abort!(tt, "expected literal string, found `{}`", tt));
    lit_str.value()
}
