use core::fmt;
use core::str;

use memchr::{memchr, memchr3};

use crate::options::DelimitedOptions;

/// The quoting style to use when writing delimited data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuoteStyle {
    /// This puts quotes around every field. Always.
    Always,
    /// This puts quotes around fields only when necessary.
    ///
    /// They are necessary when fields contain a quote, delimiter or line
    /// terminator (`\r` or `\n`).
    ///
    /// This is the default.
    Necessary,
    /// This *never* writes quotes.
    ///
    /// If a field requires quotes, then the writer will report an error.
    Never,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Necessary
    }
}

/// A field required quotes, but the quote style is `QuoteStyle::Never`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QuoteRequired;

impl fmt::Display for QuoteRequired {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "field requires quotes, but quote style is 'Never'")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for QuoteRequired {}

/// Decides whether fields need quoting and produces their quoted form.
///
/// This is the inverse of `Tokenizer`: every field quoted by a `Quoter` is
/// read back unchanged by a `Tokenizer` configured with the same options.
#[derive(Clone, Debug, Default)]
pub struct Quoter {
    opts: DelimitedOptions,
    style: QuoteStyle,
}

impl Quoter {
    /// Create a quoter using `QuoteStyle::Necessary`.
    pub fn new(opts: DelimitedOptions) -> Quoter {
        Quoter::with_style(opts, QuoteStyle::default())
    }

    /// Create a quoter with the given quote style.
    pub fn with_style(opts: DelimitedOptions, style: QuoteStyle) -> Quoter {
        Quoter { opts: opts, style: style }
    }

    /// The options this quoter currently uses.
    pub fn options(&self) -> &DelimitedOptions {
        &self.opts
    }

    /// Replace the options.
    pub fn set_options(&mut self, opts: DelimitedOptions) {
        self.opts = opts;
    }

    /// The quote style.
    pub fn style(&self) -> QuoteStyle {
        self.style
    }

    /// Replace the quote style.
    pub fn set_style(&mut self, style: QuoteStyle) {
        self.style = style;
    }

    /// Returns true if and only if the field contains the delimiter, the
    /// quote or a line terminator.
    pub fn needs_quotes(&self, field: &str) -> bool {
        let (delim, quote) = (self.opts.delimiter(), self.opts.quote());
        if delim.is_ascii() && quote.is_ascii() {
            // ASCII bytes never occur inside a multi-byte UTF-8 sequence,
            // so searching the raw bytes is exact.
            let bytes = field.as_bytes();
            memchr3(delim as u8, quote as u8, b'\n', bytes).is_some()
                || memchr(b'\r', bytes).is_some()
        } else {
            field
                .chars()
                .any(|c| c == delim || c == quote || c == '\r' || c == '\n')
        }
    }

    /// Decide whether the field should be quoted under the quote style.
    pub fn should_quote(&self, field: &str) -> Result<bool, QuoteRequired> {
        match self.style {
            QuoteStyle::Always => Ok(true),
            QuoteStyle::Necessary => Ok(self.needs_quotes(field)),
            QuoteStyle::Never => {
                if self.needs_quotes(field) {
                    Err(QuoteRequired)
                } else {
                    Ok(false)
                }
            }
        }
    }

    /// Return the quoted form of `field`, including the surrounding quotes.
    ///
    /// Quotes inside the field are doubled, or prefixed with the escape
    /// character when doubling is disabled. If an escape character is set,
    /// it is itself escaped.
    pub fn quoted<'a>(&self, field: &'a str) -> Quoted<'a> {
        let quote = self.opts.quote();
        let quote_escape = if self.opts.double_quote() {
            quote
        } else {
            self.opts.escape().unwrap_or(quote)
        };
        Quoted {
            chars: field.chars(),
            quote: quote,
            quote_escape: quote_escape,
            escape: self.opts.escape(),
            pending: None,
            stage: Stage::Open,
        }
    }
}

/// An iterator over the characters of a quoted field.
///
/// Created by `Quoter::quoted`. This also implements `Display`.
#[derive(Clone, Debug)]
pub struct Quoted<'a> {
    chars: str::Chars<'a>,
    quote: char,
    quote_escape: char,
    escape: Option<char>,
    pending: Option<char>,
    stage: Stage,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Stage {
    Open,
    Body,
    Done,
}

impl<'a> Iterator for Quoted<'a> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if let Some(c) = self.pending.take() {
            return Some(c);
        }
        match self.stage {
            Stage::Open => {
                self.stage = Stage::Body;
                Some(self.quote)
            }
            Stage::Body => match self.chars.next() {
                Some(c) if c == self.quote => {
                    self.pending = Some(c);
                    Some(self.quote_escape)
                }
                Some(c) if self.escape == Some(c) => {
                    self.pending = Some(c);
                    Some(c)
                }
                Some(c) => Some(c),
                None => {
                    self.stage = Stage::Done;
                    Some(self.quote)
                }
            },
            Stage::Done => None,
        }
    }
}

impl<'a> fmt::Display for Quoted<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use core::fmt::Write;

        for c in self.clone() {
            f.write_char(c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{QuoteRequired, QuoteStyle, Quoter};
    use crate::options::{DelimitedOptions, OptionsBuilder};

    fn quoter(config: impl FnOnce(&mut OptionsBuilder)) -> Quoter {
        let mut builder = OptionsBuilder::new();
        config(&mut builder);
        Quoter::new(builder.build().unwrap())
    }

    macro_rules! quotes_as {
        ($name:ident, $field:expr, $expected:expr) => {
            quotes_as!($name, $field, $expected, |_| {});
        };
        ($name:ident, $field:expr, $expected:expr, $config:expr) => {
            #[test]
            fn $name() {
                let q = quoter($config);
                assert!(q.needs_quotes($field), "field should need quotes");
                assert_eq!($expected, q.quoted($field).to_string());
            }
        };
    }

    macro_rules! stays_plain {
        ($name:ident, $field:expr) => {
            stays_plain!($name, $field, |_| {});
        };
        ($name:ident, $field:expr, $config:expr) => {
            #[test]
            fn $name() {
                assert!(!quoter($config).needs_quotes($field));
            }
        };
    }

    stays_plain!(plain_word, "Hello");
    stays_plain!(plain_empty, "");
    stays_plain!(plain_spaces, "  a b  ");
    stays_plain!(plain_unicode, "snowman ☃");
    stays_plain!(plain_other_delimiter, "a,b", |b: &mut OptionsBuilder| {
        b.delimiter(';');
    });
    stays_plain!(plain_escape_char, r"a\b", |b: &mut OptionsBuilder| {
        b.escape(Some('\\'));
    });

    quotes_as!(delimiter, "a,b", "\"a,b\"");
    quotes_as!(lf, "a\nb", "\"a\nb\"");
    quotes_as!(cr, "a\rb", "\"a\rb\"");
    quotes_as!(crlf, "a\r\nb", "\"a\r\nb\"");
    quotes_as!(quote, "say \"hi\"", "\"say \"\"hi\"\"\"");
    quotes_as!(only_quote, "\"", "\"\"\"\"");
    quotes_as!(tab_delimiter, "a\tb", "\"a\tb\"", |b: &mut OptionsBuilder| {
        b.delimiter('\t');
    });
    quotes_as!(
        non_ascii_delimiter,
        "a§b",
        "\"a§b\"",
        |b: &mut OptionsBuilder| {
            b.delimiter('§');
        }
    );
    quotes_as!(
        non_ascii_quote,
        "«x»",
        "«««x»«",
        |b: &mut OptionsBuilder| {
            b.quote('«');
        }
    );
    quotes_as!(
        escaped_quote,
        "a\"b",
        r#""a\"b""#,
        |b: &mut OptionsBuilder| {
            b.double_quote(false).escape(Some('\\'));
        }
    );
    quotes_as!(
        escaped_escape,
        "a\\\"b",
        r#""a\\""b""#,
        |b: &mut OptionsBuilder| {
            b.escape(Some('\\'));
        }
    );

    #[test]
    fn style_always_quotes_everything() {
        let q = Quoter::with_style(DelimitedOptions::default(), QuoteStyle::Always);
        assert_eq!(Ok(true), q.should_quote("plain"));
        assert_eq!(Ok(true), q.should_quote(""));
        assert_eq!("\"\"", q.quoted("").to_string());
    }

    #[test]
    fn style_necessary_is_default() {
        let q = Quoter::new(DelimitedOptions::default());
        assert_eq!(QuoteStyle::Necessary, q.style());
        assert_eq!(Ok(false), q.should_quote("plain"));
        assert_eq!(Ok(true), q.should_quote("a,b"));
    }

    #[test]
    fn style_never_rejects() {
        let mut q = Quoter::new(DelimitedOptions::default());
        q.set_style(QuoteStyle::Never);
        assert_eq!(Ok(false), q.should_quote("plain"));
        assert_eq!(Err(QuoteRequired), q.should_quote("a,b"));
    }

    #[test]
    fn set_options_changes_decision() {
        let mut q = Quoter::new(DelimitedOptions::default());
        assert!(q.needs_quotes("a,b"));
        q.set_options(DelimitedOptions::tsv());
        assert!(!q.needs_quotes("a,b"));
        assert!(q.needs_quotes("a\tb"));
    }

    #[test]
    fn quoted_iterates_chars() {
        let q = Quoter::new(DelimitedOptions::default());
        let got: Vec<char> = q.quoted("a\"").collect();
        assert_eq!(vec!['"', 'a', '"', '"', '"'], got);
    }
}
