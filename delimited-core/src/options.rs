#[cfg(feature = "serde")]
use core::convert::TryFrom;
use core::fmt;

/// The configuration shared by every tokenizer and quoter.
///
/// A `DelimitedOptions` value is checked once, when it is built, and is
/// immutable afterwards. Readers and writers hold their own copy and consult
/// it on every call, so replacing the options on a reader or writer only
/// affects what it does next.
///
/// The default options describe RFC 4180 CSV: fields are separated by `,`,
/// quoted with `"` and quotes inside quoted fields are escaped by doubling
/// them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawOptions"))]
pub struct DelimitedOptions {
    delimiter: char,
    quote: char,
    double_quote: bool,
    escape: Option<char>,
    allow_unterminated_quotes: bool,
}

impl Default for DelimitedOptions {
    fn default() -> DelimitedOptions {
        DelimitedOptions {
            delimiter: ',',
            quote: '"',
            double_quote: true,
            escape: None,
            allow_unterminated_quotes: false,
        }
    }
}

impl DelimitedOptions {
    /// Create options with the given delimiter and the default quote, `"`.
    ///
    /// This fails if the delimiter is `"` or a line terminator.
    pub fn new(delimiter: char) -> Result<DelimitedOptions, ConfigError> {
        OptionsBuilder::new().delimiter(delimiter).build()
    }

    /// Create options with the given delimiter and quote characters.
    pub fn with_quote(
        delimiter: char,
        quote: char,
    ) -> Result<DelimitedOptions, ConfigError> {
        OptionsBuilder::new().delimiter(delimiter).quote(quote).build()
    }

    /// Start building options from the defaults.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }

    /// Options for tab separated values.
    ///
    /// TSV is treated exactly like CSV with a tab delimiter.
    pub fn tsv() -> DelimitedOptions {
        DelimitedOptions { delimiter: '\t', ..DelimitedOptions::default() }
    }

    /// Options for ASCII delimited text, which separates fields with the
    /// ASCII unit separator (`\x1F`).
    pub fn ascii() -> DelimitedOptions {
        DelimitedOptions { delimiter: '\x1F', ..DelimitedOptions::default() }
    }

    /// The field delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The quote character.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// Whether a quote inside a quoted field is escaped by doubling it.
    pub fn double_quote(&self) -> bool {
        self.double_quote
    }

    /// The escape character recognized inside quoted fields, if any.
    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    /// Whether a quoted field left open at the end of the input is closed
    /// implicitly instead of being reported as malformed.
    pub fn allow_unterminated_quotes(&self) -> bool {
        self.allow_unterminated_quotes
    }

    /// Return a builder seeded with these options.
    pub fn to_builder(&self) -> OptionsBuilder {
        OptionsBuilder { opts: *self }
    }

    fn validate(self) -> Result<DelimitedOptions, ConfigError> {
        if is_line_terminator(self.delimiter) {
            return Err(ConfigError::LineTerminator { ch: self.delimiter });
        }
        if is_line_terminator(self.quote) {
            return Err(ConfigError::LineTerminator { ch: self.quote });
        }
        if self.delimiter == self.quote {
            return Err(ConfigError::DelimiterIsQuote { ch: self.quote });
        }
        match self.escape {
            Some(esc) if is_line_terminator(esc) => {
                return Err(ConfigError::LineTerminator { ch: esc });
            }
            Some(esc) if esc == self.delimiter || esc == self.quote => {
                return Err(ConfigError::EscapeConflict { ch: esc });
            }
            None if !self.double_quote => {
                return Err(ConfigError::NoQuoteEscape);
            }
            _ => {}
        }
        Ok(self)
    }
}

/// Builds validated `DelimitedOptions`.
///
/// Every setter starts from the defaults described on `DelimitedOptions`.
/// Nothing is checked until `build` is called.
#[derive(Clone, Debug, Default)]
pub struct OptionsBuilder {
    opts: DelimitedOptions,
}

impl OptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Check the configuration and produce the options.
    pub fn build(&self) -> Result<DelimitedOptions, ConfigError> {
        self.opts.validate()
    }

    /// The field delimiter. The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut OptionsBuilder {
        self.opts.delimiter = delimiter;
        self
    }

    /// The quote character. The default is `"`.
    pub fn quote(&mut self, quote: char) -> &mut OptionsBuilder {
        self.opts.quote = quote;
        self
    }

    /// Enable or disable escaping quotes by doubling them.
    ///
    /// This is enabled by default. When disabled, an escape character must
    /// be set, since that is then the only way to write a literal quote.
    pub fn double_quote(&mut self, yes: bool) -> &mut OptionsBuilder {
        self.opts.double_quote = yes;
        self
    }

    /// The escape character to recognize inside quoted fields.
    ///
    /// In some variants of CSV, quotes are escaped using a special escape
    /// character like `\` (instead of escaping quotes by doubling them).
    /// Recognizing escapes is disabled by default.
    pub fn escape(&mut self, escape: Option<char>) -> &mut OptionsBuilder {
        self.opts.escape = escape;
        self
    }

    /// Treat a quoted field that is still open at the end of the input as
    /// if it were closed there.
    ///
    /// This is disabled by default, which makes such input malformed.
    pub fn allow_unterminated_quotes(
        &mut self,
        yes: bool,
    ) -> &mut OptionsBuilder {
        self.opts.allow_unterminated_quotes = yes;
        self
    }
}

/// An invalid combination of options.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// The delimiter and the quote are the same character.
    DelimiterIsQuote {
        /// The shared character.
        ch: char,
    },
    /// A delimiter, quote or escape was set to `\r` or `\n`.
    LineTerminator {
        /// The offending character.
        ch: char,
    },
    /// The escape character collides with the delimiter or quote.
    EscapeConflict {
        /// The offending character.
        ch: char,
    },
    /// Quote doubling is disabled but no escape character is set.
    NoQuoteEscape,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigError::DelimiterIsQuote { ch } => write!(
                f,
                "delimiter and quote must differ, but both are {:?}",
                ch
            ),
            ConfigError::LineTerminator { ch } => write!(
                f,
                "{:?} is a line terminator and cannot be used as a \
                 delimiter, quote or escape",
                ch
            ),
            ConfigError::EscapeConflict { ch } => write!(
                f,
                "escape character {:?} collides with the delimiter or quote",
                ch
            ),
            ConfigError::NoQuoteEscape => write!(
                f,
                "quote doubling is disabled, so an escape character is \
                 required"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

fn is_line_terminator(c: char) -> bool {
    c == '\r' || c == '\n'
}

/// The unchecked shape of `DelimitedOptions` as it appears in configuration
/// files. Missing keys take their default values.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default)]
struct RawOptions {
    delimiter: char,
    quote: char,
    double_quote: bool,
    escape: Option<char>,
    allow_unterminated_quotes: bool,
}

#[cfg(feature = "serde")]
impl Default for RawOptions {
    fn default() -> RawOptions {
        let d = DelimitedOptions::default();
        RawOptions {
            delimiter: d.delimiter,
            quote: d.quote,
            double_quote: d.double_quote,
            escape: d.escape,
            allow_unterminated_quotes: d.allow_unterminated_quotes,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawOptions> for DelimitedOptions {
    type Error = ConfigError;

    fn try_from(raw: RawOptions) -> Result<DelimitedOptions, ConfigError> {
        DelimitedOptions {
            delimiter: raw.delimiter,
            quote: raw.quote,
            double_quote: raw.double_quote,
            escape: raw.escape,
            allow_unterminated_quotes: raw.allow_unterminated_quotes,
        }
        .validate()
    }
}
