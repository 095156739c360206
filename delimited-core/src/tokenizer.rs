use core::fmt;

use crate::options::DelimitedOptions;

/// The states of the tokenizer.
///
/// Every record begins in `FieldStart`. Quoted fields need two states beyond
/// `QuotedField`: after a quote is seen inside a quoted field, the next
/// character decides whether the quote closed the field or was the first
/// half of a doubled (escaped) quote.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// At the beginning of a field (and possibly of a record).
    FieldStart,
    /// Inside a field that did not start with a quote.
    UnquotedField,
    /// Inside a quoted field.
    QuotedField,
    /// A quote was seen inside a quoted field.
    QuoteSeenInsideQuotedField,
    /// The escape character was seen inside a quoted field.
    EscapeSeenInsideQuotedField,
    /// A record was just terminated by a line terminator.
    RecordEnd,
    /// All input has been consumed. The tokenizer never leaves this state.
    StreamEnd,
}

/// What the caller should do with the character that was just fed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// The character was consumed and produced nothing.
    Consumed,
    /// Append this character to the current field.
    Append(char),
    /// The current field ended. More fields follow in the same record.
    EndField,
    /// The current field ended, and so did the record.
    EndRecord,
    /// There are no more records.
    End,
}

/// Malformed input found by the tokenizer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenError {
    /// The input ended inside a quoted field.
    UnterminatedQuote,
    /// A quote closed a field but was followed by something other than a
    /// delimiter, a line terminator or the end of the input.
    CharAfterClosingQuote {
        /// The character found after the closing quote.
        found: char,
    },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TokenError::UnterminatedQuote => {
                write!(f, "quoted field is not terminated")
            }
            TokenError::CharAfterClosingQuote { found } => write!(
                f,
                "unexpected character {:?} after closing quote",
                found
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TokenError {}

/// A pull based, character-at-a-time tokenizer for delimited text.
///
/// The tokenizer owns no buffers and performs no I/O. Callers feed it one
/// character at a time (or `None` once the input is exhausted) and act on
/// the returned `Action`. Field data is never copied by the tokenizer; it
/// tells the caller which characters belong to the current field.
///
/// A line terminator is `\r`, `\n` or `\r\n`, which is treated as a single
/// terminator. An empty line is a record with one empty field. Empty input
/// produces no records.
///
/// # Termination
///
/// Once the input is exhausted, callers should keep feeding `None` until
/// `Action::End` is returned. Feeding `None` may first produce the last
/// field and record of the input.
///
/// # Errors
///
/// Malformed quoting is reported as a `TokenError`. After an error, the
/// tokenizer starts a new record with the next character it is fed, or
/// reports the end of the input if the error was found there.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    opts: DelimitedOptions,
    state: State,
    /// Whether any character of the current record has been consumed.
    in_record: bool,
    /// Whether the last record ended with `\r`, in which case a directly
    /// following `\n` belongs to the same terminator.
    ended_on_cr: bool,
    line: u64,
}

impl Default for Tokenizer {
    fn default() -> Tokenizer {
        Tokenizer::new(DelimitedOptions::default())
    }
}

impl Tokenizer {
    /// Create a new tokenizer for the given options.
    pub fn new(opts: DelimitedOptions) -> Tokenizer {
        Tokenizer {
            opts: opts,
            state: State::FieldStart,
            in_record: false,
            ended_on_cr: false,
            line: 1,
        }
    }

    /// The options this tokenizer currently uses.
    pub fn options(&self) -> &DelimitedOptions {
        &self.opts
    }

    /// Replace the options. Only characters fed afterwards are affected.
    pub fn set_options(&mut self, opts: DelimitedOptions) {
        self.opts = opts;
    }

    /// The current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Return the current line number as measured by the number of
    /// occurrences of `\n`.
    ///
    /// Line numbers start at `1` and are reset when `reset` is called.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Reset the tokenizer such that it behaves as if it had never been used.
    pub fn reset(&mut self) {
        self.state = State::FieldStart;
        self.in_record = false;
        self.ended_on_cr = false;
        self.line = 1;
    }

    /// Feed the next character, or `None` if the input is exhausted.
    pub fn feed(&mut self, input: Option<char>) -> Result<Action, TokenError> {
        let c = match input {
            None => return self.finish(),
            Some(c) => c,
        };
        if c == '\n' {
            self.line += 1;
        }
        match self.state {
            State::StreamEnd => Ok(Action::End),
            State::RecordEnd => {
                self.state = State::FieldStart;
                if c == '\n' && self.ended_on_cr {
                    self.ended_on_cr = false;
                    return Ok(Action::Consumed);
                }
                Ok(self.field_start(c))
            }
            State::FieldStart => Ok(self.field_start(c)),
            State::UnquotedField => {
                if c == self.opts.delimiter() {
                    self.state = State::FieldStart;
                    Ok(Action::EndField)
                } else if is_line_terminator(c) {
                    Ok(self.end_record(c))
                } else {
                    Ok(Action::Append(c))
                }
            }
            State::QuotedField => {
                if c == self.opts.quote() {
                    self.state = State::QuoteSeenInsideQuotedField;
                    Ok(Action::Consumed)
                } else if self.opts.escape() == Some(c) {
                    self.state = State::EscapeSeenInsideQuotedField;
                    Ok(Action::Consumed)
                } else {
                    Ok(Action::Append(c))
                }
            }
            State::EscapeSeenInsideQuotedField => {
                self.state = State::QuotedField;
                Ok(Action::Append(c))
            }
            State::QuoteSeenInsideQuotedField => {
                if self.opts.double_quote() && c == self.opts.quote() {
                    self.state = State::QuotedField;
                    Ok(Action::Append(c))
                } else if c == self.opts.delimiter() {
                    self.state = State::FieldStart;
                    Ok(Action::EndField)
                } else if is_line_terminator(c) {
                    Ok(self.end_record(c))
                } else {
                    self.state = State::FieldStart;
                    self.in_record = false;
                    Err(TokenError::CharAfterClosingQuote { found: c })
                }
            }
        }
    }

    fn field_start(&mut self, c: char) -> Action {
        self.in_record = true;
        if c == self.opts.quote() {
            self.state = State::QuotedField;
            Action::Consumed
        } else if c == self.opts.delimiter() {
            Action::EndField
        } else if is_line_terminator(c) {
            self.end_record(c)
        } else {
            self.state = State::UnquotedField;
            Action::Append(c)
        }
    }

    fn end_record(&mut self, c: char) -> Action {
        self.state = State::RecordEnd;
        self.in_record = false;
        self.ended_on_cr = c == '\r';
        Action::EndRecord
    }

    fn finish(&mut self) -> Result<Action, TokenError> {
        let state = self.state;
        let in_record = self.in_record;
        self.state = State::StreamEnd;
        self.in_record = false;
        match state {
            State::StreamEnd | State::RecordEnd => Ok(Action::End),
            State::FieldStart if !in_record => Ok(Action::End),
            State::FieldStart
            | State::UnquotedField
            | State::QuoteSeenInsideQuotedField => Ok(Action::EndRecord),
            State::QuotedField | State::EscapeSeenInsideQuotedField => {
                if self.opts.allow_unterminated_quotes() {
                    Ok(Action::EndRecord)
                } else {
                    Err(TokenError::UnterminatedQuote)
                }
            }
        }
    }
}

fn is_line_terminator(c: char) -> bool {
    c == '\r' || c == '\n'
}
