/*!
`delimited-core` provides the tokenizing and quoting machinery for
delimited text (CSV, TSV and friends) without doing any I/O or allocation.

Most users should use the `delimited` crate instead, which wraps these
primitives with readers and writers over byte streams.

# Overview

The [`Tokenizer`](struct.Tokenizer.html) is a character-at-a-time state
machine. The caller feeds it characters and it answers with an
[`Action`](enum.Action.html): append the character to the current field, end
the field, end the record or end the input. Quoted fields may contain the
delimiter and line terminators; quotes inside quoted fields are escaped by
doubling them (or with an escape character, if configured).

The [`Quoter`](struct.Quoter.html) is its inverse. It decides whether a field
must be quoted and produces the quoted form.

Both are configured by [`DelimitedOptions`](struct.DelimitedOptions.html).

# Example

```
use delimited_core::{Action, Tokenizer};

let mut tok = Tokenizer::default();
let mut fields = vec![];
let mut field = String::new();
let mut chars = "a,\"b,c\"\r\n".chars();
loop {
    match tok.feed(chars.next()).unwrap() {
        Action::Consumed => {}
        Action::Append(c) => field.push(c),
        Action::EndField | Action::EndRecord => {
            fields.push(std::mem::replace(&mut field, String::new()));
        }
        Action::End => break,
    }
}
assert_eq!(fields, vec!["a", "b,c"]);
```
*/

#![deny(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

pub use crate::options::{ConfigError, DelimitedOptions, OptionsBuilder};
pub use crate::quoter::{QuoteRequired, QuoteStyle, Quoted, Quoter};
pub use crate::tokenizer::{Action, State, TokenError, Tokenizer};

mod options;
mod quoter;
mod tokenizer;
