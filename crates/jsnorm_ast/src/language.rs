//! Language mode: which ECMAScript level the input is parsed as.

use std::fmt;

/// The ECMAScript language level accepted by the parser. The toolkit
/// targets ES2017; earlier modes reject the syntax introduced after them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LanguageMode {
    Es2015,
    Es2016,
    #[default]
    Es2017,
}

impl LanguageMode {
    /// `**` and `**=` arrived in ES2016.
    pub fn supports_exponent(self) -> bool {
        self >= LanguageMode::Es2016
    }

    /// `async`/`await` arrived in ES2017.
    pub fn supports_async(self) -> bool {
        self >= LanguageMode::Es2017
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageMode::Es2015 => write!(f, "ES2015"),
            LanguageMode::Es2016 => write!(f, "ES2016"),
            LanguageMode::Es2017 => write!(f, "ES2017"),
        }
    }
}
