/// Configuration for decoding behavior.
///
/// ## Delimiter
///
/// The `delimiter` separates the operator keyword from the value in
/// delimited-style tokens, `:` by default. Only the first occurrence
/// separates; later ones belong to the value, so `contains:a:b` filters on
/// `a:b`.
///
/// ```
/// use filter_qs::Config;
///
/// let config = Config::new().delimiter('~');
/// assert_eq!(config.delimiter, '~');
/// ```
///
/// The deep-object style carries its operator in the key and ignores the
/// delimiter entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self { delimiter: ':' }
    }

    /// Specifies the operator/value delimiter for delimited-style tokens.
    /// Default is `:`.
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}
