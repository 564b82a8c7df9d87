//! The JSON backend: [`JsonParser`] reads RFC 8259 text as UTF-8 bytes and
//! emits the neutral item stream in a single pass, [`JsonRenderer`] emits
//! the stream as JSON bytes.

mod parser;
mod renderer;

pub use parser::JsonParser;
pub use renderer::JsonRenderer;

/// Configuration for decoding JSON.
#[derive(Debug, Clone)]
pub struct JsonDecodeConfig {
    /// Longest accepted string after unescaping, in bytes.
    pub max_string_length: u64,
    /// Most significant digits accepted in one number literal.
    pub max_number_mantissa_digits: u32,
    /// Largest accepted absolute value of a number's exponent.
    pub max_number_abs_exponent: u32,
    /// Emit every number containing a decimal point or exponent as a
    /// `NumberString` item instead of classifying it as a `Double`.
    pub read_decimal_numbers_only_as_number_string: bool,
    /// Accept whitespace after the top-level value.
    pub allow_trailing_whitespace: bool,
    /// Ignore anything following the top-level value.
    pub allow_trailing_input: bool,
    /// Run the structural validator while reading.
    pub validation: bool,
}

impl Default for JsonDecodeConfig {
    fn default() -> Self {
        Self {
            max_string_length: i32::MAX as u64,
            max_number_mantissa_digits: 34,
            max_number_abs_exponent: 999,
            read_decimal_numbers_only_as_number_string: false,
            allow_trailing_whitespace: true,
            allow_trailing_input: false,
            validation: true,
        }
    }
}

impl JsonDecodeConfig {
    pub fn with_max_string_length(mut self, max: u64) -> Self {
        self.max_string_length = max;
        self
    }

    pub fn with_max_number_mantissa_digits(mut self, max: u32) -> Self {
        self.max_number_mantissa_digits = max;
        self
    }

    pub fn with_max_number_abs_exponent(mut self, max: u32) -> Self {
        self.max_number_abs_exponent = max;
        self
    }

    pub fn with_read_decimal_numbers_only_as_number_string(mut self, enabled: bool) -> Self {
        self.read_decimal_numbers_only_as_number_string = enabled;
        self
    }

    pub fn with_allow_trailing_whitespace(mut self, enabled: bool) -> Self {
        self.allow_trailing_whitespace = enabled;
        self
    }

    pub fn with_allow_trailing_input(mut self, enabled: bool) -> Self {
        self.allow_trailing_input = enabled;
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }
}

/// Configuration for encoding JSON.
#[derive(Debug, Clone)]
pub struct JsonEncodeConfig {
    /// Initial capacity of the output buffer when encoding to a vector.
    pub initial_buffer_size: usize,
    /// Upper bound for the initial allocation; documents may still grow
    /// beyond it.
    pub max_buffer_size: usize,
    /// Turn integer map keys into decimal strings instead of failing.
    pub stringify_integer_keys: bool,
    /// Run the structural validator while writing.
    pub validation: bool,
}

impl Default for JsonEncodeConfig {
    fn default() -> Self {
        Self {
            initial_buffer_size: 1024,
            max_buffer_size: 1 << 26,
            stringify_integer_keys: false,
            validation: true,
        }
    }
}

impl JsonEncodeConfig {
    pub fn with_initial_buffer_size(mut self, size: usize) -> Self {
        self.initial_buffer_size = size;
        self
    }

    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    pub fn with_stringify_integer_keys(mut self, enabled: bool) -> Self {
        self.stringify_integer_keys = enabled;
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }
}
