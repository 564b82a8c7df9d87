//! The CBOR backend: [`CborParser`] turns RFC 8949 bytes into the neutral
//! item stream, [`CborRenderer`] turns the stream back into bytes.

mod parser;
mod renderer;

pub use parser::CborParser;
pub use renderer::CborRenderer;

/// Configuration for decoding CBOR.
#[derive(Debug, Clone)]
pub struct CborDecodeConfig {
    /// Longest accepted definite byte string (or chunk thereof).
    pub max_byte_string_length: u64,
    /// Longest accepted definite text string (or chunk thereof).
    pub max_text_string_length: u64,
    /// Emit a parsed double that is exactly representable in single
    /// precision as a `Float` item.
    pub read_double_also_as_float: bool,
    /// Run the structural validator while reading.
    pub validation: bool,
}

impl Default for CborDecodeConfig {
    fn default() -> Self {
        Self {
            max_byte_string_length: i32::MAX as u64,
            max_text_string_length: i32::MAX as u64,
            read_double_also_as_float: false,
            validation: true,
        }
    }
}

impl CborDecodeConfig {
    pub fn with_max_byte_string_length(mut self, max: u64) -> Self {
        self.max_byte_string_length = max;
        self
    }

    pub fn with_max_text_string_length(mut self, max: u64) -> Self {
        self.max_text_string_length = max;
        self
    }

    pub fn with_read_double_also_as_float(mut self, enabled: bool) -> Self {
        self.read_double_also_as_float = enabled;
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }
}

/// Configuration for encoding CBOR.
#[derive(Debug, Clone)]
pub struct CborEncodeConfig {
    /// Initial capacity of the output buffer when encoding to a vector.
    pub buffer_size: usize,
    /// Write `Double` / `Float` items in the narrowest IEEE 754 width that
    /// preserves the value exactly.
    pub compress_floating_point_values: bool,
    /// Run the structural validator while writing.
    pub validation: bool,
}

impl Default for CborEncodeConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            compress_floating_point_values: false,
            validation: true,
        }
    }
}

impl CborEncodeConfig {
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn with_compress_floating_point_values(mut self, enabled: bool) -> Self {
        self.compress_floating_point_values = enabled;
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }
}
