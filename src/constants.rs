//! Global constants for the interpretation engine

pub mod chunks {
    /// Soft upper bound on the number of codepoints summarized by one chunk.
    /// Adjacent chunks whose combined size stays below this are merged.
    pub const MAX_CODEPOINTS_PER_CHUNK: usize = 1000;

    /// Smallest chunk bound a configuration may request
    pub const MIN_CODEPOINTS_PER_CHUNK: usize = 2;
}

pub mod codepoints {
    /// Carriage return
    pub const CR: u32 = 0x0D;

    /// Line feed
    pub const LF: u32 = 0x0A;

    /// Value used for line-break detection when a codepoint fails to decode
    pub const INVALID: u32 = 0;
}

pub mod error_types {
    pub const RANGE_OUT_OF_BOUNDS: &str = "RANGE_OUT_OF_BOUNDS";
    pub const UNORDERED_EDIT: &str = "UNORDERED_EDIT";
    pub const INVALID_CURSOR: &str = "INVALID_CURSOR";
    pub const INVALID_SETTING: &str = "INVALID_SETTING";
    pub const CONFIG_PARSE: &str = "CONFIG_PARSE";
}
