// Constants for the C interpreter

/// Default maximum number of simultaneously active calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Capacity of a `string` variable, terminator included
pub const DEFAULT_STRING_CAPACITY: usize = 256;

/// Remaining native stack below which a call or nested expression grows the stack
pub const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each native stack segment allocated on growth
pub const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Decimal places printed by `%f` when no precision is given
pub const DEFAULT_FLOAT_PRECISION: usize = 6;
