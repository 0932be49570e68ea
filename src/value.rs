//! Core type vocabulary for variable definitions.

/// The data type of a variable, to the extent this subsystem cares about it.
///
/// Full width/sign inference belongs to the typing passes; the lowering passes only ever
/// synthesize [`DataType::Signed32`] counters themselves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataType {
    /// A 32-bit signed integral value (Verilog `int` / `integer`).
    Signed32,
    /// A 32-bit unsigned integral value.
    Unsigned32,
    /// A packed logic vector of the given width.
    Logic { width: u32 },
}

impl DataType {
    pub fn descr(&self) -> &'static str { match self {
        DataType::Signed32 => "int",
        DataType::Unsigned32 => "bit [31:0]",
        DataType::Logic { .. } => "logic vector",
    }}
}

/// Storage lifetime of a variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lifetime {
    /// One instance per design, existing for the whole simulation.
    Static,
    /// One instance per activation of the enclosing scope.
    Automatic,
}
