//! Fixed-width hexadecimal renderers shared by dumps, listings, and traces.

/// Renders a byte as exactly two lowercase hex digits.
#[must_use]
pub fn to_hex8(i: u8) -> String {
    format!("{i:02x}")
}

/// Renders a 32-bit value as exactly eight lowercase hex digits.
#[must_use]
pub fn to_hex32(i: u32) -> String {
    format!("{i:08x}")
}

/// Renders a 32-bit value as `0x` followed by eight lowercase hex digits.
#[must_use]
pub fn to_hex0x32(i: u32) -> String {
    format!("0x{}", to_hex32(i))
}

/// Renders the low 20 bits of a value as `0x` followed by five hex digits.
///
/// Used for the `lui`/`auipc` immediate operand, which the listing shows in
/// its encoded (pre-shift) form.
#[must_use]
pub fn to_hex0x20(i: u32) -> String {
    format!("0x{:05x}", i & 0x000f_ffff)
}

/// Renders the low 12 bits of a value as `0x` followed by three hex digits.
///
/// Used for CSR addresses in `csrr*` operand lists.
#[must_use]
pub fn to_hex0x12(i: u32) -> String {
    format!("0x{:03x}", i & 0x0fff)
}
