//! Typed Attribute Coercion
//!
//! Attribute values are stored raw and converted on read. Integers accept
//! plain decimal, `0x`/`U+` hex and `#` packed colors; floats take the
//! longest numeric prefix; booleans are `1`, `true` or `yes` in any case.
//! Unparseable input coerces to zero or false rather than failing.

/// Conversion from a raw attribute value
pub trait FromAttribute: Sized {
    fn from_attribute(value: &str) -> Self;
}

/// Parse an integer attribute in any supported literal form
pub fn parse_integer(value: &str) -> i64 {
    let bytes = value.as_bytes();
    match bytes {
        [b'0', b'x' | b'X', rest @ ..] | [b'U' | b'u', b'+', rest @ ..] => hex_prefix(rest).0,
        [b'#', rest @ ..] => packed_color(rest),
        _ => parse_decimal(bytes),
    }
}

/// Accumulate leading hex digits, returning the value and digit count
fn hex_prefix(digits: &[u8]) -> (i64, usize) {
    let mut value: i64 = 0;
    let mut count = 0;
    for &b in digits {
        let Some(nibble) = (b as char).to_digit(16) else {
            break;
        };
        value = (value << 4) | i64::from(nibble);
        count += 1;
    }
    (value, count)
}

/// `#RGB`, `#RGBA`, `#RRGGBB` expand to 8-bit ARGB/RGBA channels
///
/// Short forms double each nibble; forms without alpha get an opaque
/// `0xFF` top byte. Any other digit count is returned as read.
fn packed_color(digits: &[u8]) -> i64 {
    let (value, count) = hex_prefix(digits);
    let double = |nibble: i64| (nibble << 4) | nibble;
    match count {
        3 => {
            0xFF00_0000
                | double((value >> 8) & 0xF) << 16
                | double((value >> 4) & 0xF) << 8
                | double(value & 0xF)
        }
        4 => {
            double((value >> 12) & 0xF) << 24
                | double((value >> 8) & 0xF) << 16
                | double((value >> 4) & 0xF) << 8
                | double(value & 0xF)
        }
        6 => value | 0xFF00_0000,
        _ => value,
    }
}

/// Leading whitespace, optional sign, then decimal digits
fn parse_decimal(bytes: &[u8]) -> i64 {
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let negative = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    while let Some(digit) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
        value = value.wrapping_mul(10).wrapping_add(i64::from(digit - b'0'));
        i += 1;
    }
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Parse the longest floating-point prefix, zero if there is none
pub fn parse_float(value: &str) -> f64 {
    let trimmed = value.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    trimmed[..end].parse().unwrap_or(0.0)
}

/// `1`, `true` or `yes`, case-insensitive
pub fn parse_bool(value: &str) -> bool {
    ["1", "true", "yes"]
        .iter()
        .any(|accepted| value.eq_ignore_ascii_case(accepted))
}

macro_rules! impl_from_attribute_int {
    ($($t:ty),*) => {
        $(
            impl FromAttribute for $t {
                #[inline]
                fn from_attribute(value: &str) -> Self {
                    // Truncating conversion, like the C-style narrowing it models
                    parse_integer(value) as $t
                }
            }
        )*
    };
}

impl_from_attribute_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl FromAttribute for f64 {
    fn from_attribute(value: &str) -> Self {
        parse_float(value)
    }
}

impl FromAttribute for f32 {
    fn from_attribute(value: &str) -> Self {
        parse_float(value) as f32
    }
}

impl FromAttribute for bool {
    fn from_attribute(value: &str) -> Self {
        parse_bool(value)
    }
}

impl FromAttribute for String {
    fn from_attribute(value: &str) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(parse_integer("42"), 42);
        assert_eq!(parse_integer("  -17px"), -17);
        assert_eq!(parse_integer("+8"), 8);
        assert_eq!(parse_integer("abc"), 0);
        assert_eq!(parse_integer(""), 0);
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_integer("0x1F"), 31);
        assert_eq!(parse_integer("0x1fzz"), 31);
        assert_eq!(parse_integer("U+0041"), 65);
        assert_eq!(parse_integer("U+1F600"), 0x1F600);
        assert_eq!(parse_integer("0x"), 0);
    }

    #[test]
    fn test_packed_colors() {
        assert_eq!(parse_integer("#FFF"), 0xFFFF_FFFF);
        assert_eq!(parse_integer("#1a3"), 0xFF11_AA33);
        assert_eq!(parse_integer("#1234"), 0x1122_3344);
        assert_eq!(parse_integer("#102030"), 0xFF10_2030);
        assert_eq!(parse_integer("#10203040"), 0x1020_3040);
        assert_eq!(parse_integer("#12"), 0x12);
    }

    #[test]
    fn test_typed_narrowing() {
        assert_eq!(u32::from_attribute("#FFF"), 0xFFFF_FFFF);
        assert_eq!(i32::from_attribute("#FFF"), -1);
        assert_eq!(u8::from_attribute("0x1FF"), 0xFF);
        assert_eq!(String::from_attribute("raw"), "raw");
    }

    #[test]
    fn test_floats() {
        assert_eq!(parse_float("1.5"), 1.5);
        assert_eq!(parse_float(" -0.25em"), -0.25);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("3."), 3.0);
        assert_eq!(parse_float("2e3"), 2000.0);
        assert_eq!(parse_float("2e"), 2.0);
        assert_eq!(parse_float("x"), 0.0);
        assert_eq!(parse_float("."), 0.0);
        assert_eq!(f32::from_attribute("0.5"), 0.5);
    }

    #[test]
    fn test_bools() {
        for value in ["1", "true", "TRUE", "Yes", "yes"] {
            assert!(parse_bool(value), "{value}");
        }
        for value in ["0", "false", "no", "", "y", "on"] {
            assert!(!parse_bool(value), "{value}");
        }
    }
}
