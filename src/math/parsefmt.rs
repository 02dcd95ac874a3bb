use super::rational::pow10;
use super::Rational;

/// Parses a decimal literal ("150.5", "-2", ".25") or a fraction literal
/// ("1/3") into an exact Rational. Returns `None` for malformed input and
/// for values that do not fit the 64-bit representation.
pub fn parse(s: &str) -> Option<Rational> {
    let s = s.trim();
    if let Some((numer, denom)) = s.split_once('/') {
        let numer = numer.trim().parse::<i64>().ok()?;
        let denom = denom.trim().parse::<i64>().ok()?;
        return Rational::new(numer, 0, denom).ok();
    }

    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }

    match rest.split_once('.') {
        None => {
            let int = rest.parse::<i64>().ok()?;
            Some(Rational::from_integer(int.checked_mul(sign)?))
        }
        Some((int, frac)) => {
            if frac.is_empty() || frac.contains('.') {
                return None;
            }
            let int = if int.is_empty() {
                0
            } else {
                int.parse::<i64>().ok()?
            };
            let places = i64::try_from(frac.len()).ok()?;
            let scale = pow10(places).ok()?;
            let frac = frac.parse::<i64>().ok()?;
            let significand = int
                .checked_mul(scale)?
                .checked_add(frac)?
                .checked_mul(sign)?;
            Rational::new(significand, -places, 1).ok()
        }
    }
}

/// Renders the canonical triple. Values with denominator 1 print as plain
/// decimals; anything else keeps the fraction form, since its decimal
/// expansion may not terminate.
pub fn fmt(n: &Rational) -> String {
    let (significand, base, denominator) = n.to_parts();
    if denominator != 1 {
        return if base == 0 {
            format!("{significand}/{denominator}")
        } else {
            format!("{significand}/{denominator}*10^{base}")
        };
    }
    let sign = if significand < 0 { "-" } else { "" };
    let digits = significand.unsigned_abs().to_string();
    if base >= 0 {
        format!("{sign}{digits}{}", "0".repeat(base as usize))
    } else {
        let places = base.unsigned_abs() as usize;
        if digits.len() > places {
            let (int, frac) = digits.split_at(digits.len() - places);
            format!("{sign}{int}.{frac}")
        } else {
            format!("{sign}0.{}{digits}", "0".repeat(places - digits.len()))
        }
    }
}
