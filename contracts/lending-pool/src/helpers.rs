use crate::errors::Error;

/// Compute `a * b / denom` with floor division, reducing both factors by
/// gcd against the denominator first so legitimate products survive the
/// u128 intermediate. Overflow past that is a hard failure, never a wrap,
/// and a zero denominator fails the same way instead of trapping.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128, Error> {
    if denom == 0 {
        return Err(Error::MathOverflow);
    }
    let mut x = a;
    let mut y = b;
    let mut d = denom;
    let g1 = gcd(x, d);
    x /= g1;
    d /= g1;
    let g2 = gcd(y, d);
    y /= g2;
    d /= g2;
    let product = x.checked_mul(y).ok_or(Error::MathOverflow)?;
    Ok(product / d)
}

pub fn checked_add(a: u128, b: u128) -> Result<u128, Error> {
    a.checked_add(b).ok_or(Error::MathOverflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128, Error> {
    a.checked_sub(b).ok_or(Error::MathOverflow)
}

pub fn to_i128(amount: u128) -> Result<i128, Error> {
    if amount > i128::MAX as u128 {
        return Err(Error::MathOverflow);
    }
    Ok(amount as i128)
}

/// For infallible sentinel reads whose math cannot overflow on sane state.
pub fn expect_math(value: Result<u128, Error>) -> u128 {
    match value {
        Ok(v) => v,
        Err(_) => panic!("math overflow"),
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}
