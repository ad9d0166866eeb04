use rand::Rng;

const CODE_MIN: u32 = 1000;
const CODE_MAX: u32 = 9999;
const MAX_ATTEMPTS: usize = 256;

/// Draw one candidate code uniformly from the 4-digit space.
pub fn random_code() -> String {
    let mut rng = rand::rng();
    let code: u32 = rng.random_range(CODE_MIN..=CODE_MAX);
    code.to_string()
}

/// Pick a code not currently in use. `taken` is consulted under the same
/// lock that guards insertion, so the returned code stays unique until the
/// caller inserts it. Returns `None` once the bounded retries run out,
/// which only happens when the code space is close to saturated.
pub fn pick_unused<F>(mut taken: F) -> Option<String>
where
    F: FnMut(&str) -> bool,
{
    for _ in 0..MAX_ATTEMPTS {
        let code = random_code();
        if !taken(&code) {
            return Some(code);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_four_digit_numeric() {
        for _ in 0..1000 {
            let code = random_code();
            assert_eq!(code.len(), 4);
            let value: u32 = code.parse().expect("numeric code");
            assert!((1000..=9999).contains(&value));
        }
    }

    #[test]
    fn pick_unused_avoids_taken_codes() {
        let code = pick_unused(|candidate| {
            candidate.parse::<u32>().expect("numeric code") < 5500
        })
        .expect("half the space is free");
        assert!(code.parse::<u32>().expect("numeric code") >= 5500);
    }

    #[test]
    fn saturated_space_reports_exhaustion() {
        assert!(pick_unused(|_| true).is_none());
    }
}
