fn parse(input: &str) -> u32 {
    // want: .unwrap() outside test code
    input.parse().unwrap()
}

fn first(items: &[u32]) -> u32 {
    // want: .expect() outside test code
    *items.first().expect("non-empty")
}

fn sorted(a: f64, b: f64) -> std::cmp::Ordering {
    // want: .unwrap() outside test code (NaN comparison danger with partial_cmp)
    a.partial_cmp(&b).unwrap()
}

fn fallback(input: &str) -> u32 {
    input.parse().unwrap_or(0)
}

#[allow(clippy::unwrap_used)]
fn startup() -> u32 {
    "1".parse().unwrap()
}

#[cfg(test)]
mod tests {
    #[test]
    fn parses() {
        assert_eq!(super::parse("1"), 1);
        "2".parse::<u32>().unwrap();
    }
}
