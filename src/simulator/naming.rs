/// Bijective base-26 label for `n`: 1 -> "A", 26 -> "Z", 27 -> "AA", ...
/// Zero has no label and yields an empty string.
pub fn router_name(mut n: u64) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Counter handing out router names in insertion order.
#[derive(Debug, Clone)]
pub struct RouterNamer {
    next: u64,
}

impl Default for RouterNamer {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl RouterNamer {
    pub fn peek(&self) -> String {
        router_name(self.next)
    }

    pub fn next_name(&mut self) -> String {
        let name = router_name(self.next);
        self.next += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_base26() {
        let cases = [
            (1, "A"),
            (2, "B"),
            (26, "Z"),
            (27, "AA"),
            (28, "AB"),
            (52, "AZ"),
            (53, "BA"),
            (702, "ZZ"),
            (703, "AAA"),
        ];
        for (n, expected) in cases {
            assert_eq!(router_name(n), expected, "n = {}", n);
        }
        assert_eq!(router_name(0), "");
    }

    #[test]
    fn namer_counts_from_a() {
        let mut namer = RouterNamer::default();
        assert_eq!(namer.peek(), "A");
        assert_eq!(namer.next_name(), "A");
        assert_eq!(namer.next_name(), "B");
        assert_eq!(namer.peek(), "C");
    }
}
