//! `AAAA:VV` RAM poke codes

/// A parsed poke: write `value` to system RAM at `address`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poke {
    pub address: u16,
    pub value: u8,
}

impl Poke {
    /// Parse `AAAA:VV` (hex); several codes may be joined with `+`
    pub fn parse_all(code: &str) -> Option<Vec<Poke>> {
        code.split('+').map(|part| Self::parse(part.trim())).collect()
    }

    pub fn parse(code: &str) -> Option<Poke> {
        let (address, value) = code.split_once(':')?;
        if address.len() != 4 || value.len() != 2 {
            return None;
        }
        Some(Poke {
            address: u16::from_str_radix(address, 16).ok()?,
            value: u8::from_str_radix(value, 16).ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poke() {
        assert_eq!(
            Poke::parse("0010:7F"),
            Some(Poke {
                address: 0x10,
                value: 0x7F
            })
        );
        assert_eq!(Poke::parse("00XX0000"), None);
        assert_eq!(Poke::parse("10:7F"), None);
    }

    #[test]
    fn test_parse_combined() {
        let pokes = Poke::parse_all("0000:01+0002:02").unwrap();
        assert_eq!(pokes.len(), 2);
        assert!(Poke::parse_all("0000:01+bad").is_none());
    }
}
