/// A single RNA base.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Base {
    A,
    C,
    G,
    U,
}

impl Base {
    /// numeric encoding chosen so that hybridizing pairs, wobble
    /// included, differ by exactly 1 modulo 10
    pub const fn code(&self) -> i8 {
        match self {
            Self::G => 1,
            Self::C => 2,
            Self::A => 11,
            Self::U => 12,
        }
    }
    /// GC, AU and the GU wobble hybridize; everything else is a mismatch
    pub const fn pairs(&self, other: Base) -> bool {
        (self.code() - other.code()).abs() % 10 == 1
    }
    pub const fn is_u(&self) -> bool {
        matches!(self, Self::U)
    }
}

// char isomorphism
impl TryFrom<char> for Base {
    type Error = anyhow::Error;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_lowercase() {
            'a' => Ok(Self::A),
            'c' => Ok(Self::C),
            'g' => Ok(Self::G),
            'u' => Ok(Self::U),
            c => Err(anyhow::anyhow!("not an RNA base: {:?}", c)),
        }
    }
}
impl From<Base> for char {
    fn from(b: Base) -> char {
        match b {
            Base::A => 'a',
            Base::C => 'c',
            Base::G => 'g',
            Base::U => 'u',
        }
    }
}

impl std::fmt::Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl crate::Arbitrary for Base {
    fn random() -> Self {
        use rand::Rng;
        match rand::rng().random_range(0..4) {
            0 => Self::A,
            1 => Self::C,
            2 => Self::G,
            _ => Self::U,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watson_crick_pairs() {
        assert!(Base::G.pairs(Base::C));
        assert!(Base::C.pairs(Base::G));
        assert!(Base::A.pairs(Base::U));
        assert!(Base::U.pairs(Base::A));
    }

    #[test]
    fn wobble_pairs() {
        assert!(Base::G.pairs(Base::U));
        assert!(Base::U.pairs(Base::G));
    }

    #[test]
    fn mismatches() {
        assert!(!Base::A.pairs(Base::A));
        assert!(!Base::A.pairs(Base::C));
        assert!(!Base::A.pairs(Base::G));
        assert!(!Base::C.pairs(Base::C));
        assert!(!Base::C.pairs(Base::U));
        assert!(!Base::G.pairs(Base::G));
        assert!(!Base::G.pairs(Base::A));
        assert!(!Base::U.pairs(Base::U));
        assert!(!Base::U.pairs(Base::C));
    }

    #[test]
    fn from_char() {
        assert!(Base::try_from('a').unwrap() == Base::A);
        assert!(Base::try_from('G').unwrap() == Base::G);
        assert!(Base::try_from('t').is_err());
        assert!(Base::try_from('n').is_err());
    }
}
