use super::sequence::Sequence;

/// The guide RNAs available to a run, in import order.
///
/// Order matters: anchor ranking breaks ties by position in the pool.
#[derive(Debug, Clone, Default)]
pub struct Pool(Vec<Sequence>);

impl Pool {
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.0.iter()
    }
    pub fn get(&self, name: &str) -> Option<&Sequence> {
        self.0.iter().find(|g| g.name() == name)
    }
}

impl From<Vec<Sequence>> for Pool {
    fn from(guides: Vec<Sequence>) -> Self {
        Self(guides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let pool = Pool::from(vec![
            Sequence::guide("gA", "acgu").unwrap(),
            Sequence::guide("gB", "ugca").unwrap(),
        ]);
        assert!(pool.get("gB").unwrap().five_prime() == "ugca");
        assert!(pool.get("gC").is_none());
    }
}
