use super::pool::Pool;
use super::sequence::Sequence;
use anyhow::Context;
use std::path::Path;

/// Import of the run's sequences from fasta-like text files: a two-line
/// file for a messenger, alternating header/sequence lines for guides.
/// Everything is lowercased on the way in and anything outside
/// {a, c, g, u} is rejected.

pub fn messenger(path: &Path) -> anyhow::Result<Sequence> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read mRNA file {}", path.display()))?;
    parse_messenger(&text).with_context(|| format!("parse mRNA file {}", path.display()))
}

pub fn guides(path: &Path) -> anyhow::Result<Pool> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read gRNA file {}", path.display()))?;
    parse_guides(&text).with_context(|| format!("parse gRNA file {}", path.display()))
}

fn parse_messenger(text: &str) -> anyhow::Result<Sequence> {
    let mut lines = text.trim().lines();
    let name = lines.next().context("missing header line")?;
    let spelling = lines.next().context("missing sequence line")?;
    Sequence::messenger(name.trim_start_matches('>').trim(), spelling)
}

fn parse_guides(text: &str) -> anyhow::Result<Pool> {
    let lines = text.trim().lines().collect::<Vec<&str>>();
    anyhow::ensure!(!lines.is_empty(), "empty guide file");
    anyhow::ensure!(lines.len() % 2 == 0, "unpaired header/sequence lines");
    lines
        .chunks(2)
        .map(|pair| Sequence::guide(pair[0].trim_start_matches('>').trim(), pair[1]))
        .collect::<anyhow::Result<Vec<Sequence>>>()
        .map(Pool::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messenger_two_lines() {
        let m = parse_messenger(">ND7 unedited\nACGUacgu\n").unwrap();
        assert!(m.name() == "ND7 unedited");
        assert!(m.five_prime() == "acguacgu");
    }

    #[test]
    fn guides_alternating() {
        let pool = parse_guides(">gND7_1\nacgu\n>gND7_2\nuuga\n").unwrap();
        assert!(pool.len() == 2);
        assert!(pool.get("gND7_2").unwrap().five_prime() == "uuga");
    }

    #[test]
    fn rejects_bad_alphabet() {
        assert!(parse_messenger(">x\nacgn\n").is_err());
        assert!(parse_guides(">x\nacgu\n>y\n").is_err());
    }
}
