use crate::edit;
use crate::guide::GuideTree;
use crate::settings::Settings;
use anyhow::Context;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// Artifacts for one run: a directory holding the effective settings,
/// one summary CSV per guide tree, and one edit-node CSV per guide
/// node that actually built a tree. Records are explicit structs
/// written by hand; nothing here inspects types at runtime.

pub struct RunDir(PathBuf);

/// one row of the guide-node summary
struct GuideRow<'a> {
    id: usize,
    guide: &'a str,
    level: usize,
    dock: usize,
    g_index: usize,
    init_m_index: usize,
    terminal: bool,
    cached: bool,
    parents: String,
    progressed: String,
    indices: String,
    qc_errors: String,
    init_sequence: String,
}

/// one row of an edit-tree dump
struct EditRow {
    id: usize,
    parent: String,
    action: char,
    log: String,
    state: String,
    level: usize,
    m_index: usize,
    g_index: usize,
    mismatches: usize,
    mfe: String,
    probability: f64,
    product: f64,
    progressed: bool,
    sequence: String,
    structure: String,
}

impl RunDir {
    pub fn create(root: &Path, gene: &str) -> anyhow::Result<Self> {
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time moves slow")
            .as_secs();
        let dir = root.join(format!("{}_{}", gene, stamp));
        std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        Ok(Self(dir))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// persist the effective settings next to what they produced
    pub fn settings(&self, settings: &Settings) -> anyhow::Result<()> {
        let path = self.0.join("settings.json");
        let file = std::fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, settings)?;
        Ok(())
    }

    /// write the guide-node summary and the per-node edit-tree dumps
    pub fn guide_tree(&self, tree: &GuideTree) -> anyhow::Result<PathBuf> {
        let dir = self.0.join(tree.id());
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("guide_nodes.csv");
        let mut out = std::io::BufWriter::new(std::fs::File::create(&path)?);
        writeln!(
            out,
            "id,guide,level,dock,g_index,init_m_index,terminal,cached,\
             parents,progressed,progressed_indices,qc_errors,init_sequence"
        )?;
        for node in tree.nodes() {
            let row = GuideRow {
                id: node.id(),
                guide: node.guide_name(),
                level: node.guide_level(),
                dock: node.dock(),
                g_index: node.g_index(),
                init_m_index: node.init_m_index(),
                terminal: node.is_terminal(),
                cached: node.used_cache(),
                parents: join(node.parents().iter()),
                progressed: join(node.progressed().iter().map(|(s, _)| s.three_prime())),
                indices: join(node.progressed().iter().map(|(_, i)| i)),
                qc_errors: join(node.qc_errors().iter()),
                init_sequence: node.init_sequence().three_prime(),
            };
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{},{},{},{}",
                row.id,
                field(row.guide),
                row.level,
                row.dock,
                row.g_index,
                row.init_m_index,
                row.terminal,
                row.cached,
                field(&row.parents),
                field(&row.progressed),
                field(&row.indices),
                field(&row.qc_errors),
                row.init_sequence,
            )?;
            if let Some(edit_tree) = node.tree() {
                self.edit_tree(&dir, node.id(), edit_tree)?;
            }
        }
        Ok(path)
    }

    fn edit_tree(&self, dir: &Path, node_id: usize, tree: &edit::Tree) -> anyhow::Result<()> {
        let path = dir.join(format!("guide_{}_edit_nodes.csv", node_id));
        let mut out = std::io::BufWriter::new(std::fs::File::create(&path)?);
        writeln!(
            out,
            "id,parent,action,log,state,level,m_index,g_index,mismatches,\
             mfe,probability,product,progressed,sequence,structure"
        )?;
        for index in tree.nodes() {
            let data = tree.data(index);
            let row = EditRow {
                id: index.index(),
                parent: data
                    .parent()
                    .map(|p| p.index().to_string())
                    .unwrap_or_default(),
                action: data.action().symbol(),
                log: tree.at(index).log(),
                state: data.state().to_string(),
                level: data.edit_level(),
                m_index: data.m_index(),
                g_index: data.g_index(),
                mismatches: data.mismatches(),
                mfe: data.mfe().map(|m| m.to_string()).unwrap_or_default(),
                probability: data.probability(),
                product: data.product(),
                progressed: data.progressed(),
                sequence: data.sequence().three_prime(),
                structure: data.structure().unwrap_or_default().to_string(),
            };
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                row.id,
                row.parent,
                row.action,
                row.log,
                row.state,
                row.level,
                row.m_index,
                row.g_index,
                row.mismatches,
                row.mfe,
                row.probability,
                row.product,
                row.progressed,
                row.sequence,
                row.structure,
            )?;
        }
        Ok(())
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items
        .map(|i| i.to_string())
        .collect::<Vec<String>>()
        .join(";")
}

/// commas and quotes inside a field get the usual CSV quoting
fn field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_quoted_when_needed() {
        assert!(field("plain") == "plain");
        assert!(field("a,b") == "\"a,b\"");
        assert!(field("say \"hi\"") == "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn join_separates_with_semicolons() {
        assert!(join([1, 2, 3].iter()) == "1;2;3");
        assert!(join(Vec::<usize>::new().iter()) == "");
    }
}
