use anyhow::Context;
use clap::Parser;
use editosome::docking::Docker;
use editosome::fold::Cofold;
use editosome::fold::Folder;
use editosome::fold::Stacked;
use editosome::guide::GuideTree;
use editosome::report::RunDir;
use editosome::sequence::fasta;
use editosome::settings::Settings;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

const GENES: &[&str] = &[
    "A6", "COX3", "CR3", "CR4", "CYB", "MURF2", "ND3", "ND7", "ND8", "ND9", "RPS12",
];

#[derive(Parser)]
#[command(about = "Reconstruct the guide-directed editing pathway of a transcript")]
struct Args {
    /// directory of unedited mRNA fasta files
    #[arg(long, default_value = "sequences/mRNAs_unedited")]
    mrna_dir: PathBuf,
    /// directory of guide RNA fasta files
    #[arg(long, default_value = "sequences/gRNAs")]
    grna_dir: PathBuf,
    /// directory of reference edited mRNA fasta files
    #[arg(long, default_value = "sequences/mRNAs_edited")]
    edited_dir: PathBuf,
    /// where run artifacts land
    #[arg(long, default_value = "runs")]
    out: PathBuf,
    /// gene to run, skipping the interactive prompt
    #[arg(long)]
    gene: Option<String>,
    /// json file of settings overrides
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    editosome::log();
    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let mrna_file = choose_mrna(&args)?;
    let gene = GENES
        .iter()
        .find(|gene| name_of(&mrna_file).to_lowercase().contains(&gene.to_lowercase()))
        .copied()
        .with_context(|| format!("no known gene in {}", mrna_file.display()))?;
    let grna_file = matching(&args.grna_dir, gene)?.context("no guide file for gene")?;
    let edited_file = matching(&args.edited_dir, gene).ok().flatten();
    log::info!("gene {}: mRNA {}, guides {}", gene, mrna_file.display(), grna_file.display());

    let messenger = fasta::messenger(&mrna_file)?;
    let pool = fasta::guides(&grna_file)?;
    let edited = match &edited_file {
        Some(path) => Some(fasta::messenger(path)?),
        None => None,
    };
    anyhow::ensure!(!pool.is_empty(), "guide pool is empty");
    log::info!(
        "loaded {} ({} nt) and {} guides",
        messenger.name(),
        messenger.len(),
        pool.len(),
    );

    let run = RunDir::create(&args.out, gene)?;
    run.settings(&settings)?;
    let folder = Folder::from(Arc::new(Stacked) as Arc<dyn Cofold>);
    let duplexes = Docker::new(&pool, &folder, &settings).select(&messenger, &[], 0, true);
    anyhow::ensure!(!duplexes.is_empty(), "no guide docked the unedited transcript");

    let settings = Arc::new(settings);
    for duplex in duplexes.into_iter().take(settings.no_of_grnas_first) {
        log::info!("seeding guide tree from {}", duplex);
        let mut tree = GuideTree::new(
            duplex,
            pool.clone(),
            edited.clone(),
            folder.clone(),
            settings.clone(),
        );
        tree.grow();
        let written = run.guide_tree(&tree)?;
        log::info!(
            "{}: {} nodes, {} cache hits, written to {}",
            tree.id(),
            tree.nodes().len(),
            tree.cache_hits(),
            written.display(),
        );
    }
    Ok(())
}

/// the unedited transcript file, from --gene or an interactive prompt
fn choose_mrna(args: &Args) -> anyhow::Result<PathBuf> {
    let files = listed(&args.mrna_dir)?;
    anyhow::ensure!(!files.is_empty(), "no mRNA files in {}", args.mrna_dir.display());
    match &args.gene {
        Some(gene) => files
            .iter()
            .find(|f| name_of(f).to_lowercase().contains(&gene.to_lowercase()))
            .cloned()
            .with_context(|| format!("no mRNA file matches gene {}", gene)),
        None => {
            let names = files.iter().map(|f| name_of(f)).collect::<Vec<String>>();
            let choice = dialoguer::Select::new()
                .with_prompt("Select the unedited mRNA sequence to begin editing")
                .items(&names)
                .default(0)
                .interact()?;
            Ok(files[choice].clone())
        }
    }
}

/// the file in a directory matching a gene, prompting on ambiguity
fn matching(dir: &Path, gene: &str) -> anyhow::Result<Option<PathBuf>> {
    let candidates = listed(dir)?
        .into_iter()
        .filter(|f| name_of(f).to_lowercase().contains(&gene.to_lowercase()))
        .collect::<Vec<PathBuf>>();
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(Some(candidates[0].clone())),
        _ => {
            let names = candidates.iter().map(|f| name_of(f)).collect::<Vec<String>>();
            let choice = dialoguer::Select::new()
                .with_prompt("Several files match; pick one")
                .items(&names)
                .default(0)
                .interact()?;
            Ok(Some(candidates[choice].clone()))
        }
    }
}

fn listed(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = std::fs::read_dir(dir)
        .with_context(|| format!("read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect::<Vec<PathBuf>>();
    files.sort();
    Ok(files)
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
