criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        aligning_a_guide_pool,
        unfolding_an_edit_tree,
        stacking_a_duplex,
}

use editosome::docking::anchor;
use editosome::edit::Tree;
use editosome::fold::Cofold;
use editosome::fold::Folder;
use editosome::fold::Stacked;
use editosome::sequence::Pool;
use editosome::sequence::Sequence;
use editosome::settings::Settings;
use std::sync::Arc;

fn transcript() -> Sequence {
    Sequence::messenger("bench", &"guacgucaugcaugaccaug".repeat(20)).unwrap()
}

fn guides() -> Pool {
    Pool::from(
        (0..24)
            .map(|i| {
                let spelling = "acguacgucaugca".chars().cycle().skip(i).take(20).collect::<String>();
                Sequence::guide(&format!("g{}", i), &spelling).unwrap()
            })
            .collect::<Vec<Sequence>>(),
    )
}

fn aligning_a_guide_pool(c: &mut criterion::Criterion) {
    let settings = Settings::default();
    let messenger = transcript();
    let pool = guides();
    c.bench_function("align a guide pool against a transcript", |b| {
        b.iter(|| anchor::alignments(&messenger, &pool, &[], &settings))
    });
}

fn unfolding_an_edit_tree(c: &mut criterion::Criterion) {
    let settings = Settings {
        bulk_cofold: true,
        mismatch_threshold_editing: 1,
        guide_end_allowance: 1,
        ..Settings::default()
    };
    let folder = Folder::from(Arc::new(Stacked) as Arc<dyn Cofold>);
    let messenger = transcript();
    let guide = Sequence::guide("g", "caugacguacguaag").unwrap();
    c.bench_function("unfold and score an edit tree", |b| {
        b.iter(|| {
            Tree::unfold(
                guide.clone(),
                messenger.clone(),
                4,
                6,
                10,
                &folder,
                &settings,
            )
        })
    });
}

fn stacking_a_duplex(c: &mut criterion::Criterion) {
    let folder = Folder::from(Arc::new(Stacked) as Arc<dyn Cofold>);
    let pair = "gaucguacgugcaugacg&cgucaugcacguacgauc";
    c.bench_function("score one strand pair", |b| b.iter(|| folder.fold(pair)));
}
