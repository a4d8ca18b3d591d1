//! doclust binary
//!
//! Load a bag-of-words corpus, cluster it bottom-up and top-down, and report
//! how far the two clusterings agree.
//!
//! ```text
//! doclust --docword docword.nips.txt --vocab vocab.nips.txt -k 10 -t 50
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use doclust::{
    adjusted_rand_index, fowlkes_mallows, pair_agreement, Agglomerative, Clustering,
    Dendrogram, Divisive, DocumentCollection, Partition, SimilarityMatrix,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// Terms listed per cluster when a vocabulary is loaded.
const TOP_TERMS: usize = 5;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Corpus in docword format (D, W, NNZ header then docID wordID count).
    #[arg(long)]
    docword: PathBuf,
    /// Vocabulary file, one term per line.
    #[arg(long)]
    vocab: Option<PathBuf>,
    /// Number of clusters each algorithm stops at.
    #[arg(short = 'k', long = "clusters", default_value_t = 10)]
    clusters: usize,
    /// Random bisections tried per divisive split.
    #[arg(short = 't', long, default_value_t = 50)]
    trials: usize,
    /// Score divisive splits with raw similarity sums instead of averages.
    #[arg(long)]
    raw_costs: bool,
    /// Seed for the divisive clusterer.
    #[arg(long)]
    seed: Option<u64>,
    /// Drop documents without any terms instead of failing.
    #[arg(long)]
    drop_empty: bool,
    /// Print the agglomerative merge trace.
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut docs = DocumentCollection::from_path(&args.docword)
        .with_context(|| format!("loading corpus {}", args.docword.display()))?;
    if let Some(path) = &args.vocab {
        let terms = DocumentCollection::read_vocabulary(path)
            .with_context(|| format!("loading vocabulary {}", path.display()))?;
        docs = docs.with_vocabulary(terms)?;
    }

    let (docs, doc_ids) = if args.drop_empty {
        docs.without_empty_documents()
    } else {
        let ids = (0..docs.n_docs()).collect();
        (docs, ids)
    };

    let sims = SimilarityMatrix::from_collection(&docs).context("building similarity matrix")?;

    let (hac, dendro) = Agglomerative::new(args.clusters)
        .fit_dendrogram(&sims)
        .context("agglomerative clustering")?;

    let mut divisive = Divisive::new(args.clusters)
        .with_trials(args.trials)
        .with_normalize(!args.raw_costs);
    if let Some(seed) = args.seed {
        divisive = divisive.with_seed(seed);
    }
    let hdc = divisive.fit(&sims).context("divisive clustering")?;

    println!("== agglomerative (complete link), {} clusters", hac.n_clusters());
    if args.trace {
        print_trace(&dendro, &doc_ids);
    }
    print_clusters(&hac, &sims, &docs, &doc_ids);

    println!();
    println!("== divisive, {} clusters", hdc.n_clusters());
    print_clusters(&hdc, &sims, &docs, &doc_ids);

    let agreement = pair_agreement(&hac, &hdc).context("comparing clusterings")?;
    println!();
    println!("== agreement");
    println!("{:<24}{:.6}", "positive", agreement.positive);
    println!("{:<24}{:.6}", "negative", agreement.negative);
    println!("{:<24}{:.6}", "composite", agreement.composite());
    println!("{:<24}{:.6}", "disagreement", agreement.disagreement());
    println!(
        "{:<24}{:.6}",
        "adjusted rand",
        adjusted_rand_index(hac.labels(), hdc.labels())
    );
    println!(
        "{:<24}{:.6}",
        "fowlkes-mallows",
        fowlkes_mallows(hac.labels(), hdc.labels())
    );

    Ok(())
}

fn print_trace(dendro: &Dendrogram, doc_ids: &[usize]) {
    for (step, m) in dendro.merges().iter().enumerate() {
        println!(
            "merge {:>6}: cluster {:>6} into {:>6}  sim {:.6}  size {}",
            step, doc_ids[m.source], doc_ids[m.destination], m.similarity, m.size
        );
    }
}

fn print_clusters(
    partition: &Partition,
    sims: &SimilarityMatrix,
    docs: &DocumentCollection,
    doc_ids: &[usize],
) {
    let cohesion = partition.average_similarities(sims);
    for (c, (members, avg)) in partition.clusters().iter().zip(&cohesion).enumerate() {
        let ids: Vec<String> = members.iter().map(|&d| doc_ids[d].to_string()).collect();
        println!(
            "cluster {:>4}  size {:>6}  avg sim {:.6}",
            c,
            members.len(),
            avg
        );
        if docs.vocabulary().is_some() {
            println!("  terms: {}", top_terms(docs, members).join(", "));
        }
        println!("  docs:  {{ {} }}", ids.join(" "));
    }
}

/// Most frequent vocabulary terms across a cluster's documents.
fn top_terms(docs: &DocumentCollection, members: &[usize]) -> Vec<String> {
    let mut totals: HashMap<usize, u64> = HashMap::new();
    for &d in members {
        for &(term, count) in docs.row(d) {
            *totals.entry(term).or_insert(0) += count as u64;
        }
    }
    let mut ranked: Vec<(usize, u64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .filter_map(|(term, _)| docs.term(term).map(str::to_string))
        .take(TOP_TERMS)
        .collect()
}
