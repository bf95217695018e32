//! Cosine k-means over TF-IDF vectors.
//!
//! Deterministic: centers are seeded from the first `k` documents (zero
//! vectors pad a corpus shorter than `k`) and the loop runs a fixed number of
//! rounds. Ties in assignment go to the lowest cluster index. Empty clusters
//! are dropped from the result.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::KMeansConfig;
use crate::tfidf::{dot, l2_normalize, VectorSpace};

/// How the number of clusters is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "k")]
pub enum KSelection {
    /// `clamp(round(sqrt(n)), min_k, max_k)`
    #[default]
    Auto,
    /// `max(1, k)`
    Fixed(usize),
}

impl KSelection {
    /// Mirrors the `(autoK, fixedK)` pair of the public signature.
    pub fn from_flags(auto_k: bool, fixed_k: usize) -> Self {
        if auto_k {
            KSelection::Auto
        } else {
            KSelection::Fixed(fixed_k)
        }
    }

    pub fn resolve(&self, documents: usize, cfg: &KMeansConfig) -> usize {
        match *self {
            KSelection::Auto => {
                let k = (documents as f64).sqrt().round() as usize;
                k.clamp(cfg.min_k, cfg.max_k)
            }
            KSelection::Fixed(k) => k.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    /// Top-weighted vocabulary terms, heaviest first.
    pub terms: Vec<String>,
    /// Positions into the input corpus, ascending.
    pub indices: Vec<usize>,
    /// First member texts in corpus order.
    pub samples: Vec<String>,
}

/// Cluster already-vectorized documents. `texts` must be aligned with
/// `space.vectors`.
pub fn kmeans<S: AsRef<str>>(
    space: &VectorSpace,
    texts: &[S],
    selection: KSelection,
    cfg: &KMeansConfig,
) -> Vec<ClusterResult> {
    let n = space.len();
    if n == 0 {
        return Vec::new();
    }
    let dims = space.dims();
    // centers past the corpus start as zero vectors and never win a tie
    let k = selection.resolve(n, cfg).min(n);

    let mut centers: Vec<Vec<f64>> = (0..k)
        .map(|c| match space.vectors.get(c) {
            Some(v) => v.clone(),
            None => vec![0.0; dims],
        })
        .collect();
    let mut assign = vec![0usize; n];

    for _ in 0..cfg.iterations {
        for (i, v) in space.vectors.iter().enumerate() {
            assign[i] = nearest_center(v, &centers);
        }

        let mut sums = vec![vec![0.0f64; dims]; k];
        for (i, v) in space.vectors.iter().enumerate() {
            for (s, x) in sums[assign[i]].iter_mut().zip(v) {
                *s += *x;
            }
        }
        for (center, mut sum) in centers.iter_mut().zip(sums) {
            l2_normalize(&mut sum);
            *center = sum;
        }
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (i, &c) in assign.iter().enumerate() {
        members[c].push(i);
    }

    let clusters: Vec<ClusterResult> = members
        .into_iter()
        .filter(|idx| !idx.is_empty())
        .map(|indices| {
            let terms = top_terms(space, &indices, cfg.top_terms);
            let samples = indices
                .iter()
                .take(cfg.samples)
                .map(|&i| texts[i].as_ref().to_string())
                .collect();
            ClusterResult {
                terms,
                indices,
                samples,
            }
        })
        .collect();

    debug!(
        documents = n,
        vocabulary = dims,
        k,
        clusters = clusters.len(),
        sizes = ?clusters.iter().map(|c| c.indices.len()).collect::<Vec<_>>(),
        "kmeans finished"
    );

    clusters
}

/// Index of the most similar center; first one wins on ties.
fn nearest_center(v: &[f64], centers: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_sim = f64::NEG_INFINITY;
    for (c, center) in centers.iter().enumerate() {
        let sim = dot(v, center);
        if sim > best_sim {
            best_sim = sim;
            best = c;
        }
    }
    best
}

/// Sum member vectors per term and keep the heaviest `limit` terms
/// (vocabulary order on ties).
fn top_terms(space: &VectorSpace, indices: &[usize], limit: usize) -> Vec<String> {
    let mut weights = vec![0.0f64; space.dims()];
    for &i in indices {
        for (w, x) in weights.iter_mut().zip(&space.vectors[i]) {
            *w += *x;
        }
    }
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));
    order
        .into_iter()
        .take(limit)
        .map(|j| space.vocabulary[j].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tfidf::vectorize;

    fn space_of(raw: &[&str]) -> VectorSpace {
        let docs: Vec<Vec<String>> = raw
            .iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect();
        vectorize(&docs)
    }

    #[test]
    fn auto_k_is_clamped_sqrt() {
        let cfg = KMeansConfig::default();
        assert_eq!(KSelection::Auto.resolve(1, &cfg), 2);
        assert_eq!(KSelection::Auto.resolve(6, &cfg), 2);
        assert_eq!(KSelection::Auto.resolve(7, &cfg), 3);
        assert_eq!(KSelection::Auto.resolve(16, &cfg), 4);
        assert_eq!(KSelection::Auto.resolve(1000, &cfg), 5);
        assert_eq!(KSelection::Fixed(0).resolve(10, &cfg), 1);
        assert_eq!(KSelection::from_flags(false, 3), KSelection::Fixed(3));
    }

    #[test]
    fn empty_corpus_gives_no_clusters() {
        let vs = space_of(&[]);
        let out = kmeans::<&str>(&vs, &[], KSelection::Auto, &KMeansConfig::default());
        assert!(out.is_empty());
    }

    #[test]
    fn separates_two_obvious_topics() {
        let texts = [
            "price cost expensive",
            "design colors layout",
            "price cost cheap",
            "design layout fonts",
            "cost price value",
            "colors fonts design",
        ];
        let vs = space_of(&texts);
        let out = kmeans(&vs, &texts, KSelection::Fixed(2), &KMeansConfig::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].indices, vec![0, 2, 4]);
        assert_eq!(out[1].indices, vec![1, 3, 5]);
        assert!(out[0].terms[..2].contains(&"price".to_string()));
        assert!(out[0].terms[..2].contains(&"cost".to_string()));
        assert!(out[1].terms[..1].contains(&"design".to_string()));
        assert_eq!(out[0].samples.len(), 3);
        assert_eq!(out[0].samples[0], "price cost expensive");
    }

    #[test]
    fn fewer_documents_than_k_drops_empty_clusters() {
        let texts = ["alpha beta", "gamma delta"];
        let vs = space_of(&texts);
        let out = kmeans(&vs, &texts, KSelection::Fixed(5), &KMeansConfig::default());
        assert_eq!(out.len(), 2);
        let mut all: Vec<usize> = out.iter().flat_map(|c| c.indices.clone()).collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1]);
    }

    #[test]
    fn huge_fixed_k_is_capped_by_corpus_size() {
        let texts = ["alpha beta", "gamma"];
        let vs = space_of(&texts);
        let capped = kmeans(&vs, &texts, KSelection::Fixed(usize::MAX), &KMeansConfig::default());
        let exact = kmeans(&vs, &texts, KSelection::Fixed(2), &KMeansConfig::default());
        assert_eq!(capped, exact);
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn empty_documents_fall_into_first_cluster() {
        let texts = ["", "alpha", "", "beta"];
        let vs = space_of(&texts);
        let out = kmeans(&vs, &texts, KSelection::Fixed(2), &KMeansConfig::default());
        // doc 0 (zero vector) seeds cluster 0; zero similarity ties go to index 0
        assert!(out[0].indices.contains(&0));
        assert!(out[0].indices.contains(&2));
        assert!(out.iter().all(|c| !c.indices.is_empty()));
    }

    #[test]
    fn terms_capped_at_top_terms() {
        let texts = ["one1 two2 three3 four4 five5 six6 seven7 eight8"];
        let vs = space_of(&texts);
        let out = kmeans(&vs, &texts, KSelection::Fixed(1), &KMeansConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].terms.len(), 6);
        // equal weights -> vocabulary order
        assert_eq!(out[0].terms[0], "one1");
    }
}
