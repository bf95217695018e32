//! TF-IDF vector space over a small corpus.
//!
//! Dense vectors, one per document, aligned to a vocabulary in order of
//! first appearance. IDF is smoothed as `ln((N + 1) / (df + 1)) + 1` so every
//! term keeps a strictly positive weight. Rows are L2-normalised; an empty
//! document stays the zero vector.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorSpace {
    pub vocabulary: Vec<String>,
    pub idf: Vec<f64>,
    pub vectors: Vec<Vec<f64>>,
}

impl VectorSpace {
    pub fn dims(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Build the vector space from pre-tokenized documents.
pub fn vectorize<D: AsRef<[String]>>(docs: &[D]) -> VectorSpace {
    // term -> dimension, in order of first appearance across the corpus
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut vocabulary: Vec<String> = Vec::new();
    let mut df: Vec<usize> = Vec::new();

    // per-document term counts keyed by dimension
    let mut tf: Vec<HashMap<usize, usize>> = Vec::with_capacity(docs.len());

    for doc in docs {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        let mut seen: HashSet<usize> = HashSet::new();
        for tok in doc.as_ref() {
            let dim = match index.get(tok.as_str()) {
                Some(&d) => d,
                None => {
                    let d = vocabulary.len();
                    index.insert(tok.as_str(), d);
                    vocabulary.push(tok.clone());
                    df.push(0);
                    d
                }
            };
            *counts.entry(dim).or_insert(0) += 1;
            if seen.insert(dim) {
                df[dim] += 1;
            }
        }
        tf.push(counts);
    }

    let n = docs.len().max(1) as f64;
    let idf: Vec<f64> = df
        .iter()
        .map(|&d| ((n + 1.0) / (d as f64 + 1.0)).ln() + 1.0)
        .collect();

    let dims = vocabulary.len();
    let vectors = tf
        .iter()
        .map(|counts| {
            let mut v = vec![0.0f64; dims];
            for (&dim, &c) in counts {
                v[dim] = c as f64 * idf[dim];
            }
            l2_normalize(&mut v);
            v
        })
        .collect();

    VectorSpace {
        vocabulary,
        idf,
        vectors,
    }
}

/// Divide by the Euclidean norm; a zero norm is treated as 1.
pub fn l2_normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm = if norm == 0.0 { 1.0 } else { norm };
    for x in v.iter_mut() {
        *x /= norm;
    }
}

/// Plain dot product; equals cosine similarity on normalised vectors.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn l2_norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn vocabulary_in_first_appearance_order() {
        let d = docs(&[&["beta", "alpha", "beta"], &["gamma", "alpha"]]);
        let vs = vectorize(&d);
        assert_eq!(vs.vocabulary, vec!["beta", "alpha", "gamma"]);
        assert_eq!(vs.len(), 2);
        assert_eq!(vs.dims(), 3);
    }

    #[test]
    fn smoothed_idf_values() {
        let d = docs(&[&["a1", "b1"], &["a1"], &["c1"]]);
        let vs = vectorize(&d);
        // N = 3; df(a1) = 2, df(b1) = 1, df(c1) = 1
        assert!((vs.idf[0] - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((vs.idf[1] - (2.0f64.ln() + 1.0)).abs() < 1e-12);
        assert!(vs.idf.iter().all(|&w| w > 0.0));
    }

    #[test]
    fn term_in_every_document_keeps_weight_one() {
        let d = docs(&[&["same"], &["same"]]);
        let vs = vectorize(&d);
        assert!((vs.idf[0] - 1.0).abs() < 1e-12);
        assert!((vs.vectors[0][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rows_are_unit_or_zero() {
        let d = docs(&[&["x1", "y1", "y1"], &[], &["z1"]]);
        let vs = vectorize(&d);
        assert!((l2_norm(&vs.vectors[0]) - 1.0).abs() < 1e-9);
        assert!(vs.vectors[1].iter().all(|&x| x == 0.0));
        assert!((l2_norm(&vs.vectors[2]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_corpus_is_empty_space() {
        let vs = vectorize::<Vec<String>>(&[]);
        assert!(vs.is_empty());
        assert_eq!(vs.dims(), 0);
    }
}
