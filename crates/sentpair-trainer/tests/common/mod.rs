#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use sentpair_trainer::PairExample;

/// Pairs whose label is given away by the single external feature.
pub fn separable_pairs(n: usize, ranking: bool) -> Vec<PairExample> {
    (0..n)
        .map(|i| {
            let label = (i % 3 == 0) as u32;
            PairExample {
                id: if ranking { (i / 4) as f64 + 0.1 } else { 0.0 },
                a: format!("question number {}", i / 4),
                b: if label == 1 {
                    "a matching answer sentence".to_string()
                } else {
                    format!("unrelated filler text {i}")
                },
                label,
                ext_feats: vec![if label == 1 { 2.0 } else { -2.0 }],
            }
        })
        .collect()
}

pub fn write_jsonl(path: &Path, examples: &[PairExample]) {
    let mut file = std::fs::File::create(path).unwrap();
    for example in examples {
        writeln!(file, "{}", serde_json::to_string(example).unwrap()).unwrap();
    }
}

pub fn write_splits(dir: &Path, ranking: bool) {
    write_jsonl(&dir.join("train.jsonl"), &separable_pairs(48, ranking));
    write_jsonl(&dir.join("dev.jsonl"), &separable_pairs(16, ranking));
    write_jsonl(&dir.join("test.jsonl"), &separable_pairs(16, ranking));
}
