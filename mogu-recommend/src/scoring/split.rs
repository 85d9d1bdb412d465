use rand::seq::SliceRandom;
use rand::Rng;

/// Row indices of a train/validation partition, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub valid: Vec<usize>,
}

/// Label-stratified random split: each class holds out
/// `round(valid_fraction * class_size)` rows, so both sides keep roughly
/// the same positive rate.
pub fn stratified_split<R: Rng + ?Sized>(labels: &[u8], valid_fraction: f64, rng: &mut R) -> Split {
    let (mut positives, mut negatives): (Vec<usize>, Vec<usize>) =
        (0..labels.len()).partition(|&i| labels[i] == 1);

    positives.shuffle(rng);
    negatives.shuffle(rng);

    let holdout = |n: usize| ((n as f64) * valid_fraction).round() as usize;
    let n_pos_valid = holdout(positives.len());
    let n_neg_valid = holdout(negatives.len());

    let mut valid: Vec<usize> = positives[..n_pos_valid]
        .iter()
        .chain(&negatives[..n_neg_valid])
        .copied()
        .collect();
    let mut train: Vec<usize> = positives[n_pos_valid..]
        .iter()
        .chain(&negatives[n_neg_valid..])
        .copied()
        .collect();

    valid.sort_unstable();
    train.sort_unstable();
    Split { train, valid }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn labels(pos: usize, neg: usize) -> Vec<u8> {
        let mut l = vec![1u8; pos];
        l.extend(std::iter::repeat(0u8).take(neg));
        l
    }

    #[test]
    fn partitions_every_row_once() {
        let labels = labels(50, 950);
        let split = stratified_split(&labels, 0.2, &mut ChaCha8Rng::seed_from_u64(42));

        assert_eq!(split.train.len() + split.valid.len(), labels.len());
        let mut all: Vec<usize> = split.train.iter().chain(&split.valid).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());
    }

    #[test]
    fn keeps_positive_rate() {
        let labels = labels(50, 950);
        let split = stratified_split(&labels, 0.2, &mut ChaCha8Rng::seed_from_u64(42));

        let valid_pos = split.valid.iter().filter(|&&i| labels[i] == 1).count();
        let train_pos = split.train.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(valid_pos, 10);
        assert_eq!(train_pos, 40);
        assert_eq!(split.valid.len(), 200);
    }

    #[test]
    fn same_seed_same_split() {
        let labels = labels(30, 300);
        let a = stratified_split(&labels, 0.2, &mut ChaCha8Rng::seed_from_u64(7));
        let b = stratified_split(&labels, 0.2, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn indices_are_sorted() {
        let labels = labels(10, 90);
        let split = stratified_split(&labels, 0.2, &mut ChaCha8Rng::seed_from_u64(1));
        assert!(split.train.windows(2).all(|w| w[0] < w[1]));
        assert!(split.valid.windows(2).all(|w| w[0] < w[1]));
    }
}
