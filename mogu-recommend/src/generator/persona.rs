use rand::seq::SliceRandom;
use rand::Rng;

use mogu_shared::{AgeGroup, Category, Gender, HouseholdSize, User};

/// Relative affinity of a user for a post category.
pub fn persona_weight(user: &User, category: Category) -> f64 {
    match category {
        Category::Beauty => match user.gender {
            Gender::Female => 4.0,
            Gender::Male => 0.5,
        },
        Category::Fashion => match user.age_group {
            AgeGroup::Twenties => 3.0,
            AgeGroup::FortiesPlus => 0.5,
            AgeGroup::Thirties => 1.0,
        },
        Category::Household => match user.household_size {
            HouseholdSize::ThreePlus => 1.5,
            _ => 1.0,
        },
        Category::Food => 1.0,
    }
}

/// Draws `n` distinct indices, each draw proportional to the remaining
/// weights. Returns `None` when fewer than `n` indices carry weight.
pub fn sample_weighted<R: Rng + ?Sized>(weights: &[f64], n: usize, rng: &mut R) -> Option<Vec<usize>> {
    let weighted: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0.0).collect();
    if weighted.len() < n {
        return None;
    }
    let picked = weighted.choose_multiple_weighted(rng, n, |&i| weights[i]).ok()?;
    Some(picked.copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uuid::Uuid;

    fn user(age_group: AgeGroup, gender: Gender, household_size: HouseholdSize) -> User {
        User {
            id: Uuid::nil(),
            name: "김민준".into(),
            nickname: "모구_0".into(),
            age_group,
            gender,
            household_size,
            neighborhood: "중구 (명동)".into(),
        }
    }

    #[test]
    fn weights_follow_personas() {
        let young_woman = user(AgeGroup::Twenties, Gender::Female, HouseholdSize::Single);
        let older_man = user(AgeGroup::FortiesPlus, Gender::Male, HouseholdSize::ThreePlus);

        assert_eq!(persona_weight(&young_woman, Category::Beauty), 4.0);
        assert_eq!(persona_weight(&older_man, Category::Beauty), 0.5);
        assert_eq!(persona_weight(&young_woman, Category::Fashion), 3.0);
        assert_eq!(persona_weight(&older_man, Category::Fashion), 0.5);
        assert_eq!(persona_weight(&young_woman, Category::Household), 1.0);
        assert_eq!(persona_weight(&older_man, Category::Household), 1.5);
        assert_eq!(persona_weight(&older_man, Category::Food), 1.0);
    }

    #[test]
    fn samples_without_replacement() {
        let weights = vec![1.0; 10];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut picked = sample_weighted(&weights, 10, &mut rng).unwrap();
        picked.sort_unstable();
        assert_eq!(picked, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn zero_weights_are_never_drawn() {
        let weights = [0.0, 1.0, 0.0, 2.0];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let picked = sample_weighted(&weights, 2, &mut rng).unwrap();
            assert!(picked.iter().all(|i| *i == 1 || *i == 3));
        }
    }

    #[test]
    fn too_few_weighted_items_is_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(sample_weighted(&[0.0, 1.0], 2, &mut rng).is_none());
        assert!(sample_weighted(&[0.0, 0.0], 1, &mut rng).is_none());
        assert!(sample_weighted(&[f64::NAN, 1.0], 2, &mut rng).is_none());
    }

    #[test]
    fn same_seed_same_draw() {
        let weights = [0.5, 2.0, 1.0, 0.0, 3.0, 1.5];
        let draw = |seed| sample_weighted(&weights, 3, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        assert_eq!(draw(9), draw(9));
        assert_eq!(draw(9).len(), 3);
    }

    #[test]
    fn heavier_items_are_drawn_more_often() {
        let weights = [1.0, 9.0];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let heavy = (0..1000)
            .filter(|_| sample_weighted(&weights, 1, &mut rng).unwrap()[0] == 1)
            .count();
        assert!(heavy > 800);
    }
}
