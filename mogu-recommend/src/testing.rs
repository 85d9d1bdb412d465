//! Fixtures shared by unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use mogu_shared::{AgeGroup, Category, Gender, HouseholdSize, Participation, Post, User};

use crate::config::GeneratorConfig;
use crate::features::{FeatureBuilder, FeatureSet};
use crate::generator::SnapshotGenerator;
use crate::snapshot::Snapshot;

pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap()
}

pub fn user_a() -> Uuid {
    Uuid::from_u128(0xA)
}

pub fn user_b() -> Uuid {
    Uuid::from_u128(0xB)
}

pub fn user_c() -> Uuid {
    Uuid::from_u128(0xC)
}

pub fn post_p1() -> Uuid {
    Uuid::from_u128(0x101)
}

pub fn post_p2() -> Uuid {
    Uuid::from_u128(0x102)
}

fn user(
    id: Uuid,
    nickname: &str,
    age_group: AgeGroup,
    gender: Gender,
    household_size: HouseholdSize,
    neighborhood: &str,
) -> User {
    User {
        id,
        name: format!("{nickname} 님"),
        nickname: nickname.into(),
        age_group,
        gender,
        household_size,
        neighborhood: neighborhood.into(),
    }
}

/// Three users, two posts, one participation: B joined A's post P1.
pub fn scenario_snapshot() -> Snapshot {
    let users = vec![
        user(user_a(), "모구왕", AgeGroup::Twenties, Gender::Male, HouseholdSize::Single, "종로구 (광화문)"),
        user(user_b(), "알뜰살뜰", AgeGroup::Thirties, Gender::Female, HouseholdSize::Couple, "마포구 (홍대입구)"),
        user(
            user_c(),
            "잠실공구",
            AgeGroup::FortiesPlus,
            Gender::Female,
            HouseholdSize::ThreePlus,
            "송파구 (잠실)",
        ),
    ];
    let posts = vec![
        Post {
            id: post_p1(),
            author_id: user_a(),
            title: "신라면 40개입 1박스".into(),
            category: Category::Food,
            target_count: 4,
            created_at: reference_time() - Duration::days(3),
            spot: "POINT(126.980000 37.570000)".into(),
        },
        Post {
            id: post_p2(),
            author_id: user_b(),
            title: "메디힐 마스크팩 30매 박스".into(),
            category: Category::Beauty,
            target_count: 5,
            created_at: reference_time() - Duration::days(10) - Duration::hours(5),
            spot: "POINT(126.925000 37.555000)".into(),
        },
    ];
    let participations = vec![Participation::new(user_b(), post_p1())];
    Snapshot::new(users, posts, participations)
}

pub fn build_features(snapshot: &Snapshot) -> FeatureSet {
    FeatureBuilder::new(reference_time(), 0.005)
        .unwrap()
        .build(snapshot, &mut ChaCha8Rng::seed_from_u64(42))
        .unwrap()
}

pub fn synthetic_snapshot(users: usize, posts: usize, seed: u64) -> Snapshot {
    let config = GeneratorConfig {
        num_users: users,
        num_posts: posts,
    };
    SnapshotGenerator::new(&config, reference_time())
        .generate(&mut ChaCha8Rng::seed_from_u64(seed))
        .unwrap()
}
