mod helpers;

use helpers::Harness;
use vitality::engine::{ActionInput, ActionOutcome, MealType};

#[test]
fn consecutive_days_extend_app_streak() {
    let mut h = Harness::new();
    let d0 = h.record(ActionInput::app_checkin());
    h.at(1, 0);
    let d1 = h.record(ActionInput::app_checkin());
    h.at(2, 0);
    let d2 = h.record(ActionInput::app_checkin());

    assert_eq!(d0.snapshot.app_streak_days, 1);
    assert_eq!(d1.snapshot.app_streak_days, 2);
    assert_eq!(d2.snapshot.app_streak_days, 3);
    // 22, then 19 + 2 + 2, then 20 + 2 + 3
    assert_eq!(d1.snapshot.affection, 23.0);
    assert_eq!(d2.snapshot.affection, 25.0);
}

#[test]
fn gap_resets_app_streak() {
    let mut h = Harness::new();
    h.record(ActionInput::app_checkin());
    h.at(1, 0);
    h.record(ActionInput::app_checkin());
    h.at(5, 0);
    let after_gap = h.record(ActionInput::app_checkin());

    assert_eq!(after_gap.snapshot.app_streak_days, 1);
    // 23 decays by 12 to 11, above the retained floor, then + 2
    assert_eq!(after_gap.snapshot.affection, 13.0);
}

#[test]
fn app_bonus_is_capped() {
    let mut h = Harness::new();
    let mut last = None;
    for n in 0..6 {
        h.at(n, 0);
        last = Some(h.record(ActionInput::app_checkin()));
    }
    let last = last.unwrap();
    assert_eq!(last.snapshot.app_streak_days, 6);
    match last.outcome {
        ActionOutcome::Recorded { reward, decay, .. } => {
            assert_eq!(decay, 3.0);
            assert_eq!(reward, 5.0);
        }
        _ => panic!("expected a recorded check-in"),
    }
}

#[test]
fn repeated_meal_same_day_is_not_double_counted() {
    let mut h = Harness::new();
    let first = h.record(ActionInput::meal(MealType::Breakfast, 4));
    h.at(0, 1);
    let again = h.record(ActionInput::meal(MealType::Breakfast, 2));

    assert!(again.is_duplicate());
    assert_eq!(again.snapshot.meal_streak_count, 1);
    assert_eq!(again.snapshot.affection, first.snapshot.affection);

    let lunch = h.record(ActionInput::meal(MealType::Lunch, 4));
    assert_eq!(lunch.snapshot.meal_streak_count, 2);
    assert_eq!(h.record_count(), 2);
}

#[test]
fn out_of_order_meal_resets_streak_without_error() {
    let mut h = Harness::new();
    h.record(ActionInput::meal(MealType::Breakfast, 4));
    let skipped = h.record(ActionInput::meal(MealType::Dinner, 4));
    assert!(!skipped.is_duplicate());
    assert_eq!(skipped.snapshot.meal_streak_count, 1);
    // 20 + 3, then dinner out of order: 2 + 1
    assert_eq!(skipped.snapshot.affection, 26.0);
    assert_eq!(skipped.snapshot.next_expected_meal, MealType::Breakfast);
}

#[test]
fn breakfast_on_consecutive_days_restarts_meal_streak() {
    let mut h = Harness::new();
    h.record(ActionInput::meal(MealType::Breakfast, 4));
    h.at(1, 0);
    let next = h.record(ActionInput::meal(MealType::Breakfast, 4));
    assert!(!next.is_duplicate());
    assert_eq!(next.snapshot.meal_streak_count, 1);
}

#[test]
fn meal_bonus_is_capped_at_ten() {
    let mut h = Harness::new();
    let meals = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];
    let mut results = Vec::new();
    for n in 0..4 {
        for (i, meal) in meals.iter().enumerate() {
            h.at(n, i as i64 * 4);
            results.push(h.record(ActionInput::meal(*meal, 3)));
        }
    }

    let reward = |idx: usize| match results[idx].outcome {
        ActionOutcome::Recorded { reward, .. } => reward,
        ActionOutcome::Duplicate => panic!("meal {idx} should be recorded"),
    };
    assert_eq!(results[10].snapshot.meal_streak_count, 11);
    assert_eq!(reward(10), 12.0);
    // The last dinner only has room for 2 before the ceiling
    assert_eq!(results[11].snapshot.meal_streak_count, 12);
    assert_eq!(results[11].snapshot.affection, 100.0);
    assert_eq!(reward(11), 2.0);
}

#[test]
fn other_actions_leave_streaks_alone() {
    let mut h = Harness::new();
    h.record(ActionInput::app_checkin());
    h.record(ActionInput::meal(MealType::Breakfast, 5));
    let m = h.record(ActionInput::meditation(20));
    let j = h.record(ActionInput::journal("notes"));

    assert_eq!(m.snapshot.app_streak_days, 1);
    assert_eq!(m.snapshot.meal_streak_count, 1);
    assert_eq!(j.snapshot.app_streak_days, 1);
    assert_eq!(j.snapshot.meal_streak_count, 1);
    assert_eq!(j.snapshot.next_expected_meal, MealType::Lunch);
}
