//! Level-up rewards are paid exactly once over the lifetime of a streak,
//! regardless of how many reads and settles happen in between.

use chrono::{Duration, TimeZone, Utc};
use phx_reconcile::{reconcile, settle, RANKS};
use phx_schemas::UserState;

#[test]
fn claimed_levels_are_never_paid_twice() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut state = UserState::fresh(start);

    // 30h in: levels 1..=2 are pending
    let t1 = start + Duration::hours(30);
    assert_eq!(reconcile(&state, t1).unclaimed_reward, 150);

    settle(&mut state, t1);
    assert_eq!(reconcile(&state, t1).unclaimed_reward, 0);

    // 80h in: only levels 3..=4 are new (48h and 72h thresholds)
    let t2 = start + Duration::hours(80);
    let rec = reconcile(&state, t2);
    assert_eq!(rec.rank.level, 4);
    assert_eq!(rec.unclaimed_reward, RANKS[3].reward + RANKS[4].reward);

    settle(&mut state, t2);
    assert_eq!(reconcile(&state, t2).unclaimed_reward, 0);
}

#[test]
fn reward_ladder_total_accumulates_across_settles() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut state = UserState::fresh(start);

    // settle at every threshold in turn; banked rewards must equal the
    // ladder prefix sum each time
    let mut reward_sum = 0i64;
    for rank in RANKS.iter().skip(1).take(6) {
        let at = start + Duration::milliseconds((rank.hours_threshold * 3_600_000.0) as i64);
        let rec = settle(&mut state, at);
        reward_sum += rank.reward;
        assert_eq!(rec.rank.level, rank.level);
        assert_eq!(state.last_claimed_level, rank.level as i64);
        // banked = all accrual so far + all rewards so far
        let accrued = phx_reconcile::streak_coins(rank.hours_threshold);
        assert_eq!(state.banked_coins, accrued + reward_sum);
    }
}
