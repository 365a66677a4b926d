use std::sync::Arc;

use loyalty_wallet::config::AppConfig;
use loyalty_wallet::{Direction, Tier, TierPolicy, TransferError, Wallet, WalletError};
use rust_decimal::Decimal;

const CONFIG: &str = r#"
log_level: info
log_dir: ./logs
log_file: wallet.log
use_json: false
rotation: never
gateway:
  host: 127.0.0.1
  port: 0
"#;

fn config() -> AppConfig {
    AppConfig::from_yaml(CONFIG).unwrap()
}

fn wallet() -> Wallet {
    Wallet::in_memory(&config()).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn is_insufficient(e: &WalletError) -> bool {
    matches!(
        e,
        WalletError::Transfer(TransferError::InsufficientFunds { .. })
    )
}

#[test]
fn scenario_base_tier_transfer() {
    let w = wallet();
    w.open_account("alice").unwrap();
    w.open_account("bob").unwrap();

    let r = w.transfer("alice", "bob", "10.0").unwrap();
    assert_eq!(r.commission, dec("0.20"));
    assert_eq!(r.new_balance, dec("9.80"));
    assert_eq!(r.earned_points, 0);
    assert_eq!(r.new_tier, Tier::Base);
    assert_eq!(w.account_summary("bob").unwrap().balance, dec("30"));
}

#[test]
fn scenario_insufficient_funds_reports_required() {
    let w = wallet();
    w.open_account("alice").unwrap();
    w.open_account("bob").unwrap();
    w.accounts().apply_delta("alice", dec("-15"), 0).unwrap();

    let err = w.transfer("alice", "bob", "10.0").unwrap_err();
    match err {
        WalletError::Transfer(TransferError::InsufficientFunds { required, .. }) => {
            assert_eq!(required, dec("10.20"))
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(w.account_summary("alice").unwrap().balance, dec("5"));
    assert_eq!(w.account_summary("bob").unwrap().balance, dec("20"));
}

#[test]
fn scenario_mid_tier_transfer() {
    let w = wallet();
    w.open_account("alice").unwrap();
    w.open_account("bob").unwrap();
    w.accounts().apply_delta("alice", dec("980"), 250).unwrap();

    let r = w.transfer("alice", "bob", "500.0").unwrap();
    assert_eq!(r.commission, dec("7.50"));
    assert_eq!(r.total_spent, dec("507.50"));
    assert_eq!(r.new_balance, dec("492.50"));
    assert_eq!(r.earned_points, 10);
    assert_eq!(r.new_tier, Tier::Mid);
    assert_eq!(w.account_summary("alice").unwrap().points, 260);
}

#[test]
fn scenario_unknown_receiver_creates_no_entries() {
    let w = wallet();
    w.open_account("alice").unwrap();
    let err = w.transfer("alice", "nobody", "1").unwrap_err();
    assert_eq!(err.code(), "RECEIVER_NOT_FOUND");
    assert!(w.ledger().is_empty());
}

#[test]
fn scenario_two_concurrent_debits_zero_rate() {
    let mut cfg = config();
    cfg.tiers.base_rate = Decimal::ZERO;
    let w = Wallet::in_memory(&cfg).unwrap();
    w.open_account("alice").unwrap();
    w.open_account("bob").unwrap();

    let results: Vec<_> = std::thread::scope(|s| {
        let joins: Vec<_> = (0..2)
            .map(|_| s.spawn(|| w.transfer("alice", "bob", "15.0")))
            .collect();
        joins.into_iter().map(|j| j.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(is_insufficient)
    );
    assert_eq!(w.account_summary("alice").unwrap().balance, dec("5"));
}

#[test]
fn concurrent_debits_never_overdraw() {
    let w = wallet();
    w.open_account("alice").unwrap();
    for i in 0..4 {
        w.open_account(&format!("recv{i}")).unwrap();
    }
    // 3 + 0.06 commission each: floor(20 / 3.06) = 6 can succeed
    let results: Vec<_> = std::thread::scope(|s| {
        let joins: Vec<_> = (0..16)
            .map(|i| {
                let w = &w;
                s.spawn(move || w.transfer("alice", &format!("recv{}", i % 4), "3"))
            })
            .collect();
        joins.into_iter().map(|j| j.join().unwrap()).collect()
    });

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 6);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(is_insufficient)
    );

    let alice = w.account_summary("alice").unwrap();
    assert_eq!(alice.balance, dec("20") - dec("3.06") * Decimal::from(ok as u64));
    assert!(alice.balance >= Decimal::ZERO);
}

#[test]
fn conservation_under_concurrent_cross_transfers() {
    let w = Arc::new(wallet());
    let names = ["alice", "bob", "carol", "dave"];
    for n in names {
        w.open_account(n).unwrap();
    }
    let start_total = w.total_balance();

    std::thread::scope(|s| {
        for t in 0..8 {
            let w = w.clone();
            s.spawn(move || {
                for k in 0..50 {
                    let from = names[(t + k) % 4];
                    let to = names[(t + k + 1 + t % 3) % 4];
                    let amount = ["0.25", "1", "1.75", "0.50"][k % 4];
                    match w.transfer(from, to, amount) {
                        Ok(_) => {}
                        Err(e) if is_insufficient(&e) => {}
                        Err(e) => panic!("unexpected {e}"),
                    }
                }
            });
        }
    });

    let commissions: Decimal = names
        .iter()
        .flat_map(|n| w.history_of(n).unwrap())
        .filter(|e| e.direction == Direction::Outgoing)
        .map(|e| e.commission)
        .sum();

    assert_eq!(w.total_balance() + commissions, start_total);
    for n in names {
        assert!(w.account_summary(n).unwrap().balance >= Decimal::ZERO);
    }
}

#[test]
fn every_transfer_is_paired() {
    let w = wallet();
    for n in ["alice", "bob", "carol"] {
        w.open_account(n).unwrap();
    }
    w.transfer("alice", "bob", "2").unwrap();
    w.transfer("bob", "carol", "3.5").unwrap();
    w.transfer("carol", "alice", "1.25").unwrap();

    let all: Vec<_> = ["alice", "bob", "carol"]
        .iter()
        .flat_map(|n| w.history_of(n).unwrap())
        .collect();
    assert_eq!(all.len(), 6);

    for out in all.iter().filter(|e| e.direction == Direction::Outgoing) {
        let matches: Vec<_> = all
            .iter()
            .filter(|e| e.direction == Direction::Incoming && e.transfer_id == out.transfer_id)
            .collect();
        assert_eq!(matches.len(), 1);
        let inc = matches[0];
        assert_eq!(inc.amount, out.amount);
        assert_eq!(inc.account, out.counterparty);
        assert_eq!(inc.counterparty, out.account);
        assert_eq!(inc.timestamp, out.timestamp);
        assert!(inc.commission.is_zero());
    }
}

#[test]
fn summary_read_is_idempotent() {
    let w = wallet();
    w.open_account("alice").unwrap();
    w.open_account("bob").unwrap();
    w.transfer("alice", "bob", "3").unwrap();
    assert_eq!(
        w.account_summary("alice").unwrap(),
        w.account_summary("alice").unwrap()
    );
}

#[test]
fn tier_is_monotonic_in_points() {
    let policy = TierPolicy::default();
    let mut last = policy.tier_for_points(-5);
    for p in 0..2_000 {
        let t = policy.tier_for_points(p);
        assert!(t >= last, "tier regressed at {p}");
        last = t;
    }
    assert_eq!(policy.tier_for_points(199), Tier::Base);
    assert_eq!(policy.tier_for_points(200), Tier::Mid);
    assert_eq!(policy.tier_for_points(1000), Tier::Top);
}

#[test]
fn history_shows_counterparty_and_newest_first() {
    let w = wallet();
    w.open_account("alice").unwrap();
    w.open_account("bob").unwrap();
    w.transfer("alice", "bob", "1").unwrap();
    w.transfer("bob", "alice", "2").unwrap();

    let h = w.history_of("alice").unwrap();
    assert_eq!(h.len(), 2);
    assert_eq!(h[0].direction, Direction::Incoming);
    assert_eq!(h[0].amount, dec("2"));
    assert_eq!(h[1].direction, Direction::Outgoing);
    assert_eq!(h[1].commission, dec("0.02"));
    assert!(h.iter().all(|e| e.counterparty == "bob"));
}

#[test]
fn sub_cent_amount_is_rejected_rather_than_rounded() {
    let w = wallet();
    w.open_account("alice").unwrap();
    w.open_account("bob").unwrap();

    let err = w.transfer("alice", "bob", "10.005").unwrap_err();
    assert_eq!(err.code(), "INVALID_AMOUNT");
    assert_eq!(w.account_summary("alice").unwrap().balance, dec("20"));
    assert_eq!(w.account_summary("bob").unwrap().balance, dec("20"));
    assert!(w.ledger().is_empty());
}
