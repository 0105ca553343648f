use fake_news::entities::*;
use fake_news::error::GameError;
use fake_news::pool::*;

// ── spawn ─────────────────────────────────────────────────────────────────────

#[test]
fn spawn_fills_slots_in_order() {
    let mut pool = EntityPool::new(4);
    let a = pool.spawn(1.0, 2.0, 0.5, EntityKind::User).unwrap();
    let b = pool.spawn(3.0, 4.0, 0.0, EntityKind::Enemy).unwrap();
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(pool.len(), 2);

    let e = pool.get(a).unwrap();
    assert_eq!((e.x, e.y, e.angle), (1.0, 2.0, 0.5));
    assert_eq!(e.state, EntityState::User { odometer: 0.0 });
}

#[test]
fn full_pool_reports_exhaustion_instead_of_looping() {
    let mut pool = EntityPool::new(POOL_CAPACITY);
    pool.spawn(0.0, 0.0, 0.0, EntityKind::Fake).unwrap();
    for _ in 1..POOL_CAPACITY {
        pool.spawn(0.0, 0.0, 0.0, EntityKind::User).unwrap();
    }
    assert_eq!(pool.len(), POOL_CAPACITY);

    let err = pool.spawn(0.0, 0.0, 0.0, EntityKind::Fake).unwrap_err();
    assert!(matches!(err, GameError::PoolExhausted { capacity } if capacity == POOL_CAPACITY));
    assert_eq!(pool.len(), POOL_CAPACITY);
}

#[test]
fn zero_capacity_pool_is_always_exhausted() {
    let mut pool = EntityPool::new(0);
    assert!(pool.spawn(0.0, 0.0, 0.0, EntityKind::User).is_err());
}

#[test]
fn cursor_continues_after_last_spawn_not_from_zero() {
    let mut pool = EntityPool::new(4);
    let ids: Vec<_> = (0..3)
        .map(|_| pool.spawn(0.0, 0.0, 0.0, EntityKind::User).unwrap())
        .collect();
    // Free slot 0; the cursor sits at 3, so slot 3 is taken before 0.
    pool.deactivate(ids[0]);
    let next = pool.spawn(0.0, 0.0, 0.0, EntityKind::User).unwrap();
    assert_eq!(next.index(), 3);

    // Now the cursor wraps and finds the freed slot.
    let wrapped = pool.spawn(0.0, 0.0, 0.0, EntityKind::User).unwrap();
    assert_eq!(wrapped.index(), 0);
}

#[test]
fn spawn_never_returns_an_active_slot() {
    let mut pool = EntityPool::new(8);
    let mut live = Vec::new();
    for round in 0..40 {
        let id = pool.spawn(round as f64, 0.0, 0.0, EntityKind::User).unwrap();
        assert!(!live.contains(&id));
        live.push(id);
        if live.len() > 5 {
            let victim = live.remove(round % live.len());
            pool.deactivate(victim);
        }
        assert!(pool.len() <= pool.capacity());
    }
}

// ── deactivate ────────────────────────────────────────────────────────────────

#[test]
fn deactivate_frees_slot_for_reuse() {
    let mut pool = EntityPool::new(1);
    let id = pool.spawn(0.0, 0.0, 0.0, EntityKind::Bullet).unwrap();
    assert!(pool.spawn(0.0, 0.0, 0.0, EntityKind::Bullet).is_err());

    pool.deactivate(id);
    assert!(!pool.is_active(id));
    assert!(pool.is_empty());

    let again = pool.spawn(5.0, 5.0, 0.0, EntityKind::Message).unwrap();
    assert_eq!(again, id);
    assert_eq!(pool.get(again).unwrap().kind(), EntityKind::Message);
}

#[test]
fn deactivate_twice_is_a_no_op() {
    let mut pool = EntityPool::new(2);
    let a = pool.spawn(0.0, 0.0, 0.0, EntityKind::User).unwrap();
    pool.spawn(0.0, 0.0, 0.0, EntityKind::User).unwrap();
    pool.deactivate(a);
    pool.deactivate(a);
    assert_eq!(pool.len(), 1);
}

// ── iteration ─────────────────────────────────────────────────────────────────

#[test]
fn iter_active_visits_each_active_slot_once_in_slot_order() {
    let mut pool = EntityPool::new(6);
    let ids: Vec<_> = (0..5)
        .map(|i| pool.spawn(i as f64, 0.0, 0.0, EntityKind::User).unwrap())
        .collect();
    pool.deactivate(ids[1]);
    pool.deactivate(ids[3]);

    let seen: Vec<usize> = pool.iter_active().map(|(id, _)| id.index()).collect();
    assert_eq!(seen, vec![0, 2, 4]);
    assert_eq!(pool.active_ids().len(), pool.len());
}

#[test]
fn find_returns_first_match_in_slot_order() {
    let mut pool = EntityPool::new(4);
    pool.spawn(0.0, 0.0, 0.0, EntityKind::User).unwrap();
    let first_enemy = pool.spawn(0.0, 0.0, 0.0, EntityKind::Enemy).unwrap();
    pool.spawn(0.0, 0.0, 0.0, EntityKind::Enemy).unwrap();

    let found = pool.find(|_, e| e.kind() == EntityKind::Enemy);
    assert_eq!(found, Some(first_enemy));
    assert_eq!(pool.find(|_, e| e.kind() == EntityKind::Fake), None);
}

// ── entity helpers ────────────────────────────────────────────────────────────

#[test]
fn collision_square_is_axis_independent() {
    let e = Entity::new(100.0, 100.0, 0.0, EntityKind::User);
    // Corner of the square: Euclidean distance ≈ 15.5 but still inside.
    assert!(e.within(111.0, 111.0, 12.0));
    assert!(!e.within(112.0, 100.0, 12.0));
}

#[test]
fn bullets_and_explosions_are_not_collidable() {
    assert!(!Entity::new(0.0, 0.0, 0.0, EntityKind::Bullet).is_collidable());
    assert!(!Entity::new(0.0, 0.0, 0.0, EntityKind::Explosion).is_collidable());
    assert!(Entity::new(0.0, 0.0, 0.0, EntityKind::Message).is_collidable());
    assert!(Entity::new(0.0, 0.0, 0.0, EntityKind::Fake).is_collidable());
}

#[test]
fn advance_follows_sin_cos_heading() {
    let mut e = Entity::new(0.0, 0.0, std::f64::consts::FRAC_PI_2, EntityKind::User);
    e.advance(2.0);
    assert!((e.x - 2.0).abs() < 1e-9);
    assert!(e.y.abs() < 1e-9);
}
