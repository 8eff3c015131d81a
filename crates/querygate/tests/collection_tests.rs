// Behaviour of the standard growable array the demo's result sets live in

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::mem;

/// Upper bound on the number of `i32`s a `Vec` can hold
const MAX_LEN: usize = isize::MAX as usize / mem::size_of::<i32>();

struct CollectionFixture {
    collection: Vec<i32>,
    rng: StdRng,
}

impl CollectionFixture {
    fn new() -> Self {
        Self {
            collection: Vec::new(),
            rng: StdRng::seed_from_u64(0x5eed),
        }
    }

    /// Push `count` random values in `0..100`
    fn add_entries(&mut self, count: usize) {
        for _ in 0..count {
            let value = self.rng.gen_range(0..100);
            self.collection.push(value);
        }
    }

    fn with_entries(count: usize) -> Self {
        let mut fixture = Self::new();
        fixture.add_entries(count);
        assert_eq!(fixture.collection.len(), count);
        fixture
    }
}

#[test]
fn test_is_empty_on_create() {
    let fixture = CollectionFixture::new();
    assert!(fixture.collection.is_empty());
    assert_eq!(fixture.collection.len(), 0);
}

#[test]
fn test_can_add_to_empty() {
    let mut fixture = CollectionFixture::new();
    fixture.add_entries(1);

    assert!(!fixture.collection.is_empty());
    assert_eq!(fixture.collection.len(), 1);
    assert!((0..100).contains(&fixture.collection[0]));
}

#[test]
fn test_can_add_five_values() {
    let fixture = CollectionFixture::with_entries(5);
    assert!(fixture.collection.iter().all(|v| (0..100).contains(v)));
}

#[test]
fn test_capacity_at_least_len() {
    for count in [0, 1, 5, 10] {
        let fixture = CollectionFixture::with_entries(count);
        assert!(fixture.collection.capacity() >= fixture.collection.len());
    }
}

#[test]
fn test_resize_increases_len() {
    let mut fixture = CollectionFixture::new();
    fixture.collection.resize(10, 0);
    assert_eq!(fixture.collection.len(), 10);
    assert!(fixture.collection.iter().all(|&v| v == 0));
}

#[test]
fn test_resize_decreases_len() {
    let mut fixture = CollectionFixture::with_entries(5);
    let prefix = fixture.collection[..3].to_vec();

    fixture.collection.resize(3, 0);

    assert_eq!(fixture.collection, prefix);
}

#[test]
fn test_resize_to_zero() {
    let mut fixture = CollectionFixture::with_entries(5);
    fixture.collection.resize(0, 0);
    assert!(fixture.collection.is_empty());
}

#[test]
fn test_clear_erases_all() {
    let mut fixture = CollectionFixture::with_entries(5);
    let capacity = fixture.collection.capacity();

    fixture.collection.clear();

    assert!(fixture.collection.is_empty());
    // clear keeps the allocation
    assert_eq!(fixture.collection.capacity(), capacity);
}

#[test]
fn test_drain_erases_all() {
    let mut fixture = CollectionFixture::with_entries(5);
    let expected = fixture.collection.clone();

    let drained: Vec<i32> = fixture.collection.drain(..).collect();

    assert_eq!(drained, expected);
    assert!(fixture.collection.is_empty());
}

#[test]
fn test_reserve_increases_capacity_not_len() {
    let mut fixture = CollectionFixture::with_entries(5);
    let capacity = fixture.collection.capacity();

    fixture.collection.reserve(capacity + 1 - fixture.collection.len());

    assert_eq!(fixture.collection.len(), 5);
    assert!(fixture.collection.capacity() > capacity);
}

#[test]
fn test_get_beyond_bounds_is_none() {
    let fixture = CollectionFixture::new();
    assert_eq!(fixture.collection.get(5), None);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn test_index_beyond_bounds_panics() {
    let fixture = CollectionFixture::new();
    let value = fixture.collection[5];
    assert_eq!(value, 0);
}

#[test]
fn test_pop_reduces_len() {
    let mut fixture = CollectionFixture::with_entries(5);
    let last = fixture.collection[4];

    assert_eq!(fixture.collection.pop(), Some(last));
    assert_eq!(fixture.collection.len(), 4);
}

#[test]
fn test_pop_on_empty_is_none() {
    let mut fixture = CollectionFixture::new();
    assert_eq!(fixture.collection.pop(), None);
}

#[test]
fn test_reserve_over_max_fails() {
    let mut fixture = CollectionFixture::with_entries(5);
    assert!(fixture.collection.try_reserve(MAX_LEN).is_err());
    assert!(fixture.collection.try_reserve(usize::MAX).is_err());
    assert_eq!(fixture.collection.len(), 5);

    // MAX_LEN is the bound itself: one more element overflows even when empty
    assert!(Vec::<i32>::new().try_reserve(MAX_LEN + 1).is_err());
}

#[test]
fn test_fixture_is_reproducible() {
    let a = CollectionFixture::with_entries(20);
    let b = CollectionFixture::with_entries(20);
    assert_eq!(a.collection, b.collection);
}
