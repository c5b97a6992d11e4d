use arbitrary::{self, unstructured::Unstructured, Arbitrary};
use rand::{prelude::random, rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};

use super::*;

use std::{collections::BTreeMap, rc::Rc};

#[test]
fn test_rbtree() {
    let seed: u128 = random();
    // let seed: u128 = 197582876559945180918999591639253259379;
    println!("test_rbtree {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed as u64);

    let mut index: RbTree<u8> = RbTree::new();
    let mut btmap: BTreeMap<u8, usize> = BTreeMap::new();

    let mut counts = [0_usize; 12];

    for _i in 0..200_000 {
        let bytes = rng.gen::<[u8; 32]>();
        let mut uns = Unstructured::new(&bytes);

        let op: Op<u8> = uns.arbitrary().unwrap();
        // println!("op -- {:?}", op);
        match op {
            Op::Len => {
                counts[0] += 1;
                assert_eq!(index.len(), btmap.values().sum::<usize>());
            }
            Op::IsEmpty => {
                counts[1] += 1;
                assert_eq!(index.is_empty(), btmap.is_empty());
            }
            Op::Insert(key) => {
                counts[2] += 1;
                let node = index.insert(key).unwrap();
                assert_eq!(index.get(node).unwrap(), &key);
                *btmap.entry(key).or_insert(0) += 1;
            }
            Op::Erase(key) => {
                counts[3] += 1;
                match (index.find(&key), btmap.get_mut(&key)) {
                    (None, None) => (),
                    (Some(node), Some(n)) => {
                        assert_eq!(index.erase(node).unwrap(), key);
                        *n -= 1;
                        if *n == 0 {
                            btmap.remove(&key);
                        }
                    }
                    (None, Some(_)) => panic!("erase no key {} in rbtree", key),
                    (Some(_), None) => panic!("erase no key {} in btree", key),
                }
            }
            Op::EraseKey(key) => {
                counts[4] += 1;
                match (index.erase_key(&key), btmap.get_mut(&key)) {
                    (Err(Error::NotFound(_, _)), None) => (),
                    (Ok(k), Some(n)) => {
                        assert_eq!(k, key);
                        *n -= 1;
                        if *n == 0 {
                            btmap.remove(&key);
                        }
                    }
                    (res, n) => panic!("erase_key {} {:?} {:?}", key, res, n),
                }
            }
            Op::Validate => {
                counts[5] += 1;
                index.validate().unwrap();
            }
            Op::Find(key) => {
                counts[6] += 1;
                match (index.find(&key), btmap.get(&key)) {
                    (None, None) => (),
                    (Some(node), Some(_)) => {
                        assert_eq!(index.get(node).unwrap(), &key)
                    }
                    (None, Some(_)) => panic!("find no key {} in rbtree", key),
                    (Some(_), None) => panic!("find no key {} in btree", key),
                }
            }
            Op::Count(key) => {
                counts[7] += 1;
                let n = btmap.get(&key).cloned().unwrap_or(0);
                assert_eq!(index.count(&key), n, "for key {}", key);
                assert_eq!(index.contains(&key), n > 0, "for key {}", key);
            }
            Op::MinMax => {
                counts[8] += 1;
                let min = index.min().map(|n| *index.get(n).unwrap());
                let max = index.max().map(|n| *index.get(n).unwrap());
                assert_eq!(min, btmap.keys().next().cloned());
                assert_eq!(max, btmap.keys().next_back().cloned());
            }
            Op::ToArray(max_count) => {
                counts[9] += 1;
                let max_count = max_count as usize;
                let a = index.to_array(max_count);
                let b: Vec<u8> = expand(&btmap).into_iter().take(max_count).collect();
                assert_eq!(a, b);
            }
            Op::Iter => {
                counts[10] += 1;
                let a: Vec<u8> = index.iter().cloned().collect();
                assert_eq!(a, expand(&btmap));
            }
            Op::Reverse => {
                counts[11] += 1;
                let a: Vec<u8> = index.iter().rev().cloned().collect();
                let mut b = expand(&btmap);
                b.reverse();
                assert_eq!(a, b);
            }
        }
    }

    index.validate().unwrap();
    let a: Vec<u8> = index.iter().cloned().collect();
    assert_eq!(a, expand(&btmap));

    println!("counts {:?} len:{}", counts, index.len());
}

#[derive(Debug, Arbitrary)]
enum Op<K> {
    Len,
    IsEmpty,
    Insert(K),
    Erase(K),
    EraseKey(K),
    Validate,
    Find(K),
    Count(K),
    MinMax,
    ToArray(u16),
    Iter,
    Reverse,
}

fn expand(btmap: &BTreeMap<u8, usize>) -> Vec<u8> {
    btmap
        .iter()
        .flat_map(|(k, n)| std::iter::repeat(*k).take(*n))
        .collect()
}

#[test]
fn test_to_array() {
    let mut index: RbTree<i32> = RbTree::new();
    for key in [5, 3, 8, 3, 1].iter() {
        index.insert(*key).unwrap();
    }
    assert_eq!(index.to_array(10), vec![1, 3, 3, 5, 8]);
    assert_eq!(index.to_array(5), vec![1, 3, 3, 5, 8]);
    assert_eq!(index.to_array(3), vec![1, 3, 3]);
    assert_eq!(index.to_array(0), Vec::<i32>::new());
    index.validate().unwrap();

    let index: RbTree<i32> = RbTree::new();
    assert_eq!(index.to_array(10), Vec::<i32>::new());
}

#[test]
fn test_min_max() {
    let mut index: RbTree<i32> = RbTree::new();
    assert_eq!(index.min(), None);
    assert_eq!(index.max(), None);

    let node = index.insert(42).unwrap();
    assert_eq!(index.color(node).unwrap(), Color::Black);
    assert_eq!(index.min(), Some(node));
    assert_eq!(index.max(), Some(node));
    assert_eq!(index.get(node).unwrap(), &42);

    let seven = index.insert(7).unwrap();
    assert_eq!(index.color(seven).unwrap(), Color::Red);
    index.insert(99).unwrap();
    assert_eq!(index.get(index.min().unwrap()).unwrap(), &7);
    assert_eq!(index.get(index.max().unwrap()).unwrap(), &99);
}

#[derive(Clone, Debug)]
struct Item(u32, u32);

impl PartialEq for Item {
    fn eq(&self, other: &Item) -> bool {
        self.0 == other.0
    }
}

impl Eq for Item {}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Item) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Item) -> Ordering {
        self.0.cmp(&other.0)
    }
}

#[test]
fn test_duplicates_keep_arrival_order() {
    let seed: u128 = random();
    println!("test_duplicates_keep_arrival_order {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed as u64);

    let mut index: RbTree<Item> = RbTree::new();
    for seqno in 0..10_000 {
        index.insert(Item(rng.gen::<u32>() % 64, seqno)).unwrap();
    }
    index.validate().unwrap();

    let items = index.to_array(usize::MAX);
    assert_eq!(items.len(), 10_000);
    for pair in items.windows(2) {
        assert!(pair[0].0 <= pair[1].0, "{:?}", pair);
        if pair[0].0 == pair[1].0 {
            assert!(pair[0].1 < pair[1].1, "{:?}", pair);
        }
    }
}

#[test]
fn test_find_after_erase() {
    let mut index: RbTree<i32> = RbTree::new();
    let a = index.insert(10).unwrap();
    index.insert(20).unwrap();
    index.insert(10).unwrap();
    assert_eq!(index.count(&10), 2);

    assert_eq!(index.erase(a).unwrap(), 10);
    assert!(index.find(&10).is_some());
    assert_eq!(index.count(&10), 1);

    index.erase_key(&10).unwrap();
    assert_eq!(index.find(&10), None);
    assert_eq!(index.count(&10), 0);
    match index.erase_key(&10) {
        Err(Error::NotFound(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    index.validate().unwrap();
}

#[test]
fn test_erase_all() {
    let seed: u128 = random();
    // let seed: u128 = 46462177783710469322936477079324309004;
    println!("test_erase_all {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed as u64);

    for n in [0, 1, 2, 3, 10, 100, 1000, 10_000].iter() {
        let mut keys: Vec<u32> = (0..*n).map(|_| rng.gen::<u32>() % 1000).collect();

        let mut index: RbTree<u32> = RbTree::new();
        for key in keys.iter() {
            index.insert(*key).unwrap();
        }
        index.validate().unwrap();
        assert_eq!(index.len(), *n);

        keys.shuffle(&mut rng);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(index.erase_key(key).unwrap(), *key);
            if i % 97 == 0 {
                index.validate().unwrap();
            }
        }

        assert_eq!(index.is_empty(), true);
        assert_eq!(index.len(), 0);
        assert_eq!(index.root, NIL);
        assert_eq!(index.arena.len(), 0);
        index.validate().unwrap();
    }
}

#[test]
fn test_keys_released_once() {
    let keys: Vec<Rc<u32>> = (0..500).map(|i| Rc::new(i % 50)).collect();

    let mut index: RbTree<Rc<u32>> = RbTree::new();
    for key in keys.iter() {
        index.insert(Rc::clone(key)).unwrap();
    }
    assert!(keys.iter().all(|key| Rc::strong_count(key) == 2));

    // erase every other key, mixing handle and key based erase.
    for (i, key) in keys.iter().enumerate().filter(|(i, _)| i % 2 == 0) {
        let erased = match i % 4 {
            0 => {
                let node = index.find(key).unwrap();
                index.erase(node).unwrap()
            }
            _ => index.erase_key(key).unwrap(),
        };
        assert_eq!(erased, *key);
    }
    index.validate().unwrap();
    assert_eq!(index.len(), 250);
    let n_live: usize = keys.iter().map(|key| Rc::strong_count(key) - 1).sum();
    assert_eq!(n_live, 250);

    index.clear();
    assert!(keys.iter().all(|key| Rc::strong_count(key) == 1));

    let index: RbTree<Rc<u32>> = keys.iter().cloned().collect();
    assert!(keys.iter().all(|key| Rc::strong_count(key) == 2));
    drop(index);
    assert!(keys.iter().all(|key| Rc::strong_count(key) == 1));
}

#[test]
fn test_successor_predecessor() {
    let index: RbTree<i32> = (1..=100).rev().collect();
    index.validate().unwrap();

    let mut node = index.min().unwrap();
    let mut keys = vec![*index.get(node).unwrap()];
    while let Some(next) = index.successor(node).unwrap() {
        keys.push(*index.get(next).unwrap());
        node = next;
    }
    assert_eq!(keys, (1..=100).collect::<Vec<i32>>());
    assert_eq!(node, index.max().unwrap());

    let mut keys = vec![*index.get(node).unwrap()];
    while let Some(prev) = index.predecessor(node).unwrap() {
        keys.push(*index.get(prev).unwrap());
        node = prev;
    }
    assert_eq!(keys, (1..=100).rev().collect::<Vec<i32>>());
}

#[test]
fn test_iter_double_ended() {
    let index: RbTree<i32> = (0..10).collect();
    let mut iter = index.iter();
    assert_eq!(iter.len(), 10);
    assert_eq!(iter.next(), Some(&0));
    assert_eq!(iter.next_back(), Some(&9));
    assert_eq!(iter.next(), Some(&1));
    assert_eq!(iter.next_back(), Some(&8));
    assert_eq!(iter.len(), 6);
    let rest: Vec<&i32> = iter.collect();
    assert_eq!(rest, vec![&2, &3, &4, &5, &6, &7]);

    let mut n = 0;
    for key in &index {
        assert_eq!(*key, n);
        n += 1;
    }
    assert_eq!(format!("{:?}", index), "{0, 1, 2, 3, 4, 5, 6, 7, 8, 9}");
}

#[test]
fn test_invalid_handle() {
    let mut a: RbTree<i32> = RbTree::new();
    let mut b: RbTree<i32> = RbTree::new();
    let na = a.insert(1).unwrap();
    let nb = b.insert(1).unwrap();

    match b.erase(na) {
        Err(Error::InvalidHandle(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    match a.get(nb) {
        Err(Error::InvalidHandle(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(b.len(), 1);

    assert_eq!(a.erase(na).unwrap(), 1);
    match a.erase(na) {
        Err(Error::InvalidHandle(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }

    // the slot is reused, the old handle stays stale.
    let nc = a.insert(2).unwrap();
    assert_eq!(nc.index, na.index);
    assert_ne!(nc, na);
    assert!(a.successor(na).is_err());
    assert!(a.predecessor(na).is_err());
    assert_eq!(a.get(nc).unwrap(), &2);
}

#[test]
fn test_clear() {
    let mut index: RbTree<String> = RbTree::with_capacity(100);
    assert!(index.capacity() >= 100);
    let node = index.insert("hello".to_string()).unwrap();
    index.extend((0..100).map(|i| format!("key{:03}", i)));
    assert_eq!(index.len(), 101);
    index.validate().unwrap();

    index.clear();
    assert_eq!(index.len(), 0);
    assert_eq!(index.is_empty(), true);
    assert_eq!(index.min(), None);
    assert!(index.get(node).is_err());
    index.validate().unwrap();

    let node = index.insert("world".to_string()).unwrap();
    assert_eq!(index.get(node).unwrap(), "world");
    index.validate().unwrap();
}

#[test]
fn test_find_borrowed() {
    let index: RbTree<String> = vec!["b", "a", "c"]
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    let node = index.find("b").unwrap();
    assert_eq!(index.get(node).unwrap(), "b");
    assert_eq!(index.find("z"), None);
    assert_eq!(index.count("a"), 1);
}

#[test]
fn test_random() {
    let seed: u128 = random();
    println!("test_random {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed as u64);

    let index: RbTree<u64> = RbTree::new();
    assert_eq!(index.random(&mut rng), None);

    let index: RbTree<u64> = (0..1000).collect();
    for _i in 0..100 {
        let node = index.random(&mut rng).unwrap();
        assert!(*index.get(node).unwrap() < 1000);
    }
}
