#![no_main]

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sprig_core::OrderedSet;

#[derive(Debug, Arbitrary)]
enum Op {
    Insert(u8),
    Remove(u8),
    /// Walk with a cursor, removing every element for which `n % modulus == 0`.
    RemoveWhileIterating { modulus: u8 },
    Retain { threshold: u8 },
    Clear,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut set = OrderedSet::new();
    let mut model = BTreeSet::new();

    for op in ops {
        match op {
            Op::Insert(n) => assert_eq!(set.insert(n), model.insert(n)),
            Op::Remove(n) => assert_eq!(set.remove(&n), model.remove(&n)),
            Op::RemoveWhileIterating { modulus } => {
                let modulus = modulus.max(1);
                let mut seen = Vec::new();
                let mut cursor = set.cursor();
                while let Some(&n) = cursor.next() {
                    seen.push(n);
                    if n % modulus == 0 {
                        assert_eq!(cursor.remove_current(), Some(n));
                        assert_eq!(cursor.remove_current(), None);
                    }
                }
                let expected: Vec<u8> = model.iter().copied().collect();
                assert_eq!(seen, expected, "cursor skipped or repeated elements");
                model.retain(|n| n % modulus != 0);
            }
            Op::Retain { threshold } => {
                set.retain(|&n| n >= threshold);
                model.retain(|&n| n >= threshold);
            }
            Op::Clear => {
                set.clear();
                model.clear();
            }
        }

        assert_eq!(set.len(), model.len());
        assert!(set.iter().copied().eq(model.iter().copied()));
        assert!(set.is_well_formed());
    }
});
