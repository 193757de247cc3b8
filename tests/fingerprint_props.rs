// tests/fingerprint_props.rs

use std::collections::BTreeMap;
use std::path::Path;

use proptest::prelude::*;
use wad::fs::mock::{mtime, MockFileSystem};
use wad::watch::fingerprint;

// Small trees: up to 12 files spread over a handful of directories.
fn tree_strategy() -> impl Strategy<Value = BTreeMap<String, (usize, u64)>> {
    proptest::collection::btree_map(
        "(src|src/app|res)/[a-e]{1,3}\\.java",
        (0usize..64, 0u64..1_000),
        1..12,
    )
}

fn populate<'a>(files: impl IntoIterator<Item = (&'a String, &'a (usize, u64))>) -> MockFileSystem {
    let fs = MockFileSystem::new();
    for (path, (len, secs)) in files {
        fs.add_file_with_mtime(format!("root/{path}"), vec![b'x'; *len], mtime(*secs));
    }
    fs
}

proptest! {
    #[test]
    fn insertion_order_does_not_matter(files in tree_strategy(), seed in any::<u64>()) {
        let forward = populate(files.iter());

        // Deterministic shuffle driven by the seed.
        let mut shuffled: Vec<_> = files.iter().collect();
        let len = shuffled.len();
        for i in 0..len {
            let j = (seed.wrapping_mul(i as u64 + 1) % len as u64) as usize;
            shuffled.swap(i, j);
        }
        let reordered = populate(shuffled);

        let root = Path::new("root");
        prop_assert_eq!(fingerprint(&forward, root).unwrap(), fingerprint(&reordered, root).unwrap());
    }

    #[test]
    fn touching_any_single_file_changes_the_fingerprint(
        files in tree_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let fs = populate(files.iter());
        let root = Path::new("root");
        let before = fingerprint(&fs, root).unwrap();

        let (path, (_, secs)) = files.iter().nth(pick.index(files.len())).unwrap();
        fs.touch(format!("root/{path}"), mtime(secs + 1));

        prop_assert_ne!(before, fingerprint(&fs, root).unwrap());
    }
}
