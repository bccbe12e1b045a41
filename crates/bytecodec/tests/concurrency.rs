// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Concurrent first use of a recursive type on one registry.

use bytecodec::{CodecConfig, CodecRegistry, Engine, Schema, TypeDescriptor};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Debug, Clone, Default, PartialEq, Schema)]
pub struct Tree {
    pub value: u8,
    #[bytecodec("lengthref:children")]
    pub size: u8,
    pub children: Vec<Tree>,
}

fn sample(seed: u8) -> Tree {
    Tree {
        value: seed,
        size: 0,
        children: vec![
            Tree {
                value: seed.wrapping_add(1),
                ..Tree::default()
            },
            Tree {
                value: seed.wrapping_add(2),
                size: 0,
                children: vec![Tree {
                    value: seed.wrapping_add(3),
                    ..Tree::default()
                }],
            },
        ],
    }
}

#[test]
fn test_concurrent_first_use() {
    const THREADS: usize = 8;

    let registry = Arc::new(CodecRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let engine = Engine::with_registry(registry, CodecConfig::default());
                let seed = u8::try_from(i * 10).unwrap();
                barrier.wait();

                let bytes = engine.marshal(&sample(seed)).unwrap();
                let mut out = Tree::default();
                engine.unmarshal(&bytes, &mut out).unwrap();
                (seed, bytes, out)
            })
        })
        .collect();

    for handle in handles {
        let (seed, bytes, out) = handle.join().unwrap();
        assert_eq!(
            bytes,
            vec![seed, 6, seed + 1, 0, seed + 2, 2, seed + 3, 0]
        );
        assert_eq!(out.children.len(), 2);
        assert_eq!(out.children[1].children[0].value, seed + 3);
    }

    // Tree, []Tree and uint8.
    assert_eq!(registry.len(), 3);
    assert!(registry.contains(&Tree::type_descriptor()));
    assert!(registry.contains(&TypeDescriptor::sequence(Tree::type_descriptor())));
}

#[test]
fn test_threads_share_field_tables() {
    let registry = Arc::new(CodecRegistry::new());
    let ty = Tree::type_descriptor();
    let TypeDescriptor::Struct(st) = &ty else {
        panic!("Tree is not a struct descriptor");
    };

    let tables: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let st = st.clone();
            thread::spawn(move || registry.struct_fields(&st).unwrap())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    for table in &tables[1..] {
        assert!(Arc::ptr_eq(&tables[0], table));
    }
    assert_eq!(tables[0].fields.len(), 3);
}
