use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use topomesh_core::{CptId, ElementId, Medium, Mesher, Passthrough};

/// Commit a chain of `len` nodes and return its links.
fn build_chain(mesher: &mut Mesher, len: usize) -> Vec<ElementId> {
    let medium = Medium::new();
    let mut points: HashMap<CptId, Passthrough> = HashMap::new();
    let cpts: Vec<CptId> = (0..len)
        .map(|_| {
            let cpt = CptId::new();
            points.insert(cpt, Passthrough::new(cpt, medium));
            cpt
        })
        .collect();
    let (links, _) = mesher.edit(&mut points, |cs| {
        let nodes: Vec<ElementId> = cpts.iter().map(|c| cs.create_node(*c, medium)).collect();
        nodes
            .windows(2)
            .map(|pair| cs.create_link(pair[0], pair[1], []))
            .collect::<Vec<_>>()
    });
    links
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");

    for &len in &[1_000usize, 10_000usize] {
        let mut mesher = Mesher::default();
        let links = build_chain(&mut mesher, len);
        let middle = links[links.len() / 2];

        group.bench_with_input(BenchmarkId::new("split_chain", len), &len, |b, _| {
            b.iter(|| {
                let mut cs = mesher.change_set();
                cs.destroy_link(middle);
                let hint = cs.touched_meshes();
                black_box(cs.apply(hint))
            });
        });

        // an edit far from the big mesh only walks the small one
        let small = build_chain(&mut mesher, 8);
        group.bench_with_input(BenchmarkId::new("split_small_beside", len), &len, |b, _| {
            b.iter(|| {
                let mut cs = mesher.change_set();
                cs.destroy_link(small[3]);
                let hint = cs.touched_meshes();
                black_box(cs.apply(hint))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_apply);
criterion_main!(benches);
